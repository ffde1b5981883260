//! Polymorphic union resolution: discriminator keys select a concrete
//! case, bare scalars select body-less cases, inline cases read the
//! parent document.

mod common;

use common::{dict, scalar};
use vellum_core::{reflect_struct, reflect_union, Reifier, ReifyError, ReifyOptions, UnionBuilder};

#[derive(Debug, Default, Clone, PartialEq)]
struct SwordSpec {
    damage: i32,
}
reflect_struct!(SwordSpec { damage });

#[derive(Debug, Default, Clone, PartialEq)]
struct BowSpec {
    range: i32,
    arrows: i32,
}
reflect_struct!(BowSpec { range, arrows });

#[derive(Debug, Clone, PartialEq)]
enum Weapon {
    Sword(SwordSpec),
    Bow(BowSpec),
}

impl Default for Weapon {
    fn default() -> Self {
        Weapon::Sword(SwordSpec::default())
    }
}

reflect_union!(Weapon {
    "sword" => Sword(SwordSpec),
    "bow" => Bow(BowSpec),
});

#[test]
fn test_discriminator_key_selects_case() {
    let reifier = Reifier::new();
    let weapon: Weapon = reifier
        .reify(&dict([("sword", dict([("damage", scalar("12"))]))]))
        .unwrap();
    assert_eq!(weapon, Weapon::Sword(SwordSpec { damage: 12 }));

    let weapon: Weapon = reifier
        .reify(&dict([("bow", dict([("range", scalar("30")), ("arrows", scalar("20"))]))]))
        .unwrap();
    assert_eq!(weapon, Weapon::Bow(BowSpec { range: 30, arrows: 20 }));
}

#[test]
fn test_unknown_discriminator_is_structural() {
    let reifier = Reifier::new();
    let error = reifier
        .reify::<Weapon>(&dict([("axe", dict([("damage", scalar("1"))]))]))
        .unwrap_err();
    assert!(matches!(error.innermost(), ReifyError::Structural { .. }));

    let error = reifier.reify::<Weapon>(&scalar("axe")).unwrap_err();
    assert!(matches!(error.innermost(), ReifyError::Structural { .. }));
}

#[test]
fn test_bare_scalar_selects_bodyless_case() {
    let reifier = Reifier::new();
    let weapon: Weapon = reifier.reify(&scalar("sword")).unwrap();
    assert_eq!(weapon, Weapon::Sword(SwordSpec::default()));
}

#[test]
fn test_bodyless_case_requires_no_mandatory_members() {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Strict {
        level: i32,
    }
    reflect_struct!(Strict { level: mandatory });

    #[derive(Debug, Clone, PartialEq)]
    enum Spell {
        Zap(Strict),
    }
    reflect_union!(Spell {
        "zap" => Zap(Strict),
    });

    let reifier = Reifier::new();
    let error = reifier.reify::<Spell>(&scalar("zap")).unwrap_err();
    match error {
        ReifyError::MissingFields { fields, .. } => assert_eq!(fields, ["level"]),
        other => panic!("expected missing-fields error, got {other:?}"),
    }

    let spell: Spell = reifier
        .reify(&dict([("zap", dict([("level", scalar("3"))]))]))
        .unwrap();
    assert_eq!(spell, Spell::Zap(Strict { level: 3 }));
}

#[test]
fn test_discriminator_case_sensitivity_follows_options() {
    let reifier = Reifier::new();

    // Insensitive by default.
    let weapon: Weapon = reifier
        .reify(&dict([("Sword", dict([("damage", scalar("5"))]))]))
        .unwrap();
    assert_eq!(weapon, Weapon::Sword(SwordSpec { damage: 5 }));

    // Sensitive: "Sword" selects nothing.
    let error = reifier
        .reify_with::<Weapon>(
            &dict([("Sword", dict([("damage", scalar("5"))]))]),
            ReifyOptions { case_sensitive: true, ..ReifyOptions::default() },
        )
        .unwrap_err();
    assert!(matches!(error.innermost(), ReifyError::Structural { .. }));
}

#[test]
fn test_extra_keys_beside_discriminator_are_reported() {
    let reifier = Reifier::new();
    let error = reifier
        .reify::<Weapon>(&dict([
            ("sword", dict([("damage", scalar("1"))])),
            ("stray", scalar("2")),
        ]))
        .unwrap_err();
    match error {
        ReifyError::ExtraFields { keys, .. } => assert_eq!(keys, ["stray"]),
        other => panic!("expected extra-fields error, got {other:?}"),
    }
}

#[test]
fn test_update_replaces_union_value() {
    let reifier = Reifier::new();
    let mut weapon: Weapon = reifier
        .reify(&dict([("sword", dict([("damage", scalar("1"))]))]))
        .unwrap();
    reifier
        .update(&mut weapon, &dict([("bow", dict([("range", scalar("9")), ("arrows", scalar("4"))]))]))
        .unwrap();
    assert_eq!(weapon, Weapon::Bow(BowSpec { range: 9, arrows: 4 }));
}

#[test]
fn test_inline_case_reads_parent_document() {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct MeleeSpec {
        style: String,
        damage: i32,
    }
    reflect_struct!(MeleeSpec {
        style as "melee",
        damage,
    });

    #[derive(Debug, Clone, PartialEq)]
    enum Attack {
        Melee(MeleeSpec),
        Ranged(BowSpec),
    }
    impl vellum_core::Reflected for Attack {
        fn build_descriptor() -> vellum_core::TypeDescriptor {
            UnionBuilder::<Attack>::new()
                .case_inline("melee", Attack::Melee as fn(MeleeSpec) -> Attack)
                .case("ranged", Attack::Ranged as fn(BowSpec) -> Attack)
                .build()
        }
    }

    let reifier = Reifier::new();
    // The discriminator is the first key; the case's members share the doc.
    let attack: Attack = reifier
        .reify(&dict([("melee", scalar("overhead")), ("damage", scalar("8"))]))
        .unwrap();
    assert_eq!(attack, Attack::Melee(MeleeSpec { style: "overhead".into(), damage: 8 }));
}

#[test]
fn test_duplicate_discriminators_panic_at_first_use() {
    #[derive(Debug, Clone)]
    enum Broken {
        A(SwordSpec),
        B(SwordSpec),
    }
    impl vellum_core::Reflected for Broken {
        fn build_descriptor() -> vellum_core::TypeDescriptor {
            UnionBuilder::<Broken>::new()
                .case("hit", Broken::A as fn(SwordSpec) -> Broken)
                .case("HIT", Broken::B as fn(SwordSpec) -> Broken)
                .build()
        }
    }

    let reifier = Reifier::new();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = reifier.reify::<Broken>(&scalar("hit"));
    }));
    assert!(result.is_err());
}
