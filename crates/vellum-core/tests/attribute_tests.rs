//! Member and class directives: mandatory, allow-missing, key renames,
//! unregistered (ignored) members, origin auto-population, and inlining.

mod common;

use common::{dict, scalar};
use vellum_core::{reflect_struct, Reifier, ReifyError, ReifyOptions, StructBuilder};

#[derive(Debug, Default)]
struct Directives {
    required: i32,
    optional: String,
    plain: String,
    // Never registered: invisible to the reifier.
    ignored: bool,
}
reflect_struct!(Directives {
    required: mandatory,
    optional: allow_missing,
    plain,
});

#[derive(Debug, Default)]
struct AllRequired {
    count: i32,
    label: String,
}
reflect_struct!(AllRequired: all_mandatory {
    count,
    label: allow_missing,
});

#[derive(Debug, Default)]
struct AllOptional {
    title: String,
    names: Vec<String>,
}
reflect_struct!(AllOptional: all_allow_missing {
    title: mandatory,
    names,
});

#[derive(Debug, Default)]
struct Renamed {
    speed: f32,
}
reflect_struct!(Renamed {
    speed as "Speed",
});

#[derive(Debug, Default)]
struct WithOrigin {
    hp: i32,
    defined_at: String,
}
reflect_struct!(WithOrigin {
    hp,
    defined_at: origin,
});

fn strict_missing() -> ReifyOptions {
    ReifyOptions { allow_missing_fields: false, ..ReifyOptions::default() }
}

#[test]
fn test_mandatory_member_allows_setting() {
    let reifier = Reifier::new();
    let value: Directives = reifier
        .reify(&dict([("required", scalar("7")), ("optional", scalar("a")), ("plain", scalar("b"))]))
        .unwrap();
    assert_eq!(value.required, 7);
}

#[test]
fn test_mandatory_member_errors_when_absent() {
    let reifier = Reifier::new();
    // Lenient options do not silence a member-level mandatory directive.
    let error = reifier
        .reify_with::<Directives>(&dict([("plain", scalar("b"))]), ReifyOptions::lenient())
        .unwrap_err();
    match error {
        ReifyError::MissingFields { fields, .. } => assert_eq!(fields, ["required"]),
        other => panic!("expected missing-fields error, got {other:?}"),
    }
}

#[test]
fn test_allow_missing_member_survives_strict_options() {
    let reifier = Reifier::new();
    let value: Directives = reifier
        .reify_with(
            &dict([("required", scalar("1")), ("plain", scalar("b"))]),
            strict_missing(),
        )
        .unwrap();
    assert_eq!(value.optional, "");
}

#[test]
fn test_undirected_member_follows_options() {
    let reifier = Reifier::new();
    let doc = dict([("required", scalar("1")), ("optional", scalar("a"))]);

    assert!(reifier.reify::<Directives>(&doc).is_ok());

    let error = reifier.reify_with::<Directives>(&doc, strict_missing()).unwrap_err();
    match error {
        ReifyError::MissingFields { fields, .. } => assert_eq!(fields, ["plain"]),
        other => panic!("expected missing-fields error, got {other:?}"),
    }
}

#[test]
fn test_unregistered_member_key_counts_as_extra() {
    let reifier = Reifier::new();
    let doc = dict([
        ("required", scalar("1")),
        ("ignored", scalar("true")),
    ]);
    let error = reifier.reify::<Directives>(&doc).unwrap_err();
    match error {
        ReifyError::ExtraFields { keys, .. } => assert_eq!(keys, ["ignored"]),
        other => panic!("expected extra-fields error, got {other:?}"),
    }

    // Tolerated when extras are allowed; the member itself is never set.
    let value: Directives = reifier
        .reify_with(&doc, ReifyOptions { allow_extra_fields: true, ..ReifyOptions::default() })
        .unwrap();
    assert!(!value.ignored);
}

#[test]
fn test_all_mandatory_class_overrides_call_options() {
    let reifier = Reifier::new();
    let error = reifier
        .reify_with::<AllRequired>(&dict([]), ReifyOptions::lenient())
        .unwrap_err();
    match error {
        ReifyError::MissingFields { fields, .. } => assert_eq!(fields, ["count"]),
        other => panic!("expected missing-fields error, got {other:?}"),
    }

    // The member-level allow-missing still wins over the class directive.
    let value: AllRequired = reifier.reify(&dict([("count", scalar("3"))])).unwrap();
    assert_eq!(value.count, 3);
    assert_eq!(value.label, "");
}

#[test]
fn test_all_allow_missing_class_overrides_call_options() {
    let reifier = Reifier::new();
    let error = reifier
        .reify_with::<AllOptional>(&dict([("names", common::scalars(["a"]))]), strict_missing())
        .unwrap_err();
    match error {
        ReifyError::MissingFields { fields, .. } => assert_eq!(fields, ["title"]),
        other => panic!("expected missing-fields error, got {other:?}"),
    }

    let value: AllOptional = reifier
        .reify_with(&dict([("title", scalar("t"))]), strict_missing())
        .unwrap();
    assert!(value.names.is_empty());
}

#[test]
fn test_all_allow_missing_class_still_checks_extras() {
    let reifier = Reifier::new();
    let error = reifier
        .reify::<AllOptional>(&dict([("title", scalar("t")), ("surprise", scalar("1"))]))
        .unwrap_err();
    assert!(matches!(error, ReifyError::ExtraFields { .. }));
}

#[test]
fn test_renamed_member_reads_its_key() {
    let reifier = Reifier::new();
    let value: Renamed = reifier
        .reify_with(
            &dict([("Speed", scalar("2.5"))]),
            ReifyOptions { case_sensitive: true, ..ReifyOptions::default() },
        )
        .unwrap();
    assert_eq!(value.speed, 2.5);

    // The declared name is not a document key once renamed.
    let error = reifier
        .reify_with::<Renamed>(
            &dict([("speed", scalar("2.5"))]),
            ReifyOptions { case_sensitive: true, ..ReifyOptions::default() },
        )
        .unwrap_err();
    assert!(matches!(error, ReifyError::ExtraFields { .. }));
}

#[test]
fn test_renamed_member_respects_case_option() {
    let reifier = Reifier::new();
    let value: Renamed = reifier.reify(&dict([("speed", scalar("1.0"))])).unwrap();
    assert_eq!(value.speed, 1.0);
}

#[test]
fn test_origin_member_is_auto_populated() {
    let reifier = Reifier::new();
    let value: WithOrigin = reifier.reify(&dict([("hp", scalar("9"))])).unwrap();
    assert_eq!(value.hp, 9);
    assert_eq!(value.defined_at, common::TEST_FILE);
}

#[test]
fn test_origin_member_never_counts_for_presence() {
    let reifier = Reifier::new();
    // Strict missing-field checking must not demand a "defined_at" key.
    let value: WithOrigin = reifier
        .reify_with(&dict([("hp", scalar("1"))]), strict_missing())
        .unwrap();
    assert_eq!(value.defined_at, common::TEST_FILE);
}

#[test]
fn test_inline_member_reads_parent_keys() {
    #[derive(Debug, Default)]
    struct Inner {
        x: i32,
        y: i32,
    }
    reflect_struct!(Inner { x, y });

    #[derive(Debug, Default)]
    struct Outer {
        name: String,
        pos: Inner,
    }
    reflect_struct!(Outer {
        name,
        pos: inline,
    });

    let reifier = Reifier::new();
    let value: Outer = reifier
        .reify(&dict([("name", scalar("spot")), ("x", scalar("3")), ("y", scalar("4"))]))
        .unwrap();
    assert_eq!(value.name, "spot");
    assert_eq!(value.pos.x, 3);
    assert_eq!(value.pos.y, 4);

    // The inline member's keys count as consumed; anything else is extra.
    let error = reifier
        .reify::<Outer>(&dict([
            ("name", scalar("spot")),
            ("x", scalar("3")),
            ("y", scalar("4")),
            ("z", scalar("5")),
        ]))
        .unwrap_err();
    match error {
        ReifyError::ExtraFields { keys, .. } => assert_eq!(keys, ["z"]),
        other => panic!("expected extra-fields error, got {other:?}"),
    }
}

#[test]
fn test_conflicting_class_directives_panic_at_first_use() {
    #[derive(Debug, Default)]
    struct Broken {
        a: i32,
    }
    impl vellum_core::Reflected for Broken {
        fn build_descriptor() -> vellum_core::TypeDescriptor {
            StructBuilder::<Broken>::new()
                .all_mandatory()
                .all_allow_missing()
                .field("a", |v: &mut Broken| &mut v.a)
                .build()
        }
    }

    let reifier = Reifier::new();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = reifier.reify::<Broken>(&dict([("a", scalar("1"))]));
    }));
    assert!(result.is_err());
}

#[test]
fn test_set_field_on_single_member() {
    let reifier = Reifier::new();
    let mut value = Directives::default();
    let doc = dict([("plain", scalar("hello")), ("unknown", scalar("1"))]);

    assert!(reifier.set_field_on(&mut value, "plain", &doc, None).unwrap());
    assert_eq!(value.plain, "hello");

    // Unknown member: extra-fields policy applies.
    assert!(matches!(
        reifier.set_field_on(&mut value, "unknown", &doc, None),
        Err(ReifyError::ExtraFields { .. })
    ));
    let lenient = Some(ReifyOptions::lenient());
    assert!(!reifier.set_field_on(&mut value, "unknown", &doc, lenient).unwrap());

    // Known member absent from the doc: presence policy applies.
    assert!(!reifier.set_field_on(&mut value, "optional", &doc, None).unwrap());
    assert!(matches!(
        reifier.set_field_on(&mut value, "required", &doc, Some(strict_missing())),
        Err(ReifyError::MissingFields { .. })
    ));
}
