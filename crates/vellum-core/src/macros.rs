//! Registration macros
//!
//! Declarative wrappers over the descriptor builders, so registering a
//! type reads like annotating it. Fields that should be ignored are simply
//! left out of the list.

/// Implement [`Reflected`](crate::Reflected) for a struct.
///
/// Each entry names a field, optionally followed by `as "key"` to read a
/// different document key, and/or `:` plus directives (`mandatory`,
/// `allow_missing`, `inline`, `origin`). Class-level directives go after
/// the type name.
///
/// ```ignore
/// reflect_struct!(Monster {
///     name,
///     hp: mandatory,
///     speed as "Speed",
///     defined_at: origin,
///     stats: inline,
/// });
///
/// reflect_struct!(Spawn: all_mandatory {
///     monster,
///     count: allow_missing,
/// });
/// ```
#[macro_export]
macro_rules! reflect_struct {
    ($ty:ty $( : $( $class_dir:ident )+ )? { $( $field:ident $( as $key:literal )? $( : $( $dir:ident )+ )? ),* $(,)? }) => {
        impl $crate::Reflected for $ty {
            fn build_descriptor() -> $crate::TypeDescriptor {
                $crate::StructBuilder::<$ty>::new()
                    $( $( .$class_dir() )+ )?
                    $(
                        .field(stringify!($field), |value: &mut $ty| &mut value.$field)
                        $( .key($key) )?
                        $( $( .$dir() )+ )?
                    )*
                    .build()
            }
        }
    };
}

/// Implement [`Reflected`](crate::Reflected) for a plain symbolic enum.
/// Document scalars match variant names without regard to case.
///
/// ```ignore
/// reflect_enum!(Element { Fire, Water, Earth });
/// ```
#[macro_export]
macro_rules! reflect_enum {
    ($ty:ty { $( $variant:ident ),+ $(,)? }) => {
        impl $crate::Reflected for $ty {
            fn build_descriptor() -> $crate::TypeDescriptor {
                $crate::EnumBuilder::<$ty>::new()
                    $( .symbol(stringify!($variant), <$ty>::$variant) )+
                    .build()
            }
        }
    };
}

/// Implement [`Reflected`](crate::Reflected) for a polymorphic union.
///
/// Each case maps a discriminator key to a tuple variant and its payload
/// type. Inline cases (payload members in the same document as the
/// discriminator) are registered through
/// [`UnionBuilder::case_inline`](crate::UnionBuilder::case_inline) directly.
///
/// ```ignore
/// reflect_union!(Weapon {
///     "sword" => Sword(SwordSpec),
///     "bow" => Bow(BowSpec),
/// });
/// ```
#[macro_export]
macro_rules! reflect_union {
    ($ty:ty { $( $key:literal => $variant:ident ( $payload:ty ) ),+ $(,)? }) => {
        impl $crate::Reflected for $ty {
            fn build_descriptor() -> $crate::TypeDescriptor {
                $crate::UnionBuilder::<$ty>::new()
                    $( .case($key, <$ty>::$variant as fn($payload) -> $ty) )+
                    .build()
            }
        }
    };
}
