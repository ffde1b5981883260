//! Reification options and field-presence policy
//!
//! Presence policy layers four sources, each narrower scope overriding the
//! broader one: global defaults, call-site options, class-level directives,
//! member-level directives. The resolver is a pure function so the
//! precedence order is testable in isolation from the recursive reader.

/// Options recognized at call time.
///
/// Absent call-site options fall back to the engine's defaults
/// ([`crate::Reifier::with_defaults`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReifyOptions {
    /// Tolerate document keys that no member consumes
    pub allow_extra_fields: bool,
    /// Tolerate members whose key is absent from the document
    pub allow_missing_fields: bool,
    /// Compare document keys and member keys case-sensitively
    pub case_sensitive: bool,
}

impl Default for ReifyOptions {
    /// The shipped posture for hand-authored documents: unknown keys are
    /// reported, absent keys are tolerated, key matching ignores case.
    fn default() -> Self {
        ReifyOptions {
            allow_extra_fields: false,
            allow_missing_fields: true,
            case_sensitive: false,
        }
    }
}

impl ReifyOptions {
    /// Every check on: extras rejected, missing rejected, exact-case keys.
    pub fn strict() -> Self {
        ReifyOptions {
            allow_extra_fields: false,
            allow_missing_fields: false,
            case_sensitive: true,
        }
    }

    /// Every check off.
    pub fn lenient() -> Self {
        ReifyOptions {
            allow_extra_fields: true,
            allow_missing_fields: true,
            case_sensitive: false,
        }
    }
}

/// Presence directive attached to a member or a whole type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// The member must appear in the document, regardless of other settings
    Mandatory,
    /// The member may be absent, regardless of other settings
    AllowMissing,
}

/// Resolve whether a member must be present in the document.
///
/// Precedence: member directive > class directive > options. An explicit
/// member directive always wins; in particular a mandatory member is never
/// silenced by a broader allow-missing setting.
pub fn member_required(
    member: Option<Presence>,
    class: Option<Presence>,
    options: &ReifyOptions,
) -> bool {
    match member {
        Some(Presence::Mandatory) => true,
        Some(Presence::AllowMissing) => false,
        None => match class {
            Some(Presence::Mandatory) => true,
            Some(Presence::AllowMissing) => false,
            None => !options.allow_missing_fields,
        },
    }
}
