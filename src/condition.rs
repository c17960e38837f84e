//! Build identities and the MSBuild conditions that select them.
//!
//! Visual Studio gates per-configuration settings with conditions of one
//! fixed shape:
//!
//! ```text
//! '$(Configuration)|$(Platform)'=='Debug|x64'
//! ```
//!
//! The migration only ever needs to know whether a condition mentions one of
//! a handful of known identities, and to swap one identity for another, so
//! matching is literal substring containment rather than expression
//! evaluation.

use std::fmt;

/// Left-hand side of every configuration/platform condition.
const SELECTOR: &str = "'$(Configuration)|$(Platform)'";

// ═══════════════════════════════════════════════════════════════════════════════
//  BuildIdentity
// ═══════════════════════════════════════════════════════════════════════════════

/// A `(configuration, platform)` pair such as `Debug|x64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildIdentity {
    pub configuration: String,
    pub platform: String,
}

impl BuildIdentity {
    pub fn new(configuration: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            configuration: configuration.into(),
            platform: platform.into(),
        }
    }

    /// Split a `Name|Platform` key (the `Include` of a
    /// `<ProjectConfiguration>`).  Returns `None` when there is no `|`.
    pub fn parse(key: &str) -> Option<Self> {
        let (configuration, platform) = key.split_once('|')?;
        Some(Self::new(configuration, platform))
    }

    /// The full condition literal selecting this identity.
    pub fn predicate(&self) -> String {
        format!("{SELECTOR}=='{self}'")
    }

    /// `true` if `condition` contains this identity's condition literal.
    pub fn is_selected_by(&self, condition: &str) -> bool {
        condition.contains(&self.predicate())
    }
}

impl fmt::Display for BuildIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.configuration, self.platform)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Condition rewriting
// ═══════════════════════════════════════════════════════════════════════════════

/// Replace every occurrence of `from`'s condition literal in `condition` with
/// `to`'s.  Any surrounding expression (`and`/`or` clauses, whitespace) is
/// kept as-is.
pub fn retarget(condition: &str, from: &BuildIdentity, to: &BuildIdentity) -> String {
    condition.replace(&from.predicate(), &to.predicate())
}

/// Return the first identity in `candidates` selected by `condition`.
pub fn find_selected<'a>(
    condition: &str,
    candidates: impl IntoIterator<Item = &'a BuildIdentity>,
) -> Option<&'a BuildIdentity> {
    candidates.into_iter().find(|id| id.is_selected_by(condition))
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
