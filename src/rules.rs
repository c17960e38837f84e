//! Regex replacement rules for C++ sources.
//!
//! The rule set is a JSON object whose keys are regular expressions and whose
//! values are replacement strings, applied in document order:
//!
//! ```json
//! {
//!   "#include\\s+\"[^\"]*Rhino 5\\.0 x64 SDK\\\\Inc\\\\([^\"]+)\"": "#include \"$1\""
//! }
//! ```
//!
//! Replacement strings follow [`regex::Regex::replace_all`] syntax, so `$1`
//! and `${name}` refer to capture groups.

use std::borrow::Cow;
use std::path::Path;

use regex::Regex;
use thiserror::Error;

use crate::error::MigrateError;

#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object mapping patterns to replacements")]
    NotAnObject,

    #[error("replacement for `{pattern}` is not a string")]
    NonStringReplacement { pattern: String },

    #[error("pattern `{pattern}` does not compile: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ReplacementRule {
    pub pattern: Regex,
    pub replacement: String,
}

/// Ordered, compiled replacement rules.
#[derive(Debug, Clone, Default)]
pub struct ReplacementRuleSet {
    rules: Vec<ReplacementRule>,
}

impl ReplacementRuleSet {
    /// Parse and compile a rule set from JSON source.
    pub fn from_json(source: &str) -> Result<Self, RuleSetError> {
        let value: serde_json::Value = serde_json::from_str(source)?;
        let serde_json::Value::Object(map) = value else {
            return Err(RuleSetError::NotAnObject);
        };

        let mut rules = Vec::with_capacity(map.len());
        for (pattern, replacement) in map {
            let serde_json::Value::String(replacement) = replacement else {
                return Err(RuleSetError::NonStringReplacement { pattern });
            };
            let regex = Regex::new(&pattern)
                .map_err(|source| RuleSetError::Pattern { pattern: pattern.clone(), source })?;
            rules.push(ReplacementRule { pattern: regex, replacement });
        }

        Ok(Self { rules })
    }

    /// Load a rule set from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MigrateError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| MigrateError::ResourceRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&source).map_err(|source| MigrateError::RuleSet {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReplacementRule> {
        self.rules.iter()
    }

    /// Run every rule over `text` in order.  Borrows `text` back when no rule
    /// matched.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut body = Cow::Borrowed(text);
        for rule in &self.rules {
            let replaced = match rule.pattern.replace_all(&body, rule.replacement.as_str()) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(replaced) => replaced,
            };
            body = Cow::Owned(replaced);
        }
        body
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_document_order() {
        let rules = ReplacementRuleSet::from_json(r#"{"b": "c", "a": "b"}"#).unwrap();
        let patterns: Vec<&str> = rules.iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(patterns, ["b", "a"]);
        // `b` → `c` runs before `a` → `b`, so the new `b` survives.
        assert_eq!(rules.apply("ab"), "bc");
    }

    #[test]
    fn capture_groups_expand() {
        let rules = ReplacementRuleSet::from_json(
            r##"{"#include \"old/([a-z]+)\\.h\"": "#include \"new/$1.h\""}"##,
        )
        .unwrap();
        assert_eq!(
            rules.apply("#include \"old/widget.h\"\n"),
            "#include \"new/widget.h\"\n"
        );
    }

    #[test]
    fn unmatched_text_is_borrowed() {
        let rules = ReplacementRuleSet::from_json(r#"{"xyz": "abc"}"#).unwrap();
        assert!(matches!(rules.apply("nothing here"), Cow::Borrowed(_)));
    }

    #[test]
    fn empty_object_is_valid() {
        let rules = ReplacementRuleSet::from_json("{}").unwrap();
        assert!(rules.is_empty());
        assert_eq!(rules.apply("text"), "text");
    }

    #[test]
    fn rejects_non_object() {
        assert!(matches!(
            ReplacementRuleSet::from_json(r#"["a", "b"]"#),
            Err(RuleSetError::NotAnObject)
        ));
    }

    #[test]
    fn rejects_non_string_replacement() {
        let err = ReplacementRuleSet::from_json(r#"{"a": 1}"#).unwrap_err();
        assert!(matches!(err, RuleSetError::NonStringReplacement { ref pattern } if pattern == "a"));
    }

    #[test]
    fn rejects_bad_pattern() {
        let err = ReplacementRuleSet::from_json(r#"{"(unclosed": "x"}"#).unwrap_err();
        assert!(matches!(err, RuleSetError::Pattern { .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            ReplacementRuleSet::from_json("{"),
            Err(RuleSetError::Json(_))
        ));
    }

    #[test]
    fn bundled_rules_load() {
        let rules = ReplacementRuleSet::load("resources/replacements.json").unwrap();
        assert!(!rules.is_empty());
        let migrated = rules.apply(
            "#include \"C:\\Program Files (x86)\\Rhino 5.0 x64 SDK\\Inc\\RhinoSdkStdafxPreamble.h\"\r\n",
        );
        assert_eq!(migrated, "#include \"RhinoSdkStdafxPreamble.h\"\r\n");
    }

    #[test]
    fn load_missing_file_is_fatal() {
        let err = ReplacementRuleSet::load("resources/missing.json").unwrap_err();
        assert!(err.is_fatal());
    }
}
