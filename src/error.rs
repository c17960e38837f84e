use std::path::PathBuf;

use thiserror::Error;

use crate::rules::RuleSetError;
use crate::vcxproj::VcxprojError;

/// Everything that can go wrong during a migration run.
///
/// Resource errors (rule set, header template, profile) abort the run before
/// any target file is touched; the rest are reported per file.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("cannot read resource {}: {source}", path.display())]
    ResourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rule set {} is malformed: {source}", path.display())]
    RuleSet {
        path: PathBuf,
        #[source]
        source: RuleSetError,
    },

    #[error("profile {} is malformed: {source}", path.display())]
    Profile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: edited text no longer fits the file's 8-bit encoding", path.display())]
    Encoding { path: PathBuf },

    #[error("{}: {source}", path.display())]
    Project {
        path: PathBuf,
        #[source]
        source: VcxprojError,
    },
}

impl MigrateError {
    /// `true` for errors that must stop the run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ResourceRead { .. } | Self::RuleSet { .. } | Self::Profile { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
