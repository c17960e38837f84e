pub mod condition;
pub mod driver;
pub mod error;
pub mod profile;
pub mod rules;
pub mod solution;
pub mod sources;
pub mod splice;
pub mod vcxproj;

pub use driver::{Migrator, Resources, RunReport};
pub use error::MigrateError;
pub use profile::MigrationProfile;
pub use rules::ReplacementRuleSet;
pub use vcxproj::{MigrationContext, Vcxproj};
