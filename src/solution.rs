//! Line filter for Visual Studio solution files (`.sln`).
//!
//! Solutions list every configuration/platform pair twice (solution level and
//! per project), one per line, so the migration is a plain line filter:
//! lines mentioning the legacy platform go, the staging configuration label is
//! renamed, and the file is rewritten with CRLF endings as Visual Studio
//! expects.

use crate::profile::MigrationProfile;

/// Migrate the contents of a `.sln` file.
///
/// - drops every line containing the legacy platform name (`Win32`, ASCII
///   case-insensitive);
/// - replaces the staging configuration label (`PseudoDebug`) with the
///   migrated debug label (`DebugRhino`);
/// - terminates every line with `\r\n`.
///
/// A leading byte-order mark stays in front of the first line.
pub fn migrate_solution(source: &str, profile: &MigrationProfile) -> String {
    let marker = profile.legacy_platform.to_ascii_lowercase();
    let staging = profile.staging_debug_configuration.as_str();
    let migrated = profile.migrated_debug_configuration.as_str();

    let mut body = String::with_capacity(source.len());
    for line in source.lines() {
        if line.to_ascii_lowercase().contains(&marker) {
            continue;
        }
        body.push_str(&line.replace(staging, migrated));
        body.push_str("\r\n");
    }
    body
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
