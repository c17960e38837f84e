//! Target values for a migration.
//!
//! Every name, version string and file name the migration rules look for or
//! write comes from a [`MigrationProfile`].  The default profile describes the
//! Rhino 5 → Rhino 6 move (VS2013 → VS2015 toolchain); a TOML file can
//! override any subset of the fields:
//!
//! ```toml
//! platform_toolset = "v141"
//! tools_version = "15.0"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::condition::BuildIdentity;
use crate::error::MigrateError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrationProfile {
    /// `ToolsVersion` stamped on the `<Project>` root.
    pub tools_version: String,
    /// `<PlatformToolset>` value stamped on configuration property groups.
    pub platform_toolset: String,

    /// Platform whose configurations are dropped (`Win32`).
    pub legacy_platform: String,
    /// Platform that survives the migration (`x64`).
    pub target_platform: String,

    /// Name of the debug configuration before migration (`Debug`).
    pub debug_configuration: String,
    /// Name the old debug configuration is renamed to (`DebugRhino`).
    pub migrated_debug_configuration: String,
    /// Placeholder configuration promoted to the canonical debug name
    /// (`PseudoDebug`).
    pub staging_debug_configuration: String,
    pub release_configuration: String,

    pub precompiled_source: String,
    pub precompiled_header: String,
    /// Auxiliary header registered in the project and created on disk.
    pub target_version_header: String,
    /// Preprocessor symbol defined in the precompiled header.
    pub feature_flag: String,

    pub sdk_version: String,
    pub sdk_version_macro: String,
    pub sdk_path_macro: String,
    /// Registry key holding the SDK `InstallPath`.  `$(<sdk_version_macro>)`
    /// references resolve at build time.
    pub sdk_registry_key: String,
    /// File name of the SDK property sheet imported by every configuration.
    pub property_sheet: String,
}

impl Default for MigrationProfile {
    fn default() -> Self {
        Self {
            tools_version: "14.0".into(),
            platform_toolset: "v140".into(),
            legacy_platform: "Win32".into(),
            target_platform: "x64".into(),
            debug_configuration: "Debug".into(),
            migrated_debug_configuration: "DebugRhino".into(),
            staging_debug_configuration: "PseudoDebug".into(),
            release_configuration: "Release".into(),
            precompiled_source: "stdafx.cpp".into(),
            precompiled_header: "stdafx.h".into(),
            target_version_header: "targetver.h".into(),
            feature_flag: "RHINO_V6_READY".into(),
            sdk_version: "6.0".into(),
            sdk_version_macro: "RhinoSdkVersion".into(),
            sdk_path_macro: "RhinoSdkPath".into(),
            sdk_registry_key: r"HKEY_LOCAL_MACHINE\SOFTWARE\McNeel\Rhinoceros\SDK\$(RhinoSdkVersion)"
                .into(),
            property_sheet: "Rhino.Cpp.PlugIn.props".into(),
        }
    }
}

impl MigrationProfile {
    /// Parse a profile from TOML source.  Missing keys keep their defaults.
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Load a profile from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MigrateError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| MigrateError::ResourceRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source).map_err(|source| MigrateError::Profile {
            path: path.to_path_buf(),
            source,
        })
    }

    // ─── Identities ──────────────────────────────────────────────────────

    /// `Debug|x64`: the debug configuration that gets renamed.
    pub fn debug_target(&self) -> BuildIdentity {
        BuildIdentity::new(&self.debug_configuration, &self.target_platform)
    }

    /// `DebugRhino|x64`: where [`debug_target`](Self::debug_target) ends up.
    pub fn migrated_debug_target(&self) -> BuildIdentity {
        BuildIdentity::new(&self.migrated_debug_configuration, &self.target_platform)
    }

    /// `PseudoDebug|x64`: promoted to [`debug_target`](Self::debug_target).
    pub fn staging_debug_target(&self) -> BuildIdentity {
        BuildIdentity::new(&self.staging_debug_configuration, &self.target_platform)
    }

    /// Identities whose conditional groups are deleted outright.
    pub fn legacy_identities(&self) -> [BuildIdentity; 3] {
        [
            BuildIdentity::new(&self.debug_configuration, &self.legacy_platform),
            BuildIdentity::new(&self.release_configuration, &self.legacy_platform),
            BuildIdentity::new(&self.staging_debug_configuration, &self.legacy_platform),
        ]
    }

    // ─── Generated MSBuild values ────────────────────────────────────────

    /// Registry lookup assigned to the SDK path macro.
    pub fn sdk_path_expression(&self) -> String {
        format!(
            "$([MSBuild]::GetRegistryValueFromView('{}', 'InstallPath', null, RegistryView.Registry64))",
            self.sdk_registry_key
        )
    }

    /// `Project` attribute of the property sheet import.
    pub fn property_sheet_import(&self) -> String {
        format!(
            "$({})PropertySheets\\{}",
            self.sdk_path_macro, self.property_sheet
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
