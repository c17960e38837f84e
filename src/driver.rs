//! Runs every migration pass over one project folder.
//!
//! Files are taken from the top level of the folder only, sorted by name, and
//! processed solutions first, then projects, then C++ sources.  All projects
//! share one [`MigrationContext`], so the order is part of the result.  A file
//! is written only when its content changed.

use std::borrow::Cow;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::MigrateError;
use crate::profile::MigrationProfile;
use crate::rules::ReplacementRuleSet;
use crate::solution;
use crate::sources::{self, SourceEncoding};
use crate::vcxproj::{MigrationContext, Vcxproj};

/// File name of the rule set inside the resource directory.
pub const RULE_SET_FILE: &str = "replacements.json";

// ═══════════════════════════════════════════════════════════════════════════════
//  Resources
// ═══════════════════════════════════════════════════════════════════════════════

/// Inputs shipped next to the tool rather than taken from the target folder.
#[derive(Debug, Clone)]
pub struct Resources {
    pub rules: ReplacementRuleSet,
    /// Contents of the auxiliary header copied into projects that lack one.
    pub target_version_template: String,
}

impl Resources {
    /// Load `replacements.json` and the header template from `dir`.
    pub fn load(dir: impl AsRef<Path>, profile: &MigrationProfile) -> Result<Self, MigrateError> {
        let dir = dir.as_ref();
        let rules = ReplacementRuleSet::load(dir.join(RULE_SET_FILE))?;

        let template = dir.join(&profile.target_version_header);
        let target_version_template =
            std::fs::read_to_string(&template).map_err(|source| MigrateError::ResourceRead {
                path: template.clone(),
                source,
            })?;

        debug!("loaded {} replacement rules from {}", rules.len(), dir.display());
        Ok(Self { rules, target_version_template })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  File classification
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `*.sln`
    Solution,
    /// `*.vcxproj`
    Project,
    /// `*.cpp`, `*.h`
    Source,
}

impl FileKind {
    /// Classify by extension, ignoring ASCII case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("sln") {
            Some(Self::Solution)
        } else if ext.eq_ignore_ascii_case("vcxproj") {
            Some(Self::Project)
        } else if ext.eq_ignore_ascii_case("cpp") || ext.eq_ignore_ascii_case("h") {
            Some(Self::Source)
        } else {
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  RunReport
// ═══════════════════════════════════════════════════════════════════════════════

/// Outcome of [`Migrator::run`].
#[derive(Debug, Default)]
pub struct RunReport {
    /// Files rewritten (or that would be, in a dry run).
    pub changed: Vec<PathBuf>,
    /// Files created from a template.
    pub created: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    /// Files that could not be read, parsed or written.
    pub failures: Vec<MigrateError>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Migrator
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct Migrator {
    profile: MigrationProfile,
    resources: Resources,
    context: MigrationContext,
    dry_run: bool,
}

impl Migrator {
    pub fn new(profile: MigrationProfile, resources: Resources) -> Self {
        Self {
            profile,
            resources,
            context: MigrationContext::new(),
            dry_run: false,
        }
    }

    /// Report what would change without writing anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Rename guard state after the projects seen so far.
    pub fn context(&self) -> &MigrationContext {
        &self.context
    }

    /// Migrate every matching file directly inside `dir`.
    ///
    /// Only a failure to list `dir` is returned as an error; per-file
    /// problems are collected in [`RunReport::failures`].
    pub fn run(&mut self, dir: impl AsRef<Path>) -> Result<RunReport, MigrateError> {
        let dir = dir.as_ref();
        let files = list_files(dir)?;
        let mut report = RunReport::default();

        for kind in [FileKind::Solution, FileKind::Project, FileKind::Source] {
            for path in files.iter().filter(|p| FileKind::from_path(p) == Some(kind)) {
                let outcome = match kind {
                    FileKind::Solution => self.migrate_solution(path),
                    FileKind::Project => self.migrate_project(path),
                    FileKind::Source => self.migrate_source(path),
                };
                match outcome {
                    Ok(true) => {
                        info!("{} {}", self.verb(), path.display());
                        report.changed.push(path.clone());
                    }
                    Ok(false) => {
                        debug!("unchanged {}", path.display());
                        report.unchanged.push(path.clone());
                    }
                    Err(err) => {
                        warn!("skipped: {err}");
                        report.failures.push(err);
                    }
                }
            }
        }

        self.ensure_target_version_header(dir, &files, &mut report);

        info!(
            "{} changed, {} created, {} unchanged, {} failed",
            report.changed.len(),
            report.created.len(),
            report.unchanged.len(),
            report.failures.len()
        );
        Ok(report)
    }

    fn migrate_solution(&self, path: &Path) -> Result<bool, MigrateError> {
        let text = read(path)?;
        let migrated = solution::migrate_solution(&text, &self.profile);
        self.write_if_changed(path, &text, &migrated)
    }

    fn migrate_project(&mut self, path: &Path) -> Result<bool, MigrateError> {
        let text = read(path)?;
        let project_error = |source| MigrateError::Project { path: path.to_path_buf(), source };

        let mut project = Vcxproj::parse(text).map_err(project_error)?;
        let summary = project
            .migrate(&mut self.context, &self.profile)
            .map_err(project_error)?;
        debug!(
            "{}: {} renamed, {} removed, {} conditions retargeted",
            path.display(),
            summary.renamed.len(),
            summary.removed,
            summary.retargeted_conditions
        );

        if !summary.changed {
            return Ok(false);
        }
        self.write(path, &project.to_file_contents())?;
        Ok(true)
    }

    fn migrate_source(&self, path: &Path) -> Result<bool, MigrateError> {
        let bytes = std::fs::read(path).map_err(|source| MigrateError::io(path, source))?;
        let (text, encoding) = sources::decode_source(bytes);
        if encoding == SourceEncoding::Latin1 {
            debug!("{} is not UTF-8; editing it byte for byte", path.display());
        }
        let mut body = sources::migrate_source(&text, &self.resources.rules);

        if sources::is_precompiled_header(path, &self.profile) {
            if let Some(flagged) = sources::insert_feature_flag(&body, &self.profile.feature_flag) {
                body = Cow::Owned(flagged);
            }
        }

        if body == text {
            return Ok(false);
        }
        let contents = sources::encode_source(&body, encoding)
            .ok_or_else(|| MigrateError::Encoding { path: path.to_path_buf() })?;
        self.write(path, contents)?;
        Ok(true)
    }

    /// Create the auxiliary header from the template unless the folder
    /// already has one (under any capitalisation).
    fn ensure_target_version_header(&self, dir: &Path, files: &[PathBuf], report: &mut RunReport) {
        let name = self.profile.target_version_header.as_str();
        let exists = files.iter().any(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        });
        if exists {
            return;
        }

        let path = dir.join(name);
        if !self.dry_run {
            let created = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .and_then(|mut file| {
                    file.write_all(self.resources.target_version_template.as_bytes())
                });
            if let Err(source) = created {
                let err = MigrateError::io(&path, source);
                warn!("skipped: {err}");
                report.failures.push(err);
                return;
            }
        }
        info!("{} {}", if self.dry_run { "would create" } else { "created" }, path.display());
        report.created.push(path);
    }

    // ─── IO ──────────────────────────────────────────────────────────────

    fn write_if_changed(&self, path: &Path, original: &str, migrated: &str) -> Result<bool, MigrateError> {
        if original == migrated {
            return Ok(false);
        }
        self.write(path, migrated)?;
        Ok(true)
    }

    fn write(&self, path: &Path, contents: impl AsRef<[u8]>) -> Result<(), MigrateError> {
        if self.dry_run {
            return Ok(());
        }
        std::fs::write(path, contents).map_err(|source| MigrateError::io(path, source))
    }

    fn verb(&self) -> &'static str {
        if self.dry_run { "would update" } else { "updated" }
    }
}

fn read(path: &Path) -> Result<String, MigrateError> {
    std::fs::read_to_string(path).map_err(|source| MigrateError::io(path, source))
}

/// Regular files directly inside `dir`, sorted by path.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>, MigrateError> {
    let mut files = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|source| MigrateError::io(dir, source))?;
    for entry in entries {
        let entry = entry.map_err(|source| MigrateError::io(dir, source))?;
        let is_file = entry
            .file_type()
            .map_err(|source| MigrateError::io(entry.path(), source))?
            .is_file();
        if is_file {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const STDAFX_H: &str = "// stdafx.h : include file for standard system include files\r\n\
                            #pragma once\r\n\
                            #include \"C:\\Program Files (x86)\\Rhino 5.0 x64 SDK\\Inc\\RhinoSdkStdafxPreamble.h\"\r\n";

    fn migrator() -> Migrator {
        let profile = MigrationProfile::default();
        let resources = Resources::load("resources", &profile).unwrap();
        Migrator::new(profile, resources)
    }

    fn plugin_folder() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::copy("example.vcxproj", dir.path().join("SamplePlugIn.vcxproj")).unwrap();
        std::fs::copy("example.sln", dir.path().join("SamplePlugIn.sln")).unwrap();
        std::fs::write(dir.path().join("stdafx.h"), STDAFX_H).unwrap();
        std::fs::write(dir.path().join("stdafx.cpp"), "#include \"stdafx.h\"\r\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "Win32 PseudoDebug").unwrap();
        dir
    }

    fn read(dir: &TempDir, name: &str) -> String {
        std::fs::read_to_string(dir.path().join(name)).unwrap()
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn file_kinds_by_extension() {
        assert_eq!(FileKind::from_path(Path::new("a.SLN")), Some(FileKind::Solution));
        assert_eq!(FileKind::from_path(Path::new("a.vcxproj")), Some(FileKind::Project));
        assert_eq!(FileKind::from_path(Path::new("a.Cpp")), Some(FileKind::Source));
        assert_eq!(FileKind::from_path(Path::new("a.h")), Some(FileKind::Source));
        assert_eq!(FileKind::from_path(Path::new("a.vcxproj.filters")), None);
        assert_eq!(FileKind::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn migrates_plugin_folder() {
        let dir = plugin_folder();
        let report = migrator().run(dir.path()).unwrap();

        assert!(report.is_success(), "{:?}", report.failures);
        assert_eq!(names(&report.changed), ["SamplePlugIn.sln", "SamplePlugIn.vcxproj", "stdafx.h"]);
        assert_eq!(names(&report.unchanged), ["stdafx.cpp"]);
        assert_eq!(names(&report.created), ["targetver.h"]);

        let project = read(&dir, "SamplePlugIn.vcxproj");
        assert!(project.starts_with('\u{feff}'));
        assert!(project.contains("ToolsVersion=\"14.0\""));
        assert!(project.contains("<ClInclude Include=\"targetver.h\" />"));

        let solution = read(&dir, "SamplePlugIn.sln");
        assert!(!solution.contains("Win32"));
        assert!(solution.contains("DebugRhino|x64"));

        assert_eq!(
            read(&dir, "stdafx.h"),
            "// stdafx.h : include file for standard system include files\r\n\
             #pragma once\r\n\
             #define RHINO_V6_READY\r\n\
             #include \"RhinoSdkStdafxPreamble.h\"\r\n"
        );
        assert_eq!(
            read(&dir, "targetver.h"),
            std::fs::read_to_string("resources/targetver.h").unwrap()
        );
        // Files without a known extension are left alone.
        assert_eq!(read(&dir, "notes.txt"), "Win32 PseudoDebug");
    }

    #[test]
    fn second_run_changes_nothing() {
        let dir = plugin_folder();
        migrator().run(dir.path()).unwrap();

        let report = migrator().run(dir.path()).unwrap();
        assert!(report.is_success());
        assert!(report.changed.is_empty(), "{:?}", report.changed);
        assert!(report.created.is_empty());
        // targetver.h is a source file too by now.
        assert_eq!(report.unchanged.len(), 5);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = plugin_folder();
        let before = read(&dir, "SamplePlugIn.vcxproj");

        let report = migrator().dry_run(true).run(dir.path()).unwrap();
        assert_eq!(report.changed.len(), 3);
        assert_eq!(names(&report.created), ["targetver.h"]);
        assert_eq!(read(&dir, "SamplePlugIn.vcxproj"), before);
        assert_eq!(read(&dir, "stdafx.h"), STDAFX_H);
        assert!(!dir.path().join("targetver.h").exists());
    }

    #[test]
    fn existing_target_version_header_is_kept() {
        let dir = plugin_folder();
        std::fs::write(dir.path().join("TargetVer.h"), "// mine\r\n").unwrap();

        let report = migrator().run(dir.path()).unwrap();
        assert!(report.created.is_empty());
        assert_eq!(read(&dir, "TargetVer.h"), "// mine\r\n");
    }

    #[test]
    fn broken_project_does_not_stop_the_run() {
        let dir = plugin_folder();
        std::fs::write(dir.path().join("Broken.vcxproj"), "<Project><ItemGroup></Project>").unwrap();

        let report = migrator().run(dir.path()).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(!report.failures[0].is_fatal());
        assert!(matches!(report.failures[0], MigrateError::Project { .. }));
        assert!(names(&report.changed).contains(&"SamplePlugIn.vcxproj".to_string()));
        assert_eq!(read(&dir, "Broken.vcxproj"), "<Project><ItemGroup></Project>");
    }

    #[test]
    fn ansi_header_is_migrated_byte_for_byte() {
        let dir = TempDir::new().unwrap();
        let mut header = b"// Caf\xe9 plug-in\r\n#pragma once\r\n".to_vec();
        header.extend_from_slice(
            b"#include \"C:\\Program Files (x86)\\Rhino 5.0 x64 SDK\\Inc\\RhinoSdkStdafxPreamble.h\"\r\n",
        );
        std::fs::write(dir.path().join("stdafx.h"), &header).unwrap();
        std::fs::write(dir.path().join("plain.cpp"), b"int caf\xe9;\n").unwrap();

        let report = migrator().run(dir.path()).unwrap();
        assert!(report.is_success(), "{:?}", report.failures);
        assert_eq!(names(&report.changed), ["stdafx.h"]);
        assert_eq!(names(&report.unchanged), ["plain.cpp"]);
        assert_eq!(
            std::fs::read(dir.path().join("stdafx.h")).unwrap(),
            b"// Caf\xe9 plug-in\r\n#pragma once\r\n#define RHINO_V6_READY\r\n#include \"RhinoSdkStdafxPreamble.h\"\r\n"
        );
        assert_eq!(std::fs::read(dir.path().join("plain.cpp")).unwrap(), b"int caf\xe9;\n");
    }

    #[test]
    fn ansi_source_refuses_wide_replacement() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("old.cpp"), b"// \xe9 OLD\n").unwrap();
        std::fs::write(dir.path().join("targetver.h"), "#pragma once\n").unwrap();
        let resources = Resources {
            rules: ReplacementRuleSet::from_json(r#"{"OLD": "\u2713"}"#).unwrap(),
            target_version_template: String::new(),
        };

        let report = Migrator::new(MigrationProfile::default(), resources)
            .run(dir.path())
            .unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0], MigrateError::Encoding { .. }));
        assert_eq!(std::fs::read(dir.path().join("old.cpp")).unwrap(), b"// \xe9 OLD\n");
    }

    #[test]
    fn rename_guard_carries_across_projects() {
        let dir = TempDir::new().unwrap();
        let project = |configs: &[&str]| {
            let mut xml = String::from("<Project ToolsVersion=\"14.0\">\n  <ItemGroup>\n");
            for c in configs {
                xml.push_str(&format!("    <ProjectConfiguration Include=\"{c}\" />\n"));
            }
            xml.push_str("  </ItemGroup>\n  <RhinoSdkPath />\n</Project>\n");
            xml
        };
        // Sorted order: A, B, C.
        std::fs::write(dir.path().join("A.vcxproj"), project(&["Debug|x64"])).unwrap();
        std::fs::write(dir.path().join("B.vcxproj"), project(&["DebugRhino|x64"])).unwrap();
        std::fs::write(dir.path().join("C.vcxproj"), project(&["Debug|x64"])).unwrap();

        let mut migrator = migrator();
        let report = migrator.run(dir.path()).unwrap();

        assert!(report.is_success());
        assert!(!migrator.context().rename_in_progress());
        assert!(read(&dir, "A.vcxproj").contains("Include=\"DebugRhino|x64\""));
        assert!(read(&dir, "C.vcxproj").contains("Include=\"Debug|x64\""));
        assert_eq!(names(&report.changed), ["A.vcxproj"]);
    }

    #[test]
    fn missing_resources_are_fatal() {
        let dir = TempDir::new().unwrap();
        let err = Resources::load(dir.path(), &MigrationProfile::default()).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, MigrateError::ResourceRead { .. }));
    }

    #[test]
    fn missing_template_is_fatal() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(RULE_SET_FILE), "{}").unwrap();
        let err = Resources::load(dir.path(), &MigrationProfile::default()).unwrap_err();
        assert!(matches!(err, MigrateError::ResourceRead { ref path, .. } if path.ends_with("targetver.h")));
    }

    #[test]
    fn malformed_rule_set_is_fatal() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(RULE_SET_FILE), "[1, 2]").unwrap();
        let err = Resources::load(dir.path(), &MigrationProfile::default()).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, MigrateError::RuleSet { .. }));
    }

    #[test]
    fn missing_folder_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = migrator().run(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, MigrateError::Io { .. }));
    }
}
