use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use tracing::debug;

use vcxproj_migrate::driver::RULE_SET_FILE;
use vcxproj_migrate::{MigrationProfile, Migrator, Resources};

/// Migrate a Rhino 5 C++ plug-in folder (.sln, .vcxproj, .cpp, .h) to Rhino 6
#[derive(Parser, Debug)]
#[command(name = "vcxproj-migrate", version, about)]
#[command(after_help = "Files are rewritten in place. Run on a clean checkout or use --dry-run first.")]
pub struct Cli {
    /// Folder holding the plug-in's solution, project and sources
    pub path: Option<PathBuf>,

    /// Folder with replacements.json and the targetver.h template
    /// [default: next to the executable]
    #[arg(long, env = "VCXPROJ_MIGRATE_RESOURCES", value_name = "DIR")]
    pub resources: Option<PathBuf>,

    /// TOML file overriding the built-in Rhino 6 migration profile
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Report what would change without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(
        long,
        default_value = "info",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    pub log_level: String,
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    let Some(path) = cli.path else {
        Cli::command().print_help()?;
        println!();
        return Ok(ExitCode::SUCCESS);
    };
    if !path.is_dir() {
        bail!("{} is not a directory", path.display());
    }

    let profile = match &cli.profile {
        Some(file) => MigrationProfile::load(file)?,
        None => MigrationProfile::default(),
    };
    let resource_dir = resolve_resource_dir(cli.resources)?;
    debug!("resources from {}", resource_dir.display());
    let resources = Resources::load(&resource_dir, &profile)?;

    let report = Migrator::new(profile, resources)
        .dry_run(cli.dry_run)
        .run(&path)
        .with_context(|| format!("cannot migrate {}", path.display()))?;

    let verb = if cli.dry_run { "would change" } else { "changed" };
    println!(
        "{} files {verb}, {} created, {} unchanged",
        report.changed.len(),
        report.created.len(),
        report.unchanged.len()
    );
    for failure in &report.failures {
        eprintln!("error: {failure}");
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// `--resources` if given, otherwise the executable's folder, or its
/// `resources/` subfolder when that is where the rule set lives.
fn resolve_resource_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    let exe = std::env::current_exe().context("cannot locate the running executable")?;
    let exe_dir = exe.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(pick_resource_dir(exe_dir))
}

fn pick_resource_dir(exe_dir: PathBuf) -> PathBuf {
    let nested = exe_dir.join("resources");
    if !exe_dir.join(RULE_SET_FILE).is_file() && nested.join(RULE_SET_FILE).is_file() {
        nested
    } else {
        exe_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn path_is_optional() {
        let cli = Cli::try_parse_from(["vcxproj-migrate"]).unwrap();
        assert!(cli.path.is_none());
        assert!(!cli.dry_run);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "vcxproj-migrate",
            "--dry-run",
            "--profile",
            "rhino6.toml",
            "--resources",
            "res",
            "--log-level",
            "debug",
            "plugin",
        ])
        .unwrap();
        assert_eq!(cli.path, Some(PathBuf::from("plugin")));
        assert_eq!(cli.profile, Some(PathBuf::from("rhino6.toml")));
        assert_eq!(cli.resources, Some(PathBuf::from("res")));
        assert!(cli.dry_run);
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn rejects_unknown_log_level() {
        assert!(Cli::try_parse_from(["vcxproj-migrate", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn prefers_rule_set_next_to_executable() {
        let dir = tempfile::TempDir::new().unwrap();
        let exe_dir = dir.path().to_path_buf();
        assert_eq!(pick_resource_dir(exe_dir.clone()), exe_dir);

        std::fs::create_dir(exe_dir.join("resources")).unwrap();
        std::fs::write(exe_dir.join("resources").join(RULE_SET_FILE), "{}").unwrap();
        assert_eq!(pick_resource_dir(exe_dir.clone()), exe_dir.join("resources"));

        std::fs::write(exe_dir.join(RULE_SET_FILE), "{}").unwrap();
        assert_eq!(pick_resource_dir(exe_dir.clone()), exe_dir);
    }

    #[test]
    fn missing_folder_is_an_error() {
        let cli = Cli::try_parse_from(["vcxproj-migrate", "/definitely/not/here"]).unwrap();
        assert!(run(cli).is_err());
    }
}
