//! mvu-convert - CLI tool to convert MicroVu inspection programs for 1Factory.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use mvu_core::{validate_programs, Processor, ProgramBatch, ProgramOptions, Settings, Site};

/// Program file extension.
const PROGRAM_EXTENSION: &str = "iwp";

/// Convert MicroVu InSpec programs to report into 1Factory.
#[derive(Parser, Debug)]
#[command(name = "mvu-convert")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Program files or directories holding them
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Settings file
    #[arg(short, long, default_value = "Settings.ini")]
    settings: PathBuf,

    /// Initials recorded in the conversion comment
    #[arg(short, long)]
    initials: String,

    /// Operation number
    #[arg(long)]
    op: String,

    /// Revision letter
    #[arg(long)]
    rev: String,

    /// SmartProfile project name
    #[arg(long, default_value = "")]
    sp_project: String,

    /// Override the site from the settings file (CoonRapids or Anoka)
    #[arg(long)]
    site: Option<String>,

    /// Validate only, don't write output
    #[arg(long)]
    validate: bool,

    /// Output program summaries as JSON
    #[arg(long)]
    debug: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Expand directories to the program files below them, sorted by path.
fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = WalkDir::new(input)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_program_file(e.path()))
            .map(|e| e.into_path())
            .collect();
        found.sort();
        files.extend(found);
    }
    files
}

fn is_program_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PROGRAM_EXTENSION))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut settings = Settings::load(&args.settings)
        .with_context(|| format!("Failed to read settings {}", args.settings.display()))?;
    if let Some(site) = &args.site {
        settings.site = Site::from_setting(site);
    }
    info!("Site: {}", settings.site);

    let files = expand_inputs(&args.inputs);
    if files.is_empty() {
        anyhow::bail!("No .{} files found", PROGRAM_EXTENSION);
    }
    info!("Processing {} program(s)", files.len());

    let options = ProgramOptions::new(&args.op, &args.rev).with_smartprofile_project(&args.sp_project);
    let (mut batch, load_failures) = ProgramBatch::load(&files, &options);
    for failure in &load_failures {
        error!("{}", failure);
    }

    // Validate
    let validation = validate_programs(batch.programs(), &settings);

    for warning in &validation.warnings {
        warn!("{}", warning);
    }

    for err in &validation.errors {
        error!("{}", err);
    }

    // Debug output
    if args.debug {
        let summaries: Vec<_> = batch.programs().iter().map(|p| p.summary()).collect();
        let json = serde_json::to_string_pretty(&summaries)?;
        println!("{}", json);
        return Ok(());
    }

    if !validation.passed {
        anyhow::bail!("Validation failed");
    }

    // Validate-only mode
    if args.validate {
        info!("Validation passed");
        return Ok(());
    }

    let processor = Processor::from_settings(settings, &args.initials);
    let report = processor.process_batch(&mut batch);

    for path in &report.converted {
        info!("Generated: {}", path.display());
    }

    let failed = report.failures.len() + load_failures.len();
    if failed > 0 {
        anyhow::bail!("{} program(s) failed to convert", failed);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expand_inputs_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        let cell = dir.path().join("cell");
        std::fs::create_dir_all(&cell).unwrap();
        std::fs::write(cell.join("b.iwp"), "x").unwrap();
        std::fs::write(cell.join("a.IWP"), "x").unwrap();
        std::fs::write(cell.join("notes.txt"), "x").unwrap();
        let single = dir.path().join("single.iwp");

        let files = expand_inputs(&[dir.path().to_path_buf(), single.clone()]);
        assert_eq!(files, vec![cell.join("a.IWP"), cell.join("b.iwp"), single]);
    }

    #[test]
    fn test_is_program_file() {
        assert!(is_program_file(Path::new("part.iwp")));
        assert!(!is_program_file(Path::new("part.iwp.bak")));
        assert!(!is_program_file(Path::new("part")));
    }
}
