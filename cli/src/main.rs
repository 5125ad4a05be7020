use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hookshelf::config::{SiteConfig, DEFAULT_CONFIG_FILE};
use hookshelf::content::builder::{BuildReport, ContentBuilder};

/// Compile hook documents into validated content records.
#[derive(Parser, Debug)]
#[command(name = "hookshelf", version, about)]
struct Cli {
    /// Path to the configuration file (defaults to ./hookshelf.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile the collection and write data and assets
    Build {
        /// Fail the build when any document is invalid
        #[arg(long)]
        strict: bool,

        /// Keep previous output instead of cleaning it first
        #[arg(long)]
        no_clean: bool,
    },
    /// Validate every document without writing output
    Check,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "hookshelf=debug"
    } else {
        "hookshelf=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SiteConfig> {
    let config = SiteConfig::load(path).with_context(|| match path {
        Some(p) => format!("Failed to load configuration from '{}'", p.display()),
        None => format!("Failed to load configuration ({DEFAULT_CONFIG_FILE})"),
    })?;

    let base = path
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty());
    Ok(match base {
        Some(base) => config.with_base_dir(base),
        None => config,
    })
}

/// Returns `Ok(false)` when documents failed and the run should exit non-zero.
fn run(cli: Cli) -> Result<bool> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Build { strict, no_clean } => {
            config.strict |= strict;
            if no_clean {
                config.output.clean = false;
            }
            let strict = config.strict;

            let report = ContentBuilder::new(config).build().context("Build failed")?;
            if let Some(output) = &report.output {
                println!("Wrote {}", output.display());
            }
            print_summary(&report);
            // Outside strict mode failed documents are only excluded.
            Ok(!strict || report.is_success())
        }
        Command::Check => {
            let report = ContentBuilder::new(config).check().context("Check failed")?;
            print_summary(&report);
            Ok(report.is_success())
        }
    }
}

fn print_summary(report: &BuildReport) {
    println!(
        "{} record(s), {} asset(s), {} failure(s)",
        report.hooks.len(),
        report.assets,
        report.failures.len()
    );
    for failure in &report.failures {
        println!("  ✗ {}: {}", failure.document, failure.error);
    }
}
