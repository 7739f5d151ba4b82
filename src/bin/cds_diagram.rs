//! CDS Diagram CLI
//!
//! Renders CDS schema files as Mermaid class diagrams.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use cds_diagrams::diagram::write_document;
use cds_diagrams::{DiagramConfig, DiagramError, DiagramRenderer, FsSource, RenderReport};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cds-diagram")]
#[command(about = "Render CDS schemas as Mermaid class diagrams")]
struct Cli {
    /// Configuration file (defaults to diagrams.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log every rendering step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one schema file
    Render {
        /// Schema file to render
        input: PathBuf,
        /// Output file (defaults to <stem>.md next to INPUT)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Directory searched for cross-file references
        #[arg(long)]
        search_dir: Option<PathBuf>,
        /// Omit the diagram title
        #[arg(long)]
        no_title: bool,
    },

    /// Render every schema file of a directory
    Batch {
        /// Directory holding the schema files
        dir: PathBuf,
        /// Where to write the `.md` documents (defaults to DIR)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Print the rendered model as JSON
    Inspect {
        /// Schema file to inspect
        input: PathBuf,
        /// Directory searched for cross-file references
        #[arg(long)]
        search_dir: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref().map(|p| p.to_string_lossy().into_owned());
    let mut config = DiagramConfig::load_from(config_path.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Render {
            input,
            output,
            search_dir,
            no_title,
        } => {
            if search_dir.is_some() {
                config.source.search_dir = search_dir;
            }
            if no_title {
                config.render.title = false;
            }

            let source = FsSource::new(config.source.convention);
            let renderer = DiagramRenderer::new(&source, config);
            let report = renderer.render_file(&input);
            print_diagnostics(&input, &report);

            let path = output.unwrap_or_else(|| input.with_file_name(document_name(&input)));
            write_document(&path, &report.document)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "Wrote {} ({} entities, {} relationships)",
                path.display(),
                report.entities.len(),
                report.edges.len()
            );
            Ok(())
        }

        Commands::Batch { dir, out_dir } => {
            if !dir.is_dir() {
                return Err(DiagramError::InvalidInput {
                    path: dir,
                    reason: "not a directory".to_string(),
                }
                .into());
            }
            let out_dir = out_dir.unwrap_or_else(|| dir.clone());
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;

            let source = FsSource::new(config.source.convention);
            let renderer = DiagramRenderer::new(&source, config);
            let reports = renderer.render_directory(&dir);
            if reports.is_empty() {
                println!("No schema files in {}", dir.display());
                return Ok(());
            }

            for (input, report) in &reports {
                print_diagnostics(input, report);
                let target = out_dir.join(document_name(input));
                write_document(&target, &report.document)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                println!("  {} -> {}", input.display(), target.display());
            }
            println!("Rendered {} file(s)", reports.len());
            Ok(())
        }

        Commands::Inspect { input, search_dir } => {
            if search_dir.is_some() {
                config.source.search_dir = search_dir;
            }

            let source = FsSource::new(config.source.convention);
            let renderer = DiagramRenderer::new(&source, config);
            let report = renderer.render_file(&input);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

/// `schema.cds` renders to `schema.md`
fn document_name(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(".cds").unwrap_or(&name);
    PathBuf::from(format!("{}.md", stem))
}

fn print_diagnostics(input: &Path, report: &RenderReport) {
    for diagnostic in report.diagnostics.iter() {
        eprintln!("{}: {}", input.display(), diagnostic);
    }
}
