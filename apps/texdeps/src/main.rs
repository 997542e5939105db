use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use texdeps_core::Collection;
use texdeps_report::{Config, ExportFormat, Exporter, TableExporter};

#[derive(Parser)]
#[command(name = "texdeps")]
#[command(about = "Collect and inspect the file dependencies of LaTeX documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the dependency tree of each root document
    Tree(Config),
    /// List every file each root document depends on
    List(Config),
    /// Print graph statistics for each root document
    Info(Config),
    /// Export the dependency graph of one root document
    Export(ExportArgs),
}

#[derive(Debug, Args)]
struct ExportArgs {
    #[command(flatten)]
    cfg: Config,

    /// Output format
    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    format: ExportFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn print_finished<W: Write>(writer: &mut W, start: Instant, collections: &[Collection]) -> Result<()> {
    let files: usize = collections.iter().map(|c| c.files.len()).sum();
    writeln!(
        writer,
        "\n{} Finished in {}ms on {} files from {} roots (using {} threads).",
        "●".bright_blue(),
        start.elapsed().as_millis().to_string().cyan(),
        files.to_string().cyan(),
        collections.len().to_string().cyan(),
        rayon::current_num_threads().to_string().cyan()
    )?;
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::Tree(mut cfg) => {
            let collections = texdeps_report::run_collection(&mut cfg)?;
            let mut missing = false;
            for collection in &collections {
                texdeps_report::print_tree(&mut stdout, collection)?;
                texdeps_report::print_status(&mut stdout, collection)?;
                missing |= collection.missing().next().is_some();
            }
            print_finished(&mut stdout, start, &collections)?;

            if missing {
                // Non-zero exit to fail CI
                std::process::exit(1);
            }
        }
        Commands::List(mut cfg) => {
            let collections = texdeps_report::run_collection(&mut cfg)?;
            for collection in &collections {
                TableExporter.export(&collection.root, &collection.files, &mut stdout)?;
                texdeps_report::print_warnings(&mut stdout, &collection.warnings)?;
                writeln!(stdout)?;
            }
            print_finished(&mut stdout, start, &collections)?;
        }
        Commands::Info(mut cfg) => {
            let collections = texdeps_report::run_collection(&mut cfg)?;
            for collection in &collections {
                let summary = texdeps_report::summarize(collection);
                texdeps_report::print_summary(&mut stdout, &summary)?;
                texdeps_report::print_warnings(&mut stdout, &collection.warnings)?;
                writeln!(stdout)?;
            }
            print_finished(&mut stdout, start, &collections)?;
        }
        Commands::Export(mut args) => {
            let collections = texdeps_report::run_collection(&mut args.cfg)?;
            let [collection] = collections.as_slice() else {
                bail!("export takes exactly one root document, got {}", collections.len());
            };

            info!("Exporting {} as {:?}", collection.root.path.display(), args.format);
            let exporter = args.format.exporter();
            match &args.output {
                Some(path) => {
                    let mut file = BufWriter::new(File::create(path)?);
                    exporter.export(&collection.root, &collection.files, &mut file)?;
                    file.flush()?;
                    writeln!(
                        stdout,
                        "{} Wrote {} files to {}",
                        "✓".green().bold(),
                        collection.files.len().to_string().cyan(),
                        path.display()
                    )?;
                }
                None => exporter.export(&collection.root, &collection.files, &mut stdout)?,
            }
            stdout.flush()?;
        }
    }

    Ok(())
}
