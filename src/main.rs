// Fri Oct 16 2026 - Alex

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Instant;
use type_layout_resolver::{
    config::Config,
    layout::{LayoutEngine, LayoutReport},
    progress::{BarProgress, LogProgress, ProgressSink},
    resolution::{ResolutionEngine, ResolutionReport},
    store::TypeDatabase,
    utils::{format_duration, percentage, pluralize, LogTarget, LoggingUtils},
};

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Resolves decompiled type references and computes 32-bit x86 layouts", long_about = None)]
struct Args {
    /// Type database exported by the parser (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the updated database
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration; command line flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    skip_resolution: bool,

    #[arg(long)]
    skip_layout: bool,

    /// Unresolved references to keep for the report
    #[arg(long)]
    sample_limit: Option<usize>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(long)]
    no_progress: bool,

    #[arg(long)]
    print_layouts: bool,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path).with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::new(),
        };

        config = config.with_input(self.input);
        if let Some(output) = self.output {
            config = config.with_output(output);
        }
        if self.skip_resolution {
            config = config.without_resolution();
        }
        if self.skip_layout {
            config = config.without_layout();
        }
        if let Some(limit) = self.sample_limit {
            config = config.with_sample_limit(limit);
        }
        if self.verbose > 0 {
            config = config.with_verbosity(self.verbose);
        }
        if let Some(log_file) = self.log_file {
            config = config.with_log_file(log_file);
        }
        if self.no_progress {
            config = config.without_progress();
        }
        config.print_layouts |= self.print_layouts;

        config.validate()?;
        Ok(config)
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "[!]".red(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Args::parse().into_config()?;

    let target = LogTarget::select(config.log_file.as_deref());
    LoggingUtils::init(&target, LoggingUtils::level_from_verbosity(config.verbosity))
        .context("Failed to initialise logging")?;

    let start_time = Instant::now();
    let input = config.input.clone().context("No input database")?;

    println!("{} Loading type database: {}", "[*]".blue(), input.display());
    let database = TypeDatabase::load(&input).with_context(|| format!("Failed to read {}", input.display()))?;
    let mut store = database.into_store().context("Failed to ingest type database")?;
    println!("{} Loaded {}", "[+]".green(), pluralize(store.type_count(), "type", "types"));

    let mut progress: Box<dyn ProgressSink> = if config.enable_progress_bars {
        Box::new(BarProgress::new())
    } else {
        Box::new(LogProgress::new())
    };

    if config.run_resolution {
        let report = ResolutionEngine::with_sample_limit(config.diagnostic_sample_limit)
            .run(&mut store, Some(progress.as_mut()))
            .context("Resolution pass failed")?;
        print_resolution_summary(&report);
    }

    if config.run_layout {
        let engine = if config.print_layouts {
            LayoutEngine::new()
        } else {
            LayoutEngine::new().without_layouts()
        };
        let report = engine
            .run(&mut store, Some(progress.as_mut()))
            .context("Layout pass failed")?;
        print_layout_summary(&report, config.print_layouts);
    }

    if let Some(output) = &config.output {
        TypeDatabase::from_store(&store)
            .save(output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!("{} Database saved to: {}", "[+]".green(), output.display());
    }

    println!();
    println!("{}", "=".repeat(50).cyan());
    println!("{} Done in {}", "[+]".green(), format_duration(start_time.elapsed()));
    Ok(())
}

fn print_resolution_summary(report: &ResolutionReport) {
    let totals = report.totals();

    println!();
    println!("{}", "Resolution Summary".cyan().bold());
    println!("{}", "-".repeat(40).cyan());
    let linked = totals.resolved + totals.primitive;
    println!(
        "  Resolved: {} ({:.1}% linked)",
        totals.resolved.to_string().green(),
        percentage(linked, totals.total())
    );
    println!("  Primitive: {}", totals.primitive.to_string().green());
    let unresolved = totals.unresolved.to_string();
    println!(
        "  Unresolved: {}",
        if totals.unresolved == 0 { unresolved.green() } else { unresolved.yellow() }
    );
    println!("  References created: {}", report.references_created);

    if !report.samples.is_empty() {
        println!();
        println!("{}", "Unresolved samples:".yellow().bold());
        for sample in &report.samples {
            println!("  {} {} in {}", sample.type_string.cyan(), sample.edge_kind, sample.parent);
        }
    }
}

fn print_layout_summary(report: &LayoutReport, print_layouts: bool) {
    println!();
    println!("{}", "Layout Summary".cyan().bold());
    println!("{}", "-".repeat(40).cyan());
    println!("  Types laid out: {}", report.types_laid_out.to_string().green());
    println!("  Members placed: {}", report.members_placed.to_string().green());
    println!("  Bitfield members: {}", report.bitfield_members);
    let defaulted = report.defaulted_members.to_string();
    println!(
        "  Defaulted to 4 bytes: {}",
        if report.defaulted_members == 0 { defaulted.green() } else { defaulted.yellow() }
    );
    println!("  Ignored types: {}", report.ignored_types);
    println!("  Padding bytes: {}", report.padding_bytes);

    if print_layouts {
        println!();
        for layout in &report.layouts {
            println!("{}", layout);
        }
    }
}
