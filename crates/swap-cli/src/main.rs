//! Swap rates CLI
//!
//! Command-line tool for inspecting terminal swap-rate exports and aligning
//! them into date-by-maturity tables.

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use swap_core::{
    align_with, parse_csv, run_job, scan_directory, write_table, AlignJob, AlignMode, AlignOptions,
    AlignedTable, Currency, CurveSet, DateFormats, ExportFormat, JobInput, MaturityMapping,
    RawSchema,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "swap-cli")]
#[command(about = "Align swap-rate exports by maturity", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in curve sets
    Curves {
        /// Only show this currency (gbp, eur, usd)
        #[arg(short, long)]
        currency: Option<String>,

        /// Print mappings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the instruments found in an export
    Inspect {
        /// Path to CSV export
        #[arg(short, long)]
        file: PathBuf,

        /// Explicit chrono date format
        #[arg(long)]
        date_format: Option<String>,
    },

    /// Align an export into one column per maturity
    Align {
        /// Path to CSV export
        #[arg(short, long)]
        file: PathBuf,

        /// Built-in curve set (e.g. usd_ts_7_mat)
        #[arg(short, long, conflicts_with = "mapping", required_unless_present = "mapping")]
        curve: Option<String>,

        /// Custom mapping file (JSON array of {ticker, maturity})
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// Alignment mode (strict or legacy)
        #[arg(long, default_value = "strict")]
        mode: String,

        /// Output format (csv or json)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Output file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum number of rows to print to stdout
        #[arg(short, long, conflicts_with = "output")]
        limit: Option<usize>,

        /// Explicit chrono date format
        #[arg(long)]
        date_format: Option<String>,
    },

    /// Scan directories for exports and report which curve sets they cover
    Scan {
        /// Root directories to scan
        #[arg(short, long, required = true)]
        root: Vec<PathBuf>,
    },

    /// Run a batch job file
    Batch {
        /// Path to job file (JSON)
        #[arg(short, long)]
        job: PathBuf,
    },

    /// Create a job file template
    CreateJob {
        /// Output path for the job file
        #[arg(short, long)]
        output: PathBuf,

        /// Output directory for aligned tables
        #[arg(long)]
        export_dir: PathBuf,

        /// Inputs to include (path:curve_set)
        #[arg(short, long)]
        input: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();
}

fn run(command: Commands) -> swap_core::Result<()> {
    match command {
        Commands::Curves { currency, json } => cmd_curves(currency.as_deref(), json),
        Commands::Inspect { file, date_format } => cmd_inspect(&file, date_formats(date_format)),
        Commands::Align {
            file,
            curve,
            mapping,
            mode,
            format,
            output,
            limit,
            date_format,
        } => {
            let mapping = load_mapping(curve.as_deref(), mapping.as_deref())?;
            let options = AlignOptions {
                mode: mode.parse::<AlignMode>()?,
                date_formats: date_formats(date_format),
            };
            cmd_align(&file, &mapping, &options, format.parse()?, output.as_deref(), limit)
        }
        Commands::Scan { root } => cmd_scan(&root),
        Commands::Batch { job } => cmd_batch(&job),
        Commands::CreateJob {
            output,
            export_dir,
            input,
        } => cmd_create_job(&output, &export_dir, &input),
    }
}

fn date_formats(explicit: Option<String>) -> DateFormats {
    explicit.map(DateFormats::single).unwrap_or_default()
}

fn load_mapping(curve: Option<&str>, mapping: Option<&Path>) -> swap_core::Result<MaturityMapping> {
    match (curve, mapping) {
        (Some(name), _) => name.parse::<CurveSet>()?.mapping(),
        (None, Some(path)) => MaturityMapping::load(path),
        (None, None) => Err(swap_core::Error::EmptyMapping),
    }
}

fn cmd_curves(currency: Option<&str>, json: bool) -> swap_core::Result<()> {
    let currency = currency.map(str::parse::<Currency>).transpose()?;
    let sets: Vec<CurveSet> = CurveSet::all()
        .into_iter()
        .filter(|s| currency.is_none_or(|c| s.currency == c))
        .collect();

    if json {
        let mut out = serde_json::Map::new();
        for set in &sets {
            out.insert(set.to_string(), serde_json::to_value(set.mapping()?)?);
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for set in &sets {
        let mapping = set.mapping()?;
        let labels: Vec<&str> = mapping.entries().iter().map(|e| e.maturity.label()).collect();
        let maturities = mapping.maturities();
        let (shortest, longest) = (
            maturities.first().map_or(0.0, |m| m.years()),
            maturities.last().map_or(0.0, |m| m.years()),
        );
        println!(
            "{} ({} maturities, {:.2}y to {:.0}y)",
            set,
            mapping.len(),
            shortest,
            longest
        );
        println!("  {}", labels.join(" "));
    }

    Ok(())
}

fn cmd_inspect(file: &Path, formats: DateFormats) -> swap_core::Result<()> {
    let table = parse_csv(file)?;
    let schema = RawSchema::from_table(&table)?;

    println!("File: {}", file.display());
    println!("Columns: {}", table.column_count());
    println!("Rows: {}", table.row_count());
    println!("Instruments: {}", schema.len());
    println!();

    println!("{:<14}\t{:>6}\t{:<10}\t{:<10}", "ticker", "obs", "first", "last");
    println!("{}", "-".repeat(48));
    for instrument in &schema.instruments {
        let series = schema.series(&table, instrument, &formats)?;
        let (first, last) = match series.date_range() {
            Some((f, l)) => (f.to_string(), l.to_string()),
            None => (String::new(), String::new()),
        };
        println!(
            "{:<14}\t{:>6}\t{:<10}\t{:<10}",
            instrument.ticker,
            series.len(),
            first,
            last
        );
    }

    let covered: Vec<String> = CurveSet::all()
        .into_iter()
        .filter_map(|set| match set.mapping() {
            Ok(mapping) if schema.covers(&mapping) => Some(set.to_string()),
            _ => None,
        })
        .collect();
    println!();
    if covered.is_empty() {
        println!("Covers no built-in curve set");
    } else {
        println!("Covers: {}", covered.join(", "));
    }

    Ok(())
}

fn cmd_align(
    file: &Path,
    mapping: &MaturityMapping,
    options: &AlignOptions,
    format: ExportFormat,
    output: Option<&Path>,
    limit: Option<usize>,
) -> swap_core::Result<()> {
    let raw = parse_csv(file)?;
    let aligned = align_with(&raw, mapping, options)?;

    match output {
        Some(path) => {
            swap_core::export_table(&aligned, format, path)?;
            println!(
                "Exported {} rows x {} columns to {}",
                aligned.row_count(),
                aligned.column_count(),
                path.display()
            );
        }
        None => {
            let shown = match limit {
                Some(n) if n < aligned.row_count() => AlignedTable {
                    rows: aligned.rows[..n].to_vec(),
                    ..aligned.clone()
                },
                _ => aligned.clone(),
            };
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_table(&shown, format, &mut handle)?;
            if shown.row_count() < aligned.row_count() {
                writeln!(handle, "... ({} more rows)", aligned.row_count() - shown.row_count())?;
            }
        }
    }

    Ok(())
}

fn cmd_scan(roots: &[PathBuf]) -> swap_core::Result<()> {
    let result = scan_directory(roots)?;

    println!("Scanned {} root(s):", result.roots.len());
    for root in &result.roots {
        println!("  {}", root.display());
    }
    println!();
    println!(
        "Found {} CSV files ({} exports, {} skipped)",
        result.total_files(),
        result.exports.len(),
        result.skipped.len()
    );
    println!();

    for export in &result.exports {
        let sets: Vec<String> = export.curve_sets.iter().map(|s| s.to_string()).collect();
        println!(
            "{} ({} instruments, {} rows)",
            export.path.display(),
            export.tickers.len(),
            export.rows
        );
        if sets.is_empty() {
            println!("  no built-in curve set");
        } else {
            println!("  {}", sets.join(", "));
        }
    }

    if !result.skipped.is_empty() {
        println!("\nSkipped:");
        for (path, err) in &result.skipped {
            println!("  {}: {}", path.display(), err);
        }
    }

    Ok(())
}

fn cmd_batch(job_path: &Path) -> swap_core::Result<()> {
    let job = AlignJob::load(job_path)?;

    println!("Running job with {} inputs", job.inputs.len());
    println!("Mode: {}", job.mode);
    println!("Output: {} ({})", job.output_dir.display(), job.format);
    println!();

    let report = run_job(&job)?;
    info!(written = report.written.len(), errors = report.errors.len(), "job finished");

    for (path, rows) in &report.written {
        println!("  {} ({} rows)", path.display(), rows);
    }

    println!();
    println!("Job complete:");
    println!("  {} files written", report.written.len());
    println!("  {} total rows", report.total_rows());

    if !report.errors.is_empty() {
        println!("\nErrors ({}):", report.errors.len());
        for (path, err) in &report.errors {
            println!("  {}: {}", path.display(), err);
        }
    }

    Ok(())
}

fn cmd_create_job(output: &Path, export_dir: &Path, inputs: &[String]) -> swap_core::Result<()> {
    let mut job = AlignJob {
        output_dir: export_dir.to_path_buf(),
        mode: AlignMode::Strict,
        format: ExportFormat::Csv,
        date_format: None,
        inputs: Vec::new(),
    };

    // Parse inputs: "path:curve_set"
    for spec in inputs {
        let Some((path, curve)) = spec.rsplit_once(':') else {
            eprintln!("Warning: Invalid input '{}', expected 'path:curve_set'", spec);
            continue;
        };
        let curve: CurveSet = match curve.parse() {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Warning: {}", e);
                continue;
            }
        };

        let path = PathBuf::from(path);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "export".to_string());
        job.inputs.push(JobInput {
            output: PathBuf::from(format!("{}_{}.csv", stem, curve)),
            path,
            curve: Some(curve),
            mapping: None,
        });
    }

    // If no inputs provided, add a placeholder
    if job.inputs.is_empty() {
        job.inputs.push(JobInput {
            path: PathBuf::from("usd_export.csv"),
            curve: Some(CurveSet::new(Currency::Usd, swap_core::TermStructure::SevenMaturities)),
            mapping: None,
            output: PathBuf::from("usd_ts_7_mat.csv"),
        });
    }

    job.save(output)?;
    println!("Created job file: {}", output.display());
    println!("Inputs: {}", job.inputs.len());
    println!();
    println!("Edit the file to configure your job, then run:");
    println!("  swap-cli batch --job {}", output.display());

    Ok(())
}
