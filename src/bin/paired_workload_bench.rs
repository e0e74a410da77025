use clap::{Parser, Subcommand, ValueEnum};
use paired_workload_bench::driver::{CancelToken, Harness};
use paired_workload_bench::runner::RunConfig;
use paired_workload_bench::{catalog, HarnessError, Style};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Exit code for load-time and I/O errors.
const EXIT_HARNESS_ERROR: u8 = 2;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Format {
    #[default]
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Measure workloads and check every variant against the oracle.
    Run {
        /// Measured invocations per variant.
        #[arg(long, default_value_t = 1)]
        repetitions: u32,

        /// Discarded invocations per variant before measuring.
        #[arg(long, default_value_t = 0)]
        warmup: u32,

        /// Restrict the run to this workload. Can be provided multiple times.
        #[arg(long, value_name = "NAME", action = clap::ArgAction::Append)]
        workload: Vec<String>,

        /// Per-invocation timeout (`250ms`, `2s`, `1m`, or bare milliseconds).
        #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
        timeout: Option<Duration>,

        /// Measure independent workloads concurrently.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Stack size in MiB for timeout threads and parallel workers.
        #[arg(long, value_name = "MIB", default_value_t = 8)]
        stack_mib: usize,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// List the built-in workloads.
    List {
        /// Only workloads with a variant of this style.
        #[arg(long, value_enum)]
        style: Option<Style>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "paired-workload-bench")]
#[command(about = "Equivalence and timing comparison of paired workload variants")]
struct Args {
    /// Where to write the output. If omitted, prints to stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let (digits, unit) = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => raw.split_at(idx),
        None => (raw, "ms"),
    };
    let amount: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration `{raw}`"))?;
    match unit {
        "ms" => Ok(Duration::from_millis(amount)),
        "s" => Ok(Duration::from_secs(amount)),
        "m" => Ok(Duration::from_secs(amount * 60)),
        _ => Err(format!("unknown duration unit `{unit}` (ms|s|m)")),
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = std::env::var("PAIRBENCH_LOG")
        .ok()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn emit(out: Option<&PathBuf>, text: &str) -> Result<(), HarnessError> {
    match out {
        Some(path) => fs::write(path, text)?,
        None => println!("{text}"),
    }
    Ok(())
}

fn list(style: Option<Style>) -> String {
    let mut lines = Vec::new();
    for w in catalog::all() {
        let labels: Vec<&str> = w.labels().collect();
        if let Some(style) = style {
            if !labels.contains(&style.as_str()) {
                continue;
            }
        }
        let expected = w
            .expected()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "(first variant)".to_string());
        lines.push(format!("{:<24} {:<40} {}", w.name(), labels.join(","), expected));
    }
    lines.join("\n")
}

fn run(args: &Args) -> Result<u8, HarnessError> {
    match &args.cmd {
        Command::List { style } => {
            emit(args.out.as_ref(), &list(*style))?;
            Ok(0)
        }
        Command::Run {
            repetitions,
            warmup,
            workload,
            timeout,
            parallel,
            stack_mib,
            format,
        } => {
            let cfg = RunConfig {
                repetitions: *repetitions,
                warmup: *warmup,
                timeout: *timeout,
                parallel: *parallel,
                stack_size: stack_mib.saturating_mul(1024 * 1024),
            };

            let mut harness = Harness::new(cfg).select(workload.iter().cloned());
            harness.load(catalog::all())?;
            let report = harness.run(&CancelToken::new())?;

            let rendered = match format {
                Format::Json => report.to_json_pretty()?,
                Format::Text => report.render_text(),
            };
            emit(args.out.as_ref(), &rendered)?;
            Ok(report.exit_code())
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(EXIT_HARNESS_ERROR)
        }
    }
}
