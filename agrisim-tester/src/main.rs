mod logic;
mod sources;

use agrisim_game::{
    CropKind, GeoPoint, HandoffState, HandoffStore, MemoryHandoffStore, RawDay, SeasonEngine,
    SeasonSetup, SimError, SupersedingFetcher, UpstreamRequest, fallback_series,
    parse_upstream_response, series_or_fallback,
};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{SeasonPlan, SeasonRecord, SeasonStrategy, resolve_seed_inputs, run_season};
use sources::{FileHandoffStore, FixedNameGeocoder, PowerClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "agrisim-tester", version = "0.1.0")]
#[command(
    about = "Headless season runner for Agrisim - plays scripted strategies and checks the engine"
)]
struct Args {
    /// Crop to plant
    #[arg(long, default_value = "maize")]
    crop: String,

    /// Number of simulated days
    #[arg(long, default_value_t = 30)]
    days: u32,

    /// Seeds to run (comma-separated numbers)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Strategies to run (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    strategies: String,

    /// List all available strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Field latitude in degrees
    #[arg(long, default_value_t = 41.9, allow_hyphen_values = true)]
    latitude: f64,

    /// Field longitude in degrees
    #[arg(long, default_value_t = 12.5, allow_hyphen_values = true)]
    longitude: f64,

    /// First day of the season (YYYY-MM-DD)
    #[arg(long, default_value = "2024-05-01")]
    start: String,

    /// Read the upstream weather response from a file instead of the network
    #[arg(long, conflicts_with = "fetch")]
    weather_file: Option<PathBuf>,

    /// Fetch weather from the upstream service
    #[arg(long)]
    fetch: bool,

    /// Upstream service endpoint
    #[arg(long, default_value = agrisim_game::upstream::DEFAULT_BASE_URL)]
    base_url: String,

    /// Display name for the field; coordinates are used when omitted
    #[arg(long)]
    location_name: Option<String>,

    /// Handoff file. Written by setup; reused as-is when no weather source is given.
    #[arg(long)]
    handoff: Option<PathBuf>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Skip the replay determinism check
    #[arg(long)]
    no_replay: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let crop = CropKind::parse_lossy(&args.crop);
    let strategies = expand_strategies(&args.strategies)?;
    let seed_tokens = split_csv(&args.seeds);
    let seeds = resolve_seed_inputs(&seed_tokens)?;

    let handoff = match &args.handoff {
        Some(path) => {
            let store = FileHandoffStore::new(path.clone());
            if reuse_existing_handoff(&args) {
                store
                    .require_handoff()
                    .with_context(|| format!("failed to load handoff from {}", path.display()))?
            } else {
                prepare_handoff(&args, crop, store).await?
            }
        }
        None => prepare_handoff(&args, crop, MemoryHandoffStore::new()).await?,
    };

    println!(
        "🌱 {} at {} for {} days",
        handoff.crop_kind.label().bright_green(),
        handoff.location_name,
        handoff.season_days().len()
    );

    let records = run_matrix(&args, &handoff, &strategies, &seeds);
    write_reports(&args, &records, start_time)?;

    if records.iter().any(|r| !r.passed()) {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn maybe_list_strategies(args: &Args) -> Result<bool> {
    if !args.list_strategies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available strategies:")?;
    for strategy in SeasonStrategy::ALL {
        writeln!(
            output_target.writer(),
            "  {:12} - {}",
            strategy.key(),
            strategy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🚜 Agrisim Season Runner".bright_cyan().bold());
    println!("{}", "========================".cyan());
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn expand_strategies(arg: &str) -> Result<Vec<SeasonStrategy>> {
    let mut strategies = Vec::new();
    for token in split_csv(arg) {
        if token.eq_ignore_ascii_case("all") {
            strategies.extend(SeasonStrategy::ALL);
            continue;
        }
        let Some(strategy) = SeasonStrategy::parse(&token) else {
            bail!("Unknown strategy: {token}");
        };
        strategies.push(strategy);
    }
    let mut seen = Vec::new();
    strategies.retain(|s| {
        if seen.contains(s) {
            false
        } else {
            seen.push(*s);
            true
        }
    });
    if strategies.is_empty() {
        strategies.extend(SeasonStrategy::ALL);
    }
    Ok(strategies)
}

fn reuse_existing_handoff(args: &Args) -> bool {
    args.weather_file.is_none()
        && !args.fetch
        && args.handoff.as_ref().is_some_and(|path| path.exists())
}

async fn prepare_handoff<S: HandoffStore>(
    args: &Args,
    crop: CropKind,
    store: S,
) -> Result<HandoffState> {
    let point = GeoPoint::new(args.latitude, args.longitude);
    let start = NaiveDate::parse_from_str(&args.start, "%Y-%m-%d")
        .with_context(|| format!("invalid --start date: {}", args.start))?;
    let request = UpstreamRequest::for_season(point, start, args.days);
    let raw_series = load_raw_series(args, &request).await?;

    let engine = SeasonEngine::new(store);
    let setup = SeasonSetup {
        crop,
        simulation_days: args.days,
        location: point,
        raw_series,
    };
    let geocoder = FixedNameGeocoder(args.location_name.clone());
    engine
        .prepare_season(setup, &geocoder)
        .context("failed to store handoff record")
}

async fn load_raw_series(args: &Args, request: &UpstreamRequest) -> Result<Vec<RawDay>> {
    let result = if let Some(path) = &args.weather_file {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        parse_upstream_response(&body)
    } else if args.fetch {
        let fetcher = SupersedingFetcher::new(PowerClient::with_base_url(args.base_url.clone()));
        fetcher.fetch(request.clone()).await.unwrap_or_else(|| {
            Err(SimError::UpstreamDataUnavailable(
                "request was superseded".to_string(),
            ))
        })
    } else {
        log::info!("no weather source given; using the generated series");
        return Ok(fallback_series(
            request.point(),
            request.start,
            request.span_days(),
        ));
    };

    let (series, notice) = series_or_fallback(result, request);
    if let Some(err) = notice {
        eprintln!("⚠️  {err}; continuing with generated weather");
    }
    Ok(series)
}

fn run_matrix(
    args: &Args,
    handoff: &HandoffState,
    strategies: &[SeasonStrategy],
    seeds: &[u64],
) -> Vec<SeasonRecord> {
    println!("{}", "🧪 Running Seasons".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let engine = SeasonEngine::new(MemoryHandoffStore::new());
    let mut records = Vec::with_capacity(strategies.len() * seeds.len());
    for &seed in seeds {
        for &strategy in strategies {
            let plan = SeasonPlan {
                strategy,
                seed,
                check_replay: !args.no_replay,
            };
            let record = run_season(handoff, engine.sim_config(), engine.weather_config(), &plan);
            if args.verbose {
                println!(
                    "{} {} {}",
                    if record.passed() { "✅" } else { "❌" },
                    strategy.label().bright_white(),
                    record.summary.result_line(record.crop, record.seed)
                );
            }
            records.push(record);
        }
    }
    records
}

fn write_reports(args: &Args, records: &[SeasonRecord], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report {
        ReportFormat::Json => logic::reports::generate_json_report(&mut output_target, records)?,
        ReportFormat::Markdown => {
            logic::reports::generate_markdown_report(&mut output_target, records)?;
        }
        ReportFormat::Console => {
            let duration = start_time.elapsed();
            logic::reports::generate_console_report(&mut output_target, records, duration)?;
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
