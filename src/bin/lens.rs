//! Lens CLI - Command-line interface for Screentime Lens
//!
//! Commands:
//! - derive: Compute every derived quantity for one input and print a snapshot
//! - grid: Print the life grid as text
//! - replay: Feed recorded events through the engine (NDJSON)
//! - config: Print the effective configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use screentime_lens::derive::life_grid_partition;
use screentime_lens::format::life_grid_text;
use screentime_lens::{
    LensConfig, LensEngine, LensError, LensEvent, OpportunityRates, SilhouetteMode,
    SnapshotEncoder, LENS_VERSION, PRODUCER_NAME,
};
use tracing::{debug, info, Level};

/// Lens - Screen-time derivation engine
#[derive(Parser)]
#[command(name = "lens")]
#[command(version = LENS_VERSION)]
#[command(about = "Turn daily screen time into the numbers a life adds up to", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Configuration file (JSON); missing fields take their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Opportunity-cost rates
    #[arg(long, global = true)]
    preset: Option<Preset>,

    /// Silhouette behavior while the reclaim slider moves
    #[arg(long, global = true)]
    silhouette: Option<SilhouetteArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every derived quantity and print a snapshot
    Derive {
        /// Daily screen time in hours
        #[arg(long)]
        hours: f64,

        /// Age in whole years
        #[arg(long)]
        age: Option<i64>,

        /// Reclaim candidate in hours (defaults to --hours)
        #[arg(long)]
        reclaim: Option<f64>,

        /// Single-line JSON output
        #[arg(long)]
        compact: bool,
    },

    /// Print the life grid, most recent weeks at the bottom
    Grid {
        /// Daily screen time in hours
        #[arg(long)]
        hours: f64,

        /// Age in whole years
        #[arg(long)]
        age: i64,

        /// Weeks per row
        #[arg(long, default_value = "52")]
        columns: usize,
    },

    /// Feed recorded events through the engine
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Skip the final snapshot
        #[arg(long)]
        no_snapshot: bool,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// 6 h per book, 600 h per language, 200 h per walk
    ReadingPace,
    /// 7 h per book, 480 h per language, 200 h per walk
    SlowReader,
}

#[derive(Clone, Copy, ValueEnum)]
enum SilhouetteArg {
    /// The current silhouette follows the slider
    Track,
    /// The current silhouette stays at the original hours
    Freeze,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: Cli) -> Result<(), LensCliError> {
    let config = load_config(cli.config.as_deref(), cli.preset, cli.silhouette)?;

    match cli.command {
        Commands::Derive {
            hours,
            age,
            reclaim,
            compact,
        } => cmd_derive(config, hours, age, reclaim, compact),

        Commands::Grid {
            hours,
            age,
            columns,
        } => cmd_grid(config, hours, age, columns),

        Commands::Replay { input, no_snapshot } => cmd_replay(config, &input, no_snapshot),

        Commands::Config => cmd_config(&config),
    }
}

fn load_config(
    path: Option<&Path>,
    preset: Option<Preset>,
    silhouette: Option<SilhouetteArg>,
) -> Result<LensConfig, LensCliError> {
    let mut config = match path {
        Some(path) => LensConfig::from_json(&fs::read_to_string(path)?)?,
        None => LensConfig::default(),
    };

    if let Some(preset) = preset {
        config = config.with_opportunity(match preset {
            Preset::ReadingPace => OpportunityRates::reading_pace(),
            Preset::SlowReader => OpportunityRates::slow_reader(),
        });
    }
    if let Some(mode) = silhouette {
        config = config.with_silhouette(match mode {
            SilhouetteArg::Track => SilhouetteMode::TrackCandidate,
            SilhouetteArg::Freeze => SilhouetteMode::FreezeOriginal,
        });
    }

    config.validate()?;
    debug!(?config, "configuration loaded");
    Ok(config)
}

fn cmd_derive(
    config: LensConfig,
    hours: f64,
    age: Option<i64>,
    reclaim: Option<f64>,
    compact: bool,
) -> Result<(), LensCliError> {
    let mut engine = LensEngine::new(config)?;
    engine.set_daily_hours(hours)?;
    if let Some(age) = age {
        engine.submit_age(age)?;
    }
    if let Some(candidate) = reclaim {
        engine.set_reclaim_candidate(candidate)?;
    }

    let snapshot = SnapshotEncoder::new().encode(&engine)?;
    let output = if compact {
        serde_json::to_string(&snapshot)?
    } else {
        serde_json::to_string_pretty(&snapshot)?
    };
    println!("{}", output);
    Ok(())
}

fn cmd_grid(config: LensConfig, hours: f64, age: i64, columns: usize) -> Result<(), LensCliError> {
    let mut engine = LensEngine::new(config)?;
    engine.set_daily_hours(hours)?;
    engine.submit_age(age)?;

    let input = engine.input_state();
    let partition = life_grid_partition(input.age, input.daily_hours, engine.config())
        .ok_or(LensCliError::NoGrid)?;

    let mut stdout = io::stdout();
    writeln!(stdout, "{}", life_grid_text(&partition, columns))?;
    writeln!(
        stdout,
        "\n# lived {}  ~ scroll {}  . free {}  (of {} weeks)",
        partition.lived_weeks, partition.scroll_weeks, partition.free_weeks, partition.total_weeks
    )?;
    Ok(())
}

fn cmd_replay(config: LensConfig, input: &Path, no_snapshot: bool) -> Result<(), LensCliError> {
    let reader: Box<dyn BufRead> = if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(LensCliError::NoInput);
        }
        Box::new(io::BufReader::new(io::stdin()))
    } else {
        Box::new(io::BufReader::new(fs::File::open(input)?))
    };

    let mut engine = LensEngine::new(config)?;
    let mut stdout = io::stdout();
    let mut processed = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let event: LensEvent = serde_json::from_str(trimmed).map_err(|e| {
            LensCliError::ParseError(format!("line {}: failed to parse event: {}", index + 1, e))
        })?;

        for effect in engine.handle(event) {
            writeln!(stdout, "{}", serde_json::to_string(&effect)?)?;
        }
        processed += 1;
    }
    info!(events = processed, "replay finished");

    if processed == 0 {
        return Err(LensCliError::NoEvents);
    }

    if !no_snapshot {
        let snapshot = SnapshotEncoder::new().encode(&engine)?;
        writeln!(stdout, "{}", serde_json::to_string(&snapshot)?)?;
    }
    stdout.flush()?;
    Ok(())
}

fn cmd_config(config: &LensConfig) -> Result<(), LensCliError> {
    let report = ConfigReport {
        producer: PRODUCER_NAME.to_string(),
        version: LENS_VERSION.to_string(),
        total_weeks: config.total_weeks(),
        config,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

// Error types

#[derive(Debug)]
enum LensCliError {
    Io(io::Error),
    Lens(LensError),
    Json(serde_json::Error),
    NoEvents,
    NoInput,
    NoGrid,
    ParseError(String),
}

impl From<io::Error> for LensCliError {
    fn from(e: io::Error) -> Self {
        LensCliError::Io(e)
    }
}

impl From<LensError> for LensCliError {
    fn from(e: LensError) -> Self {
        LensCliError::Lens(e)
    }
}

impl From<serde_json::Error> for LensCliError {
    fn from(e: serde_json::Error) -> Self {
        LensCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<LensCliError> for CliError {
    fn from(e: LensCliError) -> Self {
        match e {
            LensCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            LensCliError::Lens(e) => CliError {
                code: e.code().to_uppercase(),
                hint: match &e {
                    LensError::InvalidAge { .. } => {
                        Some("Age must be a whole number below the life expectancy".to_string())
                    }
                    LensError::InvalidConfig(_) => Some("Run 'lens config' to see the defaults".to_string()),
                    _ => None,
                },
                message: e.to_string(),
            },
            LensCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            LensCliError::NoEvents => CliError {
                code: "NO_EVENTS".to_string(),
                message: "No events found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            LensCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "stdin is a TTY".to_string(),
                hint: Some("Pipe NDJSON events into 'lens replay --input -'".to_string()),
            },
            LensCliError::NoGrid => CliError {
                code: "NO_GRID".to_string(),
                message: "Life grid requires an age".to_string(),
                hint: None,
            },
            LensCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Each line must be one JSON event".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ConfigReport<'a> {
    producer: String,
    version: String,
    total_weeks: u32,
    config: &'a LensConfig,
}
