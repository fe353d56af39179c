use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use prospect_rank::error::ScoreError;
use prospect_rank::level::TierLabel;
use prospect_rank::pipeline::{filter_level, sort_ranked, Pipeline};
use prospect_rank::record::Record;
use prospect_rank::scoring::NormalizationMode;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_SCORING: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Csv,
    Json,
    Tsv,
}

#[derive(Args, Debug, Default)]
struct InputArgs {
    /// Directory of per-team CSV files (defaults to config input_dir, then processed_data)
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Only score players at this level (MLB, AAA, AA, A+, A, Rookie or any synonym)
    #[arg(short, long)]
    level: Option<String>,

    /// Normalize each level separately instead of the whole population
    #[arg(long)]
    per_level_scale: bool,
}

#[derive(Args, Debug, Default)]
struct RankArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output format (table on a terminal, csv when writing a file)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only show the top N players
    #[arg(short = 'n', long)]
    top: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank players by composite score (default if no subcommand)
    Rank(RankArgs),
    /// Show how one player's score was built
    Explain {
        /// Player name (case-insensitive)
        name: String,

        #[command(flatten)]
        input: InputArgs,
    },
    /// Write the default configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "prospect-rank")]
#[command(about = "Rank batters across levels by adjusted, normalized scores", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/prospect-rank/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn fail(code: i32, message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    std::process::exit(code);
}

/// Build the pipeline from config, exiting on config errors.
fn build_pipeline(config_path: Option<PathBuf>, input: &InputArgs) -> (Pipeline, PathBuf) {
    let config = match prospect_rank::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => fail(EXIT_CONFIG, format!("Config error: {:#}", e)),
    };

    let mut scoring = config.effective_scoring();
    if input.per_level_scale {
        scoring.normalization = Some(NormalizationMode::PerLevel);
    }

    let pipeline = match Pipeline::new(scoring) {
        Ok(p) => p,
        Err(ScoreError::InvalidConfig(errors)) => {
            eprintln!("Scoring config errors:");
            for error in errors {
                eprintln!("  - {}", error);
            }
            std::process::exit(EXIT_CONFIG);
        }
        Err(e) => fail(EXIT_CONFIG, e),
    };

    let input_dir = input
        .input_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(config.input_dir()));
    (pipeline, input_dir)
}

/// Read the input directory and apply the level filter, exiting on input errors.
fn load_records(input_dir: &Path, level: Option<&str>) -> Vec<Record> {
    let records = match prospect_rank::io::read_dir(input_dir) {
        Ok(r) => r,
        Err(e) => fail(EXIT_INPUT, format!("Input error: {:#}", e)),
    };

    let Some(level) = level else {
        return records;
    };
    let Some(tier) = TierLabel::parse(level) else {
        fail(EXIT_INPUT, "Level filter must not be blank");
    };
    let filtered = filter_level(records, &tier);
    if filtered.is_empty() {
        fail(EXIT_INPUT, format!("No players found for level '{}'", tier));
    }
    info!(level = %tier, records = filtered.len(), "Applied level filter");
    filtered
}

fn scoring_failure(e: ScoreError) -> ! {
    match e {
        ScoreError::InvalidConfig(_) => fail(EXIT_CONFIG, e),
        ScoreError::MissingInputs { .. } => fail(EXIT_SCORING, format!("Scoring error: {}", e)),
    }
}

fn run_rank(cli_config: Option<PathBuf>, args: RankArgs) {
    let (pipeline, input_dir) = build_pipeline(cli_config, &args.input);
    let records = load_records(&input_dir, args.input.level.as_deref());

    let mut ranked = match pipeline.run(records) {
        Ok(r) => r,
        Err(e) => scoring_failure(e),
    };
    sort_ranked(&mut ranked);
    if let Some(top) = args.top {
        ranked.truncate(top);
    }

    let format = args.format.unwrap_or(if args.output.is_some() {
        OutputFormat::Csv
    } else {
        OutputFormat::Table
    });
    let use_colors = args.output.is_none() && prospect_rank::output::should_use_colors();

    let rendered = match format {
        OutputFormat::Table => Ok(prospect_rank::output::format_ranked_table(&ranked, use_colors)),
        OutputFormat::Tsv => Ok(prospect_rank::output::format_tsv(&ranked)),
        OutputFormat::Csv => prospect_rank::output::format_csv(&ranked),
        OutputFormat::Json => prospect_rank::output::format_json(&ranked),
    };
    let rendered = match rendered {
        Ok(s) => s,
        Err(e) => fail(EXIT_INPUT, format!("Output error: {:#}", e)),
    };

    match args.output {
        Some(path) => {
            let mut contents = rendered;
            if !contents.ends_with('\n') {
                contents.push('\n');
            }
            if let Err(e) = prospect_rank::io::write_atomic(&path, contents.as_bytes()) {
                fail(EXIT_INPUT, format!("Output error: {:#}", e));
            }
            info!(path = %path.display(), players = ranked.len(), "Wrote ranking");
        }
        None => println!("{}", rendered),
    }
}

fn run_explain(cli_config: Option<PathBuf>, name: &str, input: InputArgs) {
    let (pipeline, input_dir) = build_pipeline(cli_config, &input);
    let records = load_records(&input_dir, input.level.as_deref());

    // Scored before dedup so every level the player appeared at is shown
    let scored = match pipeline.score_all(records) {
        Ok(s) => s,
        Err(e) => scoring_failure(e),
    };

    let wanted = name.trim().to_lowercase();
    let matches: Vec<_> = scored
        .iter()
        .filter(|r| r.record.identity_key().as_deref() == Some(wanted.as_str()))
        .collect();
    if matches.is_empty() {
        fail(EXIT_INPUT, format!("No player named '{}'", name.trim()));
    }

    let use_colors = prospect_rank::output::should_use_colors();
    let blocks: Vec<String> = matches
        .iter()
        .map(|r| prospect_rank::output::format_explain(r, use_colors))
        .collect();
    println!("{}", blocks.join("\n\n"));
}

fn main() {
    let cli = Cli::parse();
    prospect_rank::logging::init_logging(if cli.verbose { "debug" } else { "warn" });

    let command = cli.command.unwrap_or(Commands::Rank(RankArgs::default()));
    let config_path = cli.config.map(PathBuf::from);
    let start_time = Instant::now();

    match command {
        Commands::Rank(args) => run_rank(config_path, args),
        Commands::Explain { name, input } => run_explain(config_path, &name, input),
        Commands::Init { force } => {
            match prospect_rank::config::write_default_config(config_path, force) {
                Ok(path) => println!("Config written to {}", path.display()),
                Err(e) => fail(EXIT_CONFIG, format!("Config error: {:#}", e)),
            }
        }
    }

    info!(elapsed = ?start_time.elapsed(), "Done");
    std::process::exit(EXIT_SUCCESS);
}
