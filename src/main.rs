use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use park_score::logbook::Contact;
use park_score::scoring::{Ruleset, TracingObserver};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank every operator found in the logs (default if no subcommand)
    Standings {
        /// ADIF log files (defaults to the `logs` patterns in the config file)
        files: Vec<PathBuf>,
    },
    /// Show one operator's score day by day and park by park
    Breakdown {
        /// Operator callsign
        operator: String,
        /// ADIF log files (defaults to the `logs` patterns in the config file)
        files: Vec<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Tsv,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "park-score")]
#[command(about = "Score parks-on-the-air activation logs", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/park-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() {
    let cli = Cli::parse();
    park_score::telemetry::init_logging(cli.verbose);

    let command = cli
        .command
        .unwrap_or(Commands::Standings { files: Vec::new() });
    let start_time = Instant::now();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match park_score::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate ruleset at startup
    let ruleset_config = config.ruleset.clone().unwrap_or_default();
    let ruleset = match Ruleset::from_config(&ruleset_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Ruleset config errors:");
            for error in &e.errors {
                eprintln!("  - {}", error);
            }
            std::process::exit(EXIT_CONFIG);
        }
    };
    tracing::debug!(
        base_score = ruleset.base_score(),
        new_location_multiplier = ruleset.new_location_multiplier(),
        low_power_multiplier = ruleset.low_power_multiplier(),
        low_power_threshold = ruleset.low_power_threshold(),
        modes = ?ruleset.valid_modes(),
        "ruleset loaded"
    );

    let files = match &command {
        Commands::Standings { files } | Commands::Breakdown { files, .. } => files.clone(),
    };
    let files = if files.is_empty() {
        match park_score::logbook::expand_patterns(&config.logs) {
            Ok(paths) => paths,
            Err(e) => {
                eprintln!("Config error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    } else {
        files
    };

    if files.is_empty() {
        eprintln!("No log files given.");
        eprintln!("Pass ADIF files or add `logs` patterns to ~/.config/park-score/config.yaml:");
        eprintln!("  logs:");
        eprintln!("    - \"logs/*.adi\"");
        std::process::exit(EXIT_INPUT);
    }

    let logbooks = match park_score::logbook::load_logbooks(&files) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Import error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };
    let operators = park_score::logbook::group_by_operator(logbooks);
    tracing::debug!(
        files = files.len(),
        operators = operators.len(),
        "logs loaded"
    );

    let use_colors = cli.output.is_none() && park_score::output::should_use_colors();

    let rendered = match command {
        Commands::Standings { .. } => {
            let standings = park_score::standings::score_operators(&operators, &ruleset);
            match cli.format {
                OutputFormat::Table => {
                    Ok(park_score::output::format_standings_table(&standings, use_colors))
                }
                OutputFormat::Tsv => Ok(park_score::output::format_tsv(&standings)),
                OutputFormat::Json => park_score::output::format_standings_json(&standings),
            }
        }
        Commands::Breakdown { operator, .. } => {
            let operator = operator.trim().to_ascii_uppercase();
            let Some(contacts) = operators.get(&operator) else {
                eprintln!("No logs found for operator {}.", operator);
                let known: Vec<&str> = operators.keys().map(String::as_str).collect();
                eprintln!("Operators in these logs: {}", known.join(", "));
                std::process::exit(EXIT_INPUT);
            };
            render_breakdown(&operator, contacts, &ruleset, cli.format, use_colors)
        }
    };

    let rendered = match rendered {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Output error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(e) = park_score::output::write_report(path, &rendered) {
                eprintln!("Output error: {:#}", e);
                std::process::exit(EXIT_INPUT);
            }
        }
        None => println!("{}", rendered),
    }

    tracing::debug!(elapsed = ?start_time.elapsed(), "done");
    std::process::exit(EXIT_SUCCESS);
}

fn render_breakdown(
    operator: &str,
    contacts: &[Contact],
    ruleset: &Ruleset,
    format: OutputFormat,
    use_colors: bool,
) -> anyhow::Result<String> {
    let mut observer = TracingObserver::new(operator);
    let report = park_score::scoring::score_operator_with(contacts, ruleset, &mut observer);
    match format {
        OutputFormat::Json => park_score::output::format_report_json(&report),
        OutputFormat::Tsv => Ok(park_score::output::format_breakdown_tsv(&report)),
        OutputFormat::Table => Ok(park_score::output::format_breakdown(
            operator, &report, use_colors,
        )),
    }
}
