use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use site_score::buffered_eprintln;
use site_score::config::Config;
use site_score::scoring::FeasibilityEngine;
use site_score::signals::{AnalysisRequest, Location};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
enum OutputFormat {
    /// Ranked table, one line per bundle
    #[default]
    Table,
    /// Tab-separated score, scoreType, source
    Tsv,
    /// JSON array of results
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score one or more signal bundles and rank them
    Score {
        /// Bundle files (JSON); use - for stdin
        #[arg(required = true)]
        files: Vec<String>,

        /// Business category for tailored scoring (overrides the bundle's requestedCategory)
        #[arg(long)]
        category: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Summarize the signals in a bundle and show its score breakdown
    Insights {
        /// Bundle file (JSON); use - for stdin
        file: String,

        /// Business category for tailored scoring
        #[arg(long)]
        category: Option<String>,
    },
    /// Print the analysis request body for a map point, to pipe into the analytics API
    Request {
        /// Latitude of the picked point
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude of the picked point
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Search radius in meters
        #[arg(long, default_value_t = site_score::signals::request::DEFAULT_RADIUS_M)]
        radius: u32,

        /// Business category for tailored scoring
        #[arg(long)]
        category: Option<String>,
    },
    /// Write the default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Validate the config file and print the effective settings
    CheckConfig,
}

#[derive(Parser, Debug)]
#[command(name = "site-score")]
#[command(about = "Location feasibility scoring from urban-analytics signals", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/site-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();
    let start_time = Instant::now();
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let use_colors = !cli.no_color && site_score::output::should_use_colors();

    if let Commands::Init { force } = cli.command {
        match site_score::config::write_default_config(config_path, force) {
            Ok(path) => println!("Config written to {}", path.display()),
            Err(e) => {
                eprintln!("Config error: {}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let config = match site_score::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate scoring config at startup
    let effective_scoring = config.effective_scoring();
    if let Err(errors) = site_score::scoring::validate_scoring(&effective_scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let engine = match FeasibilityEngine::from_config(&effective_scoring) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Scoring config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if cli.verbose {
        eprintln!("Engine: {:?}", engine);
        if let Some(ref category) = config.default_category {
            eprintln!("Default category: {}", category);
        }
    }

    match cli.command {
        Commands::Score {
            files,
            category,
            format,
        } => run_score(&engine, &config, &files, category.as_deref(), format, cli.verbose, use_colors),
        Commands::Insights { file, category } => {
            run_insights(&engine, &config, &file, category.as_deref(), use_colors)
        }
        Commands::Request {
            lat,
            lng,
            radius,
            category,
        } => {
            let mut request = AnalysisRequest::new(Location {
                latitude: lat,
                longitude: lng,
                address: None,
            })
            .with_radius(radius);
            if let Some(category) = category.or_else(|| config.default_category.clone()) {
                request = request.with_category(category);
            }
            if cli.verbose {
                match request.scoring_mode().category() {
                    Some(category) => eprintln!("Tailored request for category: {}", category),
                    None => eprintln!("General request"),
                }
            }
            println!("{}", request.to_query_body());
        }
        Commands::CheckConfig => {
            let effective = Config {
                default_category: config.default_category.clone(),
                scoring: Some(effective_scoring),
            };
            match serde_saphyr::to_string(&effective) {
                Ok(yaml) => println!("{}", yaml),
                Err(e) => {
                    eprintln!("Failed to serialize config: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            }
            eprintln!("Config OK");
        }
        Commands::Init { .. } => {}
    }

    if cli.verbose {
        eprintln!("Done in {:?}", start_time.elapsed());
    }
    std::process::exit(EXIT_SUCCESS);
}

fn run_score(
    engine: &FeasibilityEngine,
    config: &Config,
    files: &[String],
    category: Option<&str>,
    format: OutputFormat,
    verbose: bool,
    use_colors: bool,
) {
    let bundles = match site_score::signals::read_bundles(files) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    if verbose {
        eprintln!("Scoring {} bundles", bundles.len());
    }

    // Hold warnings back until the table is printed
    site_score::stderr_buffer::activate();

    let ranked = site_score::rank::rank_bundles(
        engine,
        &bundles,
        category,
        config.default_category.as_deref(),
    );

    for site in ranked.iter().filter(|s| s.malformed) {
        buffered_eprintln!(
            "warning: {} is not a JSON object; using the neutral score",
            site.source
        );
    }

    let output = match format {
        OutputFormat::Table if verbose => ranked
            .iter()
            .map(|site| {
                site_score::output::format_result_detail(&site.source, &site.result, use_colors)
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Table => site_score::output::format_ranked_table(&ranked, use_colors),
        OutputFormat::Tsv => site_score::output::format_tsv(&ranked),
        OutputFormat::Json => match site_score::output::format_json(&ranked) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Failed to serialize results: {}", e);
                std::process::exit(EXIT_INPUT);
            }
        },
    };
    println!("{}", output);

    for warning in site_score::stderr_buffer::drain() {
        eprintln!("{}", warning);
    }
}

fn run_insights(
    engine: &FeasibilityEngine,
    config: &Config,
    file: &str,
    category: Option<&str>,
    use_colors: bool,
) {
    let bundle = match site_score::signals::read_bundle(file) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    let site = site_score::rank::inspect_bundle(
        engine,
        &bundle,
        category,
        config.default_category.as_deref(),
    );
    if site.malformed {
        eprintln!(
            "warning: {} is not a JSON object; using the neutral score",
            site.source
        );
    }

    println!("{}", site_score::output::format_insights(&site.signals, use_colors));
    println!();
    println!(
        "{}",
        site_score::output::format_result_detail(&site.source, &site.result, use_colors)
    );
}
