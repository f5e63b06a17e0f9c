//! # sz-error CLI
//!
//! Classifies engine error messages from the command line or stdin.

mod report;

use clap::{ArgAction, Parser, Subcommand};
use report::{ClassificationReport, ExplainReport, TableReport};
use std::io::BufRead;
use std::path::PathBuf;
use sz_error::config::build_info;
use sz_error::{CategoryTag, Classifier, ClassifierPreferences, Generation, Taxonomy};

#[derive(Debug, Parser)]
#[command(name = "sz-error")]
#[command(version, about = "Classify entity-resolution engine error messages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Built-in taxonomy: sz (current) or g2 (legacy)
    #[arg(long, global = true, value_parser = parse_generation)]
    generation: Option<Generation>,

    /// Taxonomy TOML file overlaid on the built-in table
    #[arg(long, global = true, value_name = "FILE")]
    taxonomy: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify messages given as arguments, or one per stdin line
    Classify {
        messages: Vec<String>,

        /// Emit one JSON object per message
        #[arg(long)]
        json: bool,
    },

    /// Show harvest candidates and which one produced the code
    Explain {
        message: String,

        #[arg(long)]
        json: bool,
    },

    /// Print the active taxonomy
    Table {
        /// Only codes carrying this tag ("General" is accepted for Base)
        #[arg(long, value_parser = parse_tag)]
        tag: Option<CategoryTag>,

        #[arg(long)]
        json: bool,
    },

    /// Validate a taxonomy TOML file
    Check { file: PathBuf },
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Environment preferences overridden by explicit flags
    fn preferences(&self) -> ClassifierPreferences {
        let mut preferences = ClassifierPreferences::default();
        if let Some(generation) = self.generation {
            preferences.generation = generation;
        }
        if let Some(path) = &self.taxonomy {
            preferences.taxonomy_file = Some(path.clone());
        }
        preferences
    }
}

fn parse_generation(value: &str) -> Result<Generation, String> {
    Generation::from_str(value).ok_or_else(|| format!("unknown generation '{}'", value))
}

fn parse_tag(value: &str) -> Result<CategoryTag, String> {
    CategoryTag::from_str(value).ok_or_else(|| format!("unknown category tag '{}'", value))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();

    let preferences = cli.preferences();
    log::debug!(
        "Using {} taxonomy ({}; built-in tables from {})",
        preferences.generation,
        build_info::source_info(preferences.generation),
        build_info::taxonomy_dir()
    );

    match &cli.command {
        Commands::Classify { messages, json } => {
            let classifier = Classifier::from_preferences(&preferences)?;
            if messages.is_empty() {
                for line in std::io::stdin().lock().lines() {
                    let line = line?;
                    if !line.trim().is_empty() {
                        print_classification(&classifier, &line, *json)?;
                    }
                }
            } else {
                for message in messages {
                    print_classification(&classifier, message, *json)?;
                }
            }
        }
        Commands::Explain { message, json } => {
            let classifier = Classifier::from_preferences(&preferences)?;
            let report = ExplainReport::explain(&classifier, message);
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report);
            }
        }
        Commands::Table { tag, json } => {
            let classifier = Classifier::from_preferences(&preferences)?;
            let mut report = TableReport::from_taxonomy(classifier.taxonomy());
            if let Some(tag) = tag {
                report.retain_tag(*tag);
            }
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report);
            }
        }
        Commands::Check { file } => match Taxonomy::load(file) {
            Ok(taxonomy) => {
                println!(
                    "{}: ok ({} v{}, {} codes)",
                    file.display(),
                    taxonomy.name(),
                    taxonomy.version(),
                    taxonomy.len()
                );
            }
            Err(e) => {
                eprintln!("{}: error[{}]: {}", file.display(), e.error_code(), e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

fn print_classification(
    classifier: &Classifier,
    message: &str,
    json: bool,
) -> Result<(), serde_json::Error> {
    let report = ClassificationReport::classify(classifier, message);
    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
