//! CLI entry point for `sql2ts`.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use sql2ts::generator::{Generator, GeneratorConfig};

#[derive(Parser)]
#[command(
    name = "sql2ts",
    about = "Generate TypeScript result types for PostgreSQL queries"
)]
struct Cli {
    /// Input SQL files
    #[arg(required_unless_present = "query")]
    input: Vec<PathBuf>,

    /// Inline SQL to type instead of reading files
    #[arg(long)]
    query: Option<String>,

    /// PostgreSQL connection URL
    #[arg(long)]
    db_url: String,

    /// Schema consulted for unqualified table names
    #[arg(long, default_value = "public")]
    default_schema: String,

    /// TypeScript type for SQL types outside every known family
    #[arg(long, default_value = "string")]
    fallback_type: String,

    /// JSON file mapping SQL type tags to TypeScript types
    #[arg(long)]
    type_overrides: Option<PathBuf>,

    /// Render one column per line
    #[arg(long)]
    pretty: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = GeneratorConfig {
        default_schema: cli.default_schema.clone(),
        fallback_type: cli.fallback_type.clone(),
        pretty: cli.pretty,
        ..GeneratorConfig::default()
    };

    if let Some(path) = &cli.type_overrides {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error reading {}: {e}", path.display());
                process::exit(2);
            }
        };
        match serde_json::from_str(&json) {
            Ok(overrides) => config.type_overrides = overrides,
            Err(e) => {
                eprintln!("Error parsing type overrides: {e}");
                process::exit(2);
            }
        }
    }

    // Collect SQL sources.
    let mut sources = Vec::new();
    if let Some(query) = &cli.query {
        sources.push(query.clone());
    }
    for path in &cli.input {
        match std::fs::read_to_string(path) {
            Ok(content) => sources.push(content),
            Err(e) => {
                eprintln!("Error reading {}: {e}", path.display());
                process::exit(2);
            }
        }
    }
    if sources.is_empty() {
        eprintln!("No input SQL provided");
        process::exit(2);
    }

    let generator = match Generator::connect(&cli.db_url, &config) {
        Ok(generator) => generator,
        Err(e) => {
            eprintln!("Error loading schema: {e}");
            process::exit(2);
        }
    };

    let mut failed = false;
    for source in &sources {
        for result in generator.generate(source) {
            match result {
                Ok(ts_type) => println!("{ts_type}"),
                Err(e) => {
                    failed = true;
                    eprintln!("Error: {e}");
                }
            }
        }
    }

    if failed {
        process::exit(1);
    }
}
