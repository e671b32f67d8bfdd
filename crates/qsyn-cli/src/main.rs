//! qsyn CLI: check queries and configuration files against qsyn schemas.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use qsyn_core::config::load_app_configuration;
use qsyn_core::{ValidationError, Validator};
use qsyn_query::{compose_query_schema, parse_yaml_shape, split_query, QuerySchema};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "qsyn")]
#[command(about = "Validate Feathers-style queries against record shapes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a query (JSON) against a shape file
    Validate {
        /// Path to the shape YAML file
        #[arg(short, long)]
        shape: PathBuf,

        /// Query as inline JSON
        #[arg(short, long, conflicts_with = "query_file")]
        query: Option<String>,

        /// Path to a JSON file holding the query
        #[arg(long)]
        query_file: Option<PathBuf>,

        /// Also print the split filters and directives
        #[arg(long)]
        split: bool,
    },

    /// Show the query schema derived from a shape file
    Explain {
        /// Path to the shape YAML file
        #[arg(short, long)]
        shape: PathBuf,
    },

    /// Validate an application configuration file (YAML or JSON)
    CheckConfig {
        /// Path to the configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Validate {
            shape,
            query,
            query_file,
            split,
        } => validate_query(&shape, query, query_file, split),
        Commands::Explain { shape } => explain_shape(&shape),
        Commands::CheckConfig { config } => check_config(&config),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// `QSYN_LOG` takes an `EnvFilter` directive; defaults to `warn`.
fn init_logging() {
    let filter = EnvFilter::try_from_env("QSYN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_schema(shape_path: &Path) -> CliResult<QuerySchema> {
    let src = fs::read_to_string(shape_path)?;
    let parsed = parse_yaml_shape(&src)?;
    tracing::debug!(
        path = %shape_path.display(),
        fields = parsed.shape.len(),
        "loaded shape"
    );
    Ok(compose_query_schema(&parsed.shape, Some(&parsed.extensions)))
}

fn read_query(inline: Option<String>, file: Option<PathBuf>) -> CliResult<Value> {
    let text = match (inline, file) {
        (Some(q), _) => q,
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => "{}".to_string(),
    };
    Ok(serde_json::from_str(&text)?)
}

fn render_issues(err: &ValidationError) -> String {
    let mut out = format!("{} issue(s):\n", err.len());
    for issue in &err.issues {
        let path = issue.path_string();
        let path = if path.is_empty() { "<root>" } else { path.as_str() };
        out.push_str(&format!("  - {path}: {}\n", issue.message));
    }
    out
}

fn validate_query(
    shape_path: &Path,
    inline: Option<String>,
    file: Option<PathBuf>,
    split: bool,
) -> CliResult<()> {
    let schema = load_schema(shape_path)?;
    let query = read_query(inline, file)?;

    let accepted = match schema.validate(&query) {
        Ok(v) => v,
        Err(err) => {
            eprint!("{}", render_issues(&err));
            return Err("query rejected".into());
        }
    };

    println!("✓ Query is valid");
    println!("{}", serde_json::to_string_pretty(&accepted)?);

    if split {
        let parts = split_query(&accepted)?;
        println!();
        println!("Filters:");
        println!("{}", serde_json::to_string_pretty(&parts.filters)?);
        println!("Directives:");
        println!("{}", serde_json::to_string_pretty(&parts.directives)?);
    }
    Ok(())
}

fn explain_shape(shape_path: &Path) -> CliResult<()> {
    let schema = load_schema(shape_path)?;

    println!("Query Schema");
    println!("============");
    println!();
    println!("Fingerprint: {}", schema.fingerprint()?);
    println!("Fields: {}", schema.field_names().join(", "));
    println!();
    println!("{}", serde_json::to_string_pretty(&schema.describe())?);
    Ok(())
}

fn check_config(config_path: &Path) -> CliResult<()> {
    let src = fs::read_to_string(config_path)?;
    // YAML is a superset of JSON, so one parser covers both.
    let doc: Value = serde_yaml::from_str(&src)?;

    match load_app_configuration(&doc, None) {
        Ok((_, typed)) => {
            println!("✓ Configuration is valid");
            if let Some(auth) = &typed.authentication {
                println!(
                    "  Auth strategies: {}",
                    auth.effective_parse_strategies().join(", ")
                );
            }
            if let Some(p) = &typed.paginate {
                println!("  Paginate: default {} / max {}", p.default, p.max);
            }
            Ok(())
        }
        Err(qsyn_core::Error::Validation(err)) => {
            eprint!("{}", render_issues(&err));
            Err("configuration rejected".into())
        }
        Err(e) => Err(e.into()),
    }
}
