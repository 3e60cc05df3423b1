//! Compile semantic view definitions into CREATE VIEW statements.
//!
//! SQL goes to stdout; logs go to stderr (filter with RUST_LOG).

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use semantic_views::semantic::{Catalog, ViewDefinition};
use semantic_views::{check_view_statement, CompileRequest, CompilerConfig, ViewCompiler};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "compile_view")]
#[command(about = "Compile a semantic view definition into a CREATE VIEW statement")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct OutputArgs {
    /// Target project (or set GOOGLE_CLOUD_PROJECT)
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// Dataset that holds semantic views (or set SEMANTIC_VIEWS_DATASET)
    #[arg(long, global = true)]
    dataset: Option<String>,

    /// Print {"sqlQuery": ...} instead of raw SQL
    #[arg(long, global = true)]
    json: bool,

    /// Parse the generated statement before printing it
    #[arg(long, global = true)]
    check: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a full request: {viewName, tables, relationships, selectedFields, namespace}
    Compile {
        request: PathBuf,
    },
    /// Re-compile a saved definition, resolving table ids through a catalog file
    Definition {
        definition: PathBuf,

        /// JSON array of table records
        #[arg(long)]
        catalog: PathBuf,

        /// View name (defaults to view_<table names>)
        #[arg(long)]
        view_name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = CompilerConfig::from_env()?;
    if let Some(dataset) = &cli.output.dataset {
        config = config.with_dataset(dataset.as_str())?;
    }
    let compiler = ViewCompiler::new(config);
    info!(
        "Compiling into dataset {} (default namespace: {})",
        compiler.config().semantic_dataset,
        compiler.config().default_namespace.as_deref().unwrap_or("<none>")
    );

    let mut request = match &cli.command {
        Command::Compile { request } => {
            let content = std::fs::read_to_string(request)
                .with_context(|| format!("reading request {}", request.display()))?;
            CompileRequest::from_json(&content)?
        }
        Command::Definition {
            definition,
            catalog,
            view_name,
        } => {
            let content = std::fs::read_to_string(definition)
                .with_context(|| format!("reading definition {}", definition.display()))?;
            let definition = ViewDefinition::from_json(&content)?;
            let catalog = Catalog::load(catalog)?;
            if catalog.is_empty() {
                warn!("Catalog is empty; every table in the definition will be skipped");
            } else {
                info!("Loaded catalog with {} tables", catalog.len());
            }

            let workspace = definition.resolve(&catalog).await?;
            let name = view_name
                .clone()
                .unwrap_or_else(|| workspace.default_view_name());
            workspace.to_request(&name, "")
        }
    };

    if let Some(namespace) = &cli.output.namespace {
        request.namespace = namespace.clone();
    }

    let response = compiler.respond(&request);
    if cli.output.check {
        check_view_statement(&response.sql_query)?;
        info!("Generated statement parsed successfully");
    }

    if cli.output.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.sql_query);
    }

    Ok(())
}
