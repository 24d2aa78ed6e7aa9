//! clientgen CLI entrypoint
//! Parses command-line arguments and dispatches to the client generator.
#![deny(unsafe_code)]

// Internal imports (std, crate)
use clientgen::{
    application::{GenerateClientRequest, GenerateClientUseCase},
    config::{ConfigOverrides, GeneratorConfig},
    infrastructure::{CompositeOpenApiLoader, FileSystemOutputService, TeraClassRenderer},
};
use std::path::PathBuf;
use std::sync::Arc;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clientgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate typed client modules from an OpenAPI specification
    Generate {
        /// Path or URL to OpenAPI schema (YAML or JSON)
        #[arg(long)]
        schema: String,
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output directory for generated modules
        #[arg(long)]
        output: Option<PathBuf>,
        /// Module path of the output directory, e.g. `crate::api`
        #[arg(long)]
        namespace: Option<String>,
        /// Type generated endpoints wrap
        #[arg(long)]
        base_type: Option<String>,
        /// Abort on the first class that cannot be generated
        #[arg(long)]
        fail_fast: bool,
        /// Enable debug logging
        #[arg(long, short)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            schema,
            config,
            output,
            namespace,
            base_type,
            fail_fast,
            verbose,
        } => {
            init_logging(verbose);
            let overrides = ConfigOverrides {
                base_path: output,
                base_namespace: namespace,
                base_type,
                fail_fast,
            };
            if let Err(e) = generate(schema, config, overrides).await {
                error!("{e:#}");
                return Err(e);
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

async fn generate(
    schema: String,
    config_path: Option<PathBuf>,
    overrides: ConfigOverrides,
) -> anyhow::Result<()> {
    let config = match &config_path {
        Some(path) => GeneratorConfig::from_file(path)
            .await
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => GeneratorConfig::default(),
    }
    .apply(overrides);

    info!(schema = %schema, output = %config.base_path.display(), "Generating client");

    let renderer = TeraClassRenderer::new().context("Failed to load templates")?;
    let use_case = GenerateClientUseCase::new(
        Arc::new(CompositeOpenApiLoader::new()),
        Arc::new(renderer),
        Arc::new(FileSystemOutputService::new()),
    );

    let response = use_case
        .execute(GenerateClientRequest {
            schema_source: schema,
            config,
        })
        .await
        .context("Client generation failed")?;

    for failure in &response.failures {
        println!("skipped {}: {}", failure.source, failure.message);
    }
    println!(
        "Generated {} class(es) into {} ({} file(s), {} skipped)",
        response.generated.len(),
        response.output_path.display(),
        response.files_written,
        response.failures.len()
    );
    Ok(())
}
