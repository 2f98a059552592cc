//! Tasar CLI - tabular regression serving
//!
//! # Commands
//!
//! - `serve` - Start the prediction server

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tasar::{
    api::{create_router, AppState},
    error::{Result, TasarError},
    model::TreeModel,
    schema::FeatureSchema,
};

/// Tasar - schema-validated tabular model serving
#[derive(Parser)]
#[command(name = "tasar")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the prediction server
    ///
    /// Examples:
    ///   tasar serve --schema features.json --model model.json
    ///   tasar serve --demo
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "50505")]
        port: u16,

        /// Path to the feature schema (JSON: field name -> "int"|"float"|"str")
        #[arg(short, long)]
        schema: Option<String>,

        /// Path to the model artifact (JSON decision tree)
        #[arg(short, long)]
        model: Option<String>,

        /// Use the built-in demo schema and model
        #[arg(long)]
        demo: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = run().await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            schema,
            model,
            demo,
        } => {
            let state = if demo {
                AppState::demo()?
            } else {
                let (Some(schema_path), Some(model_path)) = (schema, model) else {
                    eprintln!("Error: Either --demo or both --schema and --model must be specified");
                    eprintln!();
                    eprintln!("Usage:");
                    eprintln!("  tasar serve --demo");
                    eprintln!("  tasar serve --schema features.json --model model.json");
                    std::process::exit(1);
                };
                let schema = FeatureSchema::load(&schema_path)?;
                let model = TreeModel::load(&model_path)?;
                AppState::new(schema, model)?
            };
            serve(state, &host, port).await
        }
    }
}

async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| TasarError::config(format!("invalid address: {e}")))?;

    let app = create_router(state);

    println!("Server listening on http://{addr}");
    println!();
    println!("Endpoints:");
    println!("  GET  /         - Hello greeting");
    println!("  GET  /health   - Health check");
    println!("  POST /predict  - Predict for a record or batch");
    println!();
    println!("Example:");
    println!("  curl http://{addr}/health");
    println!();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| TasarError::config(format!("failed to bind {addr}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| TasarError::config(format!("server error: {e}")))
}
