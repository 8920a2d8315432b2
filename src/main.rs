//! `cms-fetch`: issue one request against the CMS and print the normalized
//! envelope.
//!
//! ```text
//! cms-fetch --base-url http://localhost:1337/api/ get pages?filters[slug]=home
//! cms-fetch extract global --label "global settings"
//! cms-fetch --token $TOKEN post articles --data '{"data":{"title":"Hi"}}'
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use cms_fetch::api::{extract, ApiClient, ApiResponse, LoadError};
use cms_fetch::config::{load, ConfigOverrides};
use cms_fetch::observability::logging;

#[derive(Parser)]
#[command(name = "cms-fetch")]
#[command(
    about = "Fetch content from a headless CMS and print normalized responses",
    long_about = None
)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override api.base_url
    #[arg(long)]
    base_url: Option<String>,

    /// Bearer token (overrides api.api_token)
    #[arg(long)]
    token: Option<String>,

    /// Override api.timeout_ms
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET a resource and print the envelope
    Get { path: String },
    /// DELETE a resource and print the envelope
    Delete { path: String },
    /// POST a JSON payload
    Post {
        path: String,
        #[arg(long)]
        data: String,
    },
    /// PUT a JSON payload
    Put {
        path: String,
        #[arg(long)]
        data: String,
    },
    /// PATCH a JSON payload
    Patch {
        path: String,
        #[arg(long)]
        data: String,
    },
    /// GET a resource and print only its data, as a page loader would
    Extract {
        path: String,
        /// Resource name used in failure messages
        #[arg(long, default_value = "resource")]
        label: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        base_url: cli.base_url,
        api_token: cli.token,
        timeout_ms: cli.timeout_ms,
    };
    let config = load(cli.config.as_deref(), &overrides)?;

    logging::init(&config.observability.log_level);

    tracing::debug!(
        base_url = %config.api.base_url,
        timeout_ms = config.api.timeout_ms,
        has_token = config.api.api_token.is_some(),
        "Configuration loaded"
    );

    let client = ApiClient::from_config(&config.api)?;
    let token = config.api.api_token.as_deref();

    let exit = match cli.command {
        Commands::Get { path } => print_envelope(&client.get::<Value>(&path, token, None).await)?,
        Commands::Delete { path } => print_envelope(&client.delete(&path, token, None).await)?,
        Commands::Post { path, data } => {
            let payload: Value = serde_json::from_str(&data)?;
            print_envelope(&client.post::<Value, _>(&path, &payload, token, None).await)?
        }
        Commands::Put { path, data } => {
            let payload: Value = serde_json::from_str(&data)?;
            print_envelope(&client.put::<Value, _>(&path, &payload, token, None).await)?
        }
        Commands::Patch { path, data } => {
            let payload: Value = serde_json::from_str(&data)?;
            print_envelope(&client.patch::<Value, _>(&path, &payload, token, None).await)?
        }
        Commands::Extract { path, label } => {
            let response = client.get::<Value>(&path, token, None).await;
            match extract(Some(response), &label) {
                Ok(data) => {
                    println!("{}", serde_json::to_string_pretty(&data)?);
                    ExitCode::SUCCESS
                }
                Err(LoadError::NotFound) => {
                    eprintln!("Not found: {}", path);
                    ExitCode::from(2)
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
    };

    Ok(exit)
}

fn print_envelope<T: Serialize>(response: &ApiResponse<T>) -> Result<ExitCode, serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
