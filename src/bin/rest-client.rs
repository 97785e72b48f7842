use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use token_rest_client::config::loader::file_to_config;
use token_rest_client::observability::metrics::get_metrics;
use token_rest_client::request::composer::header_pair;
use token_rest_client::utils::logging::{self, LogLevel};
use token_rest_client::{ApiCall, RequestBody, RestClient};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "rest-client.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Print prometheus metrics after the command
    #[arg(long)]
    print_metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct CallArgs {
    /// logical api name from the `apis` config section
    #[arg(long)]
    api: String,
    #[arg(long = "segment")]
    segments: Vec<String>,
    /// comma-separated query param names
    #[arg(long)]
    query_names: Option<String>,
    /// comma-separated query param values
    #[arg(long)]
    query_values: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the current token cookie value
    Token,
    /// GET a registered api
    Get(CallArgs),
    /// POST a JSON body to a registered api
    Post {
        #[command(flatten)]
        call: CallArgs,
        #[arg(long)]
        body: String,
        #[arg(long, default_value = "application/json")]
        media_type: String,
        /// extra `name:value` headers sent with the body
        #[arg(long = "header")]
        headers: Vec<String>,
    },
    /// GET an arbitrary url
    Fetch {
        #[arg(long)]
        url: String,
    },
}

impl CallArgs {
    fn to_api_call(&self) -> ApiCall {
        let mut call = ApiCall::new(&self.api).segments(self.segments.iter().map(|s| Some(s.as_str())));
        call.query_param_name = self.query_names.clone();
        call.query_param_value = self.query_values.clone();
        call
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let client_config = file_to_config(Path::new(&args.config))
        .await
        .with_context(|| format!("loading {}", args.config))?;
    logging::run(&client_config, args.log_level);

    // -------------------------------
    // 2. Create client (token store + transports)
    // -------------------------------

    let client = RestClient::new(&client_config)?;
    info!("client ready, {} apis registered", client_config.apis.len());

    // -------------------------------
    // 3. Run command
    // -------------------------------

    let output: Value = match args.command {
        Command::Token => Value::String(client.get_token().await?),
        Command::Get(call) => client.get_api(&call.to_api_call()).await?,
        Command::Post { call, body, media_type, headers } => {
            let body: Value = serde_json::from_str(&body).context("--body must be JSON")?;
            let call = call.to_api_call().media_type(media_type);
            let request = if headers.is_empty() {
                RequestBody::Raw(body)
            } else {
                let mut header_map = http::HeaderMap::new();
                for header in &headers {
                    let (name, value) = header
                        .split_once(':')
                        .with_context(|| format!("header '{}' must be name:value", header))?;
                    let (name, value) = header_pair(name.trim(), value.trim())?;
                    header_map.append(name, value);
                }
                RequestBody::Wrapped { headers: header_map, body }
            };
            client.post_api(&call, request).await?
        }
        Command::Fetch { url } => client.get_for_object(&url).await?,
    };

    match output {
        Value::String(text) => println!("{}", text),
        other => println!("{}", serde_json::to_string_pretty(&other)?),
    }
    if args.print_metrics {
        println!("{}", get_metrics().await.gather_text());
    }
    Ok(())
}
