use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "procmux-cli")]
#[command(about = "Management CLI for procmux routes", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    /// Admin API key, sent as a bearer token.
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show server status
    Status,
    /// Manage routes
    #[command(subcommand)]
    Route(RouteCommand),
}

#[derive(Subcommand)]
enum RouteCommand {
    /// List routes in matching order
    List,
    /// Append a route
    Add {
        /// HTTP method, e.g. GET
        method: String,
        /// URL pattern, e.g. /hello/{name}
        url_pattern: String,
        /// Command handed to the entrypoint
        command: String,
        /// Entrypoint override
        #[arg(short, long, default_value = "")]
        entrypoint: String,
        /// Capture process output into the server log
        #[arg(short, long)]
        debug: bool,
    },
    /// Show one route
    Get { id: String },
    /// Remove a route
    Remove { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key))?,
        );
    }

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/status", base)),
        Commands::Route(RouteCommand::List) => client.get(format!("{}/routes", base)),
        Commands::Route(RouteCommand::Add {
            method,
            url_pattern,
            command,
            entrypoint,
            debug,
        }) => client.post(format!("{}/routes", base)).json(&json!({
            "method": method,
            "url_pattern": url_pattern,
            "entrypoint": entrypoint,
            "command": command,
            "debug": debug,
        })),
        Commands::Route(RouteCommand::Get { id }) => client.get(format!("{}/routes/{}", base, id)),
        Commands::Route(RouteCommand::Remove { id }) => {
            client.delete(format!("{}/routes/{}", base, id))
        }
    }
    .headers(headers)
    .send()
    .await?;

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let text = res.text().await?;
    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }
    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
