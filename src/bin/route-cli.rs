use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Management CLI for the route-tree admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    /// Admin API key, sent as a bearer token
    #[arg(short, long, env = "ROUTE_TREE_API_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the live generation and roles
    Status,
    /// Dump the live route forest
    Routes,
    /// Resolve a path against the live router
    Resolve { path: String },
    /// Show the sidebar menu and cached views
    Menu,
    /// Replace the viewer's roles
    Roles { roles: Vec<String> },
    /// Reload the route catalog
    Reload,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key))?,
        );
    }
    let client = reqwest::Client::builder().default_headers(headers).build()?;
    let base = cli.url.trim_end_matches('/');

    let request = match cli.command {
        Commands::Status => client.get(format!("{base}/admin/status")),
        Commands::Routes => client.get(format!("{base}/admin/routes")),
        Commands::Resolve { path } => client
            .get(format!("{base}/admin/resolve"))
            .query(&[("path", path)]),
        Commands::Menu => client.get(format!("{base}/admin/menu")),
        Commands::Roles { roles } => client
            .put(format!("{base}/admin/roles"))
            .json(&serde_json::json!({ "roles": roles })),
        Commands::Reload => client.post(format!("{base}/admin/reload")),
    };

    print_response(request.send().await?).await
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

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
