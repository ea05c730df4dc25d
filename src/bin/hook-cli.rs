use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "hook-cli")]
#[command(about = "Client for the Confluence webhook receiver", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the liveness endpoint
    Health,
    /// Post a test webhook event
    Send {
        #[arg(short, long, default_value = "page_created")]
        event: String,
        #[arg(long, default_value_t = 1)]
        page_id: i64,
        #[arg(short, long, default_value = "Test page")]
        title: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{base}/health")).send().await?;
            print_json(res).await?;
        }
        Commands::Send { event, page_id, title } => {
            let payload = json!({
                "event": event,
                "page": { "id": page_id, "title": title },
            });
            let res = client
                .post(format!("{base}/webhook/confluence"))
                .json(&payload)
                .send()
                .await?;
            print_text(res).await?;
        }
    }

    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        return print_text(res).await;
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

async fn print_text(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let text = text.trim_end();
    if status.is_success() {
        println!("{text}");
    } else {
        eprintln!("Error: receiver returned status {status}");
        eprintln!("Response: {text}");
    }
    Ok(())
}
