use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ds-cli")]
#[command(about = "Debounced Search CLI", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the query text
    Query {
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Show the current published results
    Results,

    /// Type a query one character at a time, then print the settled result
    Type {
        #[arg(value_name = "TEXT")]
        text: String,

        /// Delay between keystrokes in milliseconds
        #[arg(short, long, default_value = "100")]
        interval_ms: u64,

        /// Give up waiting for the result after this many seconds
        #[arg(short, long, default_value = "10")]
        timeout_secs: u64,
    },

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Query { text } => {
            let body = put_query(&client, &cli.endpoint, &text).await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Results => {
            let body = get_results(&client, &cli.endpoint).await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Type {
            text,
            interval_ms,
            timeout_secs,
        } => {
            let interval = Duration::from_millis(interval_ms);

            let mut prefix = String::new();
            for ch in text.chars() {
                prefix.push(ch);
                put_query(&client, &cli.endpoint, &prefix).await?;
                println!("> {}", prefix);
                tokio::time::sleep(interval).await;
            }

            let deadline = tokio::time::Instant::now() + Duration::from_secs(timeout_secs);
            loop {
                let body = get_results(&client, &cli.endpoint).await?;
                let settled = body["query"].as_str() == Some(text.as_str())
                    && body["is_searching"].as_bool() == Some(false);

                if settled {
                    println!("{}", serde_json::to_string_pretty(&body["results"])?);
                    break;
                }

                if tokio::time::Instant::now() >= deadline {
                    bail!("no settled result for {:?} after {}s", text, timeout_secs);
                }

                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await
                .context("failed to reach server")?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}

async fn put_query(client: &Client, endpoint: &str, text: &str) -> anyhow::Result<serde_json::Value> {
    let response = client
        .put(format!("{}/v1/query", endpoint))
        .json(&json!({ "text": text }))
        .send()
        .await
        .context("failed to send query")?
        .error_for_status()?;

    Ok(response.json().await?)
}

async fn get_results(client: &Client, endpoint: &str) -> anyhow::Result<serde_json::Value> {
    let response = client
        .get(format!("{}/v1/results", endpoint))
        .send()
        .await
        .context("failed to fetch results")?
        .error_for_status()?;

    Ok(response.json().await?)
}
