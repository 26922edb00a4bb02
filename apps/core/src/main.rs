// Syntropy CLI Entry Point
// Reads intents from stdin and runs each through the interpreter session.

use anyhow::Context;
use std::sync::Arc;
use syntropy_core::{GeminiGenerator, InterpreterConfig, Session};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

const HELP: &str = "Commands: /flame (toggle), /history, /web, /help, /quit. Anything else is an intent.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    syntropy_core::telemetry::init_tracing("syntropy").context("failed to initialise tracing")?;

    let config = InterpreterConfig::load().context("failed to load configuration")?;
    let generator = Arc::new(GeminiGenerator::new(&config.generator)?);
    let session = Session::from_config(generator, &config)?;
    info!("Session ready (model {})", config.generator.model);

    println!("{}", HELP);
    let mut flame_active = false;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/help" => println!("{}", HELP),
            "/flame" => {
                flame_active = !flame_active;
                println!("Flame {}", if flame_active { "embedded" } else { "withdrawn" });
            }
            "/history" => println!("{}", session.export_json()?),
            "/web" => println!("{}", serde_json::to_string_pretty(&session.graph()?)?),
            intent => match session.submit(intent, flame_active).await {
                Ok(entry) => {
                    println!("\n{}\n", entry.output);
                    println!("{}", entry.summary());
                }
                Err(e) => {
                    error!("Submission failed: {}", e);
                    println!("{}", e);
                }
            },
        }
    }

    Ok(())
}
