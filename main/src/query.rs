use std::{
    io::{self, Write},
    sync::Arc,
};

use common::{
    llm::OpenAiProvider,
    utils::config::get_config,
    vector::PineconeIndex,
};
use knowledge_store::KnowledgeStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Interactive read-question/print-answer loop over stdin/stdout. Blank
/// lines are ignored; a query failure is printed and the loop continues;
/// end-of-input or Ctrl-C exits cleanly.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let config = get_config()?;

    let provider = Arc::new(OpenAiProvider::from_config(&config));
    let index = Arc::new(PineconeIndex::from_config(&config)?);
    let store = Arc::new(KnowledgeStore::new(provider, index, &config));
    store.ensure_index().await?;

    println!(
        "Ready to chat with the knowledge base ('{}').",
        store.index_name()
    );
    println!("Type your question (or Ctrl+C to quit).\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("Q: ");
        io::stdout().flush()?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\nExiting.");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    println!("\nExiting.");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match store.query(&line, None).await {
                    Ok(answer) => println!("\nA: {answer}\n"),
                    Err(e) => eprintln!("\nError: {e}\n"),
                }
            }
        }
    }

    Ok(())
}
