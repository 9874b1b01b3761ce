//! Interactive command-line front end for the cartwheel shopping assistant.
//!
//! Reads queries from the terminal, streams the assistant's answer as it
//! arrives, and lists each product batch the assistant's searches turn up.
//! The conversation thread is reused across turns until the process ends.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;

use cartwheel::assistant::AssistantClient;
use cartwheel::product::Product;
use cartwheel::runner::Runner;
use cartwheel::search::SerpClient;
use cartwheel::sink::EventSink;

/// Conversational shopping assistant.
#[derive(Debug, Parser)]
#[command(name = "cartwheel", version, about)]
struct Cli {
    /// Run a single query and exit instead of prompting interactively.
    query: Option<String>,
}

/// Sink that renders streamed output directly to the terminal.
struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn on_text_delta(&self, fragment: &str) {
        print!("{fragment}");
        let _ = io::stdout().flush();
    }

    fn on_product_list(&self, products: &[Product]) {
        if products.is_empty() {
            println!("\n(no matching products)");
            return;
        }
        println!("\nFound {} products:", products.len());
        for product in products {
            let rating = product
                .rating
                .map(|r| format!(" [{r:.1}/5]"))
                .unwrap_or_default();
            println!(
                "  {} - {} ({}){rating}",
                product.title, product.price, product.source
            );
        }
        println!();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> cartwheel::Result<()> {
    // Both credentials are preconditions; refuse to start without them.
    let assistant = AssistantClient::from_env()?;
    let backend = Arc::new(SerpClient::from_env()?);
    let mut runner = Runner::new(assistant, backend, Arc::new(ConsoleSink));

    if let Some(query) = cli.query {
        return turn(&mut runner, &query).await;
    }

    println!("Welcome to the cartwheel shopping assistant.");
    println!("Type a query, or 'exit' to quit.");
    loop {
        let Some(query) = prompt("What are you looking for? ")? else {
            return Ok(());
        };
        if query.is_empty() {
            continue;
        }
        // A failed turn is reported but does not end the session.
        if let Err(e) = turn(&mut runner, &query).await {
            eprintln!("error: {e}");
        }
    }
}

/// Run one turn, timing it.
async fn turn<T, S>(runner: &mut Runner<T, S>, query: &str) -> cartwheel::Result<()>
where
    T: cartwheel::assistant::RunTransport,
    S: cartwheel::search::ShoppingBackend,
{
    println!("Searching for {query}...");
    let started = Instant::now();
    runner.start(query).await?;
    println!("\nDone in {:.1}s.", started.elapsed().as_secs_f32());
    Ok(())
}

/// Prompt for a line; `None` on end-of-input or an exit word.
fn prompt(label: &str) -> cartwheel::Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }

    let query = line.trim();
    if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
        return Ok(None);
    }
    Ok(Some(query.to_owned()))
}
