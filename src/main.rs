//! CLI entry point for pdfetch.

use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Parser;
use futures_util::StreamExt;
use futures_util::stream;
use indicatif::{ProgressBar, ProgressStyle};
use pdfetch::{FetchError, FetchOutcome, Fetcher, Identifier, Store};
use tracing::{debug, info, warn};

mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let store = Store::new(&args.dir);

    match args.command {
        Command::Fetch {
            ids,
            url,
            concurrency,
        } => fetch_command(store, ids, url, concurrency).await,
        Command::Check { id } => check_command(&store, &id),
        Command::List { json } => list_command(&store, json),
        Command::Remove { id } => remove_command(&store, &id),
    }
}

async fn fetch_command(
    store: Store,
    ids: Vec<String>,
    url: Option<String>,
    concurrency: u8,
) -> Result<()> {
    if url.is_some() && ids.len() > 1 {
        bail!("--url names a single article page; pass exactly one identifier with it");
    }

    let mut identifiers = Vec::new();
    for raw in &ids {
        match Identifier::parse(raw) {
            Ok(identifier) => identifiers.push(identifier),
            Err(error) => warn!(input = %raw, %error, "skipping unrecognized identifier"),
        }
    }
    if identifiers.is_empty() {
        bail!("no valid identifiers in input");
    }

    let fetcher = Arc::new(Fetcher::new(store)?);
    let progress = if identifiers.len() > 1 {
        let bar = ProgressBar::new(identifiers.len() as u64);
        bar.set_style(ProgressStyle::with_template(
            "{bar:30} {pos}/{len} {msg}",
        )?);
        Some(bar)
    } else {
        None
    };

    let source_url = url.as_deref();
    let results: Vec<(Identifier, Result<FetchOutcome, FetchError>)> =
        stream::iter(identifiers.into_iter().map(|identifier| {
            let fetcher = fetcher.clone();
            async move {
                let outcome = fetcher.fetch(&identifier, source_url).await;
                (identifier, outcome)
            }
        }))
        .buffer_unordered(usize::from(concurrency))
        .inspect(|_| {
            if let Some(bar) = &progress {
                bar.inc(1);
            }
        })
        .collect()
        .await;

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    let mut stored = 0usize;
    for (identifier, result) in &results {
        match result {
            Ok(FetchOutcome::CacheHit(entry)) => {
                stored += 1;
                println!("{identifier}: already stored at {}", entry.path.display());
            }
            Ok(FetchOutcome::Fetched { entry, finder }) => {
                stored += 1;
                println!(
                    "{identifier}: stored at {} (finder: {finder})",
                    entry.path.display()
                );
            }
            Err(FetchError::NotFound { last_url, .. }) => {
                let tried = last_url
                    .as_deref()
                    .map(|u| format!(" (last tried {u})"))
                    .unwrap_or_default();
                println!("{identifier}: no PDF found{tried}");
            }
            Err(error) => {
                println!("{identifier}: failed ({error})");
            }
        }
    }

    info!(requested = results.len(), stored, "fetch run complete");
    if stored == 0 {
        bail!("no reprints could be fetched");
    }
    Ok(())
}

fn check_command(store: &Store, id: &str) -> Result<()> {
    let identifier = Identifier::parse(id)?;
    match store.get(&identifier)? {
        Some(entry) => {
            println!("{identifier}: stored at {}", entry.path.display());
            Ok(())
        }
        None => bail!("{identifier}: not stored"),
    }
}

fn list_command(store: &Store, json: bool) -> Result<()> {
    let entries = store.entries()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for entry in &entries {
        println!(
            "{}\t{} bytes\t{}",
            entry.identifier,
            entry.size,
            entry.path.display()
        );
    }
    info!(count = entries.len(), "catalog listed");
    Ok(())
}

fn remove_command(store: &Store, id: &str) -> Result<()> {
    let identifier = Identifier::parse(id)?;
    if store.remove(&identifier)? {
        println!("{identifier}: removed");
        Ok(())
    } else {
        bail!("{identifier}: not stored")
    }
}
