//! beaconq CLI: inspect and edit persisted beacon queues.

use beacon_queue::config::Config;
use beacon_queue::queue::Queue;
use beacon_queue::storage::Store;
use beacon_queue::telemetry::{TelemetryConfig, init_telemetry};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;

#[derive(Parser)]
#[command(name = "beaconq", about = "Persistent queue for outbound tracking beacons")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append items and save
    Add {
        /// Queue name
        queue: String,
        /// Items as JSON (bare words are stored as strings)
        #[arg(required = true)]
        items: Vec<String>,
        /// Split a JSON array argument into one entry per element
        #[arg(long)]
        bulk: bool,
    },
    /// Print every item, oldest first
    List { queue: String },
    /// Print the oldest item
    First { queue: String },
    /// Print the newest item
    Last { queue: String },
    /// Remove and print the oldest item
    Shift { queue: String },
    /// Replace the whole queue with a JSON array
    Replace { queue: String, items: String },
    /// Remove every item
    Clear { queue: String },
    /// Print entries with ids and timestamps
    Entries { queue: String },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    init_telemetry(TelemetryConfig {
        log_level: config.log_level.clone(),
        ..TelemetryConfig::default()
    })?;

    let store = config.open_store()?;
    info!(backend = %config.backend, path = ?config.store_path, "store opened");

    match cli.command {
        Command::Add { queue, items, bulk } => cmd_add(store, queue, items, bulk),
        Command::List { queue } => {
            let queue = Queue::new(queue, store)?;
            match queue.all() {
                Some(items) => print_json(&Value::Array(items)),
                None => {
                    println!("(empty)");
                    Ok(())
                }
            }
        }
        Command::First { queue } => {
            let queue = Queue::new(queue, store)?;
            print_optional(queue.first())
        }
        Command::Last { queue } => {
            let queue = Queue::new(queue, store)?;
            print_optional(queue.last())
        }
        Command::Shift { queue } => {
            let mut queue = Queue::new(queue, store)?;
            let item = queue.shift()?;
            info!(queue = queue.name(), remaining = queue.len(), "shifted");
            print_optional(item.as_ref())
        }
        Command::Replace { queue, items } => {
            let items: Value = serde_json::from_str(&items)?;
            let mut queue = Queue::new(queue, store)?;
            queue.replace(items)?;
            info!(queue = queue.name(), entries = queue.len(), "replaced");
            Ok(())
        }
        Command::Clear { queue } => {
            let mut queue = Queue::new(queue, store)?;
            queue.replace(Vec::<Value>::new())?;
            info!(queue = queue.name(), "cleared");
            Ok(())
        }
        Command::Entries { queue } => {
            let queue = Queue::new(queue, store)?;
            print_json(&serde_json::to_value(queue.entries())?)
        }
    }
}

fn cmd_add(store: impl Store, name: String, items: Vec<String>, bulk: bool) -> anyhow::Result<()> {
    let mut queue = Queue::new(name, store)?;

    for raw in items {
        let value = parse_item(&raw);
        if bulk {
            queue.add(value);
        } else {
            queue.add_one(value);
        }
    }
    queue.save()?;

    info!(queue = queue.name(), entries = queue.len(), "items added");
    Ok(())
}

/// Parse an argument as JSON, falling back to a plain string.
fn parse_item(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn print_optional(item: Option<&Value>) -> anyhow::Result<()> {
    match item {
        Some(item) => print_json(item),
        None => {
            println!("(empty)");
            Ok(())
        }
    }
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
