//! CaskDB CLI
//!
//! Command-line interface for a local CaskDB data directory.

use clap::{Parser, Subcommand};
use caskdb::{Config, Engine, IteratorOptions};
use tracing_subscriber::{fmt, EnvFilter};

/// CaskDB CLI
#[derive(Parser, Debug)]
#[command(name = "caskdb-cli")]
#[command(about = "CLI for the CaskDB embedded key-value store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./caskdb_data")]
    dir: String,

    /// Segment size limit in MB before rotation
    #[arg(short = 'm', long, default_value = "256")]
    max_segment_mb: u64,

    /// fsync after every write
    #[arg(short, long)]
    sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Delete {
        /// The key to delete
        key: String,
    },

    /// List key-value pairs in key order
    Scan {
        /// Only keys starting with this prefix
        #[arg(short, long, default_value = "")]
        prefix: String,

        /// Descending order
        #[arg(short, long)]
        reverse: bool,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,caskdb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> caskdb::Result<()> {
    let config = Config::builder()
        .dir_path(&args.dir)
        .max_segment_size(args.max_segment_mb * 1024 * 1024)
        .sync_on_write(args.sync)
        .build();

    let engine = Engine::open(config)?;

    match args.command {
        Commands::Get { key } => {
            let value = engine.get(key.as_bytes())?;
            println!("{}", String::from_utf8_lossy(&value));
        }
        Commands::Put { key, value } => {
            engine.put(key.as_bytes(), value.as_bytes())?;
            println!("OK");
        }
        Commands::Delete { key } => {
            engine.delete(key.as_bytes())?;
            println!("OK");
        }
        Commands::Scan { prefix, reverse } => {
            let options = IteratorOptions::with_prefix(prefix).reverse(reverse);
            let mut iter = engine.iter(options);
            while iter.valid() {
                let value = iter.value()?;
                println!(
                    "{}\t{}",
                    String::from_utf8_lossy(iter.key()),
                    String::from_utf8_lossy(&value)
                );
                iter.next();
            }
            iter.close();
        }
    }

    engine.close()
}
