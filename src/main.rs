//! `sheet-feed` binary: load a spreadsheet feed as JSON, or manage its cache.
//!
//! Subcommands: `get` (load a table), `clean` (drop one cache entry), `clean-all` (empty the cache).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rusty_sheet_feed::endpoint::{self, Params, Request};
use rusty_sheet_feed::{Config, Loader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sheet-feed")]
#[command(about = "Load published spreadsheet feeds as typed JSON, with a local cache")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// TOML configuration file (default: built-in options)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose: log cache and fetch decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the table of a feed as JSON
    Get {
        /// Container key, `container/sheet` id or full feed URL
        id: String,

        /// Load mode: load, update, cache or fetch
        #[arg(short, long, default_value = "load")]
        mode: String,

        /// Worksheet name (a number selects by position when no name matches)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Skip the fresh cache read of `load`
        #[arg(long)]
        no_cache: bool,

        /// Wrap the output in a callback (requires `jsonp = true`)
        #[arg(long, value_name = "NAME")]
        callback: Option<String>,
    },
    /// Remove the cache entry of an id
    Clean {
        /// Resource id as passed to `get` (`container/sheet` or URL)
        id: String,
    },
    /// Remove all files in the cache directory
    CleanAll,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,rusty_sheet_feed=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => Config::from_file(path).context("Failed to load configuration")?,
        None => Config::default(),
    };
    let loader = Loader::new(config);

    match args.cmd {
        Command::Get {
            id,
            mode,
            sheet,
            no_cache,
            callback,
        } => {
            let mut params = Params::new();
            params.insert("mode".to_owned(), mode);
            if let Some(sheet) = sheet {
                params.insert("sheet".to_owned(), sheet);
            }
            if no_cache {
                params.insert("cache".to_owned(), "false".to_owned());
            }
            if let Some(callback) = callback {
                params.insert("callback".to_owned(), callback);
            }

            // The id comes from the command line, so it skips the query id
            // filter and may be a full feed URL.
            let response = match Request::try_from(&params) {
                Ok(request) => endpoint::respond(&loader, &Request { id: Some(id), ..request }),
                Err(error) => bail!("{error}"),
            };
            if !response.is_success() {
                bail!("{} {}: {}", response.status, response.reason, response.body);
            }
            println!("{}", response.body);
        }
        Command::Clean { id } => {
            let removed = loader
                .cache()
                .remove(&id)
                .with_context(|| format!("Failed to remove cache entry for '{id}'"))?;
            println!("{}", if removed { "removed" } else { "not cached" });
        }
        Command::CleanAll => {
            let removed = loader.cache().clear().context("Failed to clear cache directory")?;
            println!("removed {removed} file(s)");
        }
    }
    Ok(())
}
