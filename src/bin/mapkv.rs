//! mapkv Binary
//!
//! Interactive prompt over one backing file.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mapkv::session::{Session, SessionEnd};
use mapkv::{Config, Encoding, Store};
use tracing_subscriber::{fmt, EnvFilter};

/// mapkv
#[derive(Parser, Debug)]
#[command(name = "mapkv")]
#[command(about = "Memory-mapped key-value store shared between processes")]
#[command(version)]
struct Args {
    /// Backing file
    file: PathBuf,

    /// Record encoding: text or binary
    #[arg(short, long, default_value = "text")]
    encoding: Encoding,

    /// Fail instead of creating a missing backing file
    #[arg(long)]
    no_create: bool,

    /// Flush the mapping to disk after every set
    #[arg(long)]
    sync: bool,

    /// Print every record and exit
    #[arg(long)]
    dump: bool,

    /// Do not print the prompt line
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries prompts and replies
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,mapkv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("mapkv v{}", mapkv::VERSION);

    let config = Config::builder()
        .path(&args.file)
        .encoding(args.encoding)
        .create_if_missing(!args.no_create)
        .sync_on_write(args.sync)
        .build();

    let mut store = match Store::open(config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = if args.dump {
        dump(&mut store)
    } else {
        let stdin = io::stdin();
        let stdout = io::stdout();
        Session::new(stdin.lock(), stdout.lock())
            .with_prompt(!args.quiet)
            .run(&mut store)
            .map(|end| {
                if end == SessionEnd::Eof {
                    tracing::debug!("End of input, closing");
                }
            })
    };

    // Close on every path, fatal or not
    let closed = store.close();

    match (outcome, closed) {
        (Ok(()), Ok(())) => ExitCode::SUCCESS,
        (Err(e), _) | (Ok(()), Err(e)) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn dump(store: &mut Store) -> mapkv::Result<()> {
    for record in store.entries()? {
        println!("{} {}", record.key, record.value);
    }
    Ok(())
}
