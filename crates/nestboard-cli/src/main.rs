//! Nestboard replay tool.
//!
//! Feeds a JSON-lines log of server messages through a client session and
//! prints the resulting per-canvas object projection.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;
use nestboard_core::{ClientId, Session, StoreConfig, WhiteboardId, WhiteboardStore};

/// Replay command line arguments.
#[derive(Parser, Debug)]
#[command(name = "nestboard")]
#[command(about = "Replay a Nestboard server message log and print the canvas projection")]
#[command(version)]
struct Args {
    /// Message log, one JSON message per line ("-" reads stdin)
    #[arg(value_name = "LOG")]
    log: PathBuf,

    /// Store configuration file (defaults to the user config directory)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Whiteboard to print (defaults to the one the log initializes)
    #[arg(short, long, value_name = "ID")]
    whiteboard: Option<String>,

    /// Client id the session acts as
    #[arg(long, default_value = "nestboard-cli")]
    client_id: String,

    /// Stop at the first message that fails to decode
    #[arg(long)]
    strict: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    log::info!("Starting nestboard replay");

    let config = match args.config.as_deref() {
        Some(path) => StoreConfig::load(path)?,
        None => match StoreConfig::default_path() {
            Some(path) => StoreConfig::load_or_default(&path)?,
            None => StoreConfig::default(),
        },
    };
    log::debug!("store config: {:?}", config);

    let reader: Box<dyn BufRead> = if args.log.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(&args.log)?))
    };

    let mut session = Session::new(ClientId::new(args.client_id), WhiteboardStore::with_config(config));
    let mut applied = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match session.handle_message(&line) {
            Ok(event) => {
                log::debug!("line {}: {:?}", index + 1, event);
                applied += 1;
            }
            Err(err) if args.strict => return Err(format!("line {}: {}", index + 1, err).into()),
            Err(err) => log::warn!("line {}: skipped: {}", index + 1, err),
        }
    }
    log::info!("Applied {} messages", applied);

    let whiteboard = match args.whiteboard {
        Some(id) => WhiteboardId::new(id),
        None => session
            .whiteboard()
            .cloned()
            .ok_or("log never initialized a whiteboard; pass --whiteboard")?,
    };
    let projection = session.store().objects_by_whiteboard(&whiteboard);
    println!("{}", serde_json::to_string_pretty(&projection)?);

    Ok(())
}
