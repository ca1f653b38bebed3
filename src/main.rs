//! # Thermoprint CLI
//!
//! Command-line interface for paced printing to a thermal printer.
//!
//! ## Usage
//!
//! ```bash
//! # Print text, then feed three lines
//! thermoprint text "Hello, paper!" --feed 3
//!
//! # Print stdin on a USB serial adapter at 9600 baud
//! echo "from a pipe" | thermoprint --device /dev/ttyUSB0 --baud 9600 text
//!
//! # Feed five lines
//! thermoprint feed 5
//!
//! # Show the effective configuration
//! thermoprint --config printer.json config
//! ```
//!
//! Set `RUST_LOG=thermoprint=debug` to watch the write pacing.

use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use thermoprint::{
    Printer, PrinterConfig, ThermoprintError,
    encoding::{AsciiEncoder, CharEncoder, Utf8Encoder},
    printer::config::per_byte_wait_for_baud,
    transport::{DeviceTransport, device::DEFAULT_DEVICE},
};

/// Thermoprint - Paced thermal printer utility
#[derive(Parser, Debug)]
#[command(name = "thermoprint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Printer device path
    #[arg(long, global = true, default_value = DEFAULT_DEVICE)]
    device: PathBuf,

    /// JSON config file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Serial line rate (derives the per-byte wait)
    #[arg(long, global = true)]
    baud: Option<u32>,

    /// Wait per written byte, in microseconds
    #[arg(long, global = true, value_name = "MICROS")]
    per_byte_wait_us: Option<u64>,

    /// Characters per line
    #[arg(long, global = true)]
    max_column: Option<usize>,

    /// Send plain ASCII, replacing other characters with '?'
    #[arg(long, global = true)]
    ascii: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print text
    Text {
        /// Text to print (reads stdin when omitted)
        text: Option<String>,

        /// Lines to feed after the text
        #[arg(long, default_value = "0")]
        feed: u8,
    },

    /// Feed paper
    Feed {
        /// Number of lines
        lines: u8,
    },

    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ThermoprintError> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if let Commands::Config = cli.command {
        let json = serde_json::to_string_pretty(&config.to_file())
            .map_err(|e| ThermoprintError::Config(e.to_string()))?;
        println!("{}", json);
        return Ok(());
    }

    let transport = DeviceTransport::open(&cli.device)?;
    if cli.ascii {
        execute(Printer::with_encoder(transport, AsciiEncoder, config), cli.command).await
    } else {
        execute(Printer::with_encoder(transport, Utf8Encoder, config), cli.command).await
    }
}

/// Defaults, then the config file, then command-line flags.
fn resolve_config(cli: &Cli) -> Result<PrinterConfig, ThermoprintError> {
    let mut config = match &cli.config {
        Some(path) => PrinterConfig::load(path)?,
        None => PrinterConfig::DEFAULT,
    };

    if let Some(baud) = cli.baud {
        config.baud_rate = baud;
        config.per_byte_wait = per_byte_wait_for_baud(baud);
    }
    if let Some(us) = cli.per_byte_wait_us {
        config.per_byte_wait = Duration::from_micros(us);
    }
    if let Some(columns) = cli.max_column {
        config.max_column = columns;
    }

    config.validate()?;
    Ok(config)
}

async fn execute<E: CharEncoder>(
    printer: Printer<DeviceTransport, E>,
    command: Commands,
) -> Result<(), ThermoprintError> {
    let result = match command {
        Commands::Text { text, feed } => print_text(&printer, text, feed).await,
        Commands::Feed { lines } => printer.feed(lines).await,
        Commands::Config => Ok(()),
    };

    // Release the device even when printing failed.
    let closed = printer.close().await;
    result?;
    closed
}

async fn print_text<E: CharEncoder>(
    printer: &Printer<DeviceTransport, E>,
    text: Option<String>,
    feed: u8,
) -> Result<(), ThermoprintError> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    printer.write(&text).await?;
    if feed > 0 {
        printer.feed(feed).await?;
    }
    Ok(())
}
