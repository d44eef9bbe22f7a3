use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::SinkKind;

#[derive(Debug, Parser)]
#[command(name = "faderport")]
#[command(about = "Drive a 16-channel control surface with plain-text commands")]
#[command(version)]
pub struct Cli {
    /// Session snapshot file (default: faderport_data.json)
    #[arg(short, long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Where control messages go
    #[arg(long, global = true)]
    pub sink: Option<SinkKind>,

    /// MIDI channel for encoded messages (0-15)
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(0..16))]
    pub channel: Option<u8>,

    /// Pending control messages the output queue holds
    #[arg(long, global = true)]
    pub queue_capacity: Option<usize>,

    /// Log filter, e.g. "debug" or "faderport_core=trace"
    #[arg(long, global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a single command and print the reply
    Exec {
        #[arg(trailing_var_arg = true, required = true)]
        words: Vec<String>,
    },
    /// Summarize the snapshot without opening a session
    Status,
    /// Write the session as JSON to a file or stdout
    Export { output: Option<PathBuf> },
    /// Replace tracks and transport from an exported JSON file
    Import { input: PathBuf },
    /// Print the effective configuration
    Config {
        /// Also save it as the user's config file
        #[arg(long)]
        write: bool,
    },
}
