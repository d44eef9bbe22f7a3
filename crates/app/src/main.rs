mod cli;
mod config;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use faderport_core::{
    ControlSink, NullSink, Session, SharedSession, control_queue, load_snapshot_metadata,
};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use config::{Config, SinkKind};

const OUTPUT_POLL: Duration = Duration::from_millis(5);
const ACTIVITY_SHOWN: usize = 20;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().with_overrides(&cli);
    init_tracing(&config.log_filter);

    match cli.command {
        None => run_with_session(&config, repl),
        Some(Command::Exec { words }) => run_with_session(&config, |session| {
            println!("{}", session.handle_text(&words.join(" ").to_lowercase()));
            Ok(())
        }),
        Some(Command::Status) => status(&config.snapshot_path),
        Some(Command::Export { output }) => {
            let session = Session::open(&config.snapshot_path, NullSink)?;
            let json = session.export_json()?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("write export {}", path.display()))?,
                None => println!("{json}"),
            }
            Ok(())
        }
        Some(Command::Import { input }) => {
            let json = std::fs::read_to_string(&input)
                .with_context(|| format!("read import {}", input.display()))?;
            let mut session = Session::open(&config.snapshot_path, NullSink)?;
            session.import_json(&json)?;
            println!("Imported {}", input.display());
            Ok(())
        }
        Some(Command::Config { write }) => {
            print!("{}", toml::to_string_pretty(&config)?);
            if write {
                config.save();
            }
            Ok(())
        }
    }
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Open the session with the configured sink, run `body`, then flush and
/// wait for the output thread to drain.
fn run_with_session(
    config: &Config,
    body: impl FnOnce(&SharedSession) -> Result<()>,
) -> Result<()> {
    let (sink, output) = build_sink(config)?;
    let shared = SharedSession::new(Session::open(&config.snapshot_path, sink)?);

    let result = body(&shared);

    match shared.with_session(|session| session.flush()) {
        Ok(Err(error)) => tracing::error!(%error, "failed to save session on exit"),
        Err(error) => tracing::error!(%error, "session unavailable on exit"),
        Ok(Ok(())) => {}
    }
    // Dropping the session releases the queue producer so the thread ends
    drop(shared);

    if let Some(handle) = output {
        match handle.join() {
            Ok(sent) => tracing::debug!(sent, "control output finished"),
            Err(_) => tracing::error!("control output thread panicked"),
        }
    }

    result
}

fn build_sink(
    config: &Config,
) -> Result<(Box<dyn ControlSink + Send>, Option<JoinHandle<usize>>)> {
    match config.sink {
        SinkKind::None => Ok((Box::new(NullSink), None)),
        SinkKind::Queue => {
            let (sink, receiver) = control_queue(config.queue_capacity, config.midi_channel);
            tracing::info!(
                channel = receiver.channel(),
                capacity = config.queue_capacity,
                "control output queued"
            );
            let handle = receiver
                .spawn_logger(OUTPUT_POLL)
                .context("start control output thread")?;
            Ok((Box::new(sink), Some(handle)))
        }
    }
}

fn repl(session: &SharedSession) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    print_prompt(&mut stdout)?;
    for line in stdin.lock().lines() {
        let line = line?;
        let text = line.trim().to_lowercase();

        match text.as_str() {
            "" => {}
            ":quit" | ":q" => break,
            ":activity" => {
                let lines: Vec<String> = session
                    .with_session(|s| {
                        s.activity()
                            .recent(ACTIVITY_SHOWN)
                            .map(|e| e.to_string())
                            .collect()
                    })
                    .unwrap_or_else(|error| vec![error]);
                for entry in lines {
                    writeln!(stdout, "{entry}")?;
                }
            }
            ":info" => {
                let lines: Vec<String> = session
                    .with_session(|s| {
                        let settings = s.settings();
                        vec![
                            format!(
                                "Snapshot: {}",
                                s.snapshot_path()
                                    .map_or("(memory)".to_string(), |p| p.display().to_string())
                            ),
                            format!("Plugins:  {}", s.plugins().join(", ")),
                            format!(
                                "Audio:    {} Hz, buffer {}",
                                settings.audio_sample_rate, settings.buffer_size
                            ),
                        ]
                    })
                    .unwrap_or_else(|error| vec![error]);
                for line in lines {
                    writeln!(stdout, "{line}")?;
                }
            }
            ":clear" => {
                if let Err(error) = session.with_session(|s| s.clear_activity()) {
                    writeln!(stdout, "{error}")?;
                }
            }
            ":tracks" => {
                let lines: Vec<String> = session
                    .with_session(|s| {
                        s.mixer()
                            .tracks()
                            .iter()
                            .map(|t| {
                                format!(
                                    "{:<16} fader {:>3}%  pan {:>3}%{}{}",
                                    t.name,
                                    (t.fader * 100.0).round(),
                                    (t.pan * 100.0).round(),
                                    if t.muted { "  M" } else { "" },
                                    if t.solo { "  S" } else { "" },
                                )
                            })
                            .collect()
                    })
                    .unwrap_or_else(|error| vec![error]);
                for track in lines {
                    writeln!(stdout, "{track}")?;
                }
            }
            text => writeln!(stdout, "{}", session.handle_text(text))?,
        }

        print_prompt(&mut stdout)?;
    }

    Ok(())
}

fn print_prompt(stdout: &mut io::Stdout) -> io::Result<()> {
    write!(stdout, "> ")?;
    stdout.flush()
}

fn status(path: &Path) -> Result<()> {
    let metadata = load_snapshot_metadata(path)
        .with_context(|| format!("read snapshot {}", path.display()))?;

    println!("Snapshot:  {}", path.display());
    println!("Tracks:    {}", metadata.track_count);
    println!("Muted:     {}", metadata.muted_count);
    println!("Soloed:    {}", metadata.soloed_count);
    println!(
        "Transport: {}{}",
        if metadata.playing { "playing" } else { "stopped" },
        if metadata.recording { ", recording" } else { "" },
    );
    println!("Plugins:   {}", metadata.plugins.join(", "));
    if let Some(timestamp) = metadata.timestamp {
        println!("Exported:  {timestamp}");
    }
    Ok(())
}
