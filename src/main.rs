use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use voicesheet::dispatch::TurnReport;
use voicesheet::engine::Engine;
use voicesheet::grammar::{self, UNRECOGNIZED_HINT};
use voicesheet::messages::{EntryKind, LogEntry};
use voicesheet::model::{EngineConfig, Roster, TableSnapshot};
use voicesheet::{preview, shell};

#[derive(Parser)]
#[command(name = "voicesheet")]
#[command(
    about = "Drive a remote spreadsheet session with short typed or spoken commands",
    long_about = None
)]
struct Cli {
    /// JSON config file (session_url, voice_url, attendance_step, highlight_ms, request_timeout_secs)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Session service base URL (e.g. http://127.0.0.1:8000/api)
    #[arg(long, global = true)]
    session_url: Option<String>,

    /// Voice service base URL (defaults to the session URL)
    #[arg(long, global = true)]
    voice_url: Option<String>,

    /// Per-request timeout in seconds; 0 disables it
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Reuse an existing session instead of starting a new one
    #[arg(long, global = true)]
    session_id: Option<String>,

    /// Log filter when RUST_LOG is unset (default: warn; off for the shell)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interpret a command locally, without contacting any service
    Parse {
        text: String,
        /// CSV/TSV file to take the roster from (defaults to the demo table)
        #[arg(long)]
        table: Option<PathBuf>,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Send a typed command to the voice service and refresh the table
    Exec {
        text: String,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Capture and execute one spoken command
    Listen {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload a spreadsheet into the session
    Upload {
        file: PathBuf,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Have the server open its local spreadsheet
    OpenLocal {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Download the current workbook
    Download {
        /// Destination (defaults to sheet-current-<timestamp>.xlsx)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the session's current table
    Table {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Start a session and print its id
    Start,

    /// Interactive terminal shell
    Shell,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.parse().unwrap_or_default()),
        )
        .init();
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut cfg = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(url) = &cli.session_url {
        cfg.session_url = url.clone();
    }
    if let Some(url) = &cli.voice_url {
        cfg.voice_url = Some(url.clone());
    }
    if let Some(secs) = cli.timeout_secs {
        cfg.request_timeout_secs = secs;
    }
    Ok(cfg)
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Shell => "off",
        _ => "warn",
    };
    init_tracing(cli.log_level.as_deref().unwrap_or(default_level));

    let cfg = load_config(&cli)?;
    tracing::debug!(session_url = cfg.session_url(), voice_url = cfg.voice_url(), "config loaded");

    if let Commands::Parse { text, table, json } = &cli.command {
        return parse_locally(text, table.as_ref(), *json, &cfg);
    }

    let engine = match &cli.session_id {
        Some(id) => Engine::resume(cfg, id)?,
        None => Engine::new(cfg)?,
    };
    let engine = Arc::new(engine);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;

    if let Commands::Shell = cli.command {
        return shell::run(engine, rt.handle().clone());
    }

    rt.block_on(run_remote(&engine, cli.command))
}

fn parse_locally(
    text: &str,
    table: Option<&PathBuf>,
    json: bool,
    cfg: &EngineConfig,
) -> Result<()> {
    let snapshot = match table {
        Some(path) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
            preview::parse_preview(path, &bytes)
                .with_context(|| format!("parse {}", path.display()))?
        }
        None => TableSnapshot::demo(),
    };
    let roster = Roster::from_snapshot(&snapshot);
    let command = grammar::parse(text, &roster, cfg.attendance_step);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&command).context("serialize command json")?
        );
    } else if command.is_recognized() {
        println!("{}", command.summary());
    } else {
        println!("{}", UNRECOGNIZED_HINT);
    }
    Ok(())
}

async fn run_remote(engine: &Engine, command: Commands) -> Result<()> {
    let mark = engine.log_len();

    match command {
        Commands::Exec { text, json } => {
            let report = engine.submit(&text).await;
            emit_log(engine, mark, json);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("serialize report json")?
                );
            }
            if !report.is_ok() {
                bail!("{}", turn_failure("command", &report));
            }
        }
        Commands::Listen { json } => {
            let report = engine.listen().await;
            emit_log(engine, mark, json);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("serialize report json")?
                );
            }
            if !report.is_ok() {
                bail!("{}", turn_failure("voice command", &report));
            }
        }
        Commands::Upload { file, json } => {
            let res = engine.pick_file(&file).await;
            emit_log(engine, mark, json);
            if res.is_err() {
                bail!("upload of {} failed", file.display());
            }
            finish_with_table(engine, json)?;
        }
        Commands::OpenLocal { json } => {
            let res = engine.open_local().await;
            emit_log(engine, mark, json);
            if res.is_err() {
                bail!("open-local failed");
            }
            finish_with_table(engine, json)?;
        }
        Commands::Download { out } => {
            let res = engine.download(out).await;
            emit_log(engine, mark, false);
            let Ok(done) = res else {
                bail!("download failed");
            };
            println!("{}", done.path.display());
        }
        Commands::Table { json } => {
            let res = engine.refresh().await;
            emit_log(engine, mark, true);
            if res.is_err() {
                bail!("table fetch failed (pass --session-id to reuse a session)");
            }
            finish_with_table(engine, json)?;
        }
        Commands::Start => {
            let res = engine.start().await;
            emit_log(engine, mark, true);
            let Ok(id) = res else {
                bail!("could not start a session");
            };
            println!("{}", id);
        }
        Commands::Parse { .. } | Commands::Shell => {}
    }
    Ok(())
}

fn turn_failure(what: &str, report: &TurnReport) -> String {
    if report.response.is_some() {
        format!("{} was not executed", what)
    } else {
        format!("{} was not delivered", what)
    }
}

/// Print what the engine logged since `mark`. Errors go to stderr; with
/// `quiet` only errors are printed.
fn emit_log(engine: &Engine, mark: usize, quiet: bool) {
    for entry in engine.log_since(mark) {
        print_entry(&entry, quiet);
    }
}

fn print_entry(entry: &LogEntry, quiet: bool) {
    match entry.kind {
        EntryKind::Error => eprintln!("error: {}", entry.text),
        _ if quiet => {}
        EntryKind::User => println!("> {}", entry.text),
        EntryKind::Info | EntryKind::Success => println!("{}", entry.text),
    }
}

fn finish_with_table(engine: &Engine, json: bool) -> Result<()> {
    let Some(snapshot) = engine.snapshot() else {
        return Ok(());
    };
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("serialize table json")?
        );
        return Ok(());
    }

    println!("{}", snapshot.header_labels().join("\t"));
    for r in 0..snapshot.rows.len() {
        println!("{}", snapshot.render_row(r).join("\t"));
    }
    Ok(())
}
