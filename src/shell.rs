//! Terminal shell around an [`Engine`]: the table, the message log and an
//! input line. Remote work runs on the tokio runtime so drawing never waits on
//! the network.

use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::runtime::Handle;

use crate::engine::Engine;

mod commands;
mod event_loop;
mod input;
mod render;

use self::commands::{ShellCommand, help_lines, parse_line};
use self::input::Input;

pub(crate) struct App {
    engine: Arc<Engine>,
    handle: Handle,
    input: Input,
    /// Remote calls still in flight.
    busy: Arc<AtomicUsize>,
    /// Lines scrolled up from the bottom of the log.
    log_scroll: usize,
    quit: bool,
}

impl App {
    fn new(engine: Arc<Engine>, handle: Handle) -> Self {
        Self {
            engine,
            handle,
            input: Input::default(),
            busy: Arc::new(AtomicUsize::new(0)),
            log_scroll: 0,
            quit: false,
        }
    }

    fn busy(&self) -> usize {
        self.busy.load(Ordering::SeqCst)
    }

    fn submit_input(&mut self) {
        let line = self.input.take();
        self.input.push_history(&line);
        self.log_scroll = 0;

        match parse_line(&line) {
            Ok(Some(cmd)) => self.run_command(cmd),
            Ok(None) => {}
            Err(err) => self.engine.note_error(format!("{:#}", err)),
        }
    }

    fn run_command(&mut self, cmd: ShellCommand) {
        if cmd.is_remote() {
            self.spawn(cmd);
            return;
        }
        match cmd {
            ShellCommand::Reset => self.engine.reset(),
            ShellCommand::Clear => self.engine.clear_log(),
            ShellCommand::Help => {
                for line in help_lines() {
                    self.engine.note(line);
                }
            }
            ShellCommand::Quit => self.quit = true,
            _ => {}
        }
    }

    fn spawn(&self, cmd: ShellCommand) {
        let engine = self.engine.clone();
        let busy = self.busy.clone();
        busy.fetch_add(1, Ordering::SeqCst);
        self.handle.spawn(async move {
            // Outcomes are already in the message log.
            match cmd {
                ShellCommand::Submit(text) => {
                    engine.submit(&text).await;
                }
                ShellCommand::Upload(path) => {
                    let _ = engine.pick_file(&path).await;
                }
                ShellCommand::Open => {
                    let _ = engine.open_local().await;
                }
                ShellCommand::Download(dest) => {
                    let _ = engine.download(dest).await;
                }
                ShellCommand::Refresh => {
                    let _ = engine.refresh().await;
                }
                ShellCommand::Listen => {
                    engine.listen().await;
                }
                ShellCommand::Start => {
                    let _ = engine.start().await;
                }
                other => tracing::warn!(?other, "not a remote command"),
            }
            busy.fetch_sub(1, Ordering::SeqCst);
        });
    }
}

/// Run the shell until `/quit`. Must be called from outside the runtime that
/// `handle` points at.
pub fn run(engine: Arc<Engine>, handle: Handle) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("shell requires an interactive terminal (TTY)");
    }

    let mut stdout = io::stdout();
    enable_raw_mode().context("enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut app = App::new(engine, handle);
    let res = event_loop::run_loop(&mut terminal, &mut app);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}
