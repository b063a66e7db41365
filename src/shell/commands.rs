use std::path::PathBuf;

use anyhow::{Result, bail};

/// What one line of shell input asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum ShellCommand {
    /// Plain text: a sheet command for the dispatcher.
    Submit(String),
    Upload(PathBuf),
    Open,
    Download(Option<PathBuf>),
    Refresh,
    Listen,
    Start,
    Reset,
    Clear,
    Help,
    Quit,
}

impl ShellCommand {
    /// Needs the network; runs on a spawned task.
    pub(super) fn is_remote(&self) -> bool {
        matches!(
            self,
            ShellCommand::Submit(_)
                | ShellCommand::Upload(_)
                | ShellCommand::Open
                | ShellCommand::Download(_)
                | ShellCommand::Refresh
                | ShellCommand::Listen
                | ShellCommand::Start
        )
    }
}

pub(super) struct CommandDef {
    pub(super) name: &'static str,
    pub(super) usage: &'static str,
    pub(super) help: &'static str,
}

pub(super) const COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "upload",
        usage: "/upload <path>",
        help: "preview a file and upload it to the session",
    },
    CommandDef {
        name: "open",
        usage: "/open",
        help: "have the server open its local sheet",
    },
    CommandDef {
        name: "download",
        usage: "/download [path]",
        help: "save the current workbook",
    },
    CommandDef {
        name: "refresh",
        usage: "/refresh",
        help: "reload the table from the server",
    },
    CommandDef {
        name: "listen",
        usage: "/listen",
        help: "capture one voice command",
    },
    CommandDef {
        name: "start",
        usage: "/start",
        help: "start a session now",
    },
    CommandDef {
        name: "reset",
        usage: "/reset",
        help: "back to the demo table",
    },
    CommandDef {
        name: "clear",
        usage: "/clear",
        help: "clear the message log",
    },
    CommandDef {
        name: "help",
        usage: "/help",
        help: "show this list",
    },
    CommandDef {
        name: "quit",
        usage: "/quit",
        help: "leave the shell",
    },
];

pub(super) fn help_lines() -> Vec<String> {
    let mut out = vec!["Type a command like 'Add 85 for Priya in DSA', or:".to_string()];
    out.extend(
        COMMANDS
            .iter()
            .map(|c| format!("{: <18} {}", c.usage, c.help)),
    );
    out.push("Quote paths with spaces: /upload \"C:\\My Sheets\\marks.xlsx\"".to_string());
    out
}

pub(super) fn parse_line(line: &str) -> Result<Option<ShellCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(ShellCommand::Submit(line.to_string())));
    };

    let args = tokenize(rest)?;
    let Some((name, args)) = args.split_first() else {
        bail!("empty command; try /help");
    };

    let cmd = match (name.to_ascii_lowercase().as_str(), args) {
        ("upload", [path]) => ShellCommand::Upload(PathBuf::from(path)),
        ("upload", _) => bail!("usage: /upload <path>"),
        ("open", []) => ShellCommand::Open,
        ("download", []) => ShellCommand::Download(None),
        ("download", [path]) => ShellCommand::Download(Some(PathBuf::from(path))),
        ("download", _) => bail!("usage: /download [path]"),
        ("refresh", []) => ShellCommand::Refresh,
        ("listen", []) => ShellCommand::Listen,
        ("start", []) => ShellCommand::Start,
        ("reset", []) => ShellCommand::Reset,
        ("clear", []) => ShellCommand::Clear,
        ("help", _) => ShellCommand::Help,
        ("quit" | "exit" | "q", []) => ShellCommand::Quit,
        (other, _) => match COMMANDS.iter().find(|c| c.name == other) {
            Some(def) => bail!("usage: {}", def.usage),
            None => bail!("unknown command: /{}", other),
        },
    };
    Ok(Some(cmd))
}

pub(super) fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in input.chars() {
        if escape {
            // Only `\"` and `\\` are escapes; other backslashes stay.
            if ch != '"' && ch != '\\' {
                cur.push('\\');
            }
            cur.push(ch);
            escape = false;
            continue;
        }

        match ch {
            // Outside quotes a backslash is literal, so Windows paths survive.
            '\\' if in_quotes => {
                escape = true;
            }
            '"' => {
                in_quotes = !in_quotes;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !cur.is_empty() {
                    out.push(cur);
                    cur = String::new();
                }
            }
            c => {
                cur.push(c);
            }
        }
    }

    if in_quotes {
        bail!("unterminated quote");
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../tests/shell/commands_tests.rs"]
mod tests;
