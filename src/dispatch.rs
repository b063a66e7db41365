//! One command turn: advisory local parse, remote execution, then a table
//! refresh and highlight if (and only if) the remote side executed it.
//!
//! A turn only reaches [`DispatchPhase::Succeeded`] when the voice service
//! reports `steps.executed`; a 2xx reply that did not execute ends `Failed`.

use serde::Serialize;

use crate::engine::Engine;
use crate::grammar::{self, UNRECOGNIZED_HINT};
use crate::model::Command;
use crate::remote::{RemoteError, VoiceResponse};

const NOT_EXECUTED: &str = "Command was not executed";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPhase {
    #[default]
    Idle,
    Submitted,
    LocallyRecognized,
    LocallyUnrecognized,
    AwaitingRemote,
    Succeeded,
    Failed,
}

/// What happened during one turn.
#[derive(Clone, Debug, Serialize)]
pub struct TurnReport {
    /// Local reading of the text (for voice turns, of the transcript).
    pub command: Option<Command>,
    pub response: Option<VoiceResponse>,
    pub executed: bool,
    pub refreshed: bool,
    /// `(row, column)` highlighted after execution.
    pub highlighted: Option<(usize, String)>,
    pub error: Option<String>,
    pub phase: DispatchPhase,
}

impl TurnReport {
    fn new(command: Option<Command>) -> Self {
        Self {
            command,
            response: None,
            executed: false,
            refreshed: false,
            highlighted: None,
            error: None,
            phase: DispatchPhase::Submitted,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.phase == DispatchPhase::Succeeded
    }
}

impl Engine {
    fn set_phase(&self, phase: DispatchPhase) {
        tracing::trace!(?phase, "dispatch phase");
        self.view().phase = phase;
    }

    /// Echo the local reading; returns the cell it would touch.
    fn local_phase(&self, command: &Command) -> Option<(usize, String)> {
        let roster = self.roster();
        let mut view = self.view();
        if command.is_recognized() {
            view.phase = DispatchPhase::LocallyRecognized;
            view.log.push_info(format!("Understood: {}", command.summary()));
            command.affected_cell(&roster)
        } else {
            view.phase = DispatchPhase::LocallyUnrecognized;
            view.log.push_info(UNRECOGNIZED_HINT);
            None
        }
    }

    /// Submit typed text. The raw text is always forwarded, recognized or not.
    pub async fn submit(&self, text: &str) -> TurnReport {
        let text = text.trim();
        if text.is_empty() {
            let mut report = TurnReport::new(None);
            report.phase = self.phase();
            return report;
        }

        self.set_phase(DispatchPhase::Submitted);
        self.view().log.push_user(text);

        let command = grammar::parse(text, &self.roster(), self.config().attendance_step);
        tracing::debug!(recognized = command.is_recognized(), "local parse");
        let cell = self.local_phase(&command);
        let mut report = TurnReport::new(Some(command));

        self.start_for_turn().await;

        self.set_phase(DispatchPhase::AwaitingRemote);
        let res = self.session().remote().execute_text(text).await;
        self.settle(&mut report, res, cell, "Command failed").await;
        report
    }

    /// One voice turn: the voice service captures and transcribes, then
    /// executes like a typed command.
    pub async fn listen(&self) -> TurnReport {
        self.set_phase(DispatchPhase::Submitted);
        self.view().log.push_info("Listening for voice...");
        let mut report = TurnReport::new(None);

        self.start_for_turn().await;

        self.set_phase(DispatchPhase::AwaitingRemote);
        let res = self.session().remote().execute_voice().await;

        let mut cell = None;
        if let Ok(resp) = &res {
            if let Some(transcript) = resp.transcript.as_deref().filter(|t| !t.trim().is_empty()) {
                self.view().log.push_user(transcript);
                let command =
                    grammar::parse(transcript, &self.roster(), self.config().attendance_step);
                cell = self.local_phase(&command);
                report.command = Some(command);
            }
            if let Some(speaker) = &resp.speaker {
                self.view().log.push_info(format!(
                    "Speaker: {} ({:.0}%)",
                    speaker.name,
                    speaker.score * 100.0
                ));
            }
        }

        self.settle(&mut report, res, cell, "Voice command failed").await;
        report
    }

    /// The voice service takes the text without a session id; only the
    /// refresh after an executed command needs one. A failed start is logged
    /// and the turn goes on.
    async fn start_for_turn(&self) {
        if let Err(err) = self.session().ensure_session().await {
            self.log_error(Some("Failed to start session"), &err);
        }
    }

    fn finish(&self, report: &mut TurnReport, phase: DispatchPhase) {
        report.phase = phase;
        self.set_phase(phase);
    }

    async fn settle(
        &self,
        report: &mut TurnReport,
        res: Result<VoiceResponse, RemoteError>,
        cell: Option<(usize, String)>,
        fallback: &str,
    ) {
        let resp = match res {
            Ok(resp) => resp,
            Err(err) => {
                let text = match &err {
                    RemoteError::Backend(msg) if msg.trim().is_empty() => fallback.to_string(),
                    other => other.to_string(),
                };
                self.view().log.push_error(text);
                report.error = Some(err.to_string());
                self.finish(report, DispatchPhase::Failed);
                return;
            }
        };

        if let Some(parsed) = &resp.parsed {
            self.view()
                .log
                .push_info(format!("Parsed: {}", parsed.summary()));
        }

        if resp.executed() {
            report.executed = true;
            {
                let mut view = self.view();
                view.log
                    .push_success(resp.message.as_deref().unwrap_or("Command executed"));
                if let Some((row, column)) = &cell {
                    view.highlights.mark(*row, column);
                }
            }
            report.highlighted = cell;
            // Only after the execute response is in hand.
            if self.session().id().is_some() {
                let table = self.session().fetch_table().await;
                report.refreshed = self.apply_table(table);
            } else {
                tracing::debug!("no session; table refresh skipped");
            }
            report.response = Some(resp);
            self.finish(report, DispatchPhase::Succeeded);
            return;
        }

        let message = resp
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(NOT_EXECUTED)
            .to_string();
        self.view().log.push_info(message.as_str());
        report.error = Some(message);
        report.response = Some(resp);
        self.finish(report, DispatchPhase::Failed);
    }
}

#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod tests;
