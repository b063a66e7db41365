//! Local command grammar.
//!
//! Turns free text into a [`Command`] before anything is sent upstream. The
//! result is advisory: the remote parser decides what actually executes. Rules
//! live in an ordered table (see [`rules`]) and the first rule whose pattern
//! matches *and* whose entity/field resolution succeeds wins.

use crate::model::{Command, Roster};

mod rules;
pub use self::rules::{Rule, RuleContext, rules};

pub const UNRECOGNIZED_HINT: &str = "Command not recognized. Try: 'Add [marks] for [name] in [subject]' or 'Mark [name] present/absent'";

/// Interpret `text` against `roster`. Pure; never fails.
pub fn parse(text: &str, roster: &Roster, attendance_step: u32) -> Command {
    let normalized = text.trim().to_lowercase();
    let ctx = RuleContext {
        roster,
        attendance_step,
    };

    for rule in rules() {
        if let Some(intent) = rule.apply(&normalized, &ctx) {
            return Command {
                raw_text: text.to_string(),
                intent,
            };
        }
    }
    Command::unrecognized(text)
}

#[cfg(test)]
#[path = "tests/grammar_tests.rs"]
mod tests;
