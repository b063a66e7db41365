use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::model::{AttendanceMark, Intent, Roster, Target};

pub struct RuleContext<'a> {
    pub roster: &'a Roster,
    pub attendance_step: u32,
}

type BuildFn = fn(&Captures<'_>, &RuleContext<'_>) -> Option<Intent>;

/// A surface pattern paired with the constructor that resolves its captures.
pub struct Rule {
    pub name: &'static str,
    pattern: Regex,
    build: BuildFn,
}

impl Rule {
    /// Surface match only; no roster resolution.
    pub fn matches(&self, normalized: &str) -> bool {
        self.pattern.is_match(normalized)
    }

    pub fn apply(&self, normalized: &str, ctx: &RuleContext<'_>) -> Option<Intent> {
        let caps = self.pattern.captures(normalized)?;
        (self.build)(&caps, ctx)
    }
}

/// Rules in precedence order.
pub fn rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            Rule {
                name: "add_score",
                pattern: compile(r"\badd\s+(\d+)\s+for\s+(\w+)\s+in\s+(\w+)"),
                build: build_add_score,
            },
            Rule {
                name: "set_attendance",
                pattern: compile(r"\bmark\s+(\w+)\s+(present|absent)\b"),
                build: build_set_attendance,
            },
        ]
    })
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("grammar pattern is valid")
}

fn build_add_score(caps: &Captures<'_>, ctx: &RuleContext<'_>) -> Option<Intent> {
    let value = caps.get(1)?.as_str();
    let entity = ctx.roster.resolve_entity(caps.get(2)?.as_str())?;
    let field = ctx.roster.resolve_field(caps.get(3)?.as_str())?;
    Some(Intent::AddScore {
        target: Target {
            entity_name: entity.name.clone(),
            row: entity.row,
        },
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn build_set_attendance(caps: &Captures<'_>, ctx: &RuleContext<'_>) -> Option<Intent> {
    let entity = ctx.roster.resolve_entity(caps.get(1)?.as_str())?;
    let mark = AttendanceMark::parse(caps.get(2)?.as_str())?;
    Some(Intent::SetAttendance {
        target: Target {
            entity_name: entity.name.clone(),
            row: entity.row,
        },
        mark,
        percent: entity
            .attendance
            .map(|current| mark.apply(current, ctx.attendance_step)),
    })
}
