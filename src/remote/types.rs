//! Wire shapes of the session and voice services.

use serde::{Deserialize, Serialize};

use crate::model::Cell;

#[derive(Debug, Deserialize)]
pub(super) struct StartSessionResponse {
    #[serde(default, rename = "sessionId")]
    pub(super) session_id: Option<String>,
    #[serde(default)]
    pub(super) error: Option<String>,
}

/// `{ success: true, path? } | { error }` as returned by upload and open-local.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TableResponse {
    #[serde(default)]
    pub(super) headers: Option<Vec<Cell>>,
    #[serde(default)]
    pub(super) rows: Option<Vec<Vec<Cell>>>,
    #[serde(default)]
    pub(super) error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct TextCommandRequest<'a> {
    pub(super) text: &'a str,
}

/// What the remote parser made of a command. Every part is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct RemoteParsed {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    /// Number or string, depending on the backend.
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl RemoteParsed {
    pub fn summary(&self) -> String {
        fn part(s: &Option<String>) -> &str {
            s.as_deref().filter(|s| !s.is_empty()).unwrap_or("-")
        }
        let value = match &self.value {
            None | Some(serde_json::Value::Null) => "-".to_string(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(v) => v.to_string(),
        };
        format!(
            "Action: {}, Name: {}, Subject: {}, Value: {}",
            part(&self.action),
            part(&self.name),
            part(&self.subject),
            value
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct VoiceSteps {
    #[serde(default)]
    pub executed: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Speaker {
    pub name: String,
    #[serde(default)]
    pub score: f64,
}

/// Response of `POST /voice/text` and `POST /voice/command`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct VoiceResponse {
    #[serde(default)]
    pub parsed: Option<RemoteParsed>,
    #[serde(default)]
    pub steps: Option<VoiceSteps>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub speaker: Option<Speaker>,
}

impl VoiceResponse {
    pub fn executed(&self) -> bool {
        self.steps.as_ref().is_some_and(|s| s.executed)
    }
}
