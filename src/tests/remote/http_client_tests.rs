use super::*;

#[test]
fn error_field_reads_trimmed_message() {
    assert_eq!(
        error_field(r#"{"error":"  No file uploaded  "}"#).as_deref(),
        Some("No file uploaded")
    );
}

#[test]
fn error_field_ignores_blank_and_non_json_bodies() {
    assert_eq!(error_field(r#"{"error":"   "}"#), None);
    assert_eq!(error_field(r#"{"detail":"nope"}"#), None);
    assert_eq!(error_field("<html>bad gateway</html>"), None);
    assert_eq!(error_field(r#"{"error":42}"#), None);
}

#[test]
fn unreachable_message_names_the_base_url() {
    let err = RemoteError::Unreachable {
        url: "http://127.0.0.1:8000/api".to_string(),
        detail: "connection refused".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Could not reach backend at http://127.0.0.1:8000/api."
    );
    assert!(err.is_unreachable());
}

#[test]
fn timeouts_count_as_unreachable() {
    let err = RemoteError::TimedOut {
        url: "http://voice.local".to_string(),
    };
    assert!(err.is_unreachable());
    assert!(err.to_string().contains("timed out"));
}

#[test]
fn backend_message_is_shown_verbatim() {
    let err = RemoteError::Backend("Student not found: Zed".to_string());
    assert_eq!(err.to_string(), "Student not found: Zed");
    assert!(!err.is_unreachable());
}

#[test]
fn urls_join_trimmed_bases() {
    let cfg = EngineConfig {
        session_url: "http://s.local/api/".to_string(),
        voice_url: Some("http://v.local/".to_string()),
        ..EngineConfig::default()
    };
    let client = RemoteClient::new(&cfg).expect("client");
    assert_eq!(
        client.session_url("/session/start"),
        "http://s.local/api/session/start"
    );
    assert_eq!(client.voice_url("/voice/text"), "http://v.local/voice/text");
}

#[test]
fn voice_base_defaults_to_session_base() {
    let client = RemoteClient::new(&EngineConfig::default()).expect("client");
    assert_eq!(client.voice_base(), client.session_base());
}

#[test]
fn parsed_summary_fills_missing_parts() {
    let parsed: RemoteParsed = serde_json::from_value(serde_json::json!({
        "action": "add",
        "name": "Priya",
        "value": 85
    }))
    .expect("parse");
    assert_eq!(
        parsed.summary(),
        "Action: add, Name: Priya, Subject: -, Value: 85"
    );

    let parsed: RemoteParsed =
        serde_json::from_value(serde_json::json!({ "value": "present" })).expect("parse");
    assert_eq!(
        parsed.summary(),
        "Action: -, Name: -, Subject: -, Value: present"
    );
}

#[test]
fn voice_response_executed_requires_steps() {
    let resp: VoiceResponse = serde_json::from_value(serde_json::json!({
        "message": "Updated",
        "steps": { "executed": true }
    }))
    .expect("parse");
    assert!(resp.executed());

    let resp: VoiceResponse =
        serde_json::from_value(serde_json::json!({ "message": "hi" })).expect("parse");
    assert!(!resp.executed());
}
