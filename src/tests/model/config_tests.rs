use super::*;

#[test]
fn missing_fields_take_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("voicesheet.json");
    std::fs::write(&path, r#"{ "session_url": "http://sheets.local/api/" }"#).expect("write");

    let cfg = EngineConfig::load(&path).expect("load");
    assert_eq!(cfg.session_url(), "http://sheets.local/api");
    assert_eq!(cfg.voice_url(), "http://sheets.local/api");
    assert_eq!(cfg.attendance_step, DEFAULT_ATTENDANCE_STEP);
    assert_eq!(cfg.highlight_duration(), Duration::from_millis(2000));
    assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(30)));
}

#[test]
fn zero_timeout_disables_it() {
    let cfg = EngineConfig {
        request_timeout_secs: 0,
        ..EngineConfig::default()
    };
    assert_eq!(cfg.request_timeout(), None);
}

#[test]
fn separate_voice_url_is_kept() {
    let cfg = EngineConfig {
        voice_url: Some("http://voice.local:5000/api/".to_string()),
        ..EngineConfig::default()
    };
    assert_eq!(cfg.voice_url(), "http://voice.local:5000/api");
    assert_eq!(cfg.session_url(), DEFAULT_SESSION_URL);
}

#[test]
fn bad_json_names_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ nope").expect("write");

    let err = EngineConfig::load(&path).expect_err("bad json");
    assert!(format!("{:#}", err).contains("broken.json"));
}
