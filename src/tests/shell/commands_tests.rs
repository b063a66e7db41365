use super::*;

#[test]
fn plain_text_is_a_sheet_command() {
    assert_eq!(
        parse_line("  Add 85 for Priya in DSA ").expect("parse"),
        Some(ShellCommand::Submit("Add 85 for Priya in DSA".to_string()))
    );
    assert_eq!(parse_line("   ").expect("parse"), None);
}

#[test]
fn slash_commands_parse() {
    assert_eq!(
        parse_line("/upload marks.csv").expect("parse"),
        Some(ShellCommand::Upload(PathBuf::from("marks.csv")))
    );
    assert_eq!(
        parse_line("/download").expect("parse"),
        Some(ShellCommand::Download(None))
    );
    assert_eq!(
        parse_line("/download out.xlsx").expect("parse"),
        Some(ShellCommand::Download(Some(PathBuf::from("out.xlsx"))))
    );
    assert_eq!(parse_line("/OPEN").expect("parse"), Some(ShellCommand::Open));
    assert_eq!(parse_line("/q").expect("parse"), Some(ShellCommand::Quit));
}

#[test]
fn quoted_paths_keep_spaces() {
    assert_eq!(
        parse_line(r#"/upload "Class Marks.csv""#).expect("parse"),
        Some(ShellCommand::Upload(PathBuf::from("Class Marks.csv")))
    );
    assert_eq!(
        parse_line(r"/upload Class\ Marks.csv").expect("parse"),
        Some(ShellCommand::Upload(PathBuf::from("Class Marks.csv")))
    );
}

#[test]
fn bad_arguments_show_usage() {
    let err = parse_line("/upload").expect_err("missing path");
    assert_eq!(err.to_string(), "usage: /upload <path>");
    let err = parse_line("/refresh now").expect_err("extra arg");
    assert_eq!(err.to_string(), "usage: /refresh");
    let err = parse_line("/frobnicate").expect_err("unknown");
    assert_eq!(err.to_string(), "unknown command: /frobnicate");
}

#[test]
fn tokenize_rejects_open_quotes() {
    assert!(tokenize(r#"upload "half"#).is_err());
    assert!(tokenize(r#"upload "half\""#).is_err());
}

#[test]
fn windows_paths_keep_their_backslashes() {
    assert_eq!(
        parse_line(r"/upload C:\data\m.csv").expect("parse"),
        Some(ShellCommand::Upload(PathBuf::from(r"C:\data\m.csv")))
    );
    assert_eq!(
        tokenize(r#"upload "C:\My Sheets\m.csv""#).expect("tokenize"),
        vec!["upload".to_string(), r"C:\My Sheets\m.csv".to_string()]
    );
    assert_eq!(
        tokenize(r#"say "she said \"hi\" \\ ok""#).expect("tokenize"),
        vec!["say".to_string(), r#"she said "hi" \ ok"#.to_string()]
    );
}

#[test]
fn only_network_commands_are_remote() {
    assert!(ShellCommand::Refresh.is_remote());
    assert!(ShellCommand::Submit("x".to_string()).is_remote());
    assert!(!ShellCommand::Reset.is_remote());
    assert!(!ShellCommand::Help.is_remote());
}

#[test]
fn help_lists_every_command() {
    let lines = help_lines();
    for def in COMMANDS {
        assert!(lines.iter().any(|l| l.contains(def.usage)), "{}", def.usage);
    }
}
