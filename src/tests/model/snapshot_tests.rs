use super::*;

#[test]
fn cells_decode_strings_numbers_and_oddities() {
    let cells: Vec<Cell> =
        serde_json::from_str(r#"["Priya", 85, 92.5, null, true]"#).expect("decode");
    assert_eq!(
        cells,
        vec![
            Cell::from("Priya"),
            Cell::Number(85.0),
            Cell::Number(92.5),
            Cell::empty(),
            Cell::from("true"),
        ]
    );
}

#[test]
fn whole_numbers_display_without_fraction() {
    assert_eq!(Cell::Number(85.0).to_string(), "85");
    assert_eq!(Cell::Number(92.5).to_string(), "92.5");
    assert_eq!(
        serde_json::to_string(&Cell::Number(85.0)).expect("encode"),
        "85"
    );
}

#[test]
fn server_table_json_decodes() {
    let snapshot: TableSnapshot = serde_json::from_value(serde_json::json!({
        "headers": ["Name", "DSA"],
        "rows": [["Priya Sharma", 78]],
        "origin": "server_confirmed"
    }))
    .expect("decode");
    assert!(snapshot.is_server_confirmed());
    assert_eq!(snapshot.cell(0, 1), Some(&Cell::Number(78.0)));
    assert_eq!(snapshot.column_index("dsa"), Some(1));
    assert_eq!(snapshot.column_index("web"), None);
}
