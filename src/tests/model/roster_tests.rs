use super::*;

fn snapshot(headers: &[&str], rows: &[&[&str]]) -> TableSnapshot {
    TableSnapshot::local_preview(
        headers.iter().map(|h| Cell::from(*h)).collect(),
        rows.iter()
            .map(|r| r.iter().map(|c| Cell::from(*c)).collect())
            .collect(),
    )
}

#[test]
fn demo_roster_has_four_students_and_three_fields() {
    let roster = Roster::from_snapshot(&TableSnapshot::demo());
    let names = roster
        .entries()
        .iter()
        .map(|e| e.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        ["Priya Sharma", "Rahul Kumar", "Ananya Singh", "Arjun Patel"]
    );
    assert_eq!(roster.fields(), ["dsa", "web", "ml"]);
    assert_eq!(roster.attendance_field(), Some("attendance"));
    assert_eq!(roster.entries()[1].attendance, Some(92));
}

#[test]
fn name_column_is_found_by_header() {
    let roster = Roster::from_snapshot(&snapshot(
        &["Roll", "Student", "Maths"],
        &[&["1", "Meera Iyer", "70"], &["2", "", "65"]],
    ));
    assert_eq!(roster.entries().len(), 1);
    assert_eq!(roster.entries()[0].name, "Meera Iyer");
    assert_eq!(roster.entries()[0].row, 0);
    assert_eq!(roster.fields(), ["roll", "maths"]);
    assert_eq!(roster.attendance_field(), None);
}

#[test]
fn first_column_is_the_fallback_name_column() {
    let roster = Roster::from_snapshot(&snapshot(&["Who", "DSA"], &[&["Kabir", "50"]]));
    assert_eq!(roster.entries()[0].name, "Kabir");
    assert_eq!(roster.fields(), ["dsa"]);
}

#[test]
fn entity_resolution_is_first_substring_match() {
    let roster = Roster::from_snapshot(&TableSnapshot::demo());
    // "ar" is in "Sharma" (row 0) before "Arjun" (row 3).
    assert_eq!(
        roster.resolve_entity("AR").map(|e| e.row),
        Some(0)
    );
    assert_eq!(roster.resolve_entity("arjun").map(|e| e.row), Some(3));
    assert!(roster.resolve_entity("zed").is_none());
    assert!(roster.resolve_entity("  ").is_none());
}

#[test]
fn field_resolution_is_exact_and_case_insensitive() {
    let roster = Roster::from_snapshot(&TableSnapshot::demo());
    assert_eq!(roster.resolve_field("DSA"), Some("dsa"));
    assert_eq!(roster.resolve_field("ds"), None);
    assert_eq!(roster.resolve_field("attendance"), None);
}

#[test]
fn percent_cells_parse_in_every_shape() {
    assert_eq!(parse_percent(&Cell::from("92%")), Some(92));
    assert_eq!(parse_percent(&Cell::from(" 92 ")), Some(92));
    assert_eq!(parse_percent(&Cell::from(92.4)), Some(92));
    assert_eq!(parse_percent(&Cell::from(-3.0)), Some(0));
    assert_eq!(parse_percent(&Cell::from("n/a")), None);
}

#[test]
fn empty_snapshot_gives_empty_roster() {
    let roster = Roster::from_snapshot(&TableSnapshot::local_preview(vec![], vec![]));
    assert_eq!(roster, Roster::default());
}

#[test]
fn student_name_header_marks_the_name_column() {
    let roster = Roster::from_snapshot(&snapshot(
        &["Roll", "Student Name", "Attendance"],
        &[&["7", "Kavya Nair", "88%"]],
    ));
    assert_eq!(roster.entries()[0].name, "Kavya Nair");
    assert_eq!(roster.entries()[0].attendance, Some(88));
    assert_eq!(roster.fields(), ["roll"]);
}
