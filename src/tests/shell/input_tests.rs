use super::*;

#[test]
fn editing_handles_multibyte_chars() {
    let mut input = Input::default();
    for c in "Añadir".chars() {
        input.insert_char(c);
    }
    input.move_left();
    input.move_left();
    input.backspace();
    assert_eq!(input.buf, "Añair");
    assert_eq!(input.cursor, 3);
    input.delete();
    assert_eq!(input.buf, "Añar");
    input.end();
    input.delete();
    assert_eq!(input.buf, "Añar");
    assert_eq!(input.cursor, 4);
}

#[test]
fn history_walks_back_and_forth() {
    let mut input = Input::default();
    input.push_history("first");
    input.push_history("second");
    input.push_history("second");
    assert_eq!(input.history.len(), 2);

    input.history_up();
    assert_eq!(input.buf, "second");
    input.history_up();
    assert_eq!(input.buf, "first");
    input.history_up();
    assert_eq!(input.buf, "first");
    input.history_down();
    assert_eq!(input.buf, "second");
    input.history_down();
    assert_eq!(input.buf, "");
    assert_eq!(input.history_pos, None);
}

#[test]
fn take_empties_the_line() {
    let mut input = Input::default();
    input.set("Mark Rahul present".to_string());
    assert_eq!(input.take(), "Mark Rahul present");
    assert!(input.buf.is_empty());
    assert_eq!(input.cursor, 0);
}
