//! Plain-text rendering of the note board.

use crate::models::{sort_for_display, Note};

const PINNED: char = '📌';
const UNPINNED: char = '·';
/// Terminal columns taken by the marker and its padding. The pin emoji is
/// double width, so both markers fill three columns.
const MARKER_COLUMNS: usize = 3;

/// Render notes as a board, pinned notes first.
///
/// Example output:
/// ```text
/// 📌 [1718000000002] #ff0000  Buy milk
/// ·  [1718000000001] #ffeb3b  Call the plumber
///                             about the sink
/// ```
pub fn render_board(notes: &[Note]) -> String {
    if notes.is_empty() {
        return "No notes yet.\n".to_string();
    }

    let mut output = String::new();
    for note in sort_for_display(notes) {
        render_note(&mut output, &note);
    }
    output
}

fn render_note(output: &mut String, note: &Note) {
    let marker = if note.pinned {
        format!("{} ", PINNED)
    } else {
        format!("{}  ", UNPINNED)
    };
    let label = format!("[{}] {:<8} ", note.id, note.color);
    let indent = " ".repeat(MARKER_COLUMNS + label.chars().count());

    let mut lines = note.text.lines();
    output.push_str(&marker);
    output.push_str(&label);
    output.push_str(lines.next().unwrap_or(""));
    output.push('\n');

    // Continuation lines line up under the first line of text
    for line in lines {
        output.push_str(&indent);
        output.push_str(line);
        output.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_note(id: i64, text: &str, pinned: bool) -> Note {
        Note {
            id,
            text: text.to_string(),
            color: "#ffeb3b".to_string(),
            pinned,
        }
    }

    #[test]
    fn test_empty_board() {
        assert_eq!(render_board(&[]), "No notes yet.\n");
    }

    #[test]
    fn test_single_note() {
        let output = render_board(&[make_note(1, "Buy milk", false)]);
        assert_eq!(output, "·  [1] #ffeb3b  Buy milk\n");
    }

    #[test]
    fn test_pinned_note_rendered_first() {
        let output = render_board(&[make_note(1, "later", false), make_note(2, "first", true)]);
        assert_eq!(output, "📌 [2] #ffeb3b  first\n·  [1] #ffeb3b  later\n");
    }

    #[test]
    fn test_multiline_text_is_indented() {
        let output = render_board(&[make_note(3, "one\ntwo", false)]);
        assert_eq!(output, "·  [3] #ffeb3b  one\n                two\n");
    }

    #[test]
    fn test_pinned_multiline_text_lines_up_with_unpinned() {
        let output = render_board(&[make_note(3, "one\ntwo", true)]);
        assert_eq!(output, "📌 [3] #ffeb3b  one\n                two\n");
    }
}
