//! End-to-end tests that drive the application purely through key events,
//! the way the terminal loop does.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;

use vsv::{App, AppConfig, Column, ColumnDisplay, Dataset, Mode};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn type_str(app: &mut App, text: &str) {
    for c in text.chars() {
        app.key(key(KeyCode::Char(c)));
    }
}

fn app_with(rows: &[(&str, &str, &str)]) -> App {
    let mut data = Dataset {
        columns: vec![Column::new("name"), Column::new("kind"), Column::new("size")],
        rows: Vec::new(),
    };
    for (name, kind, size) in rows {
        data.push_row(vec![name.to_string(), kind.to_string(), size.to_string()]);
    }
    let mut app = App::new(data, &AppConfig::default());
    app.resize(80, 24);
    app
}

fn sample() -> App {
    app_with(&[
        ("alpha", "dir", "10"),
        ("beta", "file", "200"),
        ("gamma", "file", "3"),
        ("delta", "dir", "41"),
    ])
}

#[test]
fn test_filter_then_sort_then_refilter() {
    let mut app = sample();

    app.key(key(KeyCode::Char('/')));
    type_str(&mut app, "kind == file");
    app.key(key(KeyCode::Enter));
    assert_eq!(app.visible, vec![1, 2]);

    // Sort the filtered set by size, descending.
    app.key(key(KeyCode::Char('c')));
    app.key(ctrl('e'));
    app.key(key(KeyCode::Char('>')));
    assert_eq!(app.visible, vec![1, 2]);
    app.key(key(KeyCode::Char('<')));
    assert_eq!(app.visible, vec![2, 1]);
    app.key(key(KeyCode::Esc));

    // A new filter rebuilds the set in source order.
    app.key(key(KeyCode::Char('/')));
    app.key(ctrl('u'));
    type_str(&mut app, "size > 5");
    app.key(key(KeyCode::Enter));
    assert_eq!(app.visible, vec![0, 1, 3]);
}

#[test]
fn test_filter_prompt_keeps_query_between_uses() {
    let mut app = sample();
    app.key(key(KeyCode::Char('/')));
    type_str(&mut app, "kind == dir");
    app.key(key(KeyCode::Enter));
    assert_eq!(app.visible, vec![0, 3]);

    app.key(ctrl('r'));
    match app.top_mode() {
        Some(Mode::Filter(prompt)) => assert_eq!(prompt.input, "kind == dir"),
        other => panic!("expected filter prompt, got {:?}", other),
    }
    app.key(key(KeyCode::Esc));
    assert_eq!(app.visible.len(), 4);
}

#[test]
fn test_bad_filter_shows_popup_over_prompt() {
    let mut app = sample();
    app.key(key(KeyCode::Char('/')));
    type_str(&mut app, "size >");
    app.key(key(KeyCode::Enter));

    assert!(matches!(app.top_mode(), Some(Mode::Popup(_))));
    assert_eq!(app.mode_depth(), 2);
    // Close the popup; the prompt is still live and editable.
    app.key(key(KeyCode::Esc));
    assert!(matches!(app.top_mode(), Some(Mode::Filter(_))));
    type_str(&mut app, " 5");
    app.key(key(KeyCode::Enter));
    assert_eq!(app.mode_depth(), 0);
    assert_eq!(app.visible, vec![0, 1, 3]);
}

#[test]
fn test_row_select_follows_and_inspects() {
    let mut app = sample();
    app.key(key(KeyCode::Char('r')));
    app.key(key(KeyCode::Down));
    app.key(key(KeyCode::Down));
    app.key(key(KeyCode::Enter));

    let Some(Mode::Popup(popup)) = app.top_mode() else {
        panic!("expected inspection popup");
    };
    let text = popup.lines.join("\n");
    assert!(text.contains("\"name\": \"gamma\""));
    assert!(text.contains("\"size\": 3"));

    app.key(key(KeyCode::Char('q')));
    app.key(key(KeyCode::Esc));
    assert_eq!(app.mode_depth(), 0);
}

#[test]
fn test_row_select_inspects_visible_row_not_source_row() {
    let mut app = sample();
    app.key(key(KeyCode::Char('/')));
    type_str(&mut app, "kind == file");
    app.key(key(KeyCode::Enter));

    // Cursor 1 within the filtered view is source row 2.
    app.key(key(KeyCode::Char('r')));
    app.key(key(KeyCode::Down));
    app.key(key(KeyCode::Enter));
    let Some(Mode::Popup(popup)) = app.top_mode() else {
        panic!("expected inspection popup");
    };
    assert!(popup.lines.join("\n").contains("gamma"));
}

#[test]
fn test_column_pin_and_shell_entry() {
    let mut app = sample();
    app.key(key(KeyCode::Char('c')));
    app.key(key(KeyCode::Right));
    app.key(key(KeyCode::Char('.')));
    assert!(app.data.columns[1].pinned);

    app.key(key(KeyCode::Char('|')));
    match app.top_mode() {
        Some(Mode::Shell(prompt)) => assert_eq!(prompt.column, 1),
        other => panic!("expected shell prompt, got {:?}", other),
    }
    // Backing out returns to column select with the highlight intact.
    app.key(key(KeyCode::Esc));
    assert!(matches!(app.top_mode(), Some(Mode::ColumnSelect(_))));
    assert!(app.data.columns[1].highlighted);
}

#[test]
fn test_stats_popup_from_column_select() {
    let mut app = sample();
    app.key(key(KeyCode::Char('c')));
    app.key(ctrl('e'));
    app.key(key(KeyCode::Char('s')));

    let Some(Mode::Popup(popup)) = app.top_mode() else {
        panic!("expected statistics popup");
    };
    let text = popup.lines.join("\n");
    assert!(text.contains("[ size ]"));
    assert!(text.contains("rows visible: 4 (of 4)"));
}

#[test]
fn test_display_toggles_and_global_expand() {
    let mut app = sample();
    app.key(key(KeyCode::Char('c')));
    app.key(key(KeyCode::Char('w')));
    assert_eq!(app.data.columns[0].display, ColumnDisplay::Collapsed);
    app.key(key(KeyCode::Esc));

    app.key(key(KeyCode::Char('X')));
    assert!(app
        .data
        .columns
        .iter()
        .all(|c| c.display == ColumnDisplay::Expanded));
    app.key(key(KeyCode::Char('X')));
    assert!(app
        .data
        .columns
        .iter()
        .all(|c| c.display == ColumnDisplay::Default));
}

#[test]
fn test_offsets_survive_arbitrary_scrolling() {
    let mut app = app_with(&[("a", "b", "c"); 50]);
    app.resize(10, 8);
    let keys = [
        key(KeyCode::Down),
        key(KeyCode::Right),
        key(KeyCode::Char(' ')),
        key(KeyCode::Char('G')),
        key(KeyCode::Right),
        key(KeyCode::Down),
        key(KeyCode::Char('g')),
        key(KeyCode::Left),
        key(KeyCode::Up),
        key(KeyCode::End),
        key(KeyCode::Char(' ')),
    ];
    for _ in 0..20 {
        for k in keys {
            app.key(k);
        }
        // Offsets always render without panicking.
        let area = Rect::new(0, 0, 10, 8);
        let mut buf = Buffer::empty(area);
        (&mut app).render(area, &mut buf);
    }
}

#[test]
fn test_zebra_toggle() {
    let mut app = sample();
    assert!(!app.view.zebra_stripe);
    app.key(key(KeyCode::Char('Z')));
    assert!(app.view.zebra_stripe);
    app.key(key(KeyCode::Char('Z')));
    assert!(!app.view.zebra_stripe);
}

#[test]
fn test_help_popup_scrolls_and_closes() {
    let mut app = sample();
    app.resize(80, 12);
    app.key(key(KeyCode::Char('?')));
    app.key(key(KeyCode::Down));
    app.key(key(KeyCode::Down));
    let Some(Mode::Popup(popup)) = app.top_mode() else {
        panic!("expected help popup");
    };
    assert_eq!(popup.offset_y, 2);
    app.key(ctrl('g'));
    assert_eq!(app.mode_depth(), 0);
}

#[test]
fn test_quit_falls_through_from_row_select() {
    let mut app = sample();
    app.key(key(KeyCode::Char('r')));
    // 'q' has no row-select binding and falls through to the global quit.
    app.key(key(KeyCode::Char('q')));
    assert!(app.should_quit);
}

#[test]
fn test_popup_consumes_q_to_close() {
    let mut app = sample();
    app.key(key(KeyCode::Char('?')));
    app.key(key(KeyCode::Char('q')));
    assert!(!app.should_quit);
    assert_eq!(app.mode_depth(), 0);
}
