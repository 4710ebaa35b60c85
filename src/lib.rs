use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::Widget,
};

pub mod cli;
pub mod config;
pub mod data;
pub mod filter;
pub mod inspect;
pub mod layout;
pub mod reader;
pub mod shell;
pub mod sort;
pub mod stats;
pub mod widgets;

pub use cli::Args;
pub use config::{AppConfig, ConfigManager, Theme};
pub use data::{Column, ColumnDisplay, Dataset};
pub use filter::Filter;

use widgets::controls::ModeLine;
use widgets::datatable::DataTable;
use widgets::popup::{popup_size, Popup};

/// Application name used for the config directory.
pub const APP_NAME: &str = "vsv";

pub const HELP_TEXT: &str = "\
  [ vsv ]
  ------

  Global:
    ←/→, ↑/↓    scroll (5 columns / 1 row)
    Ctrl-a, Home  jump to first column
    Ctrl-e, End   jump to end of line
    g / G       jump to top / bottom
    space       page down
    /, Ctrl-r   filter rows
    c           select columns
    r           select rows
    Z           toggle zebra striping
    X           expand/restore all columns
    ?           this help
    q, Ctrl-c   quit

  Column select:
    ←/→         move selection
    < / >       sort ascending / descending
    w / x / a   collapse / expand / align column
    .           pin column to the left edge
    |           pipe column through a shell command
    s           column statistics
    Esc         back

  Row select:
    ↑/↓         move cursor
    Enter       inspect row
    Esc         back

  Popups:
    arrows      scroll
    Esc, q      close";

/// Scroll/display state shared by every mode. The all-columns expand toggle
/// lives here rather than in a process global so there is exactly one mutable
/// state bag with one lifecycle.
#[derive(Debug, Default, Clone)]
pub struct ViewState {
    pub offset_x: usize,
    pub offset_y: usize,
    pub zebra_stripe: bool,
    pub expand_all: bool,
}

#[derive(Debug, Default)]
pub struct FilterPrompt {
    pub input: String,
}

#[derive(Debug)]
pub struct ShellPrompt {
    pub column: usize,
    pub input: String,
}

#[derive(Debug)]
pub struct RowSelect {
    /// Cursor position within the visible set.
    pub cursor: usize,
}

#[derive(Debug)]
pub struct ColumnSelect {
    pub column: usize,
}

#[derive(Debug)]
pub struct PopupState {
    pub lines: Vec<String>,
    pub offset_x: usize,
    pub offset_y: usize,
}

impl PopupState {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            lines: text.as_ref().lines().map(str::to_string).collect(),
            offset_x: 0,
            offset_y: 0,
        }
    }
}

/// One state of the modal input machine. The stack grows above an implicit
/// Default mode; each variant carries only the state it needs.
#[derive(Debug)]
pub enum Mode {
    Filter(FilterPrompt),
    Shell(ShellPrompt),
    RowSelect(RowSelect),
    ColumnSelect(ColumnSelect),
    Popup(PopupState),
}

impl Mode {
    fn label(&self) -> &'static str {
        match self {
            Mode::Filter(_) => "Filter",
            Mode::Shell(_) => "Run shell",
            Mode::RowSelect(_) => "Row Select",
            Mode::ColumnSelect(_) => "Column Select",
            Mode::Popup(_) => "Modal",
        }
    }
}

/// What a mode's key handler asks the stack to do. `Push` keeps the current
/// mode and installs a new one above it; `PopPush` replaces it.
enum Transition {
    Stay,
    Pop,
    Push(Mode),
    PopPush(Mode),
}

pub struct App {
    pub data: Dataset,
    pub view: ViewState,
    /// Indices into `data.rows` after filter and sort.
    pub visible: Vec<usize>,
    pub filter: Option<Filter>,
    modes: Vec<Mode>,
    pub theme: Theme,
    column_scroll_step: usize,
    pub should_quit: bool,
    width: u16,
    height: u16,
}

impl App {
    pub fn new(data: Dataset, config: &AppConfig) -> Self {
        let visible = (0..data.rows.len()).collect();
        Self {
            data,
            view: ViewState {
                zebra_stripe: config.display.zebra_stripe,
                ..ViewState::default()
            },
            visible,
            filter: None,
            modes: Vec::new(),
            theme: config.theme.resolve(),
            column_scroll_step: config.display.column_scroll_step.max(1),
            should_quit: false,
            width: 80,
            height: 24,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.clamp_offsets();
    }

    /// Size of the data viewport: full width, height minus the header and the
    /// mode line.
    fn view_size(&self) -> (usize, usize) {
        (
            self.width as usize,
            (self.height as usize).saturating_sub(2),
        )
    }

    pub fn mode_depth(&self) -> usize {
        self.modes.len()
    }

    pub fn top_mode(&self) -> Option<&Mode> {
        self.modes.last()
    }

    /// Remove the top mode. The Default base is not an element of the stack,
    /// so it can never be popped; popping with nothing above it is a no-op.
    pub fn pop_mode(&mut self) {
        self.modes.pop();
    }

    fn push_popup(&mut self, text: impl AsRef<str>) {
        self.modes.push(Mode::Popup(PopupState::new(text)));
    }

    /// Install a filter (or match-all for `None`) and rebuild the visible set
    /// from scratch in original row order; any sort is deliberately lost.
    pub fn set_filter(&mut self, filter: Option<Filter>) {
        self.filter = filter;
        self.visible = filter::apply(self.filter.as_ref(), &self.data.rows);
        self.clamp_offsets();
    }

    fn clamp_offsets(&mut self) {
        let (vw, vh) = self.view_size();
        let max_x = layout::max_x_offset(&self.data.columns, vw);
        let max_y = layout::max_y_offset(self.visible.len(), vh);
        self.view.offset_x = self.view.offset_x.min(max_x);
        self.view.offset_y = self.view.offset_y.min(max_y);
    }

    /// Dispatch a key press to the top mode, or to Default handling when the
    /// stack is empty.
    pub fn key(&mut self, event: KeyEvent) {
        if event.kind == KeyEventKind::Release {
            return;
        }

        match self.modes.pop() {
            None => {
                if let Transition::Push(mode) = self.handle_default(event) {
                    self.modes.push(mode);
                }
            }
            Some(mut mode) => {
                let transition = match &mut mode {
                    Mode::Filter(prompt) => self.filter_key(prompt, event),
                    Mode::Shell(prompt) => self.shell_key(prompt, event),
                    Mode::RowSelect(state) => self.row_select_key(state, event),
                    Mode::ColumnSelect(state) => self.column_select_key(state, event),
                    Mode::Popup(state) => self.popup_key(state, event),
                };
                match transition {
                    Transition::Stay => self.modes.push(mode),
                    Transition::Pop => {}
                    Transition::Push(new) => {
                        self.modes.push(mode);
                        self.modes.push(new);
                    }
                    Transition::PopPush(new) => self.modes.push(new),
                }
            }
        }
    }

    fn handle_default(&mut self, event: KeyEvent) -> Transition {
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let (vw, vh) = self.view_size();
        let max_y = layout::max_y_offset(self.visible.len(), vh);
        let end_of_line = layout::max_x_offset(&self.data.columns, vw);
        let step = self.column_scroll_step;

        match event.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('a') if ctrl => self.view.offset_x = 0,
            KeyCode::Home => self.view.offset_x = 0,
            KeyCode::Char('e') if ctrl => self.view.offset_x = end_of_line,
            KeyCode::End => self.view.offset_x = end_of_line,
            KeyCode::Right => {
                self.view.offset_x = (self.view.offset_x + step).min(end_of_line)
            }
            KeyCode::Left => self.view.offset_x = self.view.offset_x.saturating_sub(step),
            KeyCode::Up => self.view.offset_y = self.view.offset_y.saturating_sub(1),
            KeyCode::Down => self.view.offset_y = (self.view.offset_y + 1).min(max_y),
            KeyCode::Char(' ') | KeyCode::PageDown => {
                self.view.offset_y = (self.view.offset_y + vh).min(max_y)
            }
            KeyCode::Char('r') if ctrl => {
                self.view.offset_y = 0;
                return Transition::Push(Mode::Filter(FilterPrompt {
                    input: self.active_query(),
                }));
            }
            KeyCode::Char('/') => {
                self.view.offset_y = 0;
                return Transition::Push(Mode::Filter(FilterPrompt {
                    input: self.active_query(),
                }));
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.view.offset_x = 0;
                self.set_highlight(Some(0));
                return Transition::Push(Mode::ColumnSelect(ColumnSelect { column: 0 }));
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                return Transition::Push(Mode::RowSelect(RowSelect {
                    cursor: self.view.offset_y,
                }));
            }
            KeyCode::Char('g') => self.view.offset_y = 0,
            KeyCode::Char('G') => self.view.offset_y = max_y,
            KeyCode::Char('Z') => self.view.zebra_stripe = !self.view.zebra_stripe,
            KeyCode::Char('X') => {
                self.view.expand_all = !self.view.expand_all;
                let display = if self.view.expand_all {
                    ColumnDisplay::Expanded
                } else {
                    ColumnDisplay::Default
                };
                for col in &mut self.data.columns {
                    col.display = display;
                }
                self.clamp_offsets();
            }
            KeyCode::Char('?') => {
                return Transition::Push(Mode::Popup(PopupState::new(HELP_TEXT)));
            }
            _ => {}
        }

        Transition::Stay
    }

    fn active_query(&self) -> String {
        self.filter
            .as_ref()
            .map(|f| f.query.clone())
            .unwrap_or_default()
    }

    fn filter_key(&mut self, prompt: &mut FilterPrompt, event: KeyEvent) -> Transition {
        if prompt_edit(&mut prompt.input, event) {
            return Transition::Stay;
        }
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);

        match event.code {
            KeyCode::Esc => {
                self.set_filter(None);
                Transition::Pop
            }
            KeyCode::Char('g') if ctrl => {
                self.set_filter(None);
                Transition::Pop
            }
            KeyCode::Enter => {
                if prompt.input.is_empty() {
                    self.set_filter(None);
                    return Transition::Pop;
                }
                match Filter::compile(&prompt.input, &self.data.columns) {
                    Ok(filter) => {
                        self.set_filter(Some(filter));
                        Transition::Pop
                    }
                    Err(err) => Transition::Push(Mode::Popup(PopupState::new(format!(
                        "There was an error in your filter:\n\n{}\n\n{}",
                        err, prompt.input
                    )))),
                }
            }
            // Fall back to default handling for arrows etc.
            _ => self.handle_default(event),
        }
    }

    fn shell_key(&mut self, prompt: &mut ShellPrompt, event: KeyEvent) -> Transition {
        if prompt_edit(&mut prompt.input, event) {
            return Transition::Stay;
        }
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);

        match event.code {
            KeyCode::Esc => Transition::Pop,
            KeyCode::Char('g') if ctrl => Transition::Pop,
            KeyCode::Enter => {
                let Ok(command) = shell::prepare(&prompt.input) else {
                    return Transition::Pop;
                };
                match shell::pipe_column(&mut self.data.rows, prompt.column, command) {
                    Ok(()) => {
                        self.data.grow_column_width(prompt.column);
                        Transition::Pop
                    }
                    Err(err) => {
                        // Cells written before the failure stand.
                        self.data.grow_column_width(prompt.column);
                        Transition::PopPush(Mode::Popup(PopupState::new(format!(
                            "There was an error running your command:\n\n{}",
                            err
                        ))))
                    }
                }
            }
            _ => self.handle_default(event),
        }
    }

    fn row_select_key(&mut self, state: &mut RowSelect, event: KeyEvent) -> Transition {
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let last_row = self.visible.len().saturating_sub(1);

        let transition = match event.code {
            KeyCode::Esc => return Transition::Pop,
            KeyCode::Char('g') if ctrl => return Transition::Pop,
            KeyCode::Up => {
                state.cursor = state.cursor.saturating_sub(1);
                Transition::Stay
            }
            KeyCode::Down => {
                state.cursor = (state.cursor + 1).min(last_row);
                Transition::Stay
            }
            KeyCode::Enter => match self.visible.get(state.cursor) {
                Some(&row) => match inspect::row_to_text(&self.data, row) {
                    Ok(text) => Transition::Push(Mode::Popup(PopupState::new(text))),
                    Err(err) => Transition::Push(Mode::Popup(PopupState::new(format!(
                        "Failed to render row:\n\n{}",
                        err
                    )))),
                },
                None => Transition::Stay,
            },
            _ => self.handle_default(event),
        };

        // Keep the cursor inside the viewport.
        let (_, vh) = self.view_size();
        let max_y = layout::max_y_offset(self.visible.len(), vh);
        if state.cursor >= self.view.offset_y + vh {
            self.view.offset_y = (self.view.offset_y + 1).min(max_y);
        } else if state.cursor < self.view.offset_y {
            self.view.offset_y = state.cursor;
        }

        transition
    }

    fn column_select_key(&mut self, state: &mut ColumnSelect, event: KeyEvent) -> Transition {
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let last_col = self.data.columns.len().saturating_sub(1);

        let transition = match event.code {
            KeyCode::Esc => {
                self.set_highlight(None);
                return Transition::Pop;
            }
            KeyCode::Char('g') if ctrl => {
                self.set_highlight(None);
                return Transition::Pop;
            }
            KeyCode::Char('a') if ctrl => {
                self.select_column(state, 0);
                Transition::Stay
            }
            KeyCode::Char('e') if ctrl => {
                self.select_column(state, last_col);
                Transition::Stay
            }
            KeyCode::Right => {
                self.select_column(state, (state.column + 1).min(last_col));
                Transition::Stay
            }
            KeyCode::Left => {
                self.select_column(state, state.column.saturating_sub(1));
                Transition::Stay
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.select_column(state, 0);
                Transition::Stay
            }
            KeyCode::Char('<') => {
                sort::sort_visible(&self.data, &mut self.visible, state.column, false);
                Transition::Stay
            }
            KeyCode::Char('>') => {
                sort::sort_visible(&self.data, &mut self.visible, state.column, true);
                Transition::Stay
            }
            KeyCode::Char('w') => {
                self.data.columns[state.column].toggle_display(ColumnDisplay::Collapsed);
                Transition::Stay
            }
            KeyCode::Char('x') => {
                self.data.columns[state.column].toggle_display(ColumnDisplay::Expanded);
                Transition::Stay
            }
            KeyCode::Char('a') => {
                self.data.columns[state.column].toggle_display(ColumnDisplay::Aligned);
                Transition::Stay
            }
            KeyCode::Char('.') => {
                let col = &mut self.data.columns[state.column];
                col.pinned = !col.pinned;
                if col.pinned {
                    col.display = ColumnDisplay::Default;
                }
                Transition::Stay
            }
            KeyCode::Char('|') => Transition::Push(Mode::Shell(ShellPrompt {
                column: state.column,
                input: String::new(),
            })),
            KeyCode::Char('s') => match stats::compute(&self.data, &self.visible, state.column) {
                Ok(summary) => Transition::Push(Mode::Popup(PopupState::new(summary.to_text()))),
                Err(err) => Transition::Push(Mode::Popup(PopupState::new(format!(
                    "Failed to compute statistics:\n\n{}",
                    err
                )))),
            },
            _ => self.handle_default(event),
        };

        self.follow_column(state.column);
        transition
    }

    fn popup_key(&mut self, state: &mut PopupState, event: KeyEvent) -> Transition {
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let (_, inner_h) = popup_size(self.width, self.height, state.lines.len());
        let max_y = state.lines.len().saturating_sub(inner_h as usize);

        match event.code {
            KeyCode::Esc | KeyCode::Char('q') => return Transition::Pop,
            KeyCode::Char('g') if ctrl => return Transition::Pop,
            KeyCode::Left => state.offset_x = state.offset_x.saturating_sub(5),
            KeyCode::Right => {
                state.offset_x = (state.offset_x + 5).min(layout::POPUP_MAX_X_OFFSET)
            }
            KeyCode::Up => state.offset_y = state.offset_y.saturating_sub(1),
            KeyCode::Down => state.offset_y = (state.offset_y + 1).min(max_y),
            // Everything else is ignored; the popup is read-only.
            _ => {}
        }

        Transition::Stay
    }

    /// Exactly one column is highlighted while Column-select is active.
    fn set_highlight(&mut self, column: Option<usize>) {
        for (i, col) in self.data.columns.iter_mut().enumerate() {
            col.highlighted = Some(i) == column;
        }
    }

    fn select_column(&mut self, state: &mut ColumnSelect, column: usize) {
        state.column = column;
        self.set_highlight(Some(column));
    }

    /// Scroll horizontally so the selected column stays on screen. Pinned
    /// columns are always visible and need no adjustment.
    fn follow_column(&mut self, column: usize) {
        let (vw, _) = self.view_size();
        if let Some((start, end)) = layout::unpinned_extent(&self.data.columns, column) {
            let avail = vw.saturating_sub(layout::pinned_width(&self.data.columns));
            if avail > 0 {
                if end > self.view.offset_x + avail {
                    self.view.offset_x = end - avail;
                }
                if start < self.view.offset_x {
                    self.view.offset_x = start;
                }
            }
        }
        let max_x = layout::max_x_offset(&self.data.columns, vw);
        self.view.offset_x = self.view.offset_x.min(max_x);
    }
}

/// Line-edit keys shared by the filter and shell prompts. Returns true when
/// the key was consumed.
fn prompt_edit(input: &mut String, event: KeyEvent) -> bool {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Backspace | KeyCode::Delete => {
            input.pop();
            true
        }
        KeyCode::Char('u') | KeyCode::Char('w') if ctrl => {
            input.clear();
            true
        }
        KeyCode::Char(c) if !ctrl => {
            input.push(c);
            true
        }
        _ => false,
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.width = area.width;
        self.height = area.height;
        self.clamp_offsets();
        if area.height < 2 {
            return;
        }

        let table_area = Rect {
            height: area.height - 1,
            ..area
        };
        let mode_line_area = Rect {
            y: area.y + area.height - 1,
            height: 1,
            ..area
        };

        let row_cursor = match self.modes.last() {
            Some(Mode::RowSelect(state)) => Some(state.cursor),
            _ => None,
        };

        DataTable {
            data: &self.data,
            visible: &self.visible,
            offset_x: self.view.offset_x,
            offset_y: self.view.offset_y,
            zebra: self.view.zebra_stripe,
            row_cursor,
            theme: &self.theme,
        }
        .render(table_area, buf);

        let (label, text, cursor) = match self.modes.last() {
            None => (":", String::new(), false),
            Some(Mode::Filter(prompt)) => ("Filter", prompt.input.clone(), true),
            Some(Mode::Shell(prompt)) => ("Run shell", prompt.input.clone(), true),
            Some(Mode::RowSelect(state)) => ("Row Select", state.cursor.to_string(), false),
            Some(Mode::ColumnSelect(state)) => (
                "Column Select",
                format!("[{}]", self.data.columns[state.column].name),
                false,
            ),
            Some(mode @ Mode::Popup(_)) => (mode.label(), String::new(), false),
        };
        ModeLine {
            label,
            text: &text,
            cursor,
            visible_rows: self.visible.len(),
            total_rows: self.data.rows.len(),
            theme: &self.theme,
        }
        .render(mode_line_area, buf);

        if let Some(Mode::Popup(state)) = self.modes.last() {
            Popup {
                lines: &state.lines,
                offset_x: state.offset_x,
                offset_y: state.offset_y,
                theme: &self.theme,
            }
            .render(table_area, buf);
        }
    }
}
