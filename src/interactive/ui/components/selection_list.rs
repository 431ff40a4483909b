use crate::interactive::constants::PAGE_SIZE;
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Row, Table, TableState},
};

/// One selectable row. `key` identifies the value it stands for on the trail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListRow {
    pub key: String,
    pub columns: Vec<String>,
    pub enabled: bool,
}

impl ListRow {
    pub fn new(key: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            key: key.into(),
            columns,
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Rows of the current view plus the highlighted row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionList {
    rows: Vec<ListRow>,
    selected_index: usize,
}

impl SelectionList {
    /// Replaces the rows, highlighting `cursor` when it names one of them.
    pub fn set_rows(&mut self, rows: Vec<ListRow>, cursor: Option<&str>) {
        self.rows = rows;
        self.selected_index = 0;
        if let Some(key) = cursor {
            self.select_key(key);
        }
    }

    pub fn rows(&self) -> &[ListRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected_row(&self) -> Option<&ListRow> {
        self.rows.get(self.selected_index)
    }

    pub fn selected_key(&self) -> Option<&str> {
        self.selected_row().map(|row| row.key.as_str())
    }

    pub fn select_key(&mut self, key: &str) -> bool {
        match self.rows.iter().position(|row| row.key == key) {
            Some(index) => {
                self.selected_index = index;
                true
            }
            None => false,
        }
    }

    fn last_index(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    fn move_to(&mut self, index: usize) -> bool {
        let index = index.min(self.last_index());
        if index != self.selected_index {
            self.selected_index = index;
            true
        } else {
            false
        }
    }

    pub fn move_up(&mut self) -> bool {
        self.move_to(self.selected_index.saturating_sub(1))
    }

    pub fn move_down(&mut self) -> bool {
        self.move_to(self.selected_index + 1)
    }

    pub fn page_up(&mut self) -> bool {
        self.move_to(self.selected_index.saturating_sub(PAGE_SIZE))
    }

    pub fn page_down(&mut self) -> bool {
        self.move_to(self.selected_index + PAGE_SIZE)
    }

    pub fn move_to_start(&mut self) -> bool {
        self.move_to(0)
    }

    pub fn move_to_end(&mut self) -> bool {
        self.move_to(self.last_index())
    }

    pub fn render(
        &self,
        f: &mut Frame,
        area: Rect,
        title: &str,
        header: &[&str],
        empty_message: &str,
    ) {
        if self.rows.is_empty() {
            let empty = Paragraph::new(empty_message.to_string())
                .block(Block::default().title(title.to_string()).borders(Borders::ALL))
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(empty, area);
            return;
        }

        let title = format!("{title} ({}/{})", self.selected_index + 1, self.rows.len());
        let rows = self.rows.iter().map(|row| {
            let style = if row.enabled {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Row::new(row.columns.iter().map(|c| Line::from(c.clone()))).style(style)
        });

        let column_count = header
            .len()
            .max(self.rows.iter().map(|r| r.columns.len()).max().unwrap_or(1));
        let widths = vec![Constraint::Fill(1); column_count];

        let table = Table::new(rows, widths)
            .header(
                Row::new(header.iter().map(|h| Line::from(h.to_string())))
                    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            )
            .block(Block::default().title(title).borders(Borders::ALL))
            .row_highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(Some(self.selected_index));
        f.render_stateful_widget(table, area, &mut state);
    }
}
