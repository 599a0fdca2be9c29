use crate::models::proto::render_proto_message;
use crate::models::schema::TableDescriptor;
use crate::registry::SchemaRegistry;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::layout::Alignment;
use ratatui::style::Modifier;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table},
    Terminal,
};
use std::io;
use std::sync::Arc;

const COLUMN_HEADERS: [&str; 7] = ["#", "Column", "Type", "Null", "PK", "JSON", "Proto"];

/// Terminal browser over a loaded [`SchemaRegistry`].
pub struct SchemaBrowserUI {
    registry: Arc<SchemaRegistry>,
    table_names: Vec<String>,
    selected_table: usize,
    proto_scroll: u16,
    current_screen: ScreenState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScreenState {
    TableView,
    ProtoView,
}

impl SchemaBrowserUI {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        let table_names = registry
            .table_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            registry,
            table_names,
            selected_table: 0,
            proto_scroll: 0,
            current_screen: ScreenState::TableView,
        }
    }

    pub async fn run(&mut self) -> Result<(), io::Error> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.ui_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn ui_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        loop {
            match self.current_screen {
                ScreenState::TableView => self.table_view_screen(terminal).await?,
                ScreenState::ProtoView => self.proto_view_screen(terminal).await?,
            }

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.code == KeyCode::Char('q') {
                    return Ok(());
                }
                self.handle_key(key.code);
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match self.current_screen {
            ScreenState::TableView => match key {
                KeyCode::Up => self.select_previous(),
                KeyCode::Down => self.select_next(),
                KeyCode::Char('p') | KeyCode::Enter if !self.table_names.is_empty() => {
                    self.proto_scroll = 0;
                    self.current_screen = ScreenState::ProtoView;
                }
                _ => {}
            },
            ScreenState::ProtoView => match key {
                KeyCode::Up => self.proto_scroll = self.proto_scroll.saturating_sub(1),
                KeyCode::Down => self.proto_scroll = self.proto_scroll.saturating_add(1),
                KeyCode::Esc | KeyCode::Char('p') => {
                    self.current_screen = ScreenState::TableView;
                }
                _ => {}
            },
        }
    }

    fn select_previous(&mut self) {
        if self.selected_table > 0 {
            self.selected_table -= 1;
        }
    }

    fn select_next(&mut self) {
        if self.selected_table + 1 < self.table_names.len() {
            self.selected_table += 1;
        }
    }

    fn selected_descriptor(&self) -> Option<Arc<TableDescriptor>> {
        let name = self.table_names.get(self.selected_table)?;
        self.registry.describe(name).ok()
    }

    async fn table_view_screen(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        let selected = self.selected_descriptor();
        let table_items: Vec<ListItem> = self
            .table_names
            .iter()
            .map(|name| ListItem::new(name.clone()))
            .collect();
        let mut list_state = ListState::default().with_selected(Some(self.selected_table));

        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(25), Constraint::Percentage(75)].as_ref())
                .split(f.area());

            let tables_widget = List::new(table_items)
                .block(
                    Block::default()
                        .title(format!("Tables ({})", self.table_names.len()))
                        .borders(Borders::ALL),
                )
                .highlight_style(
                    Style::default()
                        .bg(Color::Yellow)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD),
                );
            f.render_stateful_widget(tables_widget, chunks[0], &mut list_state);

            let title = match &selected {
                Some(table) => format!("{} (p: proto, q: quit)", table.name()),
                None => "No tables".to_string(),
            };
            let rows: Vec<Row> = selected
                .as_deref()
                .map(column_rows)
                .unwrap_or_default()
                .into_iter()
                .map(|cells| Row::new(cells.into_iter().map(Cell::from)))
                .collect();
            let header = Row::new(COLUMN_HEADERS.iter().map(|h| Cell::from(*h)))
                .style(Style::default().add_modifier(Modifier::BOLD));
            let widths = [
                Constraint::Length(4),
                Constraint::Percentage(25),
                Constraint::Percentage(18),
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Percentage(22),
                Constraint::Percentage(25),
            ];
            let columns_widget = Table::new(rows, widths)
                .header(header)
                .block(Block::default().title(title).borders(Borders::ALL));
            f.render_widget(columns_widget, chunks[1]);
        })?;

        Ok(())
    }

    async fn proto_view_screen(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        let (title, body) = match self.selected_descriptor() {
            Some(table) => (
                format!("{} as protobuf (Esc: back)", table.name()),
                render_proto_message(&table),
            ),
            None => ("Protobuf".to_string(), String::new()),
        };
        let scroll = self.proto_scroll;

        terminal.draw(|f| {
            let block = Block::default()
                .title(title)
                .borders(Borders::ALL)
                .title_alignment(Alignment::Center);
            let paragraph = Paragraph::new(body)
                .block(block)
                .style(Style::default().fg(Color::White))
                .scroll((scroll, 0));
            f.render_widget(paragraph, f.area());
        })?;

        Ok(())
    }
}

/// One row of display cells per column of `table`.
fn column_rows(table: &TableDescriptor) -> Vec<Vec<String>> {
    table
        .columns()
        .iter()
        .map(|c| {
            vec![
                c.index.to_string(),
                c.name.clone(),
                c.database_type_pretty.clone(),
                if c.is_nullable { "yes" } else { "no" }.to_string(),
                if c.is_primary_key { "*" } else { "" }.to_string(),
                c.json_name.clone(),
                format!("{} {} = {}", c.proto_type, c.proto_name, c.proto_number),
            ]
        })
        .collect()
}
