use anyhow::Result;
use bin_lookup_demo::{
    list_ranges, lookup_view, ranges_view, search_ranges, search_view, Alert, AlertLevel,
    BinCatalog, LookupError, LookupView, Page as ResultPage, RangeRow, RangeSort, RangesView,
    Resolver, SearchCriteria, SearchView, UnknownBinPolicy,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;

/// Rows per page on the account range screen
const RANGES_PAGE_SIZE: usize = 8;

/// Longest card number worth typing
const MAX_INPUT_DIGITS: usize = 19;

const SEARCH_LABELS: [&str; 3] = ["Issuer Name", "Country Code", "Product Type"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Lookup,
    Ranges,
    Search,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Lookup => Page::Ranges,
            Page::Ranges => Page::Search,
            Page::Search => Page::Lookup,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Lookup => Page::Search,
            Page::Ranges => Page::Lookup,
            Page::Search => Page::Ranges,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Lookup => "BIN Lookup",
            Page::Ranges => "Account Ranges",
            Page::Search => "Search",
        }
    }
}

pub struct App {
    catalog: BinCatalog,
    policy: UnknownBinPolicy,
    pub current_page: Page,
    pub alert: Option<Alert>,

    // Lookup screen
    pub bin_input: String,
    pub lookup: Option<LookupView>,
    pub show_raw: bool,

    // Ranges screen
    pub ranges_page: usize,
    pub ranges_total_pages: usize,
    pub ranges: RangesView,
    pub ranges_state: TableState,

    // Search screen
    pub search_fields: [String; 3],
    pub search_focus: usize,
    pub search: Option<SearchView>,
    pub search_state: TableState,
}

impl App {
    pub fn new(catalog: BinCatalog, policy: UnknownBinPolicy) -> Self {
        let mut app = Self {
            catalog,
            policy,
            current_page: Page::Lookup,
            alert: Some(Alert::welcome()),
            bin_input: String::new(),
            lookup: None,
            show_raw: false,
            ranges_page: 1,
            ranges_total_pages: 0,
            ranges: ranges_view(&ResultPage::from_slice(&[], 1, RANGES_PAGE_SIZE)),
            ranges_state: TableState::default(),
            search_fields: Default::default(),
            search_focus: 0,
            search: None,
            search_state: TableState::default(),
        };
        app.load_ranges(1);
        app
    }

    pub fn sample_hint(&self) -> String {
        self.catalog.sample_bins().join(", ")
    }

    // ------------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------------

    pub fn submit_lookup(&mut self) {
        let resolver = Resolver::new(&self.catalog, self.policy);

        match resolver.lookup(&self.bin_input) {
            Ok(resolution) => {
                self.lookup = Some(lookup_view(&resolution.bin, Some(&resolution.record), true));
                self.alert = Some(Alert::lookup_completed());
            }
            Err(LookupError::BinNotFound { bin }) => {
                self.lookup = Some(lookup_view(&bin, None, true));
                self.alert = None;
            }
            Err(err) => {
                self.alert = Some(Alert::from_error(&err));
            }
        }
        self.show_raw = false;
    }

    pub fn load_ranges(&mut self, page: usize) {
        let result = list_ranges(&self.catalog, page.max(1), RANGES_PAGE_SIZE, RangeSort::Source);

        self.ranges_page = result.number + 1;
        self.ranges_total_pages = result.total_pages;
        self.ranges = ranges_view(&result);
        self.ranges_state.select(if result.is_empty() { None } else { Some(0) });
    }

    pub fn next_ranges_page(&mut self) {
        if self.ranges_page < self.ranges_total_pages {
            self.load_ranges(self.ranges_page + 1);
        }
    }

    pub fn previous_ranges_page(&mut self) {
        if self.ranges_page > 1 {
            self.load_ranges(self.ranges_page - 1);
        }
    }

    pub fn submit_search(&mut self) {
        let [issuer, country, product] = &self.search_fields;
        let criteria = SearchCriteria::new(Some(issuer.as_str()), Some(country.as_str()), Some(product.as_str()));

        match search_ranges(&self.catalog, &criteria) {
            Ok(result) => {
                self.alert = Some(Alert::search_finished(result.total_elements));
                self.search_state.select(if result.is_empty() { None } else { Some(0) });
                self.search = Some(search_view(&result));
            }
            Err(err) => {
                self.alert = Some(Alert::from_error(&err));
            }
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    fn select_row(state: &mut TableState, len: usize, forward: bool) {
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) if forward => (i + 1) % len,
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        state.select(Some(i));
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    /// Apply one key press. Returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            return true;
        }

        match key.code {
            KeyCode::Tab => {
                self.next_page();
                return false;
            }
            KeyCode::BackTab => {
                self.previous_page();
                return false;
            }
            _ => {}
        }

        match self.current_page {
            Page::Lookup => match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    if self.bin_input.len() < MAX_INPUT_DIGITS {
                        self.bin_input.push(c);
                    }
                }
                KeyCode::Char('r') => self.show_raw = !self.show_raw,
                KeyCode::Char('q') => return true,
                KeyCode::Backspace => {
                    self.bin_input.pop();
                }
                KeyCode::Enter => self.submit_lookup(),
                _ => {}
            },
            Page::Ranges => match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Down | KeyCode::Char('j') => {
                    Self::select_row(&mut self.ranges_state, self.ranges.rows.len(), true)
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    Self::select_row(&mut self.ranges_state, self.ranges.rows.len(), false)
                }
                KeyCode::Right | KeyCode::Char('n') => self.next_ranges_page(),
                KeyCode::Left | KeyCode::Char('p') => self.previous_ranges_page(),
                _ => {}
            },
            Page::Search => match key.code {
                KeyCode::Up => {
                    self.search_focus = (self.search_focus + SEARCH_LABELS.len() - 1) % SEARCH_LABELS.len()
                }
                KeyCode::Down => self.search_focus = (self.search_focus + 1) % SEARCH_LABELS.len(),
                KeyCode::Char(c) => self.search_fields[self.search_focus].push(c),
                KeyCode::Backspace => {
                    self.search_fields[self.search_focus].pop();
                }
                KeyCode::Enter => self.submit_search(),
                KeyCode::PageDown => {
                    let len = self.search.as_ref().map(|s| s.cards.len()).unwrap_or(0);
                    Self::select_row(&mut self.search_state, len, true)
                }
                KeyCode::PageUp => {
                    let len = self.search.as_ref().map(|s| s.cards.len()).unwrap_or(0);
                    Self::select_row(&mut self.search_state, len, false)
                }
                _ => {}
            },
        }

        false
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal UI failed");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Length(3), // Alert banner
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_alert(f, chunks[1], app);

    match app.current_page {
        Page::Lookup => render_lookup(f, chunks[2], app),
        Page::Ranges => render_ranges(f, chunks[2], app),
        Page::Search => render_search(f, chunks[2], app),
    }

    render_status_bar(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Lookup, Page::Ranges, Page::Search];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled("Demo Data", Style::default().fg(Color::Magenta)));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn alert_color(level: AlertLevel) -> Color {
    match level {
        AlertLevel::Success => Color::Green,
        AlertLevel::Info => Color::Cyan,
        AlertLevel::Warning => Color::Yellow,
        AlertLevel::Danger => Color::Red,
    }
}

fn render_alert(f: &mut Frame, area: Rect, app: &App) {
    let (text, color) = match &app.alert {
        Some(alert) => (alert.message.clone(), alert_color(alert.level)),
        None => (String::new(), Color::DarkGray),
    };

    let banner = Paragraph::new(Span::styled(text, Style::default().fg(color)))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color)));

    f.render_widget(banner, area);
}

fn render_lookup(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let input = Paragraph::new(Line::from(vec![
        Span::styled(app.bin_input.clone(), Style::default().fg(Color::White)),
        Span::styled("▏", Style::default().fg(Color::Yellow)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" BIN Number (try {}) ", app.sample_hint())),
    );
    f.render_widget(input, chunks[0]);

    let Some(view) = &app.lookup else {
        let hint = Paragraph::new("  Type at least 6 digits and press Enter")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Result "));
        f.render_widget(hint, chunks[1]);
        return;
    };

    let mut content = vec![Line::from("")];

    if let Some(empty) = &view.empty {
        content.push(Line::from(Span::styled(
            format!("  {}", empty.title),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        content.push(Line::from(format!("  {}", empty.message)));
    } else if app.show_raw {
        for line in view.raw_json.as_deref().unwrap_or_default().lines() {
            content.push(Line::from(format!("  {}", line)));
        }
    } else {
        for field in &view.fields {
            content.push(Line::from(vec![
                Span::styled(
                    format!("  {:<14}", field.label),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::raw(field.value.clone()),
            ]));
            content.push(Line::from(""));
        }
    }

    let title = if view.demo_mode {
        format!(" {} · Demo Data ", view.title)
    } else {
        format!(" {} ", view.title)
    };

    let panel = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(title),
        );

    f.render_widget(panel, chunks[1]);
}

fn range_table<'a>(rows: &'a [RangeRow], title: String) -> Table<'a> {
    let header_cells = ["Low Range", "High Range", "Issuer", "Country", "Type"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = rows.iter().map(|row| {
        let color = match row.product_type.as_str() {
            "CREDIT" => Color::Green,
            "DEBIT" => Color::Cyan,
            "PREPAID" => Color::Magenta,
            _ => Color::White,
        };

        Row::new(vec![
            Cell::from(row.low.clone()),
            Cell::from(row.high.clone()),
            Cell::from(truncate(&row.issuer, 22)),
            Cell::from(row.country.clone()),
            Cell::from(row.product_type.clone()).style(Style::default().fg(color)),
        ])
        .height(1)
    });

    Table::new(
        rows,
        [
            Constraint::Length(21),
            Constraint::Length(21),
            Constraint::Length(24),
            Constraint::Length(9),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ")
}

fn render_ranges(f: &mut Frame, area: Rect, app: &mut App) {
    if let Some(empty) = &app.ranges.empty {
        let panel = Paragraph::new(vec![
            Line::from(""),
            Line::from(format!("  {}", empty.title)),
            Line::from(format!("  {}", empty.message)),
        ])
        .block(Block::default().borders(Borders::ALL).title(" Account Ranges "));
        f.render_widget(panel, area);
        return;
    }

    let title = match (&app.ranges.summary, &app.ranges.page_label) {
        (Some(summary), Some(page)) => format!(" Account Ranges · {} · {} ", summary, page),
        _ => " Account Ranges ".to_string(),
    };

    let table = range_table(&app.ranges.rows, title);
    f.render_stateful_widget(table, area, &mut app.ranges_state);
}

fn render_search(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let form: Vec<Line> = SEARCH_LABELS
        .iter()
        .zip(app.search_fields.iter())
        .enumerate()
        .map(|(i, (label, value))| {
            let focused = i == app.search_focus;
            let marker = if focused { "→ " } else { "  " };
            let style = if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan)
            };
            Line::from(vec![
                Span::styled(format!("{}{:<14}", marker, label), style),
                Span::raw(value.clone()),
            ])
        })
        .collect();

    let form = Paragraph::new(form).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Search Criteria "),
    );
    f.render_widget(form, chunks[0]);

    match &app.search {
        Some(view) if view.empty.is_none() => {
            let title = format!(" {} ", view.heading.as_deref().unwrap_or("Search Results"));
            let table = range_table(&view.cards, title);
            f.render_stateful_widget(table, chunks[1], &mut app.search_state);
        }
        Some(view) => {
            let message = view.empty.as_ref().map(|e| e.message.clone()).unwrap_or_default();
            let panel = Paragraph::new(format!("  {}", message))
                .block(Block::default().borders(Borders::ALL).title(" Search Results "));
            f.render_widget(panel, chunks[1]);
        }
        None => {
            let panel = Paragraph::new("  Fill in at least one field and press Enter")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title(" Search Results "));
            f.render_widget(panel, chunks[1]);
        }
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

    let mut status_spans = vec![key("Tab"), Span::raw(" Page | ")];

    match app.current_page {
        Page::Lookup => {
            status_spans.extend([key("0-9"), Span::raw(" Type | "), key("Enter"), Span::raw(" Lookup | ")]);
            status_spans.extend([key("r"), Span::raw(" Raw | ")]);
        }
        Page::Ranges => {
            status_spans.extend([key("↑/↓"), Span::raw(" Nav | "), key("←/→"), Span::raw(" Page | ")]);
        }
        Page::Search => {
            status_spans.extend([key("↑/↓"), Span::raw(" Field | "), key("Enter"), Span::raw(" Search | ")]);
            status_spans.extend([key("PgUp/PgDn"), Span::raw(" Results | ")]);
        }
    }

    status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
