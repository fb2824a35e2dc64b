use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, BarChart, Block, Borders, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame, Terminal,
};
use salesbook::report::{format_amount, ChartKind, ChartSeries, COLUMNS};
use salesbook::{Bucket, LedgerStore};
use tokio::runtime::Runtime;

use super::app::{App, InputMode, Screen, FORM_FIELDS};
use crate::config::ClientConfig;

pub fn run_tui(store: Arc<dyn LedgerStore>, config: &ClientConfig) -> anyhow::Result<()> {
    let mut app = App::new(store, config.refresh_every);
    let rt = Runtime::new()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = event_loop(&mut terminal, &mut app, &rt);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    rt: &Runtime,
) -> anyhow::Result<()> {
    loop {
        // every render cycle starts from a fresh snapshot when one is due
        if app.refresh_due(Instant::now()) {
            app.refresh(rt);
        }

        terminal.draw(|f| ui(f, app))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                handle_key_event(app, key, rt);
            }
        }
    }
    Ok(())
}

fn handle_key_event(app: &mut App, key: KeyEvent, rt: &Runtime) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_key_normal(app, key),
        InputMode::CreatingSale => handle_key_create_sale(app, key, rt),
    }
}

fn handle_key_normal(app: &mut App, key: KeyEvent) {
    use KeyCode::*;

    match key.code {
        Char('q') => app.should_quit = true,

        Tab => app.next_screen(),
        BackTab => app.prev_screen(),

        Up => app.select_prev(),
        Down => app.select_next(),

        Char('n') => app.open_form(),
        Char('r') => app.needs_refresh = true,
        Char('c') => app.clear_messages(),
        Char('?') => app.current_screen = Screen::Help,

        // chart selectors
        Char('t') => app.chart_kind = app.chart_kind.toggle(),
        Char('b') => app.bucket = app.bucket.next(),

        _ => {}
    }
}

fn handle_key_create_sale(app: &mut App, key: KeyEvent, rt: &Runtime) {
    use KeyCode::*;

    match key.code {
        Esc => app.cancel_form(),
        Tab | Down => app.next_field(),
        BackTab | Up => app.prev_field(),
        Enter => app.submit(rt),
        Backspace => app.pop_char(),
        Char(c) => app.push_char(c),
        _ => {}
    }
}

fn ui(f: &mut Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // main
            Constraint::Length(3), // footer
        ])
        .split(f.area());

    // Header
    let screen_name = match app.current_screen {
        Screen::Sales => "Sales",
        Screen::Analysis => "Revenue Analysis",
        Screen::Help => "Help",
    };
    let refreshed = app
        .last_refresh
        .map(|_| {
            app.ledger
                .fetched_at
                .with_timezone(&Local)
                .format("%H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string());
    let header_text = format!(
        "Sales Bookkeeping - {screen_name}   |   {} sales   |   refreshed {refreshed}",
        app.ledger.len()
    );
    let header = Paragraph::new(header_text).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    // Main content
    match app.current_screen {
        Screen::Sales => draw_sales(f, chunks[1], app),
        Screen::Analysis => draw_analysis(f, chunks[1], app),
        Screen::Help => draw_help(f, chunks[1]),
    }

    // Footer
    let footer_text = if let Some(ref msg) = app.error_message {
        format!("ERROR: {} | Press 'c' to clear", msg)
    } else if let Some(ref msg) = app.success_message {
        format!("SUCCESS: {} | Press 'c' to clear", msg)
    } else {
        match app.input_mode {
            InputMode::Normal => {
                "Tab/Shift+Tab: switch screen  |  n: new sale  |  ↑/↓: move  |  t: chart type  |  b: period  |  r: refresh  |  ?: help  |  q: quit".to_string()
            }
            InputMode::CreatingSale => {
                "New sale: Tab/↑/↓ to switch fields, Enter to submit, Esc to cancel".to_string()
            }
        }
    };
    let footer = Paragraph::new(footer_text).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

fn draw_sales(f: &mut Frame<'_>, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    if app.input_mode == InputMode::CreatingSale {
        draw_create_sale(f, chunks[0], app);
    } else {
        let text = "Press 'n' to record a new sale.\n\nEvery sale needs an item name,\na unit price above 0 and\na quantity of at least 1.";
        let p = Paragraph::new(text).block(
            Block::default()
                .title("Add New Sale")
                .borders(Borders::ALL),
        );
        f.render_widget(p, chunks[0]);
    }

    draw_report(f, chunks[1], app);
}

fn draw_create_sale(f: &mut Frame<'_>, area: Rect, app: &App) {
    let values = [&app.form.item_name, &app.form.unit_price, &app.form.quantity];

    let mut text = String::new();
    for (idx, (label, value)) in FORM_FIELDS.iter().zip(values).enumerate() {
        let marker = if idx == app.form_field_idx { "> " } else { "  " };
        text.push_str(&format!("{}{}: {}\n", marker, label, value));
    }
    text.push_str("\nDate: today, as recorded by the server");

    let block = Block::default()
        .title("Add New Sale (Enter to submit, Esc to cancel)")
        .borders(Borders::ALL);
    let p = Paragraph::new(text).block(block);
    f.render_widget(p, area);
}

fn draw_report(f: &mut Frame<'_>, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let report = app.report();

    if report.is_empty() {
        let p = Paragraph::new("No sales recorded yet.")
            .block(Block::default().title("Sales Report").borders(Borders::ALL));
        f.render_widget(p, chunks[0]);
    } else {
        let mut selected_idx = app.selected_row_idx;
        if selected_idx >= report.rows.len() {
            selected_idx = report.rows.len() - 1;
        }

        let rows = report.rows.iter().enumerate().map(|(idx, r)| {
            let mut row = Row::new(r.cells());
            if idx == selected_idx {
                row = row.style(Style::default().add_modifier(Modifier::REVERSED));
            }
            row
        });

        let widths = [
            Constraint::Length(12),
            Constraint::Min(14),
            Constraint::Length(16),
            Constraint::Length(9),
            Constraint::Length(18),
        ];

        let table = Table::new(rows, widths)
            .header(Row::new(COLUMNS).style(Style::default().add_modifier(Modifier::BOLD)))
            .block(Block::default().title("Sales Report").borders(Borders::ALL));
        f.render_widget(table, chunks[0]);
    }

    let total = Paragraph::new(report.grand_total_line())
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(total, chunks[1]);
}

fn selector<T: PartialEq + Copy>(options: &[T], current: T, name: impl Fn(T) -> &'static str) -> String {
    options
        .iter()
        .map(|o| {
            if *o == current {
                format!("[{}]", name(*o))
            } else {
                name(*o).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn draw_analysis(f: &mut Frame<'_>, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let text = format!(
        "Chart: {}  (t)   |   Period: {}  (b)",
        selector(&[ChartKind::Line, ChartKind::Bar], app.chart_kind, ChartKind::name),
        selector(&Bucket::ALL, app.bucket, Bucket::name),
    );
    let p = Paragraph::new(text).block(Block::default().title("Revenue Analysis").borders(Borders::ALL));
    f.render_widget(p, chunks[0]);

    let series = app.chart();
    if series.is_empty() {
        let p = Paragraph::new("No revenue data to chart yet.")
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(p, chunks[1]);
        return;
    }

    let title = format!(
        "{} revenue - {}",
        app.bucket,
        format_amount(app.ledger.grand_total())
    );
    match series.kind {
        ChartKind::Line => draw_line_chart(f, chunks[1], &series, title),
        ChartKind::Bar => draw_bar_chart(f, chunks[1], &series, title),
    }
}

fn draw_line_chart(f: &mut Frame<'_>, area: Rect, series: &ChartSeries, title: String) {
    let points = series.points();
    let max_x = points.len().saturating_sub(1).max(1) as f64;
    let max_y = series.y_max() * 1.1;

    let datasets = vec![Dataset::default()
        .name("Revenue")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&points)];

    let x_labels: Vec<Span> = match (series.labels.first(), series.labels.last()) {
        (Some(first), Some(last)) if series.labels.len() > 1 => {
            vec![Span::raw(first.clone()), Span::raw(last.clone())]
        }
        (Some(only), _) => vec![Span::raw(only.clone())],
        _ => Vec::new(),
    };
    let y_labels = vec![
        Span::raw("0"),
        Span::raw(format!("{:.0}", max_y / 2.0)),
        Span::raw(format!("{:.0}", max_y)),
    ];

    let chart = Chart::new(datasets)
        .block(Block::default().title(title).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .title("Period")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, max_x])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("Revenue")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, max_y])
                .labels(y_labels),
        );
    f.render_widget(chart, area);
}

fn draw_bar_chart(f: &mut Frame<'_>, area: Rect, series: &ChartSeries, title: String) {
    let bars = series.bars();
    let bar_width = series
        .labels
        .iter()
        .map(|l| l.len())
        .max()
        .unwrap_or(5)
        .max(5) as u16;

    let chart = BarChart::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .data(bars.as_slice())
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    f.render_widget(chart, area);
}

fn draw_help(f: &mut Frame<'_>, area: Rect) {
    let text = "\
Screens:
  Sales     - add a sale and browse every recorded sale with the grand total
  Analysis  - revenue per day, ISO week (Monday start) or month as a line or bar chart
  Help      - this page

Key bindings:
  Tab / Shift+Tab : switch screen
  n               : new sale (Tab to switch fields, Enter to submit, Esc to cancel)
  ↑ / ↓           : move selection in the sales table
  t               : toggle line / bar chart
  b               : cycle daily / weekly / monthly
  r               : refresh now (data also refreshes every few seconds)
  c               : clear message
  ?               : open this help
  q               : quit
";

    let block = Block::default()
        .title(Span::raw("Help"))
        .borders(Borders::ALL);
    let p = Paragraph::new(text).block(block);
    f.render_widget(p, area);
}
