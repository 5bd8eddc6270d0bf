//! Terminal bar charts, laid out as a 3x2 grid.

use std::io;
use std::time::Duration;

use crossterm::cursor::Show;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Paragraph};
use ratatui::{Frame, Terminal};

use crate::analysis::{Analysis, Breakdown};

const GRID_ROWS: usize = 3;
const GRID_COLS: usize = 2;
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Bars hold integers; values are scaled so sub-unit volumes still show.
const BAR_SCALE: f64 = 1000.0;

const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
    Color::Red,
];

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as u64)
    } else {
        format!("{:.1}", value)
    }
}

fn chart_block(breakdown: &Breakdown) -> Block<'_> {
    Block::bordered()
        .title(Line::from(breakdown.unit.as_str()).right_aligned())
        .title_bottom(Line::from(breakdown.title.as_str()).centered())
}

fn render_breakdown(frame: &mut Frame, area: Rect, breakdown: &Breakdown, color: Color) {
    if breakdown.rows.is_empty() {
        let empty = Paragraph::new("no data")
            .style(Style::default().fg(Color::DarkGray))
            .block(chart_block(breakdown));
        frame.render_widget(empty, area);
        return;
    }

    // Largest on top, as in a horizontal bar plot of an ascending series
    let bars: Vec<Bar> = breakdown
        .rows
        .iter()
        .rev()
        .map(|row| {
            Bar::default()
                .label(Line::from(row.label.clone()))
                .value((row.value * BAR_SCALE).round() as u64)
                .text_value(format_value(row.value))
        })
        .collect();

    let chart = BarChart::default()
        .block(chart_block(breakdown))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(color))
        .value_style(Style::default().fg(Color::Black).bg(color))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

/// Draws the header and the six charts.
pub fn draw(frame: &mut Frame, analysis: &Analysis, source: &str) {
    let [header, body] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(frame.area());

    let summary = &analysis.summary;
    let title = Line::from(format!(
        " {} | {} exchanges | {} domains | {} countries | q to quit",
        source, summary.exchanges, summary.domains, summary.countries
    ))
    .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(Paragraph::new(title), header);

    let rows = Layout::vertical([Constraint::Ratio(1, GRID_ROWS as u32); GRID_ROWS]).split(body);
    let cells: Vec<Rect> = rows
        .iter()
        .flat_map(|row| {
            Layout::horizontal([Constraint::Ratio(1, GRID_COLS as u32); GRID_COLS])
                .split(*row)
                .to_vec()
        })
        .collect();

    for (i, (breakdown, area)) in analysis.breakdowns.iter().zip(cells).enumerate() {
        render_breakdown(frame, area, breakdown, PALETTE[i % PALETTE.len()]);
    }
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    analysis: &Analysis,
    source: &str,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, analysis, source))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(())
                }
                _ => {}
            }
        }
    }
}

/// Runs its closure when dropped, on every exit path.
struct Restore<F: FnMut()>(F);

impl<F: FnMut()> Drop for Restore<F> {
    fn drop(&mut self) {
        (self.0)()
    }
}

fn restore_terminal() {
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
    let _ = disable_raw_mode();
}

/// Shows the charts on the alternate screen until the user quits.
pub fn run(analysis: &Analysis, source: &str) -> io::Result<()> {
    enable_raw_mode()?;
    let _restore = Restore(restore_terminal);

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    event_loop(&mut terminal, analysis, source)
}
