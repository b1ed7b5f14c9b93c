// Full-screen view of a simulated board: type commands, watch the pins.

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use log::warn;
use picomux::{BoardConfig, Device, EnableLines, Firmware, Level, SimulatedGpio};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::{Frame, Terminal};

const HISTORY_LEN: usize = 8;

struct App {
    firmware: Firmware<SimulatedGpio>,
    input: String,
    history: Vec<String>,
}

impl App {
    fn new(board: &'static BoardConfig) -> Self {
        Self {
            firmware: Firmware::new(board, SimulatedGpio::new()),
            input: String::new(),
            history: Vec::new(),
        }
    }

    fn submit(&mut self) {
        let line = std::mem::take(&mut self.input);
        for outcome in self.firmware.feed_line(&line) {
            let entry = match outcome.action {
                Some(action) => {
                    format!("{} -> {:?} ({} writes)", outcome.command, action, outcome.writes.len())
                }
                None => format!("{} ignored", outcome.command),
            };
            self.history.push(entry);
        }
        if self.history.len() > HISTORY_LEN {
            let excess = self.history.len() - HISTORY_LEN;
            self.history.drain(..excess);
        }
    }
}

// Runs its closure when dropped, whichever way the scope is left.
struct OnDrop<F: FnMut()>(F);

impl<F: FnMut()> Drop for OnDrop<F> {
    fn drop(&mut self) {
        (self.0)()
    }
}

fn restore_terminal() {
    if let Err(e) = disable_raw_mode() {
        warn!("failed to disable raw mode: {}", e);
    }
    if let Err(e) = io::stdout().execute(LeaveAlternateScreen) {
        warn!("failed to leave alternate screen: {}", e);
    }
}

pub fn run(board: &'static BoardConfig) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let _restore = OnDrop(restore_terminal);
    io::stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    event_loop(&mut terminal, App::new(board))
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, &app))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.submit(),
                KeyCode::Backspace => {
                    app.input.pop();
                }
                KeyCode::Char(c) => app.input.push(c),
                _ => {}
            }
        }
    }
}

fn draw(f: &mut Frame, app: &App) {
    let dispatcher = app.firmware.dispatcher();
    let board = dispatcher.board();
    let gpio = dispatcher.gpio();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(4),
            Constraint::Length(3),
        ])
        .split(f.size());

    let rows = Device::ALL.iter().map(|&device| {
        let pins = board.pins(device);
        let enable = match pins.enable {
            EnableLines::Single(en) => vec![pin_span(en, gpio.level(en))],
            EnableLines::Dual { a, b } => vec![
                pin_span(a, gpio.level(a)),
                Span::raw(" "),
                pin_span(b, gpio.level(b)),
            ],
        };
        let mut select = Vec::new();
        for (bit, &line) in pins.select.iter().enumerate() {
            if bit > 0 {
                select.push(Span::raw(" "));
            }
            select.push(pin_span(line, gpio.level(line)));
        }
        Row::new(vec![
            Cell::from(format!("{} {}", device.index(), device)),
            Cell::from(Line::from(enable)),
            Cell::from(Line::from(select)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(16),
            Constraint::Min(30),
        ],
    )
    .header(
        Row::new(vec!["Device", "Enable", "Select (S0..)"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title(board.name));
    f.render_widget(table, chunks[0]);

    let history: Vec<Line> = app.history.iter().map(|h| Line::from(h.as_str())).collect();
    let history = Paragraph::new(history)
        .block(Block::default().borders(Borders::ALL).title("Commands"));
    f.render_widget(history, chunks[1]);

    let input = Paragraph::new(app.input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Command (Enter to send, Esc to quit)"),
    );
    f.render_widget(input, chunks[2]);
}

fn pin_span(line: u8, level: Option<Level>) -> Span<'static> {
    let high = level.map_or(false, Level::is_high);
    let style = if high {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Span::styled(format!("GP{}:{}", line, u8::from(high)), style)
}
