use crate::board::Board;
use crate::errors::QuickstepError;
use crate::hotkeys::{action_for_key, board_controls_legend, HotkeyAction, INTERVAL_STEP_MS};
use crate::render::Presenter;
use crate::session::Session;
use crate::types::MarkerKind;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{CrosstermBackend, TestBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, List, ListItem, Paragraph};
use ratatui::{Frame, Terminal};
use std::time::{Duration, Instant};

const IDLE_POLL: Duration = Duration::from_millis(250);
const MARKER_GLYPH: &str = "▲";

pub fn marker_color(kind: MarkerKind) -> Color {
    match kind {
        MarkerKind::Pivot => Color::Yellow,
        MarkerKind::Low => Color::Red,
        MarkerKind::High => Color::Green,
    }
}

/// One-line summary of the playback state shown above the board.
pub fn status_line(session: &Session) -> String {
    let playback = &session.playback;
    let engine = playback.engine();
    format!(
        "elements={} mode={} interval={}ms running={} steps={} remaining={} iteration={}",
        session.board.len(),
        playback.mode().as_str(),
        playback.interval().as_millis(),
        if playback.is_running() { "yes" } else { "no" },
        engine.applied_steps(),
        engine.remaining(),
        engine.markers().iteration,
    )
}

/// The colour a bar is drawn in. Pivot wins over the scanners when markers
/// share a slot.
fn bar_color(board: &Board, slot: usize) -> Color {
    [MarkerKind::Pivot, MarkerKind::High, MarkerKind::Low]
        .into_iter()
        .find(|kind| board.marker_position(*kind) == Some(slot))
        .map(marker_color)
        .unwrap_or(Color::Gray)
}

fn draw_bars(frame: &mut Frame, board: &Board, area: Rect) {
    if board.is_empty() || area.width == 0 {
        return;
    }
    let floor = board
        .elements()
        .iter()
        .map(|element| element.value)
        .min()
        .unwrap_or(0);
    let bars = board
        .elements()
        .iter()
        .enumerate()
        .map(|(slot, element)| {
            // Shift so the smallest value still gets a visible bar.
            let height = element.value.saturating_sub(floor).saturating_add(1);
            Bar::default()
                .value(u64::try_from(height).unwrap_or(u64::MAX))
                .text_value(element.value.to_string())
                .style(Style::default().fg(bar_color(board, slot)))
        })
        .collect::<Vec<_>>();
    let width = slot_width(area.width, board.len());
    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(width)
        .bar_gap(0);
    frame.render_widget(chart, area);
}

/// Columns per slot when `count` slots share `total` columns, never zero.
fn slot_width(total: u16, count: usize) -> u16 {
    let count = u16::try_from(count.max(1)).unwrap_or(u16::MAX);
    (total / count).max(1)
}

fn lane_line(board: &Board, kind: MarkerKind, cell_width: u16) -> Line<'static> {
    let cell_width = usize::from(cell_width.max(1));
    let marked = board.marker_position(kind);
    let spans = (0..board.len())
        .map(|slot| {
            if marked == Some(slot) {
                let pad = cell_width.saturating_sub(1);
                let left = pad / 2;
                Span::styled(
                    format!("{}{MARKER_GLYPH}{}", " ".repeat(left), " ".repeat(pad - left)),
                    Style::default().fg(marker_color(kind)),
                )
            } else {
                Span::raw(" ".repeat(cell_width))
            }
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

/// Draws the whole screen: status, bars with their marker lanes, the log
/// tail and the key legend.
pub fn draw_session(frame: &mut Frame, session: &Session) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(8),
            Constraint::Length(1),
        ])
        .split(frame.area());

    frame.render_widget(
        Paragraph::new(status_line(session))
            .block(Block::default().borders(Borders::ALL).title("Status")),
        chunks[0],
    );

    let board_block = Block::default().borders(Borders::ALL).title("Quicksort");
    let inner = board_block.inner(chunks[1]);
    frame.render_widget(board_block, chunks[1]);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);
    let board = &session.board;
    draw_bars(frame, board, rows[0]);
    let cell_width = slot_width(inner.width, board.len());
    for (row, kind) in [MarkerKind::Pivot, MarkerKind::High, MarkerKind::Low]
        .into_iter()
        .enumerate()
    {
        frame.render_widget(
            Paragraph::new(lane_line(board, kind, cell_width)),
            rows[row + 1],
        );
    }

    let visible = usize::from(chunks[2].height.saturating_sub(2));
    let log = board.log_lines();
    let items = log[log.len().saturating_sub(visible)..]
        .iter()
        .map(|line| ListItem::new(line.as_str()))
        .collect::<Vec<_>>();
    frame.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL).title("Log")),
        chunks[2],
    );

    frame.render_widget(Paragraph::new(board_controls_legend()), chunks[3]);
}

/// Renders one frame off-screen and returns it as text, one line per row.
pub fn render_session(session: &Session, width: u16, height: u16) -> Result<String, QuickstepError> {
    if width == 0 || height == 0 {
        return Ok(String::new());
    }
    let backend = TestBackend::new(width, height);
    let mut terminal =
        Terminal::new(backend).map_err(|e| QuickstepError::Terminal(e.to_string()))?;
    terminal
        .draw(|frame| draw_session(frame, session))
        .map_err(|e| QuickstepError::Terminal(e.to_string()))?;

    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..height {
        for x in 0..width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    Ok(out)
}

/// Applies one hotkey action. Returns `false` when the UI should exit.
/// Rejected actions are written to the board log instead of aborting.
pub fn apply_action(session: &mut Session, action: HotkeyAction, now: Instant) -> bool {
    let outcome = match action {
        HotkeyAction::Quit => return false,
        HotkeyAction::Shuffle => session.shuffle(),
        HotkeyAction::StartStop => session.start_or_stop().map(|_| ()),
        HotkeyAction::NextStep => session.next_step().map(|_| ()),
        HotkeyAction::ToggleAuto => {
            session.toggle_auto(now);
            Ok(())
        }
        HotkeyAction::Faster => session.change_interval(-INTERVAL_STEP_MS).map(|_| ()),
        HotkeyAction::Slower => session.change_interval(INTERVAL_STEP_MS).map(|_| ()),
        HotkeyAction::MoreElements => session.resize(session.board.len() + 1),
        HotkeyAction::FewerElements => session.resize(session.board.len().saturating_sub(1)),
        HotkeyAction::ClearLog => {
            session.board.clear_log();
            Ok(())
        }
    };
    if let Err(err) = outcome {
        session.board.log_message(&err.to_string());
    }
    true
}

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self, QuickstepError> {
        enable_raw_mode().map_err(|e| QuickstepError::Terminal(e.to_string()))?;
        let mut stdout = std::io::stdout();
        if let Err(err) = crossterm::execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(QuickstepError::Terminal(err.to_string()));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = std::io::stdout();
        let _ = crossterm::execute!(stdout, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn key_action(code: KeyCode, modifiers: KeyModifiers) -> Option<HotkeyAction> {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(HotkeyAction::Quit),
        KeyCode::Esc => Some(HotkeyAction::Quit),
        KeyCode::Enter => Some(HotkeyAction::StartStop),
        KeyCode::Char(key) => action_for_key(key),
        _ => None,
    }
}

/// Full-screen interactive loop. The automatic timer is serviced between
/// key polls, so a pending deadline shortens the poll timeout.
pub fn run_interactive(session: &mut Session) -> Result<(), QuickstepError> {
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))
        .map_err(|e| QuickstepError::Terminal(e.to_string()))?;

    loop {
        terminal
            .draw(|frame| draw_session(frame, session))
            .map_err(|e| QuickstepError::Terminal(e.to_string()))?;

        let timeout = session
            .playback
            .time_until_tick(Instant::now())
            .map_or(IDLE_POLL, |wait| wait.min(IDLE_POLL));
        if event::poll(timeout).map_err(|e| QuickstepError::Terminal(e.to_string()))? {
            if let Event::Key(key) =
                event::read().map_err(|e| QuickstepError::Terminal(e.to_string()))?
            {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = key_action(key.code, key.modifiers) {
                        if !apply_action(session, action, Instant::now()) {
                            break;
                        }
                    }
                }
            }
        }

        if let Err(err) = session.tick(Instant::now()) {
            session.board.log_message(&err.to_string());
        }
    }
    Ok(())
}
