//! Player - Terminal haptic-chain demo
//!
//! Plays feedback chains on key presses and shows each effect as it fires,
//! with its offset from the moment the chain was started:
//! - Presets: the three demo patterns from `haptic_chain::presets`
//! - Single effects: one-off selection, impact and notification chains
//!
//! Keys: 1/2/3 = presets, s = selection, l/m/h = impacts,
//!       y/e/w = success/error/warning, c = clear, q = quit

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use haptic_chain::prelude::*;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Terminal,
};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const MAX_LOG: usize = 200;

// ============================================================================
// Backend - Forwards fired effects to the UI
// ============================================================================

struct ChannelBackend {
    tx: mpsc::UnboundedSender<(EffectKind, Instant)>,
}

impl ChannelBackend {
    fn fire(&self, kind: EffectKind) {
        let _ = self.tx.send((kind, Instant::now()));
    }
}

impl EffectBackend for ChannelBackend {
    fn selection_changed(&self) {
        self.fire(EffectKind::SelectionChanged);
    }

    fn impact_occurred(&self, style: ImpactStyle) {
        self.fire(EffectKind::from(style));
    }

    fn notification_occurred(&self, kind: NotificationType) {
        self.fire(EffectKind::from(kind));
    }
}

type DemoHaptics = Haptics<TokioClock, TokioDispatcher, ChannelBackend>;

// ============================================================================
// State
// ============================================================================

struct AppState {
    started: Option<(&'static str, Instant)>,
    log: VecDeque<String>,
}

impl AppState {
    fn new() -> Self {
        Self {
            started: None,
            log: VecDeque::new(),
        }
    }

    fn start(&mut self, label: &'static str) {
        self.started = Some((label, Instant::now()));
        self.push(format!("> {}", label));
    }

    fn fired(&mut self, kind: EffectKind, at: Instant) {
        let offset = self
            .started
            .map(|(_, start)| at.saturating_duration_since(start).as_millis())
            .unwrap_or_default();
        self.push(format!("  {:>6}ms  {}", offset, kind));
    }

    fn push(&mut self, line: String) {
        if self.log.len() == MAX_LOG {
            self.log.pop_front();
        }
        self.log.push_back(line);
    }
}

/// Start the chain bound to `code`, returning its label.
fn play_for_key(haptics: &DemoHaptics, code: KeyCode) -> Option<&'static str> {
    let label = match code {
        KeyCode::Char('1') => {
            presets::triple_tick(haptics.chain());
            "triple tick"
        }
        KeyCode::Char('2') => {
            presets::ticking_replay(haptics.chain());
            "ticking replay"
        }
        KeyCode::Char('3') => {
            presets::tap_then_success(haptics.chain());
            "tap then success"
        }
        KeyCode::Char('s') => {
            haptics.chain().selection_changed().play();
            "selection"
        }
        KeyCode::Char('l') => {
            haptics.chain().impact_occurred(ImpactStyle::Light).play();
            "light impact"
        }
        KeyCode::Char('m') => {
            haptics.chain().impact_occurred(ImpactStyle::Medium).play();
            "medium impact"
        }
        KeyCode::Char('h') => {
            haptics.chain().impact_occurred(ImpactStyle::Heavy).play();
            "heavy impact"
        }
        KeyCode::Char('y') => {
            haptics
                .chain()
                .notification_occurred(NotificationType::Success)
                .play();
            "success"
        }
        KeyCode::Char('e') => {
            haptics
                .chain()
                .notification_occurred(NotificationType::Error)
                .play();
            "error"
        }
        KeyCode::Char('w') => {
            haptics
                .chain()
                .notification_occurred(NotificationType::Warning)
                .play();
            "warning"
        }
        _ => return None,
    };
    Some(label)
}

// ============================================================================
// Main - Setup terminal, run event loop, cleanup
// ============================================================================

#[tokio::main]
async fn main() -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn spawn_key_poller(
    tx: mpsc::UnboundedSender<KeyCode>,
    cancel_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = tokio::time::sleep(Duration::from_millis(16)) => {
                    while event::poll(Duration::from_millis(1)).unwrap_or(false) {
                        if let Ok(Event::Key(key)) = event::read() {
                            if key.kind == KeyEventKind::Press && tx.send(key.code).is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        }
    })
}

async fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>) -> io::Result<()> {
    let (fired_tx, mut fired_rx) = mpsc::unbounded_channel();
    let dispatcher = TokioDispatcher::spawn();
    let haptics = Haptics::with_shared_backend(
        TokioClock,
        dispatcher.clone(),
        Arc::new(ChannelBackend { tx: fired_tx }),
    );

    let (key_tx, mut key_rx) = mpsc::unbounded_channel();
    let cancel_token = CancellationToken::new();
    let _poller = spawn_key_poller(key_tx, cancel_token.clone());

    let mut state = AppState::new();
    let mut should_render = true;

    loop {
        if should_render {
            terminal.draw(|frame| {
                let [title_area, log_area, help_area] = Layout::vertical([
                    Constraint::Length(3),
                    Constraint::Fill(1),
                    Constraint::Length(1),
                ])
                .areas(frame.area());

                let current = state
                    .started
                    .map(|(label, _)| label)
                    .unwrap_or("nothing yet");
                let title = Paragraph::new(format!("last chain: {}", current))
                    .alignment(Alignment::Center)
                    .block(
                        Block::default()
                            .title(" Haptic Player ")
                            .borders(Borders::ALL)
                            .border_style(Style::default().fg(Color::Cyan)),
                    );
                frame.render_widget(title, title_area);

                let visible = log_area.height.saturating_sub(2) as usize;
                let items: Vec<ListItem> = state
                    .log
                    .iter()
                    .skip(state.log.len().saturating_sub(visible))
                    .map(|line| ListItem::new(Line::from(line.as_str())))
                    .collect();
                let log = List::new(items)
                    .block(Block::default().title(" Fired ").borders(Borders::ALL));
                frame.render_widget(log, log_area);

                let help = Paragraph::new(
                    "1/2/3: presets  s: select  l/m/h: impact  y/e/w: notify  c: clear  q: quit",
                )
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
                frame.render_widget(help, help_area);
            })?;
            should_render = false;
        }

        tokio::select! {
            Some(code) = key_rx.recv() => {
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') => {
                        state.log.clear();
                        should_render = true;
                    }
                    code => {
                        if let Some(label) = play_for_key(&haptics, code) {
                            state.start(label);
                            should_render = true;
                        }
                    }
                }
            }

            Some((kind, at)) = fired_rx.recv() => {
                state.fired(kind, at);
                should_render = true;
            }
        }
    }

    cancel_token.cancel();
    dispatcher.shutdown();
    Ok(())
}
