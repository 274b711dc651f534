use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{error, info};

use crail_core::{
    Action, ApiClient, ApiError, GameController, LobbyTab, ModalState, Page, RowContent, RowSet,
    Snapshot,
};

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_INPUT_LEN: usize = 64;

enum AppEvent {
    Input(Event),
    Tick,
    StateLoaded(Result<Snapshot, ApiError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptPurpose {
    LoginName,
    GainAmount,
    SpendAmount,
}

/// Single-line text prompt shown over the current page.
struct InputPrompt {
    title: &'static str,
    purpose: PromptPurpose,
    input: String,
    cursor: usize,
}

impl InputPrompt {
    fn new(title: &'static str, purpose: PromptPurpose) -> Self {
        Self {
            title,
            purpose,
            input: String::new(),
            cursor: 0,
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.input.len() as isize;
        let mut next = self.cursor as isize + delta;
        if next < 0 {
            next = 0;
        } else if next > len {
            next = len;
        }
        self.cursor = next as usize;
    }

    fn insert(&mut self, ch: char) {
        if self.input.len() >= MAX_INPUT_LEN {
            return;
        }
        if ch.is_ascii() && !ch.is_ascii_control() {
            self.input.insert(self.cursor, ch);
            self.cursor += ch.len_utf8();
        }
    }

    fn backspace(&mut self) {
        if self.cursor > 0 && self.cursor <= self.input.len() {
            self.cursor -= 1;
            self.input.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.input.len() {
            self.input.remove(self.cursor);
        }
    }
}

struct UiState {
    cursor: usize,
    modal_cursor: usize,
    status: String,
    should_quit: bool,
    in_flight: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            cursor: 0,
            modal_cursor: 0,
            status: "Connecting...".to_string(),
            should_quit: false,
            in_flight: 0,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: String) {
        self.status = message;
    }
}

/// Terminal host for the crail client controller.
pub struct CrailApp {
    client: ApiClient,
    controller: GameController,
    state: UiState,
    prompt: Option<InputPrompt>,
    event_tx: Option<mpsc::Sender<AppEvent>>,
}

impl CrailApp {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            controller: GameController::new(),
            state: UiState::default(),
            prompt: None,
            event_tx: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx.clone());

        // Initial page load.
        self.state.in_flight += 1;
        let client = self.client.clone();
        let tx = event_tx.clone();
        spawn(async move {
            let result = client.fetch_state().await;
            let _ = tx.send(AppEvent::StateLoaded(result)).await;
        });

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }

            if self.state.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Event::Key(key) = event {
                    self.handle_key(key);
                }
                true
            }
            Some(AppEvent::Tick) => true,
            Some(AppEvent::StateLoaded(result)) => {
                self.state.in_flight = self.state.in_flight.saturating_sub(1);
                match result {
                    Ok(snapshot) => {
                        self.controller.apply_snapshot(snapshot);
                        self.clamp_cursor();
                        let page = match self.controller.page() {
                            Page::Login => "login",
                            Page::PickGame => "lobby",
                            Page::Playing => "playing",
                        };
                        info!(page, "snapshot applied");
                        self.state.set_status("Ready".to_string());
                    }
                    Err(err) => {
                        // The action had no effect; the UI stays put and
                        // the same action can be retried.
                        error!(%err, "request failed");
                        self.state.set_status(format!("Request failed: {err}"));
                    }
                }
                true
            }
            None => false,
        }
    }

    /// Send one action to the server without blocking the UI. Nothing
    /// stops further actions while this one is in flight; responses
    /// apply in resolution order.
    fn dispatch(&mut self, action: Action) {
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        self.state.in_flight += 1;
        self.state.set_status("Working...".to_string());
        let client = self.client.clone();
        spawn(async move {
            let result = client.dispatch(&action).await;
            let _ = tx.send(AppEvent::StateLoaded(result)).await;
        });
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
        } else if self.controller.modal() != &ModalState::Closed {
            self.handle_modal_key(key);
        } else {
            match self.controller.page() {
                Page::Login => self.handle_login_key(key),
                Page::PickGame => self.handle_lobby_key(key),
                Page::Playing => self.handle_play_key(key),
            }
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let mut submit: Option<(PromptPurpose, String)> = None;
        let mut cancel = false;
        if let Some(prompt) = self.prompt.as_mut() {
            match key.code {
                KeyCode::Esc => cancel = true,
                KeyCode::Enter => submit = Some((prompt.purpose, prompt.input.clone())),
                KeyCode::Left => prompt.move_cursor(-1),
                KeyCode::Right => prompt.move_cursor(1),
                KeyCode::Home => prompt.cursor = 0,
                KeyCode::End => prompt.cursor = prompt.input.len(),
                KeyCode::Backspace => prompt.backspace(),
                KeyCode::Delete => prompt.delete(),
                KeyCode::Char(ch) => {
                    if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                        prompt.insert(ch);
                    }
                }
                _ => {}
            }
        }

        if cancel {
            self.prompt = None;
            self.state.set_status("Cancelled".to_string());
            return;
        }

        if let Some((purpose, input)) = submit {
            self.prompt = None;
            match purpose {
                PromptPurpose::LoginName => {
                    let name = input.trim().to_string();
                    if name.is_empty() {
                        self.state.set_status("A name is required".to_string());
                    } else {
                        self.dispatch(Action::Login { name });
                    }
                }
                // Amount text is not validated here; garbage goes to
                // the server as null and comes back as a failure.
                PromptPurpose::GainAmount => self.dispatch(Action::gain(&input)),
                PromptPurpose::SpendAmount => self.dispatch(Action::spend(&input)),
            }
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        let picking = matches!(self.controller.modal(), ModalState::ContractPick { .. });
        match key.code {
            KeyCode::Esc => {
                self.controller.cancel_modal();
                self.state.modal_cursor = 0;
            }
            KeyCode::Char('j') | KeyCode::Down if picking => {
                let rows = self.controller.contract_pick_rows().len();
                if rows > 0 && self.state.modal_cursor + 1 < rows {
                    self.state.modal_cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up if picking => {
                self.state.modal_cursor = self.state.modal_cursor.saturating_sub(1);
            }
            KeyCode::Enter => {
                if picking {
                    self.controller.activate_contract_row(self.state.modal_cursor);
                    self.state.modal_cursor = 0;
                } else if let Some(action) = self.controller.confirm_modal() {
                    self.dispatch(action);
                }
            }
            _ => {}
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.state.should_quit = true,
            KeyCode::Enter | KeyCode::Char('l') => {
                self.prompt = Some(InputPrompt::new("Log in as", PromptPurpose::LoginName));
            }
            _ => {}
        }
    }

    fn handle_lobby_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.state.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char('o') => self.dispatch(Action::Logout),
            KeyCode::Enter => {
                let index = self.state.cursor;
                if let Some(action) = self.controller.activate_lobby_row(index) {
                    self.dispatch(action);
                } else {
                    // Sub-view toggled locally.
                    self.state.cursor = 0;
                }
            }
            _ => {}
        }
    }

    fn handle_play_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.state.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char('g') => {
                self.prompt = Some(InputPrompt::new("Gain amount", PromptPurpose::GainAmount));
            }
            KeyCode::Char('s') => {
                self.prompt = Some(InputPrompt::new("Spend amount", PromptPurpose::SpendAmount));
            }
            KeyCode::Char('v') => self.dispatch(Action::LeaveGame),
            KeyCode::Char('o') => self.dispatch(Action::Logout),
            KeyCode::Enter => {
                let index = self.state.cursor;
                if let Some(action) = self.controller.activate_card_row(index) {
                    self.dispatch(action);
                } else {
                    self.state.modal_cursor = 0;
                }
            }
            _ => {}
        }
    }

    fn current_rows(&self) -> &RowSet<RowContent> {
        match self.controller.page() {
            Page::Playing => self.controller.cards_rows(),
            _ => self.controller.lobby_rows(),
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.current_rows().len();
        if len == 0 {
            self.state.cursor = 0;
            return;
        }
        let mut idx = self.state.cursor as isize + delta;
        if idx < 0 {
            idx = 0;
        } else if idx >= len as isize {
            idx = len as isize - 1;
        }
        self.state.cursor = idx as usize;
    }

    fn clamp_cursor(&mut self) {
        let len = self.current_rows().len();
        if len == 0 {
            self.state.cursor = 0;
        } else if self.state.cursor >= len {
            self.state.cursor = len - 1;
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        match self.controller.page() {
            Page::Login => self.draw_login(frame),
            Page::PickGame => self.draw_lobby(frame),
            Page::Playing => self.draw_play(frame),
        }
        match self.controller.modal().clone() {
            ModalState::Closed => {}
            ModalState::ContractPick { .. } => self.render_contract_pick(frame),
            ModalState::ContractConfirm { description, .. } => self.render_confirm(
                frame,
                "Complete contract",
                &[description],
                "Enter to complete, Esc to go back",
            ),
            ModalState::DiscardConfirm { description, .. } => self.render_confirm(
                frame,
                "Discard card",
                &description,
                "Enter to discard, Esc to go back",
            ),
            ModalState::SimpleDiscard { description, .. } => self.render_confirm(
                frame,
                "Discard card",
                &description,
                "Enter to discard, Esc to keep it",
            ),
        }
        if self.prompt.is_some() {
            self.render_prompt(frame);
        }
    }

    fn draw_login(&self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(3)])
            .split(area);

        let body = Paragraph::new(vec![
            Line::from(Span::styled(
                "Crail",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("A crayon rails game"),
            Line::from(""),
            Line::from("Press Enter to log in, q to quit"),
        ])
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        frame.render_widget(body, centered_rect(44, 9, chunks[0]));
        self.render_status(frame, chunks[1]);
    }

    fn draw_lobby(&self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(area);

        let tab_title = match self.controller.lobby_tab() {
            LobbyTab::Games => "Join a game",
            LobbyTab::Worlds => "Pick a world",
        };
        let player = self.controller.player_name().unwrap_or("Me").to_string();
        let header = Paragraph::new(Line::from(vec![
            Span::styled("Crail", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  —  "),
            Span::raw(player),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        self.render_row_list(frame, chunks[1], tab_title);
        self.render_status(frame, chunks[2]);
    }

    fn draw_play(&self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(area);

        let game = self.controller.game_name().unwrap_or("?").to_string();
        let money = self.controller.money();
        let header = Paragraph::new(Line::from(vec![
            Span::styled(game, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("   money: {money}")),
            Span::raw("   g gain / s spend / v leave / o logout"),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        self.render_row_list(frame, chunks[1], "Cards");
        self.render_status(frame, chunks[2]);
    }

    fn render_row_list(&self, frame: &mut Frame, area: Rect, title: &str) {
        let rows = self.current_rows();
        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| {
                let lines: Vec<Line> = if row.value.lines.is_empty() {
                    vec![Line::from("(blank card)")]
                } else {
                    row.value.lines.iter().map(|l| Line::from(l.clone())).collect()
                };
                if row.id.is_none() {
                    ListItem::new(lines).style(Style::default().fg(Color::Cyan))
                } else {
                    ListItem::new(lines)
                }
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title.to_string()))
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        let mut list_state = ListState::default();
        list_state.select(Some(self.state.cursor.min(rows.len().saturating_sub(1))));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_contract_pick(&self, frame: &mut Frame) {
        let rows = self.controller.contract_pick_rows();
        let items: Vec<ListItem> = rows
            .iter()
            .map(|choice| {
                if choice.contract.is_none() {
                    ListItem::new(choice.label.clone()).style(Style::default().fg(Color::Red))
                } else {
                    ListItem::new(choice.label.clone())
                }
            })
            .collect();
        let height = (rows.len() as u16).saturating_add(2).max(3);
        let popup = centered_rect(48, height, frame.size());
        frame.render_widget(Clear, popup);
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Pick a contract"))
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        let mut list_state = ListState::default();
        list_state.select(Some(self.state.modal_cursor.min(rows.len().saturating_sub(1))));
        frame.render_stateful_widget(list, popup, &mut list_state);
    }

    fn render_confirm(&self, frame: &mut Frame, title: &str, description: &[String], hint: &str) {
        let mut lines: Vec<Line> = description
            .iter()
            .map(|line| Line::from(line.clone()))
            .collect();
        if lines.is_empty() {
            lines.push(Line::from("(blank card)"));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(Color::DarkGray),
        )));

        let height = (lines.len() as u16).saturating_add(2);
        let popup = centered_rect(52, height, frame.size());
        frame.render_widget(Clear, popup);
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title.to_string()))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup);
    }

    fn render_prompt(&self, frame: &mut Frame) {
        let Some(prompt) = self.prompt.as_ref() else {
            return;
        };
        let popup = centered_rect(40, 3, frame.size());
        frame.render_widget(Clear, popup);

        // Mark the cursor position inside the input text.
        let (before, after) = prompt.input.split_at(prompt.cursor);
        let line = Line::from(vec![
            Span::raw(before.to_string()),
            Span::styled("▏", Style::default().fg(Color::Cyan)),
            Span::raw(after.to_string()),
        ]);
        let paragraph = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .title(prompt.title),
        );
        frame.render_widget(paragraph, popup);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let mut text = self.state.status.clone();
        if self.state.in_flight > 0 {
            text.push_str(&format!("  ({} request(s) in flight)", self.state.in_flight));
        }
        if let Some(applied) = self.controller.store().applied_at() {
            let local = applied.with_timezone(&Local);
            text.push_str(&format!("  •  state as of {}", local.format("%H:%M:%S")));
        }
        let paragraph = Paragraph::new(Line::from(text))
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
