//! Tokens tab: the registered token list and the add-token form.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::{
    action::Action,
    domain::{
        config_string::{
            configuration_string, looks_like_configuration_string, parse_configuration_string,
        },
        token::{RegisteredToken, Token, is_valid_uid},
    },
    tui::Frame,
};

use super::Component;

/// Token view mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokensMode {
    /// List registered tokens.
    List,
    /// Add a token by configuration string or uid.
    Add,
}

/// Component for listing registered tokens and adding new ones.
pub struct TokensComponent {
    action_tx: UnboundedSender<Action>,
    pub tokens: Vec<RegisteredToken>,
    pub selected_index: usize,
    list_state: ListState,
    pub mode: TokensMode,
    // Add mode state
    pub input: String,
    pub lookup_pending: bool,
    // Unregister confirmation state, holds the uid of the first [x] press
    pub pending_unregister: Option<String>,
    // Messages
    pub error_message: Option<String>,
}

impl TokensComponent {
    pub fn new(action_tx: UnboundedSender<Action>) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            action_tx,
            tokens: Vec::new(),
            selected_index: 0,
            list_state,
            mode: TokensMode::List,
            input: String::new(),
            lookup_pending: false,
            pending_unregister: None,
            error_message: None,
        }
    }

    /// Set the registered token list.
    pub fn set_tokens(&mut self, tokens: Vec<RegisteredToken>) {
        self.tokens = tokens;
        if !self.tokens.is_empty() && self.selected_index >= self.tokens.len() {
            self.selected_index = self.tokens.len() - 1;
        }
        self.list_state.select(Some(self.selected_index));
        self.pending_unregister = None;
    }

    /// Get the currently selected registered token.
    pub fn selected_token(&self) -> Option<&RegisteredToken> {
        self.tokens.get(self.selected_index)
    }

    /// Whether key input should go to the add form instead of hotkeys.
    pub fn is_editing(&self) -> bool {
        self.mode == TokensMode::Add
    }

    /// Clear the add form.
    pub fn clear_add(&mut self) {
        self.input.clear();
        self.lookup_pending = false;
    }

    /// Leave add mode after a successful registration.
    pub fn finish_add(&mut self) {
        self.mode = TokensMode::List;
        self.clear_add();
    }

    /// Drop all transient state, used when the network changes.
    pub fn reset(&mut self) {
        self.mode = TokensMode::List;
        self.clear_add();
        self.pending_unregister = None;
        self.error_message = None;
    }

    /// Handle paste (called externally with pasted text)
    pub fn paste(&mut self, text: &str) {
        if self.mode == TokensMode::Add {
            self.input.push_str(text.trim());
            self.error_message = None;
        }
    }

    /// Result of a uid lookup previously requested from this form. Results
    /// for input the user has since changed or abandoned are dropped.
    pub fn on_lookup_result(&mut self, uid: &str, result: Result<Token, String>) -> Result<()> {
        if !self.lookup_pending || self.mode != TokensMode::Add || self.input.trim() != uid {
            debug!("Discarding stale token lookup for {}", uid);
            return Ok(());
        }
        self.lookup_pending = false;
        match result {
            Ok(token) => {
                self.action_tx.send(Action::OpenTokenDialog(token))?;
            }
            Err(err) => {
                self.error_message = Some(err);
            }
        }
        Ok(())
    }

    fn next_token(&mut self) {
        if self.tokens.is_empty() {
            return;
        }
        let i = if self.selected_index >= self.tokens.len() - 1 {
            0
        } else {
            self.selected_index + 1
        };
        self.selected_index = i;
        self.list_state.select(Some(i));
    }

    fn prev_token(&mut self) {
        if self.tokens.is_empty() {
            return;
        }
        let i = if self.selected_index == 0 {
            self.tokens.len() - 1
        } else {
            self.selected_index - 1
        };
        self.selected_index = i;
        self.list_state.select(Some(i));
    }

    /// Submit the add form. Configuration strings are parsed locally and open
    /// the dialog directly; a bare uid goes through an async node lookup.
    fn submit_add(&mut self) -> Result<()> {
        if self.lookup_pending {
            return Ok(());
        }
        let entry = self.input.trim().to_string();
        if entry.is_empty() {
            self.error_message = Some("Enter a configuration string or token uid".to_string());
            return Ok(());
        }
        if looks_like_configuration_string(&entry) {
            match parse_configuration_string(&entry) {
                Ok(token) => {
                    self.action_tx.send(Action::OpenTokenDialog(token))?;
                }
                Err(e) => {
                    self.error_message = Some(e.to_string());
                }
            }
        } else if is_valid_uid(&entry) {
            self.lookup_pending = true;
            self.action_tx.send(Action::LookupToken(entry))?;
        } else {
            self.error_message =
                Some("Not a configuration string or a 64-character hex uid".to_string());
        }
        Ok(())
    }

    /// Static draw method for use in the main app draw loop.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_static(
        f: &mut Frame,
        area: Rect,
        tokens: &[RegisteredToken],
        selected_index: usize,
        mode: TokensMode,
        input: &str,
        lookup_pending: bool,
        pending_unregister: Option<&str>,
        error_message: Option<&str>,
    ) {
        match mode {
            TokensMode::List => {
                Self::draw_list_mode(f, area, tokens, selected_index, pending_unregister);
            }
            TokensMode::Add => {
                Self::draw_add_mode(f, area, input, lookup_pending, error_message);
            }
        }
    }

    fn draw_list_mode(
        f: &mut Frame,
        area: Rect,
        tokens: &[RegisteredToken],
        selected_index: usize,
        pending_unregister: Option<&str>,
    ) {
        let chunks = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        // Token list
        let items: Vec<ListItem> = tokens
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if i == selected_index {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                let content = Line::from(vec![
                    Span::styled(entry.token.display_name(), style),
                    Span::raw("  "),
                    Span::styled(
                        format!("{}...", &entry.token.uid[..8]),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]);
                ListItem::new(content)
            })
            .collect();

        let mut list_state = ListState::default();
        list_state.select(Some(selected_index));

        let title = format!("Registered Tokens ({}) [a]Add [x]Unregister", tokens.len());

        let list = List::new(items)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        f.render_stateful_widget(list, chunks[0], &mut list_state);

        // Token details
        let details = if let Some(entry) = tokens.get(selected_index) {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled("Token: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        entry.token.display_name(),
                        Style::default().fg(Color::White),
                    ),
                ]),
                Line::from(""),
                Line::from(vec![Span::styled(
                    "Token uid: ",
                    Style::default().fg(Color::DarkGray),
                )]),
                Line::from(vec![Span::styled(
                    entry.token.uid.clone(),
                    Style::default().fg(Color::Yellow),
                )]),
                Line::from(""),
                Line::from(vec![Span::styled(
                    "Configuration string: ",
                    Style::default().fg(Color::DarkGray),
                )]),
                Line::from(vec![Span::styled(
                    configuration_string(&entry.token),
                    Style::default().fg(Color::Gray),
                )]),
                Line::from(""),
                Line::from(""),
            ];
            if let Some(uid) = pending_unregister {
                let name = tokens
                    .iter()
                    .find(|t| t.token.uid == uid)
                    .map(|t| t.token.display_name())
                    .unwrap_or_else(|| uid.to_string());
                lines.push(Line::from(vec![Span::styled(
                    format!("Press [x] again to unregister {}", name),
                    Style::default().fg(Color::Red),
                )]));
            } else {
                lines.push(Line::from(vec![Span::styled(
                    "[a] Add  [x] Unregister  [j/k] Navigate",
                    Style::default().fg(Color::DarkGray),
                )]));
            }
            lines
        } else {
            vec![
                Line::from("No tokens registered"),
                Line::from(""),
                Line::from("Press [a] to add a token by configuration"),
                Line::from("string or token uid"),
            ]
        };

        let details_widget = Paragraph::new(details)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title("Token Details")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );

        f.render_widget(details_widget, chunks[1]);
    }

    fn draw_add_mode(
        f: &mut Frame,
        area: Rect,
        input: &str,
        lookup_pending: bool,
        error_message: Option<&str>,
    ) {
        let chunks = Layout::vertical([
            Constraint::Length(4), // Info
            Constraint::Length(3), // Input
            Constraint::Min(0),    // Status/help
        ])
        .split(area);

        let info = Paragraph::new(vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Paste a configuration string [name:symbol:uid:checksum],",
                Style::default().fg(Color::Gray),
            )]),
            Line::from(vec![Span::styled(
                "or enter a 64-character token uid to look it up on the node.",
                Style::default().fg(Color::Gray),
            )]),
        ])
        .block(
            Block::default()
                .title("Add Token [Esc] Back")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        f.render_widget(info, chunks[0]);

        // Single input field, always in direct input mode
        let input_display = if input.is_empty() {
            "|".to_string()
        } else {
            format!("{}|", input)
        };
        let input_widget = Paragraph::new(vec![Line::from(vec![Span::styled(
            input_display,
            Style::default().fg(Color::Yellow),
        )])])
        .block(
            Block::default()
                .title("> Configuration String or Token uid")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        f.render_widget(input_widget, chunks[1]);

        // Status/help
        let mut status_lines = vec![Line::from("")];

        if let Some(err) = error_message {
            status_lines.push(Line::from(vec![Span::styled(
                format!("Error: {}", err),
                Style::default().fg(Color::Red),
            )]));
        } else if lookup_pending {
            status_lines.push(Line::from(vec![Span::styled(
                "Looking up token...",
                Style::default().fg(Color::Yellow),
            )]));
        }

        status_lines.push(Line::from(""));
        status_lines.push(Line::from(vec![Span::styled(
            "[Enter] Submit  [Esc] Back to list",
            Style::default().fg(Color::DarkGray),
        )]));

        let status_widget = Paragraph::new(status_lines)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title("Help")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status_widget, chunks[2]);
    }
}

impl Component for TokensComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        // Clear previous messages on any input
        self.error_message = None;

        match self.mode {
            TokensMode::List => {
                // A pending unregister only survives an immediate second [x]
                let pending = self.pending_unregister.take();
                match key.code {
                    KeyCode::Char('j') | KeyCode::Down => {
                        self.next_token();
                    }
                    KeyCode::Char('k') | KeyCode::Up => {
                        self.prev_token();
                    }
                    KeyCode::Char('a') if key.modifiers.is_empty() => {
                        self.mode = TokensMode::Add;
                        self.clear_add();
                    }
                    KeyCode::Char('x') if key.modifiers.is_empty() => {
                        if let Some(selected) = self.selected_token() {
                            let uid = selected.token.uid.clone();
                            if pending.as_deref() == Some(uid.as_str()) {
                                self.action_tx.send(Action::UnregisterToken(uid))?;
                            } else {
                                self.pending_unregister = Some(uid);
                            }
                        }
                    }
                    _ => {}
                }
            }
            TokensMode::Add => match key.code {
                KeyCode::Esc => {
                    self.mode = TokensMode::List;
                    self.clear_add();
                }
                KeyCode::Enter => {
                    self.submit_add()?;
                }
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => {
                    self.input.push(c);
                }
                _ => {}
            },
        }
        Ok(())
    }
}
