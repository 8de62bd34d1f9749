//! Modal dialog for confirming registration of an unregistered token.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::{
    action::Action,
    domain::{
        config_string::configuration_string,
        registration::{RegisterError, TokenRegistry, WalletService, validate_token_to_add},
        token::{Token, TokenDetails, format_amount},
    },
    tui::Frame,
};

use super::{Component, centered_rect};

/// Focus state for the dialog controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogFocus {
    Confirm,
    Register,
    Cancel,
}

/// Modal dialog showing details of an unregistered token and asking the user
/// to confirm before it is written to the registry.
///
/// A fresh instance is created each time the dialog opens, tagged with an
/// epoch from the app. Background work (the details fetch and the
/// registration validation) reports back through actions carrying that epoch,
/// so results belonging to a dialog that has since closed are dropped instead
/// of applied.
pub struct TokenDialog {
    action_tx: UnboundedSender<Action>,
    wallet: Arc<dyn WalletService>,
    registry: Arc<dyn TokenRegistry>,
    pub token: Token,
    epoch: u64,
    pub details: TokenDetails,
    pub details_loaded: bool,
    pub fetch_error: Option<String>,
    pub confirm_checked: bool,
    pub form_validated: bool,
    pub registering: bool,
    pub error_message: Option<String>,
    pub focus: DialogFocus,
    closed: bool,
    tasks: Vec<JoinHandle<()>>,
}

impl TokenDialog {
    /// Open the dialog for `token` and start fetching its network details.
    pub fn open(
        action_tx: UnboundedSender<Action>,
        wallet: Arc<dyn WalletService>,
        registry: Arc<dyn TokenRegistry>,
        token: Token,
        epoch: u64,
    ) -> Self {
        let mut dialog = Self {
            action_tx,
            wallet,
            registry,
            token,
            epoch,
            details: TokenDetails::default(),
            details_loaded: false,
            fetch_error: None,
            confirm_checked: false,
            form_validated: false,
            registering: false,
            error_message: None,
            focus: DialogFocus::Confirm,
            closed: false,
            tasks: Vec::new(),
        };
        dialog.spawn_details_fetch();
        dialog
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn spawn_details_fetch(&mut self) {
        self.fetch_error = None;
        self.details_loaded = false;
        let wallet = self.wallet.clone();
        let uid = self.token.uid.clone();
        let epoch = self.epoch;
        let action_tx = self.action_tx.clone();
        self.tasks.push(tokio::spawn(async move {
            let result = wallet
                .get_token_details(&uid)
                .await
                .map_err(|e| e.to_string());
            let _ = action_tx.send(Action::TokenDetailsFetched { uid, epoch, result });
        }));
    }

    /// Apply the result of the details fetch spawned on open or retry.
    ///
    /// A fetch failure is shown inline and does not block registration, since
    /// the supply and authority numbers are informational only.
    pub fn on_details_fetched(&mut self, result: Result<TokenDetails, String>) {
        if self.closed {
            return;
        }
        match result {
            Ok(details) => {
                self.details = details;
                self.details_loaded = true;
                self.fetch_error = None;
            }
            Err(err) => {
                debug!("Token details fetch failed: {}", err);
                self.fetch_error = Some(err);
            }
        }
    }

    /// Start registration. The confirmation checkbox gates the whole flow:
    /// without it only the validation hint is shown.
    fn submit(&mut self) {
        self.form_validated = true;
        if !self.confirm_checked || self.registering {
            return;
        }
        self.registering = true;
        let wallet = self.wallet.clone();
        let registry = self.registry.clone();
        let config = configuration_string(&self.token);
        let uid = self.token.uid.clone();
        let epoch = self.epoch;
        let action_tx = self.action_tx.clone();
        self.tasks.push(tokio::spawn(async move {
            let result = validate_token_to_add(&config, registry.as_ref(), wallet.as_ref()).await;
            let _ = action_tx.send(Action::TokenValidated { uid, epoch, result });
        }));
    }

    /// Apply the result of the validation task. On success the token is
    /// written to the registry and the dialog closes; on failure the dialog
    /// stays open showing the error.
    pub fn on_validated(&mut self, result: Result<Token, RegisterError>) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.registering = false;
        match result {
            Ok(token) => {
                if let Err(e) = self.registry.add_token(&token) {
                    self.error_message = Some(RegisterError::Storage(e.to_string()).to_string());
                    return Ok(());
                }
                self.action_tx.send(Action::TokenRegistered(token))?;
                self.close()?;
            }
            Err(err) => {
                self.error_message = Some(err.to_string());
            }
        }
        Ok(())
    }

    /// Close the dialog. In-flight tasks are aborted and any result that
    /// already raced into the action queue is ignored. The close notification
    /// is sent exactly once no matter how often this is called.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.error_message = None;
        self.form_validated = false;
        self.registering = false;
        self.action_tx.send(Action::CloseTokenDialog)?;
        Ok(())
    }

    /// Abort in-flight work without sending the close notification. Used when
    /// the app discards the dialog itself, e.g. on a network switch.
    pub fn abort(&mut self) {
        self.closed = true;
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    fn next_focus(&mut self) {
        self.focus = match self.focus {
            DialogFocus::Confirm => DialogFocus::Register,
            DialogFocus::Register => DialogFocus::Cancel,
            DialogFocus::Cancel => DialogFocus::Confirm,
        };
    }

    fn prev_focus(&mut self) {
        self.focus = match self.focus {
            DialogFocus::Confirm => DialogFocus::Cancel,
            DialogFocus::Register => DialogFocus::Confirm,
            DialogFocus::Cancel => DialogFocus::Register,
        };
    }

    /// Static draw method for use in the main app draw loop. Drawn last so
    /// the dialog overlays the active tab.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_static(
        f: &mut Frame,
        area: Rect,
        token: &Token,
        details: &TokenDetails,
        details_loaded: bool,
        fetch_error: Option<&str>,
        confirm_checked: bool,
        form_validated: bool,
        registering: bool,
        error_message: Option<&str>,
        focus: DialogFocus,
    ) {
        let area = centered_rect(70, 90, area);
        f.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(" {} ", token.display_name()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::vertical([
            Constraint::Length(1), // Badge
            Constraint::Length(8), // Token info
            Constraint::Length(4), // Warning
            Constraint::Length(2), // Checkbox
            Constraint::Length(1), // Error
            Constraint::Length(3), // Buttons
            Constraint::Min(1),    // Help
        ])
        .split(inner);

        let badge = Paragraph::new(vec![Line::from(vec![Span::styled(
            "Unregistered token",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )])]);
        f.render_widget(badge, chunks[0]);

        // Token info
        let mut info_lines = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Token uid:",
                Style::default().fg(Color::DarkGray),
            )]),
            Line::from(vec![Span::styled(
                token.uid.as_str(),
                Style::default().fg(Color::Yellow),
            )]),
            Line::from(""),
        ];
        if let Some(err) = fetch_error {
            info_lines.push(Line::from(vec![Span::styled(
                format!("Error fetching token details: {}", err),
                Style::default().fg(Color::Red),
            )]));
            info_lines.push(Line::from(vec![Span::styled(
                "Press [u] to retry",
                Style::default().fg(Color::DarkGray),
            )]));
        } else if !details_loaded {
            info_lines.push(Line::from(vec![Span::styled(
                "Fetching token details...",
                Style::default().fg(Color::DarkGray),
            )]));
        } else {
            info_lines.push(Line::from(vec![
                Span::styled("Total supply: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{} {}", format_amount(details.total_supply), token.symbol),
                    Style::default().fg(Color::Green),
                ),
            ]));
            info_lines.push(Line::from(vec![
                Span::styled(
                    "Total transactions: ",
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    details.total_transactions.to_string(),
                    Style::default().fg(Color::White),
                ),
            ]));
            info_lines.push(Line::from(vec![
                Span::styled(
                    "Can mint new tokens: ",
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    if details.authorities.mint { "Yes" } else { "No" },
                    Style::default().fg(Color::White),
                ),
            ]));
            info_lines.push(Line::from(vec![
                Span::styled("Can melt tokens: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    if details.authorities.melt { "Yes" } else { "No" },
                    Style::default().fg(Color::White),
                ),
            ]));
        }
        f.render_widget(Paragraph::new(info_lines).wrap(Wrap { trim: true }), chunks[1]);

        // Warning
        let warning = Paragraph::new(vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "This token is not registered in your wallet.",
                Style::default().fg(Color::White),
            )]),
            Line::from(vec![Span::styled(
                "Always validate the token uid, to ensure you are not being scammed.",
                Style::default().fg(Color::Gray),
            )]),
            Line::from(vec![Span::styled(
                "The token uid is always unique, and your only trust point.",
                Style::default().fg(Color::Gray),
            )]),
        ])
        .wrap(Wrap { trim: true });
        f.render_widget(warning, chunks[2]);

        // Checkbox with validation hint
        let checkbox_invalid = form_validated && !confirm_checked;
        let checkbox_style = if checkbox_invalid {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else if focus == DialogFocus::Confirm {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let marker = if focus == DialogFocus::Confirm {
            "> "
        } else {
            "  "
        };
        let box_mark = if confirm_checked { "[x]" } else { "[ ]" };
        let mut checkbox_lines = vec![Line::from(vec![Span::styled(
            format!("{}{} I want to register this token", marker, box_mark),
            checkbox_style,
        )])];
        if checkbox_invalid {
            checkbox_lines.push(Line::from(vec![Span::styled(
                "   You must confirm before registering",
                Style::default().fg(Color::Red),
            )]));
        }
        f.render_widget(Paragraph::new(checkbox_lines), chunks[3]);

        if let Some(err) = error_message {
            let error_widget = Paragraph::new(vec![Line::from(vec![Span::styled(
                format!("Error: {}", err),
                Style::default().fg(Color::Red),
            )])])
            .wrap(Wrap { trim: true });
            f.render_widget(error_widget, chunks[4]);
        }

        // Buttons
        let button_chunks =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[5]);

        let register_label = if registering {
            "  [ Validating... ]  "
        } else {
            "  [ Register token ]  "
        };
        let register_style = if focus == DialogFocus::Register {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green)
        };
        let register_widget =
            Paragraph::new(vec![Line::from(vec![Span::styled(
                register_label,
                register_style,
            )])])
            .block(Block::default().borders(Borders::ALL).border_style(
                if focus == DialogFocus::Register {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default().fg(Color::DarkGray)
                },
            ));
        f.render_widget(register_widget, button_chunks[0]);

        let cancel_style = if focus == DialogFocus::Cancel {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Gray)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let cancel_widget = Paragraph::new(vec![Line::from(vec![Span::styled(
            "  [ Cancel ]  ",
            cancel_style,
        )])])
        .block(Block::default().borders(Borders::ALL).border_style(
            if focus == DialogFocus::Cancel {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            },
        ));
        f.render_widget(cancel_widget, button_chunks[1]);

        // Help
        let mut help = String::from("[Space] Toggle confirm  [Tab] Next  [Enter] Select  [Esc] Cancel");
        if fetch_error.is_some() {
            help.push_str("  [u] Retry");
        }
        let help_widget = Paragraph::new(vec![Line::from(vec![Span::styled(
            help,
            Style::default().fg(Color::DarkGray),
        )])]);
        f.render_widget(help_widget, chunks[6]);
    }
}

impl Component for TokenDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        // Clear previous messages on any input
        self.error_message = None;

        match key.code {
            KeyCode::Esc => {
                self.close()?;
            }
            KeyCode::Char(' ') => {
                self.confirm_checked = !self.confirm_checked;
            }
            KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => {
                self.next_focus();
            }
            KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => {
                self.prev_focus();
            }
            KeyCode::Char('u') => {
                if self.fetch_error.is_some() {
                    self.spawn_details_fetch();
                }
            }
            KeyCode::Enter => match self.focus {
                DialogFocus::Confirm => {
                    self.confirm_checked = !self.confirm_checked;
                }
                DialogFocus::Register => {
                    self.submit();
                }
                DialogFocus::Cancel => {
                    self.close()?;
                }
            },
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use color_eyre::eyre::eyre;
    use crossterm::event::KeyModifiers;
    use tokio::sync::mpsc;
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::domain::token::{RegisteredToken, TokenAuthorities};

    struct StubWallet {
        tokens: HashMap<String, Token>,
        details: HashMap<String, TokenDetails>,
        details_fail: bool,
        detail_calls: AtomicUsize,
    }

    impl StubWallet {
        fn new() -> Self {
            Self {
                tokens: HashMap::new(),
                details: HashMap::new(),
                details_fail: false,
                detail_calls: AtomicUsize::new(0),
            }
        }

        fn with_token(mut self, token: &Token) -> Self {
            self.tokens.insert(token.uid.clone(), token.clone());
            self
        }

        fn with_details(mut self, uid: &str, details: TokenDetails) -> Self {
            self.details.insert(uid.to_string(), details);
            self
        }

        fn fail_details(mut self) -> Self {
            self.details_fail = true;
            self
        }
    }

    #[async_trait]
    impl WalletService for StubWallet {
        async fn get_token(&self, uid: &str) -> Result<Token> {
            self.tokens
                .get(uid)
                .cloned()
                .ok_or_else(|| eyre!("Unknown token"))
        }

        async fn get_token_details(&self, uid: &str) -> Result<TokenDetails> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            if self.details_fail {
                return Err(eyre!("request timed out"));
            }
            Ok(self.details.get(uid).cloned().unwrap_or_default())
        }

        async fn status(&self) -> Result<String> {
            Ok("testnet v0.1.0".to_string())
        }
    }

    #[derive(Default)]
    struct MemoryRegistry {
        tokens: Mutex<HashMap<String, RegisteredToken>>,
    }

    impl TokenRegistry for MemoryRegistry {
        fn add_token(&self, token: &Token) -> Result<()> {
            self.tokens.lock().unwrap().insert(
                token.uid.clone(),
                RegisteredToken {
                    token: token.clone(),
                    registered_at: 0,
                },
            );
            Ok(())
        }

        fn remove_token(&self, uid: &str) -> Result<()> {
            self.tokens.lock().unwrap().remove(uid);
            Ok(())
        }

        fn get(&self, uid: &str) -> Result<Option<RegisteredToken>> {
            Ok(self.tokens.lock().unwrap().get(uid).cloned())
        }

        fn contains(&self, uid: &str) -> Result<bool> {
            Ok(self.tokens.lock().unwrap().contains_key(uid))
        }

        fn all_tokens(&self) -> Result<Vec<RegisteredToken>> {
            let mut all: Vec<RegisteredToken> =
                self.tokens.lock().unwrap().values().cloned().collect();
            all.sort_by_key(|t| t.token.name.to_lowercase());
            Ok(all)
        }

        fn find_by_name(&self, name: &str) -> Result<Option<RegisteredToken>> {
            Ok(self
                .tokens
                .lock()
                .unwrap()
                .values()
                .find(|t| t.token.name.eq_ignore_ascii_case(name))
                .cloned())
        }

        fn find_by_symbol(&self, symbol: &str) -> Result<Option<RegisteredToken>> {
            Ok(self
                .tokens
                .lock()
                .unwrap()
                .values()
                .find(|t| t.token.symbol.eq_ignore_ascii_case(symbol))
                .cloned())
        }
    }

    fn sample_token() -> Token {
        let uid = format!("00abc{}", "0".repeat(59));
        Token::new(uid, "Test Coin", "TST")
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// Receive actions until the validation result arrives.
    async fn recv_validated(rx: &mut UnboundedReceiver<Action>) -> Result<Token, RegisterError> {
        loop {
            match rx.recv().await {
                Some(Action::TokenValidated { result, .. }) => return result,
                Some(_) => continue,
                None => panic!("action channel closed"),
            }
        }
    }

    fn drain(rx: &mut UnboundedReceiver<Action>) -> Vec<Action> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[tokio::test]
    async fn open_fetches_details_once() {
        let token = sample_token();
        let details = TokenDetails {
            total_supply: 500_000,
            total_transactions: 42,
            authorities: TokenAuthorities {
                mint: true,
                melt: false,
            },
        };
        let wallet = Arc::new(StubWallet::new().with_details(&token.uid, details.clone()));
        let registry = Arc::new(MemoryRegistry::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut dialog = TokenDialog::open(tx, wallet.clone(), registry, token.clone(), 1);
        assert!(!dialog.details_loaded);

        match rx.recv().await {
            Some(Action::TokenDetailsFetched { uid, epoch, result }) => {
                assert_eq!(uid, token.uid);
                assert_eq!(epoch, 1);
                dialog.on_details_fetched(result);
            }
            other => panic!("unexpected action: {:?}", other),
        }

        assert!(dialog.details_loaded);
        assert_eq!(dialog.details, details);
        assert_eq!(wallet.detail_calls.load(Ordering::SeqCst), 1);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn register_requires_confirmation() {
        let token = sample_token();
        let wallet = Arc::new(StubWallet::new().with_token(&token));
        let registry = Arc::new(MemoryRegistry::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut dialog =
            TokenDialog::open(tx, wallet, registry.clone(), token.clone(), 1);
        rx.recv().await; // details fetch

        // Enter on Register without ticking the checkbox
        dialog.handle_key_event(key(KeyCode::Tab)).unwrap();
        assert_eq!(dialog.focus, DialogFocus::Register);
        dialog.handle_key_event(key(KeyCode::Enter)).unwrap();

        assert!(dialog.form_validated);
        assert!(!dialog.registering);
        assert!(!registry.contains(&token.uid).unwrap());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn register_validates_then_writes_and_closes() {
        let token = sample_token();
        let wallet = Arc::new(StubWallet::new().with_token(&token));
        let registry = Arc::new(MemoryRegistry::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut dialog =
            TokenDialog::open(tx, wallet, registry.clone(), token.clone(), 1);

        dialog.handle_key_event(key(KeyCode::Char(' '))).unwrap();
        assert!(dialog.confirm_checked);
        dialog.handle_key_event(key(KeyCode::Tab)).unwrap();
        dialog.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(dialog.registering);

        let result = recv_validated(&mut rx).await;
        dialog.on_validated(result).unwrap();

        assert!(registry.contains(&token.uid).unwrap());
        assert!(dialog.error_message.is_none());

        let names: Vec<String> = drain(&mut rx).iter().map(|a| a.to_string()).collect();
        assert_eq!(
            names
                .iter()
                .filter(|n| n.as_str() == "token_registered")
                .count(),
            1
        );
        assert_eq!(
            names
                .iter()
                .filter(|n| n.as_str() == "close_token_dialog")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn validation_failure_keeps_dialog_open() {
        let token = sample_token();
        let other_uid = format!("00def{}", "0".repeat(59));
        let existing = Token::new(other_uid, "Test Coin", "OTH");

        let wallet = Arc::new(StubWallet::new().with_token(&token));
        let registry = Arc::new(MemoryRegistry::default());
        registry.add_token(&existing).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut dialog =
            TokenDialog::open(tx, wallet, registry.clone(), token.clone(), 1);

        dialog.handle_key_event(key(KeyCode::Char(' '))).unwrap();
        dialog.handle_key_event(key(KeyCode::Tab)).unwrap();
        dialog.handle_key_event(key(KeyCode::Enter)).unwrap();

        let result = recv_validated(&mut rx).await;
        dialog.on_validated(result).unwrap();

        assert_eq!(
            dialog.error_message.as_deref(),
            Some("You already have a token with this name: Test Coin")
        );
        assert!(!dialog.registering);
        assert!(!registry.contains(&token.uid).unwrap());
        // No close was sent, the dialog stays up
        assert!(
            drain(&mut rx)
                .iter()
                .all(|a| !matches!(a, Action::CloseTokenDialog))
        );

        // The error clears on the next key press
        dialog.handle_key_event(key(KeyCode::Char(' '))).unwrap();
        assert!(dialog.error_message.is_none());
    }

    #[tokio::test]
    async fn closing_during_validation_discards_result() {
        let token = sample_token();
        let wallet = Arc::new(StubWallet::new().with_token(&token));
        let registry = Arc::new(MemoryRegistry::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut dialog =
            TokenDialog::open(tx, wallet, registry.clone(), token.clone(), 1);

        dialog.handle_key_event(key(KeyCode::Char(' '))).unwrap();
        dialog.handle_key_event(key(KeyCode::Tab)).unwrap();
        dialog.handle_key_event(key(KeyCode::Enter)).unwrap();
        dialog.handle_key_event(key(KeyCode::Esc)).unwrap();

        // A validation result that raced with the close must not be applied
        dialog.on_validated(Ok(token.clone())).unwrap();
        assert!(!registry.contains(&token.uid).unwrap());

        // Esc again must not send a second close
        dialog.handle_key_event(key(KeyCode::Esc)).unwrap();
        let names: Vec<String> = drain(&mut rx).iter().map(|a| a.to_string()).collect();
        assert_eq!(
            names
                .iter()
                .filter(|n| n.as_str() == "close_token_dialog")
                .count(),
            1
        );
        assert!(!names.iter().any(|n| n.as_str() == "token_registered"));
    }

    #[tokio::test]
    async fn stale_details_after_close_are_ignored() {
        let token = sample_token();
        let wallet = Arc::new(StubWallet::new());
        let registry = Arc::new(MemoryRegistry::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut dialog = TokenDialog::open(tx, wallet, registry, token, 1);
        dialog.handle_key_event(key(KeyCode::Esc)).unwrap();

        dialog.on_details_fetched(Ok(TokenDetails {
            total_supply: 1,
            total_transactions: 1,
            authorities: TokenAuthorities::default(),
        }));
        assert!(!dialog.details_loaded);
        drain(&mut rx);
    }

    #[tokio::test]
    async fn fetch_failure_does_not_block_registration() {
        let token = sample_token();
        let wallet = Arc::new(StubWallet::new().with_token(&token).fail_details());
        let registry = Arc::new(MemoryRegistry::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut dialog =
            TokenDialog::open(tx, wallet, registry.clone(), token.clone(), 1);

        match rx.recv().await {
            Some(Action::TokenDetailsFetched { result, .. }) => {
                dialog.on_details_fetched(result);
            }
            other => panic!("unexpected action: {:?}", other),
        }
        assert_eq!(dialog.fetch_error.as_deref(), Some("request timed out"));

        dialog.handle_key_event(key(KeyCode::Char(' '))).unwrap();
        dialog.handle_key_event(key(KeyCode::Tab)).unwrap();
        dialog.handle_key_event(key(KeyCode::Enter)).unwrap();

        let result = recv_validated(&mut rx).await;
        dialog.on_validated(result).unwrap();
        assert!(registry.contains(&token.uid).unwrap());
    }

    #[tokio::test]
    async fn retry_refetches_details() {
        let token = sample_token();
        let wallet = Arc::new(StubWallet::new().fail_details());
        let registry = Arc::new(MemoryRegistry::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut dialog = TokenDialog::open(tx, wallet.clone(), registry, token, 1);
        match rx.recv().await {
            Some(Action::TokenDetailsFetched { result, .. }) => {
                dialog.on_details_fetched(result);
            }
            other => panic!("unexpected action: {:?}", other),
        }
        assert!(dialog.fetch_error.is_some());

        dialog.handle_key_event(key(KeyCode::Char('u'))).unwrap();
        assert!(dialog.fetch_error.is_none());

        match rx.recv().await {
            Some(Action::TokenDetailsFetched { result, .. }) => {
                dialog.on_details_fetched(result);
            }
            other => panic!("unexpected action: {:?}", other),
        }
        assert_eq!(wallet.detail_calls.load(Ordering::SeqCst), 2);
    }
}
