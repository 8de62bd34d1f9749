//! Application state and the main event loop.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

use crate::{
    action::Action,
    cli::Args,
    components::{
        Component, settings::SettingsComponent, token_dialog::TokenDialog,
        tokens::TokensComponent,
    },
    config::Config,
    domain::{
        registration::{TokenRegistry, WalletService},
        token::Token,
    },
    infra::{node::NodeClient, store::Store},
    tui::{Event, Tui},
};

/// How often the node status shown in the status bar is refreshed.
const STATUS_POLL_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Tokens,
    Settings,
}

impl Tab {
    pub fn all() -> Vec<Tab> {
        vec![Tab::Tokens, Tab::Settings]
    }

    pub fn title(&self) -> Line<'static> {
        match self {
            Tab::Tokens => Line::from(vec![
                Span::raw("T"),
                Span::styled(
                    "o",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::raw("kens"),
            ]),
            Tab::Settings => Line::from(vec![
                Span::styled(
                    "S",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::raw("ettings"),
            ]),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Tokens => 0,
            Tab::Settings => 1,
        }
    }

    pub fn from_index(index: usize) -> Tab {
        match index {
            0 => Tab::Tokens,
            1 => Tab::Settings,
            _ => Tab::Tokens,
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub should_suspend: bool,
    pub config: Config,
    pub active_tab: Tab,
    pub action_tx: UnboundedSender<Action>,
    pub action_rx: UnboundedReceiver<Action>,
    pub tui: Tui,
    pub store: Arc<Store>,
    pub node: Arc<NodeClient>,
    pub settings_component: SettingsComponent,
    pub tokens_component: TokensComponent,
    pub token_dialog: Option<TokenDialog>,
    pub dialog_epoch: u64,
    pub status_message: String,
    pub node_status: Option<String>,
    pub last_status_poll: Option<u64>,
}

impl App {
    pub fn new(args: &Args) -> Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let config = Config::new(
            args.network.as_deref().unwrap_or("testnet"),
            args.node_url.as_deref(),
        );
        info!("Using network: {}", config.network.name);

        let store = Arc::new(Store::new(&config.network.name)?);
        let node = Arc::new(NodeClient::new(&config.network.node_url)?);

        let settings_component = SettingsComponent::new(action_tx.clone(), &config.network.name);
        let tokens_component = TokensComponent::new(action_tx.clone());

        let tui = Tui::new()?
            .tick_rate(args.tick_rate)
            .frame_rate(args.frame_rate)
            .paste(true);

        Ok(Self {
            should_quit: false,
            should_suspend: false,
            config,
            active_tab: Tab::Tokens,
            action_tx,
            action_rx,
            tui,
            store,
            node,
            settings_component,
            tokens_component,
            token_dialog: None,
            dialog_epoch: 0,
            status_message: "Ready".to_string(),
            node_status: None,
            last_status_poll: None,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        self.tui.enter()?;

        info!("Node endpoint: {}", self.node.node_url());

        // Load the registered token list for the current network
        self.reload_tokens()?;
        info!(
            "Loaded {} registered tokens",
            self.tokens_component.tokens.len()
        );

        loop {
            // Handle events
            if let Some(event) = self.tui.next().await {
                self.handle_event(event).await?;
            }

            // Handle actions
            while let Ok(action) = self.action_rx.try_recv() {
                self.handle_action(action).await?;
            }

            if self.should_suspend {
                self.tui.suspend()?;
                self.should_suspend = false;
                self.tui.resume()?;
            }

            if self.should_quit {
                break;
            }
        }

        self.tui.exit()?;
        Ok(())
    }

    async fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Tick => {
                self.action_tx.send(Action::Tick)?;
            }
            Event::Render => {
                self.draw_ui()?;
            }
            Event::Key(key_event) => {
                self.handle_key_event(key_event)?;
            }
            Event::Resize(_, _) => {
                self.draw_ui()?;
            }
            Event::Init => {
                info!("Application initialized");
            }
            Event::Error => {
                self.action_tx
                    .send(Action::Error("Terminal event stream error".to_string()))?;
            }
            Event::Paste(text) => {
                self.handle_paste(&text)?;
            }
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.action_tx.send(Action::Quit)?;
            return Ok(());
        }

        if key.code == KeyCode::Char('v') && key.modifiers.contains(KeyModifiers::CONTROL) {
            // Pasted text arrives as a bracketed paste event
            return Ok(());
        }

        // An open dialog captures all input until it closes
        if let Some(ref mut dialog) = self.token_dialog {
            return dialog.handle_key_event(key);
        }

        let is_editing = match self.active_tab {
            Tab::Tokens => self.tokens_component.is_editing(),
            Tab::Settings => false,
        };

        if is_editing {
            self.tokens_component.handle_key_event(key)?;
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => {
                self.action_tx.send(Action::Quit)?;
            }
            KeyCode::Char('z') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.action_tx.send(Action::Suspend)?;
            }
            KeyCode::Char('o') if key.modifiers.is_empty() => {
                self.active_tab = Tab::Tokens;
            }
            KeyCode::Char('s') if key.modifiers.is_empty() => {
                self.active_tab = Tab::Settings;
            }
            KeyCode::Tab => {
                let tabs = Tab::all();
                let next_index = (self.active_tab.index() + 1) % tabs.len();
                self.active_tab = Tab::from_index(next_index);
            }
            KeyCode::BackTab => {
                let tabs = Tab::all();
                let prev_index = if self.active_tab.index() == 0 {
                    tabs.len() - 1
                } else {
                    self.active_tab.index() - 1
                };
                self.active_tab = Tab::from_index(prev_index);
            }
            _ => match self.active_tab {
                Tab::Tokens => {
                    self.tokens_component.handle_key_event(key)?;
                }
                Tab::Settings => {
                    self.settings_component.handle_key_event(key)?;
                }
            },
        }
        Ok(())
    }

    fn handle_paste(&mut self, text: &str) -> Result<()> {
        if self.token_dialog.is_some() {
            // The dialog has no text input
            return Ok(());
        }
        if self.active_tab == Tab::Tokens {
            self.tokens_component.paste(text);
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: Action) -> Result<()> {
        debug!("Handling action: {:?}", action);
        match action {
            Action::Tick => {
                let now = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();

                let should_poll = self
                    .last_status_poll
                    .map(|last| now >= last + STATUS_POLL_INTERVAL_SECS)
                    .unwrap_or(true);

                if should_poll {
                    self.last_status_poll = Some(now);
                    let node = self.node.clone();
                    let network = self.config.network.name.clone();
                    let action_tx = self.action_tx.clone();
                    tokio::spawn(async move {
                        let result = node.status().await.map_err(|e| e.to_string());
                        let _ = action_tx.send(Action::NodeStatus { network, result });
                    });
                }
            }
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Suspend => {
                self.should_suspend = true;
            }
            Action::Error(err) => {
                error!("{}", err);
                self.status_message = err;
            }
            Action::NodeStatus { network, result } => {
                // Results from a previous network are stale
                if network == self.config.network.name {
                    match result {
                        Ok(status) => {
                            self.node_status = Some(status);
                        }
                        Err(err) => {
                            debug!("Node status check failed: {}", err);
                            self.node_status = None;
                        }
                    }
                }
            }
            Action::SwitchNetwork(network) => {
                self.switch_network(&network)?;
            }
            Action::LookupToken(uid) => {
                let node = self.node.clone();
                let action_tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let result = node.get_token(&uid).await.map_err(|e| e.to_string());
                    let _ = action_tx.send(Action::TokenLookupResult { uid, result });
                });
            }
            Action::TokenLookupResult { uid, result } => {
                self.tokens_component.on_lookup_result(&uid, result)?;
            }
            Action::OpenTokenDialog(token) => {
                self.open_token_dialog(token);
            }
            Action::CloseTokenDialog => {
                self.token_dialog = None;
            }
            Action::TokenDetailsFetched { uid, epoch, result } => {
                if let Some(ref mut dialog) = self.token_dialog
                    && dialog.epoch() == epoch
                    && dialog.token.uid == uid
                {
                    dialog.on_details_fetched(result);
                } else {
                    debug!("Discarding stale token details for {}", uid);
                }
            }
            Action::TokenValidated { uid, epoch, result } => {
                if let Some(ref mut dialog) = self.token_dialog
                    && dialog.epoch() == epoch
                    && dialog.token.uid == uid
                {
                    dialog.on_validated(result)?;
                } else {
                    debug!("Discarding stale validation result for {}", uid);
                }
            }
            Action::TokenRegistered(token) => {
                info!("Registered token {}", token.uid);
                self.reload_tokens()?;
                self.tokens_component.finish_add();
                self.status_message = format!("Registered {}", token.display_name());
            }
            Action::UnregisterToken(uid) => {
                let name = self
                    .store
                    .get(&uid)?
                    .map(|entry| entry.token.display_name());
                self.store.remove_token(&uid)?;
                self.reload_tokens()?;
                self.status_message = match name {
                    Some(name) => format!("Unregistered {}", name),
                    None => "Token was not registered".to_string(),
                };
            }
        }
        Ok(())
    }

    fn reload_tokens(&mut self) -> Result<()> {
        self.tokens_component.set_tokens(self.store.all_tokens()?);
        Ok(())
    }

    fn open_token_dialog(&mut self, token: Token) {
        if let Some(ref mut dialog) = self.token_dialog {
            dialog.abort();
        }
        self.dialog_epoch += 1;
        self.token_dialog = Some(TokenDialog::open(
            self.action_tx.clone(),
            self.node.clone(),
            self.store.clone(),
            token,
            self.dialog_epoch,
        ));
    }

    fn switch_network(&mut self, network: &str) -> Result<()> {
        let config = Config::from_network(network);
        let store = Arc::new(Store::new(&config.network.name)?);
        let node = Arc::new(NodeClient::new(&config.network.node_url)?);

        // Anything in flight against the old network is stale now
        if let Some(mut dialog) = self.token_dialog.take() {
            dialog.abort();
        }

        self.config = config;
        self.store = store;
        self.node = node;
        self.node_status = None;
        self.last_status_poll = None;

        self.settings_component.set_network(&self.config.network.name);
        self.tokens_component.reset();
        self.reload_tokens()?;

        self.status_message = format!("Switched to {}", self.config.network.name);
        info!("Switched to network {}", self.config.network.name);
        Ok(())
    }

    fn draw_ui(&mut self) -> Result<()> {
        // Collect all data needed for drawing before borrowing terminal
        let config_network_name = self.config.network.name.clone();
        let active_tab = self.active_tab;
        let status_message = self.status_message.clone();
        let node_status = self.node_status.clone();
        // Settings component data
        let settings_current_network = self.settings_component.current_network.clone();
        let settings_selected_index = self.settings_component.selected_index;
        // Tokens component data
        let tokens = self.tokens_component.tokens.clone();
        let tokens_selected_index = self.tokens_component.selected_index;
        let tokens_mode = self.tokens_component.mode;
        let tokens_input = self.tokens_component.input.clone();
        let tokens_lookup_pending = self.tokens_component.lookup_pending;
        let tokens_pending_unregister = self.tokens_component.pending_unregister.clone();
        let tokens_error_message = self.tokens_component.error_message.clone();
        // Dialog data
        let dialog = self.token_dialog.as_ref().map(|d| {
            (
                d.token.clone(),
                d.details.clone(),
                d.details_loaded,
                d.fetch_error.clone(),
                d.confirm_checked,
                d.form_validated,
                d.registering,
                d.error_message.clone(),
                d.focus,
            )
        });

        self.tui.draw(|f| {
            let area = f.area();
            let chunks = Layout::vertical([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Tabs
                Constraint::Min(0),    // Content
                Constraint::Length(3), // Status
            ])
            .split(area);

            // Draw header
            let title = Paragraph::new(vec![Line::from(vec![
                Span::styled(
                    "Tokari Wallet",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("[{}]", config_network_name),
                    Style::default().fg(Color::Yellow),
                ),
            ])])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
            f.render_widget(title, chunks[0]);

            // Draw tabs
            let titles: Vec<Line> = Tab::all().iter().map(|t| t.title()).collect();

            let tabs = Tabs::new(titles)
                .block(Block::default().borders(Borders::ALL))
                .select(active_tab.index())
                .style(Style::default().fg(Color::White))
                .highlight_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                );
            f.render_widget(tabs, chunks[1]);

            // Draw content
            match active_tab {
                Tab::Tokens => {
                    TokensComponent::draw_static(
                        f,
                        chunks[2],
                        &tokens,
                        tokens_selected_index,
                        tokens_mode,
                        &tokens_input,
                        tokens_lookup_pending,
                        tokens_pending_unregister.as_deref(),
                        tokens_error_message.as_deref(),
                    );
                }
                Tab::Settings => {
                    SettingsComponent::draw_static(
                        f,
                        chunks[2],
                        &settings_current_network,
                        settings_selected_index,
                    );
                }
            }

            // Draw status
            let node_str = node_status
                .map(|s| format!("Node: {}", s))
                .unwrap_or_else(|| "Node: -".to_string());
            let status = Paragraph::new(vec![Line::from(vec![
                Span::styled("Status: ", Style::default().fg(Color::DarkGray)),
                Span::styled(&status_message, Style::default().fg(Color::Green)),
                Span::raw("  |  "),
                Span::styled(&node_str, Style::default().fg(Color::Yellow)),
                Span::raw("  |  "),
                Span::styled("[a]Add token [q]Quit", Style::default().fg(Color::DarkGray)),
            ])])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
            f.render_widget(status, chunks[3]);

            // The dialog is drawn last so it overlays the active tab
            if let Some((
                token,
                details,
                details_loaded,
                fetch_error,
                confirm_checked,
                form_validated,
                registering,
                error_message,
                focus,
            )) = &dialog
            {
                TokenDialog::draw_static(
                    f,
                    area,
                    token,
                    details,
                    *details_loaded,
                    fetch_error.as_deref(),
                    *confirm_checked,
                    *form_validated,
                    *registering,
                    error_message.as_deref(),
                    *focus,
                );
            }
        })?;
        Ok(())
    }
}
