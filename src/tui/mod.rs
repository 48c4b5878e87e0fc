pub mod app;
pub mod ui;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::auth::{GoTrueClient, IdentityProvider, SessionClient};
use crate::board::{Board, Dialog};
use crate::config::{AppConfig, ProviderConfig};
use crate::models::ViewType;
use crate::server::CallbackServer;
use crate::storage::FileCookieJar;
use app::App;
use ui::ui;

/// Everything the board needs to talk to the identity provider.
struct SessionBridge<'a> {
    rt: &'a Runtime,
    config: &'a AppConfig,
    provider_config: Option<ProviderConfig>,
    provider: Arc<dyn IdentityProvider>,
    jar: FileCookieJar,
    server: CallbackServer,
    port: u16,
}

impl SessionBridge<'_> {
    /// User of a still-valid stored session, refreshing it if needed.
    fn restore_user(&mut self, app: &mut App) {
        let Some(provider_config) = &self.provider_config else {
            app.status = Some("Sign-in is not configured (SUPABASE_URL, SUPABASE_ANON_KEY).".to_string());
            return;
        };
        let mut client = SessionClient::new(provider_config, self.provider.as_ref(), &mut self.jar);
        match self.rt.block_on(client.get_user()) {
            Ok(user) => app.board.set_user(user),
            Err(e) => {
                warn!("Could not restore session: {}", e);
                app.status = Some("Your session could not be restored. Please sign in.".to_string());
            }
        }
    }

    /// Starts the local redirect endpoint and sends the browser to it.
    fn begin_sign_in(&mut self, app: &mut App) {
        if self.provider_config.is_none() {
            app.status = Some("Sign-in is not configured (SUPABASE_URL, SUPABASE_ANON_KEY).".to_string());
            return;
        }
        if !self.server.is_running() {
            let bind = SocketAddr::from(([127, 0, 0, 1], self.port));
            if let Err(e) = self.rt.block_on(self.server.start(self.config, self.provider.clone(), bind)) {
                warn!("{:#}", e);
                app.status = Some(format!("Could not start sign-in: {}", e));
                return;
            }
        }
        let Some(base) = self.server.base_url() else {
            return;
        };
        let login_url = format!("{}/login", base);
        if let Err(e) = open::that(&login_url) {
            warn!("Could not open browser: {}", e);
        }
        app.status = Some(format!("Waiting for sign-in at {}", login_url));
    }

    /// Picks up a session completed in the browser.
    fn poll_sign_in(&mut self, app: &mut App) {
        // The server stays up so the browser can still load the landing page.
        let Some(session) = self.server.try_recv_session() else {
            return;
        };
        if let Some(provider_config) = &self.provider_config {
            SessionClient::new(provider_config, self.provider.as_ref(), &mut self.jar).set_session(&session);
        }
        info!(user = %session.user.id, "signed in");
        app.board.set_user(Some(session.user));
        app.status = None;
    }

    fn sign_out(&mut self, app: &mut App) {
        if let Some(provider_config) = &self.provider_config {
            let mut client = SessionClient::new(provider_config, self.provider.as_ref(), &mut self.jar);
            if let Err(e) = self.rt.block_on(client.sign_out()) {
                warn!("Provider sign-out failed: {}", e);
            }
        }
        app.signed_out();
        app.status = Some("Signed out.".to_string());
    }
}

pub fn run_tui(config: &AppConfig, port: u16) -> Result<()> {
    let rt = Runtime::new().context("Failed to start async runtime")?;
    let mut bridge = SessionBridge {
        rt: &rt,
        config,
        provider_config: config.provider().ok(),
        provider: Arc::new(GoTrueClient::new()),
        jar: FileCookieJar::open_default(),
        server: CallbackServer::new(),
        port,
    };

    let mut app = App::new(Board::new());
    bridge.restore_user(&mut app);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run loop
    let res = run_app(&mut terminal, &mut app, &mut bridge);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    bridge.server.stop();
    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, bridge: &mut SessionBridge) -> io::Result<()> {
    loop {
        bridge.poll_sign_in(app);
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.board.user().is_none() {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Enter => bridge.begin_sign_in(app),
                    _ => {}
                }
                continue;
            }
            if *app.board.dialog() == Dialog::None {
                if handle_board_key(app, bridge, key) {
                    return Ok(());
                }
            } else {
                handle_dialog_key(app, key);
            }
        }
    }
}

/// Returns true when the user asked to quit.
fn handle_board_key(app: &mut App, bridge: &mut SessionBridge, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => app.next_view(),
        KeyCode::BackTab => app.previous_view(),
        KeyCode::Char(c @ '1'..='4') => {
            let i = c as usize - '1' as usize;
            app.select_view(ViewType::ALL[i]);
        }
        KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') => app.next(),
        KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => app.previous(),
        KeyCode::Enter | KeyCode::Char(' ') => app.activate(),
        KeyCode::Char('a') => app.start_add_task(),
        KeyCode::Char('c') => app.start_create_category(),
        KeyCode::Char('o') => bridge.sign_out(app),
        _ => {}
    }
    false
}

fn handle_dialog_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.handle_input(),
        KeyCode::Esc => app.cancel(),
        KeyCode::Left => app.cycle_choice(false),
        KeyCode::Right => app.cycle_choice(true),
        KeyCode::Char(c) if app.is_text_step() => app.input_buffer.push(c),
        KeyCode::Backspace if app.is_text_step() => {
            app.input_buffer.pop();
        }
        _ => {}
    }
}
