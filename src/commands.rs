use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use tokio::runtime::Runtime;
use tracing::warn;

use crate::auth::{GoTrueClient, IdentityProvider, SessionClient};
use crate::board::Board;
use crate::config::AppConfig;
use crate::models::{Priority, User, ViewType};
use crate::server::{self, CallbackServer};
use crate::storage::{delete_jar, FileCookieJar};

fn runtime() -> Result<Runtime> {
    Runtime::new().context("Failed to start async runtime")
}

/// Looks up the signed-in user through the local cookie jar.
pub fn current_user(config: &AppConfig, rt: &Runtime) -> Result<Option<User>> {
    let provider_config = config.provider()?;
    let provider = GoTrueClient::new();
    let mut jar = FileCookieJar::open_default();
    let user = rt.block_on(SessionClient::new(&provider_config, &provider, &mut jar).get_user())?;
    Ok(user)
}

/// Prints the sample board for one grouping as a table.
///
/// Like the interactive board, nothing is shown unless someone is signed in.
pub fn cmd_board(config: &AppConfig, view: ViewType) -> Result<()> {
    let rt = runtime()?;
    let Some(user) = current_user(config, &rt)? else {
        println!("Not signed in. Run `tasktiles login` first.");
        return Ok(());
    };

    let mut board = Board::new();
    board.set_user(Some(user));
    board.switch_grouping(view);

    if board.categories().is_empty() {
        println!("No categories under {}.", view.label());
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Tags").add_attribute(Attribute::Bold),
        ]);

    for category in board.categories() {
        let heading = format!("{} ({})", category.title, category.count());
        if category.tasks.is_empty() {
            table.add_row(vec![Cell::new(heading), Cell::new("-"), Cell::new(""), Cell::new(""), Cell::new("")]);
            continue;
        }
        for (i, task) in category.tasks.iter().enumerate() {
            let priority_color = match task.priority {
                Priority::High => Color::Red,
                Priority::Medium => Color::Yellow,
                Priority::Low => Color::Green,
            };
            table.add_row(vec![
                Cell::new(if i == 0 { heading.as_str() } else { "" }),
                Cell::new(&task.title),
                Cell::new(task.priority).fg(priority_color),
                Cell::new(task.due_date.map(|d| d.to_string()).unwrap_or_default()),
                Cell::new(task.tags.join(", ")),
            ]);
        }
    }

    println!("{} | signed in as {}", view.label(), board.user().map(User::display_name).unwrap_or_default());
    println!("{table}");
    Ok(())
}

/// Prints who the cookie jar says is signed in.
pub fn cmd_whoami(config: &AppConfig) -> Result<()> {
    let rt = runtime()?;
    match current_user(config, &rt)? {
        Some(user) => println!("{} ({})", user.display_name(), user.id),
        None => println!("Not signed in."),
    }
    Ok(())
}

/// Signs in through the browser and stores the session in the cookie jar.
pub fn cmd_login(config: &AppConfig, port: u16) -> Result<()> {
    let rt = runtime()?;
    let provider_config = config.provider()?;
    let provider: Arc<dyn IdentityProvider> = Arc::new(GoTrueClient::new());

    let mut server = CallbackServer::new();
    let bind = SocketAddr::from(([127, 0, 0, 1], port));
    let base_url = rt.block_on(server.start(config, provider.clone(), bind))?;
    let login_url = format!("{}/login", base_url);

    println!("Opening {} in your browser...", login_url);
    if let Err(e) = open::that(&login_url) {
        warn!("Could not open browser: {}", e);
        println!("Open this URL to sign in: {}", login_url);
    }

    let session = rt.block_on(async {
        loop {
            if let Some(session) = server.try_recv_session() {
                return session;
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    });
    server.stop();

    let mut jar = FileCookieJar::open_default();
    SessionClient::new(&provider_config, provider.as_ref(), &mut jar).set_session(&session);
    println!("Signed in as {}.", session.user.display_name());
    Ok(())
}

/// Revokes the stored session and clears the cookie jar entries. An empty
/// jar file is removed.
pub fn cmd_logout(config: &AppConfig) -> Result<()> {
    let rt = runtime()?;
    let provider_config = config.provider()?;
    let provider = GoTrueClient::new();
    let mut jar = FileCookieJar::open_default();
    let result = rt.block_on(SessionClient::new(&provider_config, &provider, &mut jar).sign_out());
    if let Err(e) = result {
        warn!("Provider sign-out failed: {}", e);
    }
    if jar.names().is_empty() {
        delete_jar(jar.path()).with_context(|| format!("Failed to remove {}", jar.path().display()))?;
    }
    println!("Signed out.");
    Ok(())
}

/// Runs the HTTP redirect endpoint and sign-in surface.
pub fn cmd_serve(config: AppConfig, bind: SocketAddr) -> Result<()> {
    let rt = runtime()?;
    let provider: Arc<dyn IdentityProvider> = Arc::new(GoTrueClient::new());
    rt.block_on(server::serve(config, provider, bind))
}
