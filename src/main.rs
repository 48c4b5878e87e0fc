//! # Tasktiles
//!
//! A terminal task board where categories are laid out as tiles, grouped by
//! work type, technology, timeline or priority. The board is only shown to a
//! signed-in user; sign-in goes through a hosted identity provider (Google
//! OAuth via Supabase Auth) and a small HTTP redirect endpoint that turns the
//! one-time authorization code into a session.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! ```bash
//! tasktiles
//! # or explicitly
//! tasktiles ui --port 54321
//! ```
//!
//! #### TUI Key Bindings
//!
//! **Sign-in screen**
//! *   `Enter`: Continue with Google (opens the browser)
//! *   `q`: Quit
//!
//! **Board**
//! *   `Tab` / `Shift+Tab` / `1`-`4`: Switch grouping
//! *   `←`/`→` (`h`/`l`): Move between tiles
//! *   `Enter` / `Space`: Expand or collapse the tile, or create a category on the add tile
//! *   `a`: Add a task to the open tile
//! *   `c`: Create a category
//! *   `o`: Sign out
//! *   `q`: Quit
//!
//! **Dialogs**
//! *   `Enter`: Next field / submit
//! *   `←`/`→`: Pick a colour, icon or priority
//! *   `Esc`: Cancel
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! # Sign in through the browser
//! tasktiles login
//!
//! # Print a grouping as a table
//! tasktiles board --view technology
//!
//! # Run the redirect endpoint for a hosted deployment
//! tasktiles serve --bind 0.0.0.0:3000
//! ```
//!
//! ## Configuration
//!
//! Read from the environment (and a `.env` file):
//! *   `SUPABASE_URL`, `SUPABASE_ANON_KEY`: identity provider
//! *   `SITE_URL`: public origin used for the OAuth redirect
//! *   `TILES_COOKIE_JAR`: where the CLI and TUI keep their session cookies
//! *   `RUST_LOG`: log filter

use std::io;
use std::net::SocketAddr;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use tasktiles::commands::*;
use tasktiles::config::AppConfig;
use tasktiles::models::ViewType;
use tasktiles::storage::data_dir;
use tasktiles::tui::run_tui;

#[derive(Parser)]
#[command(name = "tasktiles")]
#[command(about = "Task board with category tiles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open interactive TUI
    Ui {
        /// Local port for the sign-in redirect (0 picks a free one)
        #[arg(short, long, default_value_t = 0)]
        port: u16,
    },
    /// Serve the sign-in pages and the OAuth redirect endpoint
    Serve {
        #[arg(short, long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },
    /// Print the board for one grouping
    Board {
        /// work-type, technology, timeline or priority
        #[arg(short, long, default_value = "work-type")]
        view: ViewType,
    },
    /// Show the signed-in user
    Whoami,
    /// Sign in through the browser
    Login {
        #[arg(short, long, default_value_t = 0)]
        port: u16,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
}

/// Logs to stderr, filtered by `RUST_LOG` (default `info`).
fn init_stderr_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// The TUI owns the terminal, so its logs go to a daily file in the data dir.
fn init_file_logging() -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(data_dir(), "tasktiles.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    guard
}

fn main() {
    let cli = Cli::parse();

    let _guard = match cli.command {
        Some(Commands::Ui { .. }) | None => Some(init_file_logging()),
        _ => {
            init_stderr_logging();
            None
        }
    };
    let config = AppConfig::from_env();

    let result = match cli.command {
        Some(Commands::Serve { bind }) => cmd_serve(config, bind),
        Some(Commands::Board { view }) => cmd_board(&config, view),
        Some(Commands::Whoami) => cmd_whoami(&config),
        Some(Commands::Login { port }) => cmd_login(&config, port),
        Some(Commands::Logout) => cmd_logout(&config),
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return;
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "tasktiles", &mut io::stdout());
            Ok(())
        }
        Some(Commands::Ui { port }) => run_tui(&config, port),
        None => run_tui(&config, 0),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
