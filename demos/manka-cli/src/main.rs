//! Command-line front end for a manka archive backend.
//!
//! Run with: cargo run -p manka-cli -- --server http://127.0.0.1:8080 login reader
//!
//! The login flag and the browser transport's cookies are kept in the
//! platform data directory, so later commands reuse the login. The embedded
//! transport has no cookie jar and relies on the flag alone. Select it with
//! `--embedded` or `IS_TAURI=1`.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use manka_core::{ClientConfig, HttpError, KeyValueStore, RuntimeTarget};
use manka_session::{AuthSession, AuthTransition, LogNavigator, storage::FileStore};
use manka_transport::{
    COOKIE_KEY, MankaApi, TransportOptions, install_with, protocol::SearchQuery,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(version, about = "Browse a manka archive backend")]
struct Cli {
    /// Backend origin (overrides MANKA_SERVER_URL).
    #[arg(long, global = true)]
    server: Option<String>,

    /// Use the embedded-runtime transport.
    #[arg(long, global = true)]
    embedded: bool,

    /// Session file (defaults to the platform data directory).
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and remember the session.
    Login {
        user: String,
        /// Password (read from MANKA_PASSWORD when omitted).
        #[arg(long, env = "MANKA_PASSWORD")]
        password: String,
    },
    /// Forget the local session.
    Logout,
    /// Show whether a session is remembered.
    Status,
    /// Show one archive.
    Detail { archive_id: String },
    /// Search archives.
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 25)]
        page_size: u32,
    },
    /// List favorites.
    Favorites {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(server) = cli.server {
        config = config.with_server_url(server);
    }
    if cli.embedded {
        config = config.with_target(RuntimeTarget::Embedded);
    }

    let store = match cli.session_file {
        Some(path) => FileStore::open(path),
        None => FileStore::open_default(),
    }
    .context("failed to open session store")?;
    tracing::info!(
        runtime = %config.target,
        server = %config.server_url,
        session_file = %store.path().display(),
        "starting manka-cli"
    );
    let store: Arc<dyn KeyValueStore> = Arc::new(store);
    let session = Arc::new(AuthSession::new(Arc::clone(&store), Arc::new(LogNavigator)));

    if matches!(cli.command, Command::Logout) {
        if let Err(e) = store.remove(COOKIE_KEY) {
            tracing::warn!(error = %e, "failed to clear cookies");
        }
    }
    let options = TransportOptions {
        cookie_store: Some(store),
        ..TransportOptions::default()
    };
    install_with(&config, Arc::clone(&session), options).context("failed to build http client")?;
    let api = MankaApi::from_installed(Arc::clone(&session))?;

    match run(&api, cli.command).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_unauthorized() => {
            bail!("session expired, run `manka-cli login` again")
        }
        Err(e) => Err(e.into()),
    }
}

async fn run(api: &MankaApi, command: Command) -> Result<(), HttpError> {
    match command {
        Command::Login { user, password } => {
            let mut transitions = api.session().subscribe();
            api.login(&user, &password).await?;
            if let Ok(AuthTransition::SignedIn) = transitions.try_recv() {
                println!("logged in as {user}");
            } else {
                println!("already logged in as {user}");
            }
        }
        Command::Logout => {
            api.logout();
            println!("logged out");
        }
        Command::Status => {
            let state = if api.session().is_authenticated() {
                "logged in"
            } else {
                "not logged in"
            };
            println!("{state}");
        }
        Command::Detail { archive_id } => {
            let archive = api.archive_detail(&archive_id).await?;
            println!("{} ({})", archive.archive_name, archive.archive_id);
            if let Some(pages) = archive.archive_total_page {
                println!("pages: {pages}");
            }
            if let Some(page) = archive.last_read_page {
                println!("last read: page {page}");
            }
            for tag in &archive.tags {
                println!("  {}:{}", tag.tag_name, tag.tag_value);
            }
        }
        Command::Search {
            query,
            page,
            page_size,
        } => {
            let result = api
                .search(&SearchQuery::new(query).page(page, page_size))
                .await?;
            println!(
                "page {} ({} per page), {} total",
                result.page_no, result.page_size, result.page_total
            );
            for archive in result.page_data {
                println!("{}\t{}", archive.archive_id, archive.archive_name);
            }
        }
        Command::Favorites { page } => {
            for favorite in api.favorites(page).await? {
                let name = favorite
                    .archive
                    .map(|a| a.archive_name)
                    .unwrap_or_default();
                println!("{}\t{name}", favorite.favorite_id);
            }
        }
    }
    Ok(())
}
