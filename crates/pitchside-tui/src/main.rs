// pitchside entry point.
//
// Startup sequence:
// 1. Load config (copies defaults into config/ on first run)
// 2. Initialize tracing (log to file, not terminal)
// 3. Open the preference store (SQLite, or memory with --ephemeral)
// 4. Build the player directory source
// 5. Create mpsc channels
// 6. Spawn app logic task
// 7. Run the TUI until the user quits
// 8. Cleanup on exit

use std::sync::Arc;

use anyhow::Context;
use pitchside_app::app;
use pitchside_core::config::{self, Config};
use pitchside_core::directory::{self, DirectorySource};
use pitchside_core::store::{KeyValueStore, MemoryStore, Preferences, SqliteStore};
use pitchside_tui::tui;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let ephemeral = std::env::args().skip(1).any(|arg| arg == "--ephemeral");

    let config = config::load_config().context("failed to load configuration")?;

    init_tracing(&config.logging.filter)?;
    info!("pitchside starting up");

    let directory: Arc<dyn DirectorySource> = directory::from_config(&config.directory)
        .context("failed to build player directory")?
        .into();
    info!("Player directory: {}", config.directory.url);

    if ephemeral {
        info!("Using in-memory preference store");
        launch(MemoryStore::new(), directory).await
    } else {
        let store = open_store(&config)?;
        launch(store, directory).await
    }
}

fn open_store(config: &Config) -> anyhow::Result<SqliteStore> {
    let path = config
        .store
        .resolved_path()
        .context("failed to resolve preference store path")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let path_str = path.to_string_lossy();
    let store = SqliteStore::open(&path_str).context("failed to open preference store")?;
    info!("Preference store opened at {}", path.display());
    Ok(store)
}

async fn launch<S: KeyValueStore + 'static>(
    store: S,
    directory: Arc<dyn DirectorySource>,
) -> anyhow::Result<()> {
    let prefs = Arc::new(Preferences::new(store));

    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);
    let (refresh_tx, refresh_rx) = mpsc::channel(64);

    let app_state = app::AppState::new(prefs, directory, refresh_tx);

    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, refresh_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    info!("Application ready");

    // Blocks until the user confirms quit or presses Ctrl+C.
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {}", e);
    }

    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("pitchside shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
///
/// `RUST_LOG` wins over the configured filter.
fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("pitchside.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
