//! FormDesk desktop entry point: CLI parsing, logging, store setup, and the
//! eframe event loop.

mod ui;

use clap::Parser;
use client_core::AppController;
use storage::FileStore;
use tracing_subscriber::EnvFilter;

use crate::ui::{AppPaths, FormsApp};

#[derive(Debug, Parser)]
#[command(
    name = "formdesk",
    about = "Design forms, fill them out, and review responses, all stored locally."
)]
struct Cli {
    /// Directory for persisted forms and responses. Defaults to
    /// FORMDESK_DATA_DIR, then the platform-local application data dir.
    #[arg(long, value_name = "DIR")]
    data_dir: Option<std::path::PathBuf>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let paths = match AppPaths::resolve(cli.data_dir) {
        Ok(paths) => paths,
        Err(err) => {
            tracing::error!(error = %err, "failed to resolve data directory");
            std::process::exit(1);
        }
    };
    tracing::info!(data_root = %paths.data_root.display(), "starting formdesk");

    let store = match FileStore::open(&paths.store_dir) {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(error = %err, "failed to open local store");
            std::process::exit(1);
        }
    };
    let controller = AppController::new(store);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("FormDesk")
            .with_inner_size([1024.0, 768.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "FormDesk",
        options,
        Box::new(move |_cc| Ok(Box::new(FormsApp::new(controller)))),
    )
}
