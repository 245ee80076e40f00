mod app;

use anyhow::{Context, Result, anyhow};
use app::UiApp;
use directories_next::ProjectDirs;
use eframe::{NativeOptions, egui};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use whatsit_core::ClientConfig;
use whatsit_core::config::{CONFIG_FILE_NAME, ENDPOINT_ENV_VAR};
use whatsit_core::render::TITLE;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run() {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config_path = config_path();
    let config = load_config(config_path.as_deref());
    tracing::info!("classifying via {}", config.endpoint_url);

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(TITLE)
            .with_inner_size([720.0, 680.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        TITLE,
        options,
        Box::new(move |_cc| {
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(Box::new(UiApp::new(
                config,
                config_path,
            )))
        }),
    )
    .map_err(|e| anyhow!("{e}"))
    .context("application stopped with error")
}

fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "whatsit", "Whatsit")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// File, then environment override; anything broken falls back to defaults.
fn load_config(path: Option<&Path>) -> ClientConfig {
    let from_file = match path.map(read_config_file).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("{e:#}");
            ClientConfig::default()
        }
    };
    apply_env_override(from_file.clone()).unwrap_or_else(|e| {
        tracing::warn!("{e:#}");
        from_file
    })
}

fn read_config_file(path: &Path) -> Result<ClientConfig> {
    ClientConfig::load(path).with_context(|| format!("ignoring config {}", path.display()))
}

fn apply_env_override(config: ClientConfig) -> Result<ClientConfig> {
    config
        .with_env_override(std::env::var(ENDPOINT_ENV_VAR).ok())
        .with_context(|| format!("ignoring {ENDPOINT_ENV_VAR}"))
}
