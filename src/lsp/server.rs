use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{stdin, stdout};
use tokio::sync::{Mutex, mpsc};
use tower_lsp::{LspService, Server};

use crate::Config;
use crate::lsp::backend::{Backend, EditorPreviews};
use crate::lsp::host::{LspSurfaceHost, forward_surface_commands};
use crate::lsp::protocol::{PREVIEW_DISPOSED, SHOW_PREVIEW};
use crate::preview::resources::to_directory_url;
use crate::preview::{ContentAssembler, PanelRegistry, PreviewAssets};
use crate::settings::Settings;
use crate::settings::watch::{SettingsEvent, SettingsWatcher};

/// Start the LSP server
pub async fn serve() -> Result<()> {
    let config = Config::from_args_and_env()?;

    // stdout carries the protocol, env_logger writes to stderr
    env_logger::Builder::from_default_env()
        .parse_filters(&config.log_level)
        .init();

    // Pages are read once; previews never touch the disk afterwards
    let assets = PreviewAssets::load(&config.extension_root)?;
    let assembler = ContentAssembler::new(
        Arc::new(assets),
        to_directory_url(&config.extension_root),
    );

    let settings = Settings::load_available(&config.settings_files);

    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let previews = Arc::new(Mutex::new(PanelRegistry::new(
        LspSurfaceHost::new(commands_tx),
        settings,
        assembler,
        config.extension_root.clone(),
    )));

    let _watcher = match SettingsWatcher::start(config.settings_files.clone()) {
        Ok((watcher, events)) => {
            tokio::spawn(reload_settings(previews.clone(), events));
            Some(watcher)
        }
        Err(e) => {
            log::warn!("Settings will not reload on change: {}", e);
            None
        }
    };

    // If running under the integration test, exit after a short delay so the test can read stdout to EOF.
    if std::env::var("GLTF_PREVIEW_LS_TEST_EXIT").as_deref() == Ok("1") {
        thread::spawn(|| {
            thread::sleep(Duration::from_secs(2));
            std::process::exit(0);
        });
    }

    let (service, socket) = LspService::build(move |client| {
        tokio::spawn(forward_surface_commands(client.clone(), commands_rx));
        Backend::new(client, config, previews)
    })
    .custom_method(SHOW_PREVIEW, Backend::show_preview)
    .custom_method(PREVIEW_DISPOSED, Backend::preview_disposed)
    .finish();

    Server::new(stdin(), stdout(), socket).serve(service).await;

    Ok(())
}

/// Re-read a settings file whenever the watcher reports a change
async fn reload_settings(
    previews: Arc<Mutex<EditorPreviews>>,
    mut events: mpsc::UnboundedReceiver<SettingsEvent>,
) {
    while let Some(event) = events.recv().await {
        match event {
            SettingsEvent::Changed(layer, path) => {
                let mut previews = previews.lock().await;
                if let Err(e) = previews.config_mut().load_file(layer, &path) {
                    log::warn!("Keeping previous {:?} settings: {:#}", layer, e);
                }
            }
            SettingsEvent::WatcherError(e) => {
                log::error!("Settings file watcher error: {}", e);
            }
        }
    }
}
