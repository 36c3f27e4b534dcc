use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use snapscribe_config::Config;
use snapscribe_core::{CaptureController, ImagePreprocessor};
use snapscribe_ocr::{XcapScreenCapture, init_recognizer, list_monitors};
use snapscribe_types::{AppEvent, CaptureRegion};
use tokio::task::JoinSet;

use crate::cli::{Cli, Command};
use crate::controller::AppController;
use crate::state::AppState;

mod cli;
mod controller;
mod events;
mod host;
mod io;
mod logging;
mod state;
mod status;
mod ui;

#[cfg(test)]
mod tests {
    mod channel_tests;
    mod event_flow_tests;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::new(),
    };
    logging::init(&config.logging);

    match cli.command {
        None => run(config, false, None).await,
        Some(Command::Run { hotkey, output }) => run(config, hotkey, output).await,
        Some(Command::Capture {
            x,
            y,
            width,
            height,
            ocr,
            output,
        }) => capture_once(config, CaptureRegion::new(x, y, width, height), ocr, output).await,
        Some(Command::Monitors) => {
            for monitor in list_monitors()? {
                println!(
                    "{}: {}x{} at ({}, {}){}",
                    monitor.name,
                    monitor.width,
                    monitor.height,
                    monitor.x,
                    monitor.y,
                    if monitor.primary { " [primary]" } else { "" }
                );
            }
            Ok(())
        }
    }
}

fn build_controller(config: &Config) -> CaptureController {
    CaptureController::new(Arc::new(XcapScreenCapture::new()), init_recognizer(&config.ocr))
        .with_preprocessor(ImagePreprocessor::new(config.ocr.closing_kernel))
}

fn start(
    mut config: Config,
    output: Option<PathBuf>,
) -> (Arc<AppState>, AppController, JoinSet<anyhow::Result<()>>) {
    if let Some(dir) = output {
        config.artifact.output_dir = dir;
    }
    tracing::info!("Saving captures to {}", config.artifact.output_dir.display());

    let controller = build_controller(&config);
    let state = Arc::new(AppState::new(config));
    let app = AppController::new(state.clone());
    let mut tasks = JoinSet::new();
    app.spawn_backend(&mut tasks, controller);

    (state, app, tasks)
}

async fn finish(app: AppController, mut tasks: JoinSet<anyhow::Result<()>>) {
    app.shutdown();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Task failed: {:#}", e),
            Err(e) => tracing::error!("Task panicked: {}", e),
        }
    }
}

/// Interactive session on stdin, optionally with the capture hotkey
async fn run(config: Config, hotkey: bool, output: Option<PathBuf>) -> anyhow::Result<()> {
    let watch_hotkey = hotkey || config.hotkey.enabled;
    let (state, app, mut tasks) = start(config, output);

    if watch_hotkey {
        let cancel = app.cancel_token();
        let event_tx = app.ui_handle().to_app;
        tasks.spawn(async move {
            if let Err(e) = io::watch_hotkey(state, cancel, event_tx).await {
                tracing::error!("Hotkey listener failed: {:#}", e);
            }
            Ok(())
        });
    }

    let result = tokio::select! {
        result = ui::ui_loop(app.ui_handle(), ui::spawn_stdin_reader()) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
            Ok(())
        }
    };

    finish(app, tasks).await;
    result
}

/// capture -> extract -> save without any interaction
async fn capture_once(
    config: Config,
    region: CaptureRegion,
    ocr: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let (_state, app, tasks) = start(config, output);

    let events = ui::drive(&app.ui_handle(), vec![AppEvent::QuickCapture { region, ocr }]).await;
    finish(app, tasks).await;

    let saved = events?
        .iter()
        .any(|event| matches!(event, AppEvent::ArtifactSaved { .. }));
    if !saved {
        anyhow::bail!("Capture of {region} was not saved");
    }
    Ok(())
}
