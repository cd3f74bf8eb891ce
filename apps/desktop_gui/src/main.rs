use std::sync::Arc;

mod backend_bridge;
mod controller;
mod media;
mod ui;

use anyhow::{anyhow, Context};
use client_core::{load_settings, HttpRecommendationClient};
use crossbeam_channel::bounded;
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::DesktopGuiApp;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let client = HttpRecommendationClient::new(&settings)
        .context("failed to configure recommendation client")?;
    tracing::info!(
        endpoint = %client.endpoint(),
        timeout_secs = settings.request_timeout.as_secs(),
        "recommendation client ready"
    );

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, Arc::new(client));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Art Recommender")
            .with_inner_size([1100.0, 820.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    let endpoint = settings.endpoint.clone();
    eframe::run_native(
        "Art Recommender",
        options,
        Box::new(move |_cc| Ok(Box::new(DesktopGuiApp::bootstrap(cmd_tx, ui_rx, endpoint)))),
    )
    .map_err(|err| anyhow!("desktop gui exited with error: {err}"))
}
