//! Egui-based interactive viewer for call summaries and cluster images
//! (feature = "egui").

#![cfg(feature = "egui")]

mod geometry;
mod render;
mod state;
mod ui;

pub use geometry::{arc_point, arc_steps, slice_label_pos};
pub use render::paint_pie;
pub use state::{CallViewApp, LoadingBanner, TextureLoader};

use anyhow::Result;
use camino::Utf8PathBuf;
use eframe::egui;

use crate::config::Config;

/// Open the viewer window, optionally preloading a table and an image batch.
pub fn run(config: Config, summary: Option<Utf8PathBuf>, clusters: Option<Utf8PathBuf>) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("callview")
            .with_inner_size([config.window.width, config.window.height]),
        ..Default::default()
    };
    eframe::run_native(
        "callview",
        options,
        Box::new(move |cc| {
            Ok(Box::new(CallViewApp::new(
                cc.egui_ctx.clone(),
                config,
                summary,
                clusters,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}
