#![cfg(feature = "egui")]

use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use eframe::egui::{self, TextureHandle};
use log::info;

use crate::batch::{
    BatchProgress, BatchSource, FileListSource, ImageLoader, build_registry, open_source,
};
use crate::config::Config;
use crate::model::Row;
use crate::registry::{ImageHandle, ImageRegistry};
use crate::state::ViewerState;
use crate::table::TableReader;

impl ImageHandle for TextureHandle {
    fn release(self) {
        // The texture is freed once the last handle is dropped.
        drop(self);
    }
}

/// Decodes PNG bytes and uploads them as egui textures.
pub struct TextureLoader {
    ctx: egui::Context,
}

impl TextureLoader {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl ImageLoader for TextureLoader {
    type Image = TextureHandle;

    fn load(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<TextureHandle> {
        let img = image::load_from_memory(&bytes)
            .with_context(|| format!("Failed to decode {}", file_name))?;
        let rgba = img.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let color = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        Ok(self
            .ctx
            .load_texture(file_name, color, egui::TextureOptions::LINEAR))
    }
}

/// Messages from background table readers and image batch loaders.
pub(crate) enum LoadEvent {
    TableProgress { ticket: u64, rows: usize },
    TableDone { ticket: u64, rows: Result<Vec<Row>> },
    ImageProgress { ticket: u64, progress: BatchProgress },
    ImagesDone { ticket: u64, registry: Result<ImageRegistry<TextureHandle>> },
}

/// Transient load overlay text.
#[derive(Clone, Debug)]
pub struct LoadingBanner {
    pub title: String,
    pub message: String,
    /// Known completion ratio; `None` shows an indeterminate bar.
    pub fraction: Option<f32>,
}

/// Interactive egui application for call summaries and cluster images.
pub struct CallViewApp {
    pub state: ViewerState<TextureHandle>,
    pub config: Config,
    pub summary_path: String,
    pub clusters_path: String,
    pub loading: Option<LoadingBanner>,
    pub cluster_loading: Option<LoadingBanner>,
    ctx: egui::Context,
    tx: Sender<LoadEvent>,
    pub(crate) rx: Receiver<LoadEvent>,
}

impl CallViewApp {
    pub fn new(
        ctx: egui::Context,
        config: Config,
        summary: Option<Utf8PathBuf>,
        clusters: Option<Utf8PathBuf>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut app = Self {
            state: ViewerState::new(),
            summary_path: summary.as_ref().map(|p| p.to_string()).unwrap_or_default(),
            clusters_path: clusters.as_ref().map(|p| p.to_string()).unwrap_or_default(),
            config,
            loading: None,
            cluster_loading: None,
            ctx,
            tx,
            rx,
        };
        match summary {
            Some(p) => app.start_summary_load(p),
            None => {
                if let Some(p) = app.config.preload_path() {
                    if let Ok(p) = Utf8PathBuf::from_path_buf(p.to_path_buf()) {
                        info!("Preloading {}", p);
                        app.start_summary_load(p);
                    }
                }
            }
        }
        if let Some(p) = clusters {
            app.load_clusters_from(&p);
        }
        app
    }

    /// Read a table on a background thread. A newer load supersedes this one.
    pub fn start_summary_load(&mut self, path: Utf8PathBuf) {
        let ticket = self.state.begin_summary_load();
        self.loading = Some(LoadingBanner {
            title: "Loading cohort calls".to_string(),
            message: "Reading CSV… rows processed: 0".to_string(),
            fraction: None,
        });
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        let reader = TableReader::new().progress_every(self.config.progress_every_rows);
        std::thread::spawn(move || {
            let progress_tx = tx.clone();
            let progress_ctx = ctx.clone();
            let rows = reader.load(&path, &mut |rows| {
                let _ = progress_tx.send(LoadEvent::TableProgress { ticket, rows });
                progress_ctx.request_repaint();
            });
            let _ = tx.send(LoadEvent::TableDone { ticket, rows });
            ctx.request_repaint();
        });
    }

    /// Apply finished background loads.
    pub(crate) fn poll_load_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                LoadEvent::TableProgress { ticket, rows } => {
                    if !self.state.is_current_load(ticket) {
                        continue;
                    }
                    if let Some(banner) = &mut self.loading {
                        banner.message = format!("Reading CSV… rows processed: {}", rows);
                    }
                }
                LoadEvent::TableDone { ticket, rows } => {
                    let current = self.state.is_current_load(ticket);
                    self.state.finish_summary_load(ticket, rows);
                    if current {
                        self.loading = None;
                    }
                }
                LoadEvent::ImageProgress { ticket, progress } => {
                    if !self.state.is_current_cluster_load(ticket) {
                        continue;
                    }
                    self.state.report_cluster_progress(ticket, progress);
                    if let Some(banner) = &mut self.cluster_loading {
                        banner.message = progress.message();
                        banner.fraction = Some(progress.percent() as f32 / 100.0);
                    }
                }
                LoadEvent::ImagesDone { ticket, registry } => {
                    let current = self.state.is_current_cluster_load(ticket);
                    self.state.finish_cluster_load(ticket, registry);
                    if current {
                        self.cluster_loading = None;
                    }
                }
            }
        }
    }

    /// Load cluster images from a folder, a `.zip` archive, or a
    /// comma-separated list of PNG files on a background thread. A newer
    /// batch supersedes this one.
    pub fn load_clusters_from(&mut self, input: &Utf8Path) {
        let ticket = self.state.begin_cluster_load();
        self.cluster_loading = Some(LoadingBanner {
            title: "Loading cluster images".to_string(),
            message: "Scanning…".to_string(),
            fraction: None,
        });
        let text = input.as_str().trim().to_string();
        let mut loader = TextureLoader::new(self.ctx.clone());
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        std::thread::spawn(move || {
            let progress_tx = tx.clone();
            let progress_ctx = ctx.clone();
            let registry = batch_source(&text).and_then(|mut source| {
                build_registry(source.as_mut(), &mut loader, &mut |progress| {
                    let _ = progress_tx.send(LoadEvent::ImageProgress { ticket, progress });
                    progress_ctx.request_repaint();
                })
            });
            let _ = tx.send(LoadEvent::ImagesDone { ticket, registry });
            ctx.request_repaint();
        });
    }
}

/// Batch source for the viewer's cluster input field.
fn batch_source(text: &str) -> Result<Box<dyn BatchSource>> {
    if text.contains(',') {
        let files = text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Utf8PathBuf::from)
            .collect();
        Ok(Box::new(FileListSource::new(files)))
    } else if text.is_empty() {
        Ok(Box::new(FileListSource::new(Vec::new())))
    } else {
        open_source(Utf8Path::new(text))
    }
}

impl eframe::App for CallViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        super::ui::update(self, ctx, _frame);
    }
}
