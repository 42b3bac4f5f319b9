#![cfg(feature = "egui")]

use camino::Utf8PathBuf;
use eframe::egui::{self, Color32, RichText, Sense, Vec2};

use crate::model::ClusterK;
use crate::state::View;

use super::render::{category_color, paint_pie};
use super::state::CallViewApp;

const TABS: [(View, &str); 5] = [
    (View::Start, "Start"),
    (View::Summary, "Summary"),
    (View::Cluster(ClusterK::K1), "K=1"),
    (View::Cluster(ClusterK::K2), "K=2"),
    (View::Cluster(ClusterK::K3), "K=3"),
];

pub fn update(app: &mut CallViewApp, ctx: &egui::Context, _frame: &mut eframe::Frame) {
    app.poll_load_events();

    egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
        ui.horizontal(|ui| {
            for (view, label) in TABS {
                if ui.selectable_label(app.state.view() == view, label).clicked() {
                    app.state.switch_view(view);
                }
            }
            if app.state.selector_visible() {
                ui.separator();
                marker_selector(app, ui);
            }
        });
    });

    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        if let Some(banner) = app.loading.as_ref().or(app.cluster_loading.as_ref()) {
            ui.horizontal(|ui| {
                ui.strong(banner.title.as_str());
                let bar = match banner.fraction {
                    Some(f) => egui::ProgressBar::new(f),
                    None => egui::ProgressBar::new(0.5).animate(true),
                };
                ui.add(bar.text(banner.message.as_str()));
            });
        } else if let Some(msg) = app.state.status() {
            ui.label(msg);
        } else {
            ui.label("Ready");
        }
    });

    egui::CentralPanel::default().show(ctx, |ui| match app.state.view() {
        View::Start => start_panel(app, ui),
        View::Summary => summary_panel(app, ui),
        View::Cluster(k) => cluster_panel(app, ui, k),
    });
}

fn marker_selector(app: &mut CallViewApp, ui: &mut egui::Ui) {
    let markers = app.state.marker_list();
    let current = app.state.selected().unwrap_or("").to_string();
    let mut choice = None;
    ui.label("SNP:");
    egui::ComboBox::from_id_salt("marker_select")
        .selected_text(current.as_str())
        .show_ui(ui, |ui| {
            for m in &markers {
                if ui.selectable_label(*m == current, m.as_str()).clicked() {
                    choice = Some(m.clone());
                }
            }
        });
    if let Some(m) = choice {
        app.state.select_marker(&m);
    }
}

fn start_panel(app: &mut CallViewApp, ui: &mut egui::Ui) {
    ui.heading("Cohort calls");
    ui.horizontal(|ui| {
        ui.label("CSV file:");
        ui.text_edit_singleline(&mut app.summary_path);
        if ui.button("Load").clicked() {
            let p = app.summary_path.trim();
            if !p.is_empty() {
                let p = Utf8PathBuf::from(p);
                app.start_summary_load(p);
            }
        }
        if ui.button("Load default").clicked() {
            let p = Utf8PathBuf::from(app.config.default_summary.as_str());
            app.start_summary_load(p);
        }
    });

    ui.add_space(12.0);
    ui.heading("Cluster images");
    ui.label("Folder, .zip archive, or comma-separated PNG files named <snp>_k<1|2|3>.png");
    ui.horizontal(|ui| {
        ui.text_edit_singleline(&mut app.clusters_path);
        if ui.button("Load").clicked() {
            let p = Utf8PathBuf::from(app.clusters_path.as_str());
            app.load_clusters_from(&p);
        }
        if ui.button("Clear").clicked() {
            app.state.clear_clusters();
        }
    });
    let n = app.state.registry().len();
    ui.label(format!("{} markers loaded", n));
}

fn summary_panel(app: &mut CallViewApp, ui: &mut egui::Ui) {
    let view = app.state.summary_view();
    ui.heading("Cohort calls");
    ui.horizontal(|ui| {
        let side = ui.available_height().min(ui.available_width() * 0.6).max(120.0);
        let (resp, painter) = ui.allocate_painter(Vec2::splat(side), Sense::hover());
        paint_pie(&painter, resp.rect.center(), side * 0.45, &view);

        ui.vertical(|ui| {
            egui::Grid::new("summary_table").striped(true).show(ui, |ui| {
                let rows = view.table_rows();
                let last = rows.len().saturating_sub(1);
                for (i, (label, value)) in rows.into_iter().enumerate() {
                    if i == last {
                        ui.label(RichText::new(label).strong());
                        ui.label(RichText::new(value).strong());
                    } else {
                        let color = view
                            .slices
                            .get(i)
                            .map_or(Color32::GRAY, |s| category_color(s.category));
                        ui.colored_label(color, label);
                        ui.label(value);
                    }
                    ui.end_row();
                }
            });
        });
    });
}

fn cluster_panel(app: &mut CallViewApp, ui: &mut egui::Ui, k: ClusterK) {
    let caption = app.state.panel_caption(k);
    ui.vertical_centered(|ui| {
        if let Some(texture) = app.state.cluster_panel(k).image() {
            let max = ui.available_size() - Vec2::new(0.0, 32.0);
            ui.add(egui::Image::new(texture).max_size(max).maintain_aspect_ratio(true));
        }
        ui.label(caption);
    });
}
