//! Overlay panels drawn with bevy_egui

use bevy::ecs::message::MessageWriter;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use harbor_core::overlay::OverlayKind;
use harbor_core::telemetry::{FieldView, Tier};

use crate::types::{DetailsView, Overlays, TrackingView, UiAction};

const PANEL_WIDTH: f32 = 300.0;
const MARGIN: f32 = 16.0;

const OPTIMIZED_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(20, 90, 50, 230);
const CONGESTED_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(110, 25, 25, 230);

/// Grouped system parameters for the overlay UI
#[derive(SystemParam)]
pub struct UiParams<'w, 's> {
    pub contexts: EguiContexts<'w, 's>,
    pub overlays: Res<'w, Overlays>,
    pub actions: MessageWriter<'w, UiAction>,
    pub time: Res<'w, Time>,
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // Runs in EguiPrimaryContextPass for proper input handling (bevy_egui 0.38+)
        app.add_systems(EguiPrimaryContextPass, ui_system);
    }
}

pub fn tier_color(tier: Tier) -> egui::Color32 {
    let [r, g, b] = tier.rgb();
    egui::Color32::from_rgb(r, g, b)
}

fn ui_system(mut params: UiParams) {
    let elapsed = params.time.elapsed_secs();
    let Ok(ctx) = params.contexts.ctx_mut() else { return };
    let overlays = &params.overlays;
    let actions = &mut params.actions;

    render_scene_nav(ctx, &overlays.scene_title, actions);

    if overlays.loading {
        egui::Area::new(egui::Id::new("loading"))
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading scene...");
                    });
                });
            });
    }

    let board = &overlays.board;

    if let Some(details) = overlays.details.as_ref().filter(|_| board.is_visible(OverlayKind::Details)) {
        render_details(ctx, details, actions);
        if board.is_visible(OverlayKind::Diagnostic) {
            render_diagnostics(ctx, details, actions);
        }
        if board.is_visible(OverlayKind::Alert) {
            render_alert(ctx, details, elapsed, actions);
        }
    }

    if let Some(analytics) = overlays.analytics.as_ref().filter(|_| board.is_visible(OverlayKind::Analytics)) {
        overlay_window(ctx, OverlayKind::Analytics, egui::Align2::LEFT_TOP, [MARGIN, 64.0], actions, |ui| {
            egui::Grid::new("analytics_grid").num_columns(2).show(ui, |ui| {
                ui.label("Scanning");
                ui.strong(&analytics.current_container);
                ui.end_row();
                ui.label("Next in queue");
                ui.strong(&analytics.next_container);
                ui.end_row();
                ui.label("Unloading time");
                ui.colored_label(
                    tier_color(Tier::Good),
                    format!("{:.1}% Reduction", analytics.unloading_reduction_pct),
                );
                ui.end_row();
            });
        });
    }

    if let Some(dwell) = overlays.dwell.as_ref().filter(|_| board.is_visible(OverlayKind::Dwell)) {
        overlay_window(ctx, OverlayKind::Dwell, egui::Align2::LEFT_CENTER, [MARGIN, 0.0], actions, |ui| {
            ui.label(format!("Average dwell: {} min", dwell.average_dwell_minutes));
            ui.label(format!("Queue length: {} vehicles", dwell.queue_length));
        });
    }

    if board.is_visible(OverlayKind::Graph) {
        let values = overlays
            .dwell
            .as_ref()
            .filter(|_| board.is_visible(OverlayKind::Dwell))
            .map(|d| d.history.as_slice())
            .unwrap_or(overlays.trend.as_slice());
        overlay_window(ctx, OverlayKind::Graph, egui::Align2::RIGHT_BOTTOM, [-MARGIN, -MARGIN], actions, |ui| {
            render_trend(ui, values)
        });
    }

    if let Some(tracking) = overlays.tracking.as_ref().filter(|_| board.is_visible(OverlayKind::Tracking)) {
        render_tracking(ctx, tracking, actions);
    }

    if let Some(energy) = overlays.energy.as_ref().filter(|_| board.is_visible(OverlayKind::EnergyGrid)) {
        overlay_window(ctx, OverlayKind::EnergyGrid, egui::Align2::RIGHT_BOTTOM, [-MARGIN, -MARGIN], actions, |ui| {
            egui::Grid::new("energy_grid").num_columns(2).show(ui, |ui| {
                ui.label("Solar output");
                ui.strong(format!("{:.1} MW", energy.solar_output_mw));
                ui.end_row();
                ui.label("Battery storage");
                percentage_bar(ui, energy.storage_pct, energy.storage_tier());
                ui.end_row();
                ui.label("Grid draw");
                ui.strong(format!("{:.1} MW", energy.grid_draw_mw));
                ui.end_row();
                ui.label("Shore power");
                ui.strong(format!("{} berths", energy.shore_power_berths));
                ui.end_row();
            });
        });
    }
}

fn close_button(ui: &mut egui::Ui, kind: OverlayKind, actions: &mut MessageWriter<UiAction>) {
    if ui.small_button("✕").on_hover_text("Close").clicked() {
        actions.write(UiAction::CloseOverlay(kind));
    }
}

/// Anchored window for an auxiliary overlay, titled, with a close button
fn overlay_window(
    ctx: &egui::Context,
    kind: OverlayKind,
    anchor: egui::Align2,
    offset: [f32; 2],
    actions: &mut MessageWriter<UiAction>,
    add_contents: impl FnOnce(&mut egui::Ui),
) {
    egui::Window::new(kind.title())
        .title_bar(false)
        .anchor(anchor, offset)
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong(kind.title());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    close_button(ui, kind, actions);
                });
            });
            ui.separator();
            add_contents(ui);
        });
}

fn render_scene_nav(ctx: &egui::Context, title: &str, actions: &mut MessageWriter<UiAction>) {
    egui::Area::new(egui::Id::new("scene_nav"))
        .anchor(egui::Align2::CENTER_TOP, [0.0, 12.0])
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("◀").clicked() {
                        actions.write(UiAction::PreviousScene);
                    }
                    ui.label(egui::RichText::new(title).size(18.0).strong());
                    if ui.button("▶").clicked() {
                        actions.write(UiAction::NextScene);
                    }
                });
            });
        });
}

fn render_details(ctx: &egui::Context, details: &DetailsView, actions: &mut MessageWriter<UiAction>) {
    egui::Window::new("details")
        .title_bar(false)
        .anchor(egui::Align2::RIGHT_TOP, [-MARGIN, 64.0])
        .default_width(PANEL_WIDTH)
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(&details.title);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("✕").clicked() {
                        actions.write(UiAction::CloseDetails);
                    }
                });
            });
            ui.separator();

            egui::Grid::new("details_grid")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    for row in &details.rows {
                        ui.label(row.label());
                        match row {
                            FieldView::Percentage { percent, tier, .. } => percentage_bar(ui, *percent, *tier),
                            FieldView::Status { value, tier, .. } => {
                                ui.horizontal(|ui| {
                                    status_dot(ui, *tier);
                                    ui.label(value);
                                });
                            }
                            FieldView::Text { value, .. } => {
                                ui.label(value);
                            }
                        }
                        ui.end_row();
                    }
                });
        });
}

fn percentage_bar(ui: &mut egui::Ui, percent: i32, tier: Tier) {
    let fraction = percent.clamp(0, 100) as f32 / 100.0;
    ui.add(
        egui::ProgressBar::new(fraction)
            .desired_width(140.0)
            .fill(tier_color(tier))
            .text(format!("{percent}%")),
    );
}

fn status_dot(ui: &mut egui::Ui, tier: Tier) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
    ui.painter().circle_filled(rect.center(), 4.0, tier_color(tier));
}

/// Rows of the focused record that are not in the good tier
fn faults(details: &DetailsView) -> impl Iterator<Item = (&FieldView, Tier)> {
    details.rows.iter().filter_map(|row| match row {
        FieldView::Percentage { tier, .. } | FieldView::Status { tier, .. } if *tier != Tier::Good => Some((row, *tier)),
        _ => None,
    })
}

fn render_diagnostics(ctx: &egui::Context, details: &DetailsView, actions: &mut MessageWriter<UiAction>) {
    overlay_window(ctx, OverlayKind::Diagnostic, egui::Align2::LEFT_BOTTOM, [MARGIN, -MARGIN], actions, |ui| {
        let mut any = false;
        for (row, tier) in faults(details) {
            any = true;
            ui.horizontal(|ui| {
                status_dot(ui, tier);
                match row {
                    FieldView::Percentage { label, percent, .. } => ui.label(format!("{label}: {percent}%")),
                    FieldView::Status { label, value, .. } | FieldView::Text { label, value } => {
                        ui.label(format!("{label}: {value}"))
                    }
                };
            });
        }
        if !any {
            ui.colored_label(tier_color(Tier::Good), "No faults detected");
        }
    });
}

fn render_alert(ctx: &egui::Context, details: &DetailsView, elapsed: f32, actions: &mut MessageWriter<UiAction>) {
    let Some((row, tier)) = faults(details).max_by_key(|(_, tier)| *tier == Tier::Danger) else {
        return;
    };
    let message = match row {
        FieldView::Status { value, .. } => value.clone(),
        FieldView::Percentage { label, percent, .. } => format!("{label} at {percent}%"),
        FieldView::Text { value, .. } => value.clone(),
    };

    let [r, g, b] = tier.rgb();
    let alpha = (120.0 + 120.0 * (elapsed * 4.0).sin().abs()) as u8;
    egui::Area::new(egui::Id::new("alert"))
        .anchor(egui::Align2::CENTER_TOP, [0.0, 64.0])
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(egui::Color32::from_rgba_unmultiplied(r, g, b, alpha))
                .inner_margin(egui::Margin::symmetric(12, 6))
                .corner_radius(6.0)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new(format!("⚠ {}: {message}", details.title))
                                .color(egui::Color32::WHITE)
                                .strong(),
                        );
                        close_button(ui, OverlayKind::Alert, actions);
                    });
                });
        });
}

fn render_trend(ui: &mut egui::Ui, values: &[f32]) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(220.0, 90.0), egui::Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 4.0, ui.visuals().extreme_bg_color);

    if values.len() < 2 {
        return;
    }
    let (min, max) = values
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let span = (max - min).max(f32::EPSILON);
    let step = rect.width() / (values.len() - 1) as f32;
    let points: Vec<egui::Pos2> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let y = rect.bottom() - (v - min) / span * (rect.height() - 8.0) - 4.0;
            egui::pos2(rect.left() + i as f32 * step, y)
        })
        .collect();
    painter.add(egui::Shape::line(points, egui::Stroke::new(2.0, tier_color(Tier::Good))));
}

fn render_tracking(ctx: &egui::Context, tracking: &TrackingView, actions: &mut MessageWriter<UiAction>) {
    let fill = if tracking.note.optimized { OPTIMIZED_FILL } else { CONGESTED_FILL };
    egui::Area::new(egui::Id::new("tracking"))
        .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -24.0])
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(fill)
                .inner_margin(egui::Margin::symmetric(14, 8))
                .corner_radius(8.0)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new(&tracking.note.headline)
                                .color(egui::Color32::WHITE)
                                .strong(),
                        );
                        ui.label(egui::RichText::new(&tracking.note.text).color(egui::Color32::WHITE));
                        if ui.button("✕").on_hover_text("Stop tracking").clicked() {
                            actions.write(UiAction::StopTracking);
                        }
                    });
                });
        });
}
