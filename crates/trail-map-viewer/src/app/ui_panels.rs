//! UI panels for the application
//!
//! The sidebar (layers, position, tiles, errors), its toggle button and the
//! info popup window.

use crate::app::state::{AppState, TilesProvider};
use egui::{Color32, RichText, Ui, vec2};
use trail_map_lib::{InfoPopup, PopupContent};

/// Tallest the image list of a popup gets before scrolling
const POPUP_MAX_HEIGHT: f32 = 500.0;

/// Render the sidebar toggle button (overlaid on top-right of map)
pub fn sidebar_toggle_button(ui: &mut Ui, state: &mut AppState) {
    let button_size = vec2(40.0, 40.0);
    let margin = 10.0;

    // Position button in top-right corner
    let rect = ui.max_rect();
    let button_pos = rect.right_top() + vec2(-button_size.x - margin, margin);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui.allocate_rect(button_rect, egui::Sense::click());

    if response.clicked() {
        state.ui_settings.sidebar_open = !state.ui_settings.sidebar_open;
    }

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };

    ui.painter().rect_filled(button_rect, 5.0, bg_color);

    let icon = if state.ui_settings.sidebar_open {
        "✕"
    } else {
        "☰"
    };

    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );
}

/// Render the main sidebar (responsive: side on landscape, bottom on portrait)
pub fn render_sidebar(ctx: &egui::Context, state: &mut AppState) {
    if !state.ui_settings.sidebar_open {
        return;
    }

    let screen_size = ctx.viewport_rect().size();
    if screen_size.y > screen_size.x {
        egui::TopBottomPanel::bottom("main_sidebar")
            .default_height(240.0)
            .min_height(160.0)
            .max_height(ctx.viewport_rect().height() * 0.6)
            .resizable(true)
            .show(ctx, |ui| render_sidebar_content(ui, state));
    } else {
        egui::SidePanel::right("main_sidebar")
            .default_width(280.0)
            .min_width(240.0)
            .max_width(420.0)
            .resizable(true)
            .show(ctx, |ui| render_sidebar_content(ui, state));
    }
}

/// Render the sidebar content (shared between portrait and landscape)
fn render_sidebar_content(ui: &mut Ui, state: &mut AppState) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.heading("🗺 Trail Map");
            ui.separator();

            render_position_section(ui, state);
            ui.add_space(8.0);
            ui.separator();

            render_layers_section(ui, state);
            ui.add_space(8.0);
            ui.separator();

            render_tiles_section(ui, state);

            if let Some(error) = &state.loader.error {
                ui.add_space(8.0);
                ui.separator();
                ui.label(RichText::new("⚠ Error").strong().color(Color32::RED));
                ui.label(RichText::new(error).color(Color32::RED));
            }

            ui.add_space(8.0);
            ui.separator();
            ui.label(
                RichText::new(format!("Data: {}", state.loader.source.describe()))
                    .small()
                    .weak(),
            );
        });
}

/// Last position and the map actions
fn render_position_section(ui: &mut Ui, state: &mut AppState) {
    match &state.stats.last_timestamp {
        Some(timestamp) => {
            ui.label(RichText::new("📍 Last position").strong());
            ui.label(timestamp);
        }
        None => {
            ui.label(RichText::new("No position yet").weak());
        }
    }

    ui.horizontal_wrapped(|ui| {
        let has_layout = state.layout.is_some();
        if ui
            .add_enabled(has_layout, egui::Button::new("🎯 Center on last position"))
            .clicked()
        {
            state.pending_recenter = true;
        }

        let loading = state.loader.is_loading();
        if ui
            .add_enabled(!loading, egui::Button::new("🔄 Reload"))
            .clicked()
        {
            state.pending_reload = true;
        }
        if loading {
            ui.spinner();
        }
    });
}

/// Layer toggles with their marker counts
fn render_layers_section(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("Layers").strong());

    let stats = &state.stats;
    let layers = &mut state.ui_settings.layers;
    let data = state.layout.as_ref().map(|layout| layout.data());

    ui.checkbox(
        &mut layers.track,
        format!("Track ({} points)", stats.track_points),
    );

    if data.is_some_and(|data| data.clusters.is_some()) {
        ui.checkbox(
            &mut layers.clusters,
            format!(
                "Photo clusters ({} clusters, {} photos)",
                stats.clusters, stats.cluster_photos
            ),
        );
    } else {
        ui.label(RichText::new("Photo clusters: not loaded").weak());
    }

    if data.is_some_and(|data| data.images.is_some()) {
        ui.checkbox(&mut layers.images, format!("Images ({})", stats.images));
    } else {
        ui.label(RichText::new("Images: not loaded").weak());
    }
}

fn render_tiles_section(ui: &mut Ui, state: &mut AppState) {
    let provider = &mut state.ui_settings.tiles_provider;
    egui::ComboBox::from_label("Map tiles")
        .selected_text(provider.name())
        .show_ui(ui, |ui| {
            for option in TilesProvider::all() {
                ui.selectable_value(provider, *option, option.name());
            }
        });
}

/// Show the info popup pointing at `anchor`, the top of its marker on screen
///
/// Closed with its button or Escape.
pub fn popup_window(ctx: &egui::Context, popup: &mut InfoPopup, anchor: egui::Pos2) {
    let Some(content) = popup.content() else {
        return;
    };

    let max_width = popup.max_width();
    let mut close = ctx.input(|i| i.key_pressed(egui::Key::Escape));

    let window = egui::Window::new("info_popup")
        .title_bar(false)
        .collapsible(false)
        .resizable(false)
        .max_width(max_width)
        .frame(egui::Frame::popup(&ctx.style()))
        .pivot(egui::Align2::CENTER_BOTTOM)
        .fixed_pos(anchor - vec2(0.0, 4.0));

    window.show(ctx, |ui| {
        ui.set_max_width(max_width);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
            if ui.small_button("✕").clicked() {
                close = true;
            }
        });
        render_popup_content(ui, content, max_width);
    });

    if close {
        popup.close();
    }
}

fn render_popup_content(ui: &mut Ui, content: &PopupContent, max_width: f32) {
    match content {
        PopupContent::Text(text) => {
            ui.label(text);
        }
        PopupContent::Images { sources, caption } => {
            egui::ScrollArea::vertical()
                .max_height(POPUP_MAX_HEIGHT)
                .show(ui, |ui| {
                    for source in sources {
                        ui.add(
                            egui::Image::new(source.as_str())
                                .max_width(max_width)
                                .maintain_aspect_ratio(true),
                        );
                    }
                });
            if let Some(caption) = caption {
                ui.label(caption);
            }
        }
    }
}

/// Tiles attribution at the bottom of the map
pub fn attribution(ui: &Ui, provider: TilesProvider) {
    let screen_rect = ui.max_rect();
    ui.painter().text(
        screen_rect.center_bottom() + vec2(0.0, -5.0),
        egui::Align2::CENTER_BOTTOM,
        provider.attribution(),
        egui::FontId::proportional(10.0),
        Color32::from_black_alpha(180),
    );
}
