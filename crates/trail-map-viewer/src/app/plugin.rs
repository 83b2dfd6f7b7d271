//! Walkers plugin drawing the markers and detecting clicks on them
//!
//! The plugin is consumed by the map every frame, so what it finds (the
//! clicked marker, the popup anchor on screen) goes back to the app through a
//! shared [`PluginOutput`].

use crate::app::state::LayerVisibility;
use egui::{Color32, Pos2, Shape, Stroke, vec2};
use std::sync::{Arc, RwLock};
use trail_map_lib::{CircleSymbol, Marker, MarkerIcon, MarkerId, Rgb};
use walkers::{Plugin, Projector};

/// Height of the default pin, tip to top
const PIN_HEIGHT: f32 = 30.0;
/// Radius of the round head of the default pin
const PIN_RADIUS: f32 = 9.0;
const PIN_FILL: Color32 = Color32::from_rgb(0xEA, 0x43, 0x35);
const PIN_OUTLINE: Color32 = Color32::from_rgb(0xA5, 0x0E, 0x0E);

/// Smallest click target radius in pixels, however small the marker
const MIN_PICK_RADIUS: f32 = 8.0;

/// What the plugin reports back to the app after a frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PluginOutput {
    /// Marker clicked this frame
    pub clicked: Option<MarkerId>,
    /// Screen position the popup points at (top of its marker)
    pub anchor: Option<Pos2>,
}

impl PluginOutput {
    /// Take the clicked marker, with the popup anchor if it is still current
    ///
    /// The anchor was computed for the popup marker of the last frame. On a
    /// click it may belong to another marker, so none is returned.
    pub fn take_click(&mut self) -> (Option<MarkerId>, Option<Pos2>) {
        match self.clicked.take() {
            Some(id) => (Some(id), None),
            None => (None, self.anchor),
        }
    }
}

/// Click target of a drawn marker
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    pub id: MarkerId,
    pub center: Pos2,
    pub radius: f32,
    /// Where a popup for this marker points
    pub anchor: Pos2,
}

/// Plugin for rendering markers on the map
pub struct MarkerPlugin {
    markers: Arc<Vec<Marker>>,
    layers: LayerVisibility,
    popup_anchor: Option<MarkerId>,
    output: Arc<RwLock<PluginOutput>>,
}

impl MarkerPlugin {
    pub fn new(
        markers: Arc<Vec<Marker>>,
        layers: LayerVisibility,
        popup_anchor: Option<MarkerId>,
        output: Arc<RwLock<PluginOutput>>,
    ) -> Self {
        Self {
            markers,
            layers,
            popup_anchor,
            output,
        }
    }
}

impl Plugin for MarkerPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("MarkerPlugin::run");

        let painter = ui.painter();
        let mut targets = Vec::with_capacity(self.markers.len());

        // Creation order is drawing order: later markers end up on top
        for marker in self.markers.iter() {
            if !self.layers.shows(marker.action) {
                continue;
            }
            let position = walkers::lat_lon(marker.position.y(), marker.position.x());
            let screen = projector.project(position).to_pos2();
            if !response.rect.expand(PIN_HEIGHT).contains(screen) {
                continue;
            }
            draw_marker(painter, screen, &marker.icon);
            targets.push(target(marker.id, screen, &marker.icon));
        }

        if response
            .hover_pos()
            .and_then(|pos| pick_marker(&targets, pos))
            .is_some()
        {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        let clicked = if response.clicked() {
            response
                .interact_pointer_pos()
                .and_then(|pos| pick_marker(&targets, pos))
        } else {
            None
        };

        // The anchored marker may be off screen or hidden; follow it anyway
        let anchor = self.popup_anchor.and_then(|id| {
            let marker = self.markers.get(id.0)?;
            let position = walkers::lat_lon(marker.position.y(), marker.position.x());
            let screen = projector.project(position).to_pos2();
            Some(target(id, screen, &marker.icon).anchor)
        });

        // Use try_write for non-blocking UI polling.
        if let Ok(mut output) = self.output.try_write() {
            output.clicked = clicked;
            output.anchor = anchor;
        }
    }
}

fn draw_marker(painter: &egui::Painter, pos: Pos2, icon: &MarkerIcon) {
    match icon {
        MarkerIcon::Circle(symbol) => draw_circle(painter, pos, symbol),
        MarkerIcon::DefaultPin => draw_pin(painter, pos),
    }
}

fn draw_circle(painter: &egui::Painter, pos: Pos2, symbol: &CircleSymbol) {
    painter.circle(
        pos,
        symbol.scale,
        color(symbol.fill_color, symbol.fill_opacity),
        Stroke::new(symbol.stroke_weight, color(symbol.stroke_color, 1.0)),
    );
}

/// Teardrop pin with its tip at `tip`
fn draw_pin(painter: &egui::Painter, tip: Pos2) {
    let head = tip - vec2(0.0, PIN_HEIGHT - PIN_RADIUS);
    let shoulder = vec2(PIN_RADIUS * 0.87, PIN_RADIUS * 0.5);
    painter.add(Shape::convex_polygon(
        vec![head + vec2(-shoulder.x, shoulder.y), head + shoulder, tip],
        PIN_FILL,
        Stroke::new(1.0, PIN_OUTLINE),
    ));
    painter.circle(head, PIN_RADIUS, PIN_FILL, Stroke::new(1.0, PIN_OUTLINE));
    painter.circle_filled(head, PIN_RADIUS * 0.35, PIN_OUTLINE);
}

/// Click target of a marker drawn at `pos`
pub fn target(id: MarkerId, pos: Pos2, icon: &MarkerIcon) -> Target {
    match icon {
        MarkerIcon::Circle(symbol) => {
            let radius = symbol.scale + symbol.stroke_weight / 2.0;
            Target {
                id,
                center: pos,
                radius: radius.max(MIN_PICK_RADIUS),
                anchor: pos - vec2(0.0, radius),
            }
        }
        MarkerIcon::DefaultPin => Target {
            id,
            center: pos - vec2(0.0, PIN_HEIGHT - PIN_RADIUS),
            radius: (PIN_RADIUS + 2.0).max(MIN_PICK_RADIUS),
            anchor: pos - vec2(0.0, PIN_HEIGHT),
        },
    }
}

/// The marker under `pos`: the nearest target containing it, the topmost one on ties
pub fn pick_marker(targets: &[Target], pos: Pos2) -> Option<MarkerId> {
    let mut best: Option<(f32, MarkerId)> = None;
    for target in targets {
        let distance = target.center.distance(pos);
        if distance > target.radius {
            continue;
        }
        if best.is_none_or(|(best_distance, _)| distance <= best_distance) {
            best = Some((distance, target.id));
        }
    }
    best.map(|(_, id)| id)
}

/// `egui` color of an icon color with the given opacity
pub fn color(rgb: Rgb, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(rgb.0, rgb.1, rgb.2, alpha)
}
