// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline window widget: track headers, ruler, clips, markers and playhead.

use crate::layer::ClipsLayer;
use crate::manipulators::{events_from_egui, ManipulatorStack};
use crate::menu::context_menu;
use crate::rows::{INDENT_WIDTH, RULER_HEIGHT};
use crate::state::WindowState;
use crate::track::TrackKind;
use egui::{Color32, Pos2, Rect, Sense, Stroke};

/// Interactive view over a [`WindowState`]
pub struct TimelineView {
    layer: ClipsLayer,
    manipulators: ManipulatorStack,
    menu_pointer: Option<Pos2>,
}

impl TimelineView {
    /// Create a view with the default manipulators
    pub fn new() -> Self {
        Self {
            layer: ClipsLayer::new(),
            manipulators: ManipulatorStack::new(),
            menu_pointer: None,
        }
    }

    /// Clips layer as last laid out
    pub fn layer(&self) -> &ClipsLayer {
        &self.layer
    }

    /// Show the timeline filling the available space
    pub fn show(&mut self, ui: &mut egui::Ui, state: &mut WindowState) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        if state.rows.rect() != rect {
            state.set_window_rect(rect);
        }

        if response.hovered() {
            let events = ui.input(events_from_egui);
            let mut changed = false;
            for event in &events {
                changed |= self.manipulators.handle(state, event);
            }
            if changed {
                state.refresh();
            }
        }

        if response.secondary_clicked() {
            self.menu_pointer = response.interact_pointer_pos();
        }

        self.layer.rebuild(state);

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(30));
        self.draw_headers(&painter, state);
        self.draw_ruler(&painter, state);
        self.layer.draw(&painter, state);
        self.draw_markers(&painter, state);
        self.draw_playhead(&painter, state);

        if let Some(pointer) = self.menu_pointer {
            response.context_menu(|ui| {
                if context_menu(ui, state, pointer).is_some() {
                    self.menu_pointer = None;
                }
            });
        }
    }

    fn draw_headers(&self, painter: &egui::Painter, state: &WindowState) {
        let header_right = state.time_area.rect().left();
        for row in state.rows.rows() {
            let Some(track) = state.project.track(row.track) else {
                continue;
            };
            let header = Rect::from_x_y_ranges(row.rect.left()..=header_right, row.rect.y_range());
            let fill = if state.selection.contains_track(row.track) {
                Color32::from_rgb(60, 80, 110)
            } else {
                Color32::from_gray(45)
            };
            painter.rect_filled(header.shrink(1.0), 2.0, fill);

            let color = track.effective_color();
            let swatch = Rect::from_min_size(header.min, egui::vec2(4.0, header.height()));
            painter.rect_filled(swatch, 0.0, Color32::from_rgb(color[0], color[1], color[2]));

            let mut name = track.name.clone();
            if track.kind == TrackKind::Group {
                name = format!("{} {}", if track.collapsed { "▸" } else { "▾" }, name);
            }
            if track.locked {
                name.push_str(" (locked)");
            }
            let text_color = if track.muted {
                Color32::from_gray(120)
            } else {
                Color32::from_gray(220)
            };
            painter.text(
                Pos2::new(header.left() + 10.0 + row.depth as f32 * INDENT_WIDTH, header.center().y),
                egui::Align2::LEFT_CENTER,
                name,
                egui::FontId::proportional(12.0),
                text_color,
            );
        }
    }

    fn draw_ruler(&self, painter: &egui::Painter, state: &WindowState) {
        let area = state.time_area.rect();
        let ruler = Rect::from_x_y_ranges(area.x_range(), area.top()..=area.top() + RULER_HEIGHT);
        painter.rect_filled(ruler, 0.0, Color32::from_gray(40));

        let (start, end) = state.time_area.shown_range();
        let step = tick_step(end - start);
        let mut tick = (start / step).ceil() * step;
        while tick <= end {
            let x = state.time_area.time_to_pixel(tick);
            painter.line_segment(
                [Pos2::new(x, ruler.bottom() - 8.0), Pos2::new(x, ruler.bottom())],
                Stroke::new(1.0, Color32::from_gray(140)),
            );
            painter.text(
                Pos2::new(x + 2.0, ruler.top() + 4.0),
                egui::Align2::LEFT_TOP,
                format!("{:.2}", tick),
                egui::FontId::monospace(10.0),
                Color32::from_gray(170),
            );
            tick += step;
        }
    }

    fn draw_markers(&self, painter: &egui::Painter, state: &WindowState) {
        let painter = painter.with_clip_rect(state.time_area.rect());
        for row in state.rows.rows() {
            let Some(track) = state.project.track(row.track) else {
                continue;
            };
            for marker in &track.markers {
                let center = Pos2::new(state.time_area.time_to_pixel(marker.time), row.rect.center().y);
                let fill = if state.selection.contains_item(marker.id) {
                    Color32::WHITE
                } else {
                    Color32::from_rgb(230, 190, 80)
                };
                let points = vec![
                    center + egui::vec2(0.0, -6.0),
                    center + egui::vec2(6.0, 0.0),
                    center + egui::vec2(0.0, 6.0),
                    center + egui::vec2(-6.0, 0.0),
                ];
                painter.add(egui::Shape::convex_polygon(points, fill, Stroke::NONE));
            }
        }
    }

    fn draw_playhead(&self, painter: &egui::Painter, state: &WindowState) {
        let area = state.time_area.rect();
        if !state.time_area.is_time_visible(state.time) {
            return;
        }
        let x = state.time_area.time_to_pixel(state.time);
        painter.line_segment(
            [Pos2::new(x, area.top()), Pos2::new(x, area.bottom())],
            Stroke::new(1.5, Color32::from_rgb(220, 60, 60)),
        );
    }
}

impl Default for TimelineView {
    fn default() -> Self {
        Self::new()
    }
}

/// Ruler tick spacing giving roughly ten ticks over `span` seconds
fn tick_step(span: f64) -> f64 {
    if span <= 0.0 {
        return 1.0;
    }
    let raw = span / 10.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized < 1.5 {
        1.0
    } else if normalized < 3.5 {
        2.0
    } else if normalized < 7.5 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_step() {
        assert_eq!(tick_step(10.0), 1.0);
        assert_eq!(tick_step(100.0), 10.0);
        assert!((tick_step(0.5) - 0.05).abs() < 1e-12);
        assert_eq!(tick_step(0.0), 1.0);
    }
}
