// SPDX-License-Identifier: MIT OR Apache-2.0
//! Visible time range and the mapping between time and pixels.

use crate::settings::TimelineSettings;
use egui::Rect;

/// Default shown range for a new view (seconds)
const DEFAULT_SHOWN_RANGE: (f64, f64) = (0.0, 10.0);

/// Zoom factor bounds for accumulated wheel zoom
const MIN_WHEEL_ZOOM: f64 = 1e-7;
const MAX_WHEEL_ZOOM: f64 = 1e7;

/// Zoom reference kept between consecutive wheel events
#[derive(Debug, Clone, Copy, PartialEq)]
struct WheelFocus {
    pointer_x: f32,
    focal_time: f64,
    initial_range: (f64, f64),
    zoom_factor: f64,
}

/// The horizontal time axis of the clips area
#[derive(Debug, Clone, PartialEq)]
pub struct TimeArea {
    start: f64,
    end: f64,
    rect: Rect,
    /// Narrowest range a zoom may produce
    pub min_shown_range: f64,
    /// Latest time a zoom may show
    pub max_shown_time: f64,
    wheel_focus: Option<WheelFocus>,
}

impl TimeArea {
    /// Create a time area covering `rect`
    pub fn new(rect: Rect) -> Self {
        let defaults = TimelineSettings::default();
        Self {
            start: DEFAULT_SHOWN_RANGE.0,
            end: DEFAULT_SHOWN_RANGE.1,
            rect,
            min_shown_range: defaults.min_shown_range,
            max_shown_time: defaults.max_shown_time,
            wheel_focus: None,
        }
    }

    /// Take zoom limits from settings
    pub fn apply_settings(&mut self, settings: &TimelineSettings) {
        self.min_shown_range = settings.min_shown_range;
        self.max_shown_time = settings.max_shown_time;
    }

    /// Pixel rectangle of the clips area
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Resize the clips area
    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    /// Shown time range
    pub fn shown_range(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    /// Center of the shown range
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// Set the shown range; empty or reversed ranges are ignored
    pub fn set_shown_range(&mut self, start: f64, end: f64) -> bool {
        if !(start.is_finite() && end.is_finite()) || end <= start {
            return false;
        }
        self.start = start;
        self.end = end;
        true
    }

    /// Horizontal scale
    pub fn pixels_per_second(&self) -> f64 {
        f64::from(self.rect.width()) / (self.end - self.start)
    }

    /// X coordinate of a time
    pub fn time_to_pixel(&self, time: f64) -> f32 {
        (f64::from(self.rect.left()) + (time - self.start) * self.pixels_per_second()) as f32
    }

    /// Time at an x coordinate
    pub fn pixel_to_time(&self, x: f32) -> f64 {
        self.start + f64::from(x - self.rect.left()) / self.pixels_per_second()
    }

    /// Duration covered by a pixel width
    pub fn pixel_delta_to_time(&self, dx: f32) -> f64 {
        f64::from(dx) / self.pixels_per_second()
    }

    /// Whether a time lies inside the shown range
    pub fn is_time_visible(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    /// Zoom about `focal_time`, starting from `reference`.
    ///
    /// Results narrower than the minimum range are rejected. Returns whether
    /// the shown range changed.
    pub fn zoom_from(&mut self, factor: f64, reference: (f64, f64), focal_time: f64) -> bool {
        if factor <= 0.0 {
            return false;
        }
        let start = (reference.0 + focal_time * (factor - 1.0)) / factor;
        let end = (reference.1 + focal_time * (factor - 1.0)) / factor;

        if (end - start).abs() <= self.min_shown_range {
            return false;
        }
        let before = self.shown_range();
        self.set_shown_range(start.max(0.0), end.min(self.max_shown_time));
        before != self.shown_range()
    }

    /// Zoom about the center of the view
    pub fn zoom(&mut self, factor: f64) -> bool {
        let reference = self.shown_range();
        let changed = self.zoom_from(factor, reference, self.center());
        self.invalidate_wheel_zoom();
        changed
    }

    /// Zoom about the time at `pointer_x`
    pub fn zoom_at(&mut self, factor: f64, pointer_x: f32) -> bool {
        let reference = self.shown_range();
        let changed = self.zoom_from(factor, reference, self.pixel_to_time(pointer_x));
        self.invalidate_wheel_zoom();
        changed
    }

    /// Forget the wheel zoom reference
    pub fn invalidate_wheel_zoom(&mut self) {
        self.wheel_focus = None;
    }

    /// Zoom with the mouse wheel at `pointer_x`; positive `dy` zooms out.
    ///
    /// Consecutive wheel events accumulate their factor against the range
    /// captured when the pointer last came to rest.
    pub fn wheel_zoom(&mut self, pointer_x: f32, dy: f32) -> bool {
        if dy.abs() < 1e-5 {
            return false;
        }

        let focus = match self.wheel_focus {
            Some(focus) if (focus.pointer_x - pointer_x).abs() <= 1.0 => focus,
            _ => WheelFocus {
                pointer_x,
                focal_time: self.pixel_to_time(pointer_x),
                initial_range: self.shown_range(),
                zoom_factor: 1.0,
            },
        };

        let new_zoom = (focus.zoom_factor * (1.0 - f64::from(dy) * 0.02)).clamp(MIN_WHEEL_ZOOM, MAX_WHEEL_ZOOM);
        let changed = self.zoom_from(new_zoom, focus.initial_range, focus.focal_time);

        self.wheel_focus = Some(WheelFocus {
            zoom_factor: if changed { new_zoom } else { focus.zoom_factor },
            ..focus
        });
        true
    }

    /// Pan by a horizontal pixel delta; dragging right reveals earlier time
    pub fn offset(&mut self, dx: f32) {
        let delta = self.pixel_delta_to_time(dx);
        self.start -= delta;
        self.end -= delta;
    }

    /// Show `[start, end]` with `padding` (fraction of the span) on each side.
    ///
    /// A single instant keeps the current zoom and is centered instead.
    pub fn frame_range(&mut self, start: f64, end: f64, padding: f64) {
        if start > end {
            return;
        }

        let span = end - start.max(0.0);
        if span > 0.0 {
            self.set_shown_range((start - span * padding).max(-10.0), end + span * padding);
        } else {
            let width = self.end - self.start;
            self.set_shown_range(start - width / 2.0, start + width / 2.0);
        }
        self.invalidate_wheel_zoom();
    }

    /// Pan so `time` is inside the view, keeping the zoom
    pub fn ensure_visible(&mut self, time: f64) {
        if self.is_time_visible(time) {
            return;
        }
        let width = self.end - self.start;
        let margin = width * 0.1;
        if time < self.start {
            self.set_shown_range(time - margin, time - margin + width);
        } else {
            self.set_shown_range(time + margin - width, time + margin);
        }
    }
}

impl Default for TimeArea {
    fn default() -> Self {
        Self::new(Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(1000.0, 400.0)))
    }
}

/// Round a time to the nearest frame
pub fn snap_to_frame(time: f64, frame_rate: f64) -> f64 {
    if frame_rate <= 0.0 {
        return time;
    }
    (time * frame_rate).round() / frame_rate
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(start: f64, end: f64) -> TimeArea {
        let mut area = TimeArea::default();
        area.set_shown_range(start, end);
        area
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_time_pixel_mapping() {
        let area = area(0.0, 10.0);
        assert_eq!(area.pixels_per_second(), 100.0);
        assert_eq!(area.time_to_pixel(2.5), 250.0);
        assert!(approx(area.pixel_to_time(750.0), 7.5));
    }

    #[test]
    fn test_zoom_in_about_focal_time() {
        let mut area = area(0.0, 100.0);
        assert!(area.zoom_from(1.15, (0.0, 100.0), 50.0));
        let (start, end) = area.shown_range();
        assert!(end - start < 100.0);
        assert!(approx((50.0 - start) / (end - start), 0.5));
    }

    #[test]
    fn test_zoom_rejects_too_narrow() {
        let mut area = area(10.0, 10.06);
        assert!(!area.zoom(2.0));
        assert_eq!(area.shown_range(), (10.0, 10.06));
    }

    #[test]
    fn test_zoom_out_clamped_at_zero() {
        let mut area = area(1.0, 11.0);
        area.zoom(0.5);
        assert_eq!(area.shown_range().0, 0.0);
    }

    #[test]
    fn test_frame_range_padding() {
        let mut area = area(0.0, 1.0);
        area.frame_range(2.0, 10.0, 0.1);
        let (start, end) = area.shown_range();
        assert!(approx(start, 1.2));
        assert!(approx(end, 10.8));
    }

    #[test]
    fn test_frame_single_instant_keeps_zoom() {
        let mut area = area(0.0, 4.0);
        area.frame_range(10.0, 10.0, 0.1);
        assert_eq!(area.shown_range(), (8.0, 12.0));
    }

    #[test]
    fn test_wheel_zoom_accumulates_until_pointer_moves() {
        let mut area = area(0.0, 10.0);
        assert!(area.wheel_zoom(500.0, -5.0));
        let first = area.shown_range();
        assert!(area.wheel_zoom(500.5, -5.0));
        let second = area.shown_range();
        assert!(second.1 - second.0 < first.1 - first.0);
        // Zoom factor 1.1 then 1.21 against the same reference range
        assert!(approx(second.1 - second.0, 10.0 / 1.21));
    }

    #[test]
    fn test_offset_pans() {
        let mut area = area(5.0, 15.0);
        area.offset(100.0);
        assert!(approx(area.shown_range().0, 4.0));
    }

    #[test]
    fn test_ensure_visible() {
        let mut area = area(0.0, 10.0);
        area.ensure_visible(25.0);
        assert!(area.is_time_visible(25.0));
        assert!(approx(area.shown_range().1 - area.shown_range().0, 10.0));
    }

    #[test]
    fn test_snap_to_frame() {
        assert!(approx(snap_to_frame(1.01, 30.0), 1.0));
        assert!(approx(snap_to_frame(1.02, 30.0), 1.0 + 1.0 / 30.0));
    }
}
