//! Result overlay rendering.
//!
//! Draws the captured still at its native aspect ratio with a vector
//! layer whose coordinate space equals the server-reported image size,
//! so line and mount coordinates (original-image pixels) map through one
//! rect transform and stay exactly co-registered with the image at any
//! window size.

use crate::analysis::{AnalysisResult, ImageSize};
use eframe::egui;
use egui::emath::RectTransform;

/// Seconds of the one-time fade-in when the overlay first appears.
const FADE_SECONDS: f64 = 1.0;

/// Stroke widths in original-image pixels.
const SELECTED_STROKE: f32 = 22.0;
const NORMAL_STROKE: f32 = 10.0;

/// Mount marker radius and glyph size in original-image pixels.
const MOUNT_RADIUS: f32 = 50.0;
const MOUNT_GLYPH_SIZE: f32 = 32.0;

/// Opacity of non-selected lines while a selection is active.
const DIMMED_OPACITY: f32 = 0.05;

/// Region names mapped to their display glyphs. Server-side naming is
/// inconsistent (some names arrive pre-translated), so unknown names
/// render as-is.
const MOUNT_GLYPHS: &[(&str, &str)] = &[
    ("금", "金"),
    ("목성", "木"),
    ("토성", "土"),
    ("태양", "日"),
    ("수성", "水"),
    ("제2화성", "火"),
    ("월구", "月"),
    ("地", "地"),
    ("火", "火"),
];

/// Display glyph for a mount region, falling back to the raw name.
pub fn mount_glyph(name: &str) -> &str {
    MOUNT_GLYPHS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, glyph)| *glyph)
        .unwrap_or(name)
}

/// The line highlighted by the active report card, if that card maps to
/// a line. Selection is derived from one index, so at most one line is
/// ever selected.
pub fn selected_line(result: &AnalysisResult, active_index: usize) -> Option<&str> {
    result.lines.get(active_index).map(|l| l.name.as_str())
}

/// A line renders at full opacity when nothing is selected or it is the
/// selection itself; every other line dims to near-invisible.
pub fn is_focused(selected: Option<&str>, name: &str) -> bool {
    selected.is_none() || selected == Some(name)
}

/// Mount markers are visible only while no line is selected.
pub fn mounts_visible(selected: Option<&str>) -> bool {
    selected.is_none()
}

/// Aspect-fits the image into the available rect, centered (the SVG
/// `xMidYMid meet` behavior).
pub fn fit_rect(avail: egui::Rect, size: ImageSize) -> egui::Rect {
    if size.width == 0 || size.height == 0 {
        return avail;
    }
    let image_aspect = size.width as f32 / size.height as f32;
    let avail_aspect = avail.width() / avail.height();

    let fitted = if image_aspect > avail_aspect {
        egui::vec2(avail.width(), avail.width() / image_aspect)
    } else {
        egui::vec2(avail.height() * image_aspect, avail.height())
    };
    egui::Rect::from_center_size(avail.center(), fitted)
}

/// Renders the captured image plus the line/mount vector layer with
/// selection-driven focus state.
pub struct OverlayRenderer {
    first_shown: Option<f64>,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self { first_shown: None }
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        texture: &egui::TextureHandle,
        result: &AnalysisResult,
        selected: Option<&str>,
    ) {
        let avail = ui.available_rect_before_wrap();
        let rect = fit_rect(avail, result.image_size);

        // One-time fade on first display, not on selection changes.
        let now = ui.input(|i| i.time);
        let first = *self.first_shown.get_or_insert(now);
        let fade = (((now - first) / FADE_SECONDS).clamp(0.0, 1.0)) as f32;
        if fade < 1.0 {
            ui.ctx().request_repaint();
        }

        let painter = ui.painter_at(avail);

        // Background still, dimmed while a line is in focus.
        let tint = if selected.is_some() {
            egui::Color32::WHITE.gamma_multiply(0.3)
        } else {
            egui::Color32::WHITE
        };
        painter.image(
            texture.id(),
            rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            tint,
        );

        // Vector layer: one transform from server pixel space to screen.
        let image_space = egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(result.image_size.width as f32, result.image_size.height as f32),
        );
        let to_screen = RectTransform::from_to(image_space, rect);
        let scale = rect.width() / image_space.width();

        for line in &result.lines {
            let is_selected = selected == Some(line.name.as_str());
            let opacity = if is_focused(selected, &line.name) {
                fade
            } else {
                DIMMED_OPACITY
            };

            let points: Vec<egui::Pos2> = line
                .points
                .iter()
                .map(|p| to_screen.transform_pos(egui::pos2(p[0], p[1])))
                .collect();
            if points.len() < 2 {
                continue;
            }

            let base_width = if is_selected {
                SELECTED_STROKE
            } else {
                NORMAL_STROKE
            };
            let width = base_width * scale;

            if is_selected {
                // Glow pass under the highlight stroke.
                painter.add(egui::Shape::line(
                    points.clone(),
                    egui::Stroke::new(
                        width * 2.0,
                        egui::Color32::WHITE.gamma_multiply(0.25 * opacity),
                    ),
                ));
            }

            let color = if is_selected {
                egui::Color32::WHITE
            } else {
                egui::Color32::from_rgb(line.color[0], line.color[1], line.color[2])
            };
            painter.add(egui::Shape::line(
                points,
                egui::Stroke::new(width, color.gamma_multiply(opacity)),
            ));
        }

        // Mount markers are shown only while no line is in focus.
        if mounts_visible(selected) {
            for (name, point) in &result.mounts {
                let center = to_screen.transform_pos(egui::pos2(point[0], point[1]));
                painter.circle(
                    center,
                    MOUNT_RADIUS * scale,
                    egui::Color32::from_black_alpha(51).gamma_multiply(fade),
                    egui::Stroke::new(
                        2.0 * scale,
                        egui::Color32::from_black_alpha(128).gamma_multiply(fade),
                    ),
                );
                painter.text(
                    center,
                    egui::Align2::CENTER_CENTER,
                    mount_glyph(name),
                    egui::FontId::proportional(MOUNT_GLYPH_SIZE * scale),
                    egui::Color32::WHITE.gamma_multiply(fade),
                );
            }
        }
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Line;
    use std::collections::BTreeMap;

    fn result_with_lines(names: &[&str]) -> AnalysisResult {
        AnalysisResult {
            lines: names
                .iter()
                .map(|n| Line {
                    name: n.to_string(),
                    label: n.to_string(),
                    color: [255, 0, 0],
                    points: vec![[0.0, 0.0], [100.0, 100.0]],
                })
                .collect(),
            mounts: BTreeMap::new(),
            report: String::new(),
            image_size: ImageSize {
                width: 1280,
                height: 720,
            },
        }
    }

    #[test]
    fn selection_is_exclusive() {
        let result = result_with_lines(&["life", "head", "fate"]);

        let selected = selected_line(&result, 1);
        assert_eq!(selected, Some("head"));
        let selected_count = result
            .lines
            .iter()
            .filter(|l| selected == Some(l.name.as_str()))
            .count();
        assert_eq!(selected_count, 1);

        // Selecting another card moves the selection, it never adds one.
        let reselected = selected_line(&result, 2);
        assert_eq!(reselected, Some("fate"));
        assert_ne!(reselected, Some("head"));
    }

    #[test]
    fn card_beyond_line_count_selects_nothing() {
        let result = result_with_lines(&["life"]);
        assert_eq!(selected_line(&result, 5), None);
    }

    #[test]
    fn fit_rect_preserves_aspect_and_centers() {
        let avail = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(640.0, 640.0));
        let size = ImageSize {
            width: 1280,
            height: 720,
        };

        let rect = fit_rect(avail, size);
        assert!((rect.width() - 640.0).abs() < 0.01);
        assert!((rect.height() - 360.0).abs() < 0.01);
        assert_eq!(rect.center(), avail.center());
    }

    #[test]
    fn fit_rect_when_viewport_equals_image_size_is_identity() {
        let avail = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(1280.0, 720.0));
        let size = ImageSize {
            width: 1280,
            height: 720,
        };
        let rect = fit_rect(avail, size);
        assert_eq!(rect, avail);

        // With an identical viewport the transform applies no rescale.
        let to_screen = RectTransform::from_to(
            egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1280.0, 720.0)),
            rect,
        );
        let mapped = to_screen.transform_pos(egui::pos2(321.0, 123.0));
        assert_eq!(mapped, egui::pos2(321.0, 123.0));
    }

    #[test]
    fn unknown_mount_names_pass_through() {
        assert_eq!(mount_glyph("목성"), "木");
        assert_eq!(mount_glyph("火"), "火");
        assert_eq!(mount_glyph("unknown-region"), "unknown-region");
    }
}
