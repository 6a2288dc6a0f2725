//! Wire-level result types returned by the analysis service.
//!
//! Coordinates in [`Line::points`] and [`AnalysisResult::mounts`] are in
//! original-image pixels; [`AnalysisResult::image_size`] defines that
//! coordinate space. The overlay renders against it directly, so no
//! client-side rescaling of individual points is ever required.

use serde::Deserialize;
use std::collections::BTreeMap;

/// One named palm line (life, head, heart, fate, ...) with its
/// server-assigned color and ordered polyline points.
#[derive(Debug, Clone, Deserialize)]
pub struct Line {
    /// Stable identifier, unique within a result.
    pub name: String,
    /// Human-readable title.
    pub label: String,
    /// RGB triple.
    pub color: [u8; 3],
    /// Polyline vertices in original-image pixels. Drawn in the given
    /// order, never resorted.
    pub points: Vec<[f32; 2]>,
}

/// Pixel dimensions of the image the server analyzed.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Full analysis payload.
///
/// The order of [`lines`](Self::lines) is semantically meaningful: it
/// defines the canonical order of report cards.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisResult {
    pub lines: Vec<Line>,
    /// Point-of-interest regions, keyed by region name.
    pub mounts: BTreeMap<String, [f32; 2]>,
    /// Narrative report as a loosely structured HTML blob.
    pub report: String,
    pub image_size: ImageSize,
}

impl AnalysisResult {
    /// Canonical line-name order, used to sequence report cards.
    pub fn line_order(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_wire_shape() {
        let json = r#"{
            "lines": [
                {"name": "life", "label": "생명선 Life", "color": [220, 40, 40],
                 "points": [[10.0, 20.0], [30.5, 44.0]]}
            ],
            "mounts": {"목성": [120.0, 80.0]},
            "report": "<div></div>",
            "image_size": {"width": 1280, "height": 720}
        }"#;

        let result: AnalysisResult = serde_json::from_str(json).expect("valid payload");
        assert_eq!(result.lines.len(), 1);
        assert_eq!(result.lines[0].name, "life");
        assert_eq!(result.lines[0].color, [220, 40, 40]);
        assert_eq!(result.lines[0].points[1], [30.5, 44.0]);
        assert_eq!(result.mounts["목성"], [120.0, 80.0]);
        assert_eq!(result.image_size.width, 1280);
        assert_eq!(result.line_order(), vec!["life"]);
    }
}
