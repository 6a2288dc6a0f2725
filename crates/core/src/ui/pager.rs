//! Report pager: a horizontally swipeable card strip and a vertically
//! draggable bottom sheet, both rendering one shared `active_index`.
//!
//! The two interaction surfaces never own a private copy of the
//! selection: the strip settles to an index, the chips set it, and the
//! sheet reads it. Vertical drag only changes the sheet height;
//! horizontal movement only changes the index.

use crate::report::ReportCard;
use eframe::egui;

/// Drag displacement (points) past which a sheet release snaps.
pub const SHEET_DRAG_DISTANCE: f32 = 50.0;
/// Drag velocity (points/sec) past which a sheet release snaps.
pub const SHEET_DRAG_VELOCITY: f32 = 200.0;

/// Sheet height in the collapsed preset.
const COLLAPSED_HEIGHT: f32 = 140.0;

/// Height presets of the bottom sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetHeight {
    Collapsed,
    Half,
    Expanded,
}

/// Pages through report cards while keeping the strip and the sheet in
/// lock-step.
pub struct ReportPager {
    cards: Vec<ReportCard>,
    active_index: usize,
    sheet: SheetHeight,
    // Interaction accumulators for the current gesture.
    strip_drag: f32,
    sheet_drag: f32,
}

impl ReportPager {
    pub fn new(cards: Vec<ReportCard>) -> Self {
        Self {
            cards,
            active_index: 0,
            sheet: SheetHeight::Collapsed,
            strip_drag: 0.0,
            sheet_drag: 0.0,
        }
    }

    pub fn cards(&self) -> &[ReportCard] {
        &self.cards
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn active_card(&self) -> Option<&ReportCard> {
        self.cards.get(self.active_index)
    }

    pub fn sheet(&self) -> SheetHeight {
        self.sheet
    }

    /// Sets the active index, clamped into range. Sheet height is
    /// untouched.
    pub fn set_active(&mut self, index: usize) {
        if self.cards.is_empty() {
            self.active_index = 0;
        } else {
            self.active_index = index.min(self.cards.len() - 1);
        }
    }

    /// Maps a settled horizontal scroll position to the nearest card and
    /// makes it active.
    pub fn settle(&mut self, scroll_x: f32, card_width: f32) {
        if self.cards.is_empty() {
            return;
        }
        let card_width = if card_width > 0.0 { card_width } else { 1.0 };
        let index = (scroll_x / card_width).round().max(0.0) as usize;
        self.set_active(index);
    }

    /// Applies a sheet drag release: past the displacement or velocity
    /// threshold upward promotes to expanded, downward demotes to
    /// collapsed; otherwise the preset is kept.
    pub fn drag_release(&mut self, dy: f32, vy: f32) {
        if dy < -SHEET_DRAG_DISTANCE || vy < -SHEET_DRAG_VELOCITY {
            self.sheet = SheetHeight::Expanded;
        } else if dy > SHEET_DRAG_DISTANCE || vy > SHEET_DRAG_VELOCITY {
            self.sheet = SheetHeight::Collapsed;
        }
    }

    /// Tap on the handle/header: expands from collapsed, collapses
    /// otherwise.
    pub fn tap_handle(&mut self) {
        self.sheet = if self.sheet == SheetHeight::Collapsed {
            SheetHeight::Expanded
        } else {
            SheetHeight::Collapsed
        };
    }

    /// Explicit collapse control (shown only while expanded).
    pub fn collapse(&mut self) {
        self.sheet = SheetHeight::Collapsed;
    }

    /// Renders chips, card strip and bottom sheet into `ui`.
    pub fn show(&mut self, ui: &mut egui::Ui) {
        if self.cards.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(
                    egui::RichText::new("No report sections were recognized.")
                        .color(egui::Color32::GRAY),
                );
            });
            return;
        }

        ui.add_space(8.0);
        ui.label(
            egui::RichText::new("← swipe to browse the lines →")
                .small()
                .color(egui::Color32::GRAY),
        );

        self.show_chips(ui);

        let avail = ui.available_height();
        let sheet_height = match self.sheet {
            SheetHeight::Collapsed => COLLAPSED_HEIGHT.min(avail * 0.5),
            SheetHeight::Half => avail * 0.5,
            SheetHeight::Expanded => avail * 0.85,
        };

        self.show_strip(ui, avail - sheet_height);
        self.show_sheet(ui, sheet_height);
    }

    fn show_chips(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::horizontal()
            .id_salt("report_chips")
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let mut picked = None;
                    for (i, card) in self.cards.iter().enumerate() {
                        let chip = card
                            .label
                            .split_whitespace()
                            .next()
                            .unwrap_or(card.key.as_str());
                        if ui.selectable_label(i == self.active_index, chip).clicked() {
                            picked = Some(i);
                        }
                    }
                    if let Some(i) = picked {
                        self.set_active(i);
                    }
                });
            });
    }

    fn show_strip(&mut self, ui: &mut egui::Ui, height: f32) {
        let size = egui::vec2(ui.available_width(), height.max(40.0));
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::drag());

        if response.dragged() {
            self.strip_drag += response.drag_delta().x;
        }
        if response.drag_stopped() {
            // A settled swipe is a virtual scroll away from the active
            // card's resting position.
            let scroll_x = self.active_index as f32 * rect.width() - self.strip_drag;
            self.settle(scroll_x, rect.width());
            self.strip_drag = 0.0;
        }

        if let Some(card) = self.cards.get(self.active_index) {
            let painter = ui.painter();
            painter.text(
                rect.center() - egui::vec2(0.0, 10.0),
                egui::Align2::CENTER_CENTER,
                &card.label,
                egui::FontId::proportional(18.0),
                ui.visuals().strong_text_color(),
            );
            painter.text(
                rect.center() + egui::vec2(0.0, 14.0),
                egui::Align2::CENTER_CENTER,
                "↓ pull the card up for details",
                egui::FontId::proportional(11.0),
                egui::Color32::GRAY,
            );
        }
    }

    fn show_sheet(&mut self, ui: &mut egui::Ui, height: f32) {
        let expanded = self.sheet == SheetHeight::Expanded;

        egui::Frame::group(ui.style())
            .fill(ui.visuals().panel_fill)
            .show(ui, |ui| {
                ui.set_min_height(height);
                ui.set_max_height(height);

                // Drag handle: draggable for presets, tappable to toggle.
                let handle_size = egui::vec2(ui.available_width(), 18.0);
                let (handle_rect, handle) =
                    ui.allocate_exact_size(handle_size, egui::Sense::click_and_drag());
                ui.painter().rect_filled(
                    egui::Rect::from_center_size(handle_rect.center(), egui::vec2(48.0, 5.0)),
                    2.5,
                    egui::Color32::GRAY,
                );

                if handle.dragged() {
                    self.sheet_drag += handle.drag_delta().y;
                }
                if handle.drag_stopped() {
                    let vy = ui.input(|i| i.pointer.velocity().y);
                    self.drag_release(self.sheet_drag, vy);
                    self.sheet_drag = 0.0;
                }
                if handle.clicked() {
                    self.tap_handle();
                }

                let mut collapse_clicked = false;
                ui.horizontal(|ui| {
                    let title = self
                        .active_card()
                        .map(|c| c.label.as_str())
                        .unwrap_or("Palm report");
                    ui.heading(title);
                    if expanded {
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("⌄").clicked() {
                                collapse_clicked = true;
                            }
                        });
                    }
                });
                if collapse_clicked {
                    self.collapse();
                }

                if self.sheet == SheetHeight::Collapsed {
                    ui.label(
                        egui::RichText::new("↑ pull up or tap for the full reading")
                            .small()
                            .color(egui::Color32::GRAY),
                    );
                } else if let Some(card) = self.active_card() {
                    let text = card.content_text();
                    egui::ScrollArea::vertical()
                        .id_salt("sheet_content")
                        .show(ui, |ui| {
                            ui.label(text);
                        });
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(n: usize) -> Vec<ReportCard> {
        (0..n)
            .map(|i| ReportCard {
                key: format!("k{}", i),
                label: format!("card {}", i),
                content_html: format!("<b>{}</b>", i),
                full_html: String::new(),
            })
            .collect()
    }

    #[test]
    fn set_active_moves_index_and_leaves_sheet_alone() {
        let mut pager = ReportPager::new(cards(4));
        pager.tap_handle();
        assert_eq!(pager.sheet(), SheetHeight::Expanded);

        pager.set_active(2);
        assert_eq!(pager.active_index(), 2);
        assert_eq!(pager.sheet(), SheetHeight::Expanded, "height unaffected");
    }

    #[test]
    fn set_active_clamps_into_range() {
        let mut pager = ReportPager::new(cards(3));
        pager.set_active(99);
        assert_eq!(pager.active_index(), 2);

        let mut empty = ReportPager::new(Vec::new());
        empty.set_active(5);
        assert_eq!(empty.active_index(), 0);
    }

    #[test]
    fn settle_picks_the_nearest_card() {
        let mut pager = ReportPager::new(cards(4));
        pager.set_active(2);

        pager.settle(0.0, 320.0);
        assert_eq!(pager.active_index(), 0, "dragging back to the start");

        pager.settle(650.0, 320.0);
        assert_eq!(pager.active_index(), 2);

        pager.settle(10_000.0, 320.0);
        assert_eq!(pager.active_index(), 3, "overshoot clamps to last card");
    }

    #[test]
    fn settle_tolerates_degenerate_card_width() {
        let mut pager = ReportPager::new(cards(2));
        pager.settle(0.4, 0.0);
        assert_eq!(pager.active_index(), 0);
    }

    #[test]
    fn drag_release_thresholds() {
        let mut pager = ReportPager::new(cards(1));

        pager.drag_release(-60.0, 0.0);
        assert_eq!(pager.sheet(), SheetHeight::Expanded, "distance promotes");

        pager.drag_release(60.0, 0.0);
        assert_eq!(pager.sheet(), SheetHeight::Collapsed, "distance demotes");

        pager.drag_release(-10.0, -250.0);
        assert_eq!(pager.sheet(), SheetHeight::Expanded, "velocity promotes");

        pager.drag_release(10.0, 250.0);
        assert_eq!(pager.sheet(), SheetHeight::Collapsed, "velocity demotes");

        pager.drag_release(-10.0, -50.0);
        assert_eq!(
            pager.sheet(),
            SheetHeight::Collapsed,
            "sub-threshold release keeps the preset"
        );
    }

    #[test]
    fn vertical_drag_never_changes_the_index() {
        let mut pager = ReportPager::new(cards(3));
        pager.set_active(1);
        pager.drag_release(-500.0, -500.0);
        pager.drag_release(500.0, 500.0);
        assert_eq!(pager.active_index(), 1);
    }

    #[test]
    fn tap_handle_toggles_between_collapsed_and_expanded() {
        let mut pager = ReportPager::new(cards(1));
        pager.tap_handle();
        assert_eq!(pager.sheet(), SheetHeight::Expanded);
        pager.tap_handle();
        assert_eq!(pager.sheet(), SheetHeight::Collapsed);
    }
}
