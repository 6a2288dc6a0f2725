//! Scene forms preceding capture: login splash, profile entry and mode
//! choice. Plain validation; the profile guard itself lives in
//! [`crate::scene::Profile::is_complete`].

use crate::scene::{CaptureMode, Gender, Hand, Profile};
use eframe::egui;

/// Outcome of rendering a form for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormEvent {
    None,
    Next,
    Back,
}

/// Outcome of the mode-choice scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModeEvent {
    None,
    Pick(CaptureMode),
    Back,
}

pub(crate) fn login(ui: &mut egui::Ui) -> FormEvent {
    let mut event = FormEvent::None;
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.25);
        ui.heading("Palm & Face");
        ui.label(egui::RichText::new("I knew you would come.").color(egui::Color32::GRAY));
        ui.add_space(40.0);
        if ui
            .add(egui::Button::new("Start").min_size(egui::vec2(200.0, 44.0)))
            .clicked()
        {
            event = FormEvent::Next;
        }
    });
    event
}

pub(crate) fn profile(ui: &mut egui::Ui, profile: &mut Profile) -> FormEvent {
    let mut event = FormEvent::None;

    ui.vertical_centered(|ui| {
        ui.add_space(24.0);
        ui.heading("Tell us about you");
        ui.add_space(16.0);

        ui.add(
            egui::TextEdit::singleline(&mut profile.name)
                .hint_text("Your name")
                .desired_width(240.0),
        );

        ui.add_space(8.0);
        let birth_response = ui.add(
            egui::TextEdit::singleline(&mut profile.birth)
                .hint_text("Birth date (YYYYMMDD)")
                .desired_width(240.0),
        );
        if birth_response.changed() {
            // Digits only, capped at 8.
            profile.birth.retain(|c| c.is_ascii_digit());
            profile.birth.truncate(8);
        }
        if !profile.birth.is_empty() && profile.birth.len() != 8 {
            ui.label(
                egui::RichText::new("* enter 8 digits")
                    .small()
                    .color(egui::Color32::RED),
            );
        }

        ui.add_space(12.0);
        ui.label(egui::RichText::new("Gender").small().color(egui::Color32::GRAY));
        ui.horizontal(|ui| {
            for (value, label) in [(Gender::Male, "Male"), (Gender::Female, "Female")] {
                if ui
                    .selectable_label(profile.gender == Some(value), label)
                    .clicked()
                {
                    profile.gender = Some(value);
                }
            }
        });

        ui.add_space(12.0);
        ui.label(
            egui::RichText::new("Dominant hand")
                .small()
                .color(egui::Color32::GRAY),
        );
        ui.horizontal(|ui| {
            for (value, label) in [(Hand::Left, "Left"), (Hand::Right, "Right")] {
                if ui
                    .selectable_label(profile.dominant_hand == Some(value), label)
                    .clicked()
                {
                    profile.dominant_hand = Some(value);
                }
            }
        });

        ui.add_space(24.0);
        // Stays disabled until the guard passes; refusal is silent.
        if ui
            .add_enabled(
                profile.is_complete(),
                egui::Button::new("Done").min_size(egui::vec2(200.0, 44.0)),
            )
            .clicked()
        {
            event = FormEvent::Next;
        }

        ui.add_space(8.0);
        if ui.small_button("Back").clicked() {
            event = FormEvent::Back;
        }
    });

    event
}

pub(crate) fn mode_choice(ui: &mut egui::Ui, user_name: &str) -> ModeEvent {
    let mut event = ModeEvent::None;

    ui.vertical_centered(|ui| {
        ui.add_space(24.0);
        ui.label(egui::RichText::new("Welcome,").color(egui::Color32::GRAY));
        ui.heading(if user_name.is_empty() { "friend" } else { user_name });
        ui.add_space(24.0);

        // Three readings; compatibility routes through palm capture for
        // now, as the matching flow has no scene of its own.
        let cards = [
            ("Face reading", "What the heavens wrote on your face", CaptureMode::Face),
            ("Palm reading", "Tomorrow, drawn by the lines of fate", CaptureMode::Hand),
            ("Compatibility", "How deep does the connection run?", CaptureMode::Hand),
        ];

        for (title, desc, mode) in cards {
            let button = egui::Button::new(
                egui::RichText::new(format!("{}\n{}", title, desc)).size(14.0),
            )
            .min_size(egui::vec2(260.0, 64.0));
            if ui.add(button).clicked() {
                event = ModeEvent::Pick(mode);
            }
            ui.add_space(8.0);
        }

        ui.add_space(12.0);
        if ui.small_button("Back").clicked() {
            event = ModeEvent::Back;
        }
    });

    event
}
