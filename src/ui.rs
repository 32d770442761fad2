use crate::models::{ArchiveHandle, HistoryEntry, PendingPasswordRequest};
use egui::{Align2, Color32, Label, RichText, Sense, TextEdit, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    None,
    Submit,
    Cancel,
}

pub fn draw_header(ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.heading(RichText::new("ZipHopp").strong());
        ui.label(RichText::new(concat!("v", env!("CARGO_PKG_VERSION"))).monospace());
    });
}

/// Returns true when "Open file" was clicked.
pub fn draw_open_button(ui: &mut egui::Ui) -> bool {
    ui.vertical_centered(|ui| ui.button("Open file").clicked())
        .inner
}

pub fn draw_opening(ui: &mut egui::Ui, path: Option<&str>) {
    ui.horizontal(|ui| {
        ui.spinner();
        match path {
            Some(path) => ui.label(format!("Opening {}", path)),
            None => ui.label("Waiting for a file..."),
        };
    });
}

/// Returns true when "Open another" was clicked.
pub fn draw_archive_card(ui: &mut egui::Ui, archive: &ArchiveHandle) -> bool {
    ui.group(|ui| {
        ui.label(RichText::new(format!("🗜 {}", archive.meta.name)).heading());
        ui.label(RichText::new(&archive.path).small());
        ui.label(format!(
            "{}, uncompresses to {}",
            archive.meta.size_compressed, archive.meta.size_uncompressed
        ));
        ui.link("Open another").clicked()
    })
    .inner
}

/// Returns the index of the clicked row, if any.
pub fn draw_recent_files(
    ui: &mut egui::Ui,
    entries: &[HistoryEntry],
    hover: &mut Option<usize>,
) -> Option<usize> {
    if entries.is_empty() {
        ui.heading("Recent files");
        ui.label(RichText::new("Files you open will appear here").italics());
        return None;
    }

    ui.heading("You previously opened...");
    let mut clicked = None;
    for (index, entry) in entries.iter().enumerate() {
        let color = if *hover == Some(index) {
            Color32::YELLOW
        } else {
            ui.style().visuals.text_color()
        };
        let response = ui
            .group(|ui| {
                ui.label(RichText::new(format!("🕘 {}", entry.name)).strong().color(color));
                ui.label(RichText::new(&entry.path).small());
            })
            .response
            .interact(Sense::click());

        if response.hovered() {
            *hover = Some(index);
            ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
        } else if *hover == Some(index) {
            *hover = None;
        }

        if response.clicked() {
            clicked = Some(index);
        }
    }
    clicked
}

pub fn draw_password_prompt(
    ctx: &egui::Context,
    pending: &PendingPasswordRequest,
    password: &mut String,
) -> PromptAction {
    let mut action = PromptAction::None;
    Window::new("Enter Password")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label("This file is password protected");
            ui.label(RichText::new(&pending.path).small());

            let field = ui.add(
                TextEdit::singleline(password)
                    .password(true)
                    .hint_text("Type your password"),
            );
            if field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                action = PromptAction::Submit;
            }

            if let Some(reason) = &pending.reason {
                ui.colored_label(Color32::RED, reason);
            }

            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    action = PromptAction::Cancel;
                }
                if ui.button("Open").clicked() {
                    action = PromptAction::Submit;
                }
            });
        });
    action
}

pub fn draw_archive_contents(ui: &mut egui::Ui, entries: &[String]) {
    for entry in entries {
        let icon = if entry.ends_with('/') { "📁" } else { "📄" };
        ui.add(Label::new(format!("{} {}", icon, entry)).truncate());
    }
}
