use crate::backend::ArchiveBackend;
use crate::config::Config;
use crate::gateway::{GatewayEvent, ThreadedGateway};
use crate::models::Password;
use crate::session::{Session, SessionState};
use crate::ui::{
    draw_archive_card, draw_archive_contents, draw_header, draw_open_button, draw_opening,
    draw_password_prompt, draw_recent_files, PromptAction,
};
use crossbeam_channel::Receiver;
use egui::{CentralPanel, Color32, ScrollArea, SidePanel};
use std::sync::Arc;
use tracing::{debug, info, warn};

enum UserAction {
    Open,
    Reopen(usize),
}

pub struct ZipHopp {
    session: Session<ThreadedGateway>,
    events: Receiver<GatewayEvent>,
    dark_mode: bool,
    temp_password: String,
    hover_recent: Option<usize>,
}

impl ZipHopp {
    pub fn new(ctx: &egui::Context, backend: Arc<dyn ArchiveBackend>, config: &Config) -> Self {
        let repaint = ctx.clone();
        let (gateway, events) = ThreadedGateway::new(backend);
        let gateway = gateway.with_waker(move || repaint.request_repaint());

        let mut session = Session::new(gateway);
        session.start();

        Self {
            session,
            events,
            dark_mode: config.dark_mode,
            temp_password: String::new(),
            hover_recent: None,
        }
    }

    fn handle_prompt(&mut self, ctx: &egui::Context) {
        let pending = match self.session.state() {
            SessionState::AwaitingPassword(pending) => pending.clone(),
            _ => return,
        };

        match draw_password_prompt(ctx, &pending, &mut self.temp_password) {
            PromptAction::Submit => {
                let password = Password::from(std::mem::take(&mut self.temp_password));
                if let Err(e) = self.session.submit_password(password) {
                    warn!("Password not submitted: {}", e);
                }
            }
            PromptAction::Cancel => {
                self.temp_password.clear();
                self.session.cancel_password();
            }
            PromptAction::None => {}
        }
    }

    /// One open at a time: clicks that arrive while a request is in flight
    /// are dropped rather than superseding it.
    fn apply(&mut self, action: UserAction) {
        if self.session.is_opening() {
            debug!("Ignoring click while an open is in flight");
            return;
        }
        let result = match action {
            UserAction::Open => self.session.open(None, Password::default()),
            UserAction::Reopen(index) => {
                info!("Reopening recent file #{}", index);
                self.session.select_history(index)
            }
        };
        if let Err(e) = result {
            warn!("Open not started: {}", e);
        }
    }
}

impl eframe::App for ZipHopp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.session.pump(&self.events);

        ctx.set_visuals(if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        self.handle_prompt(ctx);

        SidePanel::right("archive_contents")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                ScrollArea::vertical().show(ui, |ui| {
                    if let SessionState::Open(archive) = self.session.state() {
                        draw_archive_contents(ui, &archive.entries);
                    }
                });
            });

        let mut action = None;
        CentralPanel::default().show(ctx, |ui| {
            draw_header(ui);
            ui.separator();

            match self.session.state() {
                SessionState::Empty | SessionState::AwaitingPassword(_) => {
                    if draw_open_button(ui) {
                        action = Some(UserAction::Open);
                    }
                }
                SessionState::Opening { path } => draw_opening(ui, path),
                SessionState::Open(archive) => {
                    if draw_archive_card(ui, archive) {
                        action = Some(UserAction::Open);
                    }
                }
            }

            if let Some(error) = self.session.error() {
                ui.colored_label(Color32::RED, error);
            }

            ui.separator();
            let idle = !self.session.is_opening();
            ScrollArea::vertical().show(ui, |ui| {
                ui.add_enabled_ui(idle, |ui| {
                    let entries = self.session.history().entries();
                    if let Some(index) = draw_recent_files(ui, entries, &mut self.hover_recent) {
                        action = Some(UserAction::Reopen(index));
                    }
                });
            });
        });

        if let Some(action) = action {
            self.apply(action);
        }
    }
}
