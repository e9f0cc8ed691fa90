//! PDF Text Editor - egui-based UI
//!
//! Shows one page at a time with an editable overlay over every text block.
//! Edits are written back into the PDF on Ctrl/Cmd+Enter.

mod mode;
mod notice;

use eframe::egui;
use mode::{BatchBuffers, EditMode};
use notice::Notice;
use pdf_text_editor_core::{
    BlockKey, ClickOutcome, CommitOutcome, Editor, EditorConfig, EditorResult, OverlayEvent,
    SceneRect, ScenePoint,
};
use pdf_text_editor_render::PdfiumSource;
use std::path::PathBuf;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 800.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("PDF Text Editor"),
        ..Default::default()
    };

    eframe::run_native(
        "PDF Text Editor",
        options,
        Box::new(|cc| Ok(Box::new(PdfTextEditorApp::new(cc)))),
    )
}

/// Page texture, tagged with the editor revision it was built from
struct PageTexture {
    revision: u64,
    handle: egui::TextureHandle,
}

/// Overlay geometry copied out of the rendered page for one frame
struct OverlayView {
    key: BlockKey,
    rect: egui::Rect,
    /// Trimmed block text, as shown in the overlay
    text: String,
}

struct PdfTextEditorApp {
    editor: Editor<PdfiumSource>,
    mode: EditMode,

    texture: Option<PageTexture>,

    // Click-to-edit state
    click_draft: String,
    focus_click_editor: bool,

    // Edit-all state
    batch: BatchBuffers,

    notice: Option<Notice>,
}

impl PdfTextEditorApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            editor: Editor::new(EditorConfig::default()),
            mode: EditMode::default(),
            texture: None,
            click_draft: String::new(),
            focus_click_editor: false,
            batch: BatchBuffers::default(),
            notice: None,
        }
    }

    /// Open a PDF file using the file picker
    fn open_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("PDF", &["pdf"])
            .pick_file()
        {
            self.load_pdf(path);
        }
    }

    fn load_pdf(&mut self, path: PathBuf) {
        let opened = PdfiumSource::open(&path)
            .map_err(Into::into)
            .and_then(|document| self.editor.open(document, Some(path.clone())));

        if let Err(e) = opened {
            log::error!("Failed to open {}: {}", path.display(), e);
            self.notice = Some(Notice::error("Failed to open PDF", e));
        }
    }

    fn save_file(&mut self) {
        if !self.editor.is_open() {
            return;
        }

        let mut dialog = rfd::FileDialog::new().add_filter("PDF", &["pdf"]);
        if let Some(name) = self.editor.file_path().and_then(|p| p.file_name()) {
            dialog = dialog.set_file_name(name.to_string_lossy());
        }
        let Some(path) = dialog.save_file() else {
            return;
        };

        self.notice = Some(match self.editor.save(&path) {
            Ok(()) => Notice::info("PDF saved successfully"),
            Err(e) => {
                log::error!("Failed to save {}: {}", path.display(), e);
                Notice::error("Failed to save PDF", e)
            }
        });
    }

    fn handle_commit_result(&mut self, result: EditorResult<CommitOutcome>) {
        match result {
            Ok(CommitOutcome::Written {
                font,
                used_fallback: true,
            }) => log::warn!("Edit written with fallback font {}", font.family()),
            Ok(_) => {}
            Err(e) => self.notice = Some(Notice::error("Failed to apply edit", e)),
        }
    }

    fn commit_active_edit(&mut self) {
        match self.mode {
            EditMode::ClickToEdit => {
                let result = self.editor.commit();
                self.handle_commit_result(result);
            }
            EditMode::EditAll => {
                if let Some(key) = self.batch.focused() {
                    self.dispatch_overlay_event(key, OverlayEvent::CommitRequested);
                }
            }
        }
    }

    fn cancel_active_edit(&mut self, ctx: &egui::Context) {
        self.editor.cancel();
        self.click_draft.clear();
        // Rebuild the batch buffers from the page on the next frame
        self.texture = None;
        ctx.memory_mut(|mem| mem.stop_text_input());
    }

    fn dispatch_overlay_event(&mut self, key: BlockKey, event: OverlayEvent) {
        match self.editor.handle_overlay_event(key, event) {
            Ok(Some(outcome)) => self.handle_commit_result(Ok(outcome)),
            Ok(None) => {}
            Err(e) => self.handle_commit_result(Err(e)),
        }
    }

    fn change_page(&mut self, forward: bool) {
        let moved = if forward {
            self.editor.next_page()
        } else {
            self.editor.prev_page()
        };
        match moved {
            Ok(true) => self.click_draft.clear(),
            Ok(false) => {}
            Err(e) => self.notice = Some(Notice::error("Failed to change page", e)),
        }
    }

    fn set_mode(&mut self, mode: EditMode) {
        if mode != self.mode {
            self.mode = mode;
            self.editor.cancel();
            self.click_draft.clear();
            self.texture = None;
        }
    }

    /// Rebuild the page texture and batch buffers after every render.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let Some(rendered) = self.editor.rendered() else {
            self.texture = None;
            return;
        };
        let revision = self.editor.revision();
        if self.texture.as_ref().is_some_and(|t| t.revision == revision) {
            return;
        }

        let (width, height) = rendered.bitmap.dimensions();
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [width as usize, height as usize],
            rendered.bitmap.as_raw(),
        );
        let handle = ctx.load_texture(
            format!("page_{}", rendered.page_index),
            image,
            egui::TextureOptions::LINEAR,
        );

        self.batch.reset(
            rendered
                .overlays
                .iter()
                .map(|overlay| (overlay.key(), overlay.original_text.as_str())),
        );
        self.texture = Some(PageTexture { revision, handle });
    }
}

impl eframe::App for PdfTextEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keyboard_shortcuts(ctx);
        self.sync_texture(ctx);
        self.draw_toolbar(ctx);
        self.draw_viewport(ctx);

        if let Some(notice) = &self.notice {
            if notice.show(ctx) {
                self.notice = None;
            }
        }
    }
}

impl PdfTextEditorApp {
    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        // Consumed here so the multiline editors never see them
        let commit = ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::Enter));
        let escape = ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Escape));

        if escape {
            if self.notice.is_some() {
                self.notice = None;
            } else {
                self.cancel_active_edit(ctx);
            }
        }
        if commit && self.notice.is_none() {
            self.commit_active_edit();
        }
    }

    fn draw_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.add_space(8.0);

                if ui.button("📂 Open").clicked() {
                    self.open_file();
                }
                if ui
                    .add_enabled(self.editor.is_open(), egui::Button::new("💾 Save"))
                    .clicked()
                {
                    self.save_file();
                }

                ui.separator();

                let navigator = *self.editor.navigator();
                if ui
                    .add_enabled(navigator.can_prev(), egui::Button::new("◀"))
                    .clicked()
                {
                    self.change_page(false);
                }
                ui.label(navigator.label());
                if ui
                    .add_enabled(navigator.can_next(), egui::Button::new("▶"))
                    .clicked()
                {
                    self.change_page(true);
                }

                ui.separator();

                let mut mode = self.mode;
                egui::ComboBox::from_id_salt("edit_mode")
                    .selected_text(mode.label())
                    .width(110.0)
                    .show_ui(ui, |ui| {
                        for option in EditMode::ALL {
                            ui.selectable_value(&mut mode, option, option.label());
                        }
                    });
                self.set_mode(mode);
            });
        });
    }

    fn draw_viewport(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(texture) = &self.texture else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a PDF to get started");
                });
                return;
            };
            let texture_id = texture.handle.id();
            let size = texture.handle.size_vec2();

            egui::ScrollArea::both()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    let (page_rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
                    ui.painter().image(
                        texture_id,
                        page_rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );

                    let overlays = self.overlay_views(page_rect.min);
                    match self.mode {
                        EditMode::ClickToEdit => {
                            self.draw_click_mode(ui, page_rect, &response, &overlays)
                        }
                        EditMode::EditAll => self.draw_batch_mode(ui, &overlays),
                    }
                });
        });
    }

    fn overlay_views(&self, origin: egui::Pos2) -> Vec<OverlayView> {
        let to_screen = |rect: &SceneRect| {
            egui::Rect::from_min_max(
                origin + egui::vec2(rect.min.x, rect.min.y),
                origin + egui::vec2(rect.max.x, rect.max.y),
            )
        };

        self.editor
            .rendered()
            .map(|rendered| {
                rendered
                    .overlays
                    .iter()
                    .map(|overlay| OverlayView {
                        key: overlay.key(),
                        rect: to_screen(&overlay.scene_rect),
                        text: overlay.original_text.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn draw_click_mode(
        &mut self,
        ui: &mut egui::Ui,
        page_rect: egui::Rect,
        response: &egui::Response,
        overlays: &[OverlayView],
    ) {
        let outline = egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(70, 130, 220, 90));
        for overlay in overlays {
            ui.painter()
                .rect_stroke(overlay.rect, 2.0, outline, egui::StrokeKind::Outside);
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let point = ScenePoint::new(pos.x - page_rect.min.x, pos.y - page_rect.min.y);
                match self.editor.click_scene(point) {
                    Ok(ClickOutcome::Activated) => {
                        // Start from the text the overlay shows and keep the session in step
                        let active = self.editor.session().block().map(|block| block.key());
                        self.click_draft = overlays
                            .iter()
                            .find(|overlay| Some(overlay.key) == active)
                            .map(|overlay| overlay.text.clone())
                            .unwrap_or_default();
                        self.editor.edit_draft(self.click_draft.clone());
                        self.focus_click_editor = true;
                    }
                    Ok(ClickOutcome::Cancelled) => self.click_draft.clear(),
                    Ok(ClickOutcome::Ignored) => {}
                    Err(e) => self.notice = Some(Notice::error("Failed to select text", e)),
                }
            }
        }

        let Some(active) = self.editor.session().block().map(|block| block.key()) else {
            return;
        };
        let Some(overlay) = overlays.iter().find(|overlay| overlay.key == active) else {
            return;
        };

        let editor_response = ui.put(
            overlay.rect,
            egui::TextEdit::multiline(&mut self.click_draft)
                .desired_width(overlay.rect.width())
                .hint_text("Ctrl+Enter to apply, Esc to cancel"),
        );
        if std::mem::take(&mut self.focus_click_editor) {
            editor_response.request_focus();
        }
        if editor_response.changed() {
            self.editor.edit_draft(self.click_draft.clone());
        }
    }

    fn draw_batch_mode(&mut self, ui: &mut egui::Ui, overlays: &[OverlayView]) {
        let mut events: Vec<(BlockKey, OverlayEvent)> = Vec::new();

        for overlay in overlays {
            let Some(buffer) = self.batch.buffer_mut(overlay.key) else {
                continue;
            };
            let response = ui.put(
                overlay.rect,
                egui::TextEdit::multiline(buffer).desired_width(overlay.rect.width()),
            );

            if response.gained_focus() {
                events.push((overlay.key, OverlayEvent::Focused));
                // The session draft must match what the widget shows
                events.push((overlay.key, OverlayEvent::Changed(buffer.clone())));
            }
            if response.changed() {
                events.push((overlay.key, OverlayEvent::Changed(buffer.clone())));
            }
            if response.lost_focus() {
                events.push((overlay.key, OverlayEvent::FocusLost));
            }
        }

        for (key, event) in events {
            match event {
                OverlayEvent::Focused => self.batch.set_focused(Some(key)),
                OverlayEvent::FocusLost => {
                    // Focus loss discards the draft, so the widget goes back to the block text
                    if let Some(overlay) = overlays.iter().find(|overlay| overlay.key == key) {
                        self.batch.revert(key, &overlay.text);
                    }
                    if self.batch.focused() == Some(key) {
                        self.batch.set_focused(None);
                    }
                }
                _ => {}
            }
            self.dispatch_overlay_event(key, event);
        }
    }
}
