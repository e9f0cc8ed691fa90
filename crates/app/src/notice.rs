//! Modal notice dialog
//!
//! Blocking message shown over the viewport for failed opens, saves and
//! commits, and for the save confirmation.

use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Error,
    Info,
}

impl NoticeSeverity {
    pub fn icon(&self) -> &'static str {
        match self {
            NoticeSeverity::Error => "❌",
            NoticeSeverity::Info => "ℹ️",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            NoticeSeverity::Error => "Error",
            NoticeSeverity::Info => "Notice",
        }
    }
}

/// Notice dialog state
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub message: String,
}

impl Notice {
    pub fn error(context: &str, err: impl std::fmt::Display) -> Self {
        Self {
            severity: NoticeSeverity::Error,
            message: format!("{}: {}", context, err),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: NoticeSeverity::Info,
            message: message.into(),
        }
    }

    pub fn window_title(&self) -> String {
        format!("{} {}", self.severity.icon(), self.severity.title())
    }

    /// Draw the dialog. Returns `true` once the user dismisses it.
    pub fn show(&self, ctx: &egui::Context) -> bool {
        let mut dismissed = false;
        egui::Window::new(self.window_title())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&self.message);
                ui.add_space(12.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            });
        dismissed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_notice_includes_context() {
        let notice = Notice::error("Failed to save PDF", "permission denied");
        assert_eq!(notice.severity, NoticeSeverity::Error);
        assert_eq!(notice.message, "Failed to save PDF: permission denied");
        assert_eq!(notice.window_title(), "❌ Error");
    }

    #[test]
    fn test_info_notice() {
        let notice = Notice::info("PDF saved successfully");
        assert_eq!(notice.window_title(), "ℹ️ Notice");
        assert_eq!(notice.message, "PDF saved successfully");
    }
}
