use crate::app::TraceOxide;

pub fn render_help_dialog(app: &mut TraceOxide, ctx: &eframe::egui::Context) {
    if app.view.show_help {
        eframe::egui::Window::new("⌨ Keyboard Shortcuts")
            .anchor(eframe::egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .collapsible(false)
            .show(ctx, |ui| {
                ui.heading("Navigation");
                ui.label("R - Reset view");
                ui.label("L - Toggle legend");
                ui.label("T - Toggle dark/light theme");
                ui.label("H / F1 - Toggle help");
                ui.label("ESC - Close help");

                ui.separator();
                ui.heading("Mouse Controls");
                ui.label("Scroll - Zoom in/out");
                ui.label("Drag - Pan view");
                ui.label("Hover grey marker - List states elided in that column");

                ui.separator();
                ui.heading("Markers");
                ui.label("Grey dots mark pixel columns where several states occurred.");
                ui.label("Breaks in a line are missing or invalid samples.");

                ui.separator();
                if ui.button("Close").clicked() {
                    app.view.show_help = false;
                }
            });
    }
}
