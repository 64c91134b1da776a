use crate::app::TraceOxide;
use eframe::egui::{self, ComboBox};
use trace_oxide::downsample::LineStyle;

/// Render the toolbar: file/demo loading, column pickers and status
pub fn render_toolbar(app: &mut TraceOxide, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        if ui.button("📂").on_hover_text("Open Data File").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Data Files", &["csv", "parquet"])
                .pick_file()
            {
                if let Err(e) = app.load_file(path) {
                    app.set_error(&e);
                }
            }
        }

        if ui.button("🎲").on_hover_text("Load demo state trace").clicked() {
            app.load_demo();
        }

        if ui.button("⟲").on_hover_text("Reset view (R)").clicked() {
            app.view.reset_bounds = true;
        }

        if ui.button("❓").on_hover_text("Help (H)").clicked() {
            app.view.show_help = !app.view.show_help;
        }

        ui.separator();

        if let Some(source) = &app.source {
            let names = source.column_names();
            let mut changed = false;
            changed |= column_combo(ui, "x", &mut app.columns.x, &names, false);
            changed |= column_combo(ui, "y", &mut app.columns.y, &names, false);
            changed |= column_combo(ui, "state", &mut app.columns.label, &names, true);

            ComboBox::from_label("style")
                .selected_text(format!("{:?}", app.view.line_style))
                .show_ui(ui, |ui| {
                    for style in [
                        LineStyle::Steps,
                        LineStyle::Line,
                        LineStyle::Points,
                        LineStyle::LineAndPoints,
                    ] {
                        changed |= ui
                            .selectable_value(&mut app.view.line_style, style, format!("{:?}", style))
                            .changed();
                    }
                });

            if changed {
                if let Err(e) = app.rebuild_datasets() {
                    app.set_error(&e);
                }
            }
        }
    });

    ui.horizontal(|ui| {
        if let Some(file) = &app.current_file {
            ui.label(format!(
                "📄 {}",
                file.file_name().and_then(|n| n.to_str()).unwrap_or("Unknown")
            ))
            .on_hover_text(file.display().to_string());
        }

        let shown: usize = app.rendered.iter().map(|d| d.len()).sum();
        ui.label(format!("{} of {} points", shown, app.raw_points));
        if app.is_busy() {
            ui.spinner();
        }
    });

    let mut dismiss = false;
    if let Some((title, message)) = &app.error {
        ui.horizontal(|ui| {
            ui.colored_label(egui::Color32::from_rgb(214, 39, 40), format!("⚠ {}: {}", title, message));
            dismiss = ui.small_button("✖").clicked();
        });
    }
    if dismiss {
        app.error = None;
    }
}

fn column_combo(
    ui: &mut egui::Ui,
    label: &str,
    selected: &mut Option<String>,
    columns: &[String],
    optional: bool,
) -> bool {
    let mut changed = false;
    ComboBox::from_label(label)
        .selected_text(selected.as_deref().unwrap_or("—"))
        .show_ui(ui, |ui| {
            if optional {
                changed |= ui.selectable_value(selected, None, "—").changed();
            }
            for name in columns {
                changed |= ui
                    .selectable_value(selected, Some(name.clone()), name)
                    .changed();
            }
        });
    changed
}
