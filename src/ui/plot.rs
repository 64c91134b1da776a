use crate::app::TraceOxide;
use chrono::{DateTime, Utc};
use eframe::egui::{self, Color32};
use egui_plot::{Legend, Line, Plot, PlotPoint as PlotValue, PlotTransform, Points};
use trace_oxide::constants::colors::MARKER_COLOR;
use trace_oxide::constants::layout::{HOVER_RADIUS, MARKER_RADIUS};
use trace_oxide::downsample::{LineStyle, PlotPoint, Rgba, Scale, Scales};

fn to_color32([r, g, b, a]: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Render the downsampled datasets and report the plot's scales back to the app
pub fn render_plot(app: &mut TraceOxide, ui: &mut egui::Ui) {
    profiling::scope!("render_plot");

    let mut plot = Plot::new("trace_plot").allow_zoom(true).allow_drag(true);

    if app.view.show_legend {
        plot = plot.legend(Legend::default().position(egui_plot::Corner::RightTop));
    }

    if app.view.reset_bounds {
        plot = plot.reset();
        app.view.reset_bounds = false;
    }

    if app.view.x_is_timestamp {
        plot = plot.x_axis_formatter(|mark, _range| format_timestamp(mark.value, "%Y-%m-%d\n%H:%M:%S"));
    } else {
        plot = plot.x_axis_formatter(|mark, _range| {
            if mark.value.abs() < 0.01 && mark.value != 0.0 {
                format!("{:.2e}", mark.value)
            } else if mark.value.abs() >= 1000.0 {
                format!("{:.0}", mark.value)
            } else {
                format!("{:.2}", mark.value)
            }
        });
    }

    let plot_response = plot.show(ui, |plot_ui| {
        for dataset in &app.rendered {
            let color = to_color32(dataset.meta.color);
            let name = dataset.meta.name.as_str();
            let style = dataset.meta.line_style;

            if style != LineStyle::Points {
                for segment in line_segments(&dataset.points, style) {
                    plot_ui.line(
                        Line::new(name, segment)
                            .color(color)
                            .width(dataset.meta.line_width),
                    );
                }
            }

            if matches!(style, LineStyle::Points | LineStyle::LineAndPoints) {
                let real: Vec<[f64; 2]> = dataset
                    .points
                    .iter()
                    .filter(|p| matches!(p, PlotPoint::Real(_)))
                    .map(PlotPoint::xy)
                    .collect();
                plot_ui.points(Points::new(name, real).radius(MARKER_RADIUS).color(color));
            }

            let markers: Vec<[f64; 2]> = dataset
                .points
                .iter()
                .filter(|p| p.states().is_some())
                .map(PlotPoint::xy)
                .collect();
            if !markers.is_empty() {
                plot_ui.points(
                    Points::new(format!("{} (elided)", name), markers)
                        .radius(MARKER_RADIUS)
                        .color(to_color32(MARKER_COLOR)),
                );
            }
        }
    });

    let transform = plot_response.transform;
    app.sync_scales(scales_from_transform(&transform));

    if let Some(pointer) = plot_response.response.hover_pos() {
        if let Some((name, x, states)) = hovered_marker(app, &transform, pointer) {
            let x_is_timestamp = app.view.x_is_timestamp;
            let _ = plot_response.response.on_hover_ui(|ui| {
                ui.strong(name);
                let x_label = if x_is_timestamp {
                    format_timestamp(x, "%Y-%m-%d %H:%M:%S%.3f")
                } else {
                    format!("x: {:.4}", x)
                };
                ui.label(x_label);
                ui.separator();
                for state in states {
                    ui.label(format!("• {}", state));
                }
            });
        }
    }
}

/// Marker closest to the pointer within the hover radius
fn hovered_marker(
    app: &TraceOxide,
    transform: &PlotTransform,
    pointer: egui::Pos2,
) -> Option<(String, f64, Vec<String>)> {
    let mut best: Option<(f32, String, f64, Vec<String>)> = None;
    for dataset in &app.rendered {
        for point in &dataset.points {
            let Some(states) = point.states() else {
                continue;
            };
            let screen = transform.position_from_point(&PlotValue::new(point.x(), point.y()));
            let dist = screen.distance(pointer);
            if dist <= HOVER_RADIUS && best.as_ref().is_none_or(|b| dist < b.0) {
                best = Some((dist, dataset.meta.name.clone(), point.x(), states.to_vec()));
            }
        }
    }
    best.map(|(_, name, x, states)| (name, x, states))
}

fn scales_from_transform(transform: &PlotTransform) -> Scales {
    let bounds = transform.bounds();
    let frame = transform.frame();
    Scales {
        x: Scale {
            min: bounds.min()[0],
            max: bounds.max()[0],
            pixel_start: frame.left() as f64,
            pixel_end: frame.right() as f64,
        },
        y: Scale {
            min: bounds.min()[1],
            max: bounds.max()[1],
            pixel_start: frame.bottom() as f64,
            pixel_end: frame.top() as f64,
        },
    }
}

fn format_timestamp(value: f64, format: &str) -> String {
    let secs = value.floor() as i64;
    let nanos = ((value.fract().abs() * 1_000_000_000.0) as u32).min(999_999_999);
    match DateTime::<Utc>::from_timestamp(secs, nanos) {
        Some(dt) => dt.format(format).to_string(),
        None => format!("{:.2}", value),
    }
}

/// Split points into drawable polylines, breaking at gaps
///
/// `Steps` holds each value until the next point's x.
fn line_segments(points: &[PlotPoint], style: LineStyle) -> Vec<Vec<[f64; 2]>> {
    let mut segments = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();

    for point in points {
        if point.is_gap() {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            continue;
        }
        let [x, y] = point.xy();
        if style == LineStyle::Steps {
            if let Some(&[_, prev_y]) = current.last() {
                current.push([x, prev_y]);
            }
        }
        current.push([x, y]);
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}
