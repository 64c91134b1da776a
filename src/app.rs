use std::path::PathBuf;

use eframe::App;
use eframe::egui::{self, CentralPanel};

use trace_oxide::constants::colors::SERIES_PALETTE;
use trace_oxide::constants::layout::DEMO_SAMPLES;
use trace_oxide::data::{demo_states, DataSource};
use trace_oxide::downsample::{
    Bounds, Dataset, DatasetMeta, DownsampleWorker, LineStyle, Scales, StateUpdate,
};
use trace_oxide::{DownsampleConfig, TraceError};

use crate::ui;

/// Columns the user picked from the loaded file
#[derive(Debug, Clone, Default)]
pub struct ColumnSelection {
    pub x: Option<String>,
    pub y: Option<String>,
    pub label: Option<String>,
}

/// View and display options
#[derive(Debug, Clone)]
pub struct ViewState {
    pub dark_mode: bool,
    pub show_help: bool,
    pub show_legend: bool,
    pub reset_bounds: bool,
    pub line_style: LineStyle,
    /// X axis holds Unix seconds
    pub x_is_timestamp: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            dark_mode: true,
            show_help: false,
            show_legend: true,
            reset_bounds: false,
            line_style: LineStyle::Steps,
            x_is_timestamp: false,
        }
    }
}

pub struct TraceOxide {
    pub view: ViewState,
    pub columns: ColumnSelection,
    pub source: Option<DataSource>,
    pub current_file: Option<PathBuf>,
    /// Latest downsampled datasets, what the plot draws
    pub rendered: Vec<Dataset>,
    /// Points before downsampling, for the status line
    pub raw_points: usize,
    pub error: Option<(String, String)>,
    worker: DownsampleWorker,
    last_scales: Option<Scales>,
    awaiting: Option<u64>,
}

impl TraceOxide {
    pub fn new(config: DownsampleConfig) -> Self {
        Self {
            view: ViewState::default(),
            columns: ColumnSelection::default(),
            source: None,
            current_file: None,
            rendered: Vec::new(),
            raw_points: 0,
            error: None,
            worker: DownsampleWorker::spawn(config),
            last_scales: None,
            awaiting: None,
        }
    }

    pub fn set_error(&mut self, err: &TraceError) {
        log::error!("{}", err);
        self.error = Some((err.title().to_string(), err.user_message()));
    }

    pub fn load_file(&mut self, path: PathBuf) -> Result<(), TraceError> {
        let source = DataSource::load(&path)?;
        let names = source.column_names();

        // first column as x, second as y, a string column (if any) as label
        self.columns = ColumnSelection {
            x: names.first().cloned(),
            y: names.get(1).or(names.first()).cloned(),
            label: names
                .iter()
                .skip(2)
                .find(|name| {
                    source
                        .dataframe()
                        .column(name.as_str())
                        .is_ok_and(|c| c.dtype() == &polars::prelude::DataType::String)
                })
                .cloned(),
        };
        self.source = Some(source);
        self.current_file = Some(path);
        self.rebuild_datasets()
    }

    /// Rebuild the dataset from the current column selection and hand it to the worker
    pub fn rebuild_datasets(&mut self) -> Result<(), TraceError> {
        let Some(source) = &self.source else {
            return Ok(());
        };
        let (Some(x), Some(y)) = (&self.columns.x, &self.columns.y) else {
            return Ok(());
        };

        let meta = DatasetMeta::new(y.clone(), SERIES_PALETTE[0]).with_line_style(self.view.line_style);
        let dataset = source.to_dataset(x, y, self.columns.label.as_deref(), meta)?;
        self.view.x_is_timestamp = source.is_datetime_column(x);
        self.set_datasets(vec![dataset]);
        Ok(())
    }

    pub fn load_demo(&mut self) {
        self.source = None;
        self.current_file = None;
        self.columns = ColumnSelection::default();
        self.view.x_is_timestamp = false;
        self.set_datasets(vec![demo_states(DEMO_SAMPLES)]);
    }

    fn set_datasets(&mut self, datasets: Vec<Dataset>) {
        self.raw_points = datasets.iter().map(Dataset::len).sum();
        let bounds = datasets
            .iter()
            .filter_map(Dataset::bounds)
            .reduce(Bounds::union);

        let mut update = StateUpdate::new().with_datasets(datasets);
        if let Some(bounds) = bounds {
            update = update.with_dataset_bounds(bounds);
        }
        self.worker.update(update);
        self.view.reset_bounds = true;
        self.awaiting = Some(self.worker.request());
    }

    /// Called every frame with the plot's current scales
    pub fn sync_scales(&mut self, scales: Scales) {
        if self.last_scales == Some(scales) {
            return;
        }
        self.last_scales = Some(scales);
        self.worker.update(StateUpdate::new().with_scales(scales));
        self.awaiting = Some(self.worker.request());
    }

    fn poll_worker(&mut self) {
        if let Some(result) = self.worker.poll() {
            if let Some(datasets) = result.datasets {
                self.rendered = datasets;
            }
            if self.awaiting == Some(result.generation) {
                self.awaiting = None;
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.awaiting.is_some()
    }
}

impl App for TraceOxide {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        profiling::finish_frame!();

        if self.view.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        ctx.input(|i| {
            if i.key_pressed(egui::Key::R) {
                self.view.reset_bounds = true;
            }
            if i.key_pressed(egui::Key::L) {
                self.view.show_legend = !self.view.show_legend;
            }
            if i.key_pressed(egui::Key::T) {
                self.view.dark_mode = !self.view.dark_mode;
            }
            if i.key_pressed(egui::Key::H) || i.key_pressed(egui::Key::F1) {
                self.view.show_help = !self.view.show_help;
            }
            if i.key_pressed(egui::Key::Escape) {
                self.view.show_help = false;
            }
        });

        self.poll_worker();

        CentralPanel::default().show(ctx, |ui| {
            ui::render_toolbar(self, ui);
            ui.separator();
            ui::render_plot(self, ui);
        });

        ui::render_help_dialog(self, ctx);

        if self.is_busy() {
            ctx.request_repaint();
        }
    }
}
