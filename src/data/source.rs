use polars::prelude::*;
use std::path::{Path, PathBuf};

use crate::downsample::{Dataset, DatasetMeta, PlotPoint, StatePoint};
use crate::error::{Result, TraceError};

/// DataSource wraps a materialized Polars DataFrame loaded from disk
pub struct DataSource {
    df: DataFrame,
    /// Original file path
    file_path: Option<PathBuf>,
}

impl DataSource {
    /// Load data from a file (CSV or Parquet)
    pub fn load(path: &Path) -> Result<Self> {
        profiling::scope!("DataSource::load");

        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| TraceError::UnsupportedFormat {
                extension: String::new(),
            })?;

        let lazy = match extension.to_lowercase().as_str() {
            "parquet" => LazyFrame::scan_parquet(path, Default::default())?,
            "csv" => LazyCsvReader::new(path)
                .with_has_header(true)
                .with_infer_schema_length(Some(100))
                .with_try_parse_dates(true)
                .finish()?,
            ext => {
                return Err(TraceError::UnsupportedFormat {
                    extension: ext.to_string(),
                });
            }
        };

        let df = lazy.collect()?;
        log::info!(
            "loaded {} rows x {} columns from {}",
            df.height(),
            df.width(),
            path.display()
        );
        Ok(Self {
            df,
            file_path: Some(path.to_path_buf()),
        })
    }

    pub fn from_dataframe(df: DataFrame, path: Option<PathBuf>) -> Self {
        Self { df, file_path: path }
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn column(&self, name: &str) -> Result<Series> {
        self.df
            .column(name)
            .map(|c| c.as_materialized_series().clone())
            .map_err(|_| TraceError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    /// Check if a column is a datetime or date type
    pub fn is_datetime_column(&self, name: &str) -> bool {
        self.column(name)
            .map(|s| matches!(s.dtype(), DataType::Datetime(_, _) | DataType::Date))
            .unwrap_or(false)
    }

    /// Numeric values of a column; nulls and unparseable values become NaN
    ///
    /// Datetime/Date columns are converted to Unix timestamps in seconds.
    pub fn column_as_f64(&self, name: &str) -> Result<Vec<f64>> {
        let series = self.column(name)?;

        match series.dtype() {
            DataType::Datetime(unit, _) => {
                let per_second = match unit {
                    TimeUnit::Nanoseconds => 1e9,
                    TimeUnit::Microseconds => 1e6,
                    TimeUnit::Milliseconds => 1e3,
                };
                let values = series
                    .datetime()?
                    .into_iter()
                    .map(|opt| opt.map(|ts| ts as f64 / per_second).unwrap_or(f64::NAN))
                    .collect();
                return Ok(values);
            }
            DataType::Date => {
                let values = series
                    .date()?
                    .into_iter()
                    .map(|opt| opt.map(|days| days as f64 * 86400.0).unwrap_or(f64::NAN))
                    .collect();
                return Ok(values);
            }
            _ => {}
        }

        match series.cast(&DataType::Float64) {
            Ok(s) => Ok(s
                .f64()?
                .into_iter()
                .map(|opt| opt.unwrap_or(f64::NAN))
                .collect()),
            Err(_) => {
                if let Ok(str_series) = series.str() {
                    Ok(str_series
                        .into_iter()
                        .map(|opt| opt.and_then(|s| s.trim().parse::<f64>().ok()).unwrap_or(f64::NAN))
                        .collect())
                } else {
                    Ok(vec![f64::NAN; series.len()])
                }
            }
        }
    }

    /// Column values as state labels; nulls stay `None`
    pub fn column_as_labels(&self, name: &str) -> Result<Vec<Option<String>>> {
        let series = self.column(name)?;
        let strings = series.cast(&DataType::String)?;
        Ok(strings
            .str()?
            .into_iter()
            .map(|opt| opt.map(str::to_owned))
            .collect())
    }

    /// Build a dataset from the chosen columns
    ///
    /// Without a label column each point is labelled with its formatted `y`,
    /// so repeated values collapse like states. Rows with a missing `x` or
    /// `y` become gaps. Rows out of x order are sorted; a gap travels with
    /// the row before it.
    pub fn to_dataset(
        &self,
        x_column: &str,
        y_column: &str,
        label_column: Option<&str>,
        meta: DatasetMeta,
    ) -> Result<Dataset> {
        profiling::scope!("DataSource::to_dataset");

        if self.height() == 0 {
            return Err(TraceError::EmptyDataset);
        }

        let xs = self.column_as_f64(x_column)?;
        let ys = self.column_as_f64(y_column)?;
        let labels = match label_column {
            Some(name) => self.column_as_labels(name)?,
            None => ys
                .iter()
                .map(|y| (!y.is_nan()).then(|| format_value(*y)))
                .collect(),
        };

        let mut points: Vec<PlotPoint> = xs
            .into_iter()
            .zip(ys)
            .zip(labels)
            .map(|((x, y), label)| {
                if x.is_nan() || y.is_nan() {
                    PlotPoint::Gap
                } else {
                    PlotPoint::Real(StatePoint {
                        x,
                        y,
                        label,
                        color: None,
                    })
                }
            })
            .collect();

        let ordered = points
            .iter()
            .filter(|p| !p.is_gap())
            .map(PlotPoint::x)
            .is_sorted();
        if !ordered {
            log::warn!("'{}' is not ordered by '{}', sorting", y_column, x_column);
            points = sort_keeping_gaps(points);
        }

        Ok(Dataset::new(meta, points))
    }
}

/// Stable sort by x where each gap stays right after its preceding row
fn sort_keeping_gaps(points: Vec<PlotPoint>) -> Vec<PlotPoint> {
    let mut runs: Vec<(f64, Vec<PlotPoint>)> = Vec::new();
    for point in points {
        if !point.is_gap() {
            runs.push((point.x(), vec![point]));
            continue;
        }
        match runs.last_mut() {
            Some((_, run)) => run.push(point),
            None => runs.push((f64::NEG_INFINITY, vec![point])),
        }
    }
    runs.sort_by(|a, b| a.0.total_cmp(&b.0));
    runs.into_iter().flat_map(|(_, run)| run).collect()
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}
