//! CSV input and output.
//!
//! The reader consumes the rectangular panel contract (one row per
//! location × period, named columns for id, period, dependent,
//! coordinates and each explanatory variable). The writers produce the
//! per-location result tables; missing values are written as `NA` so
//! failed locations keep their rows.

use crate::core::panel::{PanelData, PanelError, PanelRow};
use crate::solvers::gwpr::FittedGwpr;
use ::csv::{ReaderBuilder, StringRecord, Writer};
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading or writing panel tables.
#[derive(Debug, Error)]
pub enum PanelIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] ::csv::Error),

    #[error("missing column '{0}' in panel file")]
    MissingColumn(String),

    #[error("could not parse field '{field}' on line {line}")]
    Parse { field: String, line: usize },

    #[error(transparent)]
    Panel(#[from] PanelError),
}

/// Column names of the input panel table.
#[derive(Debug, Clone)]
pub struct PanelSchema {
    pub location_id: String,
    pub time_period: String,
    pub dependent: String,
    pub x_coord: String,
    pub y_coord: String,
    pub explanatory: Vec<String>,
}

impl PanelSchema {
    /// Schema with the given dependent and explanatory column names and
    /// conventional names for the rest.
    pub fn new(dependent: &str, explanatory: &[&str]) -> Self {
        Self {
            location_id: "location_id".to_string(),
            time_period: "time_period".to_string(),
            dependent: dependent.to_string(),
            x_coord: "x".to_string(),
            y_coord: "y".to_string(),
            explanatory: explanatory.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Read a balanced panel from a CSV file.
///
/// The file must contain every column the schema names; the panel
/// contract (balance, constant coordinates) is validated on assembly.
pub fn read_panel<P: AsRef<Path>>(path: P, schema: &PanelSchema) -> Result<PanelData, PanelIoError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = reader.headers()?.clone();

    let col = |name: &str| -> Result<usize, PanelIoError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PanelIoError::MissingColumn(name.to_string()))
    };

    let id_col = col(&schema.location_id)?;
    let period_col = col(&schema.time_period)?;
    let dep_col = col(&schema.dependent)?;
    let x_col = col(&schema.x_coord)?;
    let y_col = col(&schema.y_coord)?;
    let var_cols: Vec<usize> = schema
        .explanatory
        .iter()
        .map(|name| col(name))
        .collect::<Result<_, _>>()?;

    let parse_f64 = |record: &StringRecord, idx: usize, name: &str, line: usize| {
        record
            .get(idx)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .ok_or_else(|| PanelIoError::Parse {
                field: name.to_string(),
                line,
            })
    };

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let line = line + 2; // header is line 1

        let location_id = record
            .get(id_col)
            .ok_or_else(|| PanelIoError::Parse {
                field: schema.location_id.clone(),
                line,
            })?
            .trim()
            .to_string();
        let period = record
            .get(period_col)
            .and_then(|s| s.trim().parse::<i64>().ok())
            .ok_or_else(|| PanelIoError::Parse {
                field: schema.time_period.clone(),
                line,
            })?;
        let dependent = parse_f64(&record, dep_col, &schema.dependent, line)?;
        let cx = parse_f64(&record, x_col, &schema.x_coord, line)?;
        let cy = parse_f64(&record, y_col, &schema.y_coord, line)?;
        let explanatory = schema
            .explanatory
            .iter()
            .zip(var_cols.iter())
            .map(|(name, &idx)| parse_f64(&record, idx, name, line))
            .collect::<Result<Vec<_>, _>>()?;

        rows.push(PanelRow {
            location_id,
            period,
            dependent,
            explanatory,
            coordinates: (cx, cy),
        });
    }

    Ok(PanelData::from_rows(&rows, schema.explanatory.clone())?)
}

fn fmt(v: f64) -> String {
    if v.is_nan() {
        "NA".to_string()
    } else {
        format!("{v}")
    }
}

fn fmt_flag(p: f64, alpha: f64) -> String {
    if p.is_nan() {
        "NA".to_string()
    } else if p < alpha {
        "TRUE".to_string()
    } else {
        "FALSE".to_string()
    }
}

/// Write the local parameter estimates: location_id × (intercept, β_1..K).
pub fn write_parameter_table<P: AsRef<Path>>(
    fitted: &FittedGwpr,
    path: P,
) -> Result<(), PanelIoError> {
    let mut writer = Writer::from_path(path)?;
    let mut header = vec!["location_id".to_string(), "intercept".to_string()];
    header.extend(fitted.var_names().iter().cloned());
    writer.write_record(&header)?;

    for local in fitted.locals() {
        let mut record = vec![local.location_id.clone(), fmt(local.intercept)];
        record.extend(local.coefficients.iter().map(|&v| fmt(v)));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the local t-statistics: location_id × (t_intercept, t_1..K).
pub fn write_tstat_table<P: AsRef<Path>>(
    fitted: &FittedGwpr,
    path: P,
) -> Result<(), PanelIoError> {
    let mut writer = Writer::from_path(path)?;
    let mut header = vec!["location_id".to_string(), "t_intercept".to_string()];
    header.extend(fitted.var_names().iter().map(|v| format!("t_{v}")));
    writer.write_record(&header)?;

    for local in fitted.locals() {
        let mut record = vec![local.location_id.clone(), fmt(local.intercept_t_statistic)];
        record.extend(local.t_statistics.iter().map(|&v| fmt(v)));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the local p-values plus significance flags at the fit's
/// significance level.
pub fn write_pvalue_table<P: AsRef<Path>>(
    fitted: &FittedGwpr,
    path: P,
) -> Result<(), PanelIoError> {
    let alpha = fitted.options().significance_level;
    let mut writer = Writer::from_path(path)?;
    let mut header = vec!["location_id".to_string(), "p_intercept".to_string()];
    header.extend(fitted.var_names().iter().map(|v| format!("p_{v}")));
    header.push("sig_intercept".to_string());
    header.extend(fitted.var_names().iter().map(|v| format!("sig_{v}")));
    writer.write_record(&header)?;

    for local in fitted.locals() {
        let mut record = vec![local.location_id.clone(), fmt(local.intercept_p_value)];
        record.extend(local.p_values.iter().map(|&v| fmt(v)));
        record.push(fmt_flag(local.intercept_p_value, alpha));
        record.extend(local.p_values.iter().map(|&v| fmt_flag(v, alpha)));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the local goodness of fit: location_id × local R².
pub fn write_r2_table<P: AsRef<Path>>(fitted: &FittedGwpr, path: P) -> Result<(), PanelIoError> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(["location_id", "local_r2", "effective_obs"])?;
    for local in fitted.locals() {
        writer.write_record(&[
            local.location_id.clone(),
            fmt(local.local_r_squared),
            fmt(local.effective_obs),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the selected bandwidths: location_id × bandwidth.
pub fn write_bandwidth_table<P: AsRef<Path>>(
    fitted: &FittedGwpr,
    path: P,
) -> Result<(), PanelIoError> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record([
        "location_id",
        "bandwidth",
        "neighbor_count",
        "cv_score",
        "exhausted",
    ])?;
    let selection = fitted.selection();
    for (i, local) in fitted.locals().iter().enumerate() {
        writer.write_record(&[
            local.location_id.clone(),
            fmt(local.bandwidth),
            local.neighbor_count.to_string(),
            fmt(selection.cv_scores[i]),
            if local.bandwidth_exhausted {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            },
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the location-to-location distance matrix.
pub fn write_distance_table<P: AsRef<Path>>(
    fitted: &FittedGwpr,
    path: P,
) -> Result<(), PanelIoError> {
    let mut writer = Writer::from_path(path)?;
    let ids = fitted.location_ids();
    let mut header = vec!["location_id".to_string()];
    header.extend(ids.iter().cloned());
    writer.write_record(&header)?;

    let distances = fitted.distance_matrix();
    for (i, id) in ids.iter().enumerate() {
        let mut record = vec![id.clone()];
        record.extend((0..ids.len()).map(|j| fmt(distances.get(i, j))));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the full weight matrix: one row per location, one column per
/// observation.
pub fn write_weight_table<P: AsRef<Path>>(
    fitted: &FittedGwpr,
    path: P,
) -> Result<(), PanelIoError> {
    let mut writer = Writer::from_path(path)?;
    let weights = fitted.weight_matrix();
    let mut header = vec!["location_id".to_string()];
    header.extend((0..weights.ncols()).map(|s| format!("obs_{s}")));
    writer.write_record(&header)?;

    for (i, id) in fitted.location_ids().iter().enumerate() {
        let mut record = vec![id.clone()];
        record.extend((0..weights.ncols()).map(|s| fmt(weights[(i, s)])));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write all result tables into a directory, creating it if needed.
///
/// Files: parameters.csv, tstats.csv, pvalues.csv, local_r2.csv,
/// bandwidths.csv, distances.csv, weights.csv.
pub fn write_tables<P: AsRef<Path>>(fitted: &FittedGwpr, dir: P) -> Result<(), PanelIoError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    write_parameter_table(fitted, dir.join("parameters.csv"))?;
    write_tstat_table(fitted, dir.join("tstats.csv"))?;
    write_pvalue_table(fitted, dir.join("pvalues.csv"))?;
    write_r2_table(fitted, dir.join("local_r2.csv"))?;
    write_bandwidth_table(fitted, dir.join("bandwidths.csv"))?;
    write_distance_table(fitted, dir.join("distances.csv"))?;
    write_weight_table(fitted, dir.join("weights.csv"))?;
    Ok(())
}
