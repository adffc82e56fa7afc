//! # Batch Data Loading
//!
//! Reads a tab-separated table of patients and writes the matching
//! predictions report. The schema is fixed: `age`, `sex`, `bmi`, `bp`, and
//! `s1` through `s6` are required, `sample_id` is optional. Column order in
//! the file does not matter.
//!
//! Failures are assumed to be user-input errors, so every row-level error
//! carries the 1-based data row it came from.

use crate::features::{
    ClinicalInputs, FEATURE_NAMES, FeatureVector, InputError, NUM_FEATURES, Sex,
};
use crate::pipeline::{PredictionError, PredictionResult, ProgressionBand};
use ndarray::Array2;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

const SAMPLE_ID_COLUMN: &str = "sample_id";

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Error reading or writing TSV data: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error(
        "The required column '{0}' was not found in the input file. Please check spelling and case."
    )]
    ColumnNotFound(String),
    #[error("Row {row}: column '{column}' has value '{value}', which is not a number.")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("Row {row}: {source}")]
    InvalidInput {
        row: usize,
        #[source]
        source: InputError,
    },
    #[error("The input file contains no data rows.")]
    NoRows,
    #[error("Cannot write {results} predictions for {samples} samples.")]
    LengthMismatch { samples: usize, results: usize },
    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

/// Validated patients, ready for prediction.
#[derive(Debug, Clone)]
pub struct PatientBatch {
    /// From the `sample_id` column, or 1-based row numbers when it is absent.
    pub sample_ids: Vec<String>,
    pub inputs: Vec<ClinicalInputs>,
    /// Normalized features, one per entry of `inputs`, built while loading.
    pub features: Vec<FeatureVector>,
}

/// One line of the predictions report. Field names become the header.
#[derive(Serialize)]
struct PredictionRow<'a> {
    sample_id: &'a str,
    score: f64,
    band: ProgressionBand,
}

impl PatientBatch {
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Normalized features, shape `[n_samples, NUM_FEATURES]`.
    pub fn feature_matrix(&self) -> Array2<f64> {
        let mut matrix = Array2::zeros((self.features.len(), NUM_FEATURES));
        for (mut row, features) in matrix.rows_mut().into_iter().zip(&self.features) {
            row.assign(&features.view());
        }
        matrix
    }
}

/// Loads and validates a patient table for prediction.
pub fn load_patient_data(path: impl AsRef<Path>) -> Result<PatientBatch, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let headers = reader.headers()?.clone();
    let mut column_idx = [0usize; NUM_FEATURES];
    for (slot, name) in column_idx.iter_mut().zip(FEATURE_NAMES) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::ColumnNotFound(name.to_string()))?;
    }
    let id_idx = headers.iter().position(|h| h == SAMPLE_ID_COLUMN);

    let mut sample_ids = Vec::new();
    let mut inputs = Vec::new();
    let mut features = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let field = |col: usize| record.get(column_idx[col]).unwrap_or("");
        let number = |col: usize| -> Result<f64, DataError> {
            let raw = field(col);
            raw.parse::<f64>().map_err(|_| DataError::InvalidNumber {
                row,
                column: FEATURE_NAMES[col],
                value: raw.to_string(),
            })
        };

        let sex = field(1)
            .parse::<Sex>()
            .map_err(|source| DataError::InvalidInput { row, source })?;

        let patient = ClinicalInputs {
            age_years: number(0)?,
            sex,
            bmi: number(2)?,
            bp: number(3)?,
            s1: number(4)?,
            s2: number(5)?,
            s3: number(6)?,
            s4: number(7)?,
            s5: number(8)?,
            s6: number(9)?,
        };
        // Reject NaN/inf here so the row number is reported.
        let row_features = patient
            .to_feature_vector()
            .map_err(|source| DataError::InvalidInput { row, source })?;

        let id = id_idx
            .and_then(|idx| record.get(idx))
            .filter(|s| !s.is_empty())
            .map_or_else(|| row.to_string(), str::to_string);
        sample_ids.push(id);
        inputs.push(patient);
        features.push(row_features);
    }

    if inputs.is_empty() {
        return Err(DataError::NoRows);
    }

    log::info!(
        "Loaded {} patients from {}",
        inputs.len(),
        path.as_ref().display()
    );
    Ok(PatientBatch {
        sample_ids,
        inputs,
        features,
    })
}

/// Writes `sample_id, score, band` as a TSV report.
pub fn save_predictions(
    path: impl AsRef<Path>,
    sample_ids: &[String],
    results: &[PredictionResult],
) -> Result<(), DataError> {
    if sample_ids.len() != results.len() {
        return Err(DataError::LengthMismatch {
            samples: sample_ids.len(),
            results: results.len(),
        });
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path.as_ref())?;
    for (id, result) in sample_ids.iter().zip(results) {
        writer.serialize(PredictionRow {
            sample_id: id,
            score: result.score,
            band: result.band,
        })?;
    }
    writer.flush()?;
    Ok(())
}
