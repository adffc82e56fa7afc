//! # Prediction Pipeline
//!
//! Scaling, linear inference and band classification. Every step is a pure
//! function of its inputs: the scaler and model are only ever borrowed, so a
//! host may share one loaded copy between any number of callers.

use crate::features::{FEATURE_NAMES, NUM_FEATURES};
use crate::model::{LinearModel, ScalingParameters};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Lower bound (inclusive) of the MODERATE band.
pub const MODERATE_THRESHOLD: f64 = 100.0;
/// Lower bound (inclusive) of the HIGH band.
pub const HIGH_THRESHOLD: f64 = 150.0;
/// Lower bound (inclusive) of the VERY_HIGH band.
pub const VERY_HIGH_THRESHOLD: f64 = 200.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Dimension mismatch in {what}: found {found} values, but the model expects {expected}.")]
    DimensionMismatch {
        what: &'static str,
        found: usize,
        expected: usize,
    },
    #[error(
        "Feature '{feature}' scales to {value}, which is outside the representable range. Check the input value."
    )]
    NonFiniteScaledFeature { feature: &'static str, value: f64 },
    #[error("The linear model produced a non-finite score ({0}).")]
    NonFiniteScore(f64),
    #[error("Row {row}: {source}")]
    InRow {
        row: usize,
        #[source]
        source: Box<PredictionError>,
    },
}

/// Qualitative interpretation of a progression score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressionBand {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl ProgressionBand {
    /// Left-closed partition of the real line at 100, 150 and 200.
    pub fn classify(score: f64) -> Self {
        if score < MODERATE_THRESHOLD {
            ProgressionBand::Low
        } else if score < HIGH_THRESHOLD {
            ProgressionBand::Moderate
        } else if score < VERY_HIGH_THRESHOLD {
            ProgressionBand::High
        } else {
            ProgressionBand::VeryHigh
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProgressionBand::Low => "LOW",
            ProgressionBand::Moderate => "MODERATE",
            ProgressionBand::High => "HIGH",
            ProgressionBand::VeryHigh => "VERY_HIGH",
        }
    }

    pub fn interpretation(self) -> &'static str {
        match self {
            ProgressionBand::Low => "The patient shows slow disease progression.",
            ProgressionBand::Moderate => "The patient shows average disease progression.",
            ProgressionBand::High => "The patient shows rapid disease progression.",
            ProgressionBand::VeryHigh => "The patient shows very rapid disease progression.",
        }
    }
}

impl fmt::Display for ProgressionBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    pub score: f64,
    pub band: ProgressionBand,
}

/// Applies the affine scaler: `(raw - center) / scale`, element-wise.
///
/// Finite inputs far outside the training range can overflow here; those are
/// rejected instead of flowing into the score.
pub fn scale_features(
    raw: ArrayView1<f64>,
    scaling: &ScalingParameters,
) -> Result<Array1<f64>, PredictionError> {
    check_len("feature vector", raw.len())?;
    check_len("scaler center", scaling.center.len())?;
    check_len("scaler scale", scaling.scale.len())?;

    let scaled = (&raw - &scaling.center) / &scaling.scale;
    if let Some(idx) = scaled.iter().position(|v| !v.is_finite()) {
        return Err(PredictionError::NonFiniteScaledFeature {
            feature: FEATURE_NAMES[idx],
            value: scaled[idx],
        });
    }
    Ok(scaled)
}

/// Computes `scaled · weights + intercept`.
pub fn linear_score(scaled: ArrayView1<f64>, model: &LinearModel) -> Result<f64, PredictionError> {
    check_len("scaled feature vector", scaled.len())?;
    check_len("model weights", model.weights.len())?;

    let score = scaled.dot(&model.weights) + model.intercept;
    if !score.is_finite() {
        return Err(PredictionError::NonFiniteScore(score));
    }
    Ok(score)
}

/// Scales `raw`, applies the linear model and classifies the score.
///
/// `raw` must be in the canonical feature order with age and sex already
/// normalized (see [`crate::features::ClinicalInputs::to_feature_vector`]).
pub fn predict(
    raw: ArrayView1<f64>,
    scaling: &ScalingParameters,
    model: &LinearModel,
) -> Result<PredictionResult, PredictionError> {
    let scaled = scale_features(raw, scaling)?;
    let score = linear_score(scaled.view(), model)?;
    let band = ProgressionBand::classify(score);

    log::debug!("Scaled features {scaled} -> score {score:.4} ({band})");

    Ok(PredictionResult { score, band })
}

/// Predicts every row of `rows`, shape `[n_samples, NUM_FEATURES]`.
pub fn predict_batch(
    rows: ArrayView2<f64>,
    scaling: &ScalingParameters,
    model: &LinearModel,
) -> Result<Vec<PredictionResult>, PredictionError> {
    check_len("feature matrix columns", rows.ncols())?;

    rows.axis_iter(Axis(0))
        .enumerate()
        .map(|(i, row)| {
            predict(row, scaling, model).map_err(|source| PredictionError::InRow {
                row: i + 1,
                source: Box::new(source),
            })
        })
        .collect()
}

fn check_len(what: &'static str, found: usize) -> Result<(), PredictionError> {
    if found != NUM_FEATURES {
        return Err(PredictionError::DimensionMismatch {
            what,
            found,
            expected: NUM_FEATURES,
        });
    }
    Ok(())
}
