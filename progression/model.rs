use crate::features::{FEATURE_NAMES, NUM_FEATURES};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

// --- Public Data Structures ---
// These structs define the human-readable TOML format of the two parameter
// bundles produced by the training script.

/// Per-feature affine standardization fitted on the training set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingParameters {
    /// Optional feature order recorded by the training script. When present it
    /// must match the canonical order exactly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    /// Per-feature value subtracted before scaling (the training mean).
    pub center: Array1<f64>,
    /// Per-feature divisor (the training standard deviation).
    pub scale: Array1<f64>,
}

/// Ordinary least-squares fit on the standardized features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub weights: Array1<f64>,
}

/// Failures while loading or saving a parameter bundle.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Parameter file '{}' was not found. Train the model before running predictions.", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read or write parameter file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML parameter file: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("Failed to serialize parameters to TOML format: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
    #[error("Parameter '{field}' has {found} entries, but the model uses {expected} features.")]
    WrongLength {
        field: &'static str,
        found: usize,
        expected: usize,
    },
    #[error("Parameter '{field}' contains a non-finite value at index {index}.")]
    NonFinite { field: &'static str, index: usize },
    #[error("Scale for feature '{feature}' is zero; the scaler cannot divide by it.")]
    ZeroScale { feature: &'static str },
    #[error("Scaler feature order {found:?} does not match the expected order {expected:?}.")]
    FeatureOrderMismatch {
        found: Vec<String>,
        expected: Vec<String>,
    },
}

impl ScalingParameters {
    /// Checks length, finiteness and non-zero scale.
    pub fn validate(&self) -> Result<(), ModelError> {
        check_vector("center", &self.center)?;
        check_vector("scale", &self.scale)?;

        if let Some(idx) = self.scale.iter().position(|&s| s == 0.0) {
            return Err(ModelError::ZeroScale {
                feature: FEATURE_NAMES[idx],
            });
        }

        if let Some(names) = &self.feature_names {
            if names.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
                return Err(ModelError::FeatureOrderMismatch {
                    found: names.clone(),
                    expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                });
            }
        }

        Ok(())
    }

    /// Saves the scaler to a file in a human-readable TOML format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        write_toml(path.as_ref(), self)
    }

    /// Loads and validates a scaler from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let scaler: Self = read_toml(path)?;
        scaler.validate()?;
        log::info!("Loaded feature scaler from {}", path.display());
        Ok(scaler)
    }
}

impl LinearModel {
    pub fn validate(&self) -> Result<(), ModelError> {
        check_vector("weights", &self.weights)?;
        if !self.intercept.is_finite() {
            return Err(ModelError::NonFinite {
                field: "intercept",
                index: 0,
            });
        }
        Ok(())
    }

    /// Saves the model to a file in a human-readable TOML format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        write_toml(path.as_ref(), self)
    }

    /// Loads and validates a linear model from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let model: Self = read_toml(path)?;
        model.validate()?;
        log::info!(
            "Loaded linear model from {} (intercept {:.4})",
            path.display(),
            model.intercept
        );
        Ok(model)
    }
}

/// Loads both bundles. Either failure is fatal for a host: nothing may be
/// predicted until both are in memory.
pub fn load_parameters(
    model_path: impl AsRef<Path>,
    scaler_path: impl AsRef<Path>,
) -> Result<(LinearModel, ScalingParameters), ModelError> {
    let model = LinearModel::load(model_path)?;
    let scaler = ScalingParameters::load(scaler_path)?;
    Ok((model, scaler))
}

fn check_vector(field: &'static str, values: &Array1<f64>) -> Result<(), ModelError> {
    if values.len() != NUM_FEATURES {
        return Err(ModelError::WrongLength {
            field,
            found: values.len(),
            expected: NUM_FEATURES,
        });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(ModelError::NonFinite { field, index });
    }
    Ok(())
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let toml_string = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    Ok(toml::from_str(&toml_string)?)
}

fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<(), ModelError> {
    let toml_string = toml::to_string_pretty(value)?;
    let mut file = BufWriter::new(fs::File::create(path)?);
    file.write_all(toml_string.as_bytes())?;
    file.flush()?;
    Ok(())
}
