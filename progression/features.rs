//! # Feature Normalization
//!
//! The model was trained on the scikit-learn diabetes dataset, where every
//! column is already mean-centered and scaled. Eight of the ten measurements
//! are entered in that normalized form; age and sex are entered the way a
//! clinician reads them and are mapped onto the training representation here.
//!
//! The normalization constants are training-time artifacts. Changing any of
//! them changes what the model predicts.

use ndarray::{Array1, ArrayView1};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of features the model consumes.
pub const NUM_FEATURES: usize = 10;

/// Canonical feature order. Scaler and model parameters follow this order.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "age", "sex", "bmi", "bp", "s1", "s2", "s3", "s4", "s5", "s6",
];

/// Empirical mean age (years) of the training cohort.
pub const AGE_MEAN_YEARS: f64 = 48.5;
/// Empirical standard deviation of age (years) in the training cohort.
pub const AGE_STD_YEARS: f64 = 13.1;

/// Normalized value the training data uses for male patients.
pub const SEX_MALE_VALUE: f64 = 0.051;
/// Normalized value the training data uses for female patients.
pub const SEX_FEMALE_VALUE: f64 = -0.044;

/// Age range accepted by the interactive entry form. Values outside it are
/// still predicted, but logged.
const PLAUSIBLE_AGE_YEARS: std::ops::RangeInclusive<f64> = 18.0..=100.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error(
        "Unsupported sex category '{0}'. Expected one of: male, m, homme, h, female, f, femme."
    )]
    UnsupportedCategory(String),
    #[error("Feature '{feature}' must be a finite number, got {value}.")]
    NonFiniteFeature { feature: &'static str, value: f64 },
}

/// Sex category as recorded in the training distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sex {
    type Err = InputError;

    /// Unknown labels are rejected rather than mapped to a default category.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "homme" | "h" => Ok(Sex::Male),
            "female" | "f" | "femme" => Ok(Sex::Female),
            _ => Err(InputError::UnsupportedCategory(s.to_string())),
        }
    }
}

/// Z-score normalization of age using the training cohort's mean and SD.
pub fn normalize_age(age_years: f64) -> f64 {
    (age_years - AGE_MEAN_YEARS) / AGE_STD_YEARS
}

/// Inverse of [`normalize_age`].
pub fn denormalize_age(age_norm: f64) -> f64 {
    age_norm * AGE_STD_YEARS + AGE_MEAN_YEARS
}

pub fn normalize_sex(sex: Sex) -> f64 {
    match sex {
        Sex::Male => SEX_MALE_VALUE,
        Sex::Female => SEX_FEMALE_VALUE,
    }
}

/// One patient's measurements as they are entered.
///
/// `age_years` and `sex` are human-readable; the remaining eight fields are
/// already in the dataset's normalized units and pass through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicalInputs {
    pub age_years: f64,
    pub sex: Sex,
    pub bmi: f64,
    pub bp: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
    pub s4: f64,
    pub s5: f64,
    pub s6: f64,
}

impl ClinicalInputs {
    /// Assembles the model-ready feature vector in [`FEATURE_NAMES`] order.
    pub fn to_feature_vector(&self) -> Result<FeatureVector, InputError> {
        let passthrough = [
            ("age", self.age_years),
            ("bmi", self.bmi),
            ("bp", self.bp),
            ("s1", self.s1),
            ("s2", self.s2),
            ("s3", self.s3),
            ("s4", self.s4),
            ("s5", self.s5),
            ("s6", self.s6),
        ];
        if let Some(&(feature, value)) = passthrough.iter().find(|(_, v)| !v.is_finite()) {
            return Err(InputError::NonFiniteFeature { feature, value });
        }

        if !PLAUSIBLE_AGE_YEARS.contains(&self.age_years) {
            log::warn!(
                "Age {} years is outside the expected range {:?}; prediction may extrapolate.",
                self.age_years,
                PLAUSIBLE_AGE_YEARS
            );
        }

        let values = Array1::from(vec![
            normalize_age(self.age_years),
            normalize_sex(self.sex),
            self.bmi,
            self.bp,
            self.s1,
            self.s2,
            self.s3,
            self.s4,
            self.s5,
            self.s6,
        ]);
        Ok(FeatureVector(values))
    }
}

/// A finite, ten-element feature vector in canonical order.
///
/// Only [`ClinicalInputs::to_feature_vector`] constructs one, so the length
/// and finiteness invariants always hold.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Array1<f64>);

impl FeatureVector {
    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.0.view()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|idx| self.0[idx])
    }

    pub fn into_inner(self) -> Array1<f64> {
        self.0
    }
}
