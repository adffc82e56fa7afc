#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
pub mod data;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod presets;

pub use features::{ClinicalInputs, FeatureVector, Sex, denormalize_age, normalize_age, normalize_sex};
pub use model::{LinearModel, ModelError, ScalingParameters, load_parameters};
pub use pipeline::{PredictionError, PredictionResult, ProgressionBand, predict, predict_batch};
