//! Quick-test patients used to sanity-check a freshly trained model.
//!
//! Each preset carries the score its authors expected when the reference
//! model was trained; it is a hint for eyeballing, not a tolerance.

use crate::features::{ClinicalInputs, Sex};

#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub expected_score_hint: f64,
    pub inputs: ClinicalInputs,
}

pub fn all() -> Vec<Preset> {
    vec![
        Preset {
            name: "normal",
            description: "Typical patient",
            expected_score_hint: 150.0,
            inputs: ClinicalInputs {
                age_years: 50.0,
                sex: Sex::Male,
                bmi: 0.062,
                bp: 0.022,
                s1: -0.005,
                s2: -0.008,
                s3: -0.004,
                s4: -0.002,
                s5: 0.003,
                s6: 0.018,
            },
        },
        Preset {
            name: "low",
            description: "Slow progression",
            expected_score_hint: 70.0,
            inputs: ClinicalInputs {
                age_years: 40.0,
                sex: Sex::Male,
                bmi: -0.040,
                bp: -0.050,
                s1: -0.060,
                s2: -0.080,
                s3: 0.050,
                s4: -0.040,
                s5: -0.070,
                s6: -0.050,
            },
        },
        Preset {
            name: "high",
            description: "Rapid progression",
            expected_score_hint: 280.0,
            inputs: ClinicalInputs {
                age_years: 58.0,
                sex: Sex::Male,
                bmi: 0.120,
                bp: 0.080,
                s1: 0.090,
                s2: 0.100,
                s3: -0.080,
                s4: 0.050,
                s5: 0.150,
                s6: 0.120,
            },
        },
        Preset {
            name: "average",
            description: "Cohort-average measurements",
            expected_score_hint: 152.0,
            inputs: ClinicalInputs {
                age_years: 48.0,
                sex: Sex::Female,
                bmi: 0.0,
                bp: 0.0,
                s1: 0.0,
                s2: 0.0,
                s3: 0.0,
                s4: 0.0,
                s5: 0.0,
                s6: 0.0,
            },
        },
    ]
}

/// Case-insensitive lookup by preset name.
pub fn find(name: &str) -> Option<Preset> {
    all()
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_have_unique_names() {
        let presets = all();
        let mut names: Vec<_> = presets.iter().map(|p| p.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), presets.len());
    }

    #[test]
    fn lookup_ignores_case() {
        let average = find("Average").expect("average preset");
        assert_eq!(average.inputs.sex, Sex::Female);
        assert_eq!(average.inputs.age_years, 48.0);
        assert!(find("missing").is_none());
    }

    #[test]
    fn every_preset_builds_a_feature_vector() {
        for preset in all() {
            assert!(preset.inputs.to_feature_vector().is_ok(), "{}", preset.name);
        }
    }
}
