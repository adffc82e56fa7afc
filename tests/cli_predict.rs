use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tempfile::tempdir;

fn bundled(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("models")
        .join(name)
        .to_str()
        .expect("path str")
        .to_string()
}

fn parameter_args() -> [String; 4] {
    [
        "--model".to_string(),
        bundled("diabetes_model.toml"),
        "--scaler".to_string(),
        bundled("diabetes_scaler.toml"),
    ]
}

#[test]
fn predict_preset_prints_score_and_band() {
    let exe = env!("CARGO_BIN_EXE_diaprog");
    let output = Command::new(exe)
        .args(["predict", "--preset", "low"])
        .args(parameter_args())
        .output()
        .expect("run diaprog cli");

    assert!(output.status.success(), "CLI exited with {:?}", output.status);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Predicted progression score: 60.78"), "{stdout}");
    assert!(stdout.contains("Interpretation: LOW"), "{stdout}");
}

#[test]
fn explicit_flags_accept_negative_measurements() {
    let exe = env!("CARGO_BIN_EXE_diaprog");
    let output = Command::new(exe)
        .args([
            "predict", "--age", "40", "--sex", "homme", "--bmi", "-0.040", "--bp", "-0.050",
            "--s1", "-0.060", "--s2", "-0.080", "--s3", "0.050", "--s4", "-0.040", "--s5",
            "-0.070", "--s6", "-0.050",
        ])
        .args(parameter_args())
        .output()
        .expect("run diaprog cli");

    assert!(output.status.success(), "CLI exited with {:?}", output.status);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("60.78"), "{stdout}");
}

#[test]
fn missing_model_file_fails_before_predicting() {
    let tmp = tempdir().expect("temporary directory");
    let exe = env!("CARGO_BIN_EXE_diaprog");
    let output = Command::new(exe)
        .current_dir(tmp.path())
        .args(["predict", "--preset", "average"])
        .output()
        .expect("run diaprog cli");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("was not found"), "{stderr}");
    assert!(!String::from_utf8_lossy(&output.stdout).contains("Predicted"));
}

#[test]
fn unsupported_sex_is_rejected() {
    let exe = env!("CARGO_BIN_EXE_diaprog");
    let output = Command::new(exe)
        .args(["predict", "--age", "50", "--sex", "unknown"])
        .args(parameter_args())
        .output()
        .expect("run diaprog cli");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unsupported sex category"));
}

#[test]
fn infer_writes_predictions_tsv() {
    let tmp = tempdir().expect("temporary directory");
    let input = tmp.path().join("patients.tsv");
    let data = "sample_id\tage\tsex\tbmi\tbp\ts1\ts2\ts3\ts4\ts5\ts6\n\
low\t40\tHomme\t-0.040\t-0.050\t-0.060\t-0.080\t0.050\t-0.040\t-0.070\t-0.050\n\
high\t58\tHomme\t0.120\t0.080\t0.090\t0.100\t-0.080\t0.050\t0.150\t0.120\n";
    fs::write(&input, data).expect("write patients");

    let exe = env!("CARGO_BIN_EXE_diaprog");
    let status = Command::new(exe)
        .current_dir(tmp.path())
        .args(["infer", input.to_str().expect("path str")])
        .args(parameter_args())
        .status()
        .expect("run diaprog cli");
    assert!(status.success(), "CLI exited with status {status:?}");

    let written = fs::read_to_string(tmp.path().join("predictions.tsv")).expect("predictions");
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "sample_id\tscore\tband");
    assert!(lines[1].starts_with("low\t60.77"), "{}", lines[1]);
    assert!(lines[1].ends_with("\tLOW"));
    assert!(lines[2].ends_with("\tVERY_HIGH"));
}

#[test]
fn overflowing_measurement_fails_instead_of_classifying() {
    let exe = env!("CARGO_BIN_EXE_diaprog");
    let output = Command::new(exe)
        .args(["predict", "--bmi=1e308", "--bp=-1e308"])
        .args(parameter_args())
        .output()
        .expect("run diaprog cli");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Feature 'bmi'"), "{stderr}");
    assert!(!String::from_utf8_lossy(&output.stdout).contains("Interpretation"));
}

#[test]
fn infer_with_overflowing_row_writes_no_report() {
    let tmp = tempdir().expect("temporary directory");
    let input = tmp.path().join("patients.tsv");
    let data = "sample_id\tage\tsex\tbmi\tbp\ts1\ts2\ts3\ts4\ts5\ts6\n\
ok\t50\tm\t0\t0\t0\t0\t0\t0\t0\t0\n\
huge\t50\tm\t1e308\t-1e308\t0\t0\t0\t0\t0\t0\n";
    fs::write(&input, data).expect("write patients");

    let exe = env!("CARGO_BIN_EXE_diaprog");
    let output = Command::new(exe)
        .current_dir(tmp.path())
        .args(["infer", input.to_str().expect("path str")])
        .args(parameter_args())
        .output()
        .expect("run diaprog cli");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Row 2"), "{stderr}");
    assert!(!tmp.path().join("predictions.tsv").exists());
}

#[test]
fn presets_command_lists_all_patients() {
    let exe = env!("CARGO_BIN_EXE_diaprog");
    let output = Command::new(exe)
        .arg("presets")
        .output()
        .expect("run diaprog cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["normal", "low", "high", "average"] {
        assert!(stdout.contains(name), "{stdout}");
    }
}
