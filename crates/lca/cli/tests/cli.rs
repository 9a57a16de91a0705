//! Command-line behavior of the `lca` binary.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn lca() -> Command {
    let mut cmd = Command::cargo_bin("lca").unwrap();
    // Keep a user's own config file out of the picture.
    cmd.arg("--config").arg(fixture("missing-config.toml"));
    cmd
}

#[test]
fn materials_lists_demo_data_as_json() {
    lca()
        .arg("materials")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"PET\"").and(predicate::str::contains("BAMBOO")));
}

#[test]
fn materials_table_lists_regions() {
    lca()
        .args(["--output", "table", "materials", "--table", "regions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("europe"));
}

#[test]
fn assess_reports_impacts_and_hotspots() {
    let output = lca()
        .arg("assess")
        .arg(fixture("virgin-bottle.toml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let gwp = report["impacts"]["impacts"]["global-warming-potential"]["value"]
        .as_f64()
        .unwrap();
    assert!(gwp > 0.1 && gwp < 0.2, "gwp = {}", gwp);
    assert_eq!(report["hotspots"][0]["severity"], "critical");
    assert!(report["circularity"]["composite"].as_f64().unwrap() > 0.0);
}

#[test]
fn unknown_material_names_the_line() {
    lca()
        .arg("assess")
        .arg(fixture("unknown-material.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("lines[0].material"));
}

#[test]
fn simulate_rejects_too_few_samples() {
    lca()
        .args(["simulate", "--samples", "0"])
        .arg(fixture("virgin-bottle.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("monte_carlo.samples"));
}

#[test]
fn simulate_is_reproducible() {
    let run = || {
        lca()
            .args(["simulate", "--samples", "200", "--seed", "7"])
            .arg(fixture("recycled-bottle.json"))
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn compare_two_products_uses_welch() {
    lca()
        .args(["compare", "--samples", "300"])
        .arg(fixture("virgin-bottle.toml"))
        .arg(fixture("recycled-bottle.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("welch_t").and(predicate::str::contains("significant")));
}

#[test]
fn compare_needs_two_products() {
    lca()
        .arg("compare")
        .arg(fixture("virgin-bottle.toml"))
        .assert()
        .failure();
}

#[test]
fn sensitivity_top_factors() {
    let output = lca()
        .args(["sensitivity", "--top", "3"])
        .arg(fixture("virgin-bottle.toml"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let ranking: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(ranking.as_array().unwrap().len(), 3);
}

#[test]
fn scenarios_weigh_alternatives() {
    let output = lca()
        .arg("scenarios")
        .arg(fixture("bottle-scenarios.toml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let analysis: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let outcomes = analysis["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!((outcomes[0]["weight"].as_f64().unwrap() - 0.3).abs() < 1e-12);
    let (virgin, recycled) = (
        outcomes[0]["value"].as_f64().unwrap(),
        outcomes[1]["value"].as_f64().unwrap(),
    );
    assert!(recycled < virgin);
    let expected = analysis["expected_value"].as_f64().unwrap();
    assert!((expected - (0.3 * virgin + 0.7 * recycled)).abs() < 1e-12);
}

#[test]
fn scenarios_reject_negative_probability() {
    lca()
        .arg("scenarios")
        .arg(fixture("bad-scenarios.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("scenarios[0].probability"));
}
