//! End-to-end tests for the ogrconv binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn ogrconv() -> Command {
    Command::cargo_bin("ogrconv").expect("binary should build")
}

#[test]
fn formats_lists_all_catalogs() {
    ogrconv()
        .arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vector file formats"))
        .stdout(predicate::str::contains("GeoJSON"))
        .stdout(predicate::str::contains("PostgreSQL"))
        .stdout(predicate::str::contains("WFS"));
}

#[test]
fn formats_kind_filter_restricts_listing() {
    ogrconv()
        .args(["formats", "--kind", "web-service"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WFS"))
        .stdout(predicate::str::contains("GeoJSON").not());
}

#[test]
fn projections_lists_epsg_catalog() {
    ogrconv()
        .arg("projections")
        .assert()
        .success()
        .stdout(predicate::str::contains("4326"))
        .stdout(predicate::str::contains("WGS 84"));
}

#[test]
fn projections_filter_narrows_output() {
    ogrconv()
        .args(["projections", "lambert"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lambert"))
        .stdout(predicate::str::contains("WGS 84 / Pseudo-Mercator").not());
}

#[test]
fn preview_reproduces_minimal_invocation() {
    ogrconv()
        .args([
            "preview",
            "--source",
            "/data/a.shp",
            "--target-format",
            "GeoJSON",
            "--target",
            "/out/a.geojson",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"ogr2ogr -f "GeoJSON" "/out/a.geojson" "/data/a.shp" -overwrite"#,
        ));
}

#[test]
fn preview_prepends_web_service_token() {
    ogrconv()
        .args([
            "preview",
            "--from",
            "web-service",
            "--source",
            "http://host/wfs",
            "--to",
            "folder",
            "--target",
            "/out",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""WFS:http://host/wfs""#));
}

#[test]
fn preview_keeps_sql_query_verbatim() {
    ogrconv()
        .args([
            "preview",
            "--source",
            "/data/a.shp",
            "--target",
            "/out/a.shp",
            "--query",
            "SELECT * FROM t WHERE id>1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"-sql "SELECT * FROM t WHERE id>1""#,
        ));
}

#[test]
fn preview_expands_folder_entries() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.shp", "b.shp"] {
        std::fs::File::create(dir.path().join(name)).unwrap();
    }
    let source = dir.path().to_string_lossy().to_string();

    ogrconv()
        .args([
            "preview",
            "--from",
            "folder",
            "--source",
            source.as_str(),
            "--to",
            "folder",
            "--target",
            "/out",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("a.shp"))
        .stdout(predicate::str::contains("b.shp"));
}

#[test]
fn preview_warns_on_append_to_folder() {
    ogrconv()
        .args([
            "preview",
            "--from",
            "folder",
            "--source",
            "/no/such/folder",
            "--mode",
            "append",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("advisory:"));
}

#[test]
fn preview_rejects_unknown_target_format() {
    ogrconv()
        .args(["preview", "--target-format", "NoSuchFormat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown file format 'NoSuchFormat'"));
}

#[test]
fn preview_rejects_disallowed_target_kind() {
    ogrconv()
        .args([
            "preview",
            "--from",
            "web-service",
            "--source",
            "http://host/wfs",
            "--to",
            "file",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot write to a file target"));
}

#[test]
fn run_without_selection_is_not_ready() {
    ogrconv()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not ready to execute"));
}

#[test]
fn run_with_missing_tool_reports_every_entry() {
    ogrconv()
        .args([
            "run",
            "--source",
            "/data/a.shp",
            "--target",
            "/out/a.geojson",
            "--tool",
            "/definitely/not/ogr2ogr",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("failed"))
        .stderr(predicate::str::contains("1 of 1 entries failed"));
}
