use assert_cmd::prelude::*;
use once_cell::sync::Lazy;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

static BOARD_STL: Lazy<String> = Lazy::new(|| {
    "\
solid board
  facet normal 0 0 1
    outer loop
      vertex -0.5 -0.5 0
      vertex 0.5 -0.5 0
      vertex 0 0.5 0
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 0.5 -0.5 0
      vertex 0.5 0.5 0
      vertex 0 0.5 0
    endloop
  endfacet
endsolid board
"
    .to_string()
});

fn write_board_stl() -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp model");
    tmp.write_all(BOARD_STL.as_bytes()).expect("write model");
    tmp
}

#[test]
fn pinball_headless_spawns_up_to_the_cap() {
    let model = write_board_stl();
    let mut cmd = Command::cargo_bin("pinboard").expect("binary exists");
    cmd.arg("pinball")
        .arg("--headless")
        .arg("--frames")
        .arg("10")
        .arg("--balls")
        .arg("4")
        .arg("--drop-rate")
        .arg("2")
        .arg("--seed")
        .arg("7")
        .arg("--model")
        .arg(model.path());
    // 10 ticks at interval 2 give 5 spawn slots, capped at balls - 1 = 3.
    // Bodies: ground + cover + board + 3 balls.
    cmd.assert()
        .success()
        .stdout(contains("Demo: pinball"))
        .stdout(contains("Scene objects: 6"))
        .stdout(contains("Spawned 3 of cap 4"))
        .stdout(contains("Simulated bodies: 6"));
}

#[test]
fn showcase_headless_never_spawns() {
    let model = write_board_stl();
    let mut cmd = Command::cargo_bin("pinboard").expect("binary exists");
    cmd.arg("showcase")
        .arg("--headless")
        .arg("--frames")
        .arg("5")
        .arg("--model")
        .arg(model.path());
    cmd.assert()
        .success()
        .stdout(contains("Demo: showcase"))
        .stdout(contains("Scene objects: 3"))
        .stdout(contains("Spawned 0 of cap 410"))
        .stdout(contains("Simulated bodies: 0"));
}

#[test]
fn missing_model_degrades_without_spawning() {
    let mut cmd = Command::cargo_bin("pinboard").expect("binary exists");
    cmd.arg("pinball")
        .arg("--headless")
        .arg("--frames")
        .arg("10")
        .arg("--balls")
        .arg("4")
        .arg("--drop-rate")
        .arg("1")
        .arg("--model")
        .arg("does/not/exist.stl");
    cmd.assert()
        .success()
        .stdout(contains("Scene objects: 2"))
        .stdout(contains("Spawned 0 of cap 4"))
        .stdout(contains("Simulated bodies: 2"));
}

#[test]
fn unknown_demo_is_rejected_with_usage() {
    let mut cmd = Command::cargo_bin("pinboard").expect("binary exists");
    cmd.arg("flipper");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown demo"))
        .stderr(contains("Usage: pinboard"));
}
