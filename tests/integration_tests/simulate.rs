// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against the "simulate" command-line interface.

use num_complex::Complex;
use tempfile::TempDir;

use rime_simulator::{io::read::read_binary_vis, Jones, Settings, VisType};

use crate::{get_cmd_output, rimesim, write_settings};

#[test]
fn test_simulate_writes_visibilities() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("out.vis");
    let settings = write_settings(tmp_dir.path(), &output);

    let cmd = rimesim()
        .args([
            "simulate",
            &settings.display().to_string(),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "simulate failed: {}", get_cmd_output(cmd).1);

    let vis = read_binary_vis(&output).unwrap();
    assert_eq!(vis.vis_type(), VisType::new(true, false));
    let metadata = vis.metadata();
    assert_eq!(metadata.num_channels(), 3);
    assert_eq!(metadata.num_times(), 2);
    assert_eq!(metadata.num_baselines(), 6);

    let vis = vis.downcast::<Jones<f64>>().unwrap();
    assert_eq!(vis.data.dim(), (3, 2, 6));
    // Both sources are up, so every baseline has signal.
    assert!(vis.data.iter().all(|j| j[0].norm() > 0.0 && j[3].norm() > 0.0));
}

#[test]
fn test_cli_overrides_settings_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("out.vis");
    let settings = write_settings(tmp_dir.path(), &output);
    let other_output = tmp_dir.path().join("other.vis");

    #[rustfmt::skip]
    let cmd = rimesim()
        .args([
            "simulate",
            &settings.display().to_string(),
            "--scalar-mode",
            "--single-precision",
            "--num-channels", "1",
            "--outputs", &other_output.display().to_string(),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "simulate failed: {}", get_cmd_output(cmd).1);
    assert!(!output.exists());

    let vis = read_binary_vis(&other_output)
        .unwrap()
        .downcast::<Complex<f32>>()
        .unwrap();
    assert_eq!(vis.data.dim(), (1, 2, 6));
}

#[test]
fn test_dry_run_doesnt_simulate() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("out.vis");
    let settings = write_settings(tmp_dir.path(), &output);

    let cmd = rimesim()
        .args(["simulate", &settings.display().to_string(), "--dry-run"])
        .ok();
    assert!(cmd.is_ok(), "dry run failed: {}", get_cmd_output(cmd).1);
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run -- exiting now."));
    assert!(!output.exists());
}

#[test]
fn test_save_toml() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("out.vis");
    let settings = write_settings(tmp_dir.path(), &output);
    let saved = tmp_dir.path().join("saved.toml");

    #[rustfmt::skip]
    let cmd = rimesim()
        .args([
            "simulate",
            &settings.display().to_string(),
            "--num-time-steps", "5",
            "--save-toml", &saved.display().to_string(),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);

    // The saved file includes the CLI override and reproduces the run.
    let saved_settings: Settings =
        toml::from_str(&std::fs::read_to_string(&saved).unwrap()).unwrap();
    assert_eq!(saved_settings.observation.num_time_steps, Some(5));
    let sim = saved_settings.parse().unwrap();
    assert_eq!(sim.time_grid.num_times, 5);
    assert_eq!(sim.num_sources(), 2);
}

#[test]
fn test_bad_settings_fail() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("out.vis");
    let settings = write_settings(tmp_dir.path(), &output);

    #[rustfmt::skip]
    let cmd = rimesim()
        .args([
            "simulate",
            &settings.display().to_string(),
            "--num-channels", "2",
            "--frequency-inc-hz", "0",
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("frequency increment"), "{stderr}");
    assert!(!output.exists());

    let cmd = rimesim()
        .args(["simulate", "/does/not/exist.toml"])
        .ok();
    assert!(cmd.is_err());
}
