// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{get_cmd_output, rimesim, write_settings};

#[test]
fn test_simulate_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("out.vis");
    let settings = write_settings(tmp_dir.path(), &output);

    let cmd = rimesim()
        .args(["simulate", &settings.display().to_string(), "-vv"])
        .ok();
    assert!(
        cmd.is_ok(),
        "simulate failed on simple settings: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
