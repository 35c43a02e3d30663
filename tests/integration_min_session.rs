// Drives the compiled binary through a pseudo terminal so the real event loop,
// countdown thread and crossterm input handling all take part.
//
// Unix only and ignored by default since it needs a PTY.
// Run with: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_types_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let bin = assert_cmd::cargo::cargo_bin("typesprint");
    // keep the saved duration out of the real config dir
    let cmd = format!(
        "env XDG_CONFIG_HOME={} {} -d 15 -w 20 --seed 7 --log-file {}",
        dir.path().display(),
        bin.display(),
        dir.path().join("typesprint.log").display()
    );

    let mut p = spawn(cmd)?;

    std::thread::sleep(Duration::from_millis(200));

    // starts the countdown, then lets at least one tick land
    p.send("some words ")?;
    std::thread::sleep(Duration::from_millis(1200));

    // tab resets, right arrow changes the duration while idle
    p.send("\t")?;
    p.send("\x1b[C")?;
    std::thread::sleep(Duration::from_millis(200));

    p.send("\x1b")?; // ESC
    p.expect(Eof)?;
    Ok(())
}
