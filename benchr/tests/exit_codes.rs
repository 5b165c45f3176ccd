use std::process::Command;

use anyhow::Context as _;

fn status_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

fn run_benchr(args: &[&str]) -> anyhow::Result<std::process::Output> {
    Command::new(env!("CARGO_BIN_EXE_benchr"))
        .args(args)
        .output()
        .context("run benchr binary")
}

fn expect_code(out: &std::process::Output, code: i32) -> anyhow::Result<()> {
    anyhow::ensure!(
        status_code(out.status) == code,
        "expected exit code {code}, got {}\nstdout:\n{}\nstderr:\n{}",
        status_code(out.status),
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    Ok(())
}

#[test]
fn help_and_version_exit_0() -> anyhow::Result<()> {
    let out = run_benchr(&["-h"])?;
    expect_code(&out, 0)?;
    anyhow::ensure!(String::from_utf8_lossy(&out.stdout).contains("--connections"));

    let out = run_benchr(&["-v"])?;
    expect_code(&out, 0)?;
    anyhow::ensure!(String::from_utf8_lossy(&out.stdout).contains(env!("CARGO_PKG_VERSION")));

    Ok(())
}

#[test]
fn invalid_flags_exit_30() -> anyhow::Result<()> {
    expect_code(&run_benchr(&[])?, 30)?;
    expect_code(&run_benchr(&["-l", "localhost:1", "-c", "0"])?, 30)?;
    expect_code(&run_benchr(&["-l", "localhost:1", "--timeout", "10x"])?, 30)?;
    expect_code(&run_benchr(&["-l", "localhost:1", "-m", "DELETE"])?, 30)?;
    Ok(())
}

#[test]
fn unreadable_or_malformed_batch_exit_30() -> anyhow::Result<()> {
    let dir = tempfile::tempdir().context("tempdir")?;

    let missing = dir.path().join("missing.json");
    let missing = missing.to_string_lossy();
    expect_code(&run_benchr(&["-f", &missing])?, 30)?;

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "[{\"url\": ").context("write bad.json")?;
    let out = run_benchr(&["-f", &bad.to_string_lossy()])?;
    expect_code(&out, 30)?;
    anyhow::ensure!(
        String::from_utf8_lossy(&out.stderr).contains("failed to read batch file"),
        "stderr:\n{}",
        String::from_utf8_lossy(&out.stderr)
    );

    Ok(())
}

#[test]
fn script_failures_exit_20() -> anyhow::Result<()> {
    let dir = tempfile::tempdir().context("tempdir")?;

    let missing = dir.path().join("missing.lua");
    expect_code(
        &run_benchr(&["-l", "localhost:1", "-s", &missing.to_string_lossy()])?,
        20,
    )?;

    let script = dir.path().join("init_false.lua");
    std::fs::write(
        &script,
        "function init() return false end\nfunction request(r) return true end\nfunction check(b) return true end\n",
    )
    .context("write script")?;
    expect_code(
        &run_benchr(&["-l", "localhost:1", "-s", &script.to_string_lossy()])?,
        20,
    )?;

    Ok(())
}

#[test]
fn unwritable_log_file_exit_30() -> anyhow::Result<()> {
    let dir = tempfile::tempdir().context("tempdir")?;
    let log = dir.path().join("no-such-dir").join("errors.log");

    let out = run_benchr(&[
        "-l",
        "localhost:1",
        "-L",
        &log.to_string_lossy(),
    ])?;
    expect_code(&out, 30)
}
