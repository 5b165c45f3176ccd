use std::process::Command;

use anyhow::Context as _;
use benchr_testserver::{HELLO_BODY, TestServer};

async fn run_benchr(args: Vec<String>) -> anyhow::Result<std::process::Output> {
    let exe = env!("CARGO_BIN_EXE_benchr");
    tokio::task::spawn_blocking(move || Command::new(exe).args(&args).output())
        .await
        .context("spawn_blocking join")?
        .context("run benchr binary")
}

fn ensure_success(out: &std::process::Output) -> anyhow::Result<()> {
    anyhow::ensure!(
        out.status.success(),
        "benchr failed: {:?}\nstdout:\n{}\nstderr:\n{}",
        out.status.code(),
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn single_url_prints_human_report() -> anyhow::Result<()> {
    let server = TestServer::start().await.context("start test server")?;
    let url = server.urls().hello.clone();

    let out = run_benchr(vec![
        "-l".into(),
        url,
        "-c".into(),
        "5".into(),
        "-n".into(),
        "10".into(),
    ])
    .await?;
    ensure_success(&out)?;

    let stdout = String::from_utf8_lossy(&out.stdout);
    for needle in [
        "Benchmark Times(1):",
        "Connections(Workers): 5",
        "Success Total: 10 reqs",
        "Failure Total: 0 reqs",
        "Success Rate: 100%",
        "Status 200: 10 reqs",
    ] {
        anyhow::ensure!(stdout.contains(needle), "missing `{needle}` in:\n{stdout}");
    }
    anyhow::ensure!(
        stdout.contains(&format!("Receive Data: {}B", 10 * HELLO_BODY.len())),
        "{stdout}"
    );
    anyhow::ensure!(server.stats().requests_total() == 10);

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn batch_file_with_rounds_emits_json_reports() -> anyhow::Result<()> {
    let server = TestServer::start().await.context("start test server")?;
    let dir = tempfile::tempdir().context("tempdir")?;

    let batch = dir.path().join("batch.json");
    std::fs::write(
        &batch,
        format!(
            r#"[
                {{"url": "{hello}", "times": 8}},
                {{"url": "{err}", "method": "get", "times": 2}}
            ]"#,
            hello = server.urls().hello,
            err = server.urls().status(500),
        ),
    )
    .context("write batch")?;

    let out = run_benchr(vec![
        "-f".into(),
        batch.to_string_lossy().into_owned(),
        "-c".into(),
        "4".into(),
        "-t".into(),
        "2".into(),
        "-i".into(),
        "0".into(),
        "--output".into(),
        "json".into(),
    ])
    .await?;
    ensure_success(&out)?;

    let rounds: Vec<serde_json::Value> = String::from_utf8_lossy(&out.stdout)
        .lines()
        .map(serde_json::from_str::<serde_json::Value>)
        .collect::<Result<Vec<_>, _>>()
        .context("stdout should be JSON lines")?
        .into_iter()
        .filter(|v| v["kind"] == "round")
        .collect();

    anyhow::ensure!(rounds.len() == 2, "expected 2 rounds, got {rounds:?}");
    for (idx, round) in rounds.iter().enumerate() {
        anyhow::ensure!(round["round"] == idx + 1, "{round}");
        anyhow::ensure!(round["workers"] == 4, "{round}");
        anyhow::ensure!(round["success"] == 8, "{round}");
        anyhow::ensure!(round["failure"] == 2, "{round}");
        anyhow::ensure!(round["status_counts"]["200"] == 8, "{round}");
        anyhow::ensure!(round["status_counts"]["500"] == 2, "{round}");
    }
    anyhow::ensure!(server.stats().requests_total() == 20);

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn script_failures_are_written_to_log_file() -> anyhow::Result<()> {
    let server = TestServer::start().await.context("start test server")?;
    let dir = tempfile::tempdir().context("tempdir")?;

    let script = dir.path().join("check.lua");
    std::fs::write(
        &script,
        r#"
function init() return true end
function request(req)
    req:set_header("X-Test", "1")
    return true
end
function check(body) return body ~= "hello" end
"#,
    )
    .context("write script")?;
    let log = dir.path().join("errors.log");

    let out = run_benchr(vec![
        "-l".into(),
        server.urls().hello.clone(),
        "-n".into(),
        "3".into(),
        "-s".into(),
        script.to_string_lossy().into_owned(),
        "-L".into(),
        log.to_string_lossy().into_owned(),
    ])
    .await?;
    ensure_success(&out)?;

    let stdout = String::from_utf8_lossy(&out.stdout);
    anyhow::ensure!(stdout.contains("Failure Total: 3 reqs"), "{stdout}");
    anyhow::ensure!(server.stats().saw_test_header() == 3);

    let log = std::fs::read_to_string(&log).context("read log file")?;
    anyhow::ensure!(
        log.matches("response rejected by script").count() == 3,
        "log:\n{log}"
    );

    server.shutdown().await;
    Ok(())
}
