use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, ArgGroup, Parser};
use tracing_subscriber::filter::LevelFilter;

fn parse_json_map(input: &str) -> Result<BTreeMap<String, String>, String> {
    serde_json::from_str(input)
        .map_err(|err| format!("expected a JSON object of string values, e.g. '{{\"k\":\"v\"}}': {err}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report per round.
    HumanReadable,
    /// Emit JSON lines (NDJSON) to stdout: progress updates and one report per round.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "benchr",
    author,
    version,
    disable_version_flag = true,
    about = "Concurrent HTTP benchmarking tool",
    long_about = "benchr fires a planned number of HTTP requests through a fixed pool of workers and reports success/failure counts, latency extremes, throughput and a status-code histogram.\n\nTargets come from a single URL (--url) or a JSON batch file (--file). An optional Lua script can rewrite each request and validate each response body.",
    after_help = "Examples:\n  benchr -l localhost:8080/ping -c 50 -n 10000\n  benchr -l https://api.example.com/items -m post -H '{\"Content-Type\":\"application/json\"}' -A '{\"id\":\"1\"}'\n  benchr -f requests.json -c 20 -t 3 -i 5\n  benchr -f requests.json -s check.lua -L errors.log --output json",
    group(ArgGroup::new("target").required(true).args(["url", "file"]))
)]
pub struct Cli {
    /// Target URL (http:// is assumed when no scheme is given)
    #[arg(short = 'l', long)]
    pub url: Option<String>,

    /// JSON batch file: an array of {url, method, headers, params, body, times}
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(short = 'c', long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub connections: u32,

    /// Requests to send to --url per round
    #[arg(short = 'n', long, default_value_t = 1, conflicts_with = "file", value_parser = clap::value_parser!(u64).range(1..))]
    pub requests: u64,

    /// Number of benchmark rounds
    #[arg(short = 't', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub times: u32,

    /// Seconds to wait between rounds
    #[arg(short = 'i', long, default_value_t = 1)]
    pub interval: u64,

    /// HTTP method for --url (GET or POST)
    #[arg(short = 'm', long, conflicts_with = "file")]
    pub method: Option<String>,

    /// Request headers for --url as a JSON object
    #[arg(short = 'H', long, value_name = "JSON", conflicts_with = "file", value_parser = parse_json_map)]
    pub headers: Option<BTreeMap<String, String>>,

    /// Request params for --url as a JSON object (query string for GET, body for POST)
    #[arg(short = 'A', long, value_name = "JSON", conflicts_with = "file", value_parser = parse_json_map)]
    pub params: Option<BTreeMap<String, String>>,

    /// Literal POST body for --url
    #[arg(short = 'B', long, conflicts_with = "file")]
    pub body: Option<String>,

    /// Lua script defining init(), request(req) and check(body)
    #[arg(short = 's', long)]
    pub script: Option<PathBuf>,

    /// Write request errors to this file (truncated on start)
    #[arg(short = 'L', long = "log")]
    pub log: Option<PathBuf>,

    /// Minimum level written to --log
    #[arg(long, default_value = "error", requires = "log")]
    pub log_level: LevelFilter,

    /// Per-request timeout (e.g. 5s, 250ms); 0s disables it
    #[arg(long, default_value = "5s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,

    /// Print version
    #[allow(dead_code)]
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,
}
