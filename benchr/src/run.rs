use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use benchr_core::http::DEFAULT_CONNECT_TIMEOUT;
use benchr_core::{
    Benchmark, HttpClient, NoHooks, RequestHooks, RequestMethod, RequestSpec, load_batch_file,
};
use benchr_lua::LuaHooks;

use crate::cli::Cli;
use crate::exit_codes::ExitCode;
use crate::logging;
use crate::output;
use crate::run_error::RunError;

pub async fn run(args: Cli) -> Result<ExitCode, RunError> {
    let specs = request_specs(&args)?;

    let hooks: Arc<dyn RequestHooks> = match &args.script {
        Some(path) => Arc::new(LuaHooks::load(path).map_err(|err| {
            RunError::from_lua(format!("failed to load script: {}", path.display()), err)
        })?),
        None => Arc::new(NoHooks),
    };

    logging::init(args.log.as_deref(), args.log_level).map_err(RunError::InvalidInput)?;

    let client = HttpClient::new(DEFAULT_CONNECT_TIMEOUT)
        .context("failed to build http client")
        .map_err(RunError::RuntimeError)?;
    let mut bench = Benchmark::new(args.connections as usize, client, hooks)
        .map_err(|err| RunError::from_core("failed to start workers", err))?;

    let out = output::formatter(args.output);
    let interval = Duration::from_secs(args.interval);

    for round in 1..=args.times {
        if round > 1 && !interval.is_zero() {
            tracing::debug!(round, ?interval, "waiting before next round");
            tokio::time::sleep(interval).await;
        }

        let report = bench.run_round(&specs, out.progress()).await;
        out.print_report(&report).map_err(RunError::RuntimeError)?;
    }

    bench.shutdown().await;
    Ok(ExitCode::Success)
}

fn request_specs(args: &Cli) -> Result<Vec<RequestSpec>, RunError> {
    if let Some(path) = &args.file {
        let items = load_batch_file(path)
            .map_err(|err| RunError::from_core("failed to read batch file", err))?;
        let specs = RequestSpec::from_items(&items, args.timeout)
            .map_err(|err| RunError::from_core("invalid batch file", err))?;
        return Ok(specs);
    }

    let url = args.url.as_deref().unwrap_or_default();
    let method = RequestMethod::parse(args.method.as_deref().unwrap_or_default())
        .map_err(|err| RunError::from_core("invalid --method", err))?;
    let spec = RequestSpec::new(url)
        .map_err(|err| RunError::from_core("invalid --url", err))?
        .with_method(method)
        .with_headers(args.headers.clone().unwrap_or_default())
        .with_params(args.params.clone().unwrap_or_default())
        .with_body(args.body.clone().map(Into::into))
        .with_timeout(args.timeout)
        .with_times(args.requests);

    Ok(vec![spec])
}
