use benchr_core::http::{DEFAULT_CONNECT_TIMEOUT, HttpResponse};
use benchr_core::{HttpClient, RequestMethod, RequestOptions};
use mlua::{Lua, Table};
use tokio::runtime::{Builder, Handle, RuntimeFlavor};

use crate::{Error, Result};

pub(crate) const MODULE: &str = "gobenchmark";

/// `(method, url, headers, params)`
type CurlArgs = (Option<String>, String, Option<Table>, Option<Table>);

/// Preloads `require("gobenchmark")`, a table exposing
/// `curl(method, url, headers?, params?) -> body, ok`.
///
/// `curl` blocks the calling hook until the response is read. Failures return `"", false`.
pub(crate) fn register(lua: &Lua, client: HttpClient) -> Result<()> {
    let curl = lua.create_function(move |lua, (method, url, headers, params): CurlArgs| {
        let res = options(method.as_deref().unwrap_or_default(), &url, headers, params)
            .and_then(|opts| fetch(&client, &opts));

        match res {
            Ok(res) => Ok((lua.create_string(&res.body)?, true)),
            Err(err) => {
                tracing::error!(url = %url, error = %err, "script curl failed");
                Ok((lua.create_string("")?, false))
            }
        }
    })?;

    let loader = lua.create_function(move |lua, ()| {
        let module = lua.create_table()?;
        module.set("curl", curl.clone())?;
        Ok(module)
    })?;

    let package: Table = lua.globals().get("package")?;
    let preload: Table = package.get("preload")?;
    preload.set(MODULE, loader)?;
    Ok(())
}

fn options(
    method: &str,
    url: &str,
    headers: Option<Table>,
    params: Option<Table>,
) -> Result<RequestOptions> {
    let mut opts = RequestOptions::new(String::new()).with_method(RequestMethod::parse(method)?);
    opts.set_url(url);

    if let Some(headers) = headers {
        for pair in headers.pairs::<String, String>() {
            let (k, v) = pair?;
            opts.set_header(k, v);
        }
    }
    if let Some(params) = params {
        for pair in params.pairs::<String, String>() {
            let (k, v) = pair?;
            opts.set_param(k, v);
        }
    }

    Ok(opts)
}

fn fetch(client: &HttpClient, opts: &RequestOptions) -> Result<HttpResponse> {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            Ok(tokio::task::block_in_place(|| handle.block_on(client.execute(opts)))?)
        }
        // No runtime to borrow (or one that cannot block): run on a private one.
        _ => std::thread::scope(|s| {
            s.spawn(|| -> Result<HttpResponse> {
                let rt = Builder::new_current_thread().enable_all().build()?;
                let client = HttpClient::new(DEFAULT_CONNECT_TIMEOUT)?;
                Ok(rt.block_on(client.execute(opts))?)
            })
            .join()
            .unwrap_or_else(|_| Err(Error::CurlPanicked))
        }),
    }
}
