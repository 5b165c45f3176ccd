use std::path::Path;

use benchr_core::http::DEFAULT_CONNECT_TIMEOUT;
use benchr_core::{HttpClient, RequestHooks, RequestOptions};
use mlua::{Function, Lua, Value};
use parking_lot::Mutex;

use crate::curl;
use crate::loader::{chunk_name, configure_module_path};
use crate::request::LuaRequest;
use crate::{Error, Result};

struct State {
    lua: Lua,
    request: Function,
    check: Function,
}

/// Request hooks backed by one Lua state.
///
/// The script defines `init()`, `request(req)` and `check(body)`, each returning a boolean.
/// Every call takes the same lock, so at most one script function runs at a time.
///
/// Scripts may `require("gobenchmark")` for a blocking `curl` helper with its own connection
/// pool.
pub struct LuaHooks {
    state: Mutex<State>,
}

impl std::fmt::Debug for LuaHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LuaHooks").finish_non_exhaustive()
    }
}

fn global_function(lua: &Lua, name: &str) -> Result<Function> {
    match lua.globals().get::<Value>(name)? {
        Value::Function(f) => Ok(f),
        _ => Err(Error::MissingFunction(name.to_string())),
    }
}

impl LuaHooks {
    /// Loads the script at `path` and runs its `init()`.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let lua = Lua::new();
        configure_module_path(&lua, path)?;
        Self::init(lua, &source, &chunk_name(path))
    }

    pub fn from_source(source: &str, chunk_name: &str) -> Result<Self> {
        Self::init(Lua::new(), source, chunk_name)
    }

    fn init(lua: Lua, source: &str, chunk_name: &str) -> Result<Self> {
        curl::register(&lua, HttpClient::new(DEFAULT_CONNECT_TIMEOUT)?)?;
        lua.load(source).set_name(chunk_name).exec()?;

        let init = global_function(&lua, "init")?;
        let request = global_function(&lua, "request")?;
        let check = global_function(&lua, "check")?;

        if !matches!(init.call::<Value>(())?, Value::Boolean(true)) {
            return Err(Error::InitFailed);
        }
        tracing::debug!(chunk = chunk_name, "lua script initialized");

        Ok(Self {
            state: Mutex::new(State {
                lua,
                request,
                check,
            }),
        })
    }
}

fn is_true(hook: &str, res: mlua::Result<Value>) -> bool {
    match res {
        Ok(Value::Boolean(b)) => b,
        Ok(other) => {
            tracing::error!(hook, returned = other.type_name(), "lua hook did not return a boolean");
            false
        }
        Err(err) => {
            tracing::error!(hook, error = %err, "lua hook failed");
            false
        }
    }
}

impl RequestHooks for LuaHooks {
    fn before_request(&self, opts: &mut RequestOptions) -> bool {
        let state = self.state.lock();

        let req = match state.lua.create_userdata(LuaRequest(opts.clone())) {
            Ok(req) => req,
            Err(err) => {
                tracing::error!(hook = "request", error = %err, "lua hook failed");
                return false;
            }
        };

        let ok = is_true("request", state.request.call::<Value>(req.clone()));

        match req.take::<LuaRequest>() {
            Ok(LuaRequest(updated)) => *opts = updated,
            Err(err) => {
                tracing::error!(hook = "request", error = %err, "lua request handle escaped");
                return false;
            }
        }

        ok
    }

    fn check_response(&self, body: &[u8]) -> bool {
        let state = self.state.lock();

        let body = match state.lua.create_string(body) {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(hook = "check", error = %err, "lua hook failed");
                return false;
            }
        };

        is_true("check", state.check.call::<Value>(body))
    }
}
