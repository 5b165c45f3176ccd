pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("lua error: {0}")]
    Lua(#[from] mlua::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("expected function `{0}()` in script")]
    MissingFunction(String),

    #[error("script `init()` did not return true")]
    InitFailed,

    #[error("invalid curl request: {0}")]
    Request(#[from] benchr_core::Error),

    #[error("curl failed: {0}")]
    Http(#[from] benchr_core::http::Error),

    #[error("curl worker thread panicked")]
    CurlPanicked,
}

mod curl;
mod hooks;
mod loader;
mod request;

pub use hooks::LuaHooks;
