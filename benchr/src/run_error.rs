use crate::exit_codes::ExitCode;

#[derive(Debug)]
pub enum RunError {
    InvalidInput(anyhow::Error),
    ScriptError(anyhow::Error),
    RuntimeError(anyhow::Error),
}

impl RunError {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidInput(_) => ExitCode::InvalidInput,
            Self::ScriptError(_) => ExitCode::ScriptError,
            Self::RuntimeError(_) => ExitCode::RuntimeError,
        }
    }

    #[must_use]
    pub fn anyhow(&self) -> &anyhow::Error {
        match self {
            Self::InvalidInput(e) | Self::ScriptError(e) | Self::RuntimeError(e) => e,
        }
    }

    /// Core errors are all caused by bad flags or batch files, except a missing runtime.
    pub(crate) fn from_core(context: &'static str, err: benchr_core::Error) -> Self {
        let kind = match &err {
            benchr_core::Error::NoRuntime => Self::RuntimeError,
            benchr_core::Error::Io(_)
            | benchr_core::Error::Json(_)
            | benchr_core::Error::InvalidPoolSize
            | benchr_core::Error::UnsupportedMethod(_)
            | benchr_core::Error::EmptyUrl
            | benchr_core::Error::InvalidUrl(_) => Self::InvalidInput,
        };
        kind(anyhow::Error::new(err).context(context))
    }

    /// Every script failure, including an unreadable script file, is a script error.
    pub(crate) fn from_lua(context: String, err: benchr_lua::Error) -> Self {
        Self::ScriptError(anyhow::Error::new(err).context(context))
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(e) | Self::ScriptError(e) | Self::RuntimeError(e) => {
                write!(f, "{e:#}")
            }
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.anyhow().as_ref())
    }
}
