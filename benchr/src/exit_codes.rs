#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// Script failed to load or its `init()` did not return true.
    ScriptError = 20,

    /// Invalid CLI flags, unreadable or malformed batch file, bad log path.
    InvalidInput = 30,

    /// Internal/runtime error (client or pool setup failures).
    RuntimeError = 40,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
