use crate::http::RequestOptions;

/// Per-request script callbacks consulted by the benchmark workers.
///
/// Returning `false` from either hook classifies the request as a failure. Implementations are
/// called concurrently from every worker and must do their own synchronization.
pub trait RequestHooks: Send + Sync {
    /// Runs before the request is issued and may rewrite any part of it.
    fn before_request(&self, opts: &mut RequestOptions) -> bool;

    /// Runs after a `200` response body has been read.
    fn check_response(&self, body: &[u8]) -> bool;
}

/// Accepts every request and response unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl RequestHooks for NoHooks {
    fn before_request(&self, _opts: &mut RequestOptions) -> bool {
        true
    }

    fn check_response(&self, _body: &[u8]) -> bool {
        true
    }
}
