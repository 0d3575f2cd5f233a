use thiserror::Error;

/// Construction-time and configuration errors. These are the only errors
/// this crate ever returns as a Rust `Result`: everything that happens once
/// the FSM's event loop is running is recorded into `Ops`'s own state
/// (`error_code`/`error_msg`) instead of thrown, per §7's propagation policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OmxError {
    #[error("empty playlist: a graph needs at least one item to play")]
    EmptyPlaylist,
    #[error("pipeline has not been configured yet (do_store_config was never called)")]
    PipelineNotConfigured,
    #[error("component index {0} is out of range for a pipeline of length {1}")]
    ComponentIndexOutOfRange(usize, usize),
    #[error("tunnel index {0} is out of range for a pipeline of length {1}")]
    TunnelIndexOutOfRange(usize, usize),
    #[error("stream resolution failed for '{0}': {1}")]
    ResolutionFailed(String, String),
    #[error(transparent)]
    Framework(#[from] omx_framework::FrameworkError),
}
