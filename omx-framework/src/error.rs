use omx_model::OmxErrorCode;
use thiserror::Error;

/// Failure of a downward call into the framework (`OMX_GetHandle`,
/// `OMX_SendCommand`, `OMX_SetupTunnel`, ...). Distinct from `OmxErrorCode`,
/// which is data carried by an asynchronous `Error` event: this is a Rust
/// `Result::Err` returned synchronously by the call itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameworkError {
    #[error("no component registered under role/name '{0}'")]
    UnknownComponent(String),
    #[error("handle {0:?} is not a live component")]
    UnknownHandle(omx_model::ComponentHandle),
    #[error("SendCommand({command}) on {handle:?} failed: {code}")]
    CommandFailed {
        handle: omx_model::ComponentHandle,
        command: &'static str,
        code: OmxErrorCode,
    },
    #[error("OMX_SetupTunnel failed between {0:?} and {1:?}")]
    TunnelSetupFailed(omx_model::ComponentHandle, omx_model::ComponentHandle),
    #[error("parameter '{0}' rejected: {1}")]
    BadParameter(String, String),
}
