use std::fmt;

/// A subset of `OMX_ERRORTYPE`, restricted to the values this controller
/// actually reasons about. Unrecognised codes the framework reports are
/// preserved verbatim via `Other` rather than dropped, so `on_error`
/// notifications stay informative even for codes we don't special-case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OmxErrorCode {
    InsufficientResources,
    PortUnresponsiveDuringAllocation,
    PortUnresponsiveDuringDeallocation,
    PortUnresponsiveDuringStop,
    StreamCorrupt,
    FormatNotDetected,
    Invalid,
    Other(String),
}

impl fmt::Display for OmxErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OmxErrorCode::InsufficientResources => write!(f, "InsufficientResources"),
            OmxErrorCode::PortUnresponsiveDuringAllocation => {
                write!(f, "PortUnresponsiveDuringAllocation")
            }
            OmxErrorCode::PortUnresponsiveDuringDeallocation => {
                write!(f, "PortUnresponsiveDuringDeallocation")
            }
            OmxErrorCode::PortUnresponsiveDuringStop => write!(f, "PortUnresponsiveDuringStop"),
            OmxErrorCode::StreamCorrupt => write!(f, "StreamCorrupt"),
            OmxErrorCode::FormatNotDetected => write!(f, "FormatNotDetected"),
            OmxErrorCode::Invalid => write!(f, "Invalid"),
            OmxErrorCode::Other(s) => write!(f, "{s}"),
        }
    }
}
