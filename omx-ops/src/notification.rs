use std::collections::HashMap;

use omx_model::OmxErrorCode;

/// Downstream notifications (§6), the only thing the FSM/ops layers ever
/// hand back to a front end. Delivery order matters for one invariant: the
/// controller emits exactly one of `EndOfPlay`/`Error` before `Unloaded`.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    Loaded,
    Executing,
    Paused,
    Resumed,
    Unloaded,
    Metadata(HashMap<String, String>),
    Volume(f64),
    Progress { position_secs: u64, duration_secs: u64 },
    EndOfPlay,
    Error { code: OmxErrorCode, message: String },
}
