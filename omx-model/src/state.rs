use std::fmt;

/// Component lifecycle state, mirroring `OMX_STATETYPE`'s four steady states.
/// The framework also defines transitional states (`LoadedToIdle`, ...) but
/// those never appear in the ledger: only the *destination* of a transition
/// is ever recorded or awaited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OmxState {
    Loaded,
    Idle,
    Executing,
    Paused,
}

impl fmt::Display for OmxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OmxState::Loaded => "Loaded",
            OmxState::Idle => "Idle",
            OmxState::Executing => "Executing",
            OmxState::Paused => "Paused",
        };
        f.write_str(s)
    }
}

/// Disable vs enable, shared between port commands and the port ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortCommand {
    Disable,
    Enable,
}
