/// `auto_detecting` composite: start the source alone, wait for it to tell
/// us what format the stream is. Entry already issues the port-disable
/// command (the `enable_auto_detection` action), so the composite's first
/// observable phase is `AwaitingPortDisabled`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoDetectState {
    AwaitingPortDisabled,
    Config2Idle,
    Idle2Exe,
    AwaitingFormatEvidence,
}

/// `updating_graph` composite: format is known, build the rest of the
/// pipeline. Entry already issues load/setup/configure/loaded2idle for the
/// new components, so the first observable phase is `Config2Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdatingGraphState {
    Config2Idle,
    Idle2Exe,
    EnablingTunnel,
}

/// `reconfiguring_graph` composite: a live port-settings change mid-stream.
/// Entry already disables the affected tunnel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconfiguringState {
    AwaitingPortDisabled,
    EnablingTunnel,
}

/// `skipping` composite: move the playlist cursor and rewire the source end.
/// Entry already disables tunnel 0 (or short-circuits straight to exit when
/// the pending jump is already known to end playback).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkippingState {
    AwaitingDisable,
    EnablingTunnel,
}

/// Top-level playback state. The `AllOk` region (unload / fatal error / logic
/// error sink) is not a variant here: it is checked orthogonally by
/// [`crate::machine::Machine::dispatch`] before the state-specific table,
/// exactly as an orthogonal region in the original chart would be evaluated
/// alongside whichever composite is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Inited,
    Loaded,
    AutoDetecting(AutoDetectState),
    UpdatingGraph(UpdatingGraphState),
    Executing,
    Exe2Pause,
    Pause,
    Pause2Exe,
    Pause2Idle,
    ReconfiguringGraph(ReconfiguringState),
    Skipping(SkippingState),
    Exe2Idle,
    Idle2Loaded,
    Unloaded,
}

impl State {
    pub fn name(&self) -> &'static str {
        match self {
            State::Inited => "inited",
            State::Loaded => "loaded",
            State::AutoDetecting(_) => "auto_detecting",
            State::UpdatingGraph(_) => "updating_graph",
            State::Executing => "executing",
            State::Exe2Pause => "exe2pause",
            State::Pause => "pause",
            State::Pause2Exe => "pause2exe",
            State::Pause2Idle => "pause2idle",
            State::ReconfiguringGraph(_) => "reconfiguring_graph",
            State::Skipping(_) => "skipping",
            State::Exe2Idle => "exe2idle",
            State::Idle2Loaded => "idle2loaded",
            State::Unloaded => "unloaded",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Unloaded)
    }
}
