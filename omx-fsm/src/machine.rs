use omx_framework::Framework;
use omx_model::{GraphKind, OmxState, Playlist};
use omx_ops::{GraphStrategy, Ops};
use tracing::{debug, trace};

use crate::event::Event;
use crate::state::{AutoDetectState, ReconfiguringState, SkippingState, State, UpdatingGraphState};

/// Drives one playback session: the current top-level/composite state plus
/// the [`Ops`] instance its actions mutate.
///
/// `dispatch` is the whole state machine. It never blocks and never spawns;
/// the worker thread that calls it lives in [`crate::dispatch::FsmWorker`].
pub struct Machine<F: Framework, S: GraphStrategy> {
    state: State,
    ops: Ops<F, S>,
    /// Playlist/kind handed over by `load`, consulted once `execute` runs
    /// `do_store_config`. Keeping it here (rather than on `Ops`) matches the
    /// table: `load`'s own action is just `load_comp(0); ack_loaded`.
    pending_load: Option<(Playlist, GraphKind)>,
    /// Tunnel the active `reconfiguring_graph` pass is working on; the
    /// composite's inner states don't carry data, so this has to live here.
    active_tunnel: Option<omx_model::TunnelIndex>,
}

impl<F: Framework, S: GraphStrategy> Machine<F, S> {
    pub fn new(ops: Ops<F, S>) -> Self {
        Machine {
            state: State::Inited,
            ops,
            pending_load: None,
            active_tunnel: None,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn ops(&self) -> &Ops<F, S> {
        &self.ops
    }

    pub fn ops_mut(&mut self) -> &mut Ops<F, S> {
        &mut self.ops
    }

    /// Feeds one event to completion: runs its whole action sequence before
    /// returning, per the single-threaded dispatch discipline of the
    /// concurrency model (no event is ever processed while another's actions
    /// are still running, because there is only ever one call to `dispatch`
    /// in flight at a time).
    pub fn dispatch(&mut self, event: Event) {
        let from = self.state;
        let next = self
            .local_transition(&event)
            .or_else(|| self.all_ok_transition(&event));

        match next {
            Some(to) => {
                debug!(from = from.name(), to = to.name(), event = event.tag(), "fsm: transition");
                self.state = to;
                if matches!(to, State::Unloaded) {
                    self.ops.do_ack_unloaded();
                }
            }
            None => {
                trace!(state = from.name(), event = event.tag(), "fsm: no transition, dropped");
            }
        }
    }

    /// The orthogonal `AllOk` error-sink region: consulted only when no
    /// state-specific rule consumed the event.
    fn all_ok_transition(&mut self, event: &Event) -> Option<State> {
        if self.state.is_terminal() {
            return None;
        }
        match event {
            Event::Unload => {
                self.ops.do_tear_down_tunnels();
                self.ops.do_destroy_graph();
                Some(State::Unloaded)
            }
            Event::OmxErr { handle, error, port } => {
                if self.ops.is_fatal_error(error) {
                    self.ops.do_record_fatal_error(*handle, error.clone(), *port);
                    self.ops.do_error();
                    self.ops.do_tear_down_tunnels();
                    self.ops.do_destroy_graph();
                    Some(State::Unloaded)
                } else {
                    None
                }
            }
            Event::Err => {
                self.ops.do_error();
                Some(State::Unloaded)
            }
            _ => None,
        }
    }

    fn local_transition(&mut self, event: &Event) -> Option<State> {
        match (self.state, event) {
            // -- inited --------------------------------------------------
            (State::Inited, Event::Load { playlist, kind }) => {
                self.pending_load = Some((playlist.clone(), kind.clone()));
                self.ops.do_load_comp(0);
                self.ops.do_ack_loaded();
                Some(State::Loaded)
            }

            // -- loaded ---------------------------------------------------
            (State::Loaded, Event::Execute) => {
                let Some((playlist, kind)) = self.pending_load.take() else {
                    return None;
                };
                self.ops.do_store_config(&kind, playlist);
                if self.ops.last_op_succeeded() {
                    self.ops.do_enable_auto_detection(0, 0);
                    Some(State::AutoDetecting(AutoDetectState::AwaitingPortDisabled))
                } else {
                    None
                }
            }

            // -- auto_detecting composite ---------------------------------
            (State::AutoDetecting(AutoDetectState::AwaitingPortDisabled), Event::OmxPortDisabled { handle, port })
                if self.ops.handle_of(0) == Some(*handle) =>
            {
                if self.ops.is_port_disabling_complete(*handle, *port) {
                    self.ops.do_loaded2idle_comp(0);
                    Some(State::AutoDetecting(AutoDetectState::Config2Idle))
                } else {
                    None
                }
            }
            (State::AutoDetecting(AutoDetectState::Config2Idle), Event::OmxTrans { handle, state: OmxState::Idle })
                if self.ops.handle_of(0) == Some(*handle) =>
            {
                if self.ops.is_trans_complete(*handle, OmxState::Idle) {
                    self.ops.do_idle2exe_comp(0);
                    Some(State::AutoDetecting(AutoDetectState::Idle2Exe))
                } else {
                    None
                }
            }
            (State::AutoDetecting(AutoDetectState::Idle2Exe), Event::OmxTrans { handle, state: OmxState::Executing })
                if self.ops.handle_of(0) == Some(*handle) =>
            {
                if self.ops.is_trans_complete(*handle, OmxState::Executing) {
                    Some(State::AutoDetecting(AutoDetectState::AwaitingFormatEvidence))
                } else {
                    None
                }
            }
            (
                State::AutoDetecting(AutoDetectState::AwaitingFormatEvidence),
                Event::OmxFormatDetected { .. } | Event::OmxPortSettings { .. },
            ) => {
                // composite's exit pseudo-state firing `auto_detected`,
                // inlined rather than re-queued since it is purely internal.
                self.enter_updating_graph()
            }

            // -- updating_graph composite ----------------------------------
            (
                State::UpdatingGraph(UpdatingGraphState::Config2Idle),
                Event::OmxTrans { handle, state: OmxState::Idle },
            ) => {
                if self.ops.is_trans_complete(*handle, OmxState::Idle) {
                    self.ops.do_idle2exe();
                    Some(State::UpdatingGraph(UpdatingGraphState::Idle2Exe))
                } else {
                    None
                }
            }
            (
                State::UpdatingGraph(UpdatingGraphState::Idle2Exe),
                Event::OmxTrans { handle, state: OmxState::Executing },
            ) => {
                if self.ops.is_trans_complete(*handle, OmxState::Executing) {
                    for tunnel in 0..self.tunnel_count() {
                        self.ops.do_enable_tunnel(tunnel);
                    }
                    Some(State::UpdatingGraph(UpdatingGraphState::EnablingTunnel))
                } else {
                    None
                }
            }
            (
                State::UpdatingGraph(UpdatingGraphState::EnablingTunnel),
                Event::OmxPortEnabled { handle, port },
            ) => {
                if self.ops.is_port_enabling_complete(*handle, *port) {
                    self.ops.do_retrieve_metadata();
                    self.ops.do_ack_execd();
                    self.ops.do_start_progress_display();
                    Some(State::Executing)
                } else {
                    None
                }
            }

            // -- executing --------------------------------------------------
            (State::Executing, Event::OmxPortSettings { handle, .. }) => {
                self.ops.do_mute();
                let tunnel = self.tunnel_for(*handle);
                self.enter_reconfiguring(tunnel)
            }
            (State::Executing, Event::Pause) => {
                self.ops.do_exe2pause();
                Some(State::Exe2Pause)
            }
            (State::Executing, Event::Skip(jump)) => {
                self.ops.do_store_skip(*jump);
                self.enter_skipping()
            }
            (State::Executing, Event::Position(pos)) => {
                self.ops.do_store_position(*pos);
                self.enter_skipping()
            }
            (State::Executing, Event::OmxEos { handle, .. }) if self.ops.is_last_eos(*handle) => {
                self.ops.do_stop_progress_display();
                self.ops.do_retrieve_metadata();
                self.ops.do_start_progress_display();
                Some(State::Executing)
            }
            (State::Executing, Event::Timer) => {
                self.ops.do_increase_progress_display();
                Some(State::Executing)
            }
            (State::Executing, Event::Stop | Event::Unload) => {
                self.ops.do_exe2idle();
                Some(State::Exe2Idle)
            }
            (State::Executing, Event::OmxErr { handle, error, port }) if self.ops.is_fatal_error(error) => {
                self.ops.do_record_fatal_error(*handle, error.clone(), *port);
                self.ops.do_error();
                self.ops.do_exe2idle();
                Some(State::Exe2Idle)
            }

            // -- reconfiguring_graph composite ------------------------------
            (
                State::ReconfiguringGraph(ReconfiguringState::AwaitingPortDisabled),
                Event::OmxPortDisabled { handle, port },
            ) => {
                if self.ops.is_port_disabling_complete(*handle, *port) {
                    let tunnel = self.active_tunnel.unwrap_or(0);
                    self.ops.do_reconfigure_tunnel(tunnel);
                    self.ops.do_enable_tunnel(tunnel);
                    Some(State::ReconfiguringGraph(ReconfiguringState::EnablingTunnel))
                } else {
                    None
                }
            }
            (
                State::ReconfiguringGraph(ReconfiguringState::EnablingTunnel),
                Event::OmxPortEnabled { handle, port },
            ) => {
                if self.ops.is_port_enabling_complete(*handle, *port) {
                    self.ops.do_mute();
                    Some(State::Executing)
                } else {
                    None
                }
            }

            // -- exe2pause / pause / pause2exe / pause2idle -----------------
            (State::Exe2Pause, Event::OmxTrans { handle, state }) => {
                if self.ops.is_trans_complete(*handle, *state) {
                    self.ops.do_ack_paused();
                    Some(State::Pause)
                } else {
                    None
                }
            }
            (State::Pause, Event::Execute | Event::Pause) => {
                self.ops.do_pause2exe();
                Some(State::Pause2Exe)
            }
            (State::Pause, Event::Stop | Event::Unload) => {
                self.ops.do_pause2idle();
                Some(State::Pause2Idle)
            }
            (State::Pause2Exe, Event::OmxTrans { handle, state }) => {
                if self.ops.is_trans_complete(*handle, *state) {
                    self.ops.do_ack_resumed();
                    Some(State::Executing)
                } else {
                    None
                }
            }
            (State::Pause2Idle, Event::OmxTrans { handle, state }) => {
                if self.ops.is_trans_complete(*handle, *state) && self.ops.is_destination_state(OmxState::Idle) {
                    self.ops.do_idle2loaded();
                    Some(State::Idle2Loaded)
                } else {
                    None
                }
            }

            // -- skipping composite -------------------------------------
            (
                State::Skipping(SkippingState::AwaitingDisable),
                Event::OmxPortDisabled { handle, port },
            ) => {
                if self.ops.is_port_disabling_complete(*handle, *port) {
                    self.ops.do_skip();
                    self.ops.do_enable_tunnel(0);
                    Some(State::Skipping(SkippingState::EnablingTunnel))
                } else {
                    None
                }
            }
            (
                State::Skipping(SkippingState::EnablingTunnel),
                Event::OmxPortEnabled { handle, port },
            ) => {
                if self.ops.is_port_enabling_complete(*handle, *port) {
                    self.exit_skipping()
                } else {
                    None
                }
            }

            // -- exe2idle / idle2loaded --------------------------------------
            (State::Exe2Idle, Event::OmxErr { error, .. }) if !self.ops.is_fatal_error(error) => {
                Some(State::Exe2Idle)
            }
            (State::Exe2Idle, Event::OmxTrans { handle, state }) => {
                if self.ops.is_trans_complete(*handle, *state) {
                    self.ops.do_idle2loaded();
                    Some(State::Idle2Loaded)
                } else {
                    None
                }
            }
            (State::Idle2Loaded, Event::OmxTrans { handle, state }) => {
                if self.ops.is_trans_complete(*handle, *state) {
                    self.ops.do_tear_down_tunnels();
                    self.ops.do_destroy_graph();
                    Some(State::Unloaded)
                } else {
                    None
                }
            }

            _ => None,
        }
    }

    fn enter_updating_graph(&mut self) -> Option<State> {
        self.ops.do_load();
        self.ops.do_setup();
        self.ops.do_configure();
        self.ops.do_loaded2idle();
        Some(State::UpdatingGraph(UpdatingGraphState::Config2Idle))
    }

    fn enter_reconfiguring(&mut self, tunnel: omx_model::TunnelIndex) -> Option<State> {
        self.active_tunnel = Some(tunnel);
        self.ops.do_disable_tunnel(tunnel);
        Some(State::ReconfiguringGraph(ReconfiguringState::AwaitingPortDisabled))
    }

    fn enter_skipping(&mut self) -> Option<State> {
        if self.ops.is_end_of_play() {
            return self.exit_skipping();
        }
        self.ops.do_disable_tunnel(0);
        Some(State::Skipping(SkippingState::AwaitingDisable))
    }

    fn exit_skipping(&mut self) -> Option<State> {
        if self.ops.is_internal_error() {
            self.ops.do_error();
            self.ops.do_tear_down_tunnels();
            self.ops.do_destroy_graph();
            Some(State::Unloaded)
        } else if self.ops.is_end_of_play() {
            self.ops.do_end_of_play();
            self.ops.do_tear_down_tunnels();
            self.ops.do_destroy_graph();
            Some(State::Unloaded)
        } else {
            Some(State::Executing)
        }
    }

    fn tunnel_count(&self) -> usize {
        self.ops.handle_count().saturating_sub(1)
    }

    /// Which tunnel a port-settings event on `handle` concerns: the tunnel
    /// just upstream of the component unless it is the source, in which case
    /// it is the one just downstream. A best-effort mapping in the absence of
    /// direct port-to-tunnel bookkeeping, adequate for the 4-component shape
    /// every graph kind here uses.
    fn tunnel_for(&self, handle: omx_model::ComponentHandle) -> omx_model::TunnelIndex {
        for i in 0..self.tunnel_count() + 1 {
            if self.ops.handle_of(i) == Some(handle) {
                return i.saturating_sub(1).min(self.tunnel_count().saturating_sub(1));
            }
        }
        0
    }
}
