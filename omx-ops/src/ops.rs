use std::collections::HashMap;
use std::sync::Arc;

use crossbeam_channel::Sender;
use omx_framework::Framework;
use omx_model::{
    ComponentHandle, ComponentRole, GraphKind, OmxErrorCode, OmxState, PipelineConfig, Playlist,
    PlaylistItem, PortCommand, TunnelIndex,
};
use tracing::{debug, error, info, warn};

use crate::error::OmxError;
use crate::ledger::{PortTransitionLedger, TransitionLedger};
use crate::notification::Notification;
use crate::strategy::GraphStrategy;

/// Translates FSM-level intents into framework calls and tracks the ledgers
/// that tell the FSM when a multi-step transition has finished.
///
/// Generic over the framework binding and the graph strategy so tests can
/// plug in [`omx_framework::FakeFramework`] and either concrete strategy (or
/// a test-only one) without any dynamic dispatch cost in the hot path.
pub struct Ops<F: Framework, S: GraphStrategy> {
    framework: Arc<F>,
    strategy: S,
    notify: Sender<Notification>,

    pipeline: Option<PipelineConfig>,
    handles: Vec<Option<ComponentHandle>>,
    h2n: HashMap<ComponentHandle, String>,
    component_states: HashMap<ComponentHandle, OmxState>,

    playlist: Playlist,
    jump: i64,
    destination_state: Option<OmxState>,

    error_code: Option<OmxErrorCode>,
    error_msg: String,
    internal_error: bool,
    probing_ok: bool,

    metadata: HashMap<String, String>,
    volume: f64,
    muted: bool,
    volume_before_mute: f64,
    duration_secs: u64,
    position_secs: u64,

    transitions: TransitionLedger,
    port_transitions: PortTransitionLedger,
}

impl<F: Framework, S: GraphStrategy> Ops<F, S> {
    /// `initial_kind` seeds the pipeline shape so `do_load_comp(0)` has a
    /// component name to resolve before the `execute` command (which knows
    /// the real graph kind) re-runs `do_store_config`. Every graph kind this
    /// strategy supports shares the same source/demuxer/decoder/renderer
    /// shape, so this is never wasted work, only a provisional guess.
    pub fn new(framework: Arc<F>, strategy: S, notify: Sender<Notification>, initial_kind: GraphKind) -> Self {
        let pipeline = strategy.pipeline_factory(&initial_kind);
        let handles = vec![None; pipeline.len()];
        Ops {
            framework,
            strategy,
            notify,
            pipeline: Some(pipeline),
            handles,
            h2n: HashMap::new(),
            component_states: HashMap::new(),
            playlist: Playlist::default(),
            jump: omx_model::SKIP_DEFAULT_VALUE,
            destination_state: None,
            error_code: None,
            error_msg: String::new(),
            internal_error: false,
            probing_ok: true,
            metadata: HashMap::new(),
            volume: 1.0,
            muted: false,
            volume_before_mute: 1.0,
            duration_secs: 0,
            position_secs: 0,
            transitions: TransitionLedger::default(),
            port_transitions: PortTransitionLedger::default(),
        }
    }

    fn notify(&self, n: Notification) {
        if self.notify.send(n).is_err() {
            warn!("notification channel closed; front end has gone away");
        }
    }

    fn pipeline(&self) -> Result<&PipelineConfig, OmxError> {
        self.pipeline.as_ref().ok_or(OmxError::PipelineNotConfigured)
    }

    fn handle_at(&self, i: usize) -> Option<ComponentHandle> {
        self.handles.get(i).copied().flatten()
    }

    fn state_of(&self, i: usize) -> Option<OmxState> {
        let handle = self.handle_at(i)?;
        self.component_states.get(&handle).copied()
    }

    fn name_at(&self, i: usize) -> Result<String, OmxError> {
        let pipeline = self.pipeline()?;
        pipeline
            .components
            .get(i)
            .map(|c| c.name.clone())
            .ok_or(OmxError::ComponentIndexOutOfRange(i, pipeline.len()))
    }

    // ---- error / diagnostic recording -----------------------------------

    fn record_error(&mut self, code: OmxErrorCode, context: &str) {
        error!(%code, context, "ops: recording error");
        self.error_msg = format!("{context}: {code}");
        self.error_code = Some(code);
    }

    pub fn do_reset_internal_error(&mut self) {
        self.error_code = None;
        self.error_msg.clear();
        self.internal_error = false;
    }

    pub fn do_record_fatal_error(
        &mut self,
        handle: ComponentHandle,
        err: OmxErrorCode,
        port: omx_model::PortIndex,
    ) {
        warn!(?handle, %err, port, "ops: fatal error reported by framework");
        self.error_msg = format!("{} on {:?} port {}", err, handle, port);
        self.error_code = Some(err);
        self.internal_error = false;
    }

    fn record_internal_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "ops: internal/logic error");
        self.error_msg = message;
        self.error_code = Some(OmxErrorCode::Invalid);
        self.internal_error = true;
    }

    // ---- loading / setup --------------------------------------------------

    pub fn do_store_config(&mut self, kind: &GraphKind, playlist: Playlist) {
        let pipeline = self.strategy.pipeline_factory(kind);
        info!(%kind, components = pipeline.len(), "ops: pipeline configured");
        // Resize rather than replace: `do_load_comp(0)` may already have
        // populated a handle for the provisional pipeline built at
        // construction time, and every supported graph kind shares its
        // component count, so this never discards a live handle.
        self.handles.resize(pipeline.len(), None);
        self.pipeline = Some(pipeline);
        self.playlist = playlist;
        self.playlist.seed_start();
    }

    pub fn do_load_comp(&mut self, i: usize) {
        let name = match self.name_at(i) {
            Ok(n) => n,
            Err(e) => {
                self.record_internal_error(e.to_string());
                return;
            }
        };
        match self.framework.get_handle(&name) {
            Ok(handle) => {
                debug!(i, %name, ?handle, "ops: component loaded");
                self.handles[i] = Some(handle);
                self.h2n.insert(handle, name);
                self.component_states.insert(handle, OmxState::Loaded);
            }
            Err(e) => self.record_error(OmxErrorCode::Other(e.to_string()), "load"),
        }
    }

    /// Creates every pipeline component that doesn't exist yet. Safe to call
    /// after `auto_detecting` has already created component 0 on its own:
    /// already-live components are left untouched.
    pub fn do_load(&mut self) {
        let Ok(n) = self.pipeline().map(|p| p.len()) else {
            self.record_internal_error("do_load called before do_store_config");
            return;
        };
        for i in 0..n {
            if self.handle_at(i).is_none() {
                self.do_load_comp(i);
            }
        }
    }

    pub fn do_ack_loaded(&self) {
        self.notify(Notification::Loaded);
    }

    pub fn do_setup_tunnel(&mut self, i: TunnelIndex) {
        let (Some(out_h), Some(in_h)) = (self.handle_at(i), self.handle_at(i + 1)) else {
            self.record_internal_error(format!("tunnel {i}: endpoint component not loaded"));
            return;
        };
        if let Err(e) = self.framework.setup_tunnel(out_h, 0, in_h, 0) {
            self.record_error(OmxErrorCode::Other(e.to_string()), "setup_tunnel");
        }
    }

    pub fn do_setup(&mut self) {
        let Ok(count) = self.pipeline().map(|p| p.tunnel_count()) else {
            self.record_internal_error("do_setup called before do_store_config");
            return;
        };
        for i in 0..count {
            self.do_setup_tunnel(i);
        }
    }

    // ---- configuration -----------------------------------------------------

    pub fn do_configure_comp(&mut self, i: usize) {
        let Some(handle) = self.handle_at(i) else {
            self.record_internal_error(format!("component {i} not loaded yet"));
            return;
        };
        let role = match self.pipeline() {
            Ok(p) => p.components[i].role,
            Err(e) => {
                self.record_internal_error(e.to_string());
                return;
            }
        };
        if role == ComponentRole::Source {
            let current = self.playlist.current().cloned();
            let Some(item) = current else {
                self.record_internal_error("do_configure_comp(source): empty playlist");
                return;
            };
            let resolved = self.strategy.resolve_uri(&item);
            let uri = match resolved {
                Ok(uri) => uri,
                Err(e) => {
                    self.record_error(OmxErrorCode::Other(e.to_string()), "resolve_uri");
                    return;
                }
            };
            if let Err(e) = self.framework.set_parameter(handle, "uri", &uri) {
                self.record_error(OmxErrorCode::Other(e.to_string()), "configure");
            }
        }
        if let Err(e) = self.framework.set_parameter(handle, "role", &role.to_string()) {
            self.record_error(OmxErrorCode::Other(e.to_string()), "configure");
        }
    }

    pub fn do_configure(&mut self) {
        let Ok(n) = self.pipeline().map(|p| p.len()) else {
            self.record_internal_error("do_configure called before do_store_config");
            return;
        };
        for i in 0..n {
            self.do_configure_comp(i);
        }
    }

    pub fn do_enable_auto_detection(&mut self, comp_id: usize, port_id: omx_model::PortIndex) {
        self.do_configure_comp(comp_id);
        self.do_disable_comp_ports(comp_id, port_id);
    }

    pub fn do_probe(&mut self) {
        self.probing_ok = self.strategy.probe_stream_hook();
        if !self.probing_ok {
            self.record_internal_error("probe_stream_hook rejected the detected format");
        }
    }

    // ---- state transitions --------------------------------------------------

    fn transition_comp(&mut self, i: usize, state: OmxState) {
        let Some(handle) = self.handle_at(i) else {
            self.record_internal_error(format!("component {i} not loaded yet"));
            return;
        };
        match self.framework.set_state(handle, state) {
            Ok(()) => self.transitions.record(handle, state),
            Err(e) => self.record_error(OmxErrorCode::Other(e.to_string()), "set_state"),
        }
    }

    pub fn do_loaded2idle_comp(&mut self, i: usize) {
        self.transition_comp(i, OmxState::Idle);
    }

    /// Moves every component currently `Loaded` to `Idle`. Filtered by
    /// current state (rather than blindly walking the whole pipeline) so
    /// this is safe to call once `updating_graph` has created new components
    /// alongside a source that's already `Executing` from auto-detection.
    pub fn do_loaded2idle(&mut self) {
        let Ok(n) = self.pipeline().map(|p| p.len()) else {
            self.record_internal_error("do_loaded2idle called before do_store_config");
            return;
        };
        for i in 0..n {
            if self.state_of(i) == Some(OmxState::Loaded) {
                self.do_loaded2idle_comp(i);
            }
        }
    }

    pub fn do_loaded2idle_tunnel(&mut self, tunnel: TunnelIndex) {
        self.do_loaded2idle_comp(tunnel);
        self.do_loaded2idle_comp(tunnel + 1);
    }

    pub fn do_idle2exe_comp(&mut self, i: usize) {
        self.transition_comp(i, OmxState::Executing);
    }

    /// Moves every component currently `Idle` to `Executing`; see
    /// [`Ops::do_loaded2idle`] for why this filters rather than blindly
    /// walking the whole pipeline.
    pub fn do_idle2exe(&mut self) {
        let Ok(n) = self.pipeline().map(|p| p.len()) else {
            self.record_internal_error("do_idle2exe called before do_store_config");
            return;
        };
        for i in 0..n {
            if self.state_of(i) == Some(OmxState::Idle) {
                self.do_idle2exe_comp(i);
            }
        }
    }

    pub fn do_idle2exe_tunnel(&mut self, tunnel: TunnelIndex) {
        self.do_idle2exe_comp(tunnel);
        self.do_idle2exe_comp(tunnel + 1);
    }

    pub fn do_exe2pause(&mut self) {
        let Ok(n) = self.pipeline().map(|p| p.len()) else {
            return;
        };
        for i in 0..n {
            self.transition_comp(i, OmxState::Paused);
        }
    }

    pub fn do_pause2exe(&mut self) {
        let Ok(n) = self.pipeline().map(|p| p.len()) else {
            return;
        };
        for i in 0..n {
            self.transition_comp(i, OmxState::Executing);
        }
    }

    pub fn do_pause2idle(&mut self) {
        self.do_record_destination(OmxState::Idle);
        let Ok(n) = self.pipeline().map(|p| p.len()) else {
            return;
        };
        for i in 0..n {
            self.transition_comp(i, OmxState::Idle);
        }
    }

    pub fn do_exe2idle_comp(&mut self, i: usize) {
        self.transition_comp(i, OmxState::Idle);
    }

    pub fn do_exe2idle(&mut self) {
        self.do_record_destination(OmxState::Idle);
        let Ok(n) = self.pipeline().map(|p| p.len()) else {
            return;
        };
        for i in 0..n {
            self.do_exe2idle_comp(i);
        }
    }

    pub fn do_idle2loaded_comp(&mut self, i: usize) {
        self.transition_comp(i, OmxState::Loaded);
    }

    pub fn do_idle2loaded(&mut self) {
        let Ok(n) = self.pipeline().map(|p| p.len()) else {
            return;
        };
        for i in 0..n {
            self.do_idle2loaded_comp(i);
        }
    }

    pub fn do_record_destination(&mut self, state: OmxState) {
        self.destination_state = Some(state);
    }

    // ---- acks / notifications ------------------------------------------------

    pub fn do_ack_execd(&self) {
        self.notify(Notification::Executing);
    }
    pub fn do_ack_paused(&self) {
        self.notify(Notification::Paused);
    }
    pub fn do_ack_resumed(&self) {
        self.notify(Notification::Resumed);
    }
    pub fn do_ack_stopped(&self) {}
    pub fn do_ack_metadata(&self) {
        self.notify(Notification::Metadata(self.metadata.clone()));
    }
    pub fn do_ack_volume(&self) {
        self.notify(Notification::Volume(self.effective_volume()));
    }
    pub fn do_ack_unloaded(&self) {
        self.notify(Notification::Unloaded);
    }

    // ---- ports / tunnels -------------------------------------------------

    pub fn do_disable_comp_ports(&mut self, comp_id: usize, port_id: omx_model::PortIndex) {
        let Some(handle) = self.handle_at(comp_id) else {
            self.record_internal_error(format!("component {comp_id} not loaded yet"));
            return;
        };
        match self.framework.port_command(handle, port_id, PortCommand::Disable) {
            Ok(()) => self.port_transitions.record(handle, port_id, PortCommand::Disable),
            Err(e) => self.record_error(OmxErrorCode::Other(e.to_string()), "port_disable"),
        }
    }

    pub fn do_enable_comp_ports(&mut self, comp_id: usize, port_id: omx_model::PortIndex) {
        let Some(handle) = self.handle_at(comp_id) else {
            self.record_internal_error(format!("component {comp_id} not loaded yet"));
            return;
        };
        match self.framework.port_command(handle, port_id, PortCommand::Enable) {
            Ok(()) => self.port_transitions.record(handle, port_id, PortCommand::Enable),
            Err(e) => self.record_error(OmxErrorCode::Other(e.to_string()), "port_enable"),
        }
    }

    pub fn do_disable_tunnel(&mut self, tunnel: TunnelIndex) {
        self.do_disable_comp_ports(tunnel, 1);
        self.do_disable_comp_ports(tunnel + 1, 0);
    }

    pub fn do_enable_tunnel(&mut self, tunnel: TunnelIndex) {
        self.do_enable_comp_ports(tunnel, 1);
        self.do_enable_comp_ports(tunnel + 1, 0);
    }

    pub fn do_flush_tunnel(&mut self, tunnel: TunnelIndex) {
        if let (Some(a), Some(b)) = (self.handle_at(tunnel), self.handle_at(tunnel + 1)) {
            let _ = self.framework.flush(a, 1);
            let _ = self.framework.flush(b, 0);
        }
    }

    pub fn do_reconfigure_tunnel(&mut self, tunnel: TunnelIndex) {
        let pipeline = match self.pipeline.clone() {
            Some(p) => p,
            None => {
                self.record_internal_error("do_reconfigure_tunnel called before do_store_config");
                return;
            }
        };
        let handles: Vec<ComponentHandle> = self.handles.iter().filter_map(|h| *h).collect();
        if let Err(e) =
            self.strategy
                .reconfigure_tunnel(self.framework.as_ref(), &pipeline, &handles, tunnel)
        {
            self.record_error(OmxErrorCode::Other(e.to_string()), "reconfigure_tunnel");
        }
    }

    // ---- playlist / skip --------------------------------------------------

    pub fn do_store_position(&mut self, pos: i64) {
        self.jump = pos - self.playlist.position();
    }

    pub fn do_store_skip(&mut self, jump: i64) {
        self.jump = jump;
    }

    pub fn do_skip(&mut self) {
        if !self.strategy.is_skip_allowed() {
            self.record_internal_error("skip is not allowed for this graph kind");
            return;
        }
        if self.playlist.is_end_of_play(self.jump) {
            // the FSM checks is_end_of_play before relying on a fresh
            // do_configure_comp; nothing to load, the skipping composite
            // will exit straight to teardown.
            return;
        }
        self.playlist.apply_skip(self.jump);
        // Consumed: a later `is_end_of_play` check (e.g. the skipping
        // composite's own exit guard) must reflect "did this skip land
        // in range", not re-apply the same jump a second time.
        self.jump = 0;
        self.do_configure_comp(0);
    }

    pub fn do_print_playlist(&self) {
        for (i, item) in self.playlist.items().iter().enumerate() {
            info!(index = i, uri = %item.uri, title = ?item.title, "playlist item");
        }
    }

    pub fn do_add_playlist(&mut self, items: Vec<PlaylistItem>) {
        self.playlist.append(items);
    }

    // ---- volume -----------------------------------------------------------

    fn effective_volume(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    pub fn do_volume(&mut self, vol: f64) {
        self.volume = vol.clamp(0.0, 1.0);
        self.muted = false;
        self.do_ack_volume();
    }

    pub fn do_volume_step(&mut self, step: i32) {
        let delta = step as f64 * 0.05;
        self.volume = (self.volume + delta).clamp(0.0, 1.0);
        self.muted = false;
        self.do_ack_volume();
    }

    pub fn do_mute(&mut self) {
        if self.muted {
            self.muted = false;
            self.volume = self.volume_before_mute;
        } else {
            self.volume_before_mute = self.volume;
            self.muted = true;
        }
        self.do_ack_volume();
    }

    pub fn do_restore_volume(&mut self) {
        self.muted = false;
        self.volume = self.volume_before_mute;
        self.do_ack_volume();
    }

    // ---- metadata / progress -------------------------------------------

    pub fn do_retrieve_metadata(&mut self) {
        self.metadata.clear();
        if let Some(item) = self.playlist.current() {
            if let Some(title) = &item.title {
                self.metadata.insert("title".to_string(), title.clone());
            }
            if let Some(artist) = &item.artist {
                self.metadata.insert("artist".to_string(), artist.clone());
            }
            if let Some(album) = &item.album {
                self.metadata.insert("album".to_string(), album.clone());
            }
        }
        self.position_secs = 0;
        self.do_ack_metadata();
    }

    pub fn store_last_track_duration(&mut self, duration_secs: u64) {
        self.duration_secs = duration_secs;
    }

    pub fn do_start_progress_display(&mut self) {
        self.position_secs = 0;
        self.notify(Notification::Progress {
            position_secs: 0,
            duration_secs: self.duration_secs,
        });
    }

    pub fn do_increase_progress_display(&mut self) {
        self.position_secs += 1;
        self.notify(Notification::Progress {
            position_secs: self.position_secs,
            duration_secs: self.duration_secs,
        });
    }

    pub fn do_pause_progress_display(&self) {}
    pub fn do_resume_progress_display(&self) {}
    pub fn do_stop_progress_display(&self) {}

    // ---- teardown -----------------------------------------------------

    pub fn do_destroy_comp(&mut self, i: usize) {
        if let Some(handle) = self.handles.get(i).copied().flatten() {
            if let Err(e) = self.framework.free_handle(handle) {
                warn!(?handle, %e, "ops: free_handle failed during teardown");
            }
            self.h2n.remove(&handle);
            self.component_states.remove(&handle);
            self.handles[i] = None;
        }
    }

    pub fn do_tear_down_tunnels(&mut self) {
        let count = self.pipeline.as_ref().map(|p| p.tunnel_count()).unwrap_or(0);
        for i in (0..count).rev() {
            self.do_flush_tunnel(i);
        }
    }

    pub fn do_destroy_graph(&mut self) {
        let n = self.handles.len();
        for i in (0..n).rev() {
            self.do_destroy_comp(i);
        }
        self.transitions.clear();
        self.port_transitions.clear();
    }

    pub fn do_error(&self) {
        self.notify(Notification::Error {
            code: self.error_code.clone().unwrap_or(OmxErrorCode::Invalid),
            message: self.error_msg.clone(),
        });
    }

    pub fn do_end_of_play(&self) {
        self.notify(Notification::EndOfPlay);
    }

    // ---- predicates -------------------------------------------------------

    pub fn is_last_component(&self, handle: ComponentHandle) -> bool {
        self.handles.last().copied().flatten() == Some(handle)
    }

    pub fn is_first_component(&self, handle: ComponentHandle) -> bool {
        self.handles.first().copied().flatten() == Some(handle)
    }

    pub fn is_last_eos(&self, handle: ComponentHandle) -> bool {
        self.is_last_component(handle)
    }

    pub fn is_trans_complete(&mut self, handle: ComponentHandle, to_state: OmxState) -> bool {
        self.component_states.insert(handle, to_state);
        self.transitions.ack(handle, to_state)
    }

    pub fn is_destination_state(&self, state: OmxState) -> bool {
        self.destination_state == Some(state)
    }

    pub fn is_component_state(&self, i: usize, state: OmxState) -> bool {
        match self.handle_at(i) {
            Some(h) => self.component_states.get(&h) == Some(&state),
            None => false,
        }
    }

    pub fn is_port_disabling_complete(&mut self, handle: ComponentHandle, port: omx_model::PortIndex) -> bool {
        self.port_transitions.ack(handle, port, PortCommand::Disable)
    }

    pub fn is_port_enabling_complete(&mut self, handle: ComponentHandle, port: omx_model::PortIndex) -> bool {
        self.port_transitions.ack(handle, port, PortCommand::Enable)
    }

    pub fn last_op_succeeded(&self) -> bool {
        self.error_code.is_none()
    }

    pub fn is_end_of_play(&self) -> bool {
        self.playlist.is_end_of_play(self.jump)
    }

    pub fn is_probing_result_ok(&self) -> bool {
        self.probing_ok
    }

    pub fn is_fatal_error(&self, error: &OmxErrorCode) -> bool {
        self.strategy.is_fatal_error(error)
    }

    pub fn is_internal_error(&self) -> bool {
        self.internal_error
    }

    pub fn internal_error(&self) -> Option<&OmxErrorCode> {
        self.error_code.as_ref()
    }

    pub fn internal_error_msg(&self) -> &str {
        &self.error_msg
    }

    pub fn handle2name(&self, handle: ComponentHandle) -> Option<&str> {
        self.h2n.get(&handle).map(|s| s.as_str())
    }

    pub fn handle_count(&self) -> usize {
        self.handles.iter().filter(|h| h.is_some()).count()
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn handle_of(&self, i: usize) -> Option<ComponentHandle> {
        self.handle_at(i)
    }
}
