use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use crossbeam_channel::{bounded, Receiver, Sender};
use omx_model::{ComponentHandle, OmxState, PortCommand, PortIndex};
use tracing::{debug, trace};

use crate::error::FrameworkError;
use crate::events::FrameworkEvent;
use crate::framework::Framework;

const EVENT_QUEUE_CAPACITY: usize = 256;

/// A single scripted downward-call failure: the next call matching
/// `component` and `command` returns this error instead of succeeding.
#[derive(Clone)]
struct ScriptedFailure {
    command: &'static str,
    error: FrameworkError,
}

/// Deterministic in-memory stand-in for the component framework, used by
/// every test in this workspace instead of a real OpenMAX IL runtime.
///
/// By default every `set_state`/`port_command` call immediately enqueues the
/// matching `FrameworkEvent` (as if the component acknowledged instantly).
/// Call [`FakeFramework::set_auto_ack`] with `false` to take manual control
/// via [`FakeFramework::ack_transition`]/[`FakeFramework::ack_port`]/
/// [`FakeFramework::inject`] when a test needs to interleave events in a
/// specific order.
pub struct FakeFramework {
    next_handle: AtomicU64,
    names: Mutex<HashMap<ComponentHandle, String>>,
    live: Mutex<std::collections::HashSet<ComponentHandle>>,
    parameters: Mutex<HashMap<(ComponentHandle, String), String>>,
    scripted_failures: Mutex<Vec<(String, ScriptedFailure)>>,
    auto_ack: AtomicBool,
    tx: Sender<FrameworkEvent>,
    rx: Receiver<FrameworkEvent>,
}

impl Default for FakeFramework {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeFramework {
    pub fn new() -> Self {
        let (tx, rx) = bounded(EVENT_QUEUE_CAPACITY);
        FakeFramework {
            next_handle: AtomicU64::new(1),
            names: Mutex::new(HashMap::new()),
            live: Mutex::new(std::collections::HashSet::new()),
            parameters: Mutex::new(HashMap::new()),
            scripted_failures: Mutex::new(Vec::new()),
            auto_ack: AtomicBool::new(true),
            tx,
            rx,
        }
    }

    pub fn set_auto_ack(&self, enabled: bool) {
        self.auto_ack.store(enabled, Ordering::SeqCst);
    }

    /// Arranges for the next `command` issued against `component_name` to
    /// fail with `error` instead of being accepted.
    pub fn fail_next(&self, component_name: &str, command: &'static str, error: FrameworkError) {
        self.scripted_failures
            .lock()
            .unwrap()
            .push((component_name.to_string(), ScriptedFailure { command, error }));
    }

    fn take_scripted_failure(
        &self,
        handle: ComponentHandle,
        command: &'static str,
    ) -> Option<FrameworkError> {
        let name = self.names.lock().unwrap().get(&handle).cloned()?;
        let mut failures = self.scripted_failures.lock().unwrap();
        let idx = failures
            .iter()
            .position(|(n, f)| n == &name && f.command == command)?;
        Some(failures.remove(idx).1.error)
    }

    /// Pushes an arbitrary event, bypassing auto-ack. Used to simulate
    /// format detection, EOS, and framework errors, none of which are ever
    /// auto-generated.
    pub fn inject(&self, event: FrameworkEvent) {
        trace!(?event, "fake framework: injecting event");
        let _ = self.tx.send(event);
    }

    pub fn ack_transition(&self, handle: ComponentHandle, state: OmxState) {
        self.inject(FrameworkEvent::TransitionComplete { handle, state });
    }

    pub fn ack_port(&self, handle: ComponentHandle, port: PortIndex, command: PortCommand) {
        let event = match command {
            PortCommand::Disable => FrameworkEvent::PortDisabled { handle, port },
            PortCommand::Enable => FrameworkEvent::PortEnabled { handle, port },
        };
        self.inject(event);
    }

    pub fn handle_for(&self, component_name: &str) -> Option<ComponentHandle> {
        self.names
            .lock()
            .unwrap()
            .iter()
            .find(|(_, n)| n.as_str() == component_name)
            .map(|(h, _)| *h)
    }
}

impl Framework for FakeFramework {
    fn get_handle(&self, component_name: &str) -> Result<ComponentHandle, FrameworkError> {
        let scripted = {
            let mut failures = self.scripted_failures.lock().unwrap();
            failures
                .iter()
                .position(|(n, f)| n == component_name && f.command == "GetHandle")
                .map(|idx| failures.remove(idx).1.error)
        };
        if let Some(err) = scripted {
            return Err(err);
        }
        let raw = self.next_handle.fetch_add(1, Ordering::SeqCst);
        let handle = ComponentHandle::from_raw(raw);
        self.names
            .lock()
            .unwrap()
            .insert(handle, component_name.to_string());
        self.live.lock().unwrap().insert(handle);
        debug!(?handle, component_name, "fake framework: component created");
        Ok(handle)
    }

    fn free_handle(&self, handle: ComponentHandle) -> Result<(), FrameworkError> {
        if !self.live.lock().unwrap().remove(&handle) {
            return Err(FrameworkError::UnknownHandle(handle));
        }
        self.names.lock().unwrap().remove(&handle);
        debug!(?handle, "fake framework: component freed");
        Ok(())
    }

    fn set_state(&self, handle: ComponentHandle, state: OmxState) -> Result<(), FrameworkError> {
        if !self.live.lock().unwrap().contains(&handle) {
            return Err(FrameworkError::UnknownHandle(handle));
        }
        if let Some(err) = self.take_scripted_failure(handle, "SetState") {
            return Err(err);
        }
        if self.auto_ack.load(Ordering::SeqCst) {
            self.ack_transition(handle, state);
        }
        Ok(())
    }

    fn port_command(
        &self,
        handle: ComponentHandle,
        port: PortIndex,
        command: PortCommand,
    ) -> Result<(), FrameworkError> {
        if !self.live.lock().unwrap().contains(&handle) {
            return Err(FrameworkError::UnknownHandle(handle));
        }
        if let Some(err) = self.take_scripted_failure(handle, "PortCommand") {
            return Err(err);
        }
        if self.auto_ack.load(Ordering::SeqCst) {
            self.ack_port(handle, port, command);
        }
        Ok(())
    }

    fn flush(&self, handle: ComponentHandle, _port: PortIndex) -> Result<(), FrameworkError> {
        if !self.live.lock().unwrap().contains(&handle) {
            return Err(FrameworkError::UnknownHandle(handle));
        }
        Ok(())
    }

    fn setup_tunnel(
        &self,
        out_handle: ComponentHandle,
        _out_port: PortIndex,
        in_handle: ComponentHandle,
        _in_port: PortIndex,
    ) -> Result<(), FrameworkError> {
        let live = self.live.lock().unwrap();
        if !live.contains(&out_handle) || !live.contains(&in_handle) {
            return Err(FrameworkError::TunnelSetupFailed(out_handle, in_handle));
        }
        Ok(())
    }

    fn set_parameter(
        &self,
        handle: ComponentHandle,
        key: &str,
        value: &str,
    ) -> Result<(), FrameworkError> {
        if !self.live.lock().unwrap().contains(&handle) {
            return Err(FrameworkError::UnknownHandle(handle));
        }
        self.parameters
            .lock()
            .unwrap()
            .insert((handle, key.to_string()), value.to_string());
        Ok(())
    }

    fn get_parameter(&self, handle: ComponentHandle, key: &str) -> Result<String, FrameworkError> {
        self.parameters
            .lock()
            .unwrap()
            .get(&(handle, key.to_string()))
            .cloned()
            .ok_or_else(|| FrameworkError::BadParameter(key.to_string(), "not set".to_string()))
    }

    fn events(&self) -> Receiver<FrameworkEvent> {
        self.rx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_handle_assigns_distinct_handles() {
        let fw = FakeFramework::new();
        let a = fw.get_handle("source.http").unwrap();
        let b = fw.get_handle("decoder.mp3").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn auto_ack_publishes_transition_complete() {
        let fw = FakeFramework::new();
        let h = fw.get_handle("source.http").unwrap();
        fw.set_state(h, OmxState::Idle).unwrap();
        let evt = fw.events().try_recv().unwrap();
        assert_eq!(
            evt,
            FrameworkEvent::TransitionComplete {
                handle: h,
                state: OmxState::Idle
            }
        );
    }

    #[test]
    fn scripted_failure_is_consumed_once() {
        let fw = FakeFramework::new();
        let h = fw.get_handle("source.http").unwrap();
        fw.fail_next(
            "source.http",
            "SetState",
            FrameworkError::CommandFailed {
                handle: h,
                command: "SetState",
                code: omx_model::OmxErrorCode::InsufficientResources,
            },
        );
        assert!(fw.set_state(h, OmxState::Idle).is_err());
        // second call is not scripted, so it succeeds.
        assert!(fw.set_state(h, OmxState::Idle).is_ok());
    }

    #[test]
    fn manual_ack_mode_requires_explicit_event() {
        let fw = FakeFramework::new();
        fw.set_auto_ack(false);
        let h = fw.get_handle("source.http").unwrap();
        fw.set_state(h, OmxState::Idle).unwrap();
        assert!(fw.events().try_recv().is_err());
        fw.ack_transition(h, OmxState::Idle);
        assert!(fw.events().try_recv().is_ok());
    }
}
