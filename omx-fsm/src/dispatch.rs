use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use omx_framework::Framework;
use omx_ops::{GraphStrategy, Notification, Ops};
use tracing::{info, warn};

use crate::event::Event;
use crate::machine::Machine;
use crate::state::State;

const EVENT_QUEUE_CAPACITY: usize = 256;

/// Owns the bounded event queue and the single worker thread that drains it
/// into a [`Machine`], satisfying the "single-threaded discipline" of the
/// concurrency model: every event is fully processed, actions included,
/// before the next one is pulled off the queue.
pub struct FsmWorker {
    tx: Sender<Event>,
    handle: Option<JoinHandle<State>>,
}

impl FsmWorker {
    pub fn spawn<F, S>(ops: Ops<F, S>) -> Self
    where
        F: Framework + 'static,
        S: GraphStrategy + 'static,
    {
        let (tx, rx): (Sender<Event>, Receiver<Event>) = bounded(EVENT_QUEUE_CAPACITY);
        let handle = thread::spawn(move || {
            let mut machine = Machine::new(ops);
            info!("fsm worker: started");
            for event in rx.iter() {
                machine.dispatch(event);
                if machine.state().is_terminal() {
                    break;
                }
            }
            info!(final_state = machine.state().name(), "fsm worker: stopped");
            machine.state()
        });
        FsmWorker {
            tx,
            handle: Some(handle),
        }
    }

    /// Posts an event onto the queue; blocks if the queue is momentarily
    /// full rather than dropping, matching the "blocking enqueue" default of
    /// the concurrency model (only low-priority telemetry, e.g. `timer`,
    /// would ever be a drop-oldest candidate, and this controller has no
    /// such traffic volume).
    pub fn post(&self, event: Event) -> Result<(), crossbeam_channel::SendError<Event>> {
        self.tx.send(event)
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    /// Blocks until the worker thread exits (i.e. the FSM reached `unloaded`
    /// or the sender side was dropped), returning its final state.
    pub fn join(mut self) -> State {
        let Some(handle) = self.handle.take() else {
            return State::Unloaded;
        };
        match handle.join() {
            Ok(state) => state,
            Err(_) => {
                warn!("fsm worker: panicked");
                State::Unloaded
            }
        }
    }
}

/// Bridges a [`Framework`]'s raw event receiver onto an `FsmWorker`'s queue,
/// tagging each one into the FSM's event alphabet. Runs on its own thread so
/// the framework's callback thread is never blocked by FSM dispatch.
pub fn forward_framework_events<F: Framework + 'static>(
    framework: Arc<F>,
    fsm: Sender<Event>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let rx = framework.events();
        for raw in rx.iter() {
            if fsm.send(raw.into()).is_err() {
                break;
            }
        }
    })
}

/// Re-exported for front ends that want to observe ops notifications
/// (`on_loaded`, `on_error`, ...) without reaching into `omx-ops` directly.
pub type NotificationReceiver = Receiver<Notification>;
