//! Front end glue (§2 point 4): owns the event queue thread via
//! [`omx_fsm::FsmWorker`], translates the downstream command interface of
//! SPEC §6 into FSM events, and forwards framework callbacks onto the same
//! queue. The CLI binary in this crate is a thin shell over [`Player`].

use std::sync::Arc;

use crossbeam_channel::Sender;
use omx_fsm::{forward_framework_events, Event, FsmWorker, NotificationReceiver};
use omx_framework::Framework;
use omx_model::{GraphKind, Playlist, PlaylistItem};
use omx_ops::{GraphStrategy, Notification, Ops};

/// A running playback controller: the command interface of SPEC §6 plus the
/// notification stream it emits. Dropping a `Player` does not tear down the
/// FSM thread; call [`Player::unload`] and join the `FsmWorker` returned
/// alongside it for an orderly shutdown.
pub struct Player {
    events: Sender<Event>,
    notifications: NotificationReceiver,
}

impl Player {
    /// Builds the operations layer around `framework`/`strategy`, spawns the
    /// FSM worker thread, and bridges the framework's raw event stream onto
    /// its queue.
    pub fn spawn<F, S>(framework: Arc<F>, strategy: S, kind: GraphKind) -> (Self, FsmWorker)
    where
        F: Framework + 'static,
        S: GraphStrategy + 'static,
    {
        let (notify_tx, notify_rx) = crossbeam_channel::unbounded();
        let ops = Ops::new(framework.clone(), strategy, notify_tx, kind);
        let worker = FsmWorker::spawn(ops);
        forward_framework_events(framework, worker.sender());
        let player = Player {
            events: worker.sender(),
            notifications: notify_rx,
        };
        (player, worker)
    }

    /// Raw access to the FSM's event queue, for forwarding framework-event
    /// equivalents a particular binding produces (or, against the in-memory
    /// fake, for manually acking commands while exercising the CLI).
    pub fn sender(&self) -> Sender<Event> {
        self.events.clone()
    }

    pub fn notifications(&self) -> &NotificationReceiver {
        &self.notifications
    }

    pub fn load(&self, playlist: Playlist, kind: GraphKind) {
        self.post(Event::Load { playlist, kind });
    }

    pub fn execute(&self) {
        self.post(Event::Execute);
    }

    pub fn pause(&self) {
        self.post(Event::Pause);
    }

    pub fn stop(&self) {
        self.post(Event::Stop);
    }

    pub fn unload(&self) {
        self.post(Event::Unload);
    }

    pub fn skip(&self, jump: i64) {
        self.post(Event::Skip(jump));
    }

    pub fn position(&self, index: i64) {
        self.post(Event::Position(index));
    }

    pub fn volume(&self, level: f64) {
        self.post(Event::Volume(level));
    }

    pub fn volume_step(&self, delta: i32) {
        self.post(Event::VolumeStep(delta));
    }

    pub fn mute(&self) {
        self.post(Event::Mute);
    }

    pub fn print_playlist(&self) {
        self.post(Event::PrintPlaylist);
    }

    pub fn add_playlist(&self, items: Vec<PlaylistItem>) {
        self.post(Event::AddPlaylist(items));
    }

    pub fn timer_tick(&self) {
        self.post(Event::Timer);
    }

    fn post(&self, event: Event) {
        // The queue's receiving end only ever disappears once the FSM
        // worker thread has exited (terminal state reached); a send error
        // past that point just means the command arrived after shutdown.
        let _ = self.events.send(event);
    }
}

/// Renders a notification the way the CLI prints it; kept separate from
/// `Display` since `Notification` lives in `omx-ops` and front ends may want
/// to format it differently.
pub fn describe(notification: &Notification) -> String {
    match notification {
        Notification::Loaded => "loaded".to_string(),
        Notification::Executing => "executing".to_string(),
        Notification::Paused => "paused".to_string(),
        Notification::Resumed => "resumed".to_string(),
        Notification::Unloaded => "unloaded".to_string(),
        Notification::Metadata(map) => format!("metadata: {map:?}"),
        Notification::Volume(v) => format!("volume: {v:.2}"),
        Notification::Progress { position_secs, duration_secs } => {
            format!("progress: {position_secs}s / {duration_secs}s")
        }
        Notification::EndOfPlay => "end of play".to_string(),
        Notification::Error { code, message } => format!("error[{code}]: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omx_model::OmxErrorCode;
    use std::collections::HashMap;

    #[test]
    fn describe_formats_progress_with_both_durations() {
        let n = Notification::Progress { position_secs: 12, duration_secs: 200 };
        assert_eq!(describe(&n), "progress: 12s / 200s");
    }

    #[test]
    fn describe_formats_error_with_code_and_message() {
        let n = Notification::Error {
            code: OmxErrorCode::StreamCorrupt,
            message: "renderer 3".to_string(),
        };
        assert_eq!(describe(&n), "error[StreamCorrupt]: renderer 3");
    }

    #[test]
    fn describe_formats_metadata_map() {
        let mut map = HashMap::new();
        map.insert("title".to_string(), "Track".to_string());
        let n = Notification::Metadata(map);
        assert!(describe(&n).contains("title"));
    }
}
