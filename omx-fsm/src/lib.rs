//! The hierarchical playback state machine: top-level states, the four
//! composite sub-machines, and the single-threaded event dispatch loop that
//! drives them.

mod dispatch;
mod event;
mod machine;
mod state;

pub use dispatch::{forward_framework_events, FsmWorker, NotificationReceiver};
pub use event::Event;
pub use machine::Machine;
pub use state::{AutoDetectState, ReconfiguringState, SkippingState, State, UpdatingGraphState};

#[cfg(test)]
mod tests {
    use super::*;
    use omx_framework::{FakeFramework, Framework};
    use omx_model::{ComponentHandle, GraphKind, OmxErrorCode, OmxState, Playlist, PlaylistItem};
    use omx_ops::{LocalFileStrategy, Ops};
    use std::sync::Arc;

    fn new_machine() -> (Machine<FakeFramework, LocalFileStrategy>, Arc<FakeFramework>, crossbeam_channel::Receiver<omx_ops::Notification>) {
        let fw = Arc::new(FakeFramework::new());
        let (tx, rx) = crossbeam_channel::unbounded();
        let ops = Ops::new(fw.clone(), LocalFileStrategy, tx, GraphKind::LocalFile);
        (Machine::new(ops), fw, rx)
    }

    fn handle_for(fw: &FakeFramework, name: &str) -> ComponentHandle {
        fw.handle_for(name).expect("component not created yet")
    }

    fn drive_auto_detect_and_graph_update(m: &mut Machine<FakeFramework, LocalFileStrategy>, fw: &FakeFramework) {
        let playlist = Playlist::new(vec![PlaylistItem::new("file:///track.mp3")]);
        m.dispatch(Event::Load { playlist, kind: GraphKind::LocalFile });
        m.dispatch(Event::Execute);

        let source = handle_for(fw, "source");
        m.dispatch(Event::OmxPortDisabled { handle: source, port: 0 });
        m.dispatch(Event::OmxTrans { handle: source, state: OmxState::Idle });
        m.dispatch(Event::OmxTrans { handle: source, state: OmxState::Executing });
        m.dispatch(Event::OmxFormatDetected { handle: source, port: 0 });

        // updating_graph: demuxer/decoder/renderer now exist.
        for name in ["demuxer", "decoder", "renderer"] {
            let h = handle_for(fw, name);
            m.dispatch(Event::OmxTrans { handle: h, state: OmxState::Idle });
        }
        for name in ["demuxer", "decoder", "renderer"] {
            let h = handle_for(fw, name);
            m.dispatch(Event::OmxTrans { handle: h, state: OmxState::Executing });
        }
        for tunnel in 0..3 {
            let (a, b) = (m.ops().handle_of(tunnel).unwrap(), m.ops().handle_of(tunnel + 1).unwrap());
            m.dispatch(Event::OmxPortEnabled { handle: a, port: 1 });
            m.dispatch(Event::OmxPortEnabled { handle: b, port: 0 });
        }
    }

    #[test]
    fn happy_path_reaches_executing() {
        let (mut m, fw, notifications) = new_machine();
        drive_auto_detect_and_graph_update(&mut m, &fw);
        assert_eq!(m.state(), State::Executing);
        let seen: Vec<_> = notifications.try_iter().collect();
        assert!(seen.iter().any(|n| matches!(n, omx_ops::Notification::Executing)));
        assert!(seen.iter().any(|n| matches!(n, omx_ops::Notification::Metadata(_))));
    }

    #[test]
    fn timer_ticks_advance_progress_while_executing() {
        let (mut m, fw, notifications) = new_machine();
        drive_auto_detect_and_graph_update(&mut m, &fw);
        let _ = notifications.try_iter().count();
        m.dispatch(Event::Timer);
        assert_eq!(m.state(), State::Executing);
        let seen: Vec<_> = notifications.try_iter().collect();
        assert!(seen.iter().any(|n| matches!(n, omx_ops::Notification::Progress { .. })));
    }

    #[test]
    fn mid_stream_port_settings_change_reconfigures_then_returns() {
        let (mut m, fw, _n) = new_machine();
        drive_auto_detect_and_graph_update(&mut m, &fw);

        let decoder = handle_for(&fw, "decoder");
        m.dispatch(Event::OmxPortSettings { handle: decoder, port: 1, index: 7 });
        assert!(matches!(m.state(), State::ReconfiguringGraph(_)));

        let demuxer = handle_for(&fw, "demuxer");
        m.dispatch(Event::OmxPortDisabled { handle: demuxer, port: 1 });
        m.dispatch(Event::OmxPortDisabled { handle: decoder, port: 0 });
        m.dispatch(Event::OmxPortEnabled { handle: demuxer, port: 1 });
        m.dispatch(Event::OmxPortEnabled { handle: decoder, port: 0 });

        assert_eq!(m.state(), State::Executing);
    }

    #[test]
    fn skip_past_last_track_ends_play_and_unloads() {
        let (mut m, fw, notifications) = new_machine();
        let playlist = Playlist::new(vec![
            PlaylistItem::new("file:///a.mp3"),
            PlaylistItem::new("file:///b.mp3"),
        ]);
        m.dispatch(Event::Load { playlist, kind: GraphKind::LocalFile });
        m.dispatch(Event::Execute);
        let source = handle_for(&fw, "source");
        m.dispatch(Event::OmxPortDisabled { handle: source, port: 0 });
        m.dispatch(Event::OmxTrans { handle: source, state: OmxState::Idle });
        m.dispatch(Event::OmxTrans { handle: source, state: OmxState::Executing });
        m.dispatch(Event::OmxFormatDetected { handle: source, port: 0 });
        for name in ["demuxer", "decoder", "renderer"] {
            let h = handle_for(&fw, name);
            m.dispatch(Event::OmxTrans { handle: h, state: OmxState::Idle });
        }
        for name in ["demuxer", "decoder", "renderer"] {
            let h = handle_for(&fw, name);
            m.dispatch(Event::OmxTrans { handle: h, state: OmxState::Executing });
        }
        for tunnel in 0..3 {
            let (a, b) = (m.ops().handle_of(tunnel).unwrap(), m.ops().handle_of(tunnel + 1).unwrap());
            m.dispatch(Event::OmxPortEnabled { handle: a, port: 1 });
            m.dispatch(Event::OmxPortEnabled { handle: b, port: 0 });
        }
        assert_eq!(m.state(), State::Executing);

        // first skip: position 0 -> 1, still in range, pipeline rewired.
        m.dispatch(Event::Skip(1));
        assert!(matches!(m.state(), State::Skipping(_)));
        let source = handle_for(&fw, "source");
        let demuxer = handle_for(&fw, "demuxer");
        m.dispatch(Event::OmxPortDisabled { handle: source, port: 1 });
        m.dispatch(Event::OmxPortDisabled { handle: demuxer, port: 0 });
        m.dispatch(Event::OmxPortEnabled { handle: source, port: 1 });
        m.dispatch(Event::OmxPortEnabled { handle: demuxer, port: 0 });
        assert_eq!(m.state(), State::Executing);

        // second skip: position 1 -> 2 is past the last track.
        m.dispatch(Event::Skip(1));

        assert_eq!(m.state(), State::Unloaded);
        let seen: Vec<_> = notifications.try_iter().collect();
        assert!(seen.iter().any(|n| matches!(n, omx_ops::Notification::EndOfPlay)));
        assert!(seen.iter().any(|n| matches!(n, omx_ops::Notification::Unloaded)));
    }

    #[test]
    fn fatal_framework_error_tears_down_to_unloaded() {
        let (mut m, fw, notifications) = new_machine();
        drive_auto_detect_and_graph_update(&mut m, &fw);

        let decoder = handle_for(&fw, "decoder");
        m.dispatch(Event::OmxErr {
            handle: decoder,
            error: OmxErrorCode::InsufficientResources,
            port: 0,
        });
        assert_eq!(m.state(), State::Exe2Idle);

        for name in ["source", "demuxer", "decoder", "renderer"] {
            let h = handle_for(&fw, name);
            m.dispatch(Event::OmxTrans { handle: h, state: OmxState::Idle });
        }
        assert_eq!(m.state(), State::Idle2Loaded);
        for name in ["source", "demuxer", "decoder", "renderer"] {
            let h = handle_for(&fw, name);
            m.dispatch(Event::OmxTrans { handle: h, state: OmxState::Loaded });
        }
        assert_eq!(m.state(), State::Unloaded);

        let seen: Vec<_> = notifications.try_iter().collect();
        assert!(seen.iter().any(|n| matches!(n, omx_ops::Notification::Error { .. })));
        assert!(seen.iter().any(|n| matches!(n, omx_ops::Notification::Unloaded)));
    }

    #[test]
    fn unload_from_paused_tears_down_without_error() {
        let (mut m, fw, notifications) = new_machine();
        drive_auto_detect_and_graph_update(&mut m, &fw);

        m.dispatch(Event::Pause);
        assert_eq!(m.state(), State::Exe2Pause);
        for name in ["source", "demuxer", "decoder", "renderer"] {
            let h = handle_for(&fw, name);
            m.dispatch(Event::OmxTrans { handle: h, state: OmxState::Paused });
        }
        assert_eq!(m.state(), State::Pause);

        m.dispatch(Event::Unload);
        assert_eq!(m.state(), State::Pause2Idle);
        for name in ["source", "demuxer", "decoder", "renderer"] {
            let h = handle_for(&fw, name);
            m.dispatch(Event::OmxTrans { handle: h, state: OmxState::Idle });
        }
        assert_eq!(m.state(), State::Idle2Loaded);
        for name in ["source", "demuxer", "decoder", "renderer"] {
            let h = handle_for(&fw, name);
            m.dispatch(Event::OmxTrans { handle: h, state: OmxState::Loaded });
        }
        assert_eq!(m.state(), State::Unloaded);

        let seen: Vec<_> = notifications.try_iter().collect();
        assert!(!seen.iter().any(|n| matches!(n, omx_ops::Notification::Error { .. })));
        assert!(seen.iter().any(|n| matches!(n, omx_ops::Notification::Unloaded)));
    }

    struct PassthroughResolver;
    impl omx_ops::StreamResolver for PassthroughResolver {
        fn resolve(&self, item: &PlaylistItem) -> Result<String, omx_ops::OmxError> {
            Ok(item.uri.clone())
        }
    }

    #[test]
    fn non_fatal_error_during_teardown_self_loops() {
        // StreamCorrupt is only non-fatal for a streaming graph: a local
        // file can't heal on retry, but a network hiccup might (see the
        // strategies' differing `is_fatal_error`).
        let fw = Arc::new(FakeFramework::new());
        let (tx, _n) = crossbeam_channel::unbounded();
        let strategy = omx_ops::StreamingStrategy::new(Box::new(PassthroughResolver));
        let ops = Ops::new(fw.clone(), strategy, tx, GraphKind::Streaming { service: "radio".into() });
        let mut m = Machine::new(ops);

        drive_auto_detect_and_graph_update(&mut m, &fw);
        m.dispatch(Event::Stop);
        assert_eq!(m.state(), State::Exe2Idle);

        let renderer = handle_for(&fw, "renderer");
        m.dispatch(Event::OmxErr {
            handle: renderer,
            error: OmxErrorCode::StreamCorrupt,
            port: 0,
        });
        assert_eq!(m.state(), State::Exe2Idle);
    }
}
