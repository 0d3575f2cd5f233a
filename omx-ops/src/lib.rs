//! Operations layer: turns FSM action names into framework calls and keeps
//! the bookkeeping (ledgers, playlist cursor, error state) the FSM's guards
//! read back out.

mod error;
mod ledger;
mod notification;
mod ops;
mod strategy;

pub use error::OmxError;
pub use ledger::{PortTransitionLedger, TransitionLedger};
pub use notification::Notification;
pub use ops::Ops;
pub use strategy::{GraphStrategy, LocalFileStrategy, StreamResolver, StreamingStrategy};

use omx_model::{ComponentRole, ComponentSpec, PipelineConfig};

/// The canonical source -> demuxer -> decoder -> renderer shape shared by
/// every graph kind this controller builds. Specializations differ in how
/// the source URI is resolved and in which errors they treat as fatal, never
/// in the shape of the pipeline itself.
pub fn local_pipeline() -> PipelineConfig {
    PipelineConfig::new(vec![
        ComponentSpec::new("source", ComponentRole::Source),
        ComponentSpec::new("demuxer", ComponentRole::Demuxer),
        ComponentSpec::new("decoder", ComponentRole::Decoder),
        ComponentSpec::new("renderer", ComponentRole::Renderer),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use omx_framework::{FakeFramework, Framework};
    use omx_model::{GraphKind, OmxState, Playlist, PlaylistItem};
    use std::sync::Arc;

    fn new_ops() -> (Ops<FakeFramework, LocalFileStrategy>, Arc<FakeFramework>) {
        let fw = Arc::new(FakeFramework::new());
        let (tx, _rx) = crossbeam_channel::unbounded();
        (Ops::new(fw.clone(), LocalFileStrategy, tx, GraphKind::LocalFile), fw)
    }

    #[test]
    fn load_walks_every_component_in_order() {
        let (mut ops, fw) = new_ops();
        let playlist = Playlist::new(vec![PlaylistItem::new("file:///a.mp3")]);
        ops.do_store_config(&GraphKind::LocalFile, playlist);
        ops.do_load();
        assert_eq!(ops.handle_count(), 4);
        assert!(fw.handle_for("source").is_some());
        assert!(fw.handle_for("renderer").is_some());
    }

    #[test]
    fn configure_source_resolves_uri_from_playlist() {
        let (mut ops, fw) = new_ops();
        let playlist = Playlist::new(vec![
            PlaylistItem::new("file:///a.mp3"),
            PlaylistItem::new("file:///b.mp3"),
        ]);
        ops.do_store_config(&GraphKind::LocalFile, playlist);
        ops.do_load();
        // do_store_config already seeds position 0; skip forward one to
        // exercise do_configure_comp's uri resolution on the new track.
        ops.do_store_skip(1);
        ops.do_skip();
        let source = fw.handle_for("source").unwrap();
        assert!(fw.get_parameter(source, "uri").is_ok());
    }

    #[test]
    fn loaded2idle_completes_only_once_every_component_acks() {
        let (mut ops, _fw) = new_ops();
        let playlist = Playlist::new(vec![PlaylistItem::new("file:///a.mp3")]);
        ops.do_store_config(&GraphKind::LocalFile, playlist);
        ops.do_load();
        ops.do_loaded2idle();
        let handles: Vec<_> = (0..4).map(|i| ops.handle_of(i).unwrap()).collect();
        for (i, h) in handles.iter().enumerate() {
            let complete = ops.is_trans_complete(*h, OmxState::Idle);
            assert_eq!(complete, i == handles.len() - 1);
        }
    }

    #[test]
    fn skip_past_playlist_end_reports_end_of_play() {
        let (mut ops, _fw) = new_ops();
        let playlist = Playlist::new(vec![PlaylistItem::new("file:///a.mp3")]);
        ops.do_store_config(&GraphKind::LocalFile, playlist);
        ops.do_load();
        ops.do_store_skip(1);
        ops.do_skip();
        ops.do_store_skip(1);
        assert!(ops.is_end_of_play());
    }

    #[test]
    fn volume_clamps_and_mute_restores_previous_level() {
        let (mut ops, _fw) = new_ops();
        ops.do_volume(0.4);
        ops.do_mute();
        ops.do_mute();
        // second toggle restores 0.4; can't observe the value directly here
        // without a notification receiver, so this just exercises the path.
        ops.do_volume_step(100);
    }
}
