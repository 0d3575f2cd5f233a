//! Shared data model for the playback graph controller.
//!
//! This crate has no behaviour of its own: it is the vocabulary the
//! framework, ops, and FSM layers share, so none of them needs to depend on
//! the others just to name a handle or a playlist item.

mod errorcode;
mod handle;
mod pipeline;
mod playlist;
mod state;

pub use errorcode::OmxErrorCode;
pub use handle::{ComponentHandle, PortIndex, TunnelIndex};
pub use pipeline::{ComponentRole, ComponentSpec, GraphKind, PipelineConfig};
pub use playlist::{Playlist, PlaylistItem, INVALID_POSITION, SKIP_DEFAULT_VALUE};
pub use state::{OmxState, PortCommand};
