use omx_framework::Framework;
use omx_model::{ComponentHandle, GraphKind, OmxErrorCode, PipelineConfig, PlaylistItem, TunnelIndex};

use crate::error::OmxError;

/// Resolves a playlist item into a URI the source component can open.
/// Local-file graphs don't need one (the playlist item's URI already is a
/// local path); streaming graphs plug in a service-specific resolver here,
/// matching the original system's Spotify/YouTube specializations, which
/// differed from each other only in how they turned a catalog item into a
/// playable stream.
pub trait StreamResolver: Send + Sync {
    fn resolve(&self, item: &PlaylistItem) -> Result<String, OmxError>;
}

/// The handful of hooks that vary across graph kinds (§4.2 "Specializations",
/// §9 design note on preferring composition over a deep ops hierarchy).
pub trait GraphStrategy: Send + Sync {
    /// Builds the ordered component list for a pipeline of this kind.
    fn pipeline_factory(&self, kind: &GraphKind) -> PipelineConfig;

    /// Turns a playlist item into the URI handed to the source component.
    fn resolve_uri(&self, item: &PlaylistItem) -> Result<String, OmxError>;

    /// Re-derives port format parameters on both endpoints of `tunnel` after
    /// a port-settings-changed event. The default no-ops past logging, since
    /// the framework fake has no real format negotiation; a real framework
    /// binding would call `set_parameter` with the new format here.
    fn reconfigure_tunnel(
        &self,
        framework: &dyn Framework,
        pipeline: &PipelineConfig,
        handles: &[ComponentHandle],
        tunnel: TunnelIndex,
    ) -> Result<(), OmxError> {
        let _ = (framework, pipeline, handles, tunnel);
        Ok(())
    }

    /// Hook run at the end of `do_probe`; `false` aborts auto-detection as a
    /// logic error rather than a framework error.
    fn probe_stream_hook(&self) -> bool {
        true
    }

    /// Classifies a framework-reported error as fatal (forces teardown) or
    /// absorbable. This varies by graph kind: see the open question in
    /// SPEC_FULL.md §9 about `is_fatal_error` needing explicit per-kind
    /// enumeration rather than a single shared rule.
    fn is_fatal_error(&self, error: &OmxErrorCode) -> bool;

    /// Whether `do_skip` is meaningful for this graph kind (a live radio
    /// stream graph, for instance, might reject it).
    fn is_skip_allowed(&self) -> bool {
        true
    }
}

fn always_fatal(error: &OmxErrorCode) -> bool {
    matches!(
        error,
        OmxErrorCode::InsufficientResources
            | OmxErrorCode::PortUnresponsiveDuringAllocation
            | OmxErrorCode::PortUnresponsiveDuringDeallocation
            | OmxErrorCode::PortUnresponsiveDuringStop
    )
}

/// A plain, fully local source → demuxer → decoder → renderer graph. URIs
/// are taken from the playlist verbatim; no network resolution happens.
#[derive(Default)]
pub struct LocalFileStrategy;

impl GraphStrategy for LocalFileStrategy {
    fn pipeline_factory(&self, _kind: &GraphKind) -> PipelineConfig {
        crate::local_pipeline()
    }

    fn resolve_uri(&self, item: &PlaylistItem) -> Result<String, OmxError> {
        Ok(item.uri.clone())
    }

    fn is_fatal_error(&self, error: &OmxErrorCode) -> bool {
        // A corrupt local file will not heal itself on retry: unlike a
        // network glitch, stream corruption here is unrecoverable.
        always_fatal(error) || matches!(error, OmxErrorCode::StreamCorrupt | OmxErrorCode::FormatNotDetected)
    }
}

/// A streaming-service graph: the same component shape as the local graph,
/// fronted by a pluggable [`StreamResolver`] that turns catalog items into
/// playable URIs.
pub struct StreamingStrategy {
    resolver: Box<dyn StreamResolver>,
}

impl StreamingStrategy {
    pub fn new(resolver: Box<dyn StreamResolver>) -> Self {
        StreamingStrategy { resolver }
    }
}

impl GraphStrategy for StreamingStrategy {
    fn pipeline_factory(&self, _kind: &GraphKind) -> PipelineConfig {
        crate::local_pipeline()
    }

    fn resolve_uri(&self, item: &PlaylistItem) -> Result<String, OmxError> {
        self.resolver.resolve(item)
    }

    fn is_fatal_error(&self, error: &OmxErrorCode) -> bool {
        // Transient network hiccups surface as StreamCorrupt too; a
        // streaming graph tolerates them and lets the teardown path's
        // non-fatal self-loop absorb the event instead of killing playback.
        always_fatal(error) || matches!(error, OmxErrorCode::FormatNotDetected)
    }
}
