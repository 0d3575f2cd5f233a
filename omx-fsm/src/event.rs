use omx_model::{ComponentHandle, GraphKind, OmxErrorCode, OmxState, Playlist, PlaylistItem, PortIndex};

/// Everything the FSM can react to: user commands, framework callbacks (the
/// `omx_*` variants), and the synthetic events composite sub-machines emit on
/// their own exit pseudo-state.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Load { playlist: Playlist, kind: GraphKind },
    Execute,
    Pause,
    Stop,
    Unload,
    Seek,
    Skip(i64),
    Position(i64),
    Volume(f64),
    VolumeStep(i32),
    Mute,
    PrintPlaylist,
    AddPlaylist(Vec<PlaylistItem>),
    Timer,

    OmxTrans { handle: ComponentHandle, state: OmxState },
    OmxPortDisabled { handle: ComponentHandle, port: PortIndex },
    OmxPortEnabled { handle: ComponentHandle, port: PortIndex },
    OmxPortSettings { handle: ComponentHandle, port: PortIndex, index: u32 },
    OmxFormatDetected { handle: ComponentHandle, port: PortIndex },
    OmxEos { handle: ComponentHandle, port: PortIndex },
    OmxErr { handle: ComponentHandle, error: OmxErrorCode, port: PortIndex },

    AutoDetected,
    GraphUpdated,
    GraphReconfigured,
    Skipped,
    Err,
}

impl Event {
    /// Short tag used only for `trace!`/`debug!` logging of dropped events;
    /// keeps log lines stable even though most variants carry data.
    pub fn tag(&self) -> &'static str {
        match self {
            Event::Load { .. } => "load",
            Event::Execute => "execute",
            Event::Pause => "pause",
            Event::Stop => "stop",
            Event::Unload => "unload",
            Event::Seek => "seek",
            Event::Skip(_) => "skip",
            Event::Position(_) => "position",
            Event::Volume(_) => "volume",
            Event::VolumeStep(_) => "volume_step",
            Event::Mute => "mute",
            Event::PrintPlaylist => "prnt_plist",
            Event::AddPlaylist(_) => "add_plist",
            Event::Timer => "timer",
            Event::OmxTrans { .. } => "omx_trans",
            Event::OmxPortDisabled { .. } => "omx_port_disabled",
            Event::OmxPortEnabled { .. } => "omx_port_enabled",
            Event::OmxPortSettings { .. } => "omx_port_settings",
            Event::OmxFormatDetected { .. } => "omx_format_detected",
            Event::OmxEos { .. } => "omx_eos",
            Event::OmxErr { .. } => "omx_err",
            Event::AutoDetected => "auto_detected",
            Event::GraphUpdated => "graph_updated",
            Event::GraphReconfigured => "graph_reconfigured",
            Event::Skipped => "skipped",
            Event::Err => "err",
        }
    }
}

impl From<omx_framework::FrameworkEvent> for Event {
    fn from(e: omx_framework::FrameworkEvent) -> Self {
        use omx_framework::FrameworkEvent as FE;
        match e {
            FE::TransitionComplete { handle, state } => Event::OmxTrans { handle, state },
            FE::PortDisabled { handle, port } => Event::OmxPortDisabled { handle, port },
            FE::PortEnabled { handle, port } => Event::OmxPortEnabled { handle, port },
            FE::PortSettingsChanged { handle, port, index } => {
                Event::OmxPortSettings { handle, port, index }
            }
            FE::FormatDetected { handle, port } => Event::OmxFormatDetected { handle, port },
            FE::Eos { handle, port } => Event::OmxEos { handle, port },
            FE::Error { handle, error, port } => Event::OmxErr { handle, error, port },
        }
    }
}
