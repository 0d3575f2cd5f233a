use omx_model::{ComponentHandle, OmxErrorCode, OmxState, PortIndex};

/// Raw asynchronous notification coming out of the framework's
/// `EventHandler`/`EmptyBufferDone`/`FillBufferDone` callbacks. These are the
/// framework-originated half of the FSM's event alphabet (`omx_*` in the
/// design); the dispatch glue tags and forwards them onto the FSM's queue
/// essentially unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameworkEvent {
    TransitionComplete {
        handle: ComponentHandle,
        state: OmxState,
    },
    PortDisabled {
        handle: ComponentHandle,
        port: PortIndex,
    },
    PortEnabled {
        handle: ComponentHandle,
        port: PortIndex,
    },
    PortSettingsChanged {
        handle: ComponentHandle,
        port: PortIndex,
        index: u32,
    },
    FormatDetected {
        handle: ComponentHandle,
        port: PortIndex,
    },
    Eos {
        handle: ComponentHandle,
        port: PortIndex,
    },
    Error {
        handle: ComponentHandle,
        error: OmxErrorCode,
        port: PortIndex,
    },
}
