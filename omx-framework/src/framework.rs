use crossbeam_channel::Receiver;
use omx_model::{ComponentHandle, OmxState, PortCommand, PortIndex};

use crate::error::FrameworkError;
use crate::events::FrameworkEvent;

/// Safe wrapper around the component framework's C-style entry points.
///
/// Every method here corresponds to one upstream call of §6: `OMX_GetHandle`,
/// `OMX_FreeHandle`, `OMX_SendCommand`, `OMX_SetupTunnel`,
/// `OMX_Set/GetParameter`/`OMX_Set/GetConfig`. Calls are synchronous and
/// report only whether the *request* was accepted; the actual lifecycle
/// transition, port state change, or format detection is reported later as a
/// `FrameworkEvent` on the channel returned by [`Framework::events`].
pub trait Framework: Send + Sync {
    /// Requests a new component instance by its framework-registered name.
    fn get_handle(&self, component_name: &str) -> Result<ComponentHandle, FrameworkError>;

    /// Releases a component. Must only be called once all its tunnels have
    /// been torn down and it has reached `Loaded`.
    fn free_handle(&self, handle: ComponentHandle) -> Result<(), FrameworkError>;

    /// `OMX_SendCommand(handle, OMX_CommandStateSet, state)`.
    fn set_state(&self, handle: ComponentHandle, state: OmxState) -> Result<(), FrameworkError>;

    /// `OMX_SendCommand(handle, OMX_CommandPortDisable/Enable, port)`.
    fn port_command(
        &self,
        handle: ComponentHandle,
        port: PortIndex,
        command: PortCommand,
    ) -> Result<(), FrameworkError>;

    /// `OMX_SendCommand(handle, OMX_CommandFlush, port)`.
    fn flush(&self, handle: ComponentHandle, port: PortIndex) -> Result<(), FrameworkError>;

    /// `OMX_SetupTunnel(out_handle, out_port, in_handle, in_port)`.
    fn setup_tunnel(
        &self,
        out_handle: ComponentHandle,
        out_port: PortIndex,
        in_handle: ComponentHandle,
        in_port: PortIndex,
    ) -> Result<(), FrameworkError>;

    /// `OMX_SetParameter`/`OMX_SetConfig`, collapsed to a string key/value
    /// pair: component role, source URL, and codec hints are all plain
    /// strings in this controller's scope.
    fn set_parameter(
        &self,
        handle: ComponentHandle,
        key: &str,
        value: &str,
    ) -> Result<(), FrameworkError>;

    /// `OMX_GetParameter`/`OMX_GetConfig` counterpart.
    fn get_parameter(&self, handle: ComponentHandle, key: &str) -> Result<String, FrameworkError>;

    /// The serialized stream of asynchronous events this framework instance
    /// publishes. One receiver per `Framework`; cloning the `Receiver` (as
    /// `crossbeam_channel` allows) fans the same stream out to several
    /// consumers, but the controller keeps exactly one.
    fn events(&self) -> Receiver<FrameworkEvent>;
}
