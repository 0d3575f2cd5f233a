use std::fmt;

/// Opaque identifier for a component instance handed out by the framework.
///
/// Mirrors `OMX_HANDLETYPE`: components never expose their internals, only
/// this token, which every ops/FSM operation uses to address them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentHandle(pub(crate) u64);

impl ComponentHandle {
    /// Only the framework crate constructs real handles; exposed for the
    /// in-memory fake and for tests that need to build one by hand.
    pub fn from_raw(raw: u64) -> Self {
        ComponentHandle(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

impl fmt::Display for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Index of a port within a component's port set, or of a tunnel within a
/// pipeline. Both are plain indices into framework-owned collections.
pub type PortIndex = u32;
pub type TunnelIndex = usize;
