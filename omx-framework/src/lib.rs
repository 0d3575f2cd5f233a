//! Safe bindings to the component framework (§6 upstream interface), plus a
//! deterministic in-memory fake used throughout this workspace's tests.
//!
//! Nothing here decides *when* to call the framework; that's the ops layer's
//! job. This crate only defines what calling it looks like and what comes
//! back.

mod error;
mod events;
mod fake;
mod framework;

pub use error::FrameworkError;
pub use events::FrameworkEvent;
pub use fake::FakeFramework;
pub use framework::Framework;
