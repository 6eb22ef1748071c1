//! The driver seam: the injected capability through which webhelm talks to
//! the real browser surface.
//!
//! The control loop never performs I/O against the browser directly. A host
//! embeds the engine by implementing [`Driver`] on top of whatever transport
//! it has (WebDriver, CDP, an emulator) and handing it in. Everything the
//! engine needs is expressed as typed operations so the policy layers stay
//! free of protocol details.

mod capability;
mod error;

#[cfg(feature = "test-util")]
pub mod testing;

pub use capability::{Driver, FocusedElement, MouseButton};
pub use error::DriverError;
