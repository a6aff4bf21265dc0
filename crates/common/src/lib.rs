//! Common types shared by the shell's trust-boundary crates.

pub mod error;
pub mod headers;
pub mod surface;

pub use error::{ShellError, ShellResult};
pub use headers::HeaderMap;
pub use surface::{SurfaceId, SurfaceKind};
