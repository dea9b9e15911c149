//! Neighborhood transparency portal and eco-corridor payload helpers.
//!
//! The two halves are independent: [`portal`] polls a metrics endpoint and
//! renders HTML fragments, [`corridor`] reshapes caller-side corridor settings
//! into the objects an external decision system expects.

pub mod config;
pub mod corridor;
pub mod error;
pub mod metrics;
pub mod portal;
pub mod render;
pub mod target;

pub use config::{Config, PortalConfig};
pub use corridor::{EcoCorridorClient, EcoCorridorContext, SncPayload};
pub use error::{PortalError, Result};
pub use portal::{ErrorEntry, TransparencyPortal};
pub use target::{DirectoryTarget, MemoryTarget, RenderTarget, StdoutTarget};
