//! sf-core: stable foundation for stormflow.
//!
//! Contains:
//! - clock (millisecond simulation clocks + calendar mapping)
//! - units (unit-system tags; quantities are unit-suffixed `f64`s)
//! - version (encoded engine version)
//! - error (shared error types)

pub mod clock;
pub mod error;
pub mod units;
pub mod version;

// Re-exports: nice ergonomics for downstream crates
pub use clock::*;
pub use error::{CoreError, CoreResult};
pub use units::*;
pub use version::*;
