//! Service layer: session supervision and process lifecycle.
//!
//! [`Supervisor`] restarts connection sessions forever; [`shutdown`] turns
//! process signals into cancellation of the root token.

pub mod shutdown;
pub mod supervisor;

pub use supervisor::{DEFAULT_COOLDOWN, Supervisor};
