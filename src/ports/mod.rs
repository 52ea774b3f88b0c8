//! Ports (trait boundaries) for external dependencies.
//!
//! These traits are owned by the core and implemented by adapters and
//! pipeline components.

pub mod learner;
pub mod observer;
pub mod repository;

pub use learner::{Learner, Transition};
pub use observer::Observer;
pub use repository::TableRepository;
