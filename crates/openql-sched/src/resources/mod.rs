//! Concrete resource state and the manager composing them.

pub mod channel;
pub mod instrument;
pub mod manager;
pub mod qubit;

pub use channel::ChannelResource;
pub use instrument::InstrumentResource;
pub use manager::{Resource, ResourceManager};
pub use qubit::QubitResource;
