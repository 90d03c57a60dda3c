pub mod store;

pub use store::{EngineState, SchedulingStore};
