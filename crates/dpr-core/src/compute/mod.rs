mod engine;
pub mod parallel;
pub mod sequential;

pub use engine::{create_engine, DprEngine, EnginePreference};
