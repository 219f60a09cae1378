pub mod analysis;
pub mod error;
pub mod loader;
pub mod logging;
pub mod model;
pub mod selector;
pub mod simulator;
