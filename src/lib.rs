pub mod cli;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod logging;
pub mod metrics;
pub mod migrate;
pub mod model;
pub mod search;
pub mod store;

pub use config::Config;
pub use model::{Rating, Solution};
pub use store::SolutionStore;
