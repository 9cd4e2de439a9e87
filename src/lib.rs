pub mod adapter;
pub mod cli;
pub mod config;
pub mod demo;
pub mod entity;
pub mod error;
pub mod features;
pub mod hook;
pub mod matrix;
pub mod prefs;
pub mod store;

pub use adapter::CollectionAdapter;
pub use demo::DataSource;
pub use error::{KarrosError, Result};
pub use hook::EntityHook;
