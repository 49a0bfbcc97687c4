#[macro_use]
mod console;

pub mod error;
pub mod config;
pub mod document;
pub mod trigger;
pub mod candidates;
pub mod keys;
pub mod annotation;
pub mod scanner;
pub mod controller;
pub mod engine;
pub mod wasm;

pub use error::*;
pub use config::*;
pub use document::*;
pub use trigger::*;
pub use candidates::*;
pub use keys::*;
pub use annotation::*;
pub use scanner::*;
pub use controller::*;
pub use engine::*;
pub use wasm::*;

#[cfg(test)]
mod tests;
