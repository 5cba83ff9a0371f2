//! Tool configuration loading and schema definitions

#![allow(missing_docs)]

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
