//! Process-wide static configuration flags with scoped, self-restoring overrides.

pub mod consts;
pub mod config;
pub mod global;
pub mod context;
pub mod cli;

pub use config::{parse_bool_flag, StaticConfigValues};
pub use context::StaticConfigContext;
