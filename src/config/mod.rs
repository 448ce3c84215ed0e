//! Runtime configuration: environment-backed [`Config`] plus fixed defaults.

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
