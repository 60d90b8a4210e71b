//! Types shared between the volleyball environment and its hosts.

pub mod config;
pub mod protocol;
pub mod types;
pub mod vec3;
