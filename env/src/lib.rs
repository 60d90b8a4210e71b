//! Volleyball environment library.
//!
//! This module exposes the simulation, the episode coordinator and the
//! host loop for use in tests and binaries.

pub mod agent;
pub mod avatar;
pub mod config;
pub mod coordinator;
pub mod court;
pub mod environment;
pub mod episode;
pub mod error;
pub mod game_loop;
pub mod input;
pub mod locomotion;
pub mod physics;
pub mod policy;
pub mod protocol;
pub mod scene;
pub mod scheduler;
pub mod trigger;

pub use volleyball_shared::{types, vec3};
