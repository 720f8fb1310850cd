//! Core traits and types for thermnet.
//!
//! This crate defines the shared abstractions the other thermnet crates build on:
//!
//! - [`constraint`]: numeric invariants enforced at construction time
//! - [`OdeSystem`]: a right-hand side `dy/dt = f(t, y)` that solvers integrate
//! - [`Observer`]: receives solver events and optionally returns control actions
//! - [`units`]: helpers for working with `uom` temperatures

pub mod constraint;
pub mod units;

mod observer;
mod ode;

pub use observer::Observer;
pub use ode::OdeSystem;
