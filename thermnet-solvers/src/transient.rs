//! Solvers for initial value problems `dy/dt = f(t, y)`.

pub mod switching;
