//! Numerical integrators for thermnet.
//!
//! The only integrator today is [`transient::switching`], an adaptive solver
//! that moves between an explicit Runge–Kutta formula and an implicit BDF
//! formula depending on how stiff the problem looks.

pub mod transient;
