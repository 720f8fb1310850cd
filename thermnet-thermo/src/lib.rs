//! Fluid and solid material property providers for thermnet.
//!
//! Nodes of a thermal network take a snapshot of three properties when they
//! are built: density, thermal conductivity, and specific heat.
//! Fluids resolve them from temperature and pressure through a
//! [`FluidProperties`] provider, and solids read them from the static
//! [`Material`] table.

mod error;

pub mod fluid;
pub mod material;

pub use error::PropertyError;
pub use fluid::{FluidModel, FluidProperties, FluidTable};
pub use material::{Material, MaterialRecord};

#[cfg(feature = "coolprop")]
pub use fluid::coolprop::CoolProp;
