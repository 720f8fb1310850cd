//! # Two Blocks
//!
//! Two 0.01 m³ stainless steel blocks, one at 400 K and one at 300 K, exchange
//! heat through a 1 m long conduction path with a 0.01 m² cross section.
//! The example prints both temperatures every 1000 s over the first
//! 10 000 s, then the time it takes for the blocks to come within 1 K of
//! each other.
//!
//! ## Running the Example
//!
//! ```sh
//! RUST_LOG=debug cargo run --example two_blocks
//! ```

use std::error::Error;

use thermnet_core::units::TemperatureOps;
use thermnet_network::{Network, NodeConfig, PathConfig, SimulationConfig, simulate};
use thermnet_thermo::{FluidTable, Material};
use uom::si::{
    area::square_meter,
    f64::{Area, Length, ThermodynamicTemperature, Time, Volume},
    length::meter,
    thermodynamic_temperature::kelvin,
    time::{hour, second},
    volume::cubic_meter,
};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let fluids = FluidTable::standard();
    let mut network = Network::new();
    let block = |name: &str, t: f64| {
        NodeConfig::solid(Material::Ss316, ThermodynamicTemperature::new::<kelvin>(t))
            .with_name(name)
            .with_volume(Volume::new::<cubic_meter>(0.01))
    };
    let hot = network.add_node(block("hot", 400.0), &fluids)?;
    let cold = network.add_node(block("cold", 300.0), &fluids)?;
    network.add_path(PathConfig::new(
        hot,
        cold,
        Area::new::<square_meter>(0.01),
        Length::new::<meter>(1.0),
    ))?;

    let t_eval: Vec<Time> = (0..=10)
        .map(|i| Time::new::<second>(1000.0 * f64::from(i)))
        .collect();
    let span = [Time::new::<second>(0.0), Time::new::<second>(10_000.0)];
    let config = SimulationConfig::default();

    let result = simulate(&network, span, &t_eval, &config)?;
    println!("{} ({:?} branch)", result.message(), result.branch);
    println!("{:>8}  {:>10}  {:>10}", "t [s]", "hot [K]", "cold [K]");
    for (step, t) in result.times.iter().enumerate() {
        println!(
            "{:>8.0}  {:>10.4}  {:>10.4}",
            t.get::<second>(),
            result.temperatures[(hot.index(), step)],
            result.temperatures[(cold.index(), step)],
        );
    }

    // Step through the rest of the approach without an output grid.
    let long = [Time::new::<second>(0.0), Time::new::<hour>(500.0)];
    let result = simulate(&network, long, &[], &config)?;
    let within = result.times.iter().enumerate().find(|&(step, _)| {
        let gap = result.temperatures[(hot.index(), step)]
            - result.temperatures[(cold.index(), step)];
        gap < 1.0
    });
    match within {
        Some((_, t)) => println!("within 1 K after {:.1} h", t.get::<hour>()),
        None => println!("still more than 1 K apart after 500 h"),
    }

    let last = result.final_temperatures();
    println!(
        "after {} accepted steps: hot {:.3} K, cold {:.3} K",
        result.stats.accepted_steps,
        last[hot.index()].kelvin(),
        last[cold.index()].kelvin(),
    );

    Ok(())
}
