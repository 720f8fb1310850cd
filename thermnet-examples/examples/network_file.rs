//! # Network File
//!
//! Loads a network description from TOML, simulates it, and prints every
//! node's temperature at the requested output times along with the heat
//! flows at the end of the run.
//!
//! ## Running the Example
//!
//! ```sh
//! cargo run --example network_file
//! cargo run --example network_file -- path/to/network.toml
//! ```

use std::{env, error::Error, path::PathBuf};

use thermnet_network::{HeatBalance, NetworkConfig};
use thermnet_thermo::FluidTable;
use uom::si::{power::watt, time::second};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let path = env::args_os().nth(1).map_or_else(
        || PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/heated_plate.toml"),
        PathBuf::from,
    );
    log::info!("loading {}", path.display());

    let loaded = NetworkConfig::from_file(&path)?.build(&FluidTable::standard())?;
    let result = loaded.simulate()?;
    println!("{}", result.message());

    let names: Vec<String> = loaded
        .network
        .nodes()
        .iter()
        .enumerate()
        .map(|(index, node)| node.name().map_or_else(|| format!("#{index}"), str::to_owned))
        .collect();

    print!("{:>8}", "t [s]");
    for name in &names {
        print!("  {name:>10}");
    }
    println!();
    for (step, t) in result.times.iter().enumerate() {
        print!("{:>8.0}", t.get::<second>());
        for node in 0..names.len() {
            print!("  {:>10.3}", result.temperatures[(node, step)]);
        }
        println!();
    }

    let balance = HeatBalance::new(&loaded.network, loaded.config.branch)?;
    if let Some(last) = result.temperatures.ncols().checked_sub(1) {
        let temperatures: Vec<f64> = result.temperatures.column(last).iter().copied().collect();
        for (path, flow) in loaded
            .network
            .paths()
            .iter()
            .zip(balance.path_heat_flows(&temperatures))
        {
            println!(
                "{} -> {}: {:.3} W",
                names[path.from().index()],
                names[path.to().index()],
                flow.get::<watt>()
            );
        }
    }

    Ok(())
}
