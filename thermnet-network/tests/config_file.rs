use std::path::PathBuf;

use thermnet_network::{
    Network, NetworkConfig, NodeConfig, PathConfig, SimulationConfig, simulate,
};
use thermnet_solvers::transient::switching::Config;
use thermnet_thermo::{FluidTable, Material};
use uom::si::{
    area::square_meter,
    f64::{Area, Length, ThermodynamicTemperature, Time},
    length::meter,
    thermodynamic_temperature::kelvin,
    time::second,
};

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

#[test]
fn file_reproduces_programmatic_network() {
    let fluids = FluidTable::standard();
    let loaded = NetworkConfig::from_file(data("two_blocks.toml"))
        .unwrap()
        .build(&fluids)
        .unwrap();
    let from_file = loaded.simulate().unwrap();

    let mut network = Network::new();
    let hot = network
        .add_node(
            NodeConfig::solid(Material::Ss316, ThermodynamicTemperature::new::<kelvin>(400.0))
                .with_name("hot"),
            &fluids,
        )
        .unwrap();
    let cold = network
        .add_node(
            NodeConfig::solid(Material::Ss316, ThermodynamicTemperature::new::<kelvin>(300.0))
                .with_name("cold"),
            &fluids,
        )
        .unwrap();
    network
        .add_path(PathConfig::new(
            hot,
            cold,
            Area::new::<square_meter>(0.01),
            Length::new::<meter>(1.0),
        ))
        .unwrap();
    assert_eq!(loaded.network, network);

    let t_eval: Vec<Time> = (0..=10)
        .map(|i| Time::new::<second>(1000.0 * f64::from(i)))
        .collect();
    let config = SimulationConfig::new(Config::new(1e-6, 1e-7).unwrap());
    let programmatic = simulate(
        &network,
        [Time::new::<second>(0.0), Time::new::<second>(10_000.0)],
        &t_eval,
        &config,
    )
    .unwrap();

    assert_eq!(from_file.times, programmatic.times);
    assert_eq!(from_file.temperatures, programmatic.temperatures);
}

#[test]
fn file_round_trips_through_the_simulation() {
    let fluids = FluidTable::standard();
    let mut loaded = NetworkConfig::from_file(data("two_blocks.toml"))
        .unwrap()
        .build(&fluids)
        .unwrap();

    let result = loaded.simulate().unwrap();
    loaded.network.apply_final_temperatures(&result).unwrap();

    let hot = loaded.network.find_node("hot").unwrap();
    let cold = loaded.network.find_node("cold").unwrap();
    let hot = loaded.network.node(hot).unwrap().temperature();
    let cold = loaded.network.node(cold).unwrap().temperature();
    assert!(hot < ThermodynamicTemperature::new::<kelvin>(400.0));
    assert!(cold > ThermodynamicTemperature::new::<kelvin>(300.0));
    assert!(hot > cold);
}
