use approx::assert_relative_eq;
use thermnet_core::units::TemperatureOps;
use thermnet_network::{Network, NodeConfig, PathConfig, SimulationConfig, simulate};
use thermnet_solvers::transient::switching::Config;
use thermnet_thermo::{FluidTable, Material};
use uom::si::{
    area::square_meter,
    f64::{Area, HeatTransfer, Length, Power, Pressure, ThermodynamicTemperature, Time},
    heat_transfer::watt_per_square_meter_kelvin,
    length::meter,
    power::watt,
    pressure::atmosphere,
    thermodynamic_temperature::kelvin,
    time::second,
};

fn kelvins(value: f64) -> ThermodynamicTemperature {
    ThermodynamicTemperature::new::<kelvin>(value)
}

fn span(end: f64) -> [Time; 2] {
    [Time::new::<second>(0.0), Time::new::<second>(end)]
}

/// A – B – C with identical paths and fixed ends.
fn chain(middle: f64) -> Network {
    let fluids = FluidTable::new();
    let mut network = Network::new();
    let a = network
        .add_node(
            NodeConfig::solid(Material::Ss316, kelvins(400.0)).isothermal(),
            &fluids,
        )
        .unwrap();
    let b = network
        .add_node(NodeConfig::solid(Material::Ss316, kelvins(middle)), &fluids)
        .unwrap();
    let c = network
        .add_node(
            NodeConfig::solid(Material::Ss316, kelvins(300.0)).isothermal(),
            &fluids,
        )
        .unwrap();

    let path = |from, to| {
        PathConfig::new(
            from,
            to,
            Area::new::<square_meter>(0.1),
            Length::new::<meter>(0.1),
        )
    };
    network.add_path(path(a, b)).unwrap();
    network.add_path(path(b, c)).unwrap();
    network
}

#[test]
fn middle_node_settles_at_mean_of_ends() {
    let network = chain(300.0);
    let config = SimulationConfig::new(Config::new(1e-8, 1e-7).unwrap());

    let result = simulate(
        &network,
        span(50_000.0),
        &[Time::new::<second>(50_000.0)],
        &config,
    )
    .unwrap();

    assert!(result.success());
    assert_relative_eq!(result.temperatures[(1, 0)], 350.0, epsilon = 1e-4);
}

#[test]
fn isothermal_rows_are_exact() {
    let network = chain(500.0);
    let fixed: Vec<f64> = network
        .nodes()
        .iter()
        .map(|node| node.temperature().kelvin())
        .collect();

    let result = simulate(&network, span(20_000.0), &[], &SimulationConfig::default()).unwrap();

    assert!(result.temperatures.ncols() > 2);
    for &node in &[0, 2] {
        assert!(
            result
                .temperatures
                .row(node)
                .iter()
                .all(|&t| t == fixed[node])
        );
    }
    // The free node starts above both ends and cools toward their mean.
    let middle = result.temperatures.row(1);
    assert_eq!(middle[0], 500.0);
    assert!(middle.iter().all(|&t| t > 349.0 && t <= 500.0));
}

#[test]
fn isothermal_ambient_with_convection_and_radiation() {
    let fluids = FluidTable::standard();
    let mut network = Network::new();
    let block = network
        .add_node(
            NodeConfig::solid(Material::Al6061, kelvins(600.0))
                .with_emissivity(0.8)
                .with_heat_generation(Power::new::<watt>(500.0)),
            &fluids,
        )
        .unwrap();
    let ambient = network
        .add_node(
            NodeConfig::fluid("Air", Pressure::new::<atmosphere>(1.0), kelvins(300.0)).isothermal(),
            &fluids,
        )
        .unwrap();
    network
        .add_path(
            PathConfig::new(
                block,
                ambient,
                Area::new::<square_meter>(0.05),
                Length::new::<meter>(0.05),
            )
            .with_convection(HeatTransfer::new::<watt_per_square_meter_kelvin>(15.0)),
        )
        .unwrap();

    let result = simulate(&network, span(20_000.0), &[], &SimulationConfig::default()).unwrap();

    assert!(result.success());
    assert!(result.temperatures.row(1).iter().all(|&t| t == 300.0));
    let block = result.temperatures.row(0);
    assert!(block.iter().all(|&t| t > 300.0 && t <= 600.0));
    assert!(block[block.len() - 1] < 400.0);
}
