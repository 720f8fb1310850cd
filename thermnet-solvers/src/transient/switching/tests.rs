use std::convert::Infallible;

use approx::assert_relative_eq;
use thermnet_core::OdeSystem;
use thiserror::Error;

use super::{
    Action, Config, Error, Event, Failure, Formula, Method, Status, solve, solve_unobserved,
};

const METHODS: [Method; 3] = [Method::Auto, Method::NonStiff, Method::Stiff];

/// `dy/dt = -y`
struct Decay;

impl OdeSystem for Decay {
    type Error = Infallible;

    fn dimension(&self) -> usize {
        1
    }

    fn derivative(&self, _t: f64, y: &[f64], dydt: &mut [f64]) -> Result<(), Self::Error> {
        dydt[0] = -y[0];
        Ok(())
    }
}

/// A stiff linear system with eigenvalues −1 and −1000.
///
/// From `u(0) = 1, v(0) = 0` the exact solution is
/// `u = 2e^{−t} − e^{−1000t}`, `v = −e^{−t} + e^{−1000t}`.
struct StiffLinear;

impl OdeSystem for StiffLinear {
    type Error = Infallible;

    fn dimension(&self) -> usize {
        2
    }

    fn derivative(&self, _t: f64, y: &[f64], dydt: &mut [f64]) -> Result<(), Self::Error> {
        dydt[0] = 998.0 * y[0] + 1998.0 * y[1];
        dydt[1] = -999.0 * y[0] - 1999.0 * y[1];
        Ok(())
    }
}

/// Robertson's chemical kinetics problem.
struct Robertson;

impl OdeSystem for Robertson {
    type Error = Infallible;

    fn dimension(&self) -> usize {
        3
    }

    fn derivative(&self, _t: f64, y: &[f64], dydt: &mut [f64]) -> Result<(), Self::Error> {
        let slow = 0.04 * y[0];
        let medium = 1e4 * y[1] * y[2];
        let fast = 3e7 * y[1] * y[1];
        dydt[0] = -slow + medium;
        dydt[1] = slow - medium - fast;
        dydt[2] = fast;
        Ok(())
    }
}

/// Two components exchanging at a rate proportional to their difference.
struct Exchange;

impl OdeSystem for Exchange {
    type Error = Infallible;

    fn dimension(&self) -> usize {
        2
    }

    fn derivative(&self, _t: f64, y: &[f64], dydt: &mut [f64]) -> Result<(), Self::Error> {
        let flow = 0.5 * (y[0] - y[1]);
        dydt[0] = -flow;
        dydt[1] = flow;
        Ok(())
    }
}

#[derive(Debug, Error)]
#[error("state went negative")]
struct NegativeState;

/// Decays linearly and fails once the state goes negative.
struct Failing;

impl OdeSystem for Failing {
    type Error = NegativeState;

    fn dimension(&self) -> usize {
        1
    }

    fn derivative(&self, _t: f64, y: &[f64], dydt: &mut [f64]) -> Result<(), Self::Error> {
        if y[0] < 0.0 {
            return Err(NegativeState);
        }
        dydt[0] = -1.0;
        Ok(())
    }
}

#[test]
fn decay_matches_exact_solution_in_every_method() {
    let t_eval: Vec<f64> = (0..=10).map(|i| f64::from(i) * 0.5).collect();

    for method in METHODS {
        let config = Config::new(1e-6, 1e-10).unwrap().with_method(method);
        let solution = solve_unobserved(&Decay, [0.0, 5.0], &[1.0], &t_eval, &config).unwrap();

        assert_eq!(solution.status, Status::Complete, "{method:?}");
        assert_eq!(solution.times, t_eval);
        for (t, y) in solution.times.iter().zip(&solution.states) {
            assert_relative_eq!(y[0], (-t).exp(), max_relative = 1e-3);
        }
    }
}

#[test]
fn stiff_linear_system_matches_exact_solution() {
    let t_eval = [0.5, 1.0, 2.0, 5.0, 10.0];

    for method in METHODS {
        let config = Config::new(1e-7, 1e-12).unwrap().with_method(method);
        let solution =
            solve_unobserved(&StiffLinear, [0.0, 10.0], &[1.0, 0.0], &t_eval, &config).unwrap();

        assert_eq!(solution.status, Status::Complete, "{method:?}");
        for (&t, y) in solution.times.iter().zip(&solution.states) {
            let slow = (-t).exp();
            let fast = (-1000.0 * t).exp();
            assert_relative_eq!(y[0], 2.0 * slow - fast, max_relative = 1e-3);
            assert_relative_eq!(y[1], -slow + fast, max_relative = 1e-3);
        }
    }
}

#[test]
fn auto_switches_to_bdf_on_stiff_problems() {
    let config = Config::new(1e-6, 1e-10).unwrap();
    let auto = solve_unobserved(&StiffLinear, [0.0, 10.0], &[1.0, 0.0], &[10.0], &config).unwrap();

    let explicit = solve_unobserved(
        &StiffLinear,
        [0.0, 10.0],
        &[1.0, 0.0],
        &[10.0],
        &config.with_method(Method::NonStiff),
    )
    .unwrap();

    assert!(auto.stats.method_switches >= 1);
    assert!(auto.stats.jacobian_evaluations >= 1);
    assert!(auto.stats.accepted_steps < explicit.stats.accepted_steps);
    assert_eq!(explicit.stats.method_switches, 0);
    assert_eq!(explicit.stats.jacobian_evaluations, 0);
}

#[test]
fn robertson_kinetics() {
    for method in [Method::Auto, Method::Stiff] {
        let config = Config::new(1e-4, 1e-10).unwrap().with_method(method);
        let solution =
            solve_unobserved(&Robertson, [0.0, 40.0], &[1.0, 0.0, 0.0], &[40.0], &config).unwrap();

        assert_eq!(solution.status, Status::Complete, "{method:?}");
        let y = &solution.states[0];
        assert_relative_eq!(y[0], 0.715_827, epsilon = 1e-3);
        assert_relative_eq!(y[2], 0.284_155, epsilon = 1e-3);
        assert_relative_eq!(y.sum(), 1.0, epsilon = 1e-8);
    }
}

#[test]
fn linear_invariants_are_preserved() {
    let t_eval: Vec<f64> = (0..=20).map(f64::from).collect();

    for method in METHODS {
        let config = Config::new(1e-8, 1e-10).unwrap().with_method(method);
        let solution =
            solve_unobserved(&Exchange, [0.0, 20.0], &[400.0, 300.0], &t_eval, &config).unwrap();

        for y in &solution.states {
            assert_relative_eq!(y.sum(), 700.0, max_relative = 1e-12);
        }
        let last = solution.states.last().unwrap();
        assert_relative_eq!(last[0], 350.0 + 50.0 * (-20.0_f64).exp(), epsilon = 1e-4);
    }
}

#[test]
fn start_time_returns_initial_state_exactly() {
    let initial = [0.1 + 0.2, 1.0 / 3.0];
    let solution =
        solve_unobserved(&Exchange, [2.0, 50.0], &initial, &[2.0], &Config::default()).unwrap();

    assert_eq!(solution.status, Status::Complete);
    assert_eq!(solution.times, vec![2.0]);
    assert_eq!(solution.states[0].as_slice(), &initial);
}

#[test]
fn empty_span_does_not_step() {
    let solution =
        solve_unobserved(&Decay, [1.0, 1.0], &[3.0], &[], &Config::default()).unwrap();

    assert_eq!(solution.status, Status::Complete);
    assert_eq!(solution.times, vec![1.0]);
    assert_eq!(solution.stats.accepted_steps, 0);
}

#[test]
fn empty_eval_records_every_step() {
    let solution = solve_unobserved(&Decay, [0.0, 3.0], &[1.0], &[], &Config::default()).unwrap();

    assert_eq!(solution.times.len(), solution.stats.accepted_steps + 1);
    assert!(solution.times.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(solution.times.first(), Some(&0.0));
    assert_eq!(solution.times.last(), Some(&3.0));
}

#[test]
fn invalid_inputs_are_rejected() {
    let config = Config::default();

    assert!(matches!(
        solve_unobserved(&Decay, [1.0, 0.0], &[1.0], &[], &config),
        Err(Error::Span { .. })
    ));
    assert!(matches!(
        solve_unobserved(&Decay, [0.0, f64::INFINITY], &[1.0], &[], &config),
        Err(Error::Span { .. })
    ));
    assert!(matches!(
        solve_unobserved(&Decay, [0.0, 1.0], &[1.0], &[0.5, 2.0], &config),
        Err(Error::EvalTimes)
    ));
    assert!(matches!(
        solve_unobserved(&Decay, [0.0, 1.0], &[1.0], &[0.5, 0.2], &config),
        Err(Error::EvalTimes)
    ));
    assert!(matches!(
        solve_unobserved(&Decay, [0.0, 1.0], &[1.0, 2.0], &[], &config),
        Err(Error::Dimension {
            expected: 1,
            actual: 2
        })
    ));
}

#[test]
fn system_errors_propagate() {
    let result = solve_unobserved(&Failing, [0.0, 10.0], &[1.0], &[], &Config::default());

    let Err(Error::System(source)) = result else {
        panic!("expected a system error");
    };
    assert_eq!(source.to_string(), "state went negative");
}

#[test]
fn step_budget_keeps_partial_output() {
    let config = Config::new(1e-10, 1e-12)
        .unwrap()
        .with_max_steps(3)
        .unwrap();
    let solution = solve_unobserved(&Decay, [0.0, 100.0], &[1.0], &[], &config).unwrap();

    assert_eq!(solution.status, Status::Failed(Failure::MaxSteps));
    assert!(!solution.status.is_success());
    assert!(solution.times.len() <= 4);
    assert_eq!(solution.times[0], 0.0);
    assert!(*solution.times.last().unwrap() < 100.0);
}

#[test]
fn observer_can_stop_early() {
    let mut steps = Vec::new();
    let solution = solve(
        &Decay,
        [0.0, 10.0],
        &[1.0],
        &[],
        &Config::default(),
        |event: &Event<'_>| {
            steps.push(event.step);
            (event.t > 1.0).then_some(Action::StopEarly)
        },
    )
    .unwrap();

    assert_eq!(solution.status, Status::StoppedByObserver);
    assert!(solution.status.is_success());
    let last = *solution.times.last().unwrap();
    assert!(last > 1.0 && last < 10.0);
    assert_eq!(steps[0], 0);
    assert!(steps.windows(2).all(|pair| pair[1] == pair[0] + 1));
}

#[test]
fn events_report_the_formula_in_use() {
    let mut formulas = Vec::new();
    let config = Config::default().with_method(Method::Stiff);
    solve(
        &Decay,
        [0.0, 5.0],
        &[1.0],
        &[5.0],
        &config,
        |event: &Event<'_>| {
            formulas.push(event.formula);
            None
        },
    )
    .unwrap();

    assert!(
        formulas
            .iter()
            .all(|formula| matches!(formula, Formula::Stiff { order } if (1..=5).contains(order)))
    );
}
