use log::{debug, info, trace, warn};
use nalgebra::DVector;
use thermnet_core::{Observer, OdeSystem};

use super::{
    Action, Config, Error, Event, Failure, Formula, Method, Solution, Stats, Status,
    bdf::{Attempt, Bdf},
    dense::{Output, Segment},
    dopri,
    norm::rms,
    rhs::Rhs,
    stiffness::{NonStiffnessDetector, StiffnessDetector},
};

/// Runs the switching solver. See [`solve`](super::solve).
#[allow(clippy::too_many_lines)]
pub(super) fn integrate<S, Obs>(
    system: &S,
    span: [f64; 2],
    initial: &[f64],
    t_eval: &[f64],
    config: &Config,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    S: OdeSystem,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    validate(system, span, initial, t_eval)?;
    let [t_start, t_end] = span;

    let mut rhs = Rhs::new(system);
    let mut stats = Stats::default();
    let mut output = Output::new(t_eval);

    let mut t = t_start;
    let mut y = DVector::from_column_slice(initial);
    let mut f = rhs.eval(t, &y)?;
    output.start(t, &y);

    let auto = config.method() == Method::Auto;
    let mut stiff = config.method() == Method::Stiff;
    let mut bdf = Bdf::new(config.max_order());
    if stiff {
        bdf.restart(t, &y);
    }

    let status = 'run: {
        let event = Event {
            step: 0,
            t,
            y: y.as_slice(),
            h: 0.0,
            formula: if stiff {
                Formula::Stiff { order: 1 }
            } else {
                Formula::NonStiff
            },
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            break 'run Status::StoppedByObserver;
        }

        if t >= t_end {
            break 'run Status::Complete;
        }

        let mut h = match config.initial_step() {
            Some(h) => h,
            None => {
                let order = if stiff { 1 } else { dopri::ORDER };
                initial_step(&mut rhs, t, &y, &f, t_end, order, config)?
            }
        };
        let max_step = config.max_step().unwrap_or(f64::INFINITY);

        let mut stiffness = StiffnessDetector::default();
        let mut non_stiffness = NonStiffnessDetector::default();
        let mut rejected_last = false;
        let mut attempts = 0;
        let mut step = 0;

        while t < t_end {
            if attempts == config.max_steps() {
                break 'run Status::Failed(Failure::MaxSteps);
            }
            attempts += 1;

            h = h.min(max_step);
            if h < 10.0 * f64::EPSILON * t.abs().max(t_end.abs()) {
                break 'run Status::Failed(Failure::StepSizeTooSmall);
            }

            // Stretch the step to land on `t_end` rather than leave a sliver.
            let t_new = if t + 1.01 * h >= t_end { t_end } else { t + h };
            let h_step = t_new - t;

            let (formula, y_new, f_new, h_next, h_lambda) = if stiff {
                let order = bdf.order();
                match bdf.attempt(&mut rhs, &f, t_new, config, &mut stats)? {
                    Attempt::Accepted { y, f, h_next } => {
                        (Formula::Stiff { order }, y, f, h_next, None)
                    }
                    Attempt::Rejected { h_next } => {
                        stats.rejected_steps += 1;
                        trace!("BDF step rejected at t = {t}, h = {h_step}");
                        h = h_next;
                        continue;
                    }
                }
            } else {
                let trial = dopri::step(&mut rhs, t, &y, &f, h_step, config)?;
                if !(trial.error <= 1.0) {
                    stats.rejected_steps += 1;
                    trace!(
                        "explicit step rejected at t = {t}, h = {h_step}, error = {}",
                        trial.error
                    );
                    h = h_step * dopri::step_factor(trial.error, true);
                    rejected_last = true;
                    continue;
                }
                let h_next = h_step * dopri::step_factor(trial.error, rejected_last);
                rejected_last = false;
                (
                    Formula::NonStiff,
                    trial.y,
                    trial.f,
                    h_next,
                    Some(trial.h_lambda),
                )
            };

            output.step(&Segment {
                t0: t,
                y0: &y,
                f0: &f,
                t1: t_new,
                y1: &y_new,
                f1: &f_new,
            });
            stats.accepted_steps += 1;
            step += 1;

            t = t_new;
            y = y_new;
            f = f_new;
            h = h_next;

            if auto {
                if let Some(h_lambda) = h_lambda {
                    if stiffness.observe(h_lambda) {
                        info!("switching to BDF at t = {t}: problem looks stiff");
                        stiff = true;
                        bdf.restart(t, &y);
                        stats.method_switches += 1;
                    }
                } else if let Some(norm) = bdf.jacobian_norm() {
                    if non_stiffness.observe(h_step * norm) {
                        info!("switching to Dormand-Prince at t = {t}: problem looks non-stiff");
                        stiff = false;
                        rejected_last = false;
                        stats.method_switches += 1;
                    }
                }
            }

            let event = Event {
                step,
                t,
                y: y.as_slice(),
                h: h_step,
                formula,
            };
            if let Some(Action::StopEarly) = observer.observe(&event) {
                break 'run Status::StoppedByObserver;
            }
        }

        Status::Complete
    };

    stats.rhs_evaluations = rhs.evaluations();

    if status.is_success() {
        debug!(
            "switching solver finished at t = {t}: {status} ({} accepted, {} rejected steps)",
            stats.accepted_steps, stats.rejected_steps
        );
    } else {
        warn!("switching solver stopped at t = {t} of {t_end}: {status}");
    }

    Ok(Solution {
        status,
        times: output.times,
        states: output.states,
        stats,
    })
}

fn validate<S: OdeSystem>(
    system: &S,
    [start, end]: [f64; 2],
    initial: &[f64],
    t_eval: &[f64],
) -> Result<(), Error> {
    if !start.is_finite() || !end.is_finite() || start > end {
        return Err(Error::Span { start, end });
    }

    let expected = system.dimension();
    if initial.len() != expected {
        return Err(Error::Dimension {
            expected,
            actual: initial.len(),
        });
    }

    let inside = t_eval
        .iter()
        .all(|t| t.is_finite() && (start..=end).contains(t));
    let ordered = t_eval.windows(2).all(|pair| pair[0] <= pair[1]);
    if !(inside && ordered) {
        return Err(Error::EvalTimes);
    }

    Ok(())
}

/// Chooses a first step from the scale of `y` and `f`.
///
/// Follows Hairer, Nørsett & Wanner, *Solving ODEs I*, section II.4.
#[allow(clippy::cast_precision_loss)]
fn initial_step<S: OdeSystem>(
    rhs: &mut Rhs<'_, S>,
    t: f64,
    y: &DVector<f64>,
    f: &DVector<f64>,
    t_end: f64,
    order: usize,
    config: &Config,
) -> Result<f64, Error> {
    let span = t_end - t;
    let weights = y.map(|y| config.atol() + config.rtol() * y.abs());

    let d0 = rms(y, &weights);
    let d1 = rms(f, &weights);
    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    }
    .min(span);

    let y1 = y + f * h0;
    let f1 = rhs.eval(t + h0, &y1)?;
    let d2 = rms(&(f1 - f), &weights) / h0;

    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d1.max(d2)).powf(1.0 / (order + 1) as f64)
    };

    Ok((100.0 * h0).min(h1).min(span))
}
