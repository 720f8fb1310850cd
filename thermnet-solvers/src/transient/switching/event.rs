/// The integration formula the solver is currently using.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formula {
    /// Dormand–Prince 5(4).
    NonStiff,

    /// Backward differentiation formula of the given order.
    Stiff { order: usize },
}

/// Event emitted by the switching solver.
///
/// Step 0 is the initial state before any integration.
/// Steps 1..N are emitted after each accepted step.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// The accepted step count (0 for the initial state).
    pub step: usize,

    /// Time reached by the step.
    pub t: f64,

    /// State at `t`.
    pub y: &'a [f64],

    /// Size of the step that reached `t`, or zero for the initial state.
    pub h: f64,

    /// Formula that produced the step.
    pub formula: Formula,
}
