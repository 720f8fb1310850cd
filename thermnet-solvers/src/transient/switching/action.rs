/// Control actions supported by the switching solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the solver early and return the output so far.
    StopEarly,
}
