/// Receives events from a solver and optionally returns a control action.
///
/// Solvers emit an event after each accepted step. Returning `Some(action)`
/// lets the caller steer the run (for example, stopping it early); returning
/// `None` lets it continue.
///
/// Implemented for `()` (observe nothing) and for any `FnMut(&E) -> Option<A>`
/// closure, so callers rarely need a dedicated type.
pub trait Observer<E, A> {
    /// Observes an event and optionally returns an action.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}
