use nalgebra::DVector;

/// One accepted step, with enough information for cubic Hermite output.
pub(super) struct Segment<'a> {
    pub t0: f64,
    pub y0: &'a DVector<f64>,
    pub f0: &'a DVector<f64>,
    pub t1: f64,
    pub y1: &'a DVector<f64>,
    pub f1: &'a DVector<f64>,
}

impl Segment<'_> {
    /// Returns the state at `t` in `[t0, t1]`.
    ///
    /// The endpoints are returned exactly.
    #[allow(clippy::float_cmp)]
    pub(super) fn state_at(&self, t: f64) -> DVector<f64> {
        if t == self.t1 {
            return self.y1.clone();
        }
        if t == self.t0 {
            return self.y0.clone();
        }

        let h = self.t1 - self.t0;
        let s = (t - self.t0) / h;
        let s2 = s * s;
        let s3 = s2 * s;

        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        self.y0 * h00 + self.f0 * (h * h10) + self.y1 * h01 + self.f1 * (h * h11)
    }
}

/// Collects solver output at the requested evaluation times.
///
/// With no evaluation times, every accepted step is recorded.
pub(super) struct Output<'a> {
    t_eval: &'a [f64],
    next: usize,
    pub(super) times: Vec<f64>,
    pub(super) states: Vec<DVector<f64>>,
}

impl<'a> Output<'a> {
    pub(super) fn new(t_eval: &'a [f64]) -> Self {
        Self {
            t_eval,
            next: 0,
            times: Vec::with_capacity(t_eval.len()),
            states: Vec::with_capacity(t_eval.len()),
        }
    }

    /// Records the initial state.
    pub(super) fn start(&mut self, t: f64, y: &DVector<f64>) {
        if self.t_eval.is_empty() {
            self.push(t, y.clone());
            return;
        }
        while let Some(&te) = self.t_eval.get(self.next) {
            if te > t {
                break;
            }
            self.push(te, y.clone());
            self.next += 1;
        }
    }

    /// Records output for an accepted step.
    pub(super) fn step(&mut self, segment: &Segment<'_>) {
        if self.t_eval.is_empty() {
            self.push(segment.t1, segment.y1.clone());
            return;
        }
        while let Some(&te) = self.t_eval.get(self.next) {
            if te > segment.t1 {
                break;
            }
            self.push(te, segment.state_at(te));
            self.next += 1;
        }
    }

    fn push(&mut self, t: f64, y: DVector<f64>) {
        self.times.push(t);
        self.states.push(y);
    }
}
