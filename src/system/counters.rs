use super::platform::CpuTimes;

/// Previous tick's cumulative CPU times, used to turn the next reading
/// into a utilisation percentage.
///
/// `compute_and_advance` must run at most once per tick: a second call in
/// the same tick shrinks the next delta to whatever elapsed in between.
#[derive(Debug, Default)]
pub struct CounterStore {
    baseline: Option<CpuTimes>,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.baseline.is_some()
    }

    /// Capture the first baseline. Later calls are ignored.
    pub fn initialize(&mut self, now: CpuTimes) {
        if self.baseline.is_none() {
            self.baseline = Some(now);
        }
    }

    /// Percentage of busy time since the stored baseline, then replace the
    /// baseline with `now`. An uninitialized store just records `now` and
    /// reports 0.0.
    pub fn compute_and_advance(&mut self, now: CpuTimes) -> f64 {
        let percent = self
            .baseline
            .map(|prev| busy_percent(prev, now))
            .unwrap_or(0.0);
        self.baseline = Some(now);
        percent
    }
}

/// `(Δkernel + Δuser − Δidle) / (Δkernel + Δuser) × 100`, clamped to
/// [0, 100]; exactly 0.0 when no time elapsed. Kernel time includes idle.
pub fn busy_percent(prev: CpuTimes, now: CpuTimes) -> f64 {
    let idle = now.idle.saturating_sub(prev.idle);
    let kernel = now.kernel.saturating_sub(prev.kernel);
    let user = now.user.saturating_sub(prev.user);

    let total = kernel.saturating_add(user);
    if total == 0 {
        return 0.0;
    }
    let busy = total.saturating_sub(idle);
    (busy as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}
