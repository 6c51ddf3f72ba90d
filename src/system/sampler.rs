use super::counters::CounterStore;
use super::identity::IdentityResolver;
use super::platform::{HardwareRegistry, MetricsProbe};
use super::snapshot::{BatteryState, DiskUsage, MemoryUsage, NetworkTotals, Snapshot};

/// Turns raw platform reads into [`Snapshot`]s, one per tick.
///
/// Owns the CPU counter baseline and the identity cache, so both survive
/// across client sessions for as long as the sampler lives.
pub struct Sampler<P> {
    probe: P,
    volume: String,
    counters: CounterStore,
    identity: IdentityResolver,
}

impl<P: MetricsProbe + HardwareRegistry> Sampler<P> {
    pub fn new(probe: P, volume: impl Into<String>) -> Self {
        Sampler {
            probe,
            volume: volume.into(),
            counters: CounterStore::new(),
            identity: IdentityResolver::new(),
        }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn volume(&self) -> &str {
        &self.volume
    }

    /// Capture the CPU baseline now so the first sample measures a real
    /// interval. Calling it again has no effect.
    pub fn warm_up(&mut self) {
        if self.counters.is_initialized() {
            return;
        }
        match self.probe.cpu_times() {
            Some(now) => self.counters.initialize(now),
            None => tracing::debug!("cpu time query failed during warm-up"),
        }
    }

    /// Take one reading. Call at most once per tick.
    pub fn sample(&mut self) -> Snapshot {
        self.warm_up();
        let identity = self.identity.resolve(&mut self.probe);

        let cpu_usage_percent = match self.probe.cpu_times() {
            Some(now) => self.counters.compute_and_advance(now),
            None => {
                tracing::debug!("cpu time query failed");
                0.0
            }
        };

        let memory = self.probe.memory();
        if memory.is_none() {
            tracing::debug!("memory status query failed");
        }
        let interfaces = self.probe.interfaces();
        if interfaces.is_none() {
            tracing::debug!("network interface query failed");
        }
        let volume = self.probe.volume(&self.volume);
        if volume.is_none() {
            tracing::debug!(volume = %self.volume, "volume space query failed");
        }
        let power = self.probe.power();

        Snapshot {
            cpu_usage_percent,
            memory: MemoryUsage::from_status(memory),
            network: NetworkTotals::from_interfaces(interfaces.as_deref()),
            disk: DiskUsage::from_space(volume),
            battery: BatteryState::from_power(power),
            identity,
        }
    }
}
