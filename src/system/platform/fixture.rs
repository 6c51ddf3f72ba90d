use std::collections::VecDeque;

use super::{
    CpuTimes, HardwareRegistry, InterfaceCounters, MemoryStatus, MetricsProbe, PowerStatus,
    VolumeSpace,
};

/// Scripted in-memory probe for tests and benchmarks.
///
/// CPU readings are consumed from a queue; once it runs dry the last reading
/// repeats, which models a stalled clock. Every other query returns the
/// configured field as-is. Registry lookups are counted so callers can
/// check how often identity resolution actually hit the platform.
#[derive(Clone, Debug, Default)]
pub struct FixtureProbe {
    pub cpu: VecDeque<CpuTimes>,
    pub memory: Option<MemoryStatus>,
    pub interfaces: Option<Vec<InterfaceCounters>>,
    pub volumes: Vec<(String, VolumeSpace)>,
    pub power: Option<PowerStatus>,
    pub processor: Option<String>,
    pub display_adapters: Vec<String>,
    pub network_adapters: Vec<String>,
    pub disk: Option<String>,
    pub memory_total: Option<u64>,
    pub registry_lookups: usize,
    last_cpu: Option<CpuTimes>,
}

impl FixtureProbe {
    /// A plausible healthy laptop: everything succeeds.
    pub fn laptop() -> Self {
        FixtureProbe {
            memory: Some(MemoryStatus {
                total: 16 * 1024 * 1024 * 1024,
                available: 6 * 1024 * 1024 * 1024,
                load_percent: 62.0,
            }),
            interfaces: Some(vec![
                InterfaceCounters {
                    name: "wlan0".to_string(),
                    received: 5_000_000,
                    sent: 750_000,
                    up: true,
                },
                InterfaceCounters {
                    name: "eth0".to_string(),
                    received: 1_000,
                    sent: 1_000,
                    up: false,
                },
            ]),
            volumes: vec![(
                "/".to_string(),
                VolumeSpace {
                    total: 512_000_000_000,
                    free: 128_000_000_000,
                },
            )],
            power: Some(PowerStatus {
                percent: Some(80),
                ac_online: Some(false),
                battery_present: true,
            }),
            processor: Some("Intel(R) Core(TM) i7-1165G7 @ 2.80GHz".to_string()),
            display_adapters: vec!["Intel(R) Iris(R) Xe Graphics".to_string()],
            network_adapters: vec!["Intel(R) Wi-Fi 6 AX201 160MHz".to_string()],
            disk: Some("Samsung SSD 980 PRO 1TB".to_string()),
            memory_total: Some(16 * 1024 * 1024 * 1024),
            ..FixtureProbe::default()
        }
    }

    pub fn with_cpu(mut self, readings: impl IntoIterator<Item = CpuTimes>) -> Self {
        self.cpu.extend(readings);
        self
    }
}

impl MetricsProbe for FixtureProbe {
    fn cpu_times(&mut self) -> Option<CpuTimes> {
        if let Some(next) = self.cpu.pop_front() {
            self.last_cpu = Some(next);
        }
        self.last_cpu
    }

    fn memory(&mut self) -> Option<MemoryStatus> {
        self.memory
    }

    fn interfaces(&mut self) -> Option<Vec<InterfaceCounters>> {
        self.interfaces.clone()
    }

    fn volume(&mut self, target: &str) -> Option<VolumeSpace> {
        self.volumes
            .iter()
            .find(|(name, _)| name == target)
            .map(|(_, space)| *space)
    }

    fn power(&mut self) -> Option<PowerStatus> {
        self.power
    }
}

impl HardwareRegistry for FixtureProbe {
    fn processor_name(&mut self) -> Option<String> {
        self.registry_lookups += 1;
        self.processor.clone()
    }

    fn display_adapters(&mut self, slots: usize) -> Vec<String> {
        self.registry_lookups += 1;
        self.display_adapters.iter().take(slots).cloned().collect()
    }

    fn network_adapters(&mut self, slots: usize) -> Vec<String> {
        self.registry_lookups += 1;
        self.network_adapters.iter().take(slots).cloned().collect()
    }

    fn primary_disk_name(&mut self) -> Option<String> {
        self.registry_lookups += 1;
        self.disk.clone()
    }

    fn physical_memory_total(&mut self) -> Option<u64> {
        self.registry_lookups += 1;
        self.memory_total
    }
}
