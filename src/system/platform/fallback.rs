use sysinfo::Networks;

use super::shared::SysinfoState;
use super::{
    CpuTimes, HardwareRegistry, InterfaceCounters, MemoryStatus, MetricsProbe, PowerStatus,
    VolumeSpace,
};

/// `sysinfo`-only probe for targets without a dedicated backend.
pub struct NativeProbe {
    shared: SysinfoState,
    networks: Networks,
}

impl Default for NativeProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeProbe {
    pub fn new() -> Self {
        NativeProbe {
            shared: SysinfoState::new(),
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl MetricsProbe for NativeProbe {
    fn cpu_times(&mut self) -> Option<CpuTimes> {
        // sysinfo only exposes derived usage, not cumulative times.
        None
    }

    fn memory(&mut self) -> Option<MemoryStatus> {
        self.shared.memory()
    }

    fn interfaces(&mut self) -> Option<Vec<InterfaceCounters>> {
        self.networks.refresh(true);
        let interfaces = self
            .networks
            .iter()
            .map(|(name, data)| InterfaceCounters {
                name: name.clone(),
                received: data.total_received(),
                sent: data.total_transmitted(),
                // No link state is available here; listed means present.
                up: true,
            })
            .collect();
        Some(interfaces)
    }

    fn volume(&mut self, target: &str) -> Option<VolumeSpace> {
        self.shared.volume(target)
    }

    fn power(&mut self) -> Option<PowerStatus> {
        None
    }
}

impl HardwareRegistry for NativeProbe {
    fn processor_name(&mut self) -> Option<String> {
        self.shared.processor_name()
    }

    fn display_adapters(&mut self, _slots: usize) -> Vec<String> {
        Vec::new()
    }

    fn network_adapters(&mut self, slots: usize) -> Vec<String> {
        let mut names: Vec<String> = self.networks.iter().map(|(name, _)| name.clone()).collect();
        names.sort();
        names.truncate(slots);
        names
    }

    fn primary_disk_name(&mut self) -> Option<String> {
        None
    }

    fn physical_memory_total(&mut self) -> Option<u64> {
        self.shared.physical_memory_total()
    }
}
