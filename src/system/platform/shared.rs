use std::path::Path;

use sysinfo::{Disks, System};

use super::{MemoryStatus, VolumeSpace};

/// `sysinfo`-backed queries shared by the Unix-like probes.
pub struct SysinfoState {
    sys: System,
    disks: Disks,
}

impl Default for SysinfoState {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoState {
    pub fn new() -> Self {
        SysinfoState {
            sys: System::new(),
            disks: Disks::new_with_refreshed_list(),
        }
    }

    pub fn memory(&mut self) -> Option<MemoryStatus> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return None;
        }
        let available = self.sys.available_memory().min(total);
        // No kernel-side load figure exists here, so derive it from the same
        // numbers the used/total fields come from.
        let used = total - available;
        Some(MemoryStatus {
            total,
            available,
            load_percent: used as f64 / total as f64 * 100.0,
        })
    }

    pub fn volume(&mut self, target: &str) -> Option<VolumeSpace> {
        self.disks.refresh(true);
        let target = Path::new(target);
        self.disks
            .iter()
            .find(|disk| disk.mount_point() == target)
            .map(|disk| VolumeSpace {
                total: disk.total_space(),
                free: disk.available_space(),
            })
    }

    pub fn processor_name(&mut self) -> Option<String> {
        self.sys.refresh_cpu_all();
        self.sys
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty())
    }

    pub fn physical_memory_total(&mut self) -> Option<u64> {
        self.sys.refresh_memory();
        Some(self.sys.total_memory()).filter(|&total| total > 0)
    }
}
