/// Cumulative processor time since boot, in platform ticks.
///
/// `kernel` includes `idle`, which is how Windows reports it and what the
/// busy-time derivation expects. The Linux probe folds idle into kernel to
/// match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub idle: u64,
    pub kernel: u64,
    pub user: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemoryStatus {
    pub total: u64,
    pub available: u64,
    /// Memory load as the OS reports it, 0–100.
    pub load_percent: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceCounters {
    pub name: String,
    pub received: u64,
    pub sent: u64,
    pub up: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VolumeSpace {
    pub total: u64,
    pub free: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerStatus {
    /// Charge level; `None` when the OS cannot tell.
    pub percent: Option<u8>,
    /// AC line state; `None` when unknown.
    pub ac_online: Option<bool>,
    pub battery_present: bool,
}

/// Per-tick raw metric reads. Every query is best-effort: `None` means the
/// platform call failed and the caller degrades that metric family only.
pub trait MetricsProbe {
    fn cpu_times(&mut self) -> Option<CpuTimes>;
    fn memory(&mut self) -> Option<MemoryStatus>;
    fn interfaces(&mut self) -> Option<Vec<InterfaceCounters>>;
    fn volume(&mut self, target: &str) -> Option<VolumeSpace>;
    fn power(&mut self) -> Option<PowerStatus>;
}

/// Hardware description lookups backing the identity strings.
///
/// Adapter queries return raw descriptions in slot order, at most `slots`
/// entries; filtering and cleaning happen in the identity resolver.
pub trait HardwareRegistry {
    fn processor_name(&mut self) -> Option<String>;
    fn display_adapters(&mut self, slots: usize) -> Vec<String>;
    fn network_adapters(&mut self, slots: usize) -> Vec<String>;
    fn primary_disk_name(&mut self) -> Option<String>;
    fn physical_memory_total(&mut self) -> Option<u64>;
}

mod fixture;
#[cfg(not(target_os = "windows"))]
mod shared;

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
mod fallback;
#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
use fallback as platform_impl;
#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub use fixture::FixtureProbe;
pub use platform_impl::NativeProbe;

/// Volume sampled for the disk fields when the config does not name one.
#[cfg(target_os = "windows")]
pub const DEFAULT_VOLUME: &str = "C:\\";
#[cfg(not(target_os = "windows"))]
pub const DEFAULT_VOLUME: &str = "/";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_queries_do_not_panic() {
        let mut probe = NativeProbe::new();
        let _ = probe.cpu_times();
        let _ = probe.memory();
        let _ = probe.interfaces();
        let _ = probe.volume(DEFAULT_VOLUME);
        let _ = probe.power();
        let _ = probe.processor_name();
        let _ = probe.display_adapters(4);
        let _ = probe.network_adapters(4);
        let _ = probe.primary_disk_name();
        let _ = probe.physical_memory_total();
    }

    #[test]
    fn native_memory_is_consistent_when_reported() {
        let mut probe = NativeProbe::new();
        if let Some(memory) = probe.memory() {
            assert!(memory.available <= memory.total);
            assert!((0.0..=100.0).contains(&memory.load_percent));
        }
    }
}
