use std::sync::Arc;

use super::identity::IdentityStrings;
use super::platform::{InterfaceCounters, MemoryStatus, PowerStatus, VolumeSpace};

/// Battery percent reported when the level is unknown or unsupported.
pub const BATTERY_UNKNOWN: u8 = 255;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MemoryUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub usage_percent: f64,
}

impl MemoryUsage {
    /// Zeroed on failure. The OS load figure is kept as-is rather than
    /// recomputed from used/total.
    pub fn from_status(status: Option<MemoryStatus>) -> Self {
        let Some(status) = status else {
            return Self::default();
        };
        let available = status.available.min(status.total);
        MemoryUsage {
            total_bytes: status.total,
            used_bytes: status.total - available,
            usage_percent: sanitize_percent(status.load_percent),
        }
    }
}

/// Cumulative byte counters; consumers diff consecutive records for a rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetworkTotals {
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

impl NetworkTotals {
    /// Sum over interfaces that are up. Down interfaces are left out of the
    /// sum entirely.
    pub fn from_interfaces(interfaces: Option<&[InterfaceCounters]>) -> Self {
        interfaces
            .unwrap_or_default()
            .iter()
            .filter(|iface| iface.up)
            .fold(Self::default(), |acc, iface| NetworkTotals {
                bytes_received: acc.bytes_received.saturating_add(iface.received),
                bytes_sent: acc.bytes_sent.saturating_add(iface.sent),
            })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiskUsage {
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub usage_percent: f64,
}

impl DiskUsage {
    pub fn from_space(space: Option<VolumeSpace>) -> Self {
        let Some(space) = space else {
            return Self::default();
        };
        let free = space.free.min(space.total);
        let usage_percent = if space.total > 0 {
            (space.total - free) as f64 / space.total as f64 * 100.0
        } else {
            0.0
        };
        DiskUsage {
            total_bytes: space.total,
            free_bytes: free,
            usage_percent,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatteryState {
    /// 0–100, or [`BATTERY_UNKNOWN`].
    pub percent: u8,
    /// True on AC power, and whenever the AC state is unknown.
    pub plugged: bool,
    pub present: bool,
}

impl Default for BatteryState {
    fn default() -> Self {
        BatteryState {
            percent: BATTERY_UNKNOWN,
            plugged: true,
            present: false,
        }
    }
}

impl BatteryState {
    pub fn from_power(power: Option<PowerStatus>) -> Self {
        let Some(power) = power else {
            return Self::default();
        };
        BatteryState {
            percent: match power.percent {
                Some(p) if p <= 100 => p,
                _ => BATTERY_UNKNOWN,
            },
            plugged: power.ac_online.unwrap_or(true),
            present: power.battery_present,
        }
    }
}

/// One fully populated metrics record.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub cpu_usage_percent: f64,
    pub memory: MemoryUsage,
    pub network: NetworkTotals,
    pub disk: DiskUsage,
    pub battery: BatteryState,
    pub identity: Arc<IdentityStrings>,
}

fn sanitize_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
