use std::fs;
use std::path::{Path, PathBuf};

use super::shared::SysinfoState;
use super::{
    CpuTimes, HardwareRegistry, InterfaceCounters, MemoryStatus, MetricsProbe, PowerStatus,
    VolumeSpace,
};

const PROC_STAT: &str = "/proc/stat";
const NET_ROOT: &str = "/sys/class/net";
const POWER_ROOT: &str = "/sys/class/power_supply";
const DRM_ROOT: &str = "/sys/class/drm";
const BLOCK_ROOT: &str = "/sys/block";

/// Block devices that never back a physical disk.
const VIRTUAL_BLOCK_PREFIXES: [&str; 7] = ["loop", "ram", "zram", "dm-", "sr", "md", "nbd"];

/// `ARPHRD_LOOPBACK` as exposed in `/sys/class/net/<if>/type`.
const ARPHRD_LOOPBACK: &str = "772";

pub struct NativeProbe {
    shared: SysinfoState,
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
        }
    }
}

impl MetricsProbe for NativeProbe {
    fn cpu_times(&mut self) -> Option<CpuTimes> {
        let contents = fs::read_to_string(PROC_STAT).ok()?;
        parse_proc_stat(&contents)
    }

    fn memory(&mut self) -> Option<MemoryStatus> {
        self.shared.memory()
    }

    fn interfaces(&mut self) -> Option<Vec<InterfaceCounters>> {
        read_interfaces(Path::new(NET_ROOT))
    }

    fn volume(&mut self, target: &str) -> Option<VolumeSpace> {
        self.shared.volume(target)
    }

    fn power(&mut self) -> Option<PowerStatus> {
        read_power_supply(Path::new(POWER_ROOT))
    }
}

impl HardwareRegistry for NativeProbe {
    fn processor_name(&mut self) -> Option<String> {
        self.shared.processor_name()
    }

    fn display_adapters(&mut self, slots: usize) -> Vec<String> {
        read_display_adapters(Path::new(DRM_ROOT), slots)
    }

    fn network_adapters(&mut self, slots: usize) -> Vec<String> {
        read_network_adapters(Path::new(NET_ROOT), slots)
    }

    fn primary_disk_name(&mut self) -> Option<String> {
        read_primary_disk(Path::new(BLOCK_ROOT))
    }

    fn physical_memory_total(&mut self) -> Option<u64> {
        self.shared.physical_memory_total()
    }
}

/// Parse the aggregate `cpu` line of `/proc/stat`.
///
/// Fields after the label: user nice system idle iowait irq softirq steal.
/// Guest time is already counted inside user/nice, so it is skipped.
fn parse_proc_stat(contents: &str) -> Option<CpuTimes> {
    let line = contents.lines().find(|line| {
        line.strip_prefix("cpu")
            .is_some_and(|rest| rest.starts_with(char::is_whitespace))
    })?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|field| field.parse().ok())
        .collect::<Option<_>>()?;
    if fields.len() < 4 {
        return None;
    }
    let field = |i: usize| fields.get(i).copied().unwrap_or(0);

    let idle = field(3) + field(4);
    let user = field(0) + field(1);
    let kernel = field(2) + field(5) + field(6) + field(7) + idle;
    Some(CpuTimes { idle, kernel, user })
}

fn read_trimmed(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn read_u64(path: &Path) -> Option<u64> {
    read_trimmed(path)?.parse().ok()
}

fn uevent_value<'a>(contents: &'a str, key: &str) -> Option<&'a str> {
    contents.lines().find_map(|line| {
        line.strip_prefix(key)
            .and_then(|rest| rest.strip_prefix('='))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    })
}

fn read_driver(device_dir: &Path) -> Option<String> {
    let contents = fs::read_to_string(device_dir.join("uevent")).ok()?;
    uevent_value(&contents, "DRIVER").map(str::to_string)
}

fn sorted_entries(root: &Path) -> Option<Vec<(String, PathBuf)>> {
    let mut entries: Vec<(String, PathBuf)> = fs::read_dir(root)
        .ok()?
        .flatten()
        .map(|entry| (entry.file_name().to_string_lossy().into_owned(), entry.path()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Some(entries)
}

fn read_interfaces(root: &Path) -> Option<Vec<InterfaceCounters>> {
    let entries = sorted_entries(root)?;
    let interfaces = entries
        .into_iter()
        .map(|(name, dir)| {
            let up = read_trimmed(&dir.join("operstate")).as_deref() == Some("up");
            InterfaceCounters {
                received: read_u64(&dir.join("statistics/rx_bytes")).unwrap_or(0),
                sent: read_u64(&dir.join("statistics/tx_bytes")).unwrap_or(0),
                up,
                name,
            }
        })
        .collect();
    Some(interfaces)
}

fn read_power_supply(root: &Path) -> Option<PowerStatus> {
    let entries = sorted_entries(root)?;

    let mut status = PowerStatus {
        percent: None,
        ac_online: None,
        battery_present: false,
    };
    let mut mains_online: Option<bool> = None;
    let mut charging_hint: Option<bool> = None;

    for (_, dir) in entries {
        match read_trimmed(&dir.join("type")).as_deref() {
            Some("Mains") => {
                if let Some(online) = read_trimmed(&dir.join("online")) {
                    mains_online = Some(mains_online.unwrap_or(false) || online == "1");
                }
            }
            Some("Battery") => {
                if status.battery_present
                    || read_trimmed(&dir.join("present")).as_deref() == Some("0")
                {
                    continue;
                }
                status.battery_present = true;
                status.percent = read_u64(&dir.join("capacity")).map(|v| v.min(100) as u8);
                charging_hint = match read_trimmed(&dir.join("status")).as_deref() {
                    Some("Discharging") => Some(false),
                    Some("Charging") | Some("Full") | Some("Not charging") => Some(true),
                    _ => None,
                };
            }
            _ => {}
        }
    }

    status.ac_online = mains_online.or(charging_hint);
    Some(status)
}

fn pci_vendor_name(vendor_id: &str) -> Option<&'static str> {
    match vendor_id {
        "0x8086" => Some("Intel"),
        "0x10de" => Some("NVIDIA"),
        "0x1002" => Some("AMD"),
        "0x1af4" => Some("Virtio"),
        "0x15ad" => Some("VMware"),
        _ => None,
    }
}

fn read_display_adapters(root: &Path, slots: usize) -> Vec<String> {
    (0..slots)
        .filter_map(|slot| {
            let device = root.join(format!("card{slot}")).join("device");
            let driver = read_driver(&device)?;
            let vendor = read_trimmed(&device.join("vendor"));
            Some(match vendor.as_deref().and_then(pci_vendor_name) {
                Some(vendor) => format!("{vendor} {driver}"),
                None => driver,
            })
        })
        .collect()
}

fn describe_interface(name: &str, dir: &Path) -> String {
    if read_trimmed(&dir.join("type")).as_deref() == Some(ARPHRD_LOOPBACK) {
        return format!("Loopback {name}");
    }
    let device = dir.join("device");
    if !device.exists() {
        return format!("Virtual {name}");
    }
    let driver = read_driver(&device).unwrap_or_else(|| name.to_string());
    if dir.join("wireless").exists() || dir.join("phy80211").exists() {
        format!("Wireless {driver}")
    } else {
        format!("Ethernet {driver}")
    }
}

fn read_network_adapters(root: &Path, slots: usize) -> Vec<String> {
    sorted_entries(root)
        .unwrap_or_default()
        .into_iter()
        .take(slots)
        .map(|(name, dir)| describe_interface(&name, &dir))
        .collect()
}

fn read_primary_disk(root: &Path) -> Option<String> {
    sorted_entries(root)?
        .into_iter()
        .filter(|(name, _)| {
            !VIRTUAL_BLOCK_PREFIXES
                .iter()
                .any(|prefix| name.starts_with(prefix))
        })
        .find_map(|(_, dir)| read_trimmed(&dir.join("device/model")))
}
