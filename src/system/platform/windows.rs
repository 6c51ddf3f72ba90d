use std::mem::{size_of, zeroed};
use std::ptr::{null, null_mut};

use windows_sys::Win32::Foundation::{ERROR_SUCCESS, FILETIME};
use windows_sys::Win32::NetworkManagement::IpHelper::{
    GetIfTable, IF_OPER_STATUS_OPERATIONAL, MIB_IFROW, MIB_IFTABLE,
};
use windows_sys::Win32::Storage::FileSystem::GetDiskFreeSpaceExW;
use windows_sys::Win32::System::Power::{GetSystemPowerStatus, SYSTEM_POWER_STATUS};
use windows_sys::Win32::System::Registry::{
    HKEY, HKEY_LOCAL_MACHINE, KEY_READ, RegCloseKey, RegOpenKeyExW, RegQueryValueExW,
};
use windows_sys::Win32::System::SystemInformation::{GlobalMemoryStatusEx, MEMORYSTATUSEX};
use windows_sys::Win32::System::Threading::GetSystemTimes;

use super::{
    CpuTimes, HardwareRegistry, InterfaceCounters, MemoryStatus, MetricsProbe, PowerStatus,
    VolumeSpace,
};

const PROCESSOR_KEY: &str = r"HARDWARE\DESCRIPTION\System\CentralProcessor\0";
const DISPLAY_CLASS_KEY: &str =
    r"SYSTEM\CurrentControlSet\Control\Class\{4d36e968-e325-11ce-bfc1-08002be10318}";
const NET_CLASS_KEY: &str =
    r"SYSTEM\CurrentControlSet\Control\Class\{4d36e972-e325-11ce-bfc1-08002be10318}";
const DISK_ENUM_KEY: &str = r"SYSTEM\CurrentControlSet\Services\disk\Enum";
const DEVICE_ENUM_KEY: &str = r"SYSTEM\CurrentControlSet\Enum";

/// `SYSTEM_POWER_STATUS::BatteryFlag` value for "no system battery".
const BATTERY_FLAG_NO_BATTERY: u8 = 128;
/// `SYSTEM_POWER_STATUS` sentinel for unknown percent or AC state.
const POWER_UNKNOWN: u8 = 255;

/// Registry strings longer than this are cut; identity strings are bounded
/// well below it anyway.
const REGISTRY_VALUE_CHARS: usize = 512;

#[derive(Default)]
pub struct NativeProbe;

impl NativeProbe {
    pub fn new() -> Self {
        NativeProbe
    }
}

fn filetime_ticks(time: &FILETIME) -> u64 {
    (u64::from(time.dwHighDateTime) << 32) | u64::from(time.dwLowDateTime)
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn read_registry_string(subkey: &str, value: &str) -> Option<String> {
    let subkey = wide(subkey);
    let value = wide(value);
    let mut key: HKEY = null_mut();
    let mut buffer = [0u16; REGISTRY_VALUE_CHARS];
    let mut size = (buffer.len() * size_of::<u16>()) as u32;

    let status = unsafe {
        if RegOpenKeyExW(HKEY_LOCAL_MACHINE, subkey.as_ptr(), 0, KEY_READ, &mut key)
            != ERROR_SUCCESS
        {
            return None;
        }
        let status = RegQueryValueExW(
            key,
            value.as_ptr(),
            null(),
            null_mut(),
            buffer.as_mut_ptr().cast(),
            &mut size,
        );
        RegCloseKey(key);
        status
    };
    if status != ERROR_SUCCESS {
        return None;
    }

    let len = (size as usize / size_of::<u16>()).min(buffer.len());
    let text = String::from_utf16_lossy(&buffer[..len]);
    let text = text.trim_end_matches('\0').trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// `DriverDesc` of each numbered slot under a device class key.
fn class_driver_descriptions(class_key: &str, slots: usize) -> Vec<String> {
    (0..slots)
        .filter_map(|slot| read_registry_string(&format!(r"{class_key}\{slot:04}"), "DriverDesc"))
        .collect()
}

impl MetricsProbe for NativeProbe {
    fn cpu_times(&mut self) -> Option<CpuTimes> {
        let mut idle: FILETIME = unsafe { zeroed() };
        let mut kernel: FILETIME = unsafe { zeroed() };
        let mut user: FILETIME = unsafe { zeroed() };
        let ok = unsafe { GetSystemTimes(&mut idle, &mut kernel, &mut user) };
        if ok == 0 {
            return None;
        }
        Some(CpuTimes {
            idle: filetime_ticks(&idle),
            kernel: filetime_ticks(&kernel),
            user: filetime_ticks(&user),
        })
    }

    fn memory(&mut self) -> Option<MemoryStatus> {
        let mut status: MEMORYSTATUSEX = unsafe { zeroed() };
        status.dwLength = size_of::<MEMORYSTATUSEX>() as u32;
        if unsafe { GlobalMemoryStatusEx(&mut status) } == 0 {
            return None;
        }
        Some(MemoryStatus {
            total: status.ullTotalPhys,
            available: status.ullAvailPhys.min(status.ullTotalPhys),
            load_percent: f64::from(status.dwMemoryLoad),
        })
    }

    fn interfaces(&mut self) -> Option<Vec<InterfaceCounters>> {
        let mut size: u32 = 0;
        unsafe { GetIfTable(null_mut(), &mut size, 0) };
        if size == 0 {
            return None;
        }

        // u64 words keep the table suitably aligned.
        let mut buffer = vec![0u64; (size as usize).div_ceil(size_of::<u64>())];
        let table = buffer.as_mut_ptr().cast::<MIB_IFTABLE>();
        if unsafe { GetIfTable(table, &mut size, 0) } != 0 {
            return None;
        }

        let rows: &[MIB_IFROW] = unsafe {
            let count = (*table).dwNumEntries as usize;
            std::slice::from_raw_parts((*table).table.as_ptr(), count)
        };
        let interfaces = rows
            .iter()
            .map(|row| InterfaceCounters {
                name: String::from_utf16_lossy(&row.wszName)
                    .trim_end_matches('\0')
                    .to_string(),
                received: u64::from(row.dwInOctets),
                sent: u64::from(row.dwOutOctets),
                up: row.dwOperStatus == IF_OPER_STATUS_OPERATIONAL,
            })
            .collect();
        Some(interfaces)
    }

    fn volume(&mut self, target: &str) -> Option<VolumeSpace> {
        let path = wide(target);
        let mut available_to_caller: u64 = 0;
        let mut total: u64 = 0;
        let mut free: u64 = 0;
        let ok = unsafe {
            GetDiskFreeSpaceExW(path.as_ptr(), &mut available_to_caller, &mut total, &mut free)
        };
        if ok == 0 {
            return None;
        }
        Some(VolumeSpace { total, free })
    }

    fn power(&mut self) -> Option<PowerStatus> {
        let mut status: SYSTEM_POWER_STATUS = unsafe { zeroed() };
        if unsafe { GetSystemPowerStatus(&mut status) } == 0 {
            return None;
        }
        Some(PowerStatus {
            percent: (status.BatteryLifePercent != POWER_UNKNOWN)
                .then_some(status.BatteryLifePercent),
            ac_online: match status.ACLineStatus {
                0 => Some(false),
                1 => Some(true),
                _ => None,
            },
            battery_present: status.BatteryFlag != BATTERY_FLAG_NO_BATTERY,
        })
    }
}

impl HardwareRegistry for NativeProbe {
    fn processor_name(&mut self) -> Option<String> {
        read_registry_string(PROCESSOR_KEY, "ProcessorNameString")
    }

    fn display_adapters(&mut self, slots: usize) -> Vec<String> {
        class_driver_descriptions(DISPLAY_CLASS_KEY, slots)
    }

    fn network_adapters(&mut self, slots: usize) -> Vec<String> {
        class_driver_descriptions(NET_CLASS_KEY, slots)
    }

    fn primary_disk_name(&mut self) -> Option<String> {
        let device_id = read_registry_string(DISK_ENUM_KEY, "0")?;
        read_registry_string(&format!(r"{DEVICE_ENUM_KEY}\{device_id}"), "FriendlyName")
    }

    fn physical_memory_total(&mut self) -> Option<u64> {
        self.memory().map(|status| status.total)
    }
}
