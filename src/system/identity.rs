//! Human-readable hardware labels, resolved once per process.

use std::sync::Arc;

use crate::format::{bounded_label, memory_label};

use super::platform::HardwareRegistry;

pub const UNKNOWN_CPU: &str = "Unknown CPU";
pub const UNKNOWN_GPU: &str = "Unknown GPU";
pub const NO_SECOND_GPU: &str = "-";
pub const UNKNOWN_MEMORY: &str = "System Memory";
pub const UNKNOWN_DISK: &str = "Local Disk";
pub const UNKNOWN_NETWORK: &str = "Network Adapter";

/// Display-class slots scanned for graphics adapters.
pub const DISPLAY_SLOTS: usize = 20;
/// Network-class slots scanned for the adapter label.
pub const NETWORK_SLOTS: usize = 25;

/// Driver and marketing boilerplate. A name is cut at the first occurrence
/// of each token, in this order.
const SUFFIX_TOKENS: [&str; 11] = [
    " DCH Driver",
    " Miniport",
    " Virtual Adapter",
    " PCI Express",
    " Gigabit Ethernet Controller",
    " Controller",
    " 6GB",
    " 8GB",
    " 12GB",
    " 16GB",
    " 24GB",
];

const EXCLUDED_ADAPTER_MARKERS: [&str; 5] = ["Virtual", "Miniport", "Pseudo", "Kernel", "Loopback"];
const PHYSICAL_ADAPTER_MARKERS: [&str; 5] = ["Wi-Fi", "Wireless", "Ethernet", "Killer", "Intel"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityStrings {
    pub cpu_name: String,
    pub gpu_name_primary: String,
    pub gpu_name_secondary: String,
    pub ram_label: String,
    pub disk_label: String,
    pub net_label: String,
}

impl IdentityStrings {
    pub fn placeholders() -> Self {
        IdentityStrings {
            cpu_name: UNKNOWN_CPU.to_string(),
            gpu_name_primary: UNKNOWN_GPU.to_string(),
            gpu_name_secondary: NO_SECOND_GPU.to_string(),
            ram_label: UNKNOWN_MEMORY.to_string(),
            disk_label: UNKNOWN_DISK.to_string(),
            net_label: UNKNOWN_NETWORK.to_string(),
        }
    }
}

/// Caches [`IdentityStrings`] after the first successful `resolve`.
#[derive(Debug, Default)]
pub struct IdentityResolver {
    cache: Option<Arc<IdentityStrings>>,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self) -> bool {
        self.cache.is_some()
    }

    /// Look the labels up on first call; afterwards return the cached set
    /// without touching `registry`.
    pub fn resolve<R: HardwareRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
    ) -> Arc<IdentityStrings> {
        if let Some(cached) = &self.cache {
            return Arc::clone(cached);
        }
        let resolved = Arc::new(lookup(registry));
        tracing::debug!(
            cpu = %resolved.cpu_name,
            gpu1 = %resolved.gpu_name_primary,
            gpu2 = %resolved.gpu_name_secondary,
            ram = %resolved.ram_label,
            disk = %resolved.disk_label,
            net = %resolved.net_label,
            "resolved hardware identity"
        );
        self.cache = Some(Arc::clone(&resolved));
        resolved
    }
}

fn lookup<R: HardwareRegistry + ?Sized>(registry: &mut R) -> IdentityStrings {
    let cpu_name = registry
        .processor_name()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_CPU.to_string());

    let gpus = pick_display_adapters(registry.display_adapters(DISPLAY_SLOTS));
    let mut gpus = gpus.into_iter();
    let gpu_name_primary = gpus.next().unwrap_or_else(|| UNKNOWN_GPU.to_string());
    let gpu_name_secondary = gpus.next().unwrap_or_else(|| NO_SECOND_GPU.to_string());

    let ram_label = registry
        .physical_memory_total()
        .map(memory_label)
        .unwrap_or_else(|| UNKNOWN_MEMORY.to_string());

    let disk_label = registry
        .primary_disk_name()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_DISK.to_string());

    let net_label = pick_network_adapter(&registry.network_adapters(NETWORK_SLOTS));

    IdentityStrings {
        cpu_name: bounded_label(&cpu_name),
        gpu_name_primary: bounded_label(&gpu_name_primary),
        gpu_name_secondary: bounded_label(&gpu_name_secondary),
        ram_label: bounded_label(&ram_label),
        disk_label: bounded_label(&disk_label),
        net_label: bounded_label(&net_label),
    }
}

/// Cut `name` at the first occurrence of each boilerplate token and trim
/// trailing whitespace. Tokens in the middle of a name truncate everything
/// after them too.
pub fn clean_name(name: &str) -> String {
    let mut cleaned = name;
    for token in SUFFIX_TOKENS {
        if let Some(at) = cleaned.find(token) {
            cleaned = &cleaned[..at];
        }
    }
    cleaned.trim_end_matches([' ', '\r', '\n']).to_string()
}

/// Up to two distinct cleaned adapter names, first seen first.
pub fn pick_display_adapters(candidates: Vec<String>) -> Vec<String> {
    let mut found: Vec<String> = Vec::with_capacity(2);
    for candidate in candidates {
        let cleaned = clean_name(&candidate);
        if cleaned.is_empty() || found.contains(&cleaned) {
            continue;
        }
        found.push(cleaned);
        if found.len() == 2 {
            break;
        }
    }
    found
}

/// The first physical-looking adapter, else the first one that is not
/// virtual, else the generic placeholder. The winner is cleaned.
pub fn pick_network_adapter(candidates: &[String]) -> String {
    let usable = candidates.iter().filter(|name| {
        !EXCLUDED_ADAPTER_MARKERS
            .iter()
            .any(|marker| name.contains(marker))
    });

    let mut first_usable: Option<&String> = None;
    for name in usable {
        if PHYSICAL_ADAPTER_MARKERS
            .iter()
            .any(|marker| name.contains(marker))
        {
            return clean_name(name);
        }
        if first_usable.is_none() {
            first_usable = Some(name);
        }
    }

    match first_usable {
        Some(name) => clean_name(name),
        None => UNKNOWN_NETWORK.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::platform::FixtureProbe;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cleaning_strips_known_suffix() {
        assert_eq!(
            clean_name("Intel(R) Wi-Fi 6 AX201 160MHz Gigabit Ethernet Controller"),
            "Intel(R) Wi-Fi 6 AX201 160MHz"
        );
        assert_eq!(clean_name("NVIDIA GeForce RTX 3060 12GB"), "NVIDIA GeForce RTX 3060");
        assert_eq!(clean_name("Realtek PCIe GbE Family Controller"), "Realtek PCIe GbE Family");
    }

    #[test]
    fn cleaning_truncates_at_mid_string_tokens() {
        assert_eq!(clean_name("WAN Miniport (IP) extra"), "WAN");
        assert_eq!(clean_name("Foo Controller Bar"), "Foo");
    }

    #[test]
    fn cleaning_trims_trailing_whitespace_only() {
        assert_eq!(clean_name("  AMD Radeon  \r\n"), "  AMD Radeon");
        assert_eq!(clean_name(""), "");
    }

    #[test]
    fn display_adapters_dedupe_after_cleaning() {
        let picked = pick_display_adapters(names(&[
            "NVIDIA GeForce RTX 3060 DCH Driver",
            "NVIDIA GeForce RTX 3060",
            " Controller",
            "Intel(R) UHD Graphics 630",
            "Microsoft Basic Display Adapter",
        ]));
        assert_eq!(picked, names(&["NVIDIA GeForce RTX 3060", "Intel(R) UHD Graphics 630"]));
    }

    #[test]
    fn single_display_adapter() {
        let picked = pick_display_adapters(names(&["AMD Radeon(TM) Graphics"]));
        assert_eq!(picked, names(&["AMD Radeon(TM) Graphics"]));
    }

    #[test]
    fn network_prefers_physical_markers() {
        let picked = pick_network_adapter(&names(&[
            "WAN Miniport (SSTP)",
            "Bluetooth Device (Personal Area Network)",
            "Hyper-V Virtual Ethernet Adapter",
            "Intel(R) Wi-Fi 6 AX201 160MHz",
            "Realtek PCIe GbE Family Controller",
        ]));
        assert_eq!(picked, "Intel(R) Wi-Fi 6 AX201 160MHz");
    }

    #[test]
    fn network_falls_back_to_first_usable() {
        let picked = pick_network_adapter(&names(&[
            "Microsoft Kernel Debug Network Adapter",
            "Bluetooth Device (Personal Area Network)",
            "Some Other NIC",
        ]));
        assert_eq!(picked, "Bluetooth Device (Personal Area Network)");
    }

    #[test]
    fn network_placeholder_when_everything_is_virtual() {
        let picked = pick_network_adapter(&names(&["Loopback lo", "Virtual docker0"]));
        assert_eq!(picked, UNKNOWN_NETWORK);
        assert_eq!(pick_network_adapter(&[]), UNKNOWN_NETWORK);
    }

    #[test]
    fn failed_lookups_degrade_per_field() {
        let mut registry = FixtureProbe::default();
        registry.processor = Some("AMD Ryzen 7 5800X 8-Core Processor   ".to_string());

        let identity = IdentityResolver::new().resolve(&mut registry);
        assert_eq!(identity.cpu_name, "AMD Ryzen 7 5800X 8-Core Processor");
        assert_eq!(identity.gpu_name_primary, UNKNOWN_GPU);
        assert_eq!(identity.gpu_name_secondary, NO_SECOND_GPU);
        assert_eq!(identity.ram_label, UNKNOWN_MEMORY);
        assert_eq!(identity.disk_label, UNKNOWN_DISK);
        assert_eq!(identity.net_label, UNKNOWN_NETWORK);
    }

    #[test]
    fn resolve_runs_lookups_once() {
        let mut registry = FixtureProbe::laptop();
        let mut resolver = IdentityResolver::new();
        assert!(!resolver.is_resolved());

        let first = resolver.resolve(&mut registry);
        let lookups = registry.registry_lookups;
        assert!(lookups > 0);

        registry.processor = Some("Changed CPU".to_string());
        for _ in 0..10 {
            let again = resolver.resolve(&mut registry);
            assert_eq!(*again, *first);
        }
        assert_eq!(registry.registry_lookups, lookups);
        assert!(resolver.is_resolved());
    }

    #[test]
    fn labels_are_bounded() {
        let mut registry = FixtureProbe::default();
        registry.processor = Some("P".repeat(400));
        let identity = IdentityResolver::new().resolve(&mut registry);
        assert_eq!(identity.cpu_name.len(), crate::format::MAX_LABEL_WIDTH);
    }
}
