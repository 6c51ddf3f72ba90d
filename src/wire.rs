//! Line-delimited JSON encoding of [`Snapshot`]s.
//!
//! One object per tick, terminated by `\n`. Key order is fixed by the
//! field order below. `net_recv`/`net_sent` are cumulative; consumers diff
//! consecutive records to get a rate.

use std::io::{self, Write};

use serde::Serialize;

use crate::format::round_2;
use crate::system::Snapshot;

/// Every key a record carries, in wire order.
pub const RECORD_KEYS: [&str; 18] = [
    "cpu",
    "ram_percent",
    "ram_used",
    "ram_total",
    "net_recv",
    "net_sent",
    "disk_percent",
    "disk_total",
    "disk_free",
    "bat_pct",
    "bat_plug",
    "bat_exist",
    "cpu_name",
    "gpu_name1",
    "gpu_name2",
    "ram_name",
    "disk_name",
    "net_name",
];

#[derive(Debug, Serialize)]
pub struct WireRecord<'a> {
    cpu: f64,
    ram_percent: f64,
    ram_used: u64,
    ram_total: u64,
    net_recv: u64,
    net_sent: u64,
    disk_percent: f64,
    disk_total: u64,
    disk_free: u64,
    bat_pct: u8,
    bat_plug: u8,
    bat_exist: u8,
    cpu_name: &'a str,
    gpu_name1: &'a str,
    gpu_name2: &'a str,
    ram_name: &'a str,
    disk_name: &'a str,
    net_name: &'a str,
}

impl<'a> From<&'a Snapshot> for WireRecord<'a> {
    fn from(snapshot: &'a Snapshot) -> Self {
        let identity = &*snapshot.identity;
        WireRecord {
            cpu: round_2(snapshot.cpu_usage_percent),
            ram_percent: round_2(snapshot.memory.usage_percent),
            ram_used: snapshot.memory.used_bytes,
            ram_total: snapshot.memory.total_bytes,
            net_recv: snapshot.network.bytes_received,
            net_sent: snapshot.network.bytes_sent,
            disk_percent: round_2(snapshot.disk.usage_percent),
            disk_total: snapshot.disk.total_bytes,
            disk_free: snapshot.disk.free_bytes,
            bat_pct: snapshot.battery.percent,
            bat_plug: u8::from(snapshot.battery.plugged),
            bat_exist: u8::from(snapshot.battery.present),
            cpu_name: &identity.cpu_name,
            gpu_name1: &identity.gpu_name_primary,
            gpu_name2: &identity.gpu_name_secondary,
            ram_name: &identity.ram_label,
            disk_name: &identity.disk_label,
            net_name: &identity.net_label,
        }
    }
}

/// Append one newline-terminated record to `out`.
pub fn write_record<W: Write>(mut out: W, snapshot: &Snapshot) -> io::Result<()> {
    serde_json::to_writer(&mut out, &WireRecord::from(snapshot))?;
    out.write_all(b"\n")
}

/// One record as a `String`, newline included.
pub fn encode_line(snapshot: &Snapshot) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(&WireRecord::from(snapshot))?;
    line.push('\n');
    Ok(line)
}
