//! Local-network presence probe.
//!
//! Detects whether the reference device (typically a phone) is home by
//! refreshing the ARP cache with a ping scan and then looking the device's
//! MAC address up in the kernel's ARP table.

use std::process::Command;

use anyhow::{Context, Result};

use wfh_core::{Presence, PresenceSignal, SignalError};

/// Checks whether the device with `mac_address` is visible on `subnet`.
pub fn is_device_on_network(subnet: &str, mac_address: &str) -> Result<bool> {
    // Refresh the ARP cache by doing a fast scan of hosts on this subnet
    let scan = Command::new("nmap")
        .arg("-sP")
        .arg(subnet)
        .output()
        .context("failed to run nmap")?;
    if !scan.status.success() {
        anyhow::bail!("nmap -sP {subnet} exited with status {}", scan.status);
    }

    // Query the ARP cache for the specified MAC address
    let arp = Command::new("arp")
        .arg("-n")
        .output()
        .context("failed to run arp")?;
    if !arp.status.success() {
        anyhow::bail!("arp -n exited with status {}", arp.status);
    }

    let table = String::from_utf8_lossy(&arp.stdout);
    Ok(table_contains_mac(&table, mac_address))
}

/// MAC case differs between tools, so the lookup is case-insensitive.
fn table_contains_mac(table: &str, mac_address: &str) -> bool {
    let needle = mac_address.to_ascii_lowercase();
    table
        .lines()
        .any(|line| line.to_ascii_lowercase().contains(&needle))
}

/// Network-backed presence source: device visible means home.
#[derive(Debug)]
pub struct NetworkSignal {
    subnet: String,
    mac_address: String,
}

impl NetworkSignal {
    #[must_use]
    pub fn new(subnet: impl Into<String>, mac_address: impl Into<String>) -> Self {
        Self {
            subnet: subnet.into(),
            mac_address: mac_address.into(),
        }
    }
}

impl PresenceSignal for NetworkSignal {
    fn name(&self) -> &'static str {
        "network"
    }

    fn detect(&mut self) -> Result<Presence, SignalError> {
        match is_device_on_network(&self.subnet, &self.mac_address) {
            Ok(true) => Ok(Presence::Home),
            Ok(false) => Ok(Presence::Away),
            Err(error) => Err(SignalError::new(format!("{error:#}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
Address                  HWtype  HWaddress           Flags Mask            Iface
192.168.1.23             ether   AA:BB:CC:DD:EE:FF   C                     eth0
192.168.1.1              ether   11:22:33:44:55:66   C                     eth0
";

    #[test]
    fn finds_mac_regardless_of_case() {
        assert!(table_contains_mac(TABLE, "aa:bb:cc:dd:ee:ff"));
        assert!(table_contains_mac(TABLE, "AA:BB:CC:DD:EE:FF"));
    }

    #[test]
    fn misses_absent_mac() {
        assert!(!table_contains_mac(TABLE, "de:ad:be:ef:00:00"));
        assert!(!table_contains_mac("", "aa:bb:cc:dd:ee:ff"));
    }
}
