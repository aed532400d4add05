// Network address discovery
// Used only to print reachable URLs in the startup banner

use std::net::{IpAddr, Ipv4Addr};

use crate::logger;

/// Non-loopback IPv4 addresses of this host.
///
/// Enumeration failures are logged and produce an empty list.
pub fn local_ipv4_addresses() -> Vec<Ipv4Addr> {
    match if_addrs::get_if_addrs() {
        Ok(interfaces) => external_ipv4(interfaces.iter().map(if_addrs::Interface::ip)),
        Err(e) => {
            logger::log_warning(&format!("Could not enumerate network interfaces: {e}"));
            Vec::new()
        }
    }
}

fn external_ipv4(addrs: impl IntoIterator<Item = IpAddr>) -> Vec<Ipv4Addr> {
    let mut found: Vec<Ipv4Addr> = Vec::new();
    for addr in addrs {
        if let IpAddr::V4(v4) = addr {
            if !v4.is_loopback() && !v4.is_unspecified() && !found.contains(&v4) {
                found.push(v4);
            }
        }
    }
    found
}
