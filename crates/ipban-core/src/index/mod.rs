//! Active-ban index and the address matcher that reads it

mod builder;
mod matcher;

use ipnet::{IpNet, Ipv4Net};
use std::net::{AddrParseError, IpAddr};

pub use builder::{BanIndex, BuildReport, SkippedBan};
pub use matcher::{check, Verdict};

/// Parse an address into its canonical form.
///
/// Surrounding whitespace is ignored and IPv4-mapped IPv6 addresses
/// (`::ffff:a.b.c.d`) become plain IPv4, so the same host always produces the
/// same key no matter which socket family it arrived on.
pub fn normalize_address(input: &str) -> Result<IpAddr, AddrParseError> {
    input.trim().parse::<IpAddr>().map(|addr| addr.to_canonical())
}

/// Truncate a network to its base address, rewriting IPv4-mapped ranges
/// (`::ffff:a.b.c.d/96` and longer) as the IPv4 network they cover.
pub fn normalize_network(net: IpNet) -> IpNet {
    if let IpNet::V6(v6) = net {
        if let Some(v4) = v6.network().to_ipv4_mapped() {
            if let Some(prefix) = v6.prefix_len().checked_sub(96) {
                if let Ok(mapped) = Ipv4Net::new(v4, prefix) {
                    return IpNet::V4(mapped.trunc());
                }
            }
        }
    }
    net.trunc()
}
