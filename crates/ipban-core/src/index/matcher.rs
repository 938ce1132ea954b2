//! Classify a request address against a [`BanIndex`]

use ipnet::IpNet;
use std::net::IpAddr;

use super::{normalize_address, BanIndex};
use crate::error::DomainError;
use crate::value_objects::BanId;

/// Outcome of matching one address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Clear,
    Banned(BanId),
}

impl Verdict {
    #[inline]
    pub fn is_banned(&self) -> bool {
        matches!(self, Self::Banned(_))
    }

    #[inline]
    pub fn ban_id(&self) -> Option<BanId> {
        match self {
            Self::Banned(id) => Some(*id),
            Self::Clear => None,
        }
    }
}

impl BanIndex {
    /// Match an already-canonical address.
    ///
    /// Exact entries are consulted first. Ranges are then scanned in index
    /// order and the first containing network wins, even when a later range
    /// is more specific.
    pub fn lookup(&self, addr: IpAddr) -> Verdict {
        if let Some(&id) = self.exact.get(&addr) {
            return Verdict::Banned(id);
        }

        self.ranges
            .iter()
            .find(|(net, _)| same_family(net, addr) && net.contains(&addr))
            .map_or(Verdict::Clear, |&(_, id)| Verdict::Banned(id))
    }
}

#[inline]
fn same_family(net: &IpNet, addr: IpAddr) -> bool {
    matches!(
        (net, addr),
        (IpNet::V4(_), IpAddr::V4(_)) | (IpNet::V6(_), IpAddr::V6(_))
    )
}

/// Normalise `address` and match it against `index`
pub fn check(address: &str, index: &BanIndex) -> Result<Verdict, DomainError> {
    let addr = normalize_address(address)
        .map_err(|_| DomainError::InvalidAddress(address.to_string()))?;
    Ok(index.lookup(addr))
}
