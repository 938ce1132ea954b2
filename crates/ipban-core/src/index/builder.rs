//! Partition active ban records into exact addresses and ordered ranges

use ipnet::IpNet;
use std::collections::HashMap;
use std::net::IpAddr;

use crate::entities::{Ban, BanTarget};
use crate::value_objects::BanId;

/// Lookup structure derived from the active bans
///
/// Read-only once built. A new index replaces the old one wholesale.
#[derive(Debug, Clone, Default)]
pub struct BanIndex {
    pub(crate) exact: HashMap<IpAddr, BanId>,
    pub(crate) ranges: Vec<(IpNet, BanId)>,
}

/// A record the builder could not use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBan {
    pub ban_id: BanId,
    pub target: String,
    pub reason: String,
}

/// Result of [`BanIndex::build`]: the index plus anything left out of it
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub index: BanIndex,
    pub skipped: Vec<SkippedBan>,
}

impl BanIndex {
    /// Build an index from ban records.
    ///
    /// Records are expected to be active already; the builder does not look at
    /// expiry. Ranges keep the order of `records`. When two records name the
    /// same address the earlier one wins. Records whose target does not parse
    /// are reported in [`BuildReport::skipped`] instead of failing the build.
    pub fn build<'a, I>(records: I) -> BuildReport
    where
        I: IntoIterator<Item = &'a Ban>,
    {
        let mut index = BanIndex::default();
        let mut skipped = Vec::new();

        for ban in records {
            match ban.parsed_target() {
                Ok(BanTarget::Address(addr)) => {
                    index.exact.entry(addr).or_insert(ban.id);
                }
                Ok(BanTarget::Network(net)) => index.ranges.push((net, ban.id)),
                Err(e) => skipped.push(SkippedBan {
                    ban_id: ban.id,
                    target: ban.target.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        BuildReport { index, skipped }
    }

    /// Number of indexed entries
    pub fn len(&self) -> usize {
        self.exact.len() + self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.ranges.is_empty()
    }

    pub fn exact_len(&self) -> usize {
        self.exact.len()
    }

    pub fn range_len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether a ban id appears anywhere in the index
    pub fn contains_ban(&self, id: BanId) -> bool {
        self.exact.values().any(|&b| b == id) || self.ranges.iter().any(|&(_, b)| b == id)
    }
}
