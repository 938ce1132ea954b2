//! Ban entity - an address or network barred from the board

use chrono::{DateTime, Utc};
use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::DomainError;
use crate::index::{normalize_address, normalize_network};
use crate::value_objects::{BanId, UserId};

/// Separator that marks a target as a CIDR range
pub const RANGE_DELIMITER: char = '/';

/// How a matching request is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BanMode {
    /// Reject the request with a 403 and the ban notice
    Block,
    /// Same as block at the application level; listed for the firewall exporter
    Firewall,
    /// Let the request through with the requester degraded to the ghost class
    Ghost,
}

impl BanMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Firewall => "firewall",
            Self::Ghost => "ghost",
        }
    }

    /// Whether a matching request stops at the gate
    #[inline]
    pub fn terminates_request(self) -> bool {
        !matches!(self, Self::Ghost)
    }

    /// Interpret a mode column read back from storage.
    ///
    /// Rows written before modes existed, or with a value this version does
    /// not know, are enforced as `block`.
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or(Self::Block)
    }
}

impl fmt::Display for BanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BanMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "firewall" => Ok(Self::Firewall),
            "ghost" => Ok(Self::Ghost),
            _ => Err(DomainError::InvalidBanMode(s.to_string())),
        }
    }
}

/// What a ban applies to: one address or a whole network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BanTarget {
    Address(IpAddr),
    Network(IpNet),
}

impl BanTarget {
    /// Parse a target, classifying it by the presence of the range delimiter.
    ///
    /// Addresses and networks are normalised: IPv4-mapped IPv6 becomes IPv4
    /// and networks are truncated to their base address.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        if trimmed.contains(RANGE_DELIMITER) {
            trimmed
                .parse::<IpNet>()
                .map(|net| Self::Network(normalize_network(net)))
                .map_err(|_| DomainError::InvalidTarget(trimmed.to_string()))
        } else {
            normalize_address(trimmed)
                .map(Self::Address)
                .map_err(|_| DomainError::InvalidTarget(trimmed.to_string()))
        }
    }

    #[inline]
    pub fn is_range(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl fmt::Display for BanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(addr) => write!(f, "{addr}"),
            Self::Network(net) => write!(f, "{net}"),
        }
    }
}

impl FromStr for BanTarget {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A stored ban record
///
/// `target` keeps the raw stored text: rows written by older versions of the
/// board may not parse, and the index builder decides what to do with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ban {
    pub id: BanId,
    pub target: String,
    pub mode: BanMode,
    pub reason: String,
    pub created_by: UserId,
    pub added_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Ban {
    /// A ban is active until its expiry; bans without one never expire
    #[inline]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires| expires > now)
    }

    #[inline]
    pub fn is_permanent(&self) -> bool {
        self.expires_at.is_none()
    }

    /// Parse the stored target
    pub fn parsed_target(&self) -> Result<BanTarget, DomainError> {
        BanTarget::parse(&self.target)
    }
}

/// A validated ban waiting to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBan {
    pub target: BanTarget,
    pub mode: BanMode,
    pub reason: String,
    pub created_by: UserId,
    pub added_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewBan {
    /// Validate raw ban input.
    ///
    /// `target` and `reason` are trimmed. Fails when the target is neither an
    /// address nor a CIDR range, when the mode is unknown, or when the expiry
    /// is not strictly after `now`.
    pub fn new(
        target: &str,
        mode: &str,
        reason: &str,
        created_by: UserId,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let target = BanTarget::parse(target)?;
        let mode = mode.parse::<BanMode>()?;

        if let Some(expires) = expires_at {
            if expires <= now {
                return Err(DomainError::InvalidExpiry);
            }
        }

        Ok(Self {
            target,
            mode,
            reason: reason.trim().to_string(),
            created_by,
            added_at: now,
            expires_at,
        })
    }

    /// Canonical text stored in the target column
    pub fn target_text(&self) -> String {
        self.target.to_string()
    }

    /// The stored record once the store has assigned an id
    pub fn into_ban(self, id: BanId) -> Ban {
        Ban {
            id,
            target: self.target.to_string(),
            mode: self.mode,
            reason: self.reason,
            created_by: self.created_by,
            added_at: self.added_at,
            expires_at: self.expires_at,
        }
    }
}

/// A ban together with the name of the admin who issued it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BanListing {
    #[serde(flatten)]
    pub ban: Ban,
    pub banner: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("block".parse::<BanMode>().unwrap(), BanMode::Block);
        assert_eq!(" Ghost ".parse::<BanMode>().unwrap(), BanMode::Ghost);
        assert_eq!("firewall".parse::<BanMode>().unwrap(), BanMode::Firewall);
        assert!(matches!(
            "kick".parse::<BanMode>(),
            Err(DomainError::InvalidBanMode(_))
        ));
    }

    #[test]
    fn test_stored_mode_defaults_to_block() {
        assert_eq!(BanMode::from_stored("ghost"), BanMode::Ghost);
        assert_eq!(BanMode::from_stored(""), BanMode::Block);
        assert_eq!(BanMode::from_stored("shadow"), BanMode::Block);
    }

    #[test]
    fn test_mode_termination() {
        assert!(BanMode::Block.terminates_request());
        assert!(BanMode::Firewall.terminates_request());
        assert!(!BanMode::Ghost.terminates_request());
    }

    #[test]
    fn test_parse_target_address() {
        let target = BanTarget::parse(" 192.168.1.100 ").unwrap();
        assert_eq!(target, BanTarget::Address("192.168.1.100".parse().unwrap()));
        assert!(!target.is_range());
        assert_eq!(target.to_string(), "192.168.1.100");
    }

    #[test]
    fn test_parse_target_normalises_ipv6() {
        let target = BanTarget::parse("2001:0db8:0000:0000:0000:0000:0000:0001").unwrap();
        assert_eq!(target.to_string(), "2001:db8::1");

        let mapped = BanTarget::parse("::ffff:10.1.2.3").unwrap();
        assert_eq!(mapped.to_string(), "10.1.2.3");
    }

    #[test]
    fn test_parse_target_network() {
        let target = BanTarget::parse("10.1.2.3/8").unwrap();
        assert!(target.is_range());
        assert_eq!(target.to_string(), "10.0.0.0/8");
    }

    #[test]
    fn test_parse_target_mapped_network_becomes_ipv4() {
        let target = BanTarget::parse("::ffff:10.0.0.0/104").unwrap();
        assert_eq!(target, BanTarget::Network("10.0.0.0/8".parse().unwrap()));
        assert_eq!(target.to_string(), "10.0.0.0/8");
    }

    #[test]
    fn test_parse_target_rejects_garbage() {
        for bad in ["", "not-an-ip", "10.0.0.0/33", "300.1.1.1", "10.0.0.1/", "/8"] {
            assert!(
                matches!(BanTarget::parse(bad), Err(DomainError::InvalidTarget(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_new_ban_validates() {
        let ban = NewBan::new(
            " 10.0.0.0/8 ",
            "ghost",
            "  spam  ",
            UserId::new(1),
            Some(now() + Duration::hours(1)),
            now(),
        )
        .unwrap();
        assert_eq!(ban.target_text(), "10.0.0.0/8");
        assert_eq!(ban.mode, BanMode::Ghost);
        assert_eq!(ban.reason, "spam");
        assert_eq!(ban.added_at, now());
    }

    #[test]
    fn test_new_ban_rejects_past_expiry() {
        let result = NewBan::new("1.2.3.4", "block", "x", UserId::new(1), Some(now()), now());
        assert!(matches!(result, Err(DomainError::InvalidExpiry)));
    }

    #[test]
    fn test_new_ban_rejects_bad_mode() {
        let result = NewBan::new("1.2.3.4", "banish", "x", UserId::new(1), None, now());
        assert!(matches!(result, Err(DomainError::InvalidBanMode(_))));
    }

    #[test]
    fn test_is_active_at() {
        let mut ban = Ban {
            id: BanId::new(1),
            target: "1.2.3.4".to_string(),
            mode: BanMode::Block,
            reason: String::new(),
            created_by: UserId::new(1),
            added_at: now(),
            expires_at: None,
        };
        assert!(ban.is_active_at(now() + Duration::days(3650)));
        assert!(ban.is_permanent());

        ban.expires_at = Some(now() + Duration::hours(1));
        assert!(ban.is_active_at(now()));
        assert!(!ban.is_active_at(now() + Duration::hours(1)));
        assert!(!ban.is_active_at(now() + Duration::hours(2)));
    }
}
