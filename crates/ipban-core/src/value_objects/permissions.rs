//! Permission flags and user classes
//!
//! A request's effective permissions come from the class of the user making
//! it. The ban gate can replace that class with [`UserClass::Ghost`] for the
//! remainder of a request.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Board permission flags
    ///
    /// Serialized as a decimal string in JSON.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        /// View posts and images
        const VIEW_CONTENT     = 1 << 0;
        /// Upload posts and comments
        const CREATE_CONTENT   = 1 << 1;
        /// Vote on posts
        const VOTE             = 1 << 2;
        /// Edit tags and metadata of any post
        const EDIT_CONTENT     = 1 << 3;
        /// Add, list and remove IP bans
        const BAN_IP           = 1 << 4;
        /// Change board settings
        const MANAGE_SETTINGS  = 1 << 5;
        /// Bypass all permission checks
        const ADMINISTRATOR    = 1 << 6;

        /// All permissions
        const ALL = u64::MAX;
    }
}

impl Permissions {
    /// Check if the permission set contains a required permission
    ///
    /// Administrators bypass all permission checks.
    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        if self.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        self.contains(permission)
    }

    /// Get a list of all individual permissions that are set
    pub fn list(&self) -> Vec<&'static str> {
        const NAMES: [(Permissions, &str); 7] = [
            (Permissions::VIEW_CONTENT, "VIEW_CONTENT"),
            (Permissions::CREATE_CONTENT, "CREATE_CONTENT"),
            (Permissions::VOTE, "VOTE"),
            (Permissions::EDIT_CONTENT, "EDIT_CONTENT"),
            (Permissions::BAN_IP, "BAN_IP"),
            (Permissions::MANAGE_SETTINGS, "MANAGE_SETTINGS"),
            (Permissions::ADMINISTRATOR, "ADMINISTRATOR"),
        ];

        NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::empty()
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.bits().to_string())
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct PermissionsVisitor;

        impl Visitor<'_> for PermissionsVisitor {
            type Value = Permissions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing permission bits")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Ok(Permissions::from_bits_truncate(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                value
                    .parse::<u64>()
                    .map(Permissions::from_bits_truncate)
                    .map_err(|_| de::Error::custom("invalid permissions string"))
            }
        }

        deserializer.deserialize_any(PermissionsVisitor)
    }
}

/// Class of the user making a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserClass {
    /// Not logged in
    #[default]
    Anonymous,
    /// Registered user
    User,
    /// Board administrator
    Admin,
    /// Requester degraded by a ghost-mode ban
    Ghost,
}

impl UserClass {
    /// Permissions granted to this class
    pub fn permissions(self) -> Permissions {
        match self {
            Self::Anonymous => Permissions::VIEW_CONTENT | Permissions::CREATE_CONTENT,
            Self::User => {
                Permissions::VIEW_CONTENT | Permissions::CREATE_CONTENT | Permissions::VOTE
            }
            Self::Admin => Permissions::ALL,
            Self::Ghost => Permissions::VIEW_CONTENT,
        }
    }

    /// Check if this class grants a permission
    #[inline]
    pub fn can(self, permission: Permissions) -> bool {
        self.permissions().has(permission)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::User => "user",
            Self::Admin => "admin",
            Self::Ghost => "ghost",
        }
    }
}

impl fmt::Display for UserClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anonymous" => Ok(Self::Anonymous),
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "ghost" => Ok(Self::Ghost),
            _ => Err(format!("Invalid user class: {s}")),
        }
    }
}
