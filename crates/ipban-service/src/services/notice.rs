//! Ban notice rendering
//!
//! The template is plain text with `$IP`, `$DATE`, `$ADMIN`, `$REASON` and
//! `$CONTACT` placeholders. Values are substituted verbatim, one placeholder at
//! a time in that order, so text introduced by an earlier value is seen by the
//! later replacements.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ipban_core::entities::{Ban, BanMode};
use ipban_core::value_objects::BanId;

/// Shown for `$DATE` when the ban does not expire
pub const NEVER_EXPIRES: &str = "never";

/// Shown for `$ADMIN` when the issuing admin no longer exists
pub const UNKNOWN_ADMIN: &str = "unknown";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A configured notice template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeTemplate(String);

impl NoticeTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute the ban's fields into the template
    pub fn render(&self, ban: &Ban, admin: Option<&str>, contact_link: Option<&str>) -> String {
        let date = ban
            .expires_at
            .map_or_else(|| NEVER_EXPIRES.to_string(), format_date);
        let contact = contact_link.map(contact_html).unwrap_or_default();

        self.0
            .replace("$IP", &ban.target)
            .replace("$DATE", &date)
            .replace("$ADMIN", admin.unwrap_or(UNKNOWN_ADMIN))
            .replace("$REASON", &ban.reason)
            .replace("$CONTACT", &contact)
    }
}

fn format_date(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

fn contact_html(link: &str) -> String {
    format!("<a href='{link}'>Contact the staff (be sure to include this message)</a>")
}

/// A rendered notice for a matched ban
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BanNotice {
    pub ban_id: BanId,
    pub mode: BanMode,
    pub message: String,
}

impl BanNotice {
    pub fn new(ban: &Ban, message: String) -> Self {
        Self {
            ban_id: ban.id,
            mode: ban.mode,
            message,
        }
    }
}
