//! Phone number → WAHA chat identifier normalization.

use crate::error::{Error, Result};

/// Suffix WAHA uses for individual chats.
pub const CHAT_SUFFIX: &str = "@c.us";

/// Suffix WAHA uses for group chats.
pub const GROUP_SUFFIX: &str = "@g.us";

/// Digits in a subscriber number once the country code and trunk `0` are removed.
const SUBSCRIBER_DIGITS: usize = 9;

/// Normalizes phone numbers for a single numbering plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneFormatter {
    country_code: String,
}

impl Default for PhoneFormatter {
    fn default() -> Self {
        Self::new(waha_config::schema::DEFAULT_COUNTRY_CODE)
    }
}

impl PhoneFormatter {
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
        }
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Turn a raw phone number into `<country><subscriber>@c.us`.
    ///
    /// Accepts international (`+233 24 123 4567`) and local (`024-123-4567`)
    /// forms. Anything that is not exactly a 9-digit subscriber number after
    /// normalization is [`Error::InvalidRecipient`], as is an identifier that
    /// already carries an `@` suffix.
    pub fn format(&self, raw: &str) -> Result<String> {
        let invalid = || Error::InvalidRecipient {
            raw: raw.to_string(),
        };

        if raw.contains('@') {
            return Err(invalid());
        }

        let digits: String = raw
            .strip_prefix('+')
            .unwrap_or(raw)
            .chars()
            .filter(char::is_ascii_digit)
            .collect();

        let subscriber = match digits.strip_prefix(self.country_code.as_str()) {
            Some(rest) => rest,
            None => digits.strip_prefix('0').unwrap_or(&digits),
        };

        if subscriber.len() != SUBSCRIBER_DIGITS {
            return Err(invalid());
        }

        Ok(format!("{}{subscriber}{CHAT_SUFFIX}", self.country_code))
    }

    /// Chat identifier for `raw`, which may already carry a WAHA suffix.
    ///
    /// Suffixed identifiers are checked rather than reformatted: `@c.us`
    /// needs the country code followed by a 9-digit subscriber number, and
    /// `@g.us` needs `<digits>` or `<digits>-<digits>`. Raw numbers go
    /// through [`PhoneFormatter::format`].
    pub fn normalize(&self, raw: &str) -> Result<String> {
        let valid = if let Some(user) = raw.strip_suffix(CHAT_SUFFIX) {
            user.strip_prefix(self.country_code.as_str())
                .is_some_and(|subscriber| {
                    subscriber.len() == SUBSCRIBER_DIGITS && all_digits(subscriber)
                })
        } else if let Some(group) = raw.strip_suffix(GROUP_SUFFIX) {
            match group.split_once('-') {
                Some((creator, stamp)) => all_digits(creator) && all_digits(stamp),
                None => all_digits(group),
            }
        } else {
            return self.format(raw);
        };

        if valid {
            Ok(raw.to_string())
        } else {
            Err(Error::InvalidRecipient {
                raw: raw.to_string(),
            })
        }
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Whether `value` is already a WAHA chat identifier.
pub fn is_chat_id(value: &str) -> bool {
    value.ends_with(CHAT_SUFFIX) || value.ends_with(GROUP_SUFFIX)
}
