//! Request header set.

use crate::error::ConfigError;

/// Browser-like User-Agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:55.0) Gecko/20100101 Firefox/55.0";

const USER_AGENT: &str = "User-Agent";

/// Ordered header list with case-insensitive names.
///
/// Assembled once (defaults, then overrides, then the User-Agent) and shared
/// read-only by every request afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    /// An empty set.
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The default set: a browser User-Agent and a permissive `Accept`.
    pub fn defaults() -> Self {
        Self::empty()
            .with("User-Agent", DEFAULT_USER_AGENT)
            .with("Accept", "*/*")
    }

    /// Set `name` to `value`, replacing any existing entry with the same name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(self, user_agent: impl Into<String>) -> Self {
        self.with(USER_AGENT, user_agent)
    }

    /// Look a header up by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.get(USER_AGENT)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reject names that are not HTTP tokens and values with line breaks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in &self.entries {
            if name.is_empty() || !name.bytes().all(is_token_byte) {
                return Err(ConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: "name must be a non-empty HTTP token".to_string(),
                });
            }
            if value.contains(['\r', '\n']) {
                return Err(ConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: "value must not contain line breaks".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for HeaderSet {
    fn default() -> Self {
        Self::defaults()
    }
}

const fn is_token_byte(b: u8) -> bool {
    matches!(b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`'
        | b'|' | b'~' | b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z')
}
