//! Application identity: a full display name plus an optional code base.

use crate::{Result, require_arg};
use std::fmt;

const CULTURE_MARKER: &str = ", Culture=";
const NEUTRAL_CULTURE: &str = ", Culture=neutral";

/// Identity of a loaded application.
///
/// ```rust
/// use bcl_faults::ApplicationIdentity;
///
/// let id = ApplicationIdentity::new("Game, Version=1.0.0.0").unwrap();
/// assert_eq!(id.full_name(), "Game, Version=1.0.0.0, Culture=neutral");
/// assert_eq!(id.name(), "Game");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApplicationIdentity {
    full_name: String,
    code_base: Option<String>,
}

impl ApplicationIdentity {
    /// Build an identity from a full name.
    ///
    /// Appends `", Culture=neutral"` unless the name already names a culture.
    /// An empty name fails with `ArgumentNull` for `applicationName`.
    pub fn new(full_name: &str) -> Result<Self> {
        let full_name = require_arg(full_name, "applicationName")?;
        let full_name = if full_name.contains(CULTURE_MARKER) {
            full_name.to_owned()
        } else {
            format!("{}{}", full_name, NEUTRAL_CULTURE)
        };
        Ok(Self {
            full_name,
            code_base: None,
        })
    }

    /// Full display name, culture included.
    #[inline]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Simple name: the text before the first comma.
    pub fn name(&self) -> &str {
        self.full_name
            .split(',')
            .next()
            .map_or(self.full_name.as_str(), str::trim)
    }

    /// Location the application was loaded from, when known.
    #[inline]
    pub fn code_base(&self) -> Option<&str> {
        self.code_base.as_deref()
    }

    /// Record where the application was loaded from.
    pub fn set_code_base(&mut self, code_base: impl Into<String>) {
        self.code_base = Some(code_base.into());
    }
}

impl fmt::Display for ApplicationIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}
