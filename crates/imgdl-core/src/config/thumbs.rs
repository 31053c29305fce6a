//! Thumbnail variants.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// A named bounding box thumbnails are shrunk to fit into.
///
/// The name doubles as a directory under `thumbs/`, so it is restricted to
/// a single, non-special path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThumbnailSpec {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl ThumbnailSpec {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    /// Square box named after its side length, e.g. `100` for 100x100.
    pub fn square(side: u32) -> Self {
        Self::new(side.to_string(), side, side)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidThumbnail {
            spec: self.to_string(),
            reason: reason.to_string(),
        };
        if self.width == 0 || self.height == 0 {
            return Err(invalid("width and height must be at least 1"));
        }
        if self.name.is_empty() || self.name == "." || self.name == ".." {
            return Err(invalid("name must be a plain directory name"));
        }
        if self.name.contains(['/', '\\']) {
            return Err(invalid("name must not contain path separators"));
        }
        Ok(())
    }

    /// Validate a whole set, rejecting duplicate names.
    pub fn validate_all(specs: &[Self]) -> Result<(), ConfigError> {
        for (i, spec) in specs.iter().enumerate() {
            spec.validate()?;
            if specs[..i].iter().any(|other| other.name == spec.name) {
                return Err(ConfigError::InvalidThumbnail {
                    spec: spec.to_string(),
                    reason: "duplicate name".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for ThumbnailSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}x{}", self.name, self.width, self.height)
    }
}

/// Accepts `N` (square, named `N`), `WxH` (named `WxH`) or `NAME=WxH`.
impl FromStr for ThumbnailSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: &str| ConfigError::InvalidThumbnail {
            spec: s.to_string(),
            reason: reason.to_string(),
        };
        let parse_side = |side: &str| {
            side.trim()
                .parse::<u32>()
                .map_err(|_| invalid("expected N, WxH or NAME=WxH"))
        };

        let (name, dims) = match s.split_once('=') {
            Some((name, dims)) => (name.trim(), dims),
            None => (s, s),
        };
        let spec = match dims.split_once(['x', 'X']) {
            Some((w, h)) => Self::new(name, parse_side(w)?, parse_side(h)?),
            None => {
                let side = parse_side(dims)?;
                Self::new(name, side, side)
            }
        };
        spec.validate()?;
        Ok(spec)
    }
}

/// Sizes used when thumbnails are enabled without explicit sizes.
pub(crate) fn default_specs() -> Vec<ThumbnailSpec> {
    vec![
        ThumbnailSpec::new("small", 50, 50),
        ThumbnailSpec::new("big", 200, 200),
    ]
}
