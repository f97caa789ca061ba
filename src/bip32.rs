use crate::error::{Error, Result};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Offset added to an index to mark it hardened in raw BIP-32 encoding.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// A single level of a derivation path.
///
/// `index` is always the unfolded value below 2^31; the hardened offset is
/// only applied by [`PathComponent::raw_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathComponent {
    index: u32,
    hardened: bool,
    level: u32,
    name: Option<&'static str>,
}

impl PathComponent {
    /// Maximum unfolded index
    pub const MAX_INDEX: u32 = HARDENED_OFFSET - 1;

    /// Create a component at `level` (1-based)
    pub fn new(index: u32, hardened: bool, level: u32) -> Result<Self> {
        if index > Self::MAX_INDEX {
            return Err(Error::IndexOutOfRange(index.into()));
        }
        if level == 0 {
            return Err(Error::InvalidLevelSequence {
                expected: 1,
                actual: 0,
            });
        }
        Ok(PathComponent {
            index,
            hardened,
            level,
            name: None,
        })
    }

    /// Split a raw 32-bit BIP-32 index into index and hardened flag
    pub fn from_raw_index(raw: u32, level: u32) -> Result<Self> {
        Self::new(raw & Self::MAX_INDEX, raw >= HARDENED_OFFSET, level)
    }

    /// Parse a single component such as `44'` or `0`
    pub fn parse(component: &str, level: u32) -> Result<Self> {
        if component.contains('/') {
            return Err(Error::ParseError(format!(
                "component '{component}' contains a path separator"
            )));
        }

        let (digits, hardened) = match component.strip_suffix('\'') {
            Some(digits) => (digits, true),
            None => (component, false),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::ParseError(format!(
                "'{component}' is not a non-negative base-10 integer"
            )));
        }

        // all digits, so a failed parse can only be a u64 overflow
        let value: u64 = digits.parse().unwrap_or(u64::MAX);
        let index = u32::try_from(value)
            .ok()
            .filter(|index| *index <= Self::MAX_INDEX)
            .ok_or(Error::IndexOutOfRange(value))?;

        Self::new(index, hardened, level)
    }

    /// Attach a descriptive name, e.g. `"coin type"`
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// The index with any hardened offset removed; same as [`Self::index`].
    pub fn value(&self) -> u32 {
        self.index
    }

    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    /// The raw BIP-32 index, with the hardened offset applied
    pub fn raw_index(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED_OFFSET
        } else {
            self.index
        }
    }
}

impl fmt::Display for PathComponent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// A BIP-32 derivation path such as `m/44'/1022'/0'/0/0'`.
#[derive(Debug, Clone, Default)]
pub struct GenericPath {
    components: Vec<PathComponent>,
}

impl GenericPath {
    /// Build a path from components whose levels must be exactly `1, 2, 3, ...`
    pub fn new(components: Vec<PathComponent>) -> Result<Self> {
        for (position, component) in components.iter().enumerate() {
            let expected = position as u32 + 1;
            if component.level != expected {
                return Err(Error::InvalidLevelSequence {
                    expected,
                    actual: component.level,
                });
            }
        }
        Ok(GenericPath { components })
    }

    /// Build a path from `(index, hardened)` pairs, assigning levels in order
    pub fn from_simple_components(components: &[(u32, bool)]) -> Result<Self> {
        let components = components
            .iter()
            .zip(1..)
            .map(|(&(index, hardened), level)| PathComponent::new(index, hardened, level))
            .collect::<Result<Vec<_>>>()?;
        Ok(GenericPath { components })
    }

    /// Parse a path string.
    ///
    /// `""`, `"m"` and `"m/"` all denote the empty path. The `m/` (or `M/`)
    /// prefix is optional; only `'` marks a hardened component.
    pub fn parse(path: &str) -> Result<Self> {
        let body = match path {
            "" | "m" | "m/" | "M/" => return Ok(GenericPath::default()),
            _ => path
                .strip_prefix("m/")
                .or_else(|| path.strip_prefix("M/"))
                .unwrap_or(path),
        };

        if path.contains("//") || body.is_empty() || body.starts_with('/') || body.ends_with('/') {
            return Err(Error::EmptyComponent(path.to_string()));
        }

        let components = body
            .split('/')
            .zip(1..)
            .map(|(segment, level)| PathComponent::parse(segment, level))
            .collect::<Result<Vec<_>>>()?;

        Ok(GenericPath { components })
    }

    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl AsRef<GenericPath> for GenericPath {
    fn as_ref(&self) -> &GenericPath {
        self
    }
}

// Equality follows the string form, so names and construction route are
// irrelevant.
impl PartialEq for GenericPath {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for GenericPath {}

impl Hash for GenericPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl fmt::Display for GenericPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "m")?;
        for component in &self.components {
            write!(f, "/{}", component)?;
        }
        Ok(())
    }
}

impl FromStr for GenericPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        GenericPath::parse(s)
    }
}
