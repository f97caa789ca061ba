use crate::bip32::{GenericPath, PathComponent};
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Coin type registered for Radix in SLIP-44
pub const RADIX_COIN_TYPE: u32 = 1022;

/// Purpose constant as defined in BIP-44
pub const BIP44_PURPOSE: u32 = 44;

const PURPOSE: &str = "purpose";
const COIN_TYPE: &str = "coin type";
const ACCOUNT: &str = "account";
const CHANGE: &str = "change";
const ADDRESS_INDEX: &str = "address index";

/// Change level as defined in BIP-44
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Change {
    /// External chain (0) - addresses for receiving payments
    #[default]
    External,
    /// Internal chain (1) - addresses for change
    Internal,
}

impl Change {
    pub fn index(&self) -> u32 {
        match self {
            Change::External => 0,
            Change::Internal => 1,
        }
    }
}

impl TryFrom<u32> for Change {
    type Error = Error;

    fn try_from(index: u32) -> Result<Self> {
        match index {
            0 => Ok(Change::External),
            1 => Ok(Change::Internal),
            actual => Err(Error::WrongIndex {
                name: CHANGE,
                actual,
            }),
        }
    }
}

/// Address index as defined in BIP-44, hardened by default for Radix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressIndex {
    pub index: u32,
    pub hardened: bool,
}

impl AddressIndex {
    /// Create a new hardened address index
    pub fn new(index: u32) -> Self {
        AddressIndex {
            index,
            hardened: true,
        }
    }

    /// Create a new non-hardened address index
    pub fn normal(index: u32) -> Self {
        AddressIndex {
            index,
            hardened: false,
        }
    }
}

impl Default for AddressIndex {
    fn default() -> Self {
        AddressIndex::new(0)
    }
}

/// Inputs for [`RadixPath::create`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadixPathParams {
    pub coin_type: u32,
    pub account: u32,
    pub change: Change,
    pub address: AddressIndex,
}

impl Default for RadixPathParams {
    fn default() -> Self {
        RadixPathParams {
            coin_type: RADIX_COIN_TYPE,
            account: 0,
            change: Change::External,
            address: AddressIndex::default(),
        }
    }
}

/// What a single BIP-44 level must look like; `None` means unconstrained
struct Expected {
    level: u32,
    name: &'static str,
    hardened: Option<bool>,
    index: Option<u32>,
}

const LAYOUT: [Expected; 5] = [
    Expected {
        level: 1,
        name: PURPOSE,
        hardened: Some(true),
        index: Some(BIP44_PURPOSE),
    },
    Expected {
        level: 2,
        name: COIN_TYPE,
        hardened: Some(true),
        index: None,
    },
    Expected {
        level: 3,
        name: ACCOUNT,
        hardened: Some(true),
        index: None,
    },
    Expected {
        level: 4,
        name: CHANGE,
        hardened: Some(false),
        index: None,
    },
    Expected {
        level: 5,
        name: ADDRESS_INDEX,
        hardened: None,
        index: None,
    },
];

impl Expected {
    fn validate(&self, component: &PathComponent) -> Result<PathComponent> {
        // GenericPath already enforces levels 1..n, so this only fires if
        // LAYOUT and GenericPath ever disagree
        if component.level() != self.level {
            return Err(Error::WrongLevel {
                expected: self.level,
                actual: component.level(),
            });
        }
        if let Some(expected) = self.hardened {
            if component.is_hardened() != expected {
                return Err(Error::WrongHardenedFlag {
                    level: self.level,
                    expected,
                });
            }
        }
        if let Some(actual) = component.name() {
            if actual != self.name {
                return Err(Error::WrongName {
                    level: self.level,
                    expected: self.name,
                    actual,
                });
            }
        }
        if let Some(expected) = self.index {
            if component.index() != expected {
                return Err(Error::WrongIndex {
                    name: self.name,
                    actual: component.index(),
                });
            }
        }
        Ok(component.with_name(self.name))
    }
}

/// BIP-44 path fixed to the Radix coin type:
/// m / 44' / 1022' / account' / change / address_index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RadixPath {
    path: GenericPath,
}

impl RadixPath {
    /// Build a Radix path from its variable levels
    pub fn create(params: RadixPathParams) -> Result<Self> {
        if params.coin_type != RADIX_COIN_TYPE {
            return Err(Error::CoinTypeMismatch {
                expected: RADIX_COIN_TYPE,
                actual: params.coin_type,
            });
        }

        let components = vec![
            PathComponent::new(BIP44_PURPOSE, true, 1)?.with_name(PURPOSE),
            PathComponent::new(params.coin_type, true, 2)?.with_name(COIN_TYPE),
            PathComponent::new(params.account, true, 3)?.with_name(ACCOUNT),
            PathComponent::new(params.change.index(), false, 4)?.with_name(CHANGE),
            PathComponent::new(params.address.index, params.address.hardened, 5)?
                .with_name(ADDRESS_INDEX),
        ];

        Ok(RadixPath {
            path: GenericPath::new(components)?,
        })
    }

    /// Build a Radix path from raw components, checking any names they carry
    pub fn from_components(components: Vec<PathComponent>) -> Result<Self> {
        RadixPath::validate(GenericPath::new(components)?)
    }

    /// Parse and validate a Radix BIP-44 path string
    pub fn parse(path: &str) -> Result<Self> {
        RadixPath::validate(GenericPath::parse(path)?)
    }

    fn validate(generic: GenericPath) -> Result<Self> {
        let components = generic.components();

        if components.len() != 5 {
            return Err(Error::WrongComponentCount {
                expected: 5,
                actual: components.len(),
            });
        }

        let mut validated = Vec::with_capacity(5);
        for (expected, component) in LAYOUT.iter().zip(components) {
            validated.push(expected.validate(component)?);
        }
        Change::try_from(validated[3].index())?;

        let coin_type = validated[1].value();
        if coin_type != RADIX_COIN_TYPE {
            warn!(coin_type, "rejected BIP-44 path with non-Radix coin type");
            return Err(Error::CoinTypeMismatch {
                expected: RADIX_COIN_TYPE,
                actual: coin_type,
            });
        }

        debug!(%generic, "parsed Radix BIP-44 path");
        Ok(RadixPath {
            path: GenericPath::new(validated)?,
        })
    }

    /// The path to the next address on the same account and change chain
    pub fn next_address(&self) -> Result<Self> {
        let current = self.address_index();
        RadixPath::create(RadixPathParams {
            coin_type: self.coin_type().value(),
            account: self.account().value(),
            change: self.change(),
            address: AddressIndex {
                index: current.value() + 1,
                hardened: current.is_hardened(),
            },
        })
    }

    pub fn purpose(&self) -> &PathComponent {
        &self.path.components()[0]
    }

    pub fn coin_type(&self) -> &PathComponent {
        &self.path.components()[1]
    }

    pub fn account(&self) -> &PathComponent {
        &self.path.components()[2]
    }

    pub fn change(&self) -> Change {
        match self.path.components()[3].index() {
            0 => Change::External,
            _ => Change::Internal,
        }
    }

    pub fn change_component(&self) -> &PathComponent {
        &self.path.components()[3]
    }

    pub fn address_index(&self) -> &PathComponent {
        &self.path.components()[4]
    }

    pub fn as_generic(&self) -> &GenericPath {
        &self.path
    }
}

impl AsRef<GenericPath> for RadixPath {
    fn as_ref(&self) -> &GenericPath {
        &self.path
    }
}

impl From<RadixPath> for GenericPath {
    fn from(path: RadixPath) -> Self {
        path.path
    }
}

impl fmt::Display for RadixPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.path, f)
    }
}

impl FromStr for RadixPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RadixPath::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RADIX_FIRST: &str = "m/44'/1022'/0'/0/0'";

    #[test]
    fn test_default_path() {
        let path = RadixPath::create(RadixPathParams::default()).unwrap();
        assert_eq!(path.to_string(), RADIX_FIRST);
        assert_eq!(path.purpose().name(), Some("purpose"));
        assert_eq!(path.coin_type().name(), Some("coin type"));
        assert_eq!(path.account().name(), Some("account"));
        assert_eq!(path.change_component().name(), Some("change"));
        assert_eq!(path.address_index().name(), Some("address index"));
    }

    #[test]
    fn test_parse_radix_path() {
        let path = RadixPath::from_str(RADIX_FIRST).unwrap();
        assert_eq!(path.coin_type().value(), RADIX_COIN_TYPE);
        assert_eq!(path.purpose().value(), 44);
        assert_eq!(path.account().value(), 0);
        assert_eq!(path.change(), Change::External);
        assert!(path.address_index().is_hardened());
        assert_eq!(path.to_string(), RADIX_FIRST);
        assert_eq!(path, RadixPath::create(RadixPathParams::default()).unwrap());
    }

    #[test]
    fn test_coin_type_mismatch() {
        assert_eq!(
            RadixPath::from_str("m/44'/1'/0'/0/0'"),
            Err(Error::CoinTypeMismatch {
                expected: 1022,
                actual: 1
            })
        );
        assert_eq!(
            RadixPath::create(RadixPathParams {
                coin_type: 60,
                ..Default::default()
            }),
            Err(Error::CoinTypeMismatch {
                expected: 1022,
                actual: 60
            })
        );
    }

    #[test]
    fn test_wrong_component_count() {
        assert_eq!(
            RadixPath::from_str("m/44'/1022'/0'/0"),
            Err(Error::WrongComponentCount {
                expected: 5,
                actual: 4
            })
        );
        assert_eq!(
            RadixPath::from_str("m"),
            Err(Error::WrongComponentCount {
                expected: 5,
                actual: 0
            })
        );
    }

    #[test]
    fn test_wrong_hardened_flags() {
        assert_eq!(
            RadixPath::from_str("m/44/1022'/0'/0/0'"),
            Err(Error::WrongHardenedFlag {
                level: 1,
                expected: true
            })
        );
        assert_eq!(
            RadixPath::from_str("m/44'/1022'/0/0/0'"),
            Err(Error::WrongHardenedFlag {
                level: 3,
                expected: true
            })
        );
        assert_eq!(
            RadixPath::from_str("m/44'/1022'/0'/0'/0'"),
            Err(Error::WrongHardenedFlag {
                level: 4,
                expected: false
            })
        );
    }

    #[test]
    fn test_wrong_purpose_and_change() {
        assert_eq!(
            RadixPath::from_str("m/49'/1022'/0'/0/0'"),
            Err(Error::WrongIndex {
                name: "purpose",
                actual: 49
            })
        );
        assert_eq!(
            RadixPath::from_str("m/44'/1022'/0'/2/0'"),
            Err(Error::WrongIndex {
                name: "change",
                actual: 2
            })
        );
        assert_eq!(
            Change::try_from(7),
            Err(Error::WrongIndex {
                name: "change",
                actual: 7
            })
        );
    }

    #[test]
    fn test_only_apostrophe_marks_hardened() {
        assert!(matches!(
            RadixPath::from_str("m/44h/1022H/0h/0/0h"),
            Err(Error::ParseError(_))
        ));
        assert!(matches!(
            RadixPath::from_str("M"),
            Err(Error::ParseError(_))
        ));
        assert_eq!(
            RadixPath::from_str("M/44'/1022'/0'/0/0'").unwrap().to_string(),
            RADIX_FIRST
        );
    }

    #[test]
    fn test_address_index_may_be_normal() {
        let path = RadixPath::from_str("m/44'/1022'/3'/1/9").unwrap();
        assert_eq!(path.account().value(), 3);
        assert_eq!(path.change(), Change::Internal);
        assert_eq!(path.address_index().value(), 9);
        assert!(!path.address_index().is_hardened());
    }

    #[test]
    fn test_large_values() {
        let path = RadixPath::create(RadixPathParams {
            account: 0x66aabbcc,
            change: Change::Internal,
            address: AddressIndex::normal(0x55ffeedd),
            ..Default::default()
        })
        .unwrap();

        assert!(path.account().is_hardened());
        assert_eq!(path.account().value(), 1722465228);
        assert_eq!(path.account().raw_index(), 3869948876);
        assert_eq!(format!("{:x}", path.account().raw_index()), "e6aabbcc");
        assert_eq!(path.account().to_string(), "1722465228'");
        assert_eq!(path.address_index().raw_index(), 0x55ffeedd);
    }

    #[test]
    fn test_create_rejects_out_of_range_index() {
        assert!(matches!(
            RadixPath::create(RadixPathParams {
                address: AddressIndex::new(1 << 31),
                ..Default::default()
            }),
            Err(Error::IndexOutOfRange(_))
        ));
    }

    #[test]
    fn test_from_components() {
        let components = RadixPath::from_str(RADIX_FIRST)
            .unwrap()
            .as_generic()
            .components()
            .to_vec();
        let path = RadixPath::from_components(components.clone()).unwrap();
        assert_eq!(path.to_string(), RADIX_FIRST);

        let mut misnamed = components.clone();
        misnamed[2] = misnamed[2].with_name("coin type");
        assert_eq!(
            RadixPath::from_components(misnamed),
            Err(Error::WrongName {
                level: 3,
                expected: "account",
                actual: "coin type"
            })
        );

        let mut reordered = components;
        reordered.swap(0, 1);
        assert!(matches!(
            RadixPath::from_components(reordered),
            Err(Error::InvalidLevelSequence { .. })
        ));
    }

    #[test]
    fn test_next_address() {
        let first = RadixPath::create(RadixPathParams::default()).unwrap();
        let second = first.next_address().unwrap();
        assert_eq!(second.to_string(), "m/44'/1022'/0'/0/1'");
        assert_eq!(second.next_address().unwrap().address_index().value(), 2);
    }

    #[test]
    fn test_parsing_is_deterministic() {
        for input in [RADIX_FIRST, "m/44'/1'/0'/0/0'", "m/44'/1022'"] {
            assert_eq!(RadixPath::from_str(input), RadixPath::from_str(input));
        }
    }
}
