//! Hierarchical deterministic key paths and mnemonics for Radix wallets.
//!
//! Implements BIP-39 mnemonics, BIP-32 derivation paths and HD nodes, and the
//! BIP-44 path layout pinned to the Radix coin type (1022).

pub mod bip32;
pub mod bip39;
pub mod bip44;
pub mod ckd;
pub mod error;
pub mod hdnode;
pub mod utils;

pub use crate::bip32::{GenericPath, PathComponent, HARDENED_OFFSET};
pub use crate::bip39::{
    Bip39Wordlists, GenerateOptions, Language, Mnemonic, Strength, WordlistProvider,
};
pub use crate::bip44::{
    AddressIndex, Change, RadixPath, RadixPathParams, BIP44_PURPOSE, RADIX_COIN_TYPE,
};
pub use crate::ckd::{ChildKeyDerivation, KeyMaterial, Secp256k1Derivation};
pub use crate::error::{Error, Result};
pub use crate::hdnode::{HdNode, MasterSeed};
