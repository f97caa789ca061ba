use thiserror::Error;

/// Error types for HD paths, mnemonics and key derivation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid path component: {0}")]
    ParseError(String),

    #[error("Empty path component in: {0}")]
    EmptyComponent(String),

    #[error("Index {0} out of range, must be below 2^31")]
    IndexOutOfRange(u64),

    #[error("Wrong number of path components: expected {expected}, got {actual}")]
    WrongComponentCount { expected: usize, actual: usize },

    #[error("Malformed extended key: {0}")]
    MalformedExtendedKey(String),

    #[error("Invalid level sequence: expected level {expected}, got {actual}")]
    InvalidLevelSequence { expected: u32, actual: u32 },

    #[error("Wrong level in BIP-44 path: expected {expected}, got {actual}")]
    WrongLevel { expected: u32, actual: u32 },

    #[error(
        "Wrong hardened value, expected component at level {level} to{} be hardened",
        negation(.expected)
    )]
    WrongHardenedFlag { level: u32, expected: bool },

    #[error("Wrong name at level {level}: expected '{expected}', got '{actual}'")]
    WrongName {
        level: u32,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Wrong index for {name}: {actual}")]
    WrongIndex { name: &'static str, actual: u32 },

    #[error("Incorrect coin type, expected Radix coin type: {expected}, but got: {actual}")]
    CoinTypeMismatch { expected: u32, actual: u32 },

    #[error("Unsupported word count: {0}")]
    UnsupportedWordCount(usize),

    #[error("Invalid mnemonic, it is not checksummed")]
    InvalidChecksum,

    #[error("Invalid word in mnemonic: {0}")]
    WordNotInWordlist(String),

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    #[error("Key derivation failed: {0}")]
    DerivationError(String),
}

impl Error {
    /// Whether this is a checksum or wordlist integrity failure of a mnemonic
    pub fn is_checksum_failure(&self) -> bool {
        matches!(self, Error::InvalidChecksum | Error::WordNotInWordlist(_))
    }
}

fn negation(expected: &bool) -> &'static str {
    if *expected {
        ""
    } else {
        " NOT"
    }
}

pub type Result<T> = std::result::Result<T, Error>;
