//! BIP-39 mnemonics: entropy to words, words to entropy, and the seed function.
//!
//! Wordlists are looked up through [`WordlistProvider`]; [`Bip39Wordlists`]
//! serves the official lists for every [`Language`].

use crate::error::{Error, Result};
use crate::hdnode::MasterSeed;
use crate::utils;
use rand::{CryptoRng, RngCore};
use sha2::Sha512;
use std::fmt;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

/// Number of words in every BIP-39 wordlist
pub const WORDLIST_LEN: usize = 2048;

const BITS_PER_WORD: usize = 11;
const PBKDF2_ROUNDS: u32 = 2048;
const SEPARATOR: &str = " ";

/// Languages with an official BIP-39 wordlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    English,
    Czech,
    French,
    Italian,
    Japanese,
    Korean,
    Spanish,
    ChineseSimplified,
    ChineseTraditional,
}

impl Language {
    /// All languages supported by BIP-39
    pub fn all() -> &'static [Language] {
        &[
            Language::Czech,
            Language::ChineseSimplified,
            Language::ChineseTraditional,
            Language::Korean,
            Language::French,
            Language::Italian,
            Language::Spanish,
            Language::Japanese,
            Language::English,
        ]
    }
}

/// Source of the 2048-word list for a language
pub trait WordlistProvider {
    fn wordlist(&self, language: Language) -> &[&str; WORDLIST_LEN];
}

/// The official BIP-39 wordlists, as shipped by the `bip39` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct Bip39Wordlists;

impl WordlistProvider for Bip39Wordlists {
    fn wordlist(&self, language: Language) -> &[&str; WORDLIST_LEN] {
        let language = match language {
            Language::English => ::bip39::Language::English,
            Language::Czech => ::bip39::Language::Czech,
            Language::French => ::bip39::Language::French,
            Language::Italian => ::bip39::Language::Italian,
            Language::Japanese => ::bip39::Language::Japanese,
            Language::Korean => ::bip39::Language::Korean,
            Language::Spanish => ::bip39::Language::Spanish,
            Language::ChineseSimplified => ::bip39::Language::SimplifiedChinese,
            Language::ChineseTraditional => ::bip39::Language::TraditionalChinese,
        };
        language.word_list()
    }
}

/// Entropy strength, named by the resulting word count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strength {
    /// 128 bits of entropy
    #[default]
    Words12,
    /// 160 bits of entropy
    Words15,
    /// 192 bits of entropy
    Words18,
    /// 224 bits of entropy
    Words21,
    /// 256 bits of entropy
    Words24,
}

impl Strength {
    pub fn bits(&self) -> usize {
        match self {
            Strength::Words12 => 128,
            Strength::Words15 => 160,
            Strength::Words18 => 192,
            Strength::Words21 => 224,
            Strength::Words24 => 256,
        }
    }

    pub fn byte_count(&self) -> usize {
        self.bits() / 8
    }

    pub fn word_count(&self) -> usize {
        self.bits() / 32 * 3
    }

    /// Number of checksum bits appended to the entropy
    pub fn checksum_bits(&self) -> usize {
        self.bits() / 32
    }

    pub fn from_word_count(word_count: usize) -> Result<Self> {
        match word_count {
            12 => Ok(Strength::Words12),
            15 => Ok(Strength::Words15),
            18 => Ok(Strength::Words18),
            21 => Ok(Strength::Words21),
            24 => Ok(Strength::Words24),
            other => Err(Error::UnsupportedWordCount(other)),
        }
    }

    pub fn from_byte_count(byte_count: usize) -> Result<Self> {
        match byte_count {
            16 => Ok(Strength::Words12),
            20 => Ok(Strength::Words15),
            24 => Ok(Strength::Words18),
            28 => Ok(Strength::Words21),
            32 => Ok(Strength::Words24),
            // report the word count this much entropy would need
            other => Err(Error::UnsupportedWordCount((other * 8 * 3).div_ceil(32))),
        }
    }
}

/// Options for [`Mnemonic::generate_new`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerateOptions {
    pub strength: Strength,
    pub language: Language,
}

/// A validated BIP-39 mnemonic.
///
/// Two mnemonics are equal when their entropy is equal.
#[derive(Clone)]
pub struct Mnemonic {
    strength: Strength,
    entropy: Vec<u8>,
    words: Vec<String>,
    phrase: String,
    language: Language,
}

impl Mnemonic {
    /// Generate a fresh mnemonic from the supplied secure random source
    pub fn generate_new<R: RngCore + CryptoRng>(options: GenerateOptions, rng: &mut R) -> Self {
        let mut entropy = vec![0u8; options.strength.byte_count()];
        rng.fill_bytes(&mut entropy);
        Self::build(entropy, options.strength, options.language, &Bip39Wordlists)
    }

    /// Generate a fresh mnemonic using the thread-local CSPRNG
    pub fn generate(strength: Strength, language: Language) -> Self {
        Self::generate_new(GenerateOptions { strength, language }, &mut rand::thread_rng())
    }

    /// Create a mnemonic from 16, 20, 24, 28 or 32 bytes of entropy
    pub fn from_entropy(entropy: &[u8], language: Language) -> Result<Self> {
        Self::from_entropy_with(entropy, language, &Bip39Wordlists)
    }

    pub fn from_entropy_with<W: WordlistProvider>(
        entropy: &[u8],
        language: Language,
        wordlists: &W,
    ) -> Result<Self> {
        let strength = Strength::from_byte_count(entropy.len())?;
        Ok(Self::build(entropy.to_vec(), strength, language, wordlists))
    }

    /// Parse and validate a phrase against the wordlist of `language`
    pub fn from_phrase_in_language(phrase: &str, language: Language) -> Result<Self> {
        Self::from_phrase_with(phrase, language, &Bip39Wordlists)
    }

    pub fn from_phrase_with<W: WordlistProvider>(
        phrase: &str,
        language: Language,
        wordlists: &W,
    ) -> Result<Self> {
        let normalized: String = phrase.nfkd().collect();
        let words: Vec<String> = normalized.split_whitespace().map(String::from).collect();
        let strength = Strength::from_word_count(words.len())?;

        let wordlist = wordlists.wordlist(language);
        let indices = words
            .iter()
            .map(|word| {
                find_word(wordlist, word).ok_or_else(|| Error::WordNotInWordlist(word.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let entropy = match indices_to_entropy(&indices, strength) {
            Some(entropy) => entropy,
            None => {
                warn!(?language, "Invalid mnemonic, it is not checksummed");
                return Err(Error::InvalidChecksum);
            }
        };

        debug!(word_count = words.len(), ?language, "Successfully created mnemonic");
        Ok(Mnemonic {
            strength,
            entropy,
            phrase: words.join(SEPARATOR),
            words,
            language,
        })
    }

    pub fn from_words_in_language<S: AsRef<str>>(words: &[S], language: Language) -> Result<Self> {
        let phrase = words
            .iter()
            .map(|word| word.as_ref())
            .collect::<Vec<_>>()
            .join(SEPARATOR);
        Self::from_phrase_in_language(&phrase, language)
    }

    pub fn from_english_phrase(phrase: &str) -> Result<Self> {
        Self::from_phrase_in_language(phrase, Language::English)
    }

    pub fn from_english_words<S: AsRef<str>>(words: &[S]) -> Result<Self> {
        Self::from_words_in_language(words, Language::English)
    }

    // entropy length is already known to match `strength`
    fn build<W: WordlistProvider>(
        entropy: Vec<u8>,
        strength: Strength,
        language: Language,
        wordlists: &W,
    ) -> Self {
        let wordlist = wordlists.wordlist(language);
        let words: Vec<String> = entropy_to_indices(&entropy)
            .into_iter()
            .map(|index| wordlist[index].nfkd().collect())
            .collect();

        debug!(word_count = words.len(), ?language, "Successfully created mnemonic");
        Mnemonic {
            strength,
            entropy,
            phrase: words.join(SEPARATOR),
            words,
            language,
        }
    }

    /// Derive the BIP-39 seed, `"mnemonic" + passphrase` being the PBKDF2 salt
    pub fn to_seed(&self, passphrase: &str) -> MasterSeed {
        let salt: String = format!("mnemonic{passphrase}").nfkd().collect();
        let mut seed = [0u8; 64];
        pbkdf2::pbkdf2_hmac::<Sha512>(
            self.phrase.as_bytes(),
            salt.as_bytes(),
            PBKDF2_ROUNDS,
            &mut seed,
        );
        MasterSeed::from_seed(seed.to_vec())
    }

    pub fn strength(&self) -> Strength {
        self.strength
    }

    pub fn entropy(&self) -> &[u8] {
        &self.entropy
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// The NFKD-normalized phrase, words separated by a single space
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

impl PartialEq for Mnemonic {
    fn eq(&self, other: &Self) -> bool {
        self.entropy == other.entropy
    }
}

impl Eq for Mnemonic {}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.phrase)
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Mnemonic")
            .field("strength", &self.strength)
            .field("language", &self.language)
            .field("phrase", &"[REDACTED]")
            .finish()
    }
}

fn find_word(wordlist: &[&str; WORDLIST_LEN], word: &str) -> Option<usize> {
    wordlist
        .iter()
        .position(|candidate| candidate.nfkd().eq(word.chars()))
}

/// Split entropy plus its checksum into 11-bit word indices
fn entropy_to_indices(entropy: &[u8]) -> Vec<usize> {
    let checksum_bits = entropy.len() * 8 / 32;
    let word_count = (entropy.len() * 8 + checksum_bits) / BITS_PER_WORD;

    let mut bits = entropy.to_vec();
    bits.push(utils::sha256(entropy)[0]);

    (0..word_count)
        .map(|word| {
            (0..BITS_PER_WORD).fold(0usize, |index, bit| {
                let pos = word * BITS_PER_WORD + bit;
                (index << 1) | ((bits[pos / 8] >> (7 - pos % 8)) & 1) as usize
            })
        })
        .collect()
}

/// Reassemble entropy from word indices; `None` when the checksum does not match
fn indices_to_entropy(indices: &[usize], strength: Strength) -> Option<Vec<u8>> {
    let mut bits = vec![0u8; (indices.len() * BITS_PER_WORD).div_ceil(8)];
    for (word, index) in indices.iter().enumerate() {
        for bit in 0..BITS_PER_WORD {
            if index & (1 << (BITS_PER_WORD - 1 - bit)) != 0 {
                let pos = word * BITS_PER_WORD + bit;
                bits[pos / 8] |= 1 << (7 - pos % 8);
            }
        }
    }

    let byte_count = strength.byte_count();
    let shift = 8 - strength.checksum_bits();
    let checksum = bits[byte_count] >> shift;
    bits.truncate(byte_count);

    (utils::sha256(&bits)[0] >> shift == checksum).then_some(bits)
}
