use crate::bip32::{GenericPath, PathComponent};
use crate::bip39::Mnemonic;
use crate::ckd::{ChildKeyDerivation, KeyMaterial, Secp256k1Derivation};
use crate::error::{Error, Result};
use crate::utils;
use std::fmt;
use tracing::debug;

const XPRV_VERSION: [u8; 4] = [0x04, 0x88, 0xAD, 0xE4];
const XPUB_VERSION: [u8; 4] = [0x04, 0x88, 0xB2, 0x1E];
const EXTENDED_KEY_LEN: usize = 78;

/// Seed bytes at the root of an HD key tree
#[derive(Clone, PartialEq, Eq)]
pub struct MasterSeed {
    seed: Vec<u8>,
}

impl MasterSeed {
    /// BIP-39 seed of a mnemonic and passphrase
    pub fn from_mnemonic(mnemonic: &Mnemonic, passphrase: &str) -> Self {
        mnemonic.to_seed(passphrase)
    }

    /// Wrap seed bytes that did not come from a mnemonic
    pub fn from_seed(seed: impl Into<Vec<u8>>) -> Self {
        MasterSeed { seed: seed.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.seed
    }

    /// Root node over secp256k1
    pub fn master_node(&self) -> Result<HdNode> {
        self.master_node_with(Secp256k1Derivation::new())
    }

    /// Root node using the given derivation primitive
    pub fn master_node_with<D: ChildKeyDerivation>(&self, deriver: D) -> Result<HdNode<D>> {
        let key = deriver.master_key_from_seed(&self.seed)?;
        HdNode::from_parts(deriver, key, 0, [0; 4], 0)
    }
}

impl fmt::Debug for MasterSeed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MasterSeed")
            .field("len", &self.seed.len())
            .finish()
    }
}

/// A node of the HD key tree: key pair, chain code, and its position.
///
/// Nodes are never mutated; [`HdNode::derive`] returns a new node.
#[derive(Clone)]
pub struct HdNode<D: ChildKeyDerivation = Secp256k1Derivation> {
    key: KeyMaterial,
    public_key: [u8; 33],
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
    deriver: D,
}

impl<D: ChildKeyDerivation> HdNode<D> {
    fn from_parts(
        deriver: D,
        key: KeyMaterial,
        depth: u8,
        parent_fingerprint: [u8; 4],
        child_number: u32,
    ) -> Result<Self> {
        let public_key = deriver.public_key(&key.private_key)?;
        Ok(HdNode {
            key,
            public_key,
            depth,
            parent_fingerprint,
            child_number,
            deriver,
        })
    }

    /// Derive the descendant at `path`, relative to this node
    pub fn derive<P: AsRef<GenericPath>>(&self, path: &P) -> Result<Self>
    where
        D: Clone,
    {
        let path = path.as_ref();
        let mut node = self.clone();
        for component in path.components() {
            node = node.derive_child(component)?;
        }
        debug!(%path, depth = node.depth, "derived HD node");
        Ok(node)
    }

    /// Derive a single child
    pub fn derive_child(&self, component: &PathComponent) -> Result<Self>
    where
        D: Clone,
    {
        let depth = self.depth.checked_add(1).ok_or_else(|| {
            Error::DerivationError("maximum derivation depth exceeded".to_string())
        })?;
        let key = self
            .deriver
            .derive_child(&self.key, component.index(), component.is_hardened())?;
        HdNode::from_parts(
            self.deriver.clone(),
            key,
            depth,
            self.fingerprint(),
            component.raw_index(),
        )
    }

    /// Import a BIP-32 `xprv` string
    pub fn from_extended_private_key_with(xpriv: &str, deriver: D) -> Result<Self> {
        let data = utils::base58check_decode(xpriv)?;

        if data.len() != EXTENDED_KEY_LEN {
            return Err(Error::MalformedExtendedKey(
                "Invalid extended key length".to_string(),
            ));
        }
        if data[0..4] != XPRV_VERSION {
            return Err(Error::MalformedExtendedKey(
                "Invalid version bytes".to_string(),
            ));
        }
        if data[45] != 0 {
            return Err(Error::MalformedExtendedKey(
                "Invalid private key prefix".to_string(),
            ));
        }

        let depth = data[4];

        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&data[5..9]);

        let mut child_number_bytes = [0u8; 4];
        child_number_bytes.copy_from_slice(&data[9..13]);
        let child_number = u32::from_be_bytes(child_number_bytes);

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&data[13..45]);

        let mut private_key = [0u8; 32];
        private_key.copy_from_slice(&data[46..78]);

        let key = KeyMaterial {
            private_key,
            chain_code,
        };
        HdNode::from_parts(deriver, key, depth, parent_fingerprint, child_number)
            .map_err(|_| Error::MalformedExtendedKey("Invalid private key".to_string()))
    }

    /// Serialize as a BIP-32 `xprv` string
    pub fn to_xpriv(&self) -> String {
        let mut key_data = [0u8; 33];
        key_data[1..].copy_from_slice(&self.key.private_key);
        self.serialize(XPRV_VERSION, &key_data)
    }

    /// Serialize as a BIP-32 `xpub` string
    pub fn to_xpub(&self) -> String {
        self.serialize(XPUB_VERSION, &self.public_key)
    }

    fn serialize(&self, version: [u8; 4], key_data: &[u8; 33]) -> String {
        let mut data = Vec::with_capacity(EXTENDED_KEY_LEN);
        data.extend_from_slice(&version);
        data.push(self.depth);
        data.extend_from_slice(&self.parent_fingerprint);
        data.extend_from_slice(&self.child_number.to_be_bytes());
        data.extend_from_slice(&self.key.chain_code);
        data.extend_from_slice(key_data);
        utils::base58check_encode(&data)
    }

    /// First 4 bytes of HASH160 of the public key
    pub fn fingerprint(&self) -> [u8; 4] {
        let hash = utils::hash160(&self.public_key);
        let mut fingerprint = [0u8; 4];
        fingerprint.copy_from_slice(&hash[0..4]);
        fingerprint
    }

    pub fn private_key(&self) -> &[u8; 32] {
        &self.key.private_key
    }

    pub fn public_key(&self) -> &[u8; 33] {
        &self.public_key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.key.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    /// Raw BIP-32 index of this node, hardened offset included
    pub fn child_number(&self) -> u32 {
        self.child_number
    }
}

impl HdNode {
    /// Import a BIP-32 `xprv` string over secp256k1
    pub fn from_extended_private_key(xpriv: &str) -> Result<Self> {
        Self::from_extended_private_key_with(xpriv, Secp256k1Derivation::new())
    }
}

// Position in the tree is part of the node, the primitive is not.
impl<D: ChildKeyDerivation> PartialEq for HdNode<D> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.public_key == other.public_key
            && self.depth == other.depth
            && self.parent_fingerprint == other.parent_fingerprint
            && self.child_number == other.child_number
    }
}

impl<D: ChildKeyDerivation> Eq for HdNode<D> {}

impl<D: ChildKeyDerivation> fmt::Debug for HdNode<D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("HdNode")
            .field("public_key", &hex::encode(self.public_key))
            .field("depth", &self.depth)
            .field("child_number", &self.child_number)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}
