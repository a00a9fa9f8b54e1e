use {
    crate::signature::VerifiedKeys,
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
};

/// Length of an ED25519 public key.
pub const ED25519_KEY_LEN: usize = 32;
/// Length of a compressed ECDSA(secp256k1) public key.
pub const ECDSA_SECP256K1_KEY_LEN: usize = 33;
/// Length of an EVM address alias.
pub const EVM_ADDRESS_LEN: usize = 20;

/// A key structure guarding an account, token or topic.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub enum Key {
    Ed25519([u8; ED25519_KEY_LEN]),
    /// Compressed SEC1 encoding.
    EcdsaSecp256k1(Vec<u8>),
    /// Satisfied when every member is satisfied.
    KeyList(Vec<Key>),
    /// Satisfied when at least `threshold` members are satisfied.
    Threshold { threshold: u32, keys: Vec<Key> },
}

impl Key {
    /// Structural validity. Empty lists and unreachable thresholds are
    /// rejected wherever a key is stored.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Ed25519(_) => true,
            Self::EcdsaSecp256k1(bytes) => {
                bytes.len() == ECDSA_SECP256K1_KEY_LEN && matches!(bytes[0], 0x02 | 0x03)
            }
            Self::KeyList(keys) => !keys.is_empty() && keys.iter().all(Key::is_valid),
            Self::Threshold { threshold, keys } => {
                *threshold >= 1
                    && (*threshold as usize) <= keys.len()
                    && keys.iter().all(Key::is_valid)
            }
        }
    }

    /// Number of primitive (ED25519 / ECDSA) keys in the structure.
    pub fn primitive_count(&self) -> u64 {
        match self {
            Self::Ed25519(_) | Self::EcdsaSecp256k1(_) => 1,
            Self::KeyList(keys) | Self::Threshold { keys, .. } => keys
                .iter()
                .map(Key::primitive_count)
                .fold(0u64, u64::saturating_add),
        }
    }

    /// Raw public key bytes of a primitive key.
    pub fn public_key_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Ed25519(bytes) => Some(bytes.as_slice()),
            Self::EcdsaSecp256k1(bytes) => Some(bytes.as_slice()),
            Self::KeyList(_) | Self::Threshold { .. } => None,
        }
    }

    /// Whether the verified signatures activate this key.
    pub fn is_satisfied_by(&self, verified: &VerifiedKeys) -> bool {
        match self {
            Self::Ed25519(bytes) => verified.contains(bytes),
            Self::EcdsaSecp256k1(bytes) => verified.contains(bytes),
            Self::KeyList(keys) => !keys.is_empty() && keys.iter().all(|k| k.is_satisfied_by(verified)),
            Self::Threshold { threshold, keys } => {
                let satisfied = keys.iter().filter(|k| k.is_satisfied_by(verified)).count();
                *threshold >= 1 && satisfied >= *threshold as usize
            }
        }
    }

    /// Interprets an alias as a key alias. EVM addresses and malformed
    /// bytes yield `None`.
    pub fn from_alias(alias: &[u8]) -> Option<Key> {
        match alias.len() {
            ED25519_KEY_LEN => {
                let mut bytes = [0u8; ED25519_KEY_LEN];
                bytes.copy_from_slice(alias);
                Some(Self::Ed25519(bytes))
            }
            ECDSA_SECP256K1_KEY_LEN => {
                let key = Self::EcdsaSecp256k1(alias.to_vec());
                key.is_valid().then_some(key)
            }
            _ => None,
        }
    }

    /// Alias bytes for a primitive key.
    pub fn to_alias(&self) -> Option<Vec<u8>> {
        self.public_key_bytes().map(<[u8]>::to_vec)
    }
}

/// Whether an alias is a 20-byte EVM address, which creates a hollow
/// account without a key.
pub fn is_evm_address(alias: &[u8]) -> bool {
    alias.len() == EVM_ADDRESS_LEN
}
