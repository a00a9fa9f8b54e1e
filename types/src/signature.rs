//! Signing and verification over the borsh-encoded transaction body.
//!
//! ED25519 signatures cover the raw body bytes. ECDSA(secp256k1)
//! signatures cover the keccak-256 digest of the body bytes.

use {
    crate::key::{Key, ECDSA_SECP256K1_KEY_LEN, ED25519_KEY_LEN},
    borsh::{BorshDeserialize, BorshSerialize},
    ed25519_dalek::{Signer, Verifier},
    serde::{Deserialize, Serialize},
    sha3::{Digest, Keccak256},
    std::collections::BTreeSet,
    thiserror::Error,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("invalid ed25519 secret key")]
    InvalidEd25519Secret,

    #[error("invalid secp256k1 secret key")]
    InvalidSecp256k1Secret,

    #[error("failed to encode signed bytes: {0}")]
    Encoding(String),
}

#[derive(
    Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub enum SignatureBytes {
    Ed25519(Vec<u8>),
    EcdsaSecp256k1(Vec<u8>),
}

/// A signature together with the full public key that produced it.
#[derive(
    Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct SignaturePair {
    pub public_key: Vec<u8>,
    pub signature: SignatureBytes,
}

#[derive(
    Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct SignatureMap {
    pub pairs: Vec<SignaturePair>,
}

impl SignatureMap {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Verifies every pair against `message` and returns the public keys
    /// whose signatures are valid. Invalid pairs are ignored; they still
    /// count toward the signature fee.
    pub fn verify(&self, message: &[u8]) -> VerifiedKeys {
        let mut verified = VerifiedKeys::default();
        for pair in &self.pairs {
            if verify_pair(pair, message) {
                verified.insert(pair.public_key.clone());
            }
        }
        verified
    }
}

/// Public keys with a valid signature on the current transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifiedKeys(BTreeSet<Vec<u8>>);

impl VerifiedKeys {
    pub fn insert(&mut self, public_key: Vec<u8>) {
        self.0.insert(public_key);
    }

    pub fn contains(&self, public_key: &[u8]) -> bool {
        self.0.contains(public_key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn verify_pair(pair: &SignaturePair, message: &[u8]) -> bool {
    match &pair.signature {
        SignatureBytes::Ed25519(sig) => {
            let Ok(public) = ed25519_dalek::PublicKey::from_bytes(&pair.public_key) else {
                return false;
            };
            let Ok(signature) = ed25519_dalek::Signature::try_from(sig.as_slice()) else {
                return false;
            };
            public.verify(message, &signature).is_ok()
        }
        SignatureBytes::EcdsaSecp256k1(sig) => {
            let Ok(compressed) = <[u8; ECDSA_SECP256K1_KEY_LEN]>::try_from(pair.public_key.as_slice())
            else {
                return false;
            };
            let Ok(public) = libsecp256k1::PublicKey::parse_compressed(&compressed) else {
                return false;
            };
            let Ok(signature) = libsecp256k1::Signature::parse_standard_slice(sig) else {
                return false;
            };
            let digest = libsecp256k1::Message::parse(&keccak256(message));
            libsecp256k1::verify(&digest, &signature, &public)
        }
    }
}

fn keccak256(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(message);
    hasher.finalize().into()
}

/// A private key able to sign transaction bodies.
#[derive(Clone, PartialEq, Eq)]
pub enum PrivateKey {
    Ed25519([u8; ED25519_KEY_LEN]),
    EcdsaSecp256k1([u8; 32]),
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.public_key() {
            Ok(key) => write!(f, "PrivateKey({key:?})"),
            Err(_) => write!(f, "PrivateKey(<invalid>)"),
        }
    }
}

impl PrivateKey {
    pub fn ed25519_from_seed(seed: [u8; 32]) -> Self {
        Self::Ed25519(seed)
    }

    pub fn ecdsa_from_seed(seed: [u8; 32]) -> Result<Self, SignatureError> {
        libsecp256k1::SecretKey::parse(&seed).map_err(|_| SignatureError::InvalidSecp256k1Secret)?;
        Ok(Self::EcdsaSecp256k1(seed))
    }

    pub fn public_key(&self) -> Result<Key, SignatureError> {
        match self {
            Self::Ed25519(seed) => {
                let public = ed25519_keypair(seed)?.public;
                Ok(Key::Ed25519(public.to_bytes()))
            }
            Self::EcdsaSecp256k1(seed) => {
                let secret = libsecp256k1::SecretKey::parse(seed)
                    .map_err(|_| SignatureError::InvalidSecp256k1Secret)?;
                let public = libsecp256k1::PublicKey::from_secret_key(&secret);
                Ok(Key::EcdsaSecp256k1(public.serialize_compressed().to_vec()))
            }
        }
    }

    pub fn sign(&self, message: &[u8]) -> Result<SignaturePair, SignatureError> {
        match self {
            Self::Ed25519(seed) => {
                let keypair = ed25519_keypair(seed)?;
                let signature = keypair.sign(message);
                Ok(SignaturePair {
                    public_key: keypair.public.to_bytes().to_vec(),
                    signature: SignatureBytes::Ed25519(signature.to_bytes().to_vec()),
                })
            }
            Self::EcdsaSecp256k1(seed) => {
                let secret = libsecp256k1::SecretKey::parse(seed)
                    .map_err(|_| SignatureError::InvalidSecp256k1Secret)?;
                let public = libsecp256k1::PublicKey::from_secret_key(&secret);
                let digest = libsecp256k1::Message::parse(&keccak256(message));
                let (signature, _recovery_id) = libsecp256k1::sign(&digest, &secret);
                Ok(SignaturePair {
                    public_key: public.serialize_compressed().to_vec(),
                    signature: SignatureBytes::EcdsaSecp256k1(signature.serialize().to_vec()),
                })
            }
        }
    }
}

fn ed25519_keypair(seed: &[u8; 32]) -> Result<ed25519_dalek::Keypair, SignatureError> {
    let secret = ed25519_dalek::SecretKey::from_bytes(seed)
        .map_err(|_| SignatureError::InvalidEd25519Secret)?;
    let public = ed25519_dalek::PublicKey::from(&secret);
    Ok(ed25519_dalek::Keypair { secret, public })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ed25519_sign_and_verify() {
        let key = PrivateKey::ed25519_from_seed([3u8; 32]);
        let map = SignatureMap {
            pairs: vec![key.sign(b"body").unwrap()],
        };
        let verified = map.verify(b"body");
        let public = key.public_key().unwrap();
        assert!(public.is_satisfied_by(&verified));
        assert!(!public.is_satisfied_by(&map.verify(b"other body")));
    }

    #[test]
    fn test_ecdsa_sign_and_verify() {
        let key = PrivateKey::ecdsa_from_seed([7u8; 32]).unwrap();
        let public = key.public_key().unwrap();
        assert!(public.is_valid());
        let map = SignatureMap {
            pairs: vec![key.sign(b"body").unwrap()],
        };
        assert!(public.is_satisfied_by(&map.verify(b"body")));
        assert!(map.verify(b"tampered").is_empty());
    }

    #[test]
    fn test_ecdsa_zero_secret_rejected() {
        assert_eq!(
            PrivateKey::ecdsa_from_seed([0u8; 32]),
            Err(SignatureError::InvalidSecp256k1Secret)
        );
    }

    #[test]
    fn test_garbage_pairs_are_ignored() {
        let map = SignatureMap {
            pairs: vec![SignaturePair {
                public_key: vec![1, 2, 3],
                signature: SignatureBytes::Ed25519(vec![0u8; 64]),
            }],
        };
        assert_eq!(map.len(), 1);
        assert!(map.verify(b"body").is_empty());
    }
}
