//! Asymmetric key-pair generation and the passphrase-protected public-key
//! envelope.

use std::num::NonZeroU32;

use ring::pbkdf2;
use ring::rand::SystemRandom;
use ring::signature::{Ed25519KeyPair, KeyPair as _};
use serde::{Deserialize, Serialize};

use crate::error::CryptError;
use crate::symmetric::{self, PBKDF2_ROUNDS};

/// Envelope format version.
pub const KEY_VERSION: u32 = 1;

/// Public half of a generated key pair.
///
/// `name` is an arbitrary label baked in at generation time; it doubles as
/// the salt for [`PublicKey::derive_weak_key`], so two keys with identical
/// bytes but different labels derive different symmetric keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub key_bytes: Vec<u8>,
    pub key_length: usize,
    pub name: Vec<u8>,
}

/// A generated key pair: the private key document plus its public half.
pub struct KeyPair {
    /// PKCS#8 document holding the private key.
    pub private_document: Vec<u8>,
    pub public: PublicKey,
}

impl KeyPair {
    /// Generate a fresh Ed25519 key pair labelled `name`.
    pub fn generate(name: &str) -> Result<Self, CryptError> {
        let rng = SystemRandom::new();
        let document =
            Ed25519KeyPair::generate_pkcs8(&rng).map_err(|_| CryptError::KeyGeneration)?;
        let key_pair = Ed25519KeyPair::from_pkcs8(document.as_ref())
            .map_err(|_| CryptError::KeyGeneration)?;
        let key_bytes = key_pair.public_key().as_ref().to_vec();
        let key_length = key_bytes.len();
        Ok(KeyPair {
            private_document: document.as_ref().to_vec(),
            public: PublicKey {
                key_bytes,
                key_length,
                name: name.as_bytes().to_vec(),
            },
        })
    }
}

/// On-disk JSON shape of the envelope. `pub_key`, `encrypted_version`, and
/// `name` are hex-encoded symmetric ciphertexts under the passphrase; the
/// plaintext `version` is duplicated inside `encrypted_version` so tampering
/// with either copy is detectable.
#[derive(Debug, Serialize, Deserialize)]
struct KeyEnvelope {
    key_length: usize,
    version: u32,
    pub_key: String,
    encrypted_version: String,
    name: String,
}

impl PublicKey {
    /// Serialize into the passphrase-protected JSON envelope.
    pub fn marshal(&self, passphrase: &str) -> Result<Vec<u8>, CryptError> {
        let key = passphrase.as_bytes();
        let envelope = KeyEnvelope {
            key_length: self.key_length,
            version: KEY_VERSION,
            pub_key: hex::encode(symmetric::encrypt(key, &self.key_bytes)?),
            encrypted_version: hex::encode(symmetric::encrypt(
                key,
                KEY_VERSION.to_string().as_bytes(),
            )?),
            name: hex::encode(symmetric::encrypt(key, &self.name)?),
        };
        Ok(serde_json::to_vec(&envelope)?)
    }

    /// Parse an envelope produced by [`PublicKey::marshal`].
    ///
    /// The plaintext `version` is checked first; the encrypted copy must
    /// then decrypt under `passphrase` and match it, so a tampered or
    /// corrupted envelope is rejected even when the plaintext header looks
    /// plausible.
    pub fn parse(passphrase: &str, data: &[u8]) -> Result<PublicKey, CryptError> {
        let envelope: KeyEnvelope = serde_json::from_slice(data)?;
        if envelope.version != KEY_VERSION {
            return Err(CryptError::UnsupportedVersion {
                version: envelope.version,
            });
        }

        let key = passphrase.as_bytes();
        let decrypted_version = symmetric::decrypt(key, &unhex(&envelope.encrypted_version)?)?;
        let decrypted_version: u32 = String::from_utf8(decrypted_version)
            .map_err(|_| CryptError::CorruptedMessage)?
            .parse()
            .map_err(|_| CryptError::CorruptedMessage)?;
        if decrypted_version != envelope.version {
            return Err(CryptError::CorruptedMessage);
        }

        Ok(PublicKey {
            key_bytes: symmetric::decrypt(key, &unhex(&envelope.pub_key)?)?,
            key_length: envelope.key_length,
            name: symmetric::decrypt(key, &unhex(&envelope.name)?)?,
        })
    }

    /// Stretch the public key bytes into a symmetric key of `key_length`
    /// bytes, salted with the key's name.
    pub fn derive_weak_key(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.key_length];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            NonZeroU32::new(PBKDF2_ROUNDS).unwrap(),
            &self.name,
            &self.key_bytes,
            &mut out,
        );
        out
    }
}

fn unhex(field: &str) -> Result<Vec<u8>, CryptError> {
    hex::decode(field).map_err(|_| CryptError::CorruptedMessage)
}
