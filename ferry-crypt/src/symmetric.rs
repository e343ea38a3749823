//! Symmetric authenticated encryption.
//!
//! Wire format, offsets in bytes:
//!
//! ```text
//! 0..4       nonce length, little-endian u32
//! 4..4+n     nonce
//! 4+n..      ciphertext followed by the AEAD tag
//! ```

use std::num::NonZeroU32;

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::CryptError;

/// PBKDF2 rounds for stretching caller key material. Part of the wire
/// compatibility surface: changing it breaks decryption of existing
/// payloads.
pub(crate) const PBKDF2_ROUNDS: u32 = 3;

const AES_KEY_LEN: usize = 32;

/// Stretch arbitrary key material into an AES-256 key.
fn derive_aes_key(key: &[u8]) -> [u8; AES_KEY_LEN] {
    let mut derived = [0u8; AES_KEY_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        NonZeroU32::new(PBKDF2_ROUNDS).unwrap(),
        &[],
        key,
        &mut derived,
    );
    derived
}

/// Encrypt `plain` under `key`, producing the self-describing wire format.
///
/// `key` is arbitrary key material; it is stretched to an AES-256-GCM key
/// with PBKDF2-HMAC-SHA256. A fresh random nonce is generated per call and
/// written to the output ahead of the ciphertext.
pub fn encrypt(key: &[u8], plain: &[u8]) -> Result<Vec<u8>, CryptError> {
    let sealing = LessSafeKey::new(UnboundKey::new(&AES_256_GCM, &derive_aes_key(key))?);

    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new().fill(&mut nonce_bytes)?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let mut sealed = plain.to_vec();
    sealing.seal_in_place_append_tag(nonce, Aad::empty(), &mut sealed)?;

    let mut out = Vec::with_capacity(4 + NONCE_LEN + sealed.len());
    out.extend_from_slice(&(NONCE_LEN as u32).to_le_bytes());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Decrypt a payload produced by [`encrypt`] under the same `key`.
///
/// Fails with [`CryptError::CorruptedMessage`] when the framing is
/// malformed or truncated, when the nonce length is not the AEAD's 96 bits,
/// or when authentication fails (wrong key or tampered ciphertext).
pub fn decrypt(key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptError> {
    if data.len() < 4 {
        // Not even the nonce length.
        return Err(CryptError::CorruptedMessage);
    }
    let nonce_len = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if nonce_len != NONCE_LEN || 4 + nonce_len > data.len() {
        return Err(CryptError::CorruptedMessage);
    }
    let nonce = Nonce::try_assume_unique_for_key(&data[4..4 + nonce_len])
        .map_err(|_| CryptError::CorruptedMessage)?;

    let opening = LessSafeKey::new(UnboundKey::new(&AES_256_GCM, &derive_aes_key(key))?);
    let mut buf = data[4 + nonce_len..].to_vec();
    let plain = opening
        .open_in_place(nonce, Aad::empty(), &mut buf)
        .map_err(|_| CryptError::CorruptedMessage)?;
    Ok(plain.to_vec())
}
