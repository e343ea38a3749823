//! # ferry-crypt
//!
//! Standalone encryption library: symmetric authenticated encryption with a
//! self-describing wire format, and asymmetric key-pair generation with a
//! passphrase-protected public-key envelope.
//!
//! The sync engine never calls into this crate. A caller wanting encrypted
//! transfer wraps the storage download/upload streams with these primitives
//! itself: encrypt before upload, decrypt after download.

pub mod error;
pub mod keys;
pub mod symmetric;

pub use error::CryptError;
pub use keys::{KeyPair, PublicKey, KEY_VERSION};
pub use symmetric::{decrypt, encrypt};
