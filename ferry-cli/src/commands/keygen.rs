//! `ferry keygen` — generate a key pair and write it to disk.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ferry_crypt::KeyPair;

/// Arguments for `ferry keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Label baked into the generated key.
    #[arg(long)]
    pub name: String,

    /// Passphrase protecting the public-key envelope.
    #[arg(long)]
    pub passphrase: String,

    /// Output path prefix; writes `<prefix>.key` and `<prefix>.pub`.
    #[arg(long)]
    pub out: PathBuf,
}

impl KeygenArgs {
    pub fn run(self) -> Result<()> {
        let pair = KeyPair::generate(&self.name).context("key generation failed")?;
        let envelope = pair
            .public
            .marshal(&self.passphrase)
            .context("failed to marshal public key")?;

        let key_path = self.out.with_extension("key");
        let pub_path = self.out.with_extension("pub");
        fs::write(&key_path, &pair.private_document)
            .with_context(|| format!("failed to write {}", key_path.display()))?;
        fs::write(&pub_path, &envelope)
            .with_context(|| format!("failed to write {}", pub_path.display()))?;

        println!("wrote {} and {}", key_path.display(), pub_path.display());
        Ok(())
    }
}
