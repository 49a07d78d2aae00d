use std::fs;

use color_eyre::{eyre::eyre, Result};
use keysmith_core::storage::KeyValueStore;
use keysmith_crypto::EncryptedFile;
use keysmith_manager::KeyManager;
use tracing::info;

use crate::cli::{DecryptArgs, EncryptArgs, KeySource};

/// Encrypt `args.input` into `args.output`. Returns the IV as hex.
pub async fn encrypt<S: KeyValueStore>(
    args: &EncryptArgs,
    manager: &KeyManager<S>,
) -> Result<String> {
    let key = resolve_key(&args.source, manager).await?;
    let contents = fs::read(&args.input)?;
    let sealed = manager
        .encrypt_file(&contents, &key)
        .map_err(|e| eyre!(e.to_string()))?;

    if args.armor {
        fs::write(&args.output, sealed.to_armored())?;
    } else {
        fs::write(&args.output, &sealed.ciphertext)?;
    }
    info!(input = %args.input.display(), output = %args.output.display(), "file encrypted");
    Ok(sealed.iv_hex())
}

/// Decrypt `args.input` into `args.output`.
pub async fn decrypt<S: KeyValueStore>(args: &DecryptArgs, manager: &KeyManager<S>) -> Result<()> {
    let key = resolve_key(&args.source, manager).await?;

    let plaintext = if args.armor {
        let text = fs::read_to_string(&args.input)?;
        let sealed = EncryptedFile::from_armored(&text).map_err(|e| eyre!(e.to_string()))?;
        // An explicit --iv must agree with the one carried in the armor.
        if let Some(iv) = &args.iv {
            if !iv.trim().eq_ignore_ascii_case(&sealed.iv_hex()) {
                color_eyre::eyre::bail!("--iv does not match the IV in the armored input");
            }
        }
        manager
            .decrypt_file(&sealed.ciphertext, &key, &sealed.iv_hex())
            .map_err(|e| eyre!(e.to_string()))?
    } else {
        let iv = args
            .iv
            .as_deref()
            .ok_or_else(|| eyre!("--iv is required for raw ciphertext"))?;
        let ciphertext = fs::read(&args.input)?;
        manager
            .decrypt_file(&ciphertext, &key, iv)
            .map_err(|e| eyre!(e.to_string()))?
    };

    fs::write(&args.output, &*plaintext)?;
    info!(input = %args.input.display(), output = %args.output.display(), "file decrypted");
    Ok(())
}

async fn resolve_key<S: KeyValueStore>(
    source: &KeySource,
    manager: &KeyManager<S>,
) -> Result<String> {
    match (&source.key, &source.key_id) {
        (Some(key), _) => Ok(key.clone()),
        (None, Some(id)) => manager.get_key(id).await.map_err(|e| eyre!(e.to_string())),
        (None, None) => Err(eyre!("either --key or --key-id is required")),
    }
}
