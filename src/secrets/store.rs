use std::collections::BTreeMap;
use std::fs;
use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};

use age::x25519;
use anyhow::{Context, Result};

/// Encrypted store location: `<config dir>/.railup/secrets.age`
pub fn secrets_path(root: &Path) -> PathBuf {
    root.join(".railup").join("secrets.age")
}

/// Encrypt plaintext for the given recipients, returning armored age output
pub fn encrypt(plaintext: &str, recipients: &[x25519::Recipient]) -> Result<Vec<u8>> {
    let encryptor = age::Encryptor::with_recipients(
        recipients.iter().map(|r| r as &dyn age::Recipient),
    )
    .map_err(|e| anyhow::anyhow!("Encryption setup failed: {}", e))?;

    let mut output = vec![];
    let armor_writer =
        age::armor::ArmoredWriter::wrap_output(&mut output, age::armor::Format::AsciiArmor)?;
    let mut writer = encryptor
        .wrap_output(armor_writer)
        .context("Failed to create age encryptor")?;

    writer
        .write_all(plaintext.as_bytes())
        .context("Failed to write encrypted data")?;

    let armor_writer = writer.finish().context("Failed to finalize encryption")?;
    armor_writer.finish()?;

    Ok(output)
}

pub fn decrypt(ciphertext: &[u8], identity: &x25519::Identity) -> Result<String> {
    let decryptor = age::Decryptor::new(age::armor::ArmoredReader::new(ciphertext))
        .context("Failed to parse age file")?;

    let mut reader = decryptor
        .decrypt(std::iter::once(identity as &dyn age::Identity))
        .map_err(|e| anyhow::anyhow!("Decryption failed: {}", e))?;

    let mut plaintext = String::new();
    reader
        .read_to_string(&mut plaintext)
        .context("Failed to read decrypted data")?;

    Ok(plaintext)
}

/// Parse dotenv content into a sorted map. Comments and blank lines are skipped.
pub fn parse_dotenv(content: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    map
}

pub fn serialize_dotenv(map: &BTreeMap<String, String>) -> String {
    map.iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read and decrypt the store. A missing store is empty.
pub fn read_secrets(root: &Path, identity: &x25519::Identity) -> Result<BTreeMap<String, String>> {
    let path = secrets_path(root);

    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let ciphertext = fs::read(&path)
        .with_context(|| format!("Failed to read secrets file: {}", path.display()))?;

    let plaintext = decrypt(&ciphertext, identity)?;
    Ok(parse_dotenv(&plaintext))
}

pub fn write_secrets(
    root: &Path,
    secrets: &BTreeMap<String, String>,
    recipients: &[x25519::Recipient],
) -> Result<()> {
    let path = secrets_path(root);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let plaintext = serialize_dotenv(secrets);
    let ciphertext = encrypt(&plaintext, recipients)?;

    fs::write(&path, &ciphertext)
        .with_context(|| format!("Failed to write secrets file: {}", path.display()))?;

    Ok(())
}
