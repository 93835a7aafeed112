// src/bin/esv_keyring.rs
//! Keyring administration CLI
//!
//! ```text
//! esv-keyring init   [path] [--by NAME]
//! esv-keyring rotate [path] [--by NAME]
//! esv-keyring list   [path]
//! esv-keyring check  [path]
//! esv-keyring migrate-legacy [db]
//! ```
//!
//! `path` defaults to the configured keyring, `db` to the configured secrets
//! database. `migrate-legacy` reads the old AES-GCM master key from
//! `ESV_LEGACY_KEY_B64`. Key material is never printed.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use envelope_secret_vault::crypto::LegacyGcm;
use envelope_secret_vault::db::{migrate_legacy_secrets, open_secrets_db};
use envelope_secret_vault::keyring::{KeyRegistry, Keyring, KeyringFile};
use envelope_secret_vault::{load_config, SecretCipher};
use tracing::{info, warn};

struct Args {
    command: String,
    path: Option<PathBuf>,
    created_by: String,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let command = args.next().context("missing command (init | rotate | list | check | migrate-legacy)")?;
    let mut path = None;
    let mut created_by = String::from("esv-keyring");

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--by" => created_by = args.next().context("--by needs a value")?,
            other if path.is_none() => path = Some(PathBuf::from(other)),
            other => bail!("unexpected argument: {other}"),
        }
    }

    Ok(Args {
        command,
        path,
        created_by,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = parse_args()?;
    let config = load_config().context("failed to load configuration")?;
    let keyring_path = config.keyring.path.clone();
    let path = args.path.clone().unwrap_or_else(|| keyring_path.clone());

    match args.command.as_str() {
        "init" => {
            if path.exists() {
                bail!("{} already exists; use `rotate` instead", path.display());
            }
            let mut file = KeyringFile::default();
            let kid = file.add_key(&args.created_by)?;
            file.save(&path)
                .with_context(|| format!("cannot write {}", path.display()))?;
            info!(kid = %kid, path = %path.display(), "keyring created");
            println!("created keyring {} with active key {kid}", path.display());
        }
        "rotate" => {
            let mut file = KeyringFile::load(&path)?;
            let previous = file.active_kid.clone();
            let kid = file.add_key(&args.created_by)?;
            file.save(&path)
                .with_context(|| format!("cannot write {}", path.display()))?;
            println!("active key {previous} -> {kid}");
            println!("existing secrets are rewrapped onto {kid} as they are read");
        }
        "list" => {
            let file = KeyringFile::load(&path)?;
            for (kid, entry) in &file.keys {
                let marker = if *kid == file.active_kid { "*" } else { " " };
                println!(
                    "{marker} {kid:<24} {:<9} created {}",
                    entry.status.as_str(),
                    entry.created_at.as_deref().unwrap_or("-")
                );
            }
        }
        "check" => {
            let keyring = Keyring::load(&path)?;
            let cipher = SecretCipher::with_context(keyring, config.app_context());
            let probe = format!("esv-keyring self-test {}", chrono::Utc::now().to_rfc3339());

            let envelope = cipher.encrypt(probe.as_bytes(), None)?;
            let opened = cipher.decrypt(&envelope)?;
            if opened.as_bytes() != probe.as_bytes() {
                bail!("self-test round trip returned different plaintext");
            }

            let keyring = cipher.registry();
            for kid in keyring.key_ids() {
                if cipher.encrypt(b"probe", Some(kid)).is_err() {
                    warn!(kid, "key cannot seal (too short?)");
                    println!("  {kid}: UNUSABLE");
                }
            }
            println!(
                "ok: active key {} seals and opens ({} key(s) in ring)",
                keyring.active_key_id(),
                keyring.len()
            );
        }
        "migrate-legacy" => {
            let db_path = args
                .path
                .clone()
                .unwrap_or_else(|| config.paths.secrets_db.clone());
            let master = std::env::var("ESV_LEGACY_KEY_B64")
                .context("ESV_LEGACY_KEY_B64 must hold the old master key")?;
            let legacy = LegacyGcm::from_base64(&master)?;
            let keyring = Keyring::load(&keyring_path)?;
            let cipher = SecretCipher::with_context(keyring, config.app_context());
            let conn = open_secrets_db(&db_path)
                .with_context(|| format!("cannot open {}", db_path.display()))?;

            let migrated = migrate_legacy_secrets(&conn, &cipher, &legacy)?;
            info!(migrated, db = %db_path.display(), "legacy migration finished");
            println!(
                "migrated {migrated} legacy secret(s) onto key {}",
                cipher.registry().active_key_id()
            );
        }
        other => bail!("unknown command: {other}"),
    }

    Ok(())
}
