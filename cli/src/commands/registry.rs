//! Register/show command implementations.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use keybridge_core::keys::{load_rsa_public_key_der, parse_rsa_public_key_der, rsa_key_bits};
use keybridge_core::{ClientKeyRegistry, Config, EcdsaPublicKey, RedisStore};

async fn open_registry(config: &Config) -> anyhow::Result<ClientKeyRegistry> {
    let store = RedisStore::connect(&config.redis_url).await?;
    Ok(ClientKeyRegistry::new(Arc::new(store), config))
}

/// Register a client's RSA and ECDSA public keys.
pub async fn register(
    config: &Config,
    client_id: &str,
    rsa_pub: &Path,
    ecdsa_pub: &Path,
    ttl_secs: Option<u64>,
) -> anyhow::Result<()> {
    let rsa_der = load_rsa_public_key_der(&fs::read(rsa_pub)?)?;
    // Reject unusable keys before they reach the store
    parse_rsa_public_key_der(&rsa_der)?;
    let ecdsa = EcdsaPublicKey::from_pem(&fs::read(ecdsa_pub)?)?;

    let ttl = ttl_secs.map(Duration::from_secs).unwrap_or(config.default_ttl);
    let registry = open_registry(config).await?;
    registry
        .save_client_keys(client_id, &rsa_der, &ecdsa.to_der()?, ttl)
        .await?;

    println!(
        "\x1b[1;32m✓\x1b[0m Registered \x1b[1m{}\x1b[0m for {}s ({:?} layout)",
        client_id,
        ttl.as_secs(),
        registry.layout()
    );
    Ok(())
}

/// Print a client's registration.
pub async fn show(config: &Config, client_id: &str) -> anyhow::Result<()> {
    let registry = open_registry(config).await?;
    let record = registry.get_client_keys(client_id).await?;
    let ecdsa = EcdsaPublicKey::from_der(&record.ecdsa_public_key_der)?;
    let rsa = parse_rsa_public_key_der(&record.rsa_public_key_der)?;

    println!("\n\x1b[1mClient {}\x1b[0m", record.client_id);
    println!("═══════════════════════════════════════");
    println!(
        "\x1b[1mECDSA:\x1b[0m      {} {}",
        ecdsa.curve(),
        ecdsa.fingerprint()
    );
    println!(
        "\x1b[1mRSA:\x1b[0m        {}-bit ({} DER bytes)",
        rsa_key_bits(&rsa),
        record.rsa_public_key_der.len()
    );
    match record.expires_at {
        Some(at) => println!("\x1b[1mExpires at:\x1b[0m {} (unix)", at),
        None => println!("\x1b[1mExpires at:\x1b[0m unknown (split layout)"),
    }
    println!();
    Ok(())
}
