//! Keygen command implementation.

use std::fs;
use std::path::Path;

use keybridge_core::keys::{
    generate_rsa_private_key, rsa_private_key_to_pem, rsa_public_key_to_pem,
};
use keybridge_core::{EcdsaCurve, EcdsaPrivateKey};

/// Generate both key pairs and write them as PEM files into `out_dir`.
pub fn generate_keys(out_dir: &Path, curve: EcdsaCurve, rsa_bits: usize) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir)?;

    let ecdsa = EcdsaPrivateKey::generate_with_curve(curve);
    write_private(&out_dir.join("ecdsa_private.pem"), &ecdsa.to_pkcs8_pem()?)?;
    fs::write(out_dir.join("ecdsa_public.pem"), ecdsa.public_key().to_pem()?)?;

    tracing::info!(bits = rsa_bits, "generating RSA key");
    let rsa = generate_rsa_private_key(rsa_bits)?;
    write_private(&out_dir.join("rsa_private.pem"), &rsa_private_key_to_pem(&rsa)?)?;
    fs::write(out_dir.join("rsa_public.pem"), rsa_public_key_to_pem(&rsa.to_public_key())?)?;

    println!("\n\x1b[1mKeys written to\x1b[0m {}", out_dir.display());
    println!(
        "\x1b[1mECDSA fingerprint:\x1b[0m {} {}",
        curve,
        ecdsa.public_key().fingerprint()
    );
    Ok(())
}

fn write_private(path: &Path, pem: &str) -> anyhow::Result<()> {
    fs::write(path, pem)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
