//! Keybridge CLI - key material and client key registry tooling.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use keybridge_core::constants::{DEFAULT_REDIS_URL, DEFAULT_RSA_BITS};
use keybridge_core::{Config, EcdsaCurve, KeyLayout};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keybridge")]
#[command(about = "Client key material and registry tooling", long_about = None)]
struct Cli {
    /// Redis endpoint for registry commands
    #[arg(long, global = true, env = "KEYBRIDGE_REDIS_URL", default_value = DEFAULT_REDIS_URL)]
    redis_url: String,

    /// Store layout of registered keys (combined or split)
    #[arg(long, global = true, env = "KEYBRIDGE_LAYOUT", default_value = "combined")]
    layout: KeyLayout,

    #[command(subcommand)]
    command: Commands,
}

fn default_client_id() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "keybridge-client".to_string())
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an ECDSA and an RSA key pair
    Keygen {
        /// Output directory (defaults to ~/.keybridge)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        /// ECDSA curve (p256 or p384)
        #[arg(long, default_value_t = EcdsaCurve::P256)]
        curve: EcdsaCurve,
        #[arg(long, default_value_t = DEFAULT_RSA_BITS)]
        rsa_bits: usize,
    },
    /// Print base64 random bytes
    Random {
        #[arg(short, long, default_value_t = 32)]
        size: usize,
    },
    /// Sign data with an ECDSA private key (SEC1 or PKCS#8 PEM)
    Sign {
        #[arg(short, long)]
        key: PathBuf,
        #[arg(short, long)]
        data: String,
    },
    /// Verify a base64 signature with an ECDSA public key PEM
    Verify {
        #[arg(short, long)]
        pubkey: PathBuf,
        #[arg(short, long)]
        data: String,
        #[arg(short, long)]
        signature: String,
    },
    /// Encrypt data to an RSA public key PEM (OAEP-SHA256)
    Encrypt {
        #[arg(short, long)]
        pubkey: PathBuf,
        #[arg(short, long)]
        data: String,
    },
    /// Decrypt a base64 ciphertext with an RSA private key PEM
    Decrypt {
        #[arg(short, long)]
        key: PathBuf,
        #[arg(short, long)]
        ciphertext: String,
    },
    /// Register a client's public keys in the registry
    Register {
        #[arg(long, default_value_t = default_client_id())]
        client_id: String,
        #[arg(long)]
        rsa_pub: PathBuf,
        #[arg(long)]
        ecdsa_pub: PathBuf,
        /// Registration lifetime (defaults to 24h)
        #[arg(long)]
        ttl_secs: Option<u64>,
    },
    /// Show a client's registered keys
    Show {
        #[arg(long, default_value_t = default_client_id())]
        client_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("keybridge=info".parse()?)
                .add_directive("keybridge_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config {
        redis_url: cli.redis_url,
        layout: cli.layout,
        ..Config::default()
    };

    match cli.command {
        Commands::Keygen { out_dir, curve, rsa_bits } => {
            let out_dir = out_dir.unwrap_or_else(|| config.data_dir.clone());
            commands::generate_keys(&out_dir, curve, rsa_bits)?
        }
        Commands::Random { size } => commands::print_random(size)?,
        Commands::Sign { key, data } => commands::sign(&key, &data)?,
        Commands::Verify { pubkey, data, signature } => {
            commands::verify(&pubkey, &data, &signature)?
        }
        Commands::Encrypt { pubkey, data } => commands::encrypt(&pubkey, &data)?,
        Commands::Decrypt { key, ciphertext } => commands::decrypt(&key, &ciphertext)?,
        Commands::Register { client_id, rsa_pub, ecdsa_pub, ttl_secs } => {
            commands::register(&config, &client_id, &rsa_pub, &ecdsa_pub, ttl_secs).await?
        }
        Commands::Show { client_id } => commands::show(&config, &client_id).await?,
    }

    Ok(())
}
