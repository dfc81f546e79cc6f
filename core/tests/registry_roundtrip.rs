use std::sync::Arc;
use std::time::Duration;

use keybridge_core::keys::{load_rsa_public_key_der, parse_ecdsa_private_key};
use keybridge_core::{
    sign_payload, verify_payload, ClientKeyRegistry, Config, EcdsaCurve, Error, KeyLayout,
    MemoryStore,
};

const RSA_PUBLIC_PEM: &str = include_str!("fixtures/rsa_public.pem");
const EC_PRIVATE_PEM: &str = include_str!("fixtures/ec_private_sec1.pem");
const EC_PUBLIC_PEM: &str = include_str!("fixtures/ec_public.pem");
const EC_P384_PRIVATE_PEM: &str = include_str!("fixtures/ec_p384_private_sec1.pem");
const EC_P384_PUBLIC_PEM: &str = include_str!("fixtures/ec_p384_public.pem");

async fn alice_scenario(layout: KeyLayout) {
    let config = Config {
        layout,
        ..Config::default()
    };
    let registry = ClientKeyRegistry::new(Arc::new(MemoryStore::new()), &config);

    let rsa_der = load_rsa_public_key_der(RSA_PUBLIC_PEM.as_bytes()).unwrap();
    let ecdsa_der = keybridge_core::codec::extract_pem_block(EC_PUBLIC_PEM.as_bytes()).unwrap();

    registry
        .save_client_keys("alice", &rsa_der, &ecdsa_der, Duration::from_secs(60))
        .await
        .unwrap();

    // Byte-for-byte RSA, structurally equal ECDSA
    assert_eq!(registry.get_client_rsa_public_key_der("alice").await.unwrap(), rsa_der);
    let ecdsa = registry.get_client_ecdsa_public_key("alice").await.unwrap();
    let private = parse_ecdsa_private_key(EC_PRIVATE_PEM.as_bytes()).unwrap();
    assert_eq!(ecdsa, private.public_key());
    assert_eq!(ecdsa.to_der().unwrap(), ecdsa_der);

    // The stored key verifies the client's signatures
    let signature = sign_payload(&private, b"handshake transcript").unwrap();
    verify_payload(&ecdsa, b"handshake transcript", &signature).unwrap();

    tokio::time::advance(Duration::from_secs(61)).await;

    assert!(matches!(
        registry.get_client_rsa_public_key_der("alice").await,
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(
        registry.get_client_ecdsa_public_key("alice").await,
        Err(Error::NotFound { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_alice_combined_layout() {
    alice_scenario(KeyLayout::Combined).await;
}

#[tokio::test(start_paused = true)]
async fn test_alice_split_layout() {
    alice_scenario(KeyLayout::Split).await;
}

async fn p384_client_roundtrip(layout: KeyLayout) {
    let config = Config {
        layout,
        ..Config::default()
    };
    let registry = ClientKeyRegistry::new(Arc::new(MemoryStore::new()), &config);
    let rsa_der = load_rsa_public_key_der(RSA_PUBLIC_PEM.as_bytes()).unwrap();
    let ecdsa_der =
        keybridge_core::codec::extract_pem_block(EC_P384_PUBLIC_PEM.as_bytes()).unwrap();

    registry
        .save_client_keys("bob", &rsa_der, &ecdsa_der, Duration::from_secs(60))
        .await
        .unwrap();

    let ecdsa = registry.get_client_ecdsa_public_key("bob").await.unwrap();
    assert_eq!(ecdsa.curve(), EcdsaCurve::P384);
    assert_eq!(ecdsa.to_der().unwrap(), ecdsa_der);

    let private = parse_ecdsa_private_key(EC_P384_PRIVATE_PEM.as_bytes()).unwrap();
    let signature = sign_payload(&private, b"handshake transcript").unwrap();
    verify_payload(&ecdsa, b"handshake transcript", &signature).unwrap();
}

#[tokio::test]
async fn test_p384_client_combined_layout() {
    p384_client_roundtrip(KeyLayout::Combined).await;
}

#[tokio::test]
async fn test_p384_client_split_layout() {
    p384_client_roundtrip(KeyLayout::Split).await;
}

#[tokio::test(start_paused = true)]
async fn test_resave_extends_expiry() {
    let registry = ClientKeyRegistry::new(Arc::new(MemoryStore::new()), &Config::default());
    let rsa_der = load_rsa_public_key_der(RSA_PUBLIC_PEM.as_bytes()).unwrap();
    let ecdsa_der = keybridge_core::codec::extract_pem_block(EC_PUBLIC_PEM.as_bytes()).unwrap();

    registry
        .save_client_keys("alice", &rsa_der, &ecdsa_der, Duration::from_secs(60))
        .await
        .unwrap();
    tokio::time::advance(Duration::from_secs(50)).await;
    registry
        .save_client_keys("alice", &rsa_der, &ecdsa_der, Duration::from_secs(60))
        .await
        .unwrap();
    tokio::time::advance(Duration::from_secs(50)).await;

    assert!(registry.get_client_keys("alice").await.is_ok());
}

#[tokio::test]
async fn test_concurrent_saves_for_distinct_clients() {
    let registry = ClientKeyRegistry::new(Arc::new(MemoryStore::new()), &Config::default());
    let rsa_der = load_rsa_public_key_der(RSA_PUBLIC_PEM.as_bytes()).unwrap();
    let ecdsa_der = keybridge_core::codec::extract_pem_block(EC_PUBLIC_PEM.as_bytes()).unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let registry = registry.clone();
        let (rsa_der, ecdsa_der) = (rsa_der.clone(), ecdsa_der.clone());
        handles.push(tokio::spawn(async move {
            let client_id = format!("client-{i}");
            registry
                .save_client_keys(&client_id, &rsa_der, &ecdsa_der, Duration::from_secs(60))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for i in 0..16 {
        let record = registry.get_client_keys(&format!("client-{i}")).await.unwrap();
        assert_eq!(record.client_id, format!("client-{i}"));
    }
}
