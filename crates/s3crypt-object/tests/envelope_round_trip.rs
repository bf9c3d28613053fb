//! End-to-end upload and download against an in-memory store.

use std::sync::Arc;

use bytes::Bytes;
use object_store::memory::InMemory;
use s3crypt_crypto::cipher::{AesGcmContentCipherBuilder, GCM_KEY_SIZE, GCM_TAG_SIZE};
use s3crypt_crypto::wrap::AesGcmKeyWrap;
use s3crypt_crypto::{CryptoRegistry, Error as CryptoError};
use s3crypt_object::prelude::*;

const MASTER_KEY: [u8; GCM_KEY_SIZE] = [0x5A; GCM_KEY_SIZE];

fn store() -> ObjectStoreClient {
    ObjectStoreClient::new(InMemory::new())
}

fn encryption_client(store: &ObjectStoreClient, strategy: SaveStrategy) -> EncryptionClient {
    let wrap = AesGcmKeyWrap::new(&MASTER_KEY).unwrap();
    let builder = AesGcmContentCipherBuilder::new(Arc::new(wrap));
    EncryptionClient::new(store.clone(), Arc::new(builder)).with_save_strategy(strategy)
}

fn decryption_client(store: &ObjectStoreClient) -> DecryptionClient {
    let mut registry = CryptoRegistry::new();
    registry
        .register_aes_gcm_wrap(Arc::new(AesGcmKeyWrap::new(&MASTER_KEY).unwrap()))
        .unwrap();
    registry.register_aes_gcm_content_cipher().unwrap();
    DecryptionClient::new(store.clone(), registry).unwrap()
}

#[tokio::test]
async fn plain_upload_then_download() {
    let store = store();
    let key = ObjectKey::new("plain/hello.txt").unwrap();
    let body = Bytes::from_static(b"Hello world");

    let put = store.put(&key, body.clone(), Some("text/plain")).await.unwrap();
    assert_eq!(put.size, body.len());

    let get = store.get(&key).await.unwrap();
    assert_eq!(get.data, body);
    assert_eq!(get.len() as u64, get.meta.size);
}

#[tokio::test]
async fn encrypted_round_trip_is_byte_identical() {
    let payload: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();

    for strategy in [SaveStrategy::ObjectMetadata, SaveStrategy::InstructionFile] {
        let store = store();
        let key = ObjectKey::new("data/blob.bin").unwrap();

        let put = encryption_client(&store, strategy)
            .put(&key, Bytes::from(payload.clone()), None)
            .await
            .unwrap();
        assert_eq!(put.size, payload.len() + GCM_TAG_SIZE);

        let get = decryption_client(&store).get(&key).await.unwrap();
        assert_eq!(get.data.as_ref(), payload.as_slice());
        assert_eq!(get.len(), payload.len());
    }
}

#[tokio::test]
async fn each_upload_uses_a_new_data_key() {
    let store = store();
    let client = encryption_client(&store, SaveStrategy::ObjectMetadata);
    let first = ObjectKey::new("a").unwrap();
    let second = ObjectKey::new("b").unwrap();

    client.put(&first, Bytes::from_static(b"same"), None).await.unwrap();
    client.put(&second, Bytes::from_static(b"same"), None).await.unwrap();

    let first = store.get(&first).await.unwrap();
    let second = store.get(&second).await.unwrap();
    assert_ne!(first.data, second.data);
    assert_ne!(
        first.metadata.get("x-amz-key-v2"),
        second.metadata.get("x-amz-key-v2")
    );
}

#[tokio::test]
async fn plain_object_cannot_be_decrypted() {
    let store = store();
    let key = ObjectKey::new("plain.txt").unwrap();
    store.put(&key, Bytes::from_static(b"x"), None).await.unwrap();

    let err = decryption_client(&store).get(&key).await.unwrap_err();
    assert!(matches!(err, Error::MissingEnvelope(_)));
}

#[tokio::test]
async fn decrypting_a_missing_object() {
    let store = store();
    let key = ObjectKey::new("nope").unwrap();

    let err = decryption_client(&store).get(&key).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn registry_without_local_wrap_rejects_object() {
    let store = store();
    let key = ObjectKey::new("k").unwrap();
    encryption_client(&store, SaveStrategy::ObjectMetadata)
        .put(&key, Bytes::from_static(b"secret"), None)
        .await
        .unwrap();

    let mut registry = CryptoRegistry::new();
    registry
        .add_wrap(
            "kms",
            Arc::new(AesGcmKeyWrap::new(&MASTER_KEY).unwrap()),
        )
        .unwrap();
    registry.register_aes_gcm_content_cipher().unwrap();

    let err = DecryptionClient::new(store, registry)
        .unwrap()
        .get(&key)
        .await
        .unwrap_err();
    match err {
        Error::Crypto(err) => {
            assert!(err.is_unsupported_algorithm());
            assert!(matches!(err, CryptoError::InvalidWrapAlgorithm(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}
