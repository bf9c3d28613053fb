//! Plain object-store client backed by [`object_store::ObjectStore`].
//!
//! [`ObjectStoreClient`] is a thin, cloneable wrapper around
//! `Arc<dyn ObjectStore>` that provides the handful of operations the
//! encryption layer needs: put with user metadata, get with user metadata,
//! head, and delete. Every public method is instrumented with [`tracing`].

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use object_store::{
    Attribute, AttributeValue, Attributes, ObjectMeta, ObjectStore, PutMode, PutOptions,
    PutPayload,
};

use crate::Result;
use crate::types::ObjectKey;

mod get_output;
mod put_output;

pub use get_output::GetOutput;
pub use put_output::PutOutput;

/// Cloneable handle to any [`ObjectStore`] backend (S3, in-memory, ...).
#[derive(Clone, Debug)]
pub struct ObjectStoreClient(pub Arc<dyn ObjectStore>);

impl ObjectStoreClient {
    /// Wrap a concrete [`ObjectStore`] implementation.
    pub fn new(store: impl ObjectStore) -> Self {
        Self(Arc::new(store))
    }

    /// Retrieve the bytes, content-type, user metadata and object metadata
    /// stored at `key`.
    #[tracing::instrument(name = "object.get", skip(self), fields(key = %key))]
    pub async fn get(&self, key: &ObjectKey) -> Result<GetOutput> {
        let result = self.0.get(key.to_path()).await?;
        let meta = result.meta.clone();

        let mut content_type = None;
        let mut metadata = BTreeMap::new();
        for (attribute, value) in result.attributes.iter() {
            match attribute {
                Attribute::ContentType => content_type = Some(value.to_string()),
                Attribute::Metadata(name) => {
                    metadata.insert(name.to_lowercase(), value.to_string());
                }
                _ => {}
            }
        }

        let data = result.bytes().await?;
        Ok(GetOutput {
            data,
            content_type,
            metadata,
            meta,
        })
    }

    /// Upload `data` to `key`, optionally setting the content-type.
    pub async fn put(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<PutOutput> {
        self.put_with_metadata(key, data, content_type, &[]).await
    }

    /// Upload `data` to `key` with user metadata entries.
    #[tracing::instrument(
        name = "object.put",
        skip(self, data, metadata),
        fields(key = %key, size = data.len(), metadata = metadata.len())
    )]
    pub async fn put_with_metadata(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: Option<&str>,
        metadata: &[(&str, String)],
    ) -> Result<PutOutput> {
        let size = data.len();
        let mut attributes = Attributes::new();
        if let Some(ct) = content_type {
            attributes.insert(Attribute::ContentType, AttributeValue::from(ct.to_owned()));
        }
        for (name, value) in metadata {
            attributes.insert(
                Attribute::Metadata(Cow::Owned((*name).to_owned())),
                AttributeValue::from(value.clone()),
            );
        }

        let opts = PutOptions {
            mode: PutMode::Overwrite,
            attributes,
            ..Default::default()
        };
        let result = self
            .0
            .put_opts(key.to_path(), PutPayload::from(data), opts)
            .await?;
        Ok(PutOutput::new(result, size))
    }

    /// Get object metadata without downloading the body.
    #[tracing::instrument(name = "object.head", skip(self), fields(key = %key))]
    pub async fn head(&self, key: &ObjectKey) -> Result<ObjectMeta> {
        Ok(self.0.head(key.to_path()).await?)
    }

    /// Delete the object at `key`.
    #[tracing::instrument(name = "object.delete", skip(self), fields(key = %key))]
    pub async fn delete(&self, key: &ObjectKey) -> Result<()> {
        Ok(self.0.delete(key.to_path()).await?)
    }
}

#[cfg(test)]
mod tests {
    use object_store::memory::InMemory;
    use object_store::path::Path;

    use super::*;
    use crate::Error;

    fn test_client() -> ObjectStoreClient {
        ObjectStoreClient::new(InMemory::new())
    }

    fn key(raw: &str) -> ObjectKey {
        ObjectKey::new(raw).unwrap()
    }

    #[tokio::test]
    async fn put_and_get() {
        let client = test_client();
        let data = Bytes::from("hello world");
        let put = client
            .put(&key("test.txt"), data.clone(), Some("text/plain"))
            .await
            .unwrap();
        assert_eq!(put.size, data.len());

        let result = client.get(&key("test.txt")).await.unwrap();
        assert_eq!(result.data, data);
        assert_eq!(result.content_type.as_deref(), Some("text/plain"));
        assert!(result.metadata.is_empty());
    }

    #[tokio::test]
    async fn metadata_round_trip() {
        let client = test_client();
        client
            .put_with_metadata(
                &key("meta.bin"),
                Bytes::from("abc"),
                None,
                &[("x-amz-iv", "AAAA".to_owned()), ("owner", "ops".to_owned())],
            )
            .await
            .unwrap();

        let result = client.get(&key("meta.bin")).await.unwrap();
        assert_eq!(result.metadata.get("x-amz-iv").map(String::as_str), Some("AAAA"));
        assert_eq!(result.metadata.get("owner").map(String::as_str), Some("ops"));
        assert_eq!(result.meta.size, 3);
        assert_eq!(result.meta.location, Path::from("meta.bin"));
    }

    #[tokio::test]
    async fn keys_reach_the_store_unchanged() {
        let client = test_client();
        for raw in ["notes#1.txt", "docs/[draft].txt", "x~y"] {
            client
                .put(&key(raw), Bytes::from("x"), None)
                .await
                .unwrap();

            let result = client.get(&key(raw)).await.unwrap();
            assert_eq!(result.meta.location.as_ref(), raw);
        }
    }

    #[tokio::test]
    async fn put_returns_etag() {
        let client = test_client();
        let result = client
            .put(&key("etag.bin"), Bytes::from("x"), None)
            .await
            .unwrap();
        assert!(result.e_tag.is_some());
    }

    #[tokio::test]
    async fn head() {
        let client = test_client();
        client
            .put(&key("head.bin"), Bytes::from("data"), None)
            .await
            .unwrap();

        let meta = client.head(&key("head.bin")).await.unwrap();
        assert_eq!(meta.size, 4);
    }

    #[tokio::test]
    async fn get_not_found() {
        let client = test_client();
        let err = client.get(&key("missing")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn delete() {
        let client = test_client();
        client
            .put(&key("del.bin"), Bytes::from("x"), None)
            .await
            .unwrap();
        client.delete(&key("del.bin")).await.unwrap();

        assert!(client.get(&key("del.bin")).await.is_err());
    }
}
