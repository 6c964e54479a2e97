// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.
//
// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! Google Cloud Storage backend.
//!
//! Writes use optimistic concurrency on the object generation: the current
//! object state is read first, and the write is sent with either a
//! "must not exist" or a "generation must match" precondition. GCS is the sole
//! arbiter of conflicts; a lost race surfaces as
//! [`StorageError::PreconditionConflict`](crate::storage::StorageError::PreconditionConflict)
//! and is never retried here.
//!
//! The encryption key reference is stored as the `kmsKeyName` custom metadata
//! entry. It labels the object; it does not make GCS encrypt with that key.

use async_trait::async_trait;
use http::Method;
use object_store::path::Path as ObjectPath;
use object_store::{
    Attribute, Attributes, GetOptions, ObjectMeta, ObjectStore, ObjectStoreExt, PutMode,
    PutOptions, PutPayload, UpdateVersion,
};
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::config::{StorageConfig, StorageType};
use super::error::StorageResult;
use super::object_store::GcsConnector;
use super::provider::{
    read_source_file, signing_window, string_to_path, BucketConnector, CloudStorageService,
    SignedUrl,
};

/// Custom metadata entry holding the encryption key reference.
pub const KMS_KEY_METADATA: &str = "kmsKeyName";

/// The version tokens observed for an existing object.
///
/// GCS reports the generation as the object version; stores without
/// generations (such as the in-memory store) only provide an entity tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectGeneration {
    pub generation: Option<String>,
    pub e_tag: Option<String>,
}

impl From<&ObjectMeta> for ObjectGeneration {
    fn from(meta: &ObjectMeta) -> Self {
        Self {
            generation: meta.version.clone(),
            e_tag: meta.e_tag.clone(),
        }
    }
}

impl Display for ObjectGeneration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.generation, &self.e_tag) {
            (Some(generation), _) => write!(f, "generation={}", generation),
            (None, Some(e_tag)) => write!(f, "etag={}", e_tag),
            (None, None) => f.write_str("unversioned"),
        }
    }
}

/// Precondition attached to a GCS write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WritePrecondition {
    /// The object must not exist yet.
    DoesNotExist,
    /// The object must still be at the observed generation.
    GenerationMatch(ObjectGeneration),
}

impl From<WritePrecondition> for PutMode {
    fn from(precondition: WritePrecondition) -> Self {
        match precondition {
            WritePrecondition::DoesNotExist => PutMode::Create,
            WritePrecondition::GenerationMatch(observed) => PutMode::Update(UpdateVersion {
                e_tag: observed.e_tag,
                version: observed.generation,
            }),
        }
    }
}

/// [`CloudStorageService`] implementation for Google Cloud Storage.
#[derive(Debug)]
pub struct GcsStorageService {
    connector: Arc<dyn BucketConnector>,
    project_id: Option<String>,
}

impl GcsStorageService {
    /// Create a GCS backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CredentialsError`](crate::storage::StorageError::CredentialsError)
    /// if the service account key is missing, unreadable or malformed.
    pub fn new(config: &StorageConfig) -> StorageResult<Self> {
        let connector = GcsConnector::new(config)?;
        let project_id = connector.project_id().map(str::to_string);
        info!(
            "GCS backend ready (project={}, service_account={})",
            project_id.as_deref().unwrap_or("<from key>"),
            connector.client_email()
        );
        Ok(Self {
            connector: Arc::new(connector),
            project_id,
        })
    }

    /// Create a GCS backend on top of an existing connector.
    pub fn with_connector(connector: Arc<dyn BucketConnector>, project_id: Option<String>) -> Self {
        Self {
            connector,
            project_id,
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Read the current object state and derive the write precondition.
    pub(crate) async fn resolve_precondition(
        store: &Arc<dyn ObjectStore>,
        location: &ObjectPath,
    ) -> StorageResult<WritePrecondition> {
        match store.head(location).await {
            Ok(meta) => Ok(WritePrecondition::GenerationMatch(ObjectGeneration::from(
                &meta,
            ))),
            Err(object_store::Error::NotFound { .. }) => Ok(WritePrecondition::DoesNotExist),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the payload under `precondition`, tagging it with the key reference.
    pub(crate) async fn write_object(
        store: &Arc<dyn ObjectStore>,
        location: &ObjectPath,
        payload: Vec<u8>,
        precondition: WritePrecondition,
        encryption_key: &str,
    ) -> StorageResult<()> {
        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::Metadata(KMS_KEY_METADATA.into()),
            encryption_key.to_string().into(),
        );
        let opts = PutOptions {
            mode: precondition.into(),
            attributes,
            ..Default::default()
        };

        store
            .put_opts(location, PutPayload::from(payload), opts)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CloudStorageService for GcsStorageService {
    fn storage_type(&self) -> StorageType {
        StorageType::Gcs
    }

    /// Upload with a generation precondition.
    ///
    /// `storage_class` is not applied; objects take the bucket's default class.
    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        file_path: &Path,
        encryption_key: &str,
        storage_class: &str,
    ) -> StorageResult<()> {
        let location = string_to_path(key)?;
        let payload = read_source_file(file_path).await?;
        let size = payload.len();
        let client = self.connector.connect(bucket, None)?;

        let precondition = Self::resolve_precondition(&client.store, &location).await?;
        match &precondition {
            WritePrecondition::DoesNotExist => {
                debug!("gs://{}/{} does not exist, writing with create-only", bucket, key)
            }
            WritePrecondition::GenerationMatch(observed) => {
                debug!("gs://{}/{} exists, writing with {}", bucket, key, observed)
            }
        }
        if !storage_class.is_empty() {
            debug!("Storage class {} not applied on GCS", storage_class);
        }

        Self::write_object(
            &client.store,
            &location,
            payload,
            precondition,
            encryption_key,
        )
        .await?;

        info!(
            "File {} uploaded to bucket {} as {} (size={})",
            file_path.display(),
            bucket,
            key,
            size
        );
        Ok(())
    }

    async fn presigned_url(
        &self,
        bucket: &str,
        key: &str,
        minutes: i64,
        encryption_key: &str,
    ) -> StorageResult<SignedUrl> {
        let (expires_in, expires_at) = signing_window(minutes)?;
        let location = string_to_path(key)?;
        let client = self.connector.connect(bucket, None)?;

        let stored_key = client
            .store
            .get_opts(
                &location,
                GetOptions {
                    head: true,
                    ..Default::default()
                },
            )
            .await?
            .attributes
            .get(&Attribute::Metadata(KMS_KEY_METADATA.into()))
            .map(|value| AsRef::<str>::as_ref(value).to_string());
        if stored_key.as_deref() != Some(encryption_key) {
            warn!(
                "gs://{}/{} has {}={:?}, which does not match the supplied key reference",
                bucket, key, KMS_KEY_METADATA, stored_key
            );
        }

        let url = client
            .signer
            .signed_url(Method::GET, &location, expires_in)
            .await?;

        info!("Generated GET signed URL for gs://{}/{} valid for {} minutes", bucket, key, minutes);
        debug!("Signed URL: {}", url);
        Ok(SignedUrl::new(url, expires_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::error::StorageError;
    use crate::storage::testing::{source_file, MemoryConnector};

    fn service() -> (GcsStorageService, Arc<MemoryConnector>) {
        let connector = Arc::new(MemoryConnector::new());
        (
            GcsStorageService::with_connector(connector.clone(), Some("demo-project".to_string())),
            connector,
        )
    }

    async fn stored_bytes(connector: &MemoryConnector, bucket: &str, key: &str) -> Vec<u8> {
        connector
            .bucket(bucket)
            .get(&string_to_path(key).unwrap())
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_precondition_into_put_mode() {
        assert!(matches!(
            PutMode::from(WritePrecondition::DoesNotExist),
            PutMode::Create
        ));

        let observed = ObjectGeneration {
            generation: Some("1712345678901234".to_string()),
            e_tag: Some("CJ+Bq5r8/4QDEAE=".to_string()),
        };
        match PutMode::from(WritePrecondition::GenerationMatch(observed)) {
            PutMode::Update(version) => {
                assert_eq!(version.version.as_deref(), Some("1712345678901234"));
                assert_eq!(version.e_tag.as_deref(), Some("CJ+Bq5r8/4QDEAE="));
            }
            other => panic!("Expected PutMode::Update, got {:?}", other),
        }
    }

    #[test]
    fn test_object_generation_display() {
        let generation = ObjectGeneration {
            generation: Some("42".to_string()),
            e_tag: Some("abc".to_string()),
        };
        assert_eq!(generation.to_string(), "generation=42");

        let etag_only = ObjectGeneration {
            generation: None,
            e_tag: Some("abc".to_string()),
        };
        assert_eq!(etag_only.to_string(), "etag=abc");
    }

    #[tokio::test]
    async fn test_upload_new_object_tags_key_reference() {
        let (service, connector) = service();
        let file = source_file(b"hello gcs");

        service
            .upload_object("test-bucket", "report1.txt", file.path(), "key-123", "STANDARD")
            .await
            .unwrap();

        let stored = connector
            .bucket("test-bucket")
            .get(&string_to_path("report1.txt").unwrap())
            .await
            .unwrap();
        assert_eq!(
            stored
                .attributes
                .get(&Attribute::Metadata(KMS_KEY_METADATA.into()))
                .map(AsRef::<str>::as_ref),
            Some("key-123")
        );
        assert!(stored.attributes.get(&Attribute::StorageClass).is_none());
        assert_eq!(stored.bytes().await.unwrap().as_ref(), b"hello gcs");
    }

    #[tokio::test]
    async fn test_upload_never_passes_encryption_to_client() {
        let (service, connector) = service();
        let file = source_file(b"hello gcs");

        service
            .upload_object("test-bucket", "a.txt", file.path(), "key-123", "STANDARD")
            .await
            .unwrap();

        assert_eq!(
            connector.connections(),
            vec![("test-bucket".to_string(), None)]
        );
    }

    #[tokio::test]
    async fn test_resolve_precondition() {
        let (service, connector) = service();
        let store: Arc<dyn ObjectStore> = connector.bucket("test-bucket");
        let location = string_to_path("a.txt").unwrap();

        let absent = GcsStorageService::resolve_precondition(&store, &location)
            .await
            .unwrap();
        assert_eq!(absent, WritePrecondition::DoesNotExist);

        let file = source_file(b"v1");
        service
            .upload_object("test-bucket", "a.txt", file.path(), "key-123", "STANDARD")
            .await
            .unwrap();

        let present = GcsStorageService::resolve_precondition(&store, &location)
            .await
            .unwrap();
        assert!(matches!(present, WritePrecondition::GenerationMatch(_)));
    }

    #[tokio::test]
    async fn test_second_upload_matches_generation() {
        let (service, connector) = service();
        let first = source_file(b"v1");
        let second = source_file(b"v2");

        service
            .upload_object("test-bucket", "a.txt", first.path(), "key-123", "STANDARD")
            .await
            .unwrap();
        service
            .upload_object("test-bucket", "a.txt", second.path(), "key-123", "STANDARD")
            .await
            .unwrap();

        assert_eq!(stored_bytes(&connector, "test-bucket", "a.txt").await, b"v2");
    }

    #[tokio::test]
    async fn test_interleaved_writer_is_a_conflict() {
        let (service, connector) = service();
        let store: Arc<dyn ObjectStore> = connector.bucket("test-bucket");
        let location = string_to_path("a.txt").unwrap();

        let first = source_file(b"v1");
        service
            .upload_object("test-bucket", "a.txt", first.path(), "key-123", "STANDARD")
            .await
            .unwrap();

        // Observe the generation, then let another writer get in first.
        let stale = GcsStorageService::resolve_precondition(&store, &location)
            .await
            .unwrap();
        let other = source_file(b"other writer");
        service
            .upload_object("test-bucket", "a.txt", other.path(), "key-123", "STANDARD")
            .await
            .unwrap();

        let err = GcsStorageService::write_object(
            &store,
            &location,
            b"late write".to_vec(),
            stale,
            "key-123",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StorageError::PreconditionConflict(_)));
        assert!(err.is_retryable());
        assert_eq!(
            stored_bytes(&connector, "test-bucket", "a.txt").await,
            b"other writer"
        );
    }

    #[tokio::test]
    async fn test_concurrent_create_is_a_conflict() {
        let (service, connector) = service();
        let store: Arc<dyn ObjectStore> = connector.bucket("test-bucket");
        let location = string_to_path("a.txt").unwrap();

        // Both writers observe "absent"; only the first create wins.
        let observed = GcsStorageService::resolve_precondition(&store, &location)
            .await
            .unwrap();
        assert_eq!(observed, WritePrecondition::DoesNotExist);

        let winner = source_file(b"winner");
        service
            .upload_object("test-bucket", "a.txt", winner.path(), "key-123", "STANDARD")
            .await
            .unwrap();

        let err = GcsStorageService::write_object(
            &store,
            &location,
            b"loser".to_vec(),
            observed,
            "key-123",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StorageError::PreconditionConflict(_)));
        assert_eq!(stored_bytes(&connector, "test-bucket", "a.txt").await, b"winner");
    }

    #[tokio::test]
    async fn test_upload_missing_file_creates_nothing() {
        let (service, connector) = service();

        let err = service
            .upload_object(
                "test-bucket",
                "report1.txt",
                Path::new("/no/such/report1.txt"),
                "key-123",
                "STANDARD",
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::IoError(_)));
        assert!(connector.connections().is_empty());
        let head = connector
            .bucket("test-bucket")
            .head(&string_to_path("report1.txt").unwrap())
            .await;
        assert!(matches!(head, Err(object_store::Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_keys_that_would_be_rewritten_are_rejected() {
        let (service, connector) = service();
        let file = source_file(b"payload");

        for key in ["/reports/a.txt", "reports//a.txt", "reports/a.txt/", "a/../b.txt"] {
            let err = service
                .upload_object("test-bucket", key, file.path(), "key-123", "")
                .await
                .unwrap_err();
            assert!(matches!(err, StorageError::InvalidObjectKey(_)), "{}", key);

            let err = service
                .presigned_url("test-bucket", key, 5, "key-123")
                .await
                .unwrap_err();
            assert!(matches!(err, StorageError::InvalidObjectKey(_)), "{}", key);
        }

        assert!(connector.connections().is_empty());
        let head = connector
            .bucket("test-bucket")
            .head(&ObjectPath::from("reports/a.txt"))
            .await;
        assert!(matches!(head, Err(object_store::Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_upload_then_sign() {
        let (service, connector) = service();
        let file = source_file(b"signed content");

        service
            .upload_object("test-bucket", "report1.txt", file.path(), "key-123", "STANDARD")
            .await
            .unwrap();
        let signed = service
            .presigned_url("test-bucket", "report1.txt", 60, "key-123")
            .await
            .unwrap();

        assert!(signed.as_str().contains("test-bucket"));
        assert!(signed.as_str().contains("report1.txt"));
        assert!(signed.as_str().contains("expires=3600"));
        assert_eq!(
            stored_bytes(&connector, "test-bucket", "report1.txt").await,
            b"signed content"
        );
    }

    #[tokio::test]
    async fn test_sign_missing_object_is_not_found() {
        let (service, _) = service();

        let err = service
            .presigned_url("test-bucket", "missing.txt", 60, "key-123")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_sign_with_different_key_reference_still_signs() {
        let (service, _) = service();
        let file = source_file(b"content");

        service
            .upload_object("test-bucket", "a.txt", file.path(), "key-123", "STANDARD")
            .await
            .unwrap();
        let signed = service
            .presigned_url("test-bucket", "a.txt", 1, "key-456")
            .await
            .unwrap();
        assert!(signed.as_str().contains("a.txt"));
    }

    #[tokio::test]
    async fn test_presign_rejects_non_positive_minutes() {
        let (service, connector) = service();

        let err = service
            .presigned_url("test-bucket", "a.txt", 0, "key-123")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidDuration(0)));
        assert!(connector.connections().is_empty());
    }

    #[test]
    fn test_storage_type_and_project() {
        let (service, _) = service();
        assert_eq!(service.storage_type(), StorageType::Gcs);
        assert_eq!(service.project_id(), Some("demo-project"));
    }
}
