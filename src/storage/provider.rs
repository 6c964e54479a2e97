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

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::ObjectStore;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::config::StorageType;
use super::error::{StorageError, StorageResult};

/// A time-limited URL granting read access to one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    url: Url,
    expires_at: DateTime<Utc>,
}

impl SignedUrl {
    pub fn new(url: Url, expires_at: DateTime<Utc>) -> Self {
        Self { url, expires_at }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Issue time plus the requested validity window.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    pub fn into_url(self) -> Url {
        self.url
    }
}

impl Display for SignedUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.url, f)
    }
}

/// Unified interface over the cloud object stores.
///
/// Both backends accept the same arguments, but the encryption key reference
/// is interpreted per provider:
///
/// * AWS S3: the id of the KMS key used for server-side encryption.
/// * GCS: stored as the `kmsKeyName` custom metadata entry only. This is a
///   label on the object, not an encryption directive.
#[async_trait]
pub trait CloudStorageService: Send + Sync {
    /// Which provider this backend talks to.
    fn storage_type(&self) -> StorageType;

    /// Upload a local file to `bucket`/`key`.
    ///
    /// # Arguments
    ///
    /// * `bucket` - The destination bucket
    /// * `key` - The object key, passed to the provider as-is
    /// * `file_path` - Local file to upload, read fully before any remote call
    /// * `encryption_key` - Provider-specific encryption key reference
    /// * `storage_class` - Storage class tag, applied where the backend supports it
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The local file cannot be read ([`StorageError::IoError`])
    /// * The provider rejects the write (not found, permission denied, ...)
    /// * A conditional write lost a race ([`StorageError::PreconditionConflict`])
    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        file_path: &Path,
        encryption_key: &str,
        storage_class: &str,
    ) -> StorageResult<()>;

    /// Generate a signed GET URL for `bucket`/`key`, valid for `minutes`.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * `minutes` is not positive ([`StorageError::InvalidDuration`])
    /// * The provider cannot sign the request (missing credentials, unknown object)
    async fn presigned_url(
        &self,
        bucket: &str,
        key: &str,
        minutes: i64,
        encryption_key: &str,
    ) -> StorageResult<SignedUrl>;
}

impl Debug for dyn CloudStorageService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "CloudStorageService(provider={})", self.storage_type())
    }
}

/// Handles for one bucket: an object store for writes and reads, and a
/// signer for query-string authentication.
#[derive(Debug, Clone)]
pub struct BucketClient {
    pub store: Arc<dyn ObjectStore>,
    pub signer: Arc<dyn Signer>,
}

/// Creates bucket-scoped clients from a backend's long-lived configuration.
///
/// `object_store` clients are bound to a single bucket while the service takes
/// the bucket per call, so backends hold a connector and ask it for a client
/// on each request.
pub trait BucketConnector: Send + Sync + Debug {
    /// Connect to `bucket`. When `encryption_key` is set, writes through the
    /// returned client are encrypted server-side under that key.
    fn connect(&self, bucket: &str, encryption_key: Option<&str>) -> StorageResult<BucketClient>;
}

/// Convert an object key into an `ObjectPath` without altering it.
///
/// Keys that `object_store` would only accept after rewriting (a leading or
/// trailing `/`, empty segments, `.` or `..` segments) are rejected with
/// [`StorageError::InvalidObjectKey`] instead of being sent under another name.
pub(crate) fn string_to_path(key: &str) -> StorageResult<ObjectPath> {
    match ObjectPath::parse(key) {
        Ok(path) if path.as_ref() == key => Ok(path),
        Ok(path) => Err(StorageError::InvalidObjectKey(format!(
            "{:?} would be stored as {:?}",
            key,
            path.as_ref()
        ))),
        Err(e) => Err(StorageError::InvalidObjectKey(format!("{:?}: {}", key, e))),
    }
}

/// Validate a signing window given in minutes.
pub(crate) fn signing_window(minutes: i64) -> StorageResult<(Duration, DateTime<Utc>)> {
    if minutes <= 0 {
        return Err(StorageError::InvalidDuration(minutes));
    }
    let seconds = (minutes as u64)
        .checked_mul(60)
        .ok_or(StorageError::InvalidDuration(minutes))?;
    let expires_at = chrono::Duration::try_minutes(minutes)
        .and_then(|window| Utc::now().checked_add_signed(window))
        .ok_or(StorageError::InvalidDuration(minutes))?;
    Ok((Duration::from_secs(seconds), expires_at))
}

/// Read the whole source file for an upload.
pub(crate) async fn read_source_file(file_path: &Path) -> StorageResult<Vec<u8>> {
    Ok(tokio::fs::read(file_path).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_path() {
        let object_path = string_to_path("reports/2024/report1.txt").unwrap();
        assert_eq!(object_path.as_ref(), "reports/2024/report1.txt");
    }

    #[test]
    fn test_string_to_path_empty() {
        let object_path = string_to_path("").unwrap();
        assert_eq!(object_path.as_ref(), "");
    }

    #[test]
    fn test_string_to_path_keeps_special_characters() {
        for key in ["reports/q1 summary.txt", "a-b_c.d/e=f+g", "été/ü.txt"] {
            let object_path = string_to_path(key).unwrap();
            assert_eq!(object_path.as_ref(), key);
        }
    }

    #[test]
    fn test_string_to_path_rejects_rewritten_keys() {
        for key in [
            "/reports/a.txt",
            "reports//a.txt",
            "reports/a.txt/",
            "a/../b.txt",
            "./a.txt",
        ] {
            let err = string_to_path(key).unwrap_err();
            assert!(
                matches!(err, StorageError::InvalidObjectKey(_)),
                "{} gave {:?}",
                key,
                err
            );
        }
    }

    #[test]
    fn test_signing_window() {
        let before = Utc::now();
        let (duration, expires_at) = signing_window(60).unwrap();
        assert_eq!(duration, Duration::from_secs(3600));
        assert!(expires_at >= before + chrono::Duration::minutes(60));
        assert!(expires_at <= Utc::now() + chrono::Duration::minutes(60));
    }

    #[test]
    fn test_signing_window_rejects_out_of_range() {
        for minutes in [0, -1, i64::MIN, i64::MAX] {
            let err = signing_window(minutes).unwrap_err();
            assert!(matches!(err, StorageError::InvalidDuration(m) if m == minutes));
        }
    }

    #[test]
    fn test_signed_url_accessors() {
        let url = Url::parse("https://test-bucket.s3.amazonaws.com/report1.txt?X-Amz-Expires=3600")
            .unwrap();
        let expires_at = Utc::now() + chrono::Duration::minutes(5);
        let signed = SignedUrl::new(url.clone(), expires_at);

        assert_eq!(signed.url(), &url);
        assert_eq!(signed.as_str(), url.as_str());
        assert_eq!(signed.to_string(), url.to_string());
        assert_eq!(signed.expires_at(), expires_at);
        assert!(!signed.is_expired());
        assert_eq!(signed.into_url(), url);
    }

    #[test]
    fn test_signed_url_expired() {
        let url = Url::parse("https://storage.googleapis.com/test-bucket/report1.txt").unwrap();
        let signed = SignedUrl::new(url, Utc::now() - chrono::Duration::seconds(1));
        assert!(signed.is_expired());
    }

    #[tokio::test]
    async fn test_read_source_file_missing() {
        let err = read_source_file(Path::new("/definitely/not/here.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::IoError(_)));
    }
}
