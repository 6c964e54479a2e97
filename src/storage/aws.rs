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

//! AWS S3 backend.
//!
//! Uploads are encrypted with SSE-KMS under the caller's key id and written
//! with plain overwrite semantics. Signing ignores the key: S3 resolves the
//! KMS key from the object's own metadata when the URL is dereferenced.

use async_trait::async_trait;
use http::Method;
use object_store::{Attribute, Attributes, ObjectStore, PutMode, PutOptions, PutPayload};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::config::{StorageConfig, StorageType};
use super::error::StorageResult;
use super::object_store::S3Connector;
use super::provider::{
    read_source_file, signing_window, string_to_path, BucketConnector, CloudStorageService,
    SignedUrl,
};

/// [`CloudStorageService`] implementation for AWS S3.
#[derive(Debug)]
pub struct AwsS3StorageService {
    connector: Arc<dyn BucketConnector>,
}

impl AwsS3StorageService {
    /// Create an S3 backend from configuration, using ambient AWS credentials
    /// unless static ones are given in the options.
    pub fn new(config: &StorageConfig) -> StorageResult<Self> {
        Ok(Self::with_connector(Arc::new(S3Connector::new(config)?)))
    }

    /// Create an S3 backend on top of an existing connector.
    pub fn with_connector(connector: Arc<dyn BucketConnector>) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl CloudStorageService for AwsS3StorageService {
    fn storage_type(&self) -> StorageType {
        StorageType::Aws
    }

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
        let client = self.connector.connect(bucket, Some(encryption_key))?;

        let mut attributes = Attributes::new();
        if !storage_class.is_empty() {
            attributes.insert(Attribute::StorageClass, storage_class.to_string().into());
        }
        let opts = PutOptions {
            mode: PutMode::Overwrite,
            attributes,
            ..Default::default()
        };

        client
            .store
            .put_opts(&location, PutPayload::from(payload), opts)
            .await?;

        info!(
            "File {} uploaded to bucket {} as {} (size={}, storage_class={})",
            file_path.display(),
            bucket,
            key,
            size,
            storage_class
        );
        Ok(())
    }

    async fn presigned_url(
        &self,
        bucket: &str,
        key: &str,
        minutes: i64,
        _encryption_key: &str,
    ) -> StorageResult<SignedUrl> {
        let (expires_in, expires_at) = signing_window(minutes)?;
        let location = string_to_path(key)?;
        let client = self.connector.connect(bucket, None)?;

        let url = client
            .signer
            .signed_url(Method::GET, &location, expires_in)
            .await?;

        info!("Presigned URL for s3://{}/{} valid for {} minutes", bucket, key, minutes);
        debug!("Presigned URL: {}", url);
        Ok(SignedUrl::new(url, expires_at))
    }
}
