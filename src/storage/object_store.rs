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

//! `object_store` backed bucket connectors for AWS S3 and GCS.

use object_store::{aws::AmazonS3Builder, gcp::GoogleCloudStorageBuilder, ClientOptions};
use serde::Deserialize;
use std::fmt::{Debug, Formatter};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::config::StorageConfig;
use super::error::{StorageError, StorageResult};
use super::provider::{BucketClient, BucketConnector};

/// Build connection options from configuration.
///
/// # Arguments
///
/// * `config` - Storage configuration with optional timeout and connection settings
///
/// # Returns
///
/// A `ClientOptions` instance configured with timeout and connection settings from the config.
fn build_connection_options(config: &StorageConfig) -> ClientOptions {
    let mut client_options = ClientOptions::default();
    if let Some(timeout_str) = config.options.get("timeout") {
        if timeout_str == "0" || timeout_str == "disabled" {
            client_options = client_options.with_timeout_disabled();
        } else if let Ok(sec) = timeout_str.parse::<u64>() {
            client_options = client_options.with_timeout(Duration::from_secs(sec))
        }
    };
    if let Some(connect_timeout_str) = config.options.get("connect_timeout") {
        if connect_timeout_str == "0" || connect_timeout_str == "disabled" {
            client_options = client_options.with_connect_timeout_disabled();
        } else if let Ok(sec) = connect_timeout_str.parse::<u64>() {
            client_options = client_options.with_connect_timeout(Duration::from_secs(sec))
        }
    }
    if let Some(pool_idle_timeout_str) = config.options.get("pool_idle_timeout") {
        if let Ok(sec) = pool_idle_timeout_str.parse::<u64>() {
            client_options = client_options.with_pool_idle_timeout(Duration::from_secs(sec))
        }
    }
    if let Some(pool_max_idle_per_host_str) = config.options.get("pool_max_idle_per_host") {
        if let Ok(max_idle) = pool_max_idle_per_host_str.parse::<usize>() {
            client_options = client_options.with_pool_max_idle_per_host(max_idle)
        }
    }
    client_options
}

fn is_connection_option(key: &str) -> bool {
    matches!(
        key,
        "timeout" | "connect_timeout" | "pool_idle_timeout" | "pool_max_idle_per_host"
    )
}

/// Connector for AWS S3.
///
/// Credentials come from the options when given, otherwise from the ambient
/// AWS environment (`AWS_ACCESS_KEY_ID`, `AWS_REGION`, web identity, ...).
#[derive(Debug, Clone)]
pub struct S3Connector {
    builder: AmazonS3Builder,
}

impl S3Connector {
    /// Create an S3 connector from configuration.
    ///
    /// No network traffic happens here; the bucket client is built per call.
    pub fn new(config: &StorageConfig) -> StorageResult<Self> {
        let mut builder =
            AmazonS3Builder::from_env().with_client_options(build_connection_options(config));

        for (key, value) in &config.options {
            match key.as_str() {
                "region" => builder = builder.with_region(value),
                "access_key_id" => builder = builder.with_access_key_id(value),
                "secret_access_key" => builder = builder.with_secret_access_key(value),
                "session_token" | "token" => builder = builder.with_token(value),
                "endpoint" => builder = builder.with_endpoint(value),
                "allow_http" => {
                    if value.to_lowercase() == "true" {
                        builder = builder.with_allow_http(true);
                    }
                }
                "bucket_key" => builder = builder.with_bucket_key(value.to_lowercase() == "true"),
                k if is_connection_option(k) => (),
                _ => warn!("Unknown AWS S3 option: {}", key),
            }
        }

        Ok(Self { builder })
    }
}

impl BucketConnector for S3Connector {
    fn connect(&self, bucket: &str, encryption_key: Option<&str>) -> StorageResult<BucketClient> {
        let mut builder = self.builder.clone().with_bucket_name(bucket);
        if let Some(kms_key_id) = encryption_key {
            builder = builder.with_sse_kms_encryption(kms_key_id);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to create S3 store: {}", e)))?;
        debug!(
            "Connected to s3://{} (sse_kms={})",
            bucket,
            encryption_key.is_some()
        );

        let store = Arc::new(store);
        Ok(BucketClient {
            store: store.clone(),
            signer: store,
        })
    }
}

/// The fields of a service account key file this crate relies on.
#[derive(Deserialize)]
struct ServiceAccountKey {
    #[serde(rename = "type")]
    key_type: Option<String>,
    project_id: Option<String>,
    client_email: String,
    // Only required to be present; signing reads it from the raw key.
    #[serde(rename = "private_key")]
    _private_key: String,
}

/// Connector for Google Cloud Storage.
///
/// Holds a validated service account key. V4 URL signing needs the key's
/// private key, so other credential types are rejected up front.
#[derive(Clone)]
pub struct GcsConnector {
    service_account_key: String,
    client_email: String,
    project_id: Option<String>,
    client_options: ClientOptions,
}

impl GcsConnector {
    /// Create a GCS connector from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CredentialsError`] if:
    /// * Neither `service_account_key_path` nor `service_account_key` is set
    /// * The key file cannot be read
    /// * The key is not a service account key in JSON form
    pub fn new(config: &StorageConfig) -> StorageResult<Self> {
        let raw_key = match (
            config.get_option("service_account_key"),
            config.get_option("service_account_key_path"),
        ) {
            (Some(key), _) => key.clone(),
            (None, Some(path)) => Self::read_key_file(Path::new(path))?,
            (None, None) => {
                return Err(StorageError::CredentialsError(
                    "GCS requires 'service_account_key_path' or 'service_account_key' option"
                        .to_string(),
                ))
            }
        };

        let key: ServiceAccountKey = serde_json::from_str(&raw_key).map_err(|e| {
            StorageError::CredentialsError(format!("Malformed service account key: {}", e))
        })?;
        if let Some(key_type) = key.key_type.as_deref() {
            if key_type != "service_account" {
                return Err(StorageError::CredentialsError(format!(
                    "Expected a service account key, found '{}'",
                    key_type
                )));
            }
        }

        for option in config.options.keys() {
            match option.as_str() {
                "project_id" | "service_account_key" | "service_account_key_path" => (),
                k if is_connection_option(k) => (),
                _ => warn!("Unknown GCS option: {}", option),
            }
        }

        let project_id = config
            .get_option("project_id")
            .filter(|id| !id.is_empty())
            .cloned()
            .or(key.project_id);

        Ok(Self {
            service_account_key: raw_key,
            client_email: key.client_email,
            project_id,
            client_options: build_connection_options(config),
        })
    }

    fn read_key_file(path: &Path) -> StorageResult<String> {
        std::fs::read_to_string(path).map_err(|e| {
            StorageError::CredentialsError(format!(
                "Failed to read service account key '{}': {}",
                path.display(),
                e
            ))
        })
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }
}

impl Debug for GcsConnector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsConnector")
            .field("client_email", &self.client_email)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl BucketConnector for GcsConnector {
    /// GCS clients never carry an encryption directive; the key reference is
    /// written as object metadata by the backend instead.
    fn connect(&self, bucket: &str, _encryption_key: Option<&str>) -> StorageResult<BucketClient> {
        let store = GoogleCloudStorageBuilder::new()
            .with_client_options(self.client_options.clone())
            .with_service_account_key(&self.service_account_key)
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| {
                StorageError::CredentialsError(format!("Failed to create GCS store: {}", e))
            })?;
        debug!("Connected to gs://{} as {}", bucket, self.client_email);

        let store = Arc::new(store);
        Ok(BucketClient {
            store: store.clone(),
            signer: store,
        })
    }
}
