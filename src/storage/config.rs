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

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use super::error::StorageError;

/// Storage provider type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// AWS S3 storage
    Aws,
    /// Google Cloud Storage
    Gcs,
}

impl StorageType {
    /// The canonical provider name, as accepted by [`StorageType::from_str`].
    pub fn provider_name(&self) -> &'static str {
        match self {
            StorageType::Aws => "aws",
            StorageType::Gcs => "google cloud",
        }
    }
}

impl FromStr for StorageType {
    type Err = StorageError;

    /// Case-insensitive provider lookup.
    ///
    /// `"aws"` and `"google cloud"` are the primary names; `"s3"`, `"gcs"` and
    /// `"gcp"` are accepted as aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aws" | "s3" => Ok(StorageType::Aws),
            "google cloud" | "gcs" | "gcp" => Ok(StorageType::Gcs),
            _ => Err(StorageError::InvalidProvider(s.to_string())),
        }
    }
}

impl Display for StorageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.provider_name())
    }
}

/// Configuration for a storage backend.
///
/// Provider-specific options live in a string map and are applied to the
/// `object_store` builders when a bucket client is created.
///
/// # Examples
///
/// ## AWS S3
/// ```
/// use cloud_object_bridge::storage::StorageConfig;
///
/// let config = StorageConfig::aws()
///     .with_option("region", "eu-central-1")
///     .with_option("bucket_key", "true");
/// ```
///
/// ## GCS
/// ```
/// use cloud_object_bridge::storage::StorageConfig;
///
/// let config = StorageConfig::gcs()
///     .with_option("project_id", "my-project")
///     .with_option("service_account_key_path", "/path/to/key.json");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage provider type
    #[serde(rename = "type")]
    pub storage_type: StorageType,

    /// Provider-specific configuration options
    ///
    /// AWS S3:
    /// - region: AWS region (e.g., "us-east-1")
    /// - access_key_id / secret_access_key / session_token: static credentials,
    ///   otherwise the ambient environment is used
    /// - endpoint: Custom endpoint URL (for S3-compatible services)
    /// - allow_http: "true" to allow HTTP connections
    /// - bucket_key: "true" to enable S3 Bucket Keys for SSE-KMS
    ///
    /// GCS:
    /// - project_id: Google Cloud project id
    /// - service_account_key_path: Path to service account JSON key file
    /// - service_account_key: Service account key as JSON string
    ///
    /// Both:
    /// - timeout, connect_timeout, pool_idle_timeout (seconds), pool_max_idle_per_host
    #[serde(default)]
    pub options: HashMap<String, String>,
}

impl StorageConfig {
    /// Create a storage configuration from a provider name.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidProvider`] if the name is not recognized.
    pub fn new(provider_name: &str) -> Result<Self, StorageError> {
        Ok(Self {
            storage_type: provider_name.parse()?,
            options: Self::default_options(),
        })
    }

    /// Create an AWS S3 storage configuration.
    pub fn aws() -> Self {
        Self {
            storage_type: StorageType::Aws,
            options: Self::default_options(),
        }
    }

    /// Create a GCS storage configuration.
    pub fn gcs() -> Self {
        Self {
            storage_type: StorageType::Gcs,
            options: Self::default_options(),
        }
    }

    /// Default connection settings shared by both providers.
    pub fn default_options() -> HashMap<String, String> {
        [
            ("timeout", "300"),
            ("connect_timeout", "30"),
            ("pool_idle_timeout", "15"),
            ("pool_max_idle_per_host", "5"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    /// Add a configuration option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Add multiple configuration options.
    pub fn with_options(mut self, options: HashMap<String, String>) -> Self {
        self.options.extend(options);
        self
    }

    /// Get a configuration option.
    pub fn get_option(&self, key: &str) -> Option<&String> {
        self.options.get(key)
    }
}
