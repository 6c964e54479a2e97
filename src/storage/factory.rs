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

use std::sync::Arc;
use tracing::info;

use super::aws::AwsS3StorageService;
use super::config::{StorageConfig, StorageType};
use super::error::StorageResult;
use super::gcs::GcsStorageService;
use super::provider::CloudStorageService;

/// Factory for creating storage services
pub struct StorageServiceFactory;

impl StorageServiceFactory {
    /// Create a storage service from a configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The storage configuration specifying the provider type and options
    ///
    /// # Returns
    ///
    /// A `Result` containing:
    /// * `Ok(Arc<dyn CloudStorageService>)` - A thread-safe reference to the initialized backend
    /// * `Err(StorageError)` - If the backend cannot be created
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The GCS service account key is missing, unreadable or malformed
    /// * The configuration options cannot be applied
    pub fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn CloudStorageService>> {
        let service: Arc<dyn CloudStorageService> = match config.storage_type {
            StorageType::Aws => Arc::new(AwsS3StorageService::new(config)?),
            StorageType::Gcs => Arc::new(GcsStorageService::new(config)?),
        };
        info!("Selected storage provider={}", config.storage_type);
        Ok(service)
    }

    /// Select a backend by provider name.
    ///
    /// The name is matched case-insensitively against `"aws"` and
    /// `"google cloud"`. AWS uses ambient credentials; GCS needs the path of a
    /// service account key file and optionally a project id.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The provider name is not recognized (`StorageError::InvalidProvider`)
    /// * The GCS key file cannot be read or parsed (`StorageError::CredentialsError`)
    pub fn select(
        provider_name: &str,
        project_id: Option<&str>,
        credentials_path: Option<&str>,
    ) -> StorageResult<Arc<dyn CloudStorageService>> {
        let mut config = StorageConfig::new(provider_name)?;
        if config.storage_type == StorageType::Gcs {
            if let Some(project_id) = project_id {
                config = config.with_option("project_id", project_id);
            }
            if let Some(path) = credentials_path {
                config = config.with_option("service_account_key_path", path);
            }
        }
        Self::from_config(&config)
    }
}
