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

//! Startup settings for the bootstrap binary.

use serde::Deserialize;

use crate::storage::{StorageConfig, StorageResult, StorageType};

/// Settings read from the process environment (and a `.env` file, if any).
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// `CLOUD_PROVIDER`: "aws" or "google cloud".
    pub cloud_provider: String,
    /// `BUCKET_NAME`
    pub bucket_name: String,
    /// `STORAGE_CLASS`, applied by the AWS backend only.
    #[serde(default = "default_storage_class")]
    pub storage_class: String,
    /// `PROJECT_ID`, GCS only.
    #[serde(default)]
    pub project_id: Option<String>,
    /// `GC_JSON_KEY_PATH`, path to the GCS service account key.
    #[serde(default)]
    pub gc_json_key_path: Option<String>,
    /// `ENCRYPTION_KEY`: KMS key id (AWS) or `kmsKeyName` metadata value (GCS).
    pub encryption_key: String,
    /// `OBJECT_KEY`
    pub object_key: String,
    /// `FILE_PATH`, the local file to upload.
    pub file_path: String,
    /// `URL_VALIDITY_MINUTES`
    #[serde(default = "default_url_validity_minutes")]
    pub url_validity_minutes: i64,
}

fn default_storage_class() -> String {
    "STANDARD".to_string()
}

fn default_url_validity_minutes() -> i64 {
    60
}

impl AppSettings {
    /// Loads settings from `.env` and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or malformed.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// Build the storage configuration for the selected provider.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidProvider` for an unknown `CLOUD_PROVIDER`.
    pub fn storage_config(&self) -> StorageResult<StorageConfig> {
        let mut config = StorageConfig::new(&self.cloud_provider)?;
        if config.storage_type == StorageType::Gcs {
            if let Some(project_id) = &self.project_id {
                config = config.with_option("project_id", project_id);
            }
            if let Some(path) = &self.gc_json_key_path {
                config = config.with_option("service_account_key_path", path);
            }
        }
        Ok(config)
    }
}
