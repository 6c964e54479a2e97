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

use thiserror::Error;

/// Errors that can occur during storage operations
///
/// Construction-time kinds (`InvalidProvider`, `CredentialsError`, `ConfigError`)
/// abort backend creation. The remaining kinds are reported per call and leave
/// the backend usable.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid provider: {0}")]
    InvalidProvider(String),

    #[error("Credentials error: {0}")]
    CredentialsError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Local IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Object not found: {0}")]
    NotFound(#[source] object_store::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(#[source] object_store::Error),

    /// The provider refused a conditional write because the object changed
    /// between the read and the write.
    #[error("Precondition conflict: {0}")]
    PreconditionConflict(#[source] object_store::Error),

    #[error("Object store error: {0}")]
    ObjectStoreError(#[source] object_store::Error),

    #[error("Invalid signing duration: {0} minutes (must be positive)")]
    InvalidDuration(i64),

    /// The key cannot be passed to the provider byte for byte.
    #[error("Invalid object key: {0}")]
    InvalidObjectKey(String),
}

impl StorageError {
    /// Whether repeating the same call may succeed.
    ///
    /// Only a lost write race qualifies; nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::PreconditionConflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            e @ object_store::Error::NotFound { .. } => StorageError::NotFound(e),
            e @ (object_store::Error::Precondition { .. }
            | object_store::Error::AlreadyExists { .. }) => StorageError::PreconditionConflict(e),
            e @ (object_store::Error::PermissionDenied { .. }
            | object_store::Error::Unauthenticated { .. }) => StorageError::PermissionDenied(e),
            e => StorageError::ObjectStoreError(e),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
