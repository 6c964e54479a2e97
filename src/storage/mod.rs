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

//! Cloud storage abstraction layer
//!
//! This module provides one interface, [`CloudStorageService`], for uploading
//! encrypted objects and issuing signed download URLs on AWS S3 and Google
//! Cloud Storage. The network side is delegated to the `object_store` crate;
//! each backend adds its provider's encryption and write-precondition rules.

pub mod aws;
pub mod config;
pub mod error;
pub mod factory;
pub mod gcs;
pub mod object_store;
pub mod provider;

#[cfg(test)]
pub(crate) mod testing;

// Public exports
pub use aws::AwsS3StorageService;
pub use config::{StorageConfig, StorageType};
pub use error::{StorageError, StorageResult};
pub use factory::StorageServiceFactory;
pub use gcs::{GcsStorageService, WritePrecondition};
pub use provider::{BucketClient, BucketConnector, CloudStorageService, SignedUrl};
