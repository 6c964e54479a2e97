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

//! # Cloud Object Bridge
//!
//! Upload encrypted objects and generate time-limited signed download URLs on
//! AWS S3 or Google Cloud Storage through a single interface.
//!
//! ## Provider semantics
//!
//! | | AWS S3 | Google Cloud Storage |
//! |---|---|---|
//! | Encryption key reference | SSE-KMS key id | `kmsKeyName` custom metadata |
//! | Storage class | applied | ignored |
//! | Write mode | overwrite | create-only or generation match |
//! | Key used when signing | no | no (only compared with the stored metadata) |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cloud_object_bridge::StorageServiceFactory;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let service = StorageServiceFactory::select("aws", None, None)?;
//!
//! service
//!     .upload_object(
//!         "test-bucket",
//!         "report1.txt",
//!         Path::new("./report1.txt"),
//!         "key-123",
//!         "STANDARD",
//!     )
//!     .await?;
//!
//! let url = service
//!     .presigned_url("test-bucket", "report1.txt", 60, "key-123")
//!     .await?;
//! println!("{}", url);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`storage`] - Storage interface, backends and factory
//! - [`settings`] - Startup settings read from the environment

pub mod settings;
pub mod storage;

// Re-export commonly used types
pub use settings::AppSettings;
pub use storage::{
    CloudStorageService, SignedUrl, StorageConfig, StorageError, StorageServiceFactory,
    StorageType,
};
