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

//! In-memory bucket connector for backend tests.

use async_trait::async_trait;
use http::Method;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::NamedTempFile;
use url::Url;

use super::error::StorageResult;
use super::provider::{BucketClient, BucketConnector};

/// Signs by echoing the request into a URL, so tests can assert on it.
#[derive(Debug)]
pub(crate) struct EchoSigner {
    bucket: String,
}

#[async_trait]
impl Signer for EchoSigner {
    async fn signed_url(
        &self,
        method: Method,
        path: &ObjectPath,
        expires_in: Duration,
    ) -> object_store::Result<Url> {
        let mut url = Url::parse("https://signer.test/").map_err(|e| object_store::Error::Generic {
            store: "EchoSigner",
            source: Box::new(e),
        })?;
        url.set_path(&format!("{}/{}", self.bucket, path));
        url.query_pairs_mut()
            .append_pair("method", method.as_str())
            .append_pair("expires", &expires_in.as_secs().to_string());
        Ok(url)
    }
}

/// One [`InMemory`] store per bucket, plus a log of every `connect` call.
#[derive(Debug, Default)]
pub(crate) struct MemoryConnector {
    buckets: Mutex<HashMap<String, Arc<InMemory>>>,
    connections: Mutex<Vec<(String, Option<String>)>>,
}

impl MemoryConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bucket(&self, bucket: &str) -> Arc<InMemory> {
        self.buckets
            .lock()
            .unwrap()
            .entry(bucket.to_string())
            .or_insert_with(|| Arc::new(InMemory::new()))
            .clone()
    }

    /// `(bucket, encryption_key)` for each connection, in order.
    pub(crate) fn connections(&self) -> Vec<(String, Option<String>)> {
        self.connections.lock().unwrap().clone()
    }
}

impl BucketConnector for MemoryConnector {
    fn connect(&self, bucket: &str, encryption_key: Option<&str>) -> StorageResult<BucketClient> {
        self.connections
            .lock()
            .unwrap()
            .push((bucket.to_string(), encryption_key.map(str::to_string)));
        Ok(BucketClient {
            store: self.bucket(bucket),
            signer: Arc::new(EchoSigner {
                bucket: bucket.to_string(),
            }),
        })
    }
}

/// A temporary local file holding `contents`.
pub(crate) fn source_file(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}
