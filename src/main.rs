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

use std::error::Error;
use std::path::Path;
use std::time::SystemTime;
use tracing::info;

use cloud_object_bridge::{AppSettings, StorageServiceFactory};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = AppSettings::load()?;
    info!(
        "Starting Cloud Object Bridge (provider={}, bucket={})",
        settings.cloud_provider, settings.bucket_name
    );

    let start = SystemTime::now();
    let service = StorageServiceFactory::from_config(&settings.storage_config()?)?;

    service
        .upload_object(
            &settings.bucket_name,
            &settings.object_key,
            Path::new(&settings.file_path),
            &settings.encryption_key,
            &settings.storage_class,
        )
        .await?;
    let upload_dur = start.elapsed()?;

    let url = service
        .presigned_url(
            &settings.bucket_name,
            &settings.object_key,
            settings.url_validity_minutes,
            &settings.encryption_key,
        )
        .await?;

    info!(
        "upload_dur={}ms, total_dur={}ms, url_expires_at={}",
        upload_dur.as_millis(),
        start.elapsed()?.as_millis(),
        url.expires_at()
    );
    println!("{}", url);

    Ok(())
}
