use cloud_object_bridge::{StorageConfig, StorageServiceFactory};
use std::path::Path;

#[tokio::main]
async fn main() {
    let storage_config = StorageConfig::aws()
        .with_option("region", "us-east-1")
        .with_option("access_key_id", "the_access_key_id")
        .with_option("secret_access_key", "the_secret_access_key")
        .with_option("session_token", "session_token_if_needed");
    let service = StorageServiceFactory::from_config(&storage_config).unwrap();

    service
        .upload_object(
            "my-bucket-1234",
            "reports/report1.txt",
            Path::new("./report1.txt"),
            "arn:aws:kms:us-east-1:111122223333:key/the-key-id",
            "STANDARD_IA",
        )
        .await
        .unwrap();

    let url = service
        .presigned_url("my-bucket-1234", "reports/report1.txt", 60, "the-key-id")
        .await
        .unwrap();

    println!("{}", url);
}
