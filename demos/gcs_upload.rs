use cloud_object_bridge::{StorageError, StorageServiceFactory};
use std::path::Path;

#[tokio::main]
async fn main() {
    let service = StorageServiceFactory::select(
        "Google Cloud",
        Some("my-project"),
        Some("/path/to/service-account.json"),
    )
    .unwrap();

    let key_ref = "projects/my-project/locations/global/keyRings/ring/cryptoKeys/key";
    match service
        .upload_object(
            "my-bucket-1234",
            "reports/report1.txt",
            Path::new("./report1.txt"),
            key_ref,
            "STANDARD",
        )
        .await
    {
        Ok(()) => {}
        Err(e @ StorageError::PreconditionConflict(_)) => {
            eprintln!("Another writer changed the object first: {}", e);
            return;
        }
        Err(e) => panic!("Upload failed: {}", e),
    }

    let url = service
        .presigned_url("my-bucket-1234", "reports/report1.txt", 15, key_ref)
        .await
        .unwrap();

    println!("{} (expires at {})", url, url.expires_at());
}
