//! Product image storage on S3

use anyhow::Result;
use aws_sdk_s3::{Client, primitives::ByteStream};
use std::env;
use tracing::info;
use uuid::Uuid;

/// S3 configuration for uploaded images
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    /// Base URL under which uploaded keys are publicly readable
    pub public_base_url: String,
}

impl S3Config {
    /// Create a new S3Config from environment variables
    ///
    /// # Environment Variables
    /// - `S3_BUCKET`: Bucket receiving product images (default: "storefront-uploads")
    /// - `S3_PUBLIC_URL`: Public base URL (default: "https://<bucket>.s3.amazonaws.com")
    pub fn from_env() -> Self {
        let bucket = env::var("S3_BUCKET").unwrap_or_else(|_| "storefront-uploads".to_string());
        let public_base_url = env::var("S3_PUBLIC_URL")
            .unwrap_or_else(|_| format!("https://{}.s3.amazonaws.com", bucket));

        S3Config {
            bucket,
            public_base_url,
        }
    }
}

/// Writes product images to the configured bucket
#[derive(Clone)]
pub struct ImageStore {
    s3_client: Client,
    config: S3Config,
}

impl ImageStore {
    pub fn new(s3_client: Client, config: S3Config) -> Self {
        Self { s3_client, config }
    }

    /// Upload an image and return its public URL
    pub async fn put_image(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        file_name: Option<&str>,
    ) -> Result<String> {
        let key = object_key(file_name);
        info!("Uploading image to S3: {}", key);

        self.s3_client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await?;

        Ok(self.public_url(&key))
    }

    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.config.public_base_url.trim_end_matches('/'),
            key
        )
    }
}

/// Whether a declared content type is an image
pub fn is_image(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().starts_with("image/"))
}

/// Fresh key under `uploads/`, keeping a sane extension from the client's name
fn object_key(file_name: Option<&str>) -> String {
    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("uploads/{}.{}", Uuid::new_v4(), ext),
        None => format!("uploads/{}", Uuid::new_v4()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Region};

    /// Store backed by a client that is never sent anything
    pub(crate) fn offline_store() -> ImageStore {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();

        ImageStore::new(
            Client::from_conf(config),
            S3Config {
                bucket: "bucket".to_string(),
                public_base_url: "https://cdn.example.com/".to_string(),
            },
        )
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(Some("image/png")));
        assert!(is_image(Some("IMAGE/JPEG")));
        assert!(!is_image(Some("application/pdf")));
        assert!(!is_image(None));
    }

    #[test]
    fn test_object_key_keeps_extension() {
        let key = object_key(Some("Summer Shirt.JPG"));
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with(".jpg"));

        assert!(!object_key(Some("../../etc/passwd")).contains(".."));
        assert!(!object_key(None).contains('.'));
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            offline_store().public_url("uploads/a.png"),
            "https://cdn.example.com/uploads/a.png"
        );
    }
}
