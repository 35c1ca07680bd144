use changify::storage::{
    IMAGE_FOLDER, MockStorageService, S3StorageClient, StorageService, is_image_content_type,
    sanitize_key,
};

#[cfg(test)]
mod mock_tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_success() {
        let mock = MockStorageService::new();
        let key = format!("{IMAGE_FOLDER}/logo.png");
        let url = mock
            .get_presigned_upload_url(&key, "image/png")
            .await
            .unwrap();

        assert!(url.contains("signature=fake"));
        assert!(url.contains(&key));
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockStorageService::new_failing();
        let result = mock.get_presigned_upload_url("logo.png", "image/png").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_sanitization() {
        let mock = MockStorageService::new();
        let url = mock
            .get_presigned_upload_url("../../etc/passwd", "image/png")
            .await
            .unwrap();
        assert!(!url.contains(".."));
    }
}

#[cfg(test)]
mod key_tests {
    use super::*;

    #[test]
    fn test_sanitize_key_drops_traversal_segments() {
        assert_eq!(sanitize_key("../../etc/passwd"), "etc/passwd");
        assert_eq!(sanitize_key("a//b/./c"), "a/b/c");
        assert_eq!(sanitize_key("ngo_verification/x.png"), "ngo_verification/x.png");
        assert_eq!(sanitize_key(".."), "");
    }

    #[test]
    fn test_image_content_types() {
        assert!(is_image_content_type("image/png"));
        assert!(is_image_content_type("image/jpeg"));
        assert!(!is_image_content_type("image/"));
        assert!(!is_image_content_type("application/pdf"));
        assert!(!is_image_content_type("video/mp4"));
        assert!(!is_image_content_type("IMAGE/PNG"));
    }
}

#[cfg(test)]
mod s3_tests {
    use super::*;

    #[tokio::test]
    async fn test_s3_presign_is_offline() {
        // Presigning is local computation; no MinIO needs to be running.
        let client = S3StorageClient::new(
            "http://localhost:9000",
            "us-east-1",
            "admin",
            "password",
            "changify-test",
        )
        .await;

        let url = client
            .get_presigned_upload_url("ngo_verification/logo.png", "image/png")
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:9000/changify-test/ngo_verification/logo.png"));
        assert!(url.contains("X-Amz-Signature"));
    }
}
