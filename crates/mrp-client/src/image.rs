//! Boot image management
//!
//! Uploads kernels, initrds and bootloaders and checks whether a given image
//! is already known to the server.

use crate::error::MrpError;
use crate::models::{Image, ImageMetadata, ImageType, ImageUpload, Resolution};
use crate::mrp_trait::{MrpTransport, MultipartUpload};
use crate::resolve;
use serde_json::Value;
use tracing::{debug, info};

const IMAGE_PATH: &str = "/api/v1/image";

/// Image operations against one server
#[derive(Clone, Copy)]
pub struct ImageControl<'a> {
    transport: &'a dyn MrpTransport,
}

impl std::fmt::Debug for ImageControl<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageControl")
            .field("base_url", &self.transport.base_url())
            .finish()
    }
}

impl<'a> ImageControl<'a> {
    /// Create an image controller over a transport
    pub fn new(transport: &'a dyn MrpTransport) -> Self {
        Self { transport }
    }

    /// Upload an image file with its metadata
    ///
    /// The file goes in the `file` part; the metadata is JSON-encoded in the
    /// `q` text field. Returns the created image as reported by the server.
    pub async fn upload(&self, request: &ImageUpload) -> Result<Value, MrpError> {
        if request.path.as_os_str().is_empty() {
            return Err(MrpError::Configuration(
                "an image path is required for upload".to_string(),
            ));
        }
        if request.description.is_empty() || request.arch.is_empty() {
            return Err(MrpError::Configuration(
                "image description and architecture are required".to_string(),
            ));
        }

        let content = tokio::fs::read(&request.path)
            .await
            .map_err(|source| MrpError::Io {
                path: request.path.clone(),
                source,
            })?;

        let metadata = ImageMetadata {
            description: request.description.clone(),
            image_type: request.image_type,
            arch: request.arch.clone(),
            public: request.public,
            known_good: request.known_good,
        };
        let file_name = request
            .path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());

        info!(
            "Uploading {} image \"{}\" ({}, {} bytes)",
            request.image_type,
            request.description,
            request.arch,
            content.len()
        );
        let upload = MultipartUpload {
            fields: vec![("q".to_string(), serde_json::to_string(&metadata)?)],
            file_field: "file".to_string(),
            file_name,
            content,
        };
        let created = self.transport.upload(IMAGE_PATH, upload).await?;
        debug!("Image created: {}", created);
        Ok(created)
    }

    /// Look up an image by type, description and architecture
    pub async fn check(
        &self,
        image_type: ImageType,
        description: &str,
        arch: &str,
    ) -> Result<Resolution<Image>, MrpError> {
        resolve::resolve_image(self.transport, description, image_type, arch).await
    }

    /// ID of the image matching type, description and architecture
    pub async fn image_id(
        &self,
        image_type: ImageType,
        description: &str,
        arch: &str,
    ) -> Result<u64, MrpError> {
        resolve::image_id(self.transport, description, image_type, arch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use std::io::Write;
    use std::path::PathBuf;

    fn image_file(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|e| panic!("tempfile: {e}"));
        file.write_all(content)
            .unwrap_or_else(|e| panic!("write: {e}"));
        file
    }

    fn kernel_upload(path: PathBuf) -> ImageUpload {
        ImageUpload {
            image_type: ImageType::Kernel,
            description: "debian-12".to_string(),
            arch: "arm64".to_string(),
            path,
            public: true,
            known_good: false,
        }
    }

    #[tokio::test]
    async fn test_upload_then_check() {
        let mock = MockTransport::new("http://test-mrp");
        let images = ImageControl::new(&mock);
        let file = image_file(b"\x7fELF kernel");

        let created = images
            .upload(&kernel_upload(file.path().to_path_buf()))
            .await
            .unwrap_or_else(|e| panic!("upload failed: {e}"));
        assert_eq!(created["description"], "debian-12");
        assert_eq!(created["type"], "Kernel");

        let found = images.check(ImageType::Kernel, "debian-12", "arm64").await;
        assert!(matches!(found, Ok(Resolution::Found(ref image)) if image.public));

        let other_arch = images.check(ImageType::Kernel, "debian-12", "x86_64").await;
        assert!(matches!(other_arch, Ok(Resolution::NotFound)));
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_metadata() {
        let mock = MockTransport::new("http://test-mrp");
        let file = image_file(b"payload");
        ImageControl::new(&mock)
            .upload(&kernel_upload(file.path().to_path_buf()))
            .await
            .unwrap_or_else(|e| panic!("upload failed: {e}"));

        let uploads = mock.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].file_field, "file");
        assert_eq!(uploads[0].content, b"payload");
        let (name, q) = &uploads[0].fields[0];
        assert_eq!(name, "q");
        let metadata: ImageMetadata =
            serde_json::from_str(q).unwrap_or_else(|e| panic!("bad metadata: {e}"));
        assert_eq!(metadata.image_type, ImageType::Kernel);
        assert!(metadata.public);
        assert!(!metadata.known_good);

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!((calls[0].method, calls[0].path.as_str()), ("POST", "/api/v1/image"));
    }

    #[tokio::test]
    async fn test_upload_without_path_is_configuration_error() {
        let mock = MockTransport::new("http://test-mrp");
        let result = ImageControl::new(&mock)
            .upload(&kernel_upload(PathBuf::new()))
            .await;
        assert!(matches!(result, Err(MrpError::Configuration(_))));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_missing_file_is_io_error() {
        let mock = MockTransport::new("http://test-mrp");
        let result = ImageControl::new(&mock)
            .upload(&kernel_upload(PathBuf::from("/nonexistent/vmlinuz")))
            .await;
        assert!(matches!(result, Err(MrpError::Io { .. })));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_server_error_propagates() {
        let mock = MockTransport::new("http://test-mrp");
        mock.fail_on("POST", "/api/v1/image", 500);
        let file = image_file(b"payload");
        let result = ImageControl::new(&mock)
            .upload(&kernel_upload(file.path().to_path_buf()))
            .await;
        assert!(matches!(
            result,
            Err(MrpError::Transport { status: 500, ref reason, .. }) if reason == "Internal Server Error"
        ));
    }
}
