//! Panorama scene preparation.
//!
//! Uploaded images are never persisted: each one is base64-encoded into a
//! data URL and handed straight to the Pannellum viewer on the rendered
//! page.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;

/// The viewer page displays at most this many images per upload.
pub const MAX_PANORAMAS: usize = 3;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PanoramaError {
    #[error("{0} images uploaded; please upload at most {MAX_PANORAMAS}")]
    TooManyImages(usize),

    #[error("Unsupported image type for {0:?}; only jpg, jpeg and png are displayed")]
    UnsupportedType(String),
}

/// One equirectangular scene ready for the viewer template.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Scene {
    /// DOM id of the viewer container.
    pub id: String,
    pub title: String,
    pub data_url: String,
}

/// An uploaded image before encoding.
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Whether a content type is an accepted image format.
pub fn is_supported_type(content_type: &str) -> bool {
    matches!(content_type, "image/jpeg" | "image/jpg" | "image/png")
}

/// Encode image bytes as a data URL for the viewer.
pub fn to_data_url(content_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, BASE64.encode(data))
}

/// Turn an upload batch into scenes titled "Panorama 1..N".
///
/// More than [`MAX_PANORAMAS`] files, or any unsupported file type, rejects
/// the whole batch: the page then shows a warning and zero panoramas.
pub fn build_scenes(uploads: &[UploadedImage]) -> Result<Vec<Scene>, PanoramaError> {
    if uploads.len() > MAX_PANORAMAS {
        return Err(PanoramaError::TooManyImages(uploads.len()));
    }
    for upload in uploads {
        if !is_supported_type(&upload.content_type) {
            return Err(PanoramaError::UnsupportedType(upload.file_name.clone()));
        }
    }
    Ok(uploads
        .iter()
        .enumerate()
        .map(|(i, upload)| Scene {
            id: format!("panorama-{}", i + 1),
            title: format!("Panorama {}", i + 1),
            data_url: to_data_url(&upload.content_type, &upload.data),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str, content_type: &str) -> UploadedImage {
        UploadedImage {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            data: vec![0xff, 0xd8, 0xff],
        }
    }

    #[test]
    fn one_to_three_uploads_yield_that_many_scenes() {
        for count in 1..=MAX_PANORAMAS {
            let uploads: Vec<_> = (0..count)
                .map(|i| image(&format!("photo{i}.jpg"), "image/jpeg"))
                .collect();
            let scenes = build_scenes(&uploads).unwrap();
            assert_eq!(scenes.len(), count);
            assert_eq!(scenes[0].title, "Panorama 1");
        }
    }

    #[test]
    fn four_uploads_yield_zero_scenes() {
        let uploads: Vec<_> = (0..4)
            .map(|i| image(&format!("photo{i}.jpg"), "image/jpeg"))
            .collect();
        assert_eq!(build_scenes(&uploads), Err(PanoramaError::TooManyImages(4)));
    }

    #[test]
    fn unsupported_type_rejects_the_batch() {
        let uploads = vec![image("clip.gif", "image/gif")];
        assert_eq!(
            build_scenes(&uploads),
            Err(PanoramaError::UnsupportedType("clip.gif".to_string()))
        );
    }

    #[test]
    fn data_url_embeds_the_content_type() {
        let url = to_data_url("image/png", &[1, 2, 3]);
        assert!(url.starts_with("data:image/png;base64,"));
    }
}
