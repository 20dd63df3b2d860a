// ABOUTME: Remote image service for the slidegen application
// ABOUTME: Defines the image service interface and a Gemini client built on blocking reqwest

use crate::config::Config;
use crate::errors::{Result, SlideError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use log::{debug, info};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// An image attached to a request as visual reference
#[derive(Debug, Clone)]
pub struct ReferenceImage {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl ReferenceImage {
    /// Read an image from disk, guessing its MIME type from the extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SlideError::PathNotFoundError(path.to_path_buf()),
            _ => SlideError::FileError(e),
        })?;
        Ok(Self {
            data,
            mime_type: guess_mime_type(path).to_string(),
        })
    }
}

/// MIME type for an image path, `image/jpeg` when the extension is unknown
pub fn guess_mime_type(path: &Path) -> &'static str {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or("image/jpeg")
}

/// Everything the image service needs for one call
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub reference_images: Vec<ReferenceImage>,
    /// Resolution hint such as `1K` or `4K`
    pub image_size: String,
    /// Aspect ratio hint such as `16:9`
    pub aspect_ratio: String,
}

/// Raw bytes of the first image returned by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl GeneratedImage {
    /// File extension matching the payload's MIME type
    pub fn extension(&self) -> &'static str {
        ImageFormat::from_mime_type(&self.mime_type)
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("jpg")
    }
}

/// A generative image model. Implementations may be slow and may fail; callers
/// treat every call as independent and never retry.
pub trait ImageService: Send + Sync {
    fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage>;
}

/// Write `image` to `<prefix>_<index>.<ext>` and return the written path
pub fn save_image(prefix: &Path, index: usize, image: &GeneratedImage) -> Result<PathBuf> {
    let mut name = prefix.as_os_str().to_os_string();
    name.push(format!("_{}.{}", index, image.extension()));
    let path = PathBuf::from(name);

    fs::write(&path, &image.data).map_err(SlideError::FileError)?;
    info!("File saved to: {:?}", path);
    Ok(path)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
    image_config: ImageConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
    image_size: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

fn build_request_body(request: &ImageRequest) -> GenerateContentRequest {
    let mut parts = vec![Part {
        text: Some(request.prompt.clone()),
        inline_data: None,
    }];
    parts.extend(request.reference_images.iter().map(|image| Part {
        text: None,
        inline_data: Some(InlineData {
            mime_type: image.mime_type.clone(),
            data: STANDARD.encode(&image.data),
        }),
    }));

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: GenerationConfig {
            response_modalities: vec!["IMAGE", "TEXT"],
            image_config: ImageConfig {
                aspect_ratio: request.aspect_ratio.clone(),
                image_size: request.image_size.clone(),
            },
        },
    }
}

/// Take the first inline image of the response and ignore everything else
fn first_image(response: GenerateContentResponse) -> Result<GeneratedImage> {
    let inline = response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .filter_map(|part| part.inline_data)
        .find(|inline| !inline.data.is_empty())
        .ok_or_else(|| SlideError::RemoteError("no image in response".to_string()))?;

    Ok(GeneratedImage {
        data: STANDARD.decode(inline.data.as_bytes())?,
        mime_type: inline.mime_type,
    })
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client from the configuration. Fails when no API key is configured.
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.api_key()?.to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SlideError::HttpError)?;
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.api_base.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

impl ImageService for GeminiClient {
    fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage> {
        debug!(
            "POST {} with {} reference image(s), size {}, aspect {}",
            self.endpoint,
            request.reference_images.len(),
            request.image_size,
            request.aspect_ratio
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request_body(request))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SlideError::RemoteStatusError {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateContentResponse = serde_json::from_str(&response.text()?)?;
        first_image(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_request_body_orders_parts() {
        let request = ImageRequest {
            prompt: "draw".to_string(),
            reference_images: vec![
                ReferenceImage {
                    data: b"first".to_vec(),
                    mime_type: "image/png".to_string(),
                },
                ReferenceImage {
                    data: b"second".to_vec(),
                    mime_type: "image/jpeg".to_string(),
                },
            ],
            image_size: "1K".to_string(),
            aspect_ratio: "16:9".to_string(),
        };

        let json = serde_json::to_value(build_request_body(&request)).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "draw");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], STANDARD.encode(b"first"));
        assert_eq!(parts[2]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(json["generationConfig"]["imageConfig"]["imageSize"], "1K");
        assert_eq!(json["generationConfig"]["imageConfig"]["aspectRatio"], "16:9");
        assert_eq!(json["generationConfig"]["responseModalities"][0], "IMAGE");
    }

    #[test]
    fn test_first_image_skips_text_parts() {
        let raw = format!(
            r#"{{"candidates":[
                {{"content":{{"parts":[{{"text":"here you go"}}]}}}},
                {{"content":{{"parts":[
                    {{"inlineData":{{"mimeType":"image/png","data":"{}"}}}},
                    {{"inlineData":{{"mimeType":"image/jpeg","data":"{}"}}}}
                ]}}}}
            ]}}"#,
            STANDARD.encode(b"png-bytes"),
            STANDARD.encode(b"jpeg-bytes")
        );
        let response: GenerateContentResponse = serde_json::from_str(&raw).unwrap();

        let image = first_image(response).unwrap();
        assert_eq!(image.data, b"png-bytes");
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn test_response_without_image_is_remote_error() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"no"}]}}]}"#)
                .unwrap();
        assert!(matches!(
            first_image(response),
            Err(SlideError::RemoteError(_))
        ));
    }

    #[test]
    fn test_save_image_appends_index_and_extension() {
        let dir = TempDir::new().unwrap();
        let image = GeneratedImage {
            data: vec![1, 2, 3],
            mime_type: "image/jpeg".to_string(),
        };

        let path = save_image(&dir.path().join("slide_07"), 0, &image).unwrap();
        assert_eq!(path, dir.path().join("slide_07_0.jpg"));
        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_reference_image_from_missing_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone.png");
        assert!(matches!(
            ReferenceImage::from_path(&missing),
            Err(SlideError::PathNotFoundError(p)) if p == missing
        ));
    }

    #[test]
    fn test_reference_image_reads_bytes_and_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logo.png");
        fs::write(&path, b"png").unwrap();

        let image = ReferenceImage::from_path(&path).unwrap();
        assert_eq!(image.data, b"png");
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn test_guess_mime_type() {
        assert_eq!(guess_mime_type(Path::new("a/logo.png")), "image/png");
        assert_eq!(guess_mime_type(Path::new("photo.JPG")), "image/jpeg");
        assert_eq!(guess_mime_type(Path::new("notes")), "image/jpeg");
    }

    #[test]
    fn test_client_requires_api_key() {
        assert!(matches!(
            GeminiClient::new(&Config::default()),
            Err(SlideError::ConfigError(_))
        ));
    }
}
