//! Gemini gateway implementation for MV Director
//!
//! This module implements [`GenerationGateway`] against the Generative
//! Language REST API (`models/{model}:generateContent`). Structured outputs
//! are requested with a JSON response schema; images travel as inline base64
//! parts in both directions.

use crate::config::GeminiConfig;
use crate::domain::{AspectRatio, Character, CharacterOutline, Concept, ImageData, ReferenceImage};
use crate::error::{MvDirectorError, Result};
use crate::prompts;
use crate::providers::GenerationGateway;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Gemini API gateway
///
/// # Examples
///
/// ```
/// use mvdirector::config::GeminiConfig;
/// use mvdirector::providers::GeminiGateway;
///
/// let config = GeminiConfig {
///     api_key: Some("secret".to_string()),
///     ..Default::default()
/// };
/// let gateway = GeminiGateway::new(config);
/// assert!(gateway.is_ok());
/// ```
pub struct GeminiGateway {
    client: Client,
    config: GeminiConfig,
}

/// Request body for `generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

/// One content part: either text or inline binary data
#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

impl GenerationConfig {
    fn json(schema: serde_json::Value) -> Self {
        Self {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
            ..Default::default()
        }
    }

    fn modalities(modalities: &[&str]) -> Self {
        Self {
            response_modalities: Some(modalities.iter().map(|m| m.to_string()).collect()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct CharactersPayload {
    characters: Vec<CharacterOutline>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConceptPayload {
    #[serde(default)]
    aesthetic: String,
    #[serde(default)]
    story: String,
    #[serde(default)]
    song_relation: String,
}

#[derive(Debug, Deserialize)]
struct ScenesPayload {
    #[serde(default)]
    scenes: Vec<String>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn image(data: &ImageData, mime_type: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.to_base64(),
            }),
        }
    }
}

impl GeminiGateway {
    /// Create a new Gemini gateway
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("mvdirector/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                MvDirectorError::Config(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::info!(
            "Initialized Gemini gateway: api_base={}, text_model={}, image_model={}",
            config.api_base,
            config.text_model,
            config.image_model
        );

        Ok(Self { client, config })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            model
        )
    }

    /// Send one `generateContent` request and return the first candidate's parts
    async fn generate_content(
        &self,
        model: &str,
        parts: Vec<Part>,
        generation_config: Option<GenerationConfig>,
    ) -> Result<Vec<Part>> {
        let url = self.endpoint(model);
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config,
        };

        tracing::debug!("Sending generateContent request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.config.api_key.clone().unwrap_or_default())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to reach Gemini: {}", e);
                MvDirectorError::Generation(format!("Failed to reach generation service: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(MvDirectorError::Generation(format!(
                "Generation service returned error {}",
                status
            ))
            .into());
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            MvDirectorError::Generation(format!("Failed to parse generation response: {}", e))
        })?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .ok_or_else(|| MvDirectorError::Generation("Model returned no candidates".into()).into())
    }

    /// Text model call with a JSON response schema
    async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: String,
        schema: serde_json::Value,
    ) -> Result<T> {
        let parts = self
            .generate_content(
                &self.config.text_model,
                vec![Part::text(prompt)],
                Some(GenerationConfig::json(schema)),
            )
            .await?;

        let text = collect_text(&parts);
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Model returned invalid JSON: {}", e);
            MvDirectorError::Generation(format!("Model returned invalid JSON: {}", e)).into()
        })
    }
}

/// Concatenate every text part of a response
fn collect_text(parts: &[Part]) -> String {
    parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect::<Vec<_>>()
        .concat()
}

/// Decode every inline image part of a response
fn collect_images(parts: &[Part]) -> Result<Vec<ImageData>> {
    parts
        .iter()
        .filter_map(|p| p.inline_data.as_ref())
        .map(|inline| {
            ImageData::from_base64(&inline.data).map_err(|e| {
                anyhow::Error::from(MvDirectorError::Generation(format!(
                    "Model returned undecodable image: {}",
                    e
                )))
            })
        })
        .collect()
}

/// MIME type of generated image bytes, sniffed from their header
fn sniff_mime_type(image: &ImageData) -> &'static str {
    image::guess_format(image.as_bytes())
        .map(|format| format.to_mime_type())
        .unwrap_or("image/jpeg")
}

/// Log the underlying failure and replace it with a user-facing message
fn user_failure(message: &str, error: anyhow::Error) -> anyhow::Error {
    tracing::error!("{} {}", message, error);
    MvDirectorError::Generation(message.to_string()).into()
}

#[async_trait]
impl GenerationGateway for GeminiGateway {
    async fn generate_initial_characters(
        &self,
        song_title: &str,
        lyrics: &str,
    ) -> Result<Vec<CharacterOutline>> {
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "characters": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "name": { "type": "STRING" },
                            "description": { "type": "STRING" }
                        },
                        "required": ["name", "description"]
                    }
                }
            },
            "required": ["characters"]
        });

        let prompt = prompts::initial_characters_prompt(song_title, lyrics, 3);
        let payload: CharactersPayload = self
            .generate_json(prompt, schema)
            .await
            .map_err(|e| user_failure("Failed to generate initial characters.", e))?;

        if payload.characters.is_empty() {
            return Err(MvDirectorError::Generation(
                "Failed to generate initial characters.".to_string(),
            )
            .into());
        }

        Ok(payload.characters)
    }

    async fn generate_character_name(&self, description: &str) -> Result<String> {
        let config = GenerationConfig {
            stop_sequences: Some(vec!["\n".to_string()]),
            ..Default::default()
        };

        let parts = self
            .generate_content(
                &self.config.text_model,
                vec![Part::text(prompts::character_name_prompt(description))],
                Some(config),
            )
            .await
            .map_err(|e| user_failure("Failed to suggest a character name.", e))?;

        let name = collect_text(&parts).trim().to_string();
        if name.is_empty() {
            return Err(
                MvDirectorError::Generation("Failed to suggest a character name.".into()).into(),
            );
        }
        Ok(name)
    }

    async fn generate_character_sheet(
        &self,
        character: &CharacterOutline,
        reference_images: &[ReferenceImage],
    ) -> Result<Vec<ImageData>> {
        let mut parts: Vec<Part> = reference_images
            .iter()
            .map(|r| Part::image(&r.data, r.mime_type.clone()))
            .collect();
        parts.push(Part::text(prompts::character_sheet_prompt(character)));

        let response = self
            .generate_content(
                &self.config.image_model,
                parts,
                Some(GenerationConfig::modalities(&["IMAGE", "TEXT"])),
            )
            .await
            .map_err(|e| {
                user_failure(
                    "Failed to generate the character sheet from reference images.",
                    e,
                )
            })?;

        let images = collect_images(&response)?;
        if images.is_empty() {
            tracing::error!("Model did not return any images for the character sheet");
            return Err(MvDirectorError::Generation(
                "Failed to generate the character sheet from reference images.".to_string(),
            )
            .into());
        }

        Ok(images)
    }

    async fn generate_concept(
        &self,
        song_title: &str,
        lyrics: &str,
        characters: &[Character],
    ) -> Result<Concept> {
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "aesthetic": { "type": "STRING" },
                "story": { "type": "STRING" },
                "songRelation": { "type": "STRING" }
            },
            "required": ["aesthetic", "story", "songRelation"]
        });

        let prompt = prompts::concept_prompt(song_title, lyrics, characters);
        let payload: ConceptPayload = self
            .generate_json(prompt, schema)
            .await
            .map_err(|e| user_failure("Failed to generate the music video concept.", e))?;

        Ok(Concept {
            aesthetic: payload.aesthetic,
            story: payload.story,
            song_relation: payload.song_relation,
        })
    }

    async fn generate_scene_prompts(
        &self,
        song_title: &str,
        characters: &[Character],
        concept: &Concept,
        count: usize,
    ) -> Result<Vec<String>> {
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "scenes": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" }
                }
            },
            "required": ["scenes"]
        });

        let prompt = prompts::scene_prompts_prompt(song_title, characters, concept, count);
        let payload: ScenesPayload = self
            .generate_json(prompt, schema)
            .await
            .map_err(|e| user_failure("Failed to generate storyboard prompts.", e))?;

        if payload.scenes.is_empty() {
            tracing::error!("No scene prompts were generated");
            return Err(
                MvDirectorError::Generation("Failed to generate storyboard prompts.".into()).into(),
            );
        }

        Ok(payload.scenes)
    }

    async fn generate_scene_image(
        &self,
        prompt: &str,
        concept: &Concept,
        characters: &[Character],
        aspect_ratio: AspectRatio,
    ) -> Result<ImageData> {
        let mut parts: Vec<Part> = characters
            .iter()
            .flat_map(|c| c.sheet_images.iter())
            .map(|image| Part::image(image, sniff_mime_type(image)))
            .collect();
        parts.push(Part::text(prompts::scene_image_prompt(
            prompt,
            concept,
            characters,
            aspect_ratio,
        )));

        let response = self
            .generate_content(
                &self.config.image_model,
                parts,
                Some(GenerationConfig::modalities(&["IMAGE", "TEXT"])),
            )
            .await
            .map_err(|e| user_failure("Failed to generate scene image.", e))?;

        collect_images(&response)?.into_iter().next().ok_or_else(|| {
            tracing::error!("Model failed to return an image for the scene");
            MvDirectorError::Generation("Failed to generate scene image.".to_string()).into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> GeminiGateway {
        GeminiGateway::new(GeminiConfig {
            api_base: "http://localhost:9999/".to_string(),
            api_key: Some("key".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(
            gateway().endpoint("gemini-2.5-flash"),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::image(&ImageData::new(vec![1, 2, 3]), "image/png"),
                    Part::text("hi"),
                ],
            }],
            generation_config: Some(GenerationConfig::json(json!({"type": "OBJECT"}))),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(value["contents"][0]["parts"][0]["inlineData"]["data"], "AQID");
        assert_eq!(value["contents"][0]["parts"][1]["text"], "hi");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert!(value["generationConfig"].get("stopSequences").is_none());
    }

    #[test]
    fn test_collect_text_concatenates_parts() {
        let parts = vec![Part::text("{\"a\":"), Part::text("1}")];
        assert_eq!(collect_text(&parts), "{\"a\":1}");
    }

    #[test]
    fn test_collect_images_skips_text_parts() {
        let parts = vec![
            Part::text("here you go"),
            Part::image(&ImageData::new(b"png".to_vec()), "image/png"),
        ];
        let images = collect_images(&parts).unwrap();
        assert_eq!(images, vec![ImageData::new(b"png".to_vec())]);
    }

    #[test]
    fn test_sniff_mime_type_detects_png() {
        let png_header = ImageData::new(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
        assert_eq!(sniff_mime_type(&png_header), "image/png");
    }

    #[test]
    fn test_sniff_mime_type_falls_back_to_jpeg() {
        assert_eq!(sniff_mime_type(&ImageData::new(vec![0, 1, 2])), "image/jpeg");
    }
}
