//! Google Gemini provider implementation.
//!
//! Calls the REST `generateContent` endpoint with the Google Search tool
//! enabled so answers can cite recent news. Citations are read from the
//! first candidate's grounding metadata.

use serde::{Deserialize, Serialize};

use super::{Citation, LlmProvider, LlmResponse, endpoint};
use crate::AiError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini API provider.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        model: String,
        base_url: Option<String>,
    ) -> Self {
        Self {
            api_key,
            model,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    tools: Vec<serde_json::Value>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct GroundingMetadata {
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse, AiError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: prompt }],
            }],
            tools: vec![serde_json::json!({ "google_search": {} })],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let url = endpoint(
            &self.base_url,
            &format!("models/{}:generateContent", self.model),
        );
        let resp = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let err: GeminiError = serde_json::from_str(&body).unwrap_or_else(|_| GeminiError {
                error: GeminiErrorDetail {
                    message: format!("HTTP {status}: {body}"),
                },
            });
            return Err(AiError::Provider {
                message: err.error.message,
            });
        }

        parse_response(&body)
    }
}

/// Extracts the text and grounding citations from a `generateContent`
/// response body.
fn parse_response(body: &str) -> Result<LlmResponse, AiError> {
    let response: GeminiResponse = serde_json::from_str(body)?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(AiError::Provider {
            message: "No candidates in Gemini response".to_string(),
        });
    };

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    let citations = candidate
        .grounding_metadata
        .map(|m| {
            m.grounding_chunks
                .into_iter()
                .filter_map(|chunk| chunk.web)
                .map(|web| Citation {
                    title: web.title.unwrap_or_default(),
                    uri: web.uri.unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(LlmResponse { text, citations })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_and_citations() {
        let body = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "{\"recommendations\":" }, { "text": "[]}" }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://news.example/a", "title": "Smog alert" } },
                        { "web": { "uri": "https://news.example/b" } },
                        { "retrievedContext": {} }
                    ]
                }
            }]
        }"#;

        let response = parse_response(body).unwrap();
        assert_eq!(response.text, r#"{"recommendations":[]}"#);
        assert_eq!(response.citations.len(), 2);
        assert_eq!(response.citations[0].title, "Smog alert");
        assert!(response.citations[1].title.is_empty());
    }

    #[test]
    fn empty_candidates_is_a_provider_error() {
        let err = parse_response(r#"{"candidates": []}"#).unwrap_err();
        assert!(matches!(err, AiError::Provider { .. }));
    }
}
