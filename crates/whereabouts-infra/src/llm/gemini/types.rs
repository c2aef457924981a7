//! Wire types for the Gemini generateContent and batchEmbedContents APIs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.into()),
                function_call: None,
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "functionCall", skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Serialize)]
pub struct Tool {
    #[serde(rename = "functionDeclarations")]
    pub function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    pub temperature: f64,
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
}

/// Response body for `generateContent`.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

/// Request body for `models/{model}:batchEmbedContents`.
#[derive(Debug, Serialize)]
pub struct BatchEmbedRequest {
    pub requests: Vec<EmbedContentRequest>,
}

#[derive(Debug, Serialize)]
pub struct EmbedContentRequest {
    /// Fully-qualified model name, e.g. `models/gemini-embedding-exp-03-07`.
    pub model: String,
    pub content: Content,
}

/// Response body for `batchEmbedContents`.
#[derive(Debug, Deserialize)]
pub struct BatchEmbedResponse {
    #[serde(default)]
    pub embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
pub struct ContentEmbedding {
    pub values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generate_request_wire_shape() {
        let request = GenerateRequest {
            system_instruction: Some(Content::text(None, "be terse")),
            contents: vec![Content::text(Some("user"), "hello")],
            tools: None,
            generation_config: Some(GenerationConfig {
                temperature: 0.0,
                response_mime_type: Some("application/json".to_string()),
            }),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("systemInstruction").is_some());
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["contents"][0]["role"], "user");
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_function_call_response_parses() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [{
                        "functionCall": {
                            "name": "delete_by_item",
                            "args": {"items": ["keys"]}
                        }
                    }]
                }
            }]
        });
        let response: GenerateResponse = serde_json::from_value(body).unwrap();
        let call = response.candidates[0]
            .content
            .as_ref()
            .unwrap()
            .parts[0]
            .function_call
            .as_ref()
            .unwrap();
        assert_eq!(call.name, "delete_by_item");
        assert_eq!(call.args["items"][0], "keys");
    }

    #[test]
    fn test_batch_embed_response_parses() {
        let body = json!({"embeddings": [{"values": [0.1, 0.2]}, {"values": [0.3, 0.4]}]});
        let response: BatchEmbedResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.embeddings.len(), 2);
        assert_eq!(response.embeddings[1].values, vec![0.3, 0.4]);
    }
}
