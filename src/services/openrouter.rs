use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::models::{DetectionReply, ImagePayload, IngredientList, NutritionSchema};
use crate::services::ai_service::AIService;
use crate::services::{nutrition, prompts};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        #[serde(rename = "type")]
        content_type: String,
        text: String,
    },
    ImageUrl {
        #[serde(rename = "type")]
        content_type: String,
        image_url: ImageData,
    },
}

impl ContentPart {
    fn text(text: String) -> Self {
        ContentPart::Text {
            content_type: "text".to_string(),
            text,
        }
    }

    fn image(url: &str) -> Self {
        ContentPart::ImageUrl {
            content_type: "image_url".to_string(),
            image_url: ImageData {
                url: url.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ImageData {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: String,
}

#[derive(Debug, Deserialize)]
struct IngredientsReply {
    ingredients: IngredientList,
}

pub struct OpenRouterService {
    api_key: String,
    model: String,
    base_url: String,
    language: String,
    schema: NutritionSchema,
    client: reqwest::Client,
}

impl OpenRouterService {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            language: "Bahasa Indonesia".to_string(),
            schema: NutritionSchema::default(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_schema(mut self, schema: NutritionSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    async fn send_chat(&self, content: Vec<ContentPart>, max_tokens: u32) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content,
            }],
            max_tokens,
        };

        log::info!("🤖 Sending request to OpenRouter with model: {}", self.model);
        log::debug!("📤 Request payload size: {} bytes", serde_json::to_string(&request)?.len());

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", "https://github.com/foodwise")
            .header("X-Title", "FoodWise")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 OpenRouter response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("❌ OpenRouter API error response: {}", error_text);
            anyhow::bail!("OpenRouter API error ({}): {}", status, error_text);
        }

        let response_text = response.text().await?;
        log::debug!("📄 Raw OpenRouter response size: {} bytes", response_text.len());

        let chat_response: ChatResponse = serde_json::from_str(&response_text)?;
        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .context("OpenRouter response contained no choices")?;

        log::debug!("💬 OpenRouter response content: {}", choice.message.content);
        Ok(choice.message.content)
    }
}

/// Decode the first well-formed JSON object in a model reply, skipping
/// Markdown fences and prose around it (braces in the prose included).
fn extract_json<T: DeserializeOwned>(content: &str) -> Result<T> {
    let value = content
        .match_indices('{')
        .find_map(|(start, _)| {
            serde_json::Deserializer::from_str(&content[start..])
                .into_iter::<serde_json::Value>()
                .next()
                .and_then(|parsed| parsed.ok())
                .filter(serde_json::Value::is_object)
        })
        .context("model reply contained no JSON object")?;

    serde_json::from_value(value).context("model reply did not match the expected shape")
}

fn parse_detection(content: &str) -> Result<DetectionReply> {
    extract_json(content)
}

fn parse_ingredients(content: &str) -> Result<Vec<String>> {
    let reply: IngredientsReply = extract_json(content)?;

    let ingredients = match reply.ingredients {
        IngredientList::Items(items) => items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        IngredientList::Text(text) => nutrition::split_ingredients(&text),
    };
    Ok(ingredients)
}

#[async_trait::async_trait]
impl AIService for OpenRouterService {
    async fn detect_food(&self, image: &ImagePayload) -> Result<DetectionReply> {
        log::debug!(
            "📸 Starting image analysis ({}, {} bytes)",
            image.mime(),
            image.byte_len()
        );

        let content = vec![
            ContentPart::text(prompts::detection_prompt(&self.language, self.schema)),
            ContentPart::image(image.as_str()),
        ];

        let reply = self.send_chat(content, 1500).await?;
        parse_detection(&reply)
    }

    async fn list_ingredients(&self, food_name: &str) -> Result<Vec<String>> {
        log::info!("🥕 Requesting ingredients for: {}", food_name);

        let content = vec![ContentPart::text(prompts::ingredients_prompt(food_name))];
        let reply = self.send_chat(content, 400).await?;
        parse_ingredients(&reply)
    }

    async fn nutritional_breakdown(&self, food_name: &str, ingredients: &[String]) -> Result<String> {
        log::info!("🥗 Requesting nutritional breakdown for: {}", food_name);

        let content = vec![ContentPart::text(prompts::breakdown_prompt(
            food_name,
            ingredients,
            &self.language,
        ))];
        let reply = self.send_chat(content, 1000).await?;

        let text = reply.trim();
        if text.is_empty() {
            anyhow::bail!("model returned an empty nutritional breakdown");
        }
        Ok(text.to_string())
    }
}
