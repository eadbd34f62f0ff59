use anyhow::Result;

use crate::models::{DetectionReply, ImagePayload};

/// Trait for AI providers (OpenRouter, test doubles, ...)
#[async_trait::async_trait]
pub trait AIService: Send + Sync {
    /// Identify the food in an image. One remote call, no retry.
    async fn detect_food(&self, image: &ImagePayload) -> Result<DetectionReply>;
    async fn list_ingredients(&self, food_name: &str) -> Result<Vec<String>>;
    async fn nutritional_breakdown(&self, food_name: &str, ingredients: &[String]) -> Result<String>;
}
