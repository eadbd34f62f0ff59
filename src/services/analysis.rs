use std::sync::Arc;

use crate::models::{AnalysisResult, DetectionReply, ImagePayload, IngredientList};
use crate::services::ai_service::AIService;
use crate::services::nutrition;

/// User-facing text for every failed image analysis.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Gagal menganalisis makanan dari gambar.";
pub const LOOKUP_FAILED_MESSAGE: &str = "Gagal mengambil informasi makanan.";

/// Failure returned to callers. Provider detail is logged, never carried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("{}", ANALYSIS_FAILED_MESSAGE)]
    Failed,
    #[error("{}", LOOKUP_FAILED_MESSAGE)]
    LookupFailed,
    #[error("food name must not be empty")]
    EmptyFoodName,
}

/// Action layer between callers and the AI provider.
pub struct FoodAnalyzer {
    provider: Arc<dyn AIService>,
}

impl FoodAnalyzer {
    pub fn new(provider: Arc<dyn AIService>) -> Self {
        Self { provider }
    }

    /// Analyze one image. Exactly one provider call, no retry.
    pub async fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        let reply = self.provider.detect_food(image).await.map_err(|e| {
            log::error!("❌ Food detection failed: {:#}", e);
            AnalysisError::Failed
        })?;

        let result = into_result(reply).map_err(|missing| {
            log::error!("❌ Food detection reply incomplete: missing {}", missing);
            AnalysisError::Failed
        })?;

        log::info!(
            "✅ Detected '{}' ({} ingredients)",
            result.food_name,
            result.ingredients.len()
        );
        Ok(result)
    }

    pub async fn list_ingredients(&self, food_name: &str) -> Result<Vec<String>, AnalysisError> {
        let food_name = food_name.trim();
        if food_name.is_empty() {
            return Err(AnalysisError::EmptyFoodName);
        }

        self.provider.list_ingredients(food_name).await.map_err(|e| {
            log::error!("❌ Ingredient lookup for '{}' failed: {:#}", food_name, e);
            AnalysisError::LookupFailed
        })
    }

    pub async fn nutritional_breakdown(
        &self,
        food_name: &str,
        ingredients: &[String],
    ) -> Result<String, AnalysisError> {
        let food_name = food_name.trim();
        if food_name.is_empty() {
            return Err(AnalysisError::EmptyFoodName);
        }

        self.provider
            .nutritional_breakdown(food_name, ingredients)
            .await
            .map_err(|e| {
                log::error!("❌ Nutritional breakdown for '{}' failed: {:#}", food_name, e);
                AnalysisError::LookupFailed
            })
    }
}

/// Check completeness of a provider reply. Returns the name of the first
/// missing field on failure.
fn into_result(reply: DetectionReply) -> Result<AnalysisResult, &'static str> {
    let food_name = reply
        .food_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or("foodName")?;

    let ingredients = match reply.ingredients.ok_or("ingredients")? {
        IngredientList::Items(items) => items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        IngredientList::Text(text) => nutrition::split_ingredients(&text),
    };

    let nutrition = reply.nutrition.ok_or("nutrition")?;

    let description = reply
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    Ok(AnalysisResult {
        food_name,
        description,
        ingredients,
        nutrition,
        analyzed_at: chrono::Utc::now(),
    })
}
