pub mod ai_service; // Provider abstraction
pub mod analysis;
pub mod intake;
pub mod nutrition;
pub mod openrouter; // OpenRouter AI service
pub mod prompts;

pub use ai_service::AIService;
pub use analysis::FoodAnalyzer;
pub use openrouter::OpenRouterService;
