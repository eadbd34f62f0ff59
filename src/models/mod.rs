use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image formats accepted at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMime {
    Jpeg,
    Png,
}

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
        }
    }

    /// Match a declared content type against the whitelist.
    /// Parameters such as `; charset=...` are ignored, case is not significant.
    pub fn from_declared(declared: &str) -> Option<Self> {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();

        match essence.as_str() {
            "image/jpeg" => Some(ImageMime::Jpeg),
            "image/png" => Some(ImageMime::Png),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageMime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Embedded image payload: `data:<mime>;base64,<body>`.
///
/// Only constructed through intake, so holding one means the MIME type is
/// on the whitelist and the body decodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime: ImageMime,
    data_uri: String,
    byte_len: usize,
}

impl ImagePayload {
    pub(crate) fn new(mime: ImageMime, data_uri: String, byte_len: usize) -> Self {
        Self {
            mime,
            data_uri,
            byte_len,
        }
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn as_str(&self) -> &str {
        &self.data_uri
    }

    /// Size of the decoded image in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionFact {
    #[serde(alias = "name", alias = "nutrient")]
    pub label: String,
    #[serde(alias = "amount")]
    pub value: String,
}

/// Nutrition data in either of the two schema versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NutritionFacts {
    /// Current schema: ordered label/value pairs.
    Entries(Vec<NutritionFact>),
    /// Legacy schema: one free-text block, `Label: value` per line.
    Text(String),
}

impl NutritionFacts {
    pub fn is_empty(&self) -> bool {
        match self {
            NutritionFacts::Entries(entries) => entries.is_empty(),
            NutritionFacts::Text(text) => text.trim().is_empty(),
        }
    }
}

/// Which nutrition shape the provider is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NutritionSchema {
    #[default]
    Structured,
    Text,
}

impl NutritionSchema {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "structured" | "list" | "entries" => Some(NutritionSchema::Structured),
            "text" | "legacy" | "free-text" => Some(NutritionSchema::Text),
            _ => None,
        }
    }
}

/// Display grouping for a nutrition entry. Only used to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NutritionCategory {
    Energy,
    Protein,
    Carbohydrate,
    Fat,
    VitaminMineral,
    Info,
}

impl NutritionCategory {
    pub fn icon(&self) -> &'static str {
        match self {
            NutritionCategory::Energy => "Flame",
            NutritionCategory::Protein => "Beef",
            NutritionCategory::Carbohydrate => "Wheat",
            NutritionCategory::Fat => "Droplets",
            NutritionCategory::VitaminMineral => "Leaf",
            NutritionCategory::Info => "Info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionEntry {
    pub label: String,
    pub value: String,
    pub category: NutritionCategory,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub food_name: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub nutrition: NutritionFacts,
    pub analyzed_at: DateTime<Utc>,
}

/// Ingredients as returned by the provider: a list, or one comma-separated string
/// in older replies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IngredientList {
    Items(Vec<String>),
    Text(String),
}

/// Raw detection reply. Every field is optional here; completeness is
/// checked by the analyzer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectionReply {
    #[serde(default, alias = "foodName")]
    pub food_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Option<IngredientList>,
    #[serde(
        default,
        alias = "nutritionPerServing",
        alias = "nutrition_per_serving",
        alias = "nutritionalInformation"
    )]
    pub nutrition: Option<NutritionFacts>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Idle,
    Loading,
    Success,
    Error,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequestStatus::Idle => "idle",
            RequestStatus::Loading => "loading",
            RequestStatus::Success => "success",
            RequestStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}
