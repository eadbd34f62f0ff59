use crate::models::NutritionSchema;

/// Nutrition facts every detection answer must cover, per serving.
pub const REQUIRED_NUTRIENTS: &[&str] = &[
    "Calories (kcal)",
    "Protein (g)",
    "Carbohydrates (g)",
    "Total fat (g), broken down into saturated, monounsaturated and polyunsaturated fat (g)",
    "Cholesterol (mg)",
    "Fiber (g)",
    "Sugar (g)",
    "Sodium (mg)",
    "Key vitamins (e.g. Vitamin A, Vitamin C, Vitamin D)",
    "Key minerals (e.g. calcium, iron, potassium)",
];

fn nutrition_shape(schema: NutritionSchema) -> &'static str {
    match schema {
        NutritionSchema::Structured => {
            r#""nutrition": [{"label": "<nutrient name>", "value": "<amount with unit>"}, ...]"#
        }
        NutritionSchema::Text => {
            r#""nutrition": "<one line per nutrient, formatted as 'Label: value'>""#
        }
    }
}

pub fn detection_prompt(language: &str, schema: NutritionSchema) -> String {
    let nutrients = REQUIRED_NUTRIENTS
        .iter()
        .map(|n| format!("    - {}", n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a nutritionist and food expert. Look at the attached photo and answer in {language}.\n\
         \n\
         Your tasks:\n\
         1. Identify the name of the food in the photo.\n\
         2. Give a short, appealing description of the food.\n\
         3. List the main ingredients used to make it.\n\
         4. Give a complete nutritional breakdown for one serving. It MUST include:\n\
         {nutrients}\n\
         \n\
         Reply with a single JSON object and nothing else, using exactly this shape:\n\
         {{\"foodName\": \"<name>\", \"description\": \"<short description>\", \
         \"ingredients\": [\"<ingredient>\", ...], {shape}}}",
        language = language,
        nutrients = nutrients,
        shape = nutrition_shape(schema),
    )
}

pub fn ingredients_prompt(food_name: &str) -> String {
    format!(
        "List the typical ingredients found in {}.\n\
         Reply with a single JSON object and nothing else: {{\"ingredients\": [\"<ingredient>\", ...]}}",
        food_name
    )
}

pub fn breakdown_prompt(food_name: &str, ingredients: &[String], language: &str) -> String {
    format!(
        "Provide a detailed nutritional breakdown of the following food item and its ingredients:\n\
         \n\
         Food Item: {}\n\
         Ingredients: {}\n\
         \n\
         Please include information on calories, protein, carbohydrates, fats, vitamins, and minerals. \
         Format the output in a clear and easy-to-understand manner, one 'Label: value' per line, \
         written in {}.",
        food_name,
        ingredients.join(", "),
        language
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_prompt_lists_required_nutrients_and_language() {
        let prompt = detection_prompt("Bahasa Indonesia", NutritionSchema::Structured);

        assert!(prompt.contains("answer in Bahasa Indonesia"));
        for nutrient in REQUIRED_NUTRIENTS {
            assert!(prompt.contains(nutrient), "missing {}", nutrient);
        }
        assert!(prompt.contains(r#""label": "<nutrient name>""#));
    }

    #[test]
    fn test_detection_prompt_text_schema() {
        let prompt = detection_prompt("English", NutritionSchema::Text);
        assert!(prompt.contains("'Label: value'"));
        assert!(!prompt.contains("<nutrient name>"));
    }

    #[test]
    fn test_breakdown_prompt_joins_ingredients() {
        let prompt = breakdown_prompt(
            "Rendang",
            &["beef".to_string(), "coconut milk".to_string()],
            "English",
        );
        assert!(prompt.contains("Food Item: Rendang"));
        assert!(prompt.contains("Ingredients: beef, coconut milk"));
    }
}
