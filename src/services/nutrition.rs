use crate::models::{NutritionCategory, NutritionEntry, NutritionFact, NutritionFacts};

/// Keyword groups in matching order. First hit wins.
const CATEGORY_KEYWORDS: &[(NutritionCategory, &[&str])] = &[
    (
        NutritionCategory::Energy,
        &["calorie", "kalori", "energy", "energi", "kcal"],
    ),
    (NutritionCategory::Protein, &["protein"]),
    (
        NutritionCategory::Carbohydrate,
        &["carbohydrate", "carbs", "karbohidrat"],
    ),
    (NutritionCategory::Fat, &["fat", "lemak"]),
    (NutritionCategory::VitaminMineral, &["vitamin", "mineral"]),
];

const LABEL_DECORATION: &[char] = &['*', '-', '•', '#', '_'];

pub fn categorize(label: &str) -> NutritionCategory {
    let label = label.to_lowercase();

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| label.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(NutritionCategory::Info)
}

fn clean_label(label: &str) -> &str {
    label.trim_matches(|c: char| c.is_whitespace() || LABEL_DECORATION.contains(&c))
}

fn clean_value(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '*')
}

/// Parse a free-text nutrition block, one `Label: value` per line.
///
/// Blank lines, lines without a `:` and lines that end up with an empty
/// label or value are dropped without complaint.
pub fn parse_nutrition_text(text: &str) -> Vec<NutritionFact> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let (label, value) = line.split_once(':')?;
            let label = clean_label(label);
            let value = clean_value(value);
            if label.is_empty() || value.is_empty() {
                return None;
            }
            Some(NutritionFact {
                label: label.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

fn to_entry(label: &str, value: &str) -> Option<NutritionEntry> {
    let label = clean_label(label);
    let value = clean_value(value);
    if label.is_empty() || value.is_empty() {
        return None;
    }

    let category = categorize(label);
    Some(NutritionEntry {
        label: label.to_string(),
        value: value.to_string(),
        category,
        icon: category.icon(),
    })
}

/// Flatten either nutrition schema into display entries, preserving order.
pub fn normalize(facts: &NutritionFacts) -> Vec<NutritionEntry> {
    match facts {
        NutritionFacts::Text(text) => parse_nutrition_text(text)
            .iter()
            .filter_map(|fact| to_entry(&fact.label, &fact.value))
            .collect(),
        NutritionFacts::Entries(entries) => entries
            .iter()
            .filter_map(|fact| to_entry(&fact.label, &fact.value))
            .collect(),
    }
}

/// Split a legacy ingredient string ("rice, egg and chili") into items.
pub fn split_ingredients(text: &str) -> Vec<String> {
    text.split(',')
        .flat_map(|part| part.split(" and "))
        .flat_map(|part| part.split(" dan "))
        .map(|item| item.trim().trim_end_matches('.').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
