//! Recipe records as held by the corpus.
//!
//! All list-typed fields are already normalized to `Vec<String>` by the time a
//! `Recipe` exists; the raw delimited encodings only live in the CSV loader.

use serde::{Deserialize, Serialize};

// =============================================================================
// Dietary flags
// =============================================================================

/// The seven dietary columns, in feature-matrix column order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum DietaryFlag {
    Vegetarian,
    Vegan,
    GlutenFree,
    DairyFree,
    LowCarb,
    Keto,
    Paleo,
}

impl DietaryFlag {
    pub const ALL: [DietaryFlag; 7] = [
        DietaryFlag::Vegetarian,
        DietaryFlag::Vegan,
        DietaryFlag::GlutenFree,
        DietaryFlag::DairyFree,
        DietaryFlag::LowCarb,
        DietaryFlag::Keto,
        DietaryFlag::Paleo,
    ];

    /// Column name used by the raw dataset and by query payloads.
    pub fn column_name(&self) -> &'static str {
        match self {
            DietaryFlag::Vegetarian => "is_vegetarian",
            DietaryFlag::Vegan => "is_vegan",
            DietaryFlag::GlutenFree => "is_gluten free",
            DietaryFlag::DairyFree => "is_dairy free",
            DietaryFlag::LowCarb => "is_low carb",
            DietaryFlag::Keto => "is_keto",
            DietaryFlag::Paleo => "is_paleo",
        }
    }

    /// Position of this flag inside the dietary block.
    pub fn index(&self) -> usize {
        DietaryFlag::ALL
            .iter()
            .position(|f| f == self)
            .unwrap_or_default()
    }

    /// Parses a dietary preference as sent by clients.
    ///
    /// Accepts the dataset column names (`is_gluten free`) as well as the
    /// looser spellings `gluten free`, `gluten-free` and `gluten_free`.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        let normalized = normalized
            .strip_prefix("is ")
            .unwrap_or(&normalized)
            .trim()
            .to_string();
        DietaryFlag::ALL
            .into_iter()
            .find(|flag| flag.column_name().trim_start_matches("is_") == normalized)
    }
}

/// Per-recipe 0/1 dietary columns, in [`DietaryFlag::ALL`] order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietaryFlags(pub [u8; 7]);

impl DietaryFlags {
    pub fn get(&self, flag: DietaryFlag) -> bool {
        self.0[flag.index()] != 0
    }

    pub fn set(&mut self, flag: DietaryFlag, value: bool) {
        self.0[flag.index()] = value as u8;
    }
}

// =============================================================================
// Recipe
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub ingredients: Vec<String>,
    pub keywords: Vec<String>,
    pub keywords_name: Vec<String>,
    pub calories: f64,
    pub total_time_minutes: i64,
    pub rating: f64,
    pub review_count: i64,
    pub description: String,
    pub ingredient_quantities: Vec<String>,
    pub instructions: Vec<String>,
    /// Raw image reference text as found in the source data (may be `NA`,
    /// an R vector of URLs, or free text). Parsed lazily by the image
    /// coordinator.
    pub image_refs: String,
    pub dietary: DietaryFlags,
}
