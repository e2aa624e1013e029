use serde::{Deserialize, Serialize};

/// Fixed weight of the rating block; applied at build time and not
/// overridable per request.
pub const RATING_WEIGHT: f64 = 0.05;

/// Per-feature-group weights.
///
/// Missing fields in a serialized config fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    pub ingredients: f64,
    pub category: f64,
    pub dietary: f64,
    pub calories: f64,
    pub time: f64,
    pub keywords: f64,
    pub keywords_name: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            ingredients: 0.15,
            category: 0.25,
            dietary: 0.20,
            calories: 0.10,
            time: 0.10,
            keywords: 0.10,
            keywords_name: 0.10,
        }
    }
}

impl WeightConfig {
    /// Profile used for queries produced by free-text attribute extraction:
    /// only the text features count.
    pub fn extraction() -> Self {
        Self {
            ingredients: 0.50,
            category: 0.0,
            dietary: 0.0,
            calories: 0.0,
            time: 0.0,
            keywords: 0.40,
            keywords_name: 0.10,
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            ingredients: self.ingredients * factor,
            category: self.category * factor,
            dietary: self.dietary * factor,
            calories: self.calories * factor,
            time: self.time * factor,
            keywords: self.keywords * factor,
            keywords_name: self.keywords_name * factor,
        }
    }

    /// Name of the first negative or non-finite weight, if any.
    pub fn invalid_field(&self) -> Option<&'static str> {
        [
            ("ingredients", self.ingredients),
            ("category", self.category),
            ("dietary", self.dietary),
            ("calories", self.calories),
            ("time", self.time),
            ("keywords", self.keywords),
            ("keywords_name", self.keywords_name),
        ]
        .into_iter()
        .find(|(_, w)| !w.is_finite() || *w < 0.0)
        .map(|(name, _)| name)
    }
}
