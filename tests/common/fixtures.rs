//! Test fixture creation
//!
//! Writes a small recipe dataset in the raw CSV encoding (R vectors for
//! ingredient lists, list literals for keywords) into a temporary directory.

use super::constants::*;
use anyhow::Result;
use std::path::PathBuf;
use tempfile::TempDir;

const HEADER: [&str; 21] = [
    "RecipeId",
    "Name",
    "RecipeCategory",
    "RecipeIngredientParts",
    "RecipeIngredientQuantities",
    "RecipeInstructions",
    "Keywords",
    "keywords_name",
    "Calories",
    "TotalTime_minutes",
    "AggregatedRating",
    "ReviewCount",
    "Description",
    "Images",
    "is_vegetarian",
    "is_vegan",
    "is_gluten free",
    "is_dairy free",
    "is_low carb",
    "is_keto",
    "is_paleo",
];

struct FixtureRecipe {
    id: i64,
    name: &'static str,
    category: &'static str,
    ingredients: &'static str,
    keywords: &'static str,
    keywords_name: &'static str,
    calories: &'static str,
    time: &'static str,
    rating: &'static str,
    reviews: &'static str,
    images: String,
    /// vegetarian, vegan, gluten free, dairy free, low carb, keto, paleo
    dietary: [bool; 7],
}

fn fixture_recipes() -> Vec<FixtureRecipe> {
    vec![
        FixtureRecipe {
            id: LEMON_CHICKEN_ID,
            name: LEMON_CHICKEN_NAME,
            category: "chicken",
            ingredients: r#"c("chicken breast", "lemon", "garlic")"#,
            keywords: "['easy', 'dinner']",
            keywords_name: "['lemon', 'garlic', 'chicken']",
            calories: "320",
            time: "40",
            rating: "4.5",
            reviews: "12",
            images: format!(r#"c("{}")"#, LEMON_CHICKEN_IMAGE),
            dietary: [false, false, true, false, false, false, false],
        },
        FixtureRecipe {
            id: BUFFALO_WINGS_ID,
            name: BUFFALO_WINGS_NAME,
            category: "chicken",
            ingredients: r#"c("chicken wings", "hot sauce", "butter")"#,
            keywords: "['spicy', 'party']",
            keywords_name: "['buffalo', 'chicken', 'wings']",
            calories: "780",
            time: "55",
            rating: "4.0",
            reviews: "30",
            images: "NA".to_string(),
            dietary: [false; 7],
        },
        FixtureRecipe {
            id: LAVA_CAKE_ID,
            name: LAVA_CAKE_NAME,
            category: "dessert",
            ingredients: r#"c("chocolate", "butter", "sugar", "eggs", "flour")"#,
            keywords: "['sweet', 'baking']",
            keywords_name: "['chocolate', 'lava', 'cake']",
            calories: "520",
            time: "25",
            rating: "4.8",
            reviews: "50",
            images: "NA".to_string(),
            dietary: [true, false, false, false, false, false, false],
        },
        FixtureRecipe {
            id: QUINOA_SALAD_ID,
            name: QUINOA_SALAD_NAME,
            category: "vegetable",
            ingredients: r#"c("quinoa", "cucumber", "tomato", "lemon")"#,
            keywords: "['healthy', 'vegan']",
            keywords_name: "['quinoa', 'garden', 'salad']",
            calories: "280",
            time: "20",
            rating: "4.2",
            reviews: "8",
            images: "NA".to_string(),
            dietary: [true, true, true, true, false, false, false],
        },
        FixtureRecipe {
            id: BEEF_STEW_ID,
            name: BEEF_STEW_NAME,
            category: "stew",
            ingredients: r#"c("beef", "potatoes", "carrots", "onions")"#,
            keywords: "['hearty', 'winter']",
            keywords_name: "['beef', 'stew']",
            calories: "610",
            time: "150",
            rating: "4.6",
            reviews: "25",
            images: "NA".to_string(),
            dietary: [false, false, true, true, false, false, true],
        },
        FixtureRecipe {
            id: MATCHA_LATTE_ID,
            name: MATCHA_LATTE_NAME,
            category: "beverages",
            ingredients: r#"c("matcha powder", "milk", "ice")"#,
            keywords: "['drink', 'cold']",
            keywords_name: "['matcha', 'latte']",
            calories: "NA",
            time: "5",
            rating: "NA",
            reviews: "NA",
            images: "NA".to_string(),
            dietary: [true, false, true, false, false, false, false],
        },
    ]
}

fn flag(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// Writes the fixture dataset and the form data document.
///
/// Returns the directory guard, the CSV path and the form data path.
pub fn create_test_dataset() -> Result<(TempDir, PathBuf, PathBuf)> {
    let dir = TempDir::new()?;
    let csv_path = dir.path().join("recipe_dataset.csv");
    let form_data_path = dir.path().join("form_data.json");

    let mut writer = csv::Writer::from_path(&csv_path)?;
    writer.write_record(HEADER)?;
    for recipe in fixture_recipes() {
        let id = recipe.id.to_string();
        let description = format!("A fixture recipe for {}.", recipe.name.to_lowercase());
        let mut record = vec![
            id.as_str(),
            recipe.name,
            recipe.category,
            recipe.ingredients,
            r#"c("1", "2")"#,
            r#"c("Prepare.", "Serve.")"#,
            recipe.keywords,
            recipe.keywords_name,
            recipe.calories,
            recipe.time,
            recipe.rating,
            recipe.reviews,
            description.as_str(),
            recipe.images.as_str(),
        ];
        record.extend(recipe.dietary.iter().map(|v| flag(*v)));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    std::fs::write(&form_data_path, FORM_DATA_JSON)?;

    Ok((dir, csv_path, form_data_path))
}
