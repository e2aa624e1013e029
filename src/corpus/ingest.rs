//! Raw dataset ingestion.
//!
//! The source CSV stores list columns in two different textual encodings:
//! R vectors (`c("a", "b")`) for ingredients, quantities and instructions,
//! and list literals (`['a', 'b']`) for the keyword columns. Numeric columns
//! may contain gaps, which are filled with the column median.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use super::recipe::{DietaryFlag, DietaryFlags, Recipe};
use super::CorpusError;

const COL_ID: &str = "RecipeId";
const COL_NAME: &str = "Name";
const COL_CATEGORY: &str = "RecipeCategory";
const COL_INGREDIENTS: &str = "RecipeIngredientParts";
const COL_QUANTITIES: &str = "RecipeIngredientQuantities";
const COL_INSTRUCTIONS: &str = "RecipeInstructions";
const COL_KEYWORDS: &str = "Keywords";
const COL_KEYWORDS_NAME: &str = "keywords_name";
const COL_CALORIES: &str = "Calories";
const COL_TIME: &str = "TotalTime_minutes";
const COL_RATING: &str = "AggregatedRating";
const COL_REVIEWS: &str = "ReviewCount";
const COL_DESCRIPTION: &str = "Description";
const COL_IMAGES: &str = "Images";

const REQUIRED_COLUMNS: [&str; 8] = [
    COL_ID,
    COL_NAME,
    COL_CATEGORY,
    COL_INGREDIENTS,
    COL_KEYWORDS,
    COL_KEYWORDS_NAME,
    COL_CALORIES,
    COL_TIME,
];

fn is_missing(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed == "NA" || trimmed.eq_ignore_ascii_case("nan")
}

/// Extracts the quoted items of an R vector such as `c("salt", "pepper")`.
///
/// Empty and `NA` items are dropped. Anything without the `c(...)` wrapper
/// yields no items.
pub fn parse_r_vector(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if is_missing(trimmed) {
        return Vec::new();
    }
    match trimmed
        .strip_prefix("c(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(content) => quoted_items(content, &['"'])
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty() && !item.eq_ignore_ascii_case("na"))
            .collect(),
        None => Vec::new(),
    }
}

/// Parses a list literal such as `['easy', "quick meal"]`.
///
/// Anything that is not a bracketed list is taken as a single item.
pub fn parse_list_literal(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if is_missing(trimmed) {
        return Vec::new();
    }
    match trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        Some(content) => quoted_items(content, &['\'', '"']),
        None => vec![trimmed.to_string()],
    }
}

/// Collects the contents of quoted strings in `content`, honoring
/// backslash escapes. Unquoted text between items is ignored.
fn quoted_items(content: &str, quotes: &[char]) -> Vec<String> {
    let mut items = Vec::new();
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if !quotes.contains(&c) {
            continue;
        }
        let quote = c;
        let mut item = String::new();
        let mut escaped = false;
        for c in chars.by_ref() {
            if escaped {
                item.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                break;
            } else {
                item.push(c);
            }
        }
        items.push(item);
    }
    items
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim(), "TRUE" | "True" | "true" | "1" | "1.0")
}

fn parse_number(raw: &str) -> Option<f64> {
    if is_missing(raw) {
        return None;
    }
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn median(values: &[Option<f64>]) -> f64 {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return 0.0;
    }
    present.sort_by(|a, b| a.total_cmp(b));
    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        (present[mid - 1] + present[mid]) / 2.0
    } else {
        present[mid]
    }
}

fn fill_with_median(column: &str, values: Vec<Option<f64>>) -> Vec<f64> {
    let missing = values.iter().filter(|v| v.is_none()).count();
    let fill = median(&values);
    if missing > 0 {
        debug!("Filled {} missing {} values with median {}", missing, column, fill);
    }
    values.into_iter().map(|v| v.unwrap_or(fill)).collect()
}

fn field_of<'r>(
    record: &'r csv::StringRecord,
    columns: &HashMap<String, usize>,
    name: &str,
) -> &'r str {
    columns
        .get(name)
        .and_then(|i| record.get(*i))
        .unwrap_or_default()
}

/// Reads recipes from CSV data with a header row.
pub fn read_recipes<R: Read>(reader: R) -> Result<Vec<Recipe>, CorpusError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let columns: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_string(), i))
        .collect();

    for required in REQUIRED_COLUMNS {
        if !columns.contains_key(required) {
            return Err(CorpusError::MissingColumn(required.to_string()));
        }
    }
    let dietary_columns: Vec<(DietaryFlag, Option<usize>)> = DietaryFlag::ALL
        .into_iter()
        .map(|flag| (flag, columns.get(flag.column_name()).copied()))
        .collect();
    for (flag, index) in &dietary_columns {
        if index.is_none() {
            warn!("Dietary column '{}' missing, treating as all false", flag.column_name());
        }
    }

    let mut recipes = Vec::new();
    let mut calories = Vec::new();
    let mut times = Vec::new();
    let mut ratings = Vec::new();
    let mut reviews = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let field = |name: &str| field_of(&record, &columns, name);

        let raw_id = field(COL_ID);
        let id = parse_number(raw_id).ok_or_else(|| CorpusError::InvalidRecord {
            row,
            column: COL_ID.to_string(),
            value: raw_id.to_string(),
        })? as i64;

        let mut dietary = DietaryFlags::default();
        for (flag, index) in &dietary_columns {
            let raw = index.and_then(|i| record.get(i)).unwrap_or_default();
            dietary.set(*flag, parse_flag(raw));
        }

        calories.push(parse_number(field(COL_CALORIES)));
        times.push(parse_number(field(COL_TIME)));
        ratings.push(parse_number(field(COL_RATING)));
        reviews.push(parse_number(field(COL_REVIEWS)));

        recipes.push(Recipe {
            id,
            name: field(COL_NAME).trim().to_string(),
            category: field(COL_CATEGORY).trim().to_string(),
            ingredients: parse_r_vector(field(COL_INGREDIENTS)),
            keywords: parse_list_literal(field(COL_KEYWORDS)),
            keywords_name: parse_list_literal(field(COL_KEYWORDS_NAME)),
            calories: 0.0,
            total_time_minutes: 0,
            rating: 0.0,
            review_count: 0,
            description: field(COL_DESCRIPTION).to_string(),
            ingredient_quantities: parse_r_vector(field(COL_QUANTITIES)),
            instructions: parse_r_vector(field(COL_INSTRUCTIONS)),
            image_refs: field(COL_IMAGES).to_string(),
            dietary,
        });
    }

    let calories = fill_with_median(COL_CALORIES, calories);
    let times = fill_with_median(COL_TIME, times);
    let ratings = fill_with_median(COL_RATING, ratings);
    let reviews = fill_with_median(COL_REVIEWS, reviews);

    for (i, recipe) in recipes.iter_mut().enumerate() {
        recipe.calories = calories[i];
        recipe.total_time_minutes = times[i].round() as i64;
        recipe.rating = ratings[i];
        recipe.review_count = reviews[i].round() as i64;
    }

    Ok(recipes)
}

/// Loads the raw recipe dataset from a CSV file.
pub fn load_recipes_csv(path: &Path) -> Result<Vec<Recipe>, CorpusError> {
    info!("Reading recipe dataset from {:?}", path);
    let file = std::fs::File::open(path)?;
    let recipes = read_recipes(file)?;
    info!("Read {} recipes", recipes.len());
    Ok(recipes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "RecipeId,Name,RecipeCategory,RecipeIngredientParts,RecipeIngredientQuantities,RecipeInstructions,Keywords,keywords_name,Calories,TotalTime_minutes,AggregatedRating,ReviewCount,Description,Images,is_vegetarian,is_vegan,is_gluten free,is_dairy free,is_low carb,is_keto,is_paleo";

    fn csv_of(rows: &[&str]) -> String {
        let mut data = HEADER.to_string();
        for row in rows {
            data.push('\n');
            data.push_str(row);
        }
        data
    }

    #[test]
    fn parses_r_vectors() {
        assert_eq!(
            parse_r_vector(r#"c("chicken", "NA", "", "salt")"#),
            vec!["chicken", "salt"]
        );
        assert_eq!(parse_r_vector("NA"), Vec::<String>::new());
        assert_eq!(parse_r_vector(""), Vec::<String>::new());
        assert_eq!(parse_r_vector(r#"c("butter")"#), vec!["butter"]);
    }

    #[test]
    fn bare_values_are_not_r_vectors() {
        assert_eq!(parse_r_vector("\"salt\""), Vec::<String>::new());
        assert_eq!(parse_r_vector("salt"), Vec::<String>::new());
        assert_eq!(parse_r_vector("c(\"salt\""), Vec::<String>::new());
    }

    #[test]
    fn bare_ingredient_cell_gives_no_ingredients() {
        let data = csv_of(&[
            "1,A,pie,salt,NA,Bake.,[],[],100,10,4,1,,NA,FALSE,FALSE,FALSE,FALSE,FALSE,FALSE,FALSE",
        ]);
        let recipes = read_recipes(data.as_bytes()).unwrap();
        assert!(recipes[0].ingredients.is_empty());
        assert!(recipes[0].instructions.is_empty());
    }

    #[test]
    fn parses_list_literals() {
        assert_eq!(
            parse_list_literal(r#"['easy', "quick meal", 'kid\'s']"#),
            vec!["easy", "quick meal", "kid's"]
        );
        assert_eq!(parse_list_literal("[]"), Vec::<String>::new());
        assert_eq!(parse_list_literal("dessert"), vec!["dessert"]);
        assert_eq!(parse_list_literal("NA"), Vec::<String>::new());
    }

    #[test]
    fn reads_a_full_record() {
        let data = csv_of(&[
            r#"38,Low-Fat Berry Blue Frozen Dessert,Frozen Desserts,"c(""blueberries"", ""sugar"")","c(""4"", ""1/4"")","c(""Toss berries."")","['dessert', 'low cholesterol']","['frozen', 'desserts']",170.9,1485,4.5,4,Make and freeze.,"c(""https://img.example/a.jpg"")",TRUE,FALSE,true,0,1,FALSE,FALSE"#,
        ]);
        let recipes = read_recipes(data.as_bytes()).unwrap();
        assert_eq!(recipes.len(), 1);
        let recipe = &recipes[0];
        assert_eq!(recipe.id, 38);
        assert_eq!(recipe.category, "Frozen Desserts");
        assert_eq!(recipe.ingredients, vec!["blueberries", "sugar"]);
        assert_eq!(recipe.keywords, vec!["dessert", "low cholesterol"]);
        assert_eq!(recipe.keywords_name, vec!["frozen", "desserts"]);
        assert_eq!(recipe.calories, 170.9);
        assert_eq!(recipe.total_time_minutes, 1485);
        assert_eq!(recipe.review_count, 4);
        assert_eq!(recipe.instructions, vec!["Toss berries."]);
        assert!(recipe.image_refs.contains("https://img.example/a.jpg"));
        assert!(recipe.dietary.get(DietaryFlag::Vegetarian));
        assert!(!recipe.dietary.get(DietaryFlag::Vegan));
        assert!(recipe.dietary.get(DietaryFlag::GlutenFree));
        assert!(recipe.dietary.get(DietaryFlag::LowCarb));
    }

    #[test]
    fn fills_missing_numbers_with_median() {
        let data = csv_of(&[
            "1,A,pie,NA,NA,NA,[],[],100,10,4,1,,NA,FALSE,FALSE,FALSE,FALSE,FALSE,FALSE,FALSE",
            "2,B,pie,NA,NA,NA,[],[],oops,20,5,1,,NA,FALSE,FALSE,FALSE,FALSE,FALSE,FALSE,FALSE",
            "3,C,pie,NA,NA,NA,[],[],300,,3,1,,NA,FALSE,FALSE,FALSE,FALSE,FALSE,FALSE,FALSE",
        ]);
        let recipes = read_recipes(data.as_bytes()).unwrap();
        assert_eq!(recipes[1].calories, 200.0);
        assert_eq!(recipes[2].total_time_minutes, 15);
    }

    #[test]
    fn missing_required_column_is_reported() {
        let data = "RecipeId,Name\n1,Soup";
        let result = read_recipes(data.as_bytes());
        assert!(matches!(result, Err(CorpusError::MissingColumn(c)) if c == "RecipeCategory"));
    }

    #[test]
    fn unparsable_id_is_rejected() {
        let data = csv_of(&[
            "abc,A,pie,NA,NA,NA,[],[],100,10,4,1,,NA,FALSE,FALSE,FALSE,FALSE,FALSE,FALSE,FALSE",
        ]);
        let result = read_recipes(data.as_bytes());
        assert!(matches!(result, Err(CorpusError::InvalidRecord { row: 0, .. })));
    }
}
