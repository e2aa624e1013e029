//! Normalization of free-text category guesses onto the curated category
//! list used by the attribute-extraction path.
//!
//! This list is separate from the category vocabulary the corpus learns from
//! its own data; a normalized category only has an effect on ranking when
//! the corpus happens to use the same label.

/// Minimum normalized edit-distance similarity for a fuzzy match.
const FUZZY_SIMILARITY_FLOOR: f64 = 0.8;

pub const RECIPE_CATEGORIES: [&str; 216] = [
    "frozen desserts", "chicken breast", "beverages", "soy/tofu", "vegetable", "pie", "chicken",
    "dessert", "southwestern u.s.", "sauces", "stew", "black beans", "< 60 mins", "lactose free",
    "yeast breads", "whole chicken", "cheesecake", "free of...", "brazilian", "breakfast",
    "breads", "bar cookie", "brown rice", "oranges", "pork", "low protein", "asian", "potato",
    "cheese", "halibut", "meat", "lamb/sheep", "very low carbs", "spaghetti", "scones",
    "drop cookies", "lunch/snacks", "beans", "punch beverage", "pineapple", "quick breads",
    "sourdough breads", "curries", "chicken livers", "coconut", "savory pies", "poultry", "steak",
    "healthy", "rice", "apple", "spreads", "crab", "jellies", "pears", "chowders", "cauliflower",
    "candy", "chutneys", "white rice", "tex mex", "bass", "fruit", "european", "smoothies",
    "manicotti", "onions", "new zealand", "chicken thigh & leg", "indonesian", "greek", "corn",
    "lentil", "long grain rice", "southwest asia (middle east)", "spanish", "dutch", "gelatin",
    "tuna", "citrus", "berries", "peppers", "salad dressings", "clear soup", "mexican",
    "raspberries", "crawfish", "beef organ meats", "lobster", "strawberry", "shakes",
    "short grain rice", "< 15 mins", "german", "one dish meal", "thai", "cajun", "russian",
    "melons", "swiss", "papaya", "veal", "orange roughy", "canadian", "caribbean", "mussels",
    "medium grain rice", "japanese", "penne", "elk", "colombian", "gumbo", "roast beef", "perch",
    "vietnamese", "rabbit", "lebanese", "turkish", "kid friendly", "whole turkey", "chinese",
    "grains", "yam/sweet potato", "meatloaf", "trout", "african", "ham", "goose", "pasta shells",
    "stocks", "meatballs", "whole duck", "scandinavian", "greens", "catfish", "duck breasts",
    "polish", "deer", "wild game", "pheasant", "hungarian", "no shell fish", "collard greens",
    "tilapia", "quail", "moroccan", "squid", "korean", "plums", "danish", "creole", "mahi mahi",
    "tarts", "hawaiian", "austrian", "moose", "native american", "swedish", "norwegian",
    "ethiopian", "belgian", "australian", "bear", "scottish", "tempeh", "cuban", "spinach",
    "turkey breasts", "cantonese", "tropical fruits", "peanut butter", "szechuan", "portuguese",
    "costa rican", "duck", "nuts", "filipino", "pot pie", "polynesian", "mango", "cherries",
    "egyptian", "chard", "lime", "lemon", "kiwifruit", "whitefish", "south american", "malaysian",
    "octopus", "nigerian", "south african", "nepalese", "palestinian", "czech", "avocado", "iraqi",
    "pakistani", "chocolate chip cookies", "finnish", "puerto rican", "cambodian", "honduran",
    "mongolian", "peruvian", "turkey gravy", "somalian", "ice cream", "oatmeal", "artichoke",
    "indian", "grapes", "macaroni and cheese", "mashed potatoes", "pumpkin", "guatemalan",];

/// Levenshtein edit distance between two strings, by characters.
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row: Vec<usize> = vec![0; b.len() + 1];
    for (i, a_char) in a.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_char) in b.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }
    prev_row[b.len()]
}

/// Similarity in `[0, 1]`: one minus the edit distance over the longer length.
fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(a, b) as f64 / longest as f64
}

/// Closest curated category for `guess`, or an empty string.
///
/// Tried in order: exact case-insensitive match, a single-word guess equal to
/// a category, the first category containing any word of the guess, and
/// finally the most similar category above the fuzzy floor.
pub fn find_closest_category(guess: &str) -> String {
    find_in(guess, &RECIPE_CATEGORIES)
}

fn find_in(guess: &str, categories: &[&str]) -> String {
    let lowered = guess.trim().to_lowercase();
    if lowered.is_empty() {
        return String::new();
    }

    if let Some(exact) = categories.iter().find(|c| c.to_lowercase() == lowered) {
        return exact.to_string();
    }

    let words: Vec<&str> = lowered.split_whitespace().collect();
    if let [word] = words.as_slice() {
        if let Some(exact) = categories.iter().find(|c| c.to_lowercase() == *word) {
            return exact.to_string();
        }
    }

    for word in &words {
        if let Some(containing) = categories.iter().find(|c| c.to_lowercase().contains(word)) {
            return containing.to_string();
        }
    }

    categories
        .iter()
        .map(|c| (c, similarity(&lowered, &c.to_lowercase())))
        .filter(|(_, score)| *score > FUZZY_SIMILARITY_FLOOR)
        .fold(None, |best: Option<(&&str, f64)>, candidate| match best {
            Some(b) if b.1 >= candidate.1 => Some(b),
            _ => Some(candidate),
        })
        .map(|(c, _)| c.to_string())
        .unwrap_or_default()
}
