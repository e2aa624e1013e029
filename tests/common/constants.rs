//! Shared constants for end-to-end tests
//!
//! When the fixture dataset changes, update only this file.

// ============================================================================
// Fixture Recipes
// ============================================================================

pub const LEMON_CHICKEN_ID: i64 = 101;
pub const LEMON_CHICKEN_NAME: &str = "Lemon Garlic Chicken";
pub const LEMON_CHICKEN_IMAGE: &str = "https://img.example/lemon-chicken.jpg";

pub const BUFFALO_WINGS_ID: i64 = 102;
pub const BUFFALO_WINGS_NAME: &str = "Buffalo Chicken Wings";

pub const LAVA_CAKE_ID: i64 = 103;
pub const LAVA_CAKE_NAME: &str = "Chocolate Lava Cake";

pub const QUINOA_SALAD_ID: i64 = 104;
pub const QUINOA_SALAD_NAME: &str = "Quinoa Garden Salad";

pub const BEEF_STEW_ID: i64 = 105;
pub const BEEF_STEW_NAME: &str = "Beef Stew";

pub const MATCHA_LATTE_ID: i64 = 106;
pub const MATCHA_LATTE_NAME: &str = "Iced Matcha Latte";

pub const FIXTURE_RECIPE_COUNT: usize = 6;

/// Served verbatim by `/api/form-data`.
pub const FORM_DATA_JSON: &str =
    r#"{"categories":["chicken","dessert","vegetable"],"dietary":["is_vegan","is_keto"]}"#;

// ============================================================================
// Timeouts
// ============================================================================

/// Timeout for HTTP requests in tests
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Maximum time to wait for server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Polling interval when waiting for server readiness
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Shared provider deadline used by the test coordinator
pub const IMAGE_SEARCH_DEADLINE_MS: u64 = 200;
