//! CSS selectors for the panel's admin pages

// Login page
pub const LOGIN_USERNAME: &str = "#inputLogin";
pub const LOGIN_PASSWORD: &str = "#inputPassword";
pub const LOGIN_SUBMIT: &str = "body > div.container > form > button";

const NAVBAR: &str =
    "#navbar-menu > div.d-flex.flex-column.flex-md-row.flex-fill.align-items-stretch.align-items-md-center > ul";

/// Navbar link to the key search page
pub fn nav_key_search() -> String {
    format!("{NAVBAR} > li:nth-child(2) > a")
}

/// Navbar link to the key creation page
pub fn nav_key_create() -> String {
    format!("{NAVBAR} > li:nth-child(3) > a")
}

// Key creation form
pub const CREATE_FORM: &str = "body > div > div.content > div > div > div > div.card-body > form";
pub const CREATE_COUNT: &str =
    "body > div > div.content > div > div > div > div.card-body > form > div:nth-child(1) > input:nth-child(2)";
pub const CREATE_DAYS: &str =
    "body > div > div.content > div > div > div > div.card-body > form > div:nth-child(3) > input";
pub const CREATE_NOTE: &str =
    "body > div > div.content > div > div > div > div.card-body > form > div:nth-child(4) > textarea";
pub const CREATE_SUBMIT: &str =
    "body > div > div.content > div > div > div > div.card-body > form > button";
pub const CREATED_KEYS: &str = "#lastCreatedKeysTextarea";

// Key search form and results
pub const SEARCH_FIELD: &str =
    "body > div > div.content > div > div > div.col-12 > div > div > form > div > div.col-md-3 > select";
pub const SEARCH_FIELD_KEY: &str = "key";
pub const SEARCH_INPUT: &str =
    "body > div > div.content > div > div > div.col-12 > div > div > form > div > div.col > input";
pub const SEARCH_SUBMIT: &str =
    "body > div > div.content > div > div > div.col-12 > div > div > form > div > div:nth-child(3) > button";
pub const SEARCH_RESULT_ROW: &str =
    "body > div > div.content > div > div > div.col-md-12 > div > div.table-responsive > table > tbody > tr";
pub const RESET_HWID_BADGE: &str =
    "body > div > div.content > div > div > div.col-md-12 > div > div.table-responsive > table > tbody > tr > td:nth-child(6) > a.badge.bg-yellow-lt";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navbar_links() {
        assert!(nav_key_search().ends_with("li:nth-child(2) > a"));
        assert!(nav_key_create().ends_with("li:nth-child(3) > a"));
        assert!(nav_key_create().starts_with("#navbar-menu"));
    }
}
