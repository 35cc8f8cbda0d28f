//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{MovieInput, RegisterRequest};

/// Earliest plausible release year (first films)
const MIN_YEAR: i32 = 1888;
/// Upper bound leaves room for announced releases
const MAX_YEAR: i32 = 2100;

/// Validate display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    Ok(())
}

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if username.len() > 32 {
        return Err("Username must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 6 {
        return Err("Password must be at least 6 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate a registration payload, collecting every failure
pub fn validate_registration(payload: &RegisterRequest) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_name(&payload.name) {
        errors.push(e);
    }
    if let Err(e) = validate_username(&payload.username) {
        errors.push(e);
    }
    if let Err(e) = validate_password(&payload.password) {
        errors.push(e);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Validate movie title
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title is required".to_string());
    }

    if title.len() > 255 {
        return Err("Title must be at most 255 characters long".to_string());
    }

    Ok(())
}

/// Validate release year
pub fn validate_year(year: i32) -> Result<(), String> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(format!(
            "Year must be between {} and {}",
            MIN_YEAR, MAX_YEAR
        ));
    }

    Ok(())
}

/// Validate a movie payload, collecting every failure
pub fn validate_movie(payload: &MovieInput) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_title(&payload.title) {
        errors.push(e);
    }
    if let Err(e) = validate_year(payload.year) {
        errors.push(e);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(name: &str, username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(validate_registration(&registration("Ann", "ann1", "secret1")).is_ok());
    }

    #[test]
    fn test_username_too_short() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("abc").is_ok());
    }

    #[test]
    fn test_username_rejects_special_characters() {
        assert!(validate_username("ann one").is_err());
        assert!(validate_username("ann@home").is_err());
        assert!(validate_username("ann_1").is_ok());
    }

    #[test]
    fn test_password_too_short() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn test_registration_collects_all_errors() {
        let errors = validate_registration(&registration("", "ab", "123")).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    fn movie(title: &str, year: i32) -> MovieInput {
        MovieInput {
            title: title.to_string(),
            year,
            genre: None,
            poster: None,
        }
    }

    #[test]
    fn test_valid_movie() {
        assert!(validate_movie(&movie("Dune", 2021)).is_ok());
    }

    #[test]
    fn test_movie_title_required() {
        let errors = validate_movie(&movie("", 2021)).unwrap_err();
        assert_eq!(errors, vec!["Title is required".to_string()]);
    }

    #[test]
    fn test_movie_year_bounds() {
        assert!(validate_year(1887).is_err());
        assert!(validate_year(1888).is_ok());
        assert!(validate_year(2100).is_ok());
        assert!(validate_year(2101).is_err());
    }

    #[test]
    fn test_movie_collects_all_errors() {
        let errors = validate_movie(&movie("", 1800)).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
