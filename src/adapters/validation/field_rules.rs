//! Field Rules - per-field answer validation for the in-process collaborator.
//!
//! The rule is picked from the field's name:
//! - `gender*`: female/f or male/m/mail
//! - `age*`: first 1-3 digit number, 1..=150
//! - names containing `phone` or `number`: at least 10 digits, last 10 kept
//! - names containing `email`: address pattern, lowercased
//! - anything else: trimmed and title-cased
//!
//! Control words apply to every field: the word "stop" ends the dialogue,
//! "skip" records an empty value, "repeat message" repeats the question.

use once_cell::sync::Lazy;
use regex::Regex;

static AGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([1-9][0-9]?[0-9]?)\b").expect("valid age regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

/// Message returned when the user stops the dialogue.
pub const STOPPED_MESSAGE: &str = "User stopped";

/// Result of checking one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldVerdict {
    /// Canonical value to store; empty for a skipped field.
    Accepted(String),
    Repeat,
    Abort,
    Invalid(String),
}

/// Stateless answer validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldRules;

impl FieldRules {
    pub fn check(field: &str, input: &str) -> FieldVerdict {
        let lowered = input.to_lowercase();
        if has_word(&lowered, "stop") {
            return FieldVerdict::Abort;
        }
        if has_word(&lowered, "skip") {
            return FieldVerdict::Accepted(String::new());
        }
        if lowered.contains("repeat message") {
            return FieldVerdict::Repeat;
        }

        let field = field.to_lowercase();
        if field.starts_with("gender") {
            gender(input)
        } else if field.starts_with("age") {
            age(input)
        } else if field.contains("phone") || field.contains("number") {
            phone(input)
        } else if field.contains("email") {
            email(input)
        } else {
            FieldVerdict::Accepted(title_case(input.trim()))
        }
    }
}

fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}

fn gender(input: &str) -> FieldVerdict {
    match input.trim().to_lowercase().as_str() {
        "female" | "f" => FieldVerdict::Accepted("Female".to_string()),
        "male" | "m" | "mail" => FieldVerdict::Accepted("Male".to_string()),
        _ => FieldVerdict::Invalid("Enter Male or Female".to_string()),
    }
}

fn age(input: &str) -> FieldVerdict {
    let first = AGE_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u16>().ok());
    match first {
        Some(age) if (1..=150).contains(&age) => FieldVerdict::Accepted(age.to_string()),
        _ => FieldVerdict::Invalid("Enter valid age 1-150".to_string()),
    }
}

fn phone(input: &str) -> FieldVerdict {
    let digits: Vec<char> = input.chars().filter(char::is_ascii_digit).collect();
    if digits.len() >= 10 {
        FieldVerdict::Accepted(digits[digits.len() - 10..].iter().collect())
    } else {
        FieldVerdict::Invalid("Enter 10-digit phone".to_string())
    }
}

fn email(input: &str) -> FieldVerdict {
    let trimmed = input.trim();
    if EMAIL_RE.is_match(trimmed) {
        FieldVerdict::Accepted(trimmed.to_lowercase())
    } else {
        FieldVerdict::Invalid("Enter valid email".to_string())
    }
}

/// Upper-cases the first letter of every alphabetic run, lower-cases the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
