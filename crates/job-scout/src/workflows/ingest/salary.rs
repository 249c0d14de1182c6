use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static AMOUNT_PATTERN: OnceLock<Regex> = OnceLock::new();
static RANGE_PATTERN: OnceLock<Regex> = OnceLock::new();

const AMOUNT: &str = r"(\d{1,3}(?:[ \u{a0},.]\d{3})+|\d+)(?:[.,]\d{1,2}\b)?";

const FROM_QUALIFIERS: &[&str] = &["from", "starting from", "starting at", "alates", "min"];
const UP_TO_QUALIFIERS: &[&str] = &["up to", "kuni", "max"];

/// Monthly salary bounds in the posting currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl SalaryRange {
    pub const fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }

    pub fn is_inverted(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min > max)
    }

    /// Returns the range with an inverted pair swapped into `min <= max` order.
    pub fn ordered(self) -> Self {
        if self.is_inverted() {
            Self {
                min: self.max,
                max: self.min,
            }
        } else {
            self
        }
    }
}

fn amount_pattern() -> &'static Regex {
    AMOUNT_PATTERN.get_or_init(|| Regex::new(AMOUNT).expect("salary amount pattern is valid"))
}

/// Two amounts joined by a hyphen or en dash.
fn range_pattern() -> &'static Regex {
    RANGE_PATTERN.get_or_init(|| {
        Regex::new(&format!(r"{AMOUNT}\s*[-–]\s*{AMOUNT}"))
            .expect("salary range pattern is valid")
    })
}

fn to_amount(matched: &str) -> Option<i64> {
    let digits: String = matched.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<i64>().ok()
}

fn first_amount(text: &str) -> Option<i64> {
    amount_pattern()
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|whole| to_amount(whole.as_str()))
}

fn range(text: &str) -> Option<(i64, i64)> {
    let captures = range_pattern().captures(text)?;
    let low = to_amount(captures.get(1)?.as_str())?;
    let high = to_amount(captures.get(2)?.as_str())?;
    Some((low, high))
}

fn starts_with_any(text: &str, qualifiers: &[&str]) -> bool {
    qualifiers.iter().any(|qualifier| {
        text.strip_prefix(*qualifier)
            .map(|rest| rest.starts_with(|c: char| !c.is_alphabetic()))
            .unwrap_or(false)
    })
}

/// Coerces scraped salary text into bounds.
///
/// `"3000-4000 €"` is a range, `"From 2500 €"` has only a floor, `"Up to 3500 €"`
/// only a ceiling, and a bare `"3400 €"` is both. Text without an amount yields
/// an empty range rather than an error. A qualifier binds the first amount, and
/// later numbers (`"(40h week)"`) only form a range when joined by a dash.
pub fn parse_salary_text(text: &str) -> SalaryRange {
    let lowered = text.trim().to_lowercase();
    let Some(amount) = first_amount(&lowered) else {
        return SalaryRange::default();
    };

    if starts_with_any(&lowered, FROM_QUALIFIERS) {
        return SalaryRange::new(Some(amount), None);
    }
    if starts_with_any(&lowered, UP_TO_QUALIFIERS) {
        return SalaryRange::new(None, Some(amount));
    }
    match range(&lowered) {
        Some((low, high)) => SalaryRange::new(Some(low), Some(high)),
        None => SalaryRange::new(Some(amount), Some(amount)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_four_posting_forms() {
        assert_eq!(
            parse_salary_text("3000 - 4000 €"),
            SalaryRange::new(Some(3000), Some(4000))
        );
        assert_eq!(
            parse_salary_text("3000-4000 €"),
            SalaryRange::new(Some(3000), Some(4000))
        );
        assert_eq!(
            parse_salary_text("From 2500 €"),
            SalaryRange::new(Some(2500), None)
        );
        assert_eq!(
            parse_salary_text("Up to 3500 €"),
            SalaryRange::new(None, Some(3500))
        );
        assert_eq!(
            parse_salary_text("3400 €"),
            SalaryRange::new(Some(3400), Some(3400))
        );
    }

    #[test]
    fn unparseable_text_is_empty() {
        assert_eq!(parse_salary_text("n/a"), SalaryRange::default());
        assert_eq!(parse_salary_text(""), SalaryRange::default());
        assert_eq!(parse_salary_text("competitive"), SalaryRange::default());
    }

    #[test]
    fn accepts_estonian_qualifiers_and_separators() {
        assert_eq!(
            parse_salary_text("Alates 2 800 €"),
            SalaryRange::new(Some(2800), None)
        );
        assert_eq!(
            parse_salary_text("kuni 4,500 €"),
            SalaryRange::new(None, Some(4500))
        );
        assert_eq!(
            parse_salary_text("2500.50 €"),
            SalaryRange::new(Some(2500), Some(2500))
        );
    }

    #[test]
    fn trailing_numbers_do_not_form_a_range() {
        assert_eq!(
            parse_salary_text("Up to 3500 € (40h week)"),
            SalaryRange::new(None, Some(3500))
        );
        assert_eq!(
            parse_salary_text("From 2500 €, 12 month contract"),
            SalaryRange::new(Some(2500), None)
        );
        assert_eq!(
            parse_salary_text("3400 € (40h week)"),
            SalaryRange::new(Some(3400), Some(3400))
        );
        assert_eq!(
            parse_salary_text("2 800 – 3 200 € (40h week)"),
            SalaryRange::new(Some(2800), Some(3200))
        );
    }

    #[test]
    fn qualifier_must_be_a_whole_word() {
        assert_eq!(
            parse_salary_text("maximum effort 3000"),
            SalaryRange::new(Some(3000), Some(3000))
        );
    }

    #[test]
    fn ordered_swaps_inverted_ranges() {
        let inverted = SalaryRange::new(Some(5000), Some(3000));
        assert!(inverted.is_inverted());
        assert_eq!(inverted.ordered(), SalaryRange::new(Some(3000), Some(5000)));

        let open = SalaryRange::new(Some(5000), None);
        assert!(!open.is_inverted());
        assert_eq!(open.ordered(), open);
    }
}
