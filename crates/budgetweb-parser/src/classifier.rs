//! Keyword based transaction categorizer

use crate::types::Category;

/// Keyword rules, tested in declaration order; the first hit wins.
///
/// "uber eats" sits before "uber" so food delivery is not filed as
/// transportation.
const KEYWORD_RULES: &[(&str, Category)] = &[
    ("grocery", Category::Food),
    ("supermarket", Category::Food),
    ("restaurant", Category::Food),
    ("uber eats", Category::Food),
    ("doordash", Category::Food),
    ("rent", Category::Housing),
    ("mortgage", Category::Housing),
    ("uber", Category::Transportation),
    ("lyft", Category::Transportation),
    ("gasoline", Category::Transportation),
    ("gas station", Category::Transportation),
    ("electricity", Category::Utilities),
    ("water", Category::Utilities),
    ("gas bill", Category::Utilities),
    ("internet", Category::Utilities),
    ("phone", Category::Utilities),
    ("doctor", Category::Healthcare),
    ("pharmacy", Category::Healthcare),
    ("medical", Category::Healthcare),
    ("netflix", Category::Entertainment),
    ("spotify", Category::Entertainment),
    ("apple music", Category::Entertainment),
    ("cinema", Category::Entertainment),
    ("movie", Category::Entertainment),
    ("salary", Category::Income),
    ("payroll", Category::Income),
    ("deposit", Category::Income),
    ("insurance", Category::Insurance),
    ("investment", Category::Investments),
];

/// Map a free-text description to a category
///
/// Total: anything without a known keyword is `Other`.
pub fn classify(description: &str) -> Category {
    let desc_lower = description.to_lowercase();

    KEYWORD_RULES
        .iter()
        .find(|(keyword, _)| desc_lower.contains(keyword))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Other)
}

/// The keyword table, in match order
pub fn keyword_rules() -> &'static [(&'static str, Category)] {
    KEYWORD_RULES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_examples() {
        assert_eq!(classify("Monthly rent payment"), Category::Housing);
        assert_eq!(classify("Uber Eats order"), Category::Food);
        assert_eq!(classify("Unknown Store XYZ"), Category::Other);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("NETFLIX.COM"), Category::Entertainment);
        assert_eq!(classify("Payroll ACME Corp"), Category::Income);
        assert_eq!(classify("Shell Gas Station #42"), Category::Transportation);
    }

    #[test]
    fn test_declared_order_breaks_ties() {
        // "restaurant" is declared before "rent"
        assert_eq!(classify("Rent at the restaurant"), Category::Food);
        // "water" (Utilities) is declared before "deposit" (Income)
        assert_eq!(classify("Water utility deposit"), Category::Utilities);
        // plain "uber" still resolves to transportation
        assert_eq!(classify("UBER TRIP 1234"), Category::Transportation);
    }

    #[test]
    fn test_substring_matches_inside_words() {
        // "parent" contains "rent"
        assert_eq!(classify("Parent club fee"), Category::Housing);
        assert_eq!(classify("Smartphone case"), Category::Utilities);
    }

    #[test]
    fn test_empty_description() {
        assert_eq!(classify(""), Category::Other);
    }

    #[test]
    fn test_no_keyword_maps_to_other() {
        for (keyword, category) in keyword_rules() {
            assert_ne!(*category, Category::Other);
            assert_ne!(classify(keyword), Category::Other, "{}", keyword);
        }
    }
}
