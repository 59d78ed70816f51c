//! FILENAME: core/result-model/src/text.rs
//! Free text helpers for labels.

/// "net sales_amount" -> "Net Sales Amount"
pub fn to_title_case(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Trimmed, lowercased form used for case-insensitive matching.
pub fn normalize_label(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_splits_on_underscores() {
        assert_eq!(to_title_case("net sales_amount"), "Net Sales Amount");
        assert_eq!(to_title_case("  REGION "), "Region");
        assert_eq!(to_title_case(""), "");
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_label("  North "), "north");
    }
}
