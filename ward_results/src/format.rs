//! Display helpers shared by all the presenters.
//!
//! Every view of the results (HTML page, JSON feed, table, exports) goes
//! through these functions so that they all print the same numbers and colors.

/// Shown in place of a value that the feed does not provide.
pub const PLACEHOLDER: &str = "—";

/// Color for the parties that are not in the table below.
pub const DEFAULT_PARTY_COLOR: &str = "#999999";

const PARTY_COLORS: &[(&str, &str)] = &[
    ("JMM", "#2E7D32"),
    ("BJP", "#FF9933"),
    ("INC", "#19AAED"),
    ("AJSU", "#8B0000"),
    ("JVM", "#9C27B0"),
    ("IND", "#757575"),
];

pub fn party_color(party: &str) -> &'static str {
    PARTY_COLORS
        .iter()
        .find(|(code, _)| *code == party)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_PARTY_COLOR)
}

/// One decimal place followed by `%`.
pub fn format_pct(x: f64) -> String {
    format!("{:.1}%", x)
}

/// Integer with comma thousands separators: `12345` -> `12,345`.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut res = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            res.push(',');
        }
        res.push(c);
    }
    res
}

pub fn or_placeholder(x: Option<&str>) -> &str {
    x.unwrap_or(PLACEHOLDER)
}
