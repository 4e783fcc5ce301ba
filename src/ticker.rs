//! Ticker normalization and slug derivation.

/// Project-specific symbol overrides applied before any other rule.
pub const SPECIAL_TICKERS: &[(&str, &str)] = &[
    ("700", "0700.HK"),
    ("1810", "1810.HK"),
    ("9633", "9633.HK"),
    ("9987", "9987.HK"),
    ("9988", "9988.HK"),
    ("BRK B", "BRK-B"),
    ("NESN", "NESN.SW"),
];

/// Tickers fetched when none are given on the command line.
pub const DEFAULT_TICKERS: &[&str] = &[
    "AAPL", "GOOG", "700", "1810", "IBM", "TSLA", "9633", "9987", "9988", "IBKR", "KO", "MCD",
    "EL", "BRK B", "NESN",
];

/// Normalizes a raw ticker into the symbol form the data provider recognizes.
///
/// Overrides win; otherwise purely numeric tickers are treated as Hong Kong
/// listings (zero-padded to 4 digits with an `.HK` suffix). Everything else
/// is just trimmed and uppercased. Total over any input string.
pub fn normalize(raw: &str) -> String {
    let value = raw.trim();
    let upper = value.to_uppercase();

    if let Some((_, mapped)) = SPECIAL_TICKERS.iter().find(|(key, _)| *key == upper) {
        return (*mapped).to_string();
    }

    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return format!("{value:0>4}.HK");
    }

    upper
}

/// Creates a filesystem-friendly slug from a ticker.
///
/// Runs of characters outside `[a-z0-9]` collapse to a single underscore,
/// with no leading or trailing underscores.
pub fn slugify(ticker: &str) -> String {
    let mut slug = String::with_capacity(ticker.len());
    let mut gap = false;

    for c in ticker.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if gap && !slug.is_empty() {
                slug.push('_');
            }
            gap = false;
            slug.push(c);
        } else {
            gap = true;
        }
    }

    slug
}
