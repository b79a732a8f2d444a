//! Textual command parsing.
//!
//! One command per line, tokens separated by commas. Tokens are trimmed and
//! blank tokens dropped, so `drink,, hot_tea ,` is `[drink, hot_tea]`.

const DRINK: &str = "drink";
const REFILL: &str = "refill";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Prepare each listed beverage concurrently.
    Drink(Vec<String>),
    /// Add `amount` of `ingredient`.
    Refill { ingredient: String, amount: i64 },
    /// Anything that is not a well-formed command; carries the raw tokens.
    Unknown(Vec<String>),
}

impl Command {
    /// Parse one line. Returns `None` for a line with no tokens.
    pub fn parse(line: &str) -> Option<Self> {
        let tokens = tokenize(line);
        let (head, rest) = tokens.split_first()?;

        let parsed = match (head.as_str(), rest) {
            (DRINK, beverages) if !beverages.is_empty() => Some(Command::Drink(beverages.to_vec())),
            (REFILL, [ingredient, amount]) => amount.parse::<i64>().ok().map(|amount| {
                Command::Refill {
                    ingredient: ingredient.clone(),
                    amount,
                }
            }),
            _ => None,
        };
        Some(parsed.unwrap_or_else(|| Command::Unknown(tokens)))
    }
}

fn tokenize(line: &str) -> Vec<String> {
    line.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
