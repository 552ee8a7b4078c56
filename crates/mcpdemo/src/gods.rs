//! The Greek gods table behind `gods://`.

use serde::{Deserialize, Serialize};

use mcpdemo_core::{McpError, McpResult};

/// Rows returned when no limit is given.
pub const DEFAULT_LIMIT: usize = 10;

/// name, domain, symbol, roman_name
const TABLE: [[&str; 4]; 14] = [
    ["Zeus", "Sky and Thunder", "Lightning bolt", "Jupiter"],
    ["Poseidon", "Sea and Earthquakes", "Trident", "Neptune"],
    ["Hades", "Underworld", "Helmet of darkness", "Pluto"],
    ["Athena", "Wisdom and War", "Owl", "Minerva"],
    ["Apollo", "Sun and Music", "Lyre", "Apollo"],
    ["Artemis", "Moon and Hunt", "Bow and arrow", "Diana"],
    ["Aphrodite", "Love and Beauty", "Dove", "Venus"],
    ["Hermes", "Messengers and Travelers", "Winged sandals", "Mercury"],
    ["Ares", "War", "Spear", "Mars"],
    ["Hephaestus", "Fire and Forge", "Hammer", "Vulcan"],
    ["Demeter", "Agriculture", "Wheat", "Ceres"],
    ["Dionysus", "Wine and Festivity", "Grapevine", "Bacchus"],
    ["Hera", "Marriage and Family", "Peacock", "Juno"],
    ["Hestia", "Hearth and Home", "Hearth", "Vesta"],
];

/// Number of rows in the table; larger limits are clamped to this.
pub const MAX_LIMIT: usize = TABLE.len();

/// One row of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreekGod {
    pub name: String,
    pub domain: String,
    pub symbol: String,
    pub roman_name: String,
}

impl GreekGod {
    fn from_row([name, domain, symbol, roman_name]: [&str; 4]) -> Self {
        Self {
            name: name.to_string(),
            domain: domain.to_string(),
            symbol: symbol.to_string(),
            roman_name: roman_name.to_string(),
        }
    }
}

/// Returns the first `limit` rows in table order, clamped to [`MAX_LIMIT`].
#[must_use]
pub fn greek_gods(limit: usize) -> Vec<GreekGod> {
    TABLE
        .iter()
        .take(limit.min(MAX_LIMIT))
        .map(|row| GreekGod::from_row(*row))
        .collect()
}

/// Parses the `limit` query parameter.
///
/// Absent means [`DEFAULT_LIMIT`]; anything but a non-negative integer is
/// an invalid-params error.
pub fn parse_limit(raw: Option<&str>) -> McpResult<usize> {
    match raw {
        None => Ok(DEFAULT_LIMIT),
        Some(value) => value.trim().parse().map_err(|_| {
            McpError::invalid_params(format!("limit must be a non-negative integer, got {value:?}"))
        }),
    }
}
