//! Console commands and response parsers
//!
//! Each parser returns `None` when the response does not match; callers
//! keep the previous value in that case.

use std::sync::LazyLock;

use regex::Regex;

use crate::audio::Axis;

/// Substring the game prints when `execute if entity` finds a match
/// (`Test passed, count: 1`)
pub const EXISTS_INDICATOR: &str = "1";

/// Numeric literal as printed by `data get`: a signed decimal, optional
/// exponent, immediately followed by a single type suffix (`d` double, `f` float).
static COORDINATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?[0-9]+\.[0-9]+(?:E-?[0-9]+)?)[dfDF]").expect("COORDINATE regex failed")
});

pub fn exists_command(id: &str) -> String {
    format!("execute if entity {}", id)
}

/// Query for one coordinate
pub fn position_command(id: &str, axis: Axis) -> String {
    format!("data get entity {} Pos[{}]", id, axis.index())
}

pub fn dimension_command(id: &str) -> String {
    format!("data get entity {} Dimension", id)
}

/// Whether the existence query succeeded
pub fn parse_exists(response: &str) -> bool {
    response.contains(EXISTS_INDICATOR)
}

/// First numeric literal in a `data get ... Pos[n]` response.
///
/// Literals that overflow to infinity count as a miss.
pub fn parse_coordinate(response: &str) -> Option<f64> {
    COORDINATE
        .captures(response)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// Final whitespace-separated token of a `data get ... Dimension` response
pub fn parse_dimension(response: &str) -> Option<String> {
    response.split_whitespace().last().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands() {
        assert_eq!(exists_command("Steve"), "execute if entity Steve");
        assert_eq!(position_command("Steve", Axis::Z), "data get entity Steve Pos[2]");
        assert_eq!(dimension_command("Steve"), "data get entity Steve Dimension");
    }

    #[test]
    fn test_parse_exists() {
        assert!(parse_exists("Test passed, count: 1"));
        assert!(!parse_exists("Test failed"));
        assert!(!parse_exists(""));
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(
            parse_coordinate("Steve has the following entity data: -12.5d"),
            Some(-12.5)
        );
        assert_eq!(
            parse_coordinate("Steve has the following entity data: 64.0d"),
            Some(64.0)
        );
        assert_eq!(parse_coordinate("Alex has the following entity data: 3.25f"), Some(3.25));
        assert_eq!(
            parse_coordinate("Alex has the following entity data: 1.0E-4d"),
            Some(0.0001)
        );
    }

    #[test]
    fn test_parse_coordinate_miss() {
        assert_eq!(parse_coordinate("No entity was found"), None);
        // Needs a suffix
        assert_eq!(parse_coordinate("value 12.5"), None);
        // Needs a fractional part
        assert_eq!(parse_coordinate("value 12d"), None);
        // Overflows f64
        assert_eq!(parse_coordinate("value 1.0E400d"), None);
        assert_eq!(parse_coordinate("value -1.0E400d"), None);
    }

    #[test]
    fn test_parse_dimension() {
        assert_eq!(
            parse_dimension("Steve has the following entity data: \"minecraft:the_nether\"\n"),
            Some("\"minecraft:the_nether\"".to_string())
        );
        assert_eq!(parse_dimension("   "), None);
    }
}
