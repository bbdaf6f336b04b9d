use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Content domain a question is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Astronomy Picture of the Day.
    Apod,
    /// Mars rover photos.
    MarsRover,
    /// Near-Earth objects.
    Neo,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct ParseCategoryError(String);

impl Category {
    pub const ALL: [Category; 3] = [Category::Apod, Category::MarsRover, Category::Neo];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Apod => "apod",
            Category::MarsRover => "mars_rover",
            Category::Neo => "neo",
        }
    }

    /// Prefix every question id in this category must carry.
    #[must_use]
    pub fn id_prefix(self) -> String {
        format!("{}_", self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "apod" => Ok(Category::Apod),
            "mars_rover" => Ok(Category::MarsRover),
            "neo" => Ok(Category::Neo),
            other => Err(ParseCategoryError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_category_name() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("comets".parse::<Category>().is_err());
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&Category::MarsRover).unwrap();
        assert_eq!(json, "\"mars_rover\"");
    }
}
