// src/catalog/model.rs

//! Catalog domain types.
//!
//! Products carry their reviews inline; the headline `rating` is recomputed
//! from the review list whenever a review lands. Categories serialize as
//! their storefront display names so snapshots read naturally.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product category, serialized as its display name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Fresh Fruits & Vegetable")]
    FreshFruits,
    #[serde(rename = "Cooking Oil & Ghee")]
    CookingOil,
    #[serde(rename = "Meat & Fish")]
    MeatFish,
    #[serde(rename = "Bakery & Snacks")]
    Bakery,
    #[serde(rename = "Dairy & Eggs")]
    Dairy,
    #[serde(rename = "Beverages")]
    Beverages,
}

impl Category {
    /// Every category, in storefront display order
    pub const ALL: [Category; 6] = [
        Category::FreshFruits,
        Category::CookingOil,
        Category::MeatFish,
        Category::Bakery,
        Category::Dairy,
        Category::Beverages,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::FreshFruits => "Fresh Fruits & Vegetable",
            Category::CookingOil => "Cooking Oil & Ghee",
            Category::MeatFish => "Meat & Fish",
            Category::Bakery => "Bakery & Snacks",
            Category::Dairy => "Dairy & Eggs",
            Category::Beverages => "Beverages",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A customer review attached to a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub author: String,
    pub rating: u8,
    pub comment: String,
    pub date: DateTime<Utc>,
}

/// A storefront product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub category: Category,
    /// Pack size shown next to the price, e.g. "1kg" or "4pcs"
    pub unit: String,
    /// Headline rating, the rounded mean of all reviews once any exist
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<Review>,
}
