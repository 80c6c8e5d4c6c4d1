// src/catalog/filter.rs

//! Product filtering.
//!
//! Four independent axes narrow the catalog: a free-text search query, a
//! category context, sub-category tags, and brand names. Filtering is pure,
//! preserves catalog order, and never mutates the underlying product list.
//!
//! The category context is suspended while any sub-category tag is active;
//! the tag axis takes over narrowing until the tags are cleared.

use crate::catalog::model::{Category, Product};

/// Sub-category tags offered by the storefront filter sheet
pub const SUB_CATEGORY_OPTIONS: [&str; 4] =
    ["Eggs", "Noodles & Pasta", "Chips & Crisps", "Fast Food"];

/// Brands offered by the storefront filter sheet
pub const BRAND_OPTIONS: [&str; 4] = ["Individual Collection", "Cocola", "Ifad", "Kazi Farmas"];

/// The active selection across all four filter axes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    /// Case-insensitive substring match on product names
    pub query: String,
    /// Either an exact category display name or a free-text name match
    pub category_context: Option<String>,
    /// Active sub-category tags, matched case-sensitively
    pub sub_categories: Vec<String>,
    /// Active brand names, matched case-sensitively
    pub brands: Vec<String>,
}

impl FilterSelection {
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
            && self.category_context.is_none()
            && self.sub_categories.is_empty()
            && self.brands.is_empty()
    }

    /// Applies the selection to `products`, returning the narrowed list in
    /// the original order
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        if self.is_empty() {
            return products.to_vec();
        }

        let mut result: Vec<Product> = products.to_vec();

        if !self.query.is_empty() {
            let needle = self.query.to_lowercase();
            result.retain(|p| p.name.to_lowercase().contains(&needle));
        }

        // The context narrows only while no sub-category tag is active
        if let Some(context) = &self.category_context {
            if self.sub_categories.is_empty() {
                match context.parse::<Category>() {
                    Ok(category) => result.retain(|p| p.category == category),
                    Err(_) => {
                        let needle = context.to_lowercase();
                        result.retain(|p| p.name.to_lowercase().contains(&needle));
                    }
                }
            }
        }

        if !self.sub_categories.is_empty() {
            result.retain(|p| {
                self.sub_categories
                    .iter()
                    .any(|tag| matches_sub_category(tag, p))
            });
        }

        if !self.brands.is_empty() {
            result.retain(|p| {
                p.brand
                    .as_ref()
                    .is_some_and(|brand| self.brands.iter().any(|b| b == brand))
            });
        }

        result
    }
}

/// Tag membership rules. Tags match against product names case-sensitively;
/// an unrecognized tag matches nothing.
fn matches_sub_category(tag: &str, product: &Product) -> bool {
    let name = product.name.as_str();
    match tag {
        "Eggs" => name.contains("Egg") && !name.contains("Noodles") && !name.contains("Pasta"),
        "Noodles & Pasta" => name.contains("Noodle") || name.contains("Pasta"),
        "Chips & Crisps" => name.contains("Chip") || name.contains("Crisp"),
        "Fast Food" => {
            name.contains("Burger") || name.contains("Pizza") || product.category == Category::Bakery
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixture::demo_products;

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_empty_selection_returns_everything_in_order() {
        let products = demo_products();
        let filtered = FilterSelection::default().apply(&products);
        assert_eq!(filtered, products);
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        let products = demo_products();
        let selection = FilterSelection {
            query: "egg".to_string(),
            ..Default::default()
        };
        // "Mayonnais Eggless" matches too, "egg" is a plain substring
        assert_eq!(
            ids(&selection.apply(&products)),
            vec!["2", "11", "12", "13", "14"]
        );
    }

    #[test]
    fn test_category_context_matches_exact_category() {
        let products = demo_products();
        let selection = FilterSelection {
            category_context: Some("Dairy & Eggs".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&selection.apply(&products)), vec!["2", "11", "23", "24"]);
    }

    #[test]
    fn test_category_context_falls_back_to_name_match() {
        let products = demo_products();
        let selection = FilterSelection {
            category_context: Some("Juice".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&selection.apply(&products)), vec!["7", "17"]);
    }

    #[test]
    fn test_sub_category_tags_suspend_the_context() {
        let products = demo_products();
        let selection = FilterSelection {
            category_context: Some("Beverages".to_string()),
            sub_categories: vec!["Eggs".to_string()],
            ..Default::default()
        };
        // "Eggs" excludes noodle and pasta names but keeps "Mayonnais Eggless"
        assert_eq!(ids(&selection.apply(&products)), vec!["2", "11", "14"]);
    }

    #[test]
    fn test_noodles_and_pasta_tag() {
        let products = demo_products();
        let selection = FilterSelection {
            sub_categories: vec!["Noodles & Pasta".to_string()],
            ..Default::default()
        };
        assert_eq!(ids(&selection.apply(&products)), vec!["12", "13"]);
    }

    #[test]
    fn test_chips_tag_matches_by_name_fragment() {
        let products = demo_products();
        let selection = FilterSelection {
            sub_categories: vec!["Chips & Crisps".to_string()],
            ..Default::default()
        };
        // Only "Chocolate Chip Cookies" carries a matching name
        assert_eq!(ids(&selection.apply(&products)), vec!["22"]);
    }

    #[test]
    fn test_fast_food_tag_includes_the_bakery_category() {
        let products = demo_products();
        let selection = FilterSelection {
            sub_categories: vec!["Fast Food".to_string()],
            ..Default::default()
        };
        assert_eq!(
            ids(&selection.apply(&products)),
            vec!["12", "13", "21", "22"]
        );
    }

    #[test]
    fn test_multiple_tags_widen_the_match() {
        let products = demo_products();
        let selection = FilterSelection {
            sub_categories: vec!["Eggs".to_string(), "Noodles & Pasta".to_string()],
            ..Default::default()
        };
        assert_eq!(
            ids(&selection.apply(&products)),
            vec!["2", "11", "12", "13", "14"]
        );
    }

    #[test]
    fn test_unknown_tag_matches_nothing() {
        let products = demo_products();
        let selection = FilterSelection {
            sub_categories: vec!["Frozen".to_string()],
            ..Default::default()
        };
        assert!(selection.apply(&products).is_empty());
    }

    #[test]
    fn test_brand_filter_is_case_sensitive() {
        let products = demo_products();

        let selection = FilterSelection {
            brands: vec!["Cocola".to_string()],
            ..Default::default()
        };
        assert_eq!(
            ids(&selection.apply(&products)),
            vec!["2", "14", "5", "6", "8"]
        );

        let lowercase = FilterSelection {
            brands: vec!["cocola".to_string()],
            ..Default::default()
        };
        assert!(lowercase.apply(&products).is_empty());
    }

    #[test]
    fn test_axes_compose() {
        let products = demo_products();
        let selection = FilterSelection {
            query: "egg".to_string(),
            brands: vec!["Cocola".to_string()],
            ..Default::default()
        };
        assert_eq!(ids(&selection.apply(&products)), vec!["2", "14"]);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let products = demo_products();
        let selection = FilterSelection {
            query: "a".to_string(),
            brands: vec!["Individual Collection".to_string()],
            ..Default::default()
        };
        let once = selection.apply(&products);
        let twice = selection.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_products_without_brand_never_match_brand_filters() {
        let mut products = demo_products();
        products[0].brand = None;
        let selection = FilterSelection {
            brands: vec!["Individual Collection".to_string()],
            ..Default::default()
        };
        assert!(!selection
            .apply(&products)
            .iter()
            .any(|p| p.id == products[0].id));
    }
}
