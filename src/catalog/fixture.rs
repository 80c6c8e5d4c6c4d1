// src/catalog/fixture.rs

//! Demo catalog data.
//!
//! Seeded on first launch when no snapshot exists. Order matters: the
//! storefront home page slices this list for its product rails, and
//! filtering preserves it.

use once_cell::sync::Lazy;

use crate::catalog::model::{Category, Product};

fn product(
    id: &str,
    name: &str,
    description: &str,
    price: f64,
    image: &str,
    category: Category,
    unit: &str,
    rating: f64,
    calories: Option<&str>,
    brand: &str,
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price,
        image: image.to_string(),
        category,
        unit: unit.to_string(),
        rating,
        calories: calories.map(str::to_string),
        brand: Some(brand.to_string()),
        reviews: Vec::new(),
    }
}

pub static DEMO_PRODUCTS: Lazy<Vec<Product>> = Lazy::new(|| {
    vec![
        product(
            "1",
            "Bell Pepper Red",
            "Fresh locally grown red bell pepper.",
            4.99,
            "https://picsum.photos/200/200?random=1",
            Category::FreshFruits,
            "1kg",
            4.5,
            Some("100 kcal"),
            "Individual Collection",
        ),
        product(
            "2",
            "Egg Chicken Red",
            "Organic free-range eggs.",
            1.99,
            "https://pngimg.com/uploads/egg/egg_PNG40777.png",
            Category::Dairy,
            "4pcs",
            4.8,
            Some("70 kcal"),
            "Cocola",
        ),
        product(
            "3",
            "Organic Bananas",
            "Sweet organic bananas.",
            3.00,
            "https://picsum.photos/200/200?random=3",
            Category::FreshFruits,
            "12kg",
            4.2,
            None,
            "Individual Collection",
        ),
        product(
            "4",
            "Ginger",
            "Fresh ginger root.",
            2.99,
            "https://picsum.photos/200/200?random=4",
            Category::FreshFruits,
            "250gm",
            4.0,
            None,
            "Individual Collection",
        ),
        product(
            "11",
            "Egg Chicken White",
            "Fresh white chicken eggs.",
            1.50,
            "https://pngimg.com/uploads/egg/egg_PNG40786.png",
            Category::Dairy,
            "180g",
            4.5,
            None,
            "Kazi Farmas",
        ),
        product(
            "12",
            "Egg Pasta",
            "Delicious egg pasta.",
            15.99,
            "https://pngimg.com/uploads/pasta/pasta_PNG65.png",
            Category::Bakery,
            "30gm",
            4.3,
            None,
            "Individual Collection",
        ),
        product(
            "13",
            "Egg Noodles",
            "Instant egg noodles.",
            15.99,
            "https://pngimg.com/uploads/noodle/noodle_PNG46.png",
            Category::Bakery,
            "2L",
            4.1,
            None,
            "Ifad",
        ),
        product(
            "14",
            "Mayonnais Eggless",
            "Creamy eggless mayonnaise.",
            4.99,
            "https://pngimg.com/uploads/mayonnaise/mayonnaise_PNG15.png",
            Category::CookingOil,
            "300g",
            4.0,
            None,
            "Cocola",
        ),
        product(
            "5",
            "Diet Coke",
            "Refreshing carbonated soft drink.",
            1.99,
            "https://picsum.photos/200/200?random=5",
            Category::Beverages,
            "355ml",
            4.6,
            None,
            "Cocola",
        ),
        product(
            "6",
            "Sprite Can",
            "Lemon-lime flavored soft drink.",
            1.50,
            "https://picsum.photos/200/200?random=6",
            Category::Beverages,
            "325ml",
            4.5,
            None,
            "Cocola",
        ),
        product(
            "7",
            "Apple & Grape Juice",
            "100% natural fruit juice.",
            15.50,
            "https://picsum.photos/200/200?random=7",
            Category::Beverages,
            "2L",
            4.7,
            None,
            "Individual Collection",
        ),
        product(
            "8",
            "Coca Cola Can",
            "Classic cola taste.",
            4.99,
            "https://picsum.photos/200/200?random=8",
            Category::Beverages,
            "325ml",
            4.8,
            None,
            "Cocola",
        ),
        product(
            "9",
            "Beef Bone",
            "Fresh beef bone for soup.",
            4.99,
            "https://picsum.photos/200/200?random=9",
            Category::MeatFish,
            "1kg",
            4.3,
            None,
            "Kazi Farmas",
        ),
        product(
            "10",
            "Broiler Chicken",
            "Whole broiler chicken.",
            4.99,
            "https://picsum.photos/200/200?random=10",
            Category::MeatFish,
            "1kg",
            4.6,
            None,
            "Kazi Farmas",
        ),
        product(
            "15",
            "Beef Steak",
            "Premium cut beef steak.",
            25.99,
            "https://picsum.photos/200/200?random=15",
            Category::MeatFish,
            "500g",
            4.8,
            None,
            "Kazi Farmas",
        ),
        product(
            "16",
            "Atlantic Salmon",
            "Fresh Atlantic Salmon fillet.",
            18.50,
            "https://picsum.photos/200/200?random=16",
            Category::MeatFish,
            "1kg",
            4.7,
            None,
            "Individual Collection",
        ),
        product(
            "17",
            "Orange Juice",
            "Freshly squeezed orange juice.",
            5.99,
            "https://picsum.photos/200/200?random=17",
            Category::Beverages,
            "1L",
            4.5,
            None,
            "Individual Collection",
        ),
        product(
            "18",
            "Pepsi Can",
            "Carbonated soft drink.",
            1.50,
            "https://picsum.photos/200/200?random=18",
            Category::Beverages,
            "330ml",
            4.2,
            None,
            "Pepsi",
        ),
        product(
            "19",
            "Extra Virgin Olive Oil",
            "Cold pressed extra virgin olive oil.",
            12.99,
            "https://picsum.photos/200/200?random=19",
            Category::CookingOil,
            "750ml",
            4.9,
            None,
            "Individual Collection",
        ),
        product(
            "20",
            "Canola Oil",
            "Pure canola oil for cooking.",
            8.99,
            "https://picsum.photos/200/200?random=20",
            Category::CookingOil,
            "2L",
            4.4,
            None,
            "Rupchanda",
        ),
        product(
            "21",
            "Whole Wheat Bread",
            "Freshly baked whole wheat bread.",
            2.50,
            "https://picsum.photos/200/200?random=21",
            Category::Bakery,
            "400g",
            4.3,
            None,
            "Bakery Fresh",
        ),
        product(
            "22",
            "Chocolate Chip Cookies",
            "Crunchy chocolate chip cookies.",
            4.99,
            "https://picsum.photos/200/200?random=22",
            Category::Bakery,
            "200g",
            4.6,
            None,
            "Olympic",
        ),
        product(
            "23",
            "Fresh Milk",
            "Full cream fresh milk.",
            1.99,
            "https://picsum.photos/200/200?random=23",
            Category::Dairy,
            "1L",
            4.7,
            None,
            "Milk Vita",
        ),
        product(
            "24",
            "Cheddar Cheese",
            "Aged cheddar cheese block.",
            6.99,
            "https://picsum.photos/200/200?random=24",
            Category::Dairy,
            "200g",
            4.5,
            None,
            "Dhaka Cheese",
        ),
        product(
            "25",
            "Potato",
            "Organic fresh potatoes.",
            0.99,
            "https://picsum.photos/200/200?random=25",
            Category::FreshFruits,
            "1kg",
            4.2,
            None,
            "Individual Collection",
        ),
        product(
            "26",
            "Tomato",
            "Red ripe tomatoes.",
            1.49,
            "https://picsum.photos/200/200?random=26",
            Category::FreshFruits,
            "1kg",
            4.4,
            None,
            "Individual Collection",
        ),
        product(
            "27",
            "Green Apple",
            "Crunchy green apples.",
            3.99,
            "https://picsum.photos/200/200?random=27",
            Category::FreshFruits,
            "1kg",
            4.3,
            None,
            "Individual Collection",
        ),
        product(
            "28",
            "Cucumber",
            "Fresh green cucumber.",
            1.20,
            "https://picsum.photos/200/200?random=28",
            Category::FreshFruits,
            "500g",
            4.1,
            None,
            "Individual Collection",
        ),
    ]
});

/// Clones the seed catalog
pub fn demo_products() -> Vec<Product> {
    DEMO_PRODUCTS.clone()
}

/// Thumbnail shown on the category rail
pub fn category_image(category: Category) -> &'static str {
    match category {
        Category::FreshFruits => "https://picsum.photos/100/100?random=11",
        Category::CookingOil => "https://picsum.photos/100/100?random=12",
        Category::MeatFish => "https://picsum.photos/100/100?random=13",
        Category::Bakery => "https://picsum.photos/100/100?random=14",
        Category::Dairy => "https://picsum.photos/100/100?random=15",
        Category::Beverages => "https://picsum.photos/100/100?random=16",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::filter::BRAND_OPTIONS;

    #[test]
    fn test_seed_catalog_shape() {
        let products = demo_products();
        assert_eq!(products.len(), 28);

        // Catalog order interleaves the egg products after the first four
        let leading: Vec<&str> = products.iter().take(9).map(|p| p.id.as_str()).collect();
        assert_eq!(leading, vec!["1", "2", "3", "4", "11", "12", "13", "14", "5"]);
    }

    #[test]
    fn test_only_the_first_two_products_carry_calories() {
        let products = demo_products();
        let with_calories: Vec<&str> = products
            .iter()
            .filter(|p| p.calories.is_some())
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(with_calories, vec!["1", "2"]);
    }

    #[test]
    fn test_every_filterable_brand_is_represented() {
        let products = demo_products();
        for brand in BRAND_OPTIONS {
            assert!(
                products.iter().any(|p| p.brand.as_deref() == Some(brand)),
                "no product carries brand {brand}"
            );
        }
    }

    #[test]
    fn test_every_category_has_products() {
        let products = demo_products();
        for category in Category::ALL {
            assert!(products.iter().any(|p| p.category == category));
        }
    }

    #[test]
    fn test_seed_products_start_unreviewed() {
        assert!(demo_products().iter().all(|p| p.reviews.is_empty()));
    }
}
