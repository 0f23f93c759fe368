//! Fixed sample of Amazon catalog data: three products and one review for each.

use crate::application::{Source, StaticResource};
use crate::domain::{Product, Review};
use crate::errors::PipelineError;
use chrono::NaiveDate;

pub const SOURCE_NAME: &str = "amazon_products";

const fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(d) => d,
        None => panic!("invalid calendar date"),
    }
}

const JAN_15_2024: NaiveDate = date(2024, 1, 15);
const JAN_20_2024: NaiveDate = date(2024, 1, 20);
const JAN_25_2024: NaiveDate = date(2024, 1, 25);

fn product(
    product_id: &str,
    title: &str,
    price: f64,
    rating: f64,
    reviews_count: u32,
) -> Product {
    Product {
        product_id: product_id.to_string(),
        title: title.to_string(),
        price,
        category: "Electronics".to_string(),
        rating,
        reviews_count,
    }
}

fn review(
    review_id: &str,
    product_id: &str,
    rating: u8,
    review_text: &str,
    reviewer_name: &str,
    review_date: NaiveDate,
) -> Review {
    Review {
        review_id: review_id.to_string(),
        product_id: product_id.to_string(),
        rating,
        review_text: review_text.to_string(),
        reviewer_name: reviewer_name.to_string(),
        review_date,
    }
}

pub fn product_rows() -> Vec<Product> {
    vec![
        product("B08N5WRWNW", "Echo Dot (4th Gen)", 49.99, 4.5, 12847),
        product("B07XJ8C8F5", "Fire TV Stick 4K", 39.99, 4.3, 8934),
        product("B094DBT4V4", "AirPods (3rd Gen)", 179.00, 4.4, 5621),
    ]
}

pub fn review_rows() -> Vec<Review> {
    vec![
        review(
            "R1234567890",
            "B08N5WRWNW",
            5,
            "Great product, works perfectly!",
            "John D.",
            JAN_15_2024,
        ),
        review(
            "R0987654321",
            "B07XJ8C8F5",
            4,
            "Good value for money",
            "Sarah M.",
            JAN_20_2024,
        ),
        review(
            "R1122334455",
            "B094DBT4V4",
            5,
            "Amazing sound quality",
            "Mike T.",
            JAN_25_2024,
        ),
    ]
}

pub fn products() -> StaticResource<Product> {
    StaticResource::new("products", product_rows)
}

pub fn reviews() -> StaticResource<Review> {
    StaticResource::new("reviews", review_rows)
}

/// Both resources, products first
pub fn amazon_products_source() -> Result<Source, PipelineError> {
    Source::new(SOURCE_NAME)
        .with_provider(Box::new(products()))?
        .with_provider(Box::new(reviews()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;
    use crate::ports::RecordProvider;
    use crate::utils::format_iso_date;
    use std::collections::HashSet;

    #[test]
    fn test_products_match_catalog() {
        let rows = product_rows();
        let ids: Vec<&str> = rows.iter().map(|p| p.product_id.as_str()).collect();
        assert_eq!(ids, vec!["B08N5WRWNW", "B07XJ8C8F5", "B094DBT4V4"]);

        let echo = &rows[0];
        assert_eq!(echo.title, "Echo Dot (4th Gen)");
        assert_eq!(echo.price, 49.99);
        assert_eq!(echo.category, "Electronics");
        assert_eq!(echo.rating, 4.5);
        assert_eq!(echo.reviews_count, 12847);

        assert_eq!(rows[1].title, "Fire TV Stick 4K");
        assert_eq!(rows[1].reviews_count, 8934);
        assert_eq!(rows[2].price, 179.0);
        assert_eq!(rows[2].rating, 4.4);
    }

    #[test]
    fn test_product_values_in_range() {
        for p in product_rows() {
            assert!(!p.product_id.is_empty());
            assert!(p.price >= 0.0);
            assert!((0.0..=5.0).contains(&p.rating));
        }
    }

    #[test]
    fn test_reviews_match_catalog() {
        let rows = review_rows();
        let ids: Vec<&str> = rows.iter().map(|r| r.review_id.as_str()).collect();
        assert_eq!(ids, vec!["R1234567890", "R0987654321", "R1122334455"]);

        assert_eq!(rows[0].reviewer_name, "John D.");
        assert_eq!(rows[0].review_text, "Great product, works perfectly!");
        assert_eq!(rows[1].rating, 4);
        assert_eq!(format_iso_date(rows[2].review_date), "2024-01-25");
    }

    #[test]
    fn test_review_values_in_range() {
        for r in review_rows() {
            assert!(!r.review_id.is_empty());
            assert!((1..=5).contains(&r.rating));
        }
    }

    #[test]
    fn test_reviews_reference_known_products() {
        let product_ids: HashSet<String> =
            product_rows().into_iter().map(|p| p.product_id).collect();
        for r in review_rows() {
            assert!(product_ids.contains(&r.product_id), "{}", r.product_id);
        }
    }

    #[test]
    fn test_providers_are_deterministic() {
        let products = products();
        let reviews = reviews();
        assert_eq!(products.extract(), products.extract());
        assert_eq!(reviews.extract(), reviews.extract());
        assert_eq!(
            format!("{:?}", reviews.extract()),
            format!("{:?}", reviews.extract())
        );
    }

    #[test]
    fn test_provider_batches() {
        let batch = products().extract();
        assert_eq!(batch.table, "products");
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.rows[0][0], Value::Text("B08N5WRWNW".to_string()));

        let batch = reviews().extract();
        assert_eq!(batch.table, "reviews");
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.rows[2][1], Value::Text("B094DBT4V4".to_string()));
    }

    #[test]
    fn test_source_order() {
        let source = amazon_products_source().unwrap();
        assert_eq!(source.name(), "amazon_products");
        let names: Vec<&str> = source.providers().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["products", "reviews"]);
    }
}
