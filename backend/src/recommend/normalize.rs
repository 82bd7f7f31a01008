//! Maps upstream prediction records onto the storefront's `RecommendationResult`.

use serde_json::{json, Value};
use shared::RecommendationResult;

use super::models::{self, EnrichedPrediction, ImageRef, PartialPrediction};
use crate::db::models::Product;

const NOT_FOUND_NAME: &str = "Product not found";
const LOOKUP_FAILED_NAME: &str = "Error fetching details";

/// Numbers become 4-decimal strings; anything else is passed through.
pub fn format_score(score: Value) -> Value {
    match score.as_f64() {
        Some(n) => Value::String(format!("{:.4}", n)),
        None => score,
    }
}

fn score_or(score: Option<&Value>, default: f64) -> Value {
    format_score(score.cloned().unwrap_or_else(|| json!(default)))
}

pub fn from_enriched(item: &EnrichedPrediction) -> RecommendationResult {
    RecommendationResult {
        id: item.id.clone(),
        name: item.name.clone(),
        price: item.price,
        image_url: item.image.first().map(str::to_string),
        brand: item.brand.clone().unwrap_or_default(),
        score: score_or(item.score.as_ref(), 1.0),
    }
}

pub fn from_catalog(product: &Product, score: Option<&Value>) -> RecommendationResult {
    RecommendationResult {
        id: product.id.clone(),
        name: product.name.clone(),
        price: product.price,
        image_url: product.primary_image().map(str::to_string),
        brand: product.brand.clone().unwrap_or_default(),
        score: score_or(score, 1.0),
    }
}

pub fn not_found(item: &PartialPrediction) -> RecommendationResult {
    placeholder(item, NOT_FOUND_NAME)
}

pub fn lookup_failed(item: &PartialPrediction) -> RecommendationResult {
    placeholder(item, LOOKUP_FAILED_NAME)
}

fn placeholder(item: &PartialPrediction, default_name: &str) -> RecommendationResult {
    RecommendationResult {
        id: item.id.clone(),
        name: item.name.clone().unwrap_or_else(|| default_name.to_string()),
        price: item.price.unwrap_or(0.0),
        image_url: item.image.as_ref().and_then(ImageRef::first).map(str::to_string),
        brand: String::new(),
        score: score_or(item.score.as_ref(), 0.0),
    }
}

/// Records from the ranked-lookup endpoint are reshaped as-is, with no catalog lookup.
pub fn from_ranked(record: &Value) -> RecommendationResult {
    let empty = serde_json::Map::new();
    let fields = record.as_object().unwrap_or(&empty);

    RecommendationResult {
        id: models::record_id(fields).unwrap_or_default(),
        name: models::text(fields, "name").unwrap_or_default(),
        price: fields.get("price").and_then(Value::as_f64).unwrap_or(0.0),
        image_url: fields
            .get("image")
            .and_then(ImageRef::from_value)
            .and_then(|image| image.first().map(str::to_string)),
        brand: models::text(fields, "brand").unwrap_or_default(),
        score: models::score(fields).map(format_score).unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: "p7".into(),
            name: "Denim Jacket".into(),
            description: String::new(),
            price: 1299.0,
            brand: Some("Levis".into()),
            image: vec!["front.jpg".into(), "back.jpg".into()],
            category: "Men".into(),
            sub_category: "Topwear".into(),
            sizes: vec!["M".into()],
            bestseller: false,
            date: 0,
        }
    }

    #[test]
    fn numeric_scores_get_four_decimals() {
        assert_eq!(format_score(json!(1)), json!("1.0000"));
        assert_eq!(format_score(json!(0.123456)), json!("0.1235"));
        assert_eq!(format_score(json!("high")), json!("high"));
        assert_eq!(format_score(Value::Null), Value::Null);
    }

    #[test]
    fn enriched_item_uses_first_image_and_defaults() {
        let item = EnrichedPrediction {
            id: "p1".into(),
            name: "Shirt".into(),
            price: 499.0,
            image: ImageRef::Many(vec!["a.jpg".into(), "b.jpg".into()]),
            brand: None,
            score: None,
        };
        let result = from_enriched(&item);
        assert_eq!(result.image_url.as_deref(), Some("a.jpg"));
        assert_eq!(result.brand, "");
        assert_eq!(result.score, json!("1.0000"));
    }

    #[test]
    fn catalog_record_supplies_the_details() {
        let result = from_catalog(&product(), Some(&json!(0.75)));
        assert_eq!(result.id, "p7");
        assert_eq!(result.name, "Denim Jacket");
        assert_eq!(result.price, 1299.0);
        assert_eq!(result.image_url.as_deref(), Some("front.jpg"));
        assert_eq!(result.brand, "Levis");
        assert_eq!(result.score, json!("0.7500"));
    }

    #[test]
    fn catalog_record_without_images_has_no_url() {
        let mut bare = product();
        bare.image.clear();
        bare.brand = None;
        let result = from_catalog(&bare, None);
        assert_eq!(result.image_url, None);
        assert_eq!(result.brand, "");
        assert_eq!(result.score, json!("1.0000"));
    }

    #[test]
    fn placeholders_zero_price_and_score() {
        let item = PartialPrediction {
            id: "gone".into(),
            image: Some(ImageRef::Single("x.jpg".into())),
            ..Default::default()
        };

        let missing = not_found(&item);
        assert_eq!(missing.name, "Product not found");
        assert_eq!(missing.price, 0.0);
        assert_eq!(missing.score, json!("0.0000"));
        assert_eq!(missing.image_url.as_deref(), Some("x.jpg"));

        let failed = lookup_failed(&item);
        assert_eq!(failed.name, "Error fetching details");
        assert_eq!(failed.id, "gone");
    }

    #[test]
    fn placeholder_keeps_a_supplied_name() {
        let item = PartialPrediction {
            id: "gone".into(),
            name: Some("Old Tee".into()),
            ..Default::default()
        };
        assert_eq!(lookup_failed(&item).name, "Old Tee");
    }

    #[test]
    fn ranked_record_is_reshaped() {
        let result = from_ranked(&json!({
            "_id": "p3", "name": "Cap", "price": 199.5, "image": "cap.jpg", "score": 0.5
        }));
        assert_eq!(result.id, "p3");
        assert_eq!(result.image_url.as_deref(), Some("cap.jpg"));
        assert_eq!(result.score, json!("0.5000"));
        assert_eq!(result.brand, "");
    }
}
