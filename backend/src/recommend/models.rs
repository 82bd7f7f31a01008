use serde_json::{Map, Value};

/// `image` on an upstream record: a single URL or a list of them.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageRef {
    Single(String),
    Many(Vec<String>),
}

impl ImageRef {
    /// Empty strings and empty lists count as absent.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(url) if !url.is_empty() => Some(ImageRef::Single(url.clone())),
            Value::Array(items) => {
                let urls: Vec<String> = items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                (!urls.is_empty()).then_some(ImageRef::Many(urls))
            }
            _ => None,
        }
    }

    pub fn first(&self) -> Option<&str> {
        match self {
            ImageRef::Single(url) => Some(url),
            ImageRef::Many(urls) => urls.first().map(String::as_str),
        }
    }
}

/// Prediction that already carries everything needed for display.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedPrediction {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub image: ImageRef,
    pub brand: Option<String>,
    pub score: Option<Value>,
}

/// Prediction that must be completed from the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialPrediction {
    pub id: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub image: Option<ImageRef>,
    pub score: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionItem {
    Enriched(EnrichedPrediction),
    Partial(PartialPrediction),
}

impl PredictionItem {
    /// Classifies one upstream record. Anything that isn't an object becomes an
    /// empty partial record.
    pub fn from_value(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            return PredictionItem::Partial(PartialPrediction::default());
        };

        let id = record_id(fields);
        let name = text(fields, "name");
        let price = fields.get("price").and_then(Value::as_f64);
        let image = fields.get("image").and_then(ImageRef::from_value);
        let score = score(fields);

        match (id, name, price, image) {
            (Some(id), Some(name), Some(price), Some(image)) => {
                PredictionItem::Enriched(EnrichedPrediction {
                    id,
                    name,
                    price,
                    image,
                    brand: text(fields, "brand"),
                    score,
                })
            }
            (id, name, price, image) => PredictionItem::Partial(PartialPrediction {
                id: id.unwrap_or_default(),
                name,
                price,
                image,
                score,
            }),
        }
    }
}

/// `_id` wins over `id`; numeric ids are rendered as text.
pub(crate) fn record_id(fields: &Map<String, Value>) -> Option<String> {
    ["_id", "id"].iter().find_map(|key| match fields.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

pub(crate) fn text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn score(fields: &Map<String, Value>) -> Option<Value> {
    fields.get("score").filter(|v| !v.is_null()).cloned()
}
