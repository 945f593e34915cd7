//! Token record model matching the upstream trending payload.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One trending token as reported upstream. Every field may be absent, and a field of an
/// unexpected JSON type never rejects the record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub symbol: Option<String>,
    #[serde(default, rename = "uniqueName", deserialize_with = "lenient_text")]
    pub unique_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_categories")]
    pub categories: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub contract_address: Option<String>,
    #[serde(default, rename = "chainId", deserialize_with = "lenient_text")]
    pub chain_id: Option<String>,
    /// Numbers arrive as JSON numbers or strings depending on the token
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub market_cap: Option<Value>,
    #[serde(default, rename = "volume24H")]
    pub volume_24h: Option<Value>,
}

impl TokenRecord {
    /// Categories, treating a missing list as empty.
    pub fn categories(&self) -> &[String] {
        self.categories.as_deref().unwrap_or(&[])
    }

    /// Name used for the publication directory: unique identifier first, then display
    /// name, then symbol.
    pub fn publication_name(&self) -> String {
        [&self.unique_name, &self.name, &self.symbol]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(sanitize_segment)
            .find(|name| !name.is_empty() && name != "." && name != "..")
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Render an upstream numeric field verbatim, or `None` when it is missing.
pub fn display_value(value: &Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// Text field with surrounding whitespace ignored, or `None` when it is missing or blank.
pub fn text(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

fn sanitize_segment(raw: &str) -> String {
    raw.trim().replace(['/', '\\'], "-")
}

/// Strings pass through, `null` is missing, anything else keeps its JSON text.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Keeps the string entries of a list; any other shape counts as no categories.
fn lenient_categories<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

/// Entries that are not JSON objects are dropped instead of failing the batch.
fn lenient_coins<'de, D>(deserializer: D) -> Result<Vec<TokenRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<Value>::deserialize(deserializer)?;
    let total = entries.len();
    let coins: Vec<TokenRecord> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();
    if coins.len() < total {
        tracing::warn!("Skipped {} unreadable trending entries", total - coins.len());
    }
    Ok(coins)
}

/// Upstream response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct TrendingResponse {
    #[serde(deserialize_with = "lenient_coins")]
    pub coins: Vec<TokenRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_upstream_shape() {
        let token: TokenRecord = serde_json::from_value(json!({
            "name": "Pepe",
            "symbol": "PEPE",
            "uniqueName": "pepe",
            "categories": ["meme", "defi"],
            "contract_address": "0x6982508145454ce325ddbe47a25d4ec3d2311933",
            "chainId": "0x1",
            "price": 1.25,
            "market_cap": "5200000000",
            "volume24H": null,
            "someExtraField": true
        }))
        .unwrap();

        assert_eq!(token.unique_name.as_deref(), Some("pepe"));
        assert_eq!(token.chain_id.as_deref(), Some("0x1"));
        assert_eq!(token.categories(), ["meme", "defi"]);
        assert_eq!(display_value(&token.price).as_deref(), Some("1.25"));
        assert_eq!(display_value(&token.market_cap).as_deref(), Some("5200000000"));
        assert_eq!(display_value(&token.volume_24h), None);
    }

    #[test]
    fn test_missing_fields_default() {
        let token: TokenRecord = serde_json::from_value(json!({ "categories": null })).unwrap();
        assert!(token.categories().is_empty());
        assert!(token.name.is_none());
        assert_eq!(token.publication_name(), "unknown");
    }

    #[test]
    fn test_publication_name_fallbacks() {
        let mut token = TokenRecord {
            name: Some("Dog Wif Hat".to_string()),
            symbol: Some("WIF".to_string()),
            ..Default::default()
        };
        assert_eq!(token.publication_name(), "Dog Wif Hat");

        token.unique_name = Some("dogwifhat".to_string());
        assert_eq!(token.publication_name(), "dogwifhat");

        token.unique_name = Some("..".to_string());
        assert_eq!(token.publication_name(), "Dog Wif Hat");

        token.name = Some("a/b\\c".to_string());
        assert_eq!(token.publication_name(), "a-b-c");
    }

    #[test]
    fn test_odd_record_does_not_reject_batch() {
        let response: TrendingResponse = serde_json::from_value(json!({
            "coins": [
                { "name": "Pepe", "symbol": "PEPE", "uniqueName": "pepe", "chainId": "0x1" },
                {
                    "name": "Odd",
                    "symbol": 42,
                    "uniqueName": null,
                    "chainId": 137,
                    "contract_address": false,
                    "categories": ["meme", null, 7]
                },
                null
            ]
        }))
        .unwrap();

        assert_eq!(response.coins.len(), 2);
        let odd = &response.coins[1];
        assert_eq!(odd.name.as_deref(), Some("Odd"));
        assert_eq!(odd.symbol.as_deref(), Some("42"));
        assert_eq!(odd.chain_id.as_deref(), Some("137"));
        assert_eq!(odd.contract_address.as_deref(), Some("false"));
        assert!(odd.unique_name.is_none());
        assert_eq!(odd.categories(), ["meme"]);

        let token: TokenRecord = serde_json::from_value(json!({ "categories": "meme" })).unwrap();
        assert!(token.categories().is_empty());
    }

    #[test]
    fn test_blank_text_is_missing() {
        let token: TokenRecord =
            serde_json::from_value(json!({ "name": "  ", "symbol": "PEPE" })).unwrap();
        assert_eq!(text(&token.name), None);
        assert_eq!(text(&token.symbol), Some("PEPE"));
        assert_eq!(text(&None), None);
    }
}
