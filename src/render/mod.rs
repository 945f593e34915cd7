//! Markdown rendering of token records.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::chain::resolve_chain;
use crate::models::{display_value, text, RenderedDocument, TokenRecord};

/// Placeholder for any missing field.
pub const PLACEHOLDER: &str = "N/A";

/// ISO-8601 timestamp with millisecond precision, e.g. `2024-01-02T03:04:05.678Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Price chart link for a token on its resolved network.
pub fn chart_link(network: &str, unique_name: &str) -> String {
    format!(
        "https://moralis.com/chain/{}/token/price/{}",
        network, unique_name
    )
}

/// Render one token as a markdown document stamped with `rendered_at`.
pub fn render_token(token: &TokenRecord, rendered_at: DateTime<Utc>) -> RenderedDocument {
    let name = text(&token.name).unwrap_or(PLACEHOLDER);
    let symbol = text(&token.symbol).unwrap_or(PLACEHOLDER);
    let contract = text(&token.contract_address).unwrap_or(PLACEHOLDER);
    let network = token
        .chain_id
        .as_deref()
        .and_then(resolve_chain)
        .map(|c| c.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let link = chart_link(&network, text(&token.unique_name).unwrap_or(PLACEHOLDER));

    let price = display_value(&token.price);
    let market_cap = display_value(&token.market_cap);
    let volume = display_value(&token.volume_24h);

    let content = format!(
        "---
title: {name}
symbol: {symbol}
categories: {categories}
contract_address: {contract}
updated_at: {updated_at}
---

# {name} ({symbol})
The [{name} token]({link}) is trading live on the {network} blockchain.

## Links
- Price and chart: {link}

## Market Data
- Current Price: ${price}
- Market Cap: ${market_cap}
- 24h Volume: ${volume}
",
        categories = token.categories().join(", "),
        updated_at = iso_timestamp(rendered_at),
        price = price.as_deref().unwrap_or(PLACEHOLDER),
        market_cap = market_cap.as_deref().unwrap_or(PLACEHOLDER),
        volume = volume.as_deref().unwrap_or(PLACEHOLDER),
    );

    RenderedDocument::new(content)
}
