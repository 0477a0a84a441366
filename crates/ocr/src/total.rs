//! Total-price extraction.
//!
//! Final-settlement keywords outrank the generic subtotal/total keywords,
//! which in turn outrank the bare "계 = amount" form. The price may sit on
//! the keyword line itself or on the line right below it. When every phase
//! fails, the assembler falls back to summing the item prices.

use crate::lexicon::{TAX_QUALIFIER_KEYWORDS, TOTAL_KEYWORDS, TOTAL_PRIORITY_KEYWORDS};
use crate::price::parse_price;
use crate::text::{collapse_spaces, contains_any};

/// Totals above this are misread card numbers, below it line noise.
const MAX_TOTAL: i64 = 10_000_000;
const MIN_TOTAL: i64 = 100;

re!(re_gye_equals, r"^\s*계\s*=\s*([\d,]+)");

/// Extract the settled total, or `None` when no keyword line yields one.
pub fn extract_total(texts: &[&str]) -> Option<i64> {
    // Phase 1: final-settlement keywords.
    for (i, text) in texts.iter().enumerate() {
        let collapsed = collapse_spaces(text);
        if contains_any(&collapsed, TOTAL_PRIORITY_KEYWORDS) {
            if let Some(price) = price_from_context(texts, i) {
                if (MIN_TOTAL..=MAX_TOTAL).contains(&price.abs()) {
                    return Some(price);
                }
            }
        }
    }

    // Phase 2: general total keywords, skipping taxed/exempt subtotals.
    for (i, text) in texts.iter().enumerate() {
        let collapsed = collapse_spaces(text);
        if contains_any(&collapsed, TOTAL_KEYWORDS) {
            if contains_any(&collapsed, TAX_QUALIFIER_KEYWORDS) {
                continue;
            }
            if let Some(price) = price_from_context(texts, i) {
                if (MIN_TOTAL..=MAX_TOTAL).contains(&price.abs()) {
                    return Some(price);
                }
            }
        }
    }

    // Phase 3: the bare "계 = 12,000" form.
    for text in texts {
        let collapsed = collapse_spaces(text);
        if let Some(caps) = re_gye_equals().captures(&collapsed) {
            if let Some(price) = parse_price(&caps[1]) {
                if (MIN_TOTAL..=MAX_TOTAL).contains(&price) {
                    return Some(price);
                }
            }
        }
    }

    None
}

/// Price on the keyword line itself, or failing that on the next line.
fn price_from_context(texts: &[&str], idx: usize) -> Option<i64> {
    if let Some(price) = parse_price(texts[idx]) {
        if price.abs() >= MIN_TOTAL {
            return Some(price);
        }
    }
    if let Some(next) = texts.get(idx + 1) {
        if let Some(price) = parse_price(next) {
            if price.abs() >= MIN_TOTAL {
                return Some(price);
            }
        }
    }
    None
}
