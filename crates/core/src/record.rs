use chrono::Local;
use serde::{Deserialize, Serialize};

/// One purchased row on a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptItem {
    /// 1-based position, renumbered after post-filtering.
    pub id: u32,
    pub name: String,
    /// Per-unit amount in won. Negative for discount rows.
    pub unit_price: i64,
    pub count: i64,
    /// Net contribution of the row. Not necessarily `unit_price * count`
    /// (discounts and rounding break that equality).
    pub price: i64,
}

/// The structured record produced for one receipt image.
///
/// This is the JSON object handed to the downstream audit stage. A record is
/// never mutated after assembly — a proofreading pass produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub receipt_id: String,
    /// `""` when no store name could be recovered.
    pub store_name: String,
    /// `""` when no address could be recovered.
    pub store_address: String,
    /// `"YYYY-MM-DD HH:MM"`, `"YYYY-MM-DD"`, or `""` when no date was found.
    pub date: String,
    pub items: Vec<ReceiptItem>,
    pub total_price: i64,
}

impl ReceiptRecord {
    /// Record for an image that yielded no detections (e.g. undecodable bytes).
    pub fn empty(receipt_id: impl Into<String>) -> Self {
        Self {
            receipt_id: receipt_id.into(),
            store_name: String::new(),
            store_address: String::new(),
            date: String::new(),
            items: Vec::new(),
            total_price: 0,
        }
    }

    /// Fallback record for a failed extraction request (OCR crash or timeout).
    /// Carries a sentinel store name so downstream consumers can tell it apart
    /// from a genuinely empty receipt.
    pub fn failure_fallback(receipt_id: impl Into<String>) -> Self {
        Self {
            receipt_id: receipt_id.into(),
            store_name: "Unknown Store (Error)".to_string(),
            store_address: String::new(),
            date: Local::now().format("%Y-%m-%d %H:%M").to_string(),
            items: Vec::new(),
            total_price: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_has_zeroed_fields() {
        let r = ReceiptRecord::empty("r-1");
        assert_eq!(r.receipt_id, "r-1");
        assert_eq!(r.store_name, "");
        assert_eq!(r.date, "");
        assert!(r.items.is_empty());
        assert_eq!(r.total_price, 0);
    }

    #[test]
    fn fallback_record_carries_sentinel_store_name() {
        let r = ReceiptRecord::failure_fallback("r-2");
        assert_eq!(r.store_name, "Unknown Store (Error)");
        assert_eq!(r.total_price, 0);
        // "YYYY-MM-DD HH:MM"
        assert_eq!(r.date.len(), 16);
    }

    #[test]
    fn record_serializes_to_expected_json_shape() {
        let r = ReceiptRecord {
            receipt_id: "abc".into(),
            store_name: "스타벅스".into(),
            store_address: "서울 강남구 선릉로 431".into(),
            date: "2025-10-03 16:47".into(),
            items: vec![ReceiptItem {
                id: 1,
                name: "아메리카노".into(),
                unit_price: 4500,
                count: 2,
                price: 9000,
            }],
            total_price: 9000,
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["store_name"], "스타벅스");
        assert_eq!(json["items"][0]["unit_price"], 4500);
        assert_eq!(json["total_price"], 9000);
    }

    #[test]
    fn record_roundtrips_through_json() {
        let r = ReceiptRecord::empty("x");
        let json = serde_json::to_string(&r).unwrap();
        let back: ReceiptRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
