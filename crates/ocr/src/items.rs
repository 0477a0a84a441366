//! Line-item extraction — the most intricate stage of the pipeline.
//!
//! Lines are processed in order through a small explicit state machine:
//! `pending_name` holds a name-only line waiting for its price on a later
//! line, and `section_ended` latches once a total/settlement line is seen
//! (everything after the total section is payment noise). Item-shaped
//! lines themselves go through a priority-ordered chain of pattern
//! parsers; the first one that accepts the line builds the item.

use yeongsu_core::ReceiptItem;

use crate::lexicon::{
    SKIP_KEYWORDS, TAX_QUALIFIER_KEYWORDS, TOTAL_KEYWORDS, TOTAL_PRIORITY_KEYWORDS,
};
use crate::price::parse_price;
use crate::text::{char_len, collapse_spaces, contains_any, is_hangul};

/// Items beyond this are card numbers or barcodes misread as prices.
const MAX_ITEM_PRICE: i64 = 10_000_000;

/// State threaded through the per-line scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    /// A name-only line waiting for a price on a following line.
    pub pending_name: Option<String>,
    /// Latched once the total section starts; later lines are ignored.
    pub section_ended: bool,
}

/// `(name, unit_price, count, price)` produced by a line parser.
type ItemParts = (String, i64, i64, i64);

/// Single-line item grammars, highest priority first. The name/amount form
/// is handled separately because it needs lookahead at the next line.
const ITEM_PARSERS: &[fn(&str) -> Option<ItemParts>] = &[
    parse_discount_line,
    parse_count_unit_total,
    parse_unit_times_count,
    parse_count_total,
];

re!(re_subtotal_price, r"^\s*계\s+[\d,]+");
re!(re_count_marker_line, r"^[\d,.\s]+\d+개");
re!(re_trailing_colon, r":+\s*$");
re!(re_number_after_label, r"번호\d");
re!(re_card_suffix, r"카드$");
re!(re_barcode_price, r"^\*?\d{8,}\s+[\d,]+");
re!(re_barcode_prefix, r"^\*?\d{8,}\s+");
re!(re_trailing_amount, r"\s*-?[\d,.]+\s*$");
re!(re_tax_rate_summary, r"^\d+%\s");
re!(re_noise_symbols, r"[*&°@#$^{}|<>~\x{2160}-\x{216F}]");
re!(re_embedded_address, r"[구군]\s+\S+[로길동]\s+\d");
re!(re_hangul_pair, r"[가-힣]{2,}");
re!(re_latin_run, r"[a-zA-Z]{3,}");
re!(re_numeric_junk, r"^[\d\s:/.,()\-*]+$");
re!(re_trailing_tax_marker, r"(\d)[Tt]\s*$");
re!(re_comma_space, r"(\d),\s+(\d)");

re!(re_discount, r"^(.+?)\s+(-[\d,.]+)\s+([\d,.]+)\s*$");
re!(re_count_unit_total, r"^(.+?)\s+(\d+)\s+([\d,.]+)\s+([\d,.]+)\s*$");
re!(re_unit_times_count, r"^(.+?)\s+([\d,.]+)\s*[xX×]\s*(\d+)\s*([\d,.]*)\s*$");
re!(re_count_total, r"^(.+?)\s+(\d+)\s+([\d,.]+)\s*$");
re!(re_name_amount, r"^(.+?)\s+(-?[\d,.]+)\s*$");

re!(re_index_paren_prefix, r"^\d{1,3}\)\s*");
re!(re_index_prefix, r"^\d{1,3}\s+");
re!(re_star_prefix, r"^\*\s*");

re!(re_qp_discount, r"^([\d,.]+)\s+(\d+)개\s+([\d,.]+)\s+([\d,.]+)");
re!(re_qp_plain, r"^([\d,.]+)\s+(\d+)개\s+([\d,.]+)\s*$");
re!(re_qp_no_marker, r"^([\d,.]+)\s+(\d+)\s+([\d,.]+)\s*$");
re!(re_qp_unit_count, r"^([\d,.]+)\s+(\d+)\s*$");
re!(re_qp_count_first, r"^(\d+)\s+([\d,.]+)\s+([\d,.]+)\s*$");
re!(re_qp_count_amount, r"^(\d+)\s+([\d,.]+)\s*$");
re!(re_qp_amount_only, r"^([\d,.]+)\s*$");
re!(re_pq_leading, r"^[\d,.]+\s+\d+개\s");
re!(re_pq_numeric, r"^[\d,.\s]+$");
re!(re_trailing_letters, r"[A-Za-z]+\s*$");

/// Extract all line items from the merged receipt lines.
pub fn extract_items(texts: &[&str]) -> Vec<ReceiptItem> {
    let mut items = Vec::new();
    let mut state = ScanState::default();
    for (idx, raw) in texts.iter().enumerate() {
        let next_line = texts.get(idx + 1).map(|t| t.trim());
        state = step(state, raw.trim(), next_line, &mut items);
    }
    finalize(items)
}

/// Process one line, returning the state for the next line.
pub fn step(
    mut state: ScanState,
    text: &str,
    next_line: Option<&str>,
    items: &mut Vec<ReceiptItem>,
) -> ScanState {
    if text.is_empty() {
        return state;
    }

    // The item section ends at the first total line after at least one item.
    if !state.section_ended && !items.is_empty() && is_section_end(text) {
        state.section_ended = true;
    }
    if state.section_ended {
        state.pending_name = None;
        return state;
    }

    // A barcode-prefixed price line completes a pending name.
    if re_barcode_price().is_match(text) {
        if let Some(name) = state.pending_name.take() {
            let price_part = re_barcode_prefix().replace(text, "").trim().to_string();
            if let Some((unit_price, count, price)) = parse_price_line(&price_part) {
                push_item(items, &name, unit_price, count, price);
            }
        }
        return state;
    }

    // So does a standalone "price quantity [discount] total" line.
    if state.pending_name.is_some() && is_price_quantity_line(text) {
        if let Some((unit_price, count, price)) = parse_quantity_price_line(text) {
            let name = state.pending_name.take().unwrap_or_default();
            push_item(items, &name, unit_price, count, price);
            return state;
        }
        // An unparseable all-numeric line falls through to the filters.
    }

    if !is_item_line(text) {
        state.pending_name = None;
        return state;
    }
    if is_garbled(text) {
        state.pending_name = None;
        return state;
    }

    // Zero-cost option rows ("+샷추가") keep the pending name alive.
    if text.starts_with('+') {
        return state;
    }

    let tc = normalize_item_line(text);

    for parser in ITEM_PARSERS {
        if let Some((name, unit_price, count, price)) = parser(&tc) {
            state.pending_name = None;
            push_item(items, &name, unit_price, count, price);
            return state;
        }
    }

    // Name/amount needs lookahead: when the next line is a barcode price
    // line, that line carries the authoritative numbers, so defer.
    if let Some((name, price)) = parse_name_amount(&tc) {
        if next_line.is_some_and(|n| re_barcode_price().is_match(n)) {
            state.pending_name = Some(name);
            return state;
        }
        state.pending_name = None;
        push_item(items, &name, price, 1, price);
        return state;
    }

    // A bare name: hold it for a price on a later line.
    state.pending_name = capture_pending_name(text);
    state
}

fn push_item(items: &mut Vec<ReceiptItem>, name: &str, unit_price: i64, count: i64, price: i64) {
    items.push(ReceiptItem {
        id: items.len() as u32 + 1,
        name: clean_item_name(name),
        unit_price,
        count,
        price,
    });
}

/// Whether this line marks the start of the total/settlement section.
fn is_section_end(text: &str) -> bool {
    let check = collapse_spaces(text);
    if contains_any(&check, TOTAL_PRIORITY_KEYWORDS) {
        return true;
    }
    if contains_any(&check, TOTAL_KEYWORDS) && !contains_any(&check, TAX_QUALIFIER_KEYWORDS) {
        return true;
    }
    re_subtotal_price().is_match(&check)
}

/// Whether this line can be an item at all (totals and metadata are not).
fn is_item_line(text: &str) -> bool {
    let collapsed = collapse_spaces(text);
    if contains_any(&collapsed, TOTAL_KEYWORDS) || contains_any(&collapsed, SKIP_KEYWORDS) {
        return false;
    }
    // A bare "price N개 …" row belongs to the previous item, not a new one.
    if re_count_marker_line().is_match(text.trim()) {
        return false;
    }
    // A trailing colon means a label ("카 드:", "공급가::").
    if re_trailing_colon().is_match(text.trim()) {
        return false;
    }
    // Approval/transaction numbers ("인번호79875041").
    if re_number_after_label().is_match(&collapsed) {
        return false;
    }
    // Payment instruments ("삼성카드").
    if re_card_suffix().is_match(&collapsed) {
        return false;
    }
    true
}

/// OCR garbage: too short, too few meaningful characters next to noise
/// symbols, a tax-rate summary row, or an embedded address.
fn is_garbled(text: &str) -> bool {
    let cleaned = text.trim();
    if char_len(cleaned) < 2 {
        return true;
    }
    let korean_total = cleaned.chars().filter(|c| is_hangul(*c)).count();
    if korean_total == 0 && char_len(cleaned) <= 3 {
        return true;
    }

    let name_part = re_trailing_amount().replace(cleaned, "").into_owned();
    if name_part.is_empty() {
        return false;
    }
    let name_stripped: String = name_part.chars().filter(|c| *c != ' ').collect();
    let korean_in_name = name_part.chars().filter(|c| is_hangul(*c)).count();
    if char_len(&name_stripped) <= 3 && korean_in_name <= 1 {
        return true;
    }

    if re_tax_rate_summary().is_match(cleaned) {
        return true;
    }
    if re_noise_symbols().find_iter(cleaned).count() >= 2 {
        return true;
    }
    if re_embedded_address().is_match(cleaned) {
        return true;
    }
    // Isolated syllables with no Latin word either ("J이J r0 액").
    if !re_hangul_pair().is_match(&name_stripped) && !re_latin_run().is_match(&name_stripped) {
        return true;
    }
    false
}

/// Drop a trailing tax marker and mend "6, 100"-style comma spacing before
/// pattern matching.
fn normalize_item_line(text: &str) -> String {
    let s = re_trailing_tax_marker().replace(text, "$1").into_owned();
    re_comma_space().replace_all(&s, "$1,$2").into_owned()
}

// ── Single-line item grammars ────────────────────────────────────────────────

/// "할인 30% 30% -40,500 94,500" — a discount row; the trailing subtotal
/// column is discarded and the negative amount is the row's contribution.
fn parse_discount_line(tc: &str) -> Option<ItemParts> {
    let caps = re_discount().captures(tc)?;
    let name = caps[1].trim().to_string();
    let amount = parse_price(&caps[2])?;
    (amount < 0).then_some((name, amount, 1, amount))
}

/// "참이슬 2 1,800 3,600" — name, count, unit price, total.
fn parse_count_unit_total(tc: &str) -> Option<ItemParts> {
    let caps = re_count_unit_total().captures(tc)?;
    let name = caps[1].trim().to_string();
    let count: i64 = caps[2].parse().ok()?;
    let unit_price = parse_price(&caps[3])?;
    let price = parse_price(&caps[4])?;
    (unit_price != 0 && price != 0 && char_len(&name) >= 1 && count <= 100)
        .then_some((name, unit_price, count, price))
}

/// "참이슬 1,800 X 2 [3,600]" — total defaults to unit × count.
fn parse_unit_times_count(tc: &str) -> Option<ItemParts> {
    let caps = re_unit_times_count().captures(tc)?;
    let name = caps[1].trim().to_string();
    let unit_price = parse_price(&caps[2])?;
    let count: i64 = caps[3].parse().ok()?;
    if unit_price == 0 || count == 0 {
        return None;
    }
    let price = caps
        .get(4)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .and_then(parse_price)
        .unwrap_or(unit_price * count);
    Some((name, unit_price, count, price))
}

/// "버터 1 3,120" — name, count, total; unit price is derived.
fn parse_count_total(tc: &str) -> Option<ItemParts> {
    let caps = re_count_total().captures(tc)?;
    let name = caps[1].trim().to_string();
    let count: i64 = caps[2].parse().ok()?;
    let price = parse_price(&caps[3])?;
    if count > 50 || char_len(&name) < 1 || re_numeric_junk().is_match(&name) {
        return None;
    }
    let unit_price = if count > 0 && price != 0 { price / count } else { price };
    Some((name, unit_price, count, price))
}

/// "삼각김밥 1,200" — name and amount only; needs barcode lookahead, so it
/// sits outside the parser chain.
fn parse_name_amount(tc: &str) -> Option<(String, i64)> {
    let caps = re_name_amount().captures(tc)?;
    let name = caps[1].trim().to_string();
    let price = parse_price(&caps[2])?;
    (char_len(&name) >= 2 && !re_numeric_junk().is_match(&name) && price.abs() >= 100)
        .then_some((name, price))
}

fn capture_pending_name(text: &str) -> Option<String> {
    if char_len(text) < 2 || re_numeric_junk().is_match(text) {
        return None;
    }
    let mut s = re_index_paren_prefix().replace(text, "").trim().to_string();
    s = re_index_prefix().replace(&s, "").trim().to_string();
    s = re_star_prefix().replace(&s, "").trim().to_string();
    (char_len(&s) >= 2).then_some(s)
}

// ── Price-only follower lines ────────────────────────────────────────────────

fn is_price_quantity_line(text: &str) -> bool {
    let t = text.trim();
    re_pq_leading().is_match(t) || re_pq_numeric().is_match(t)
}

/// "단가 N개 [할인] 금액" follower line → (unit, count, total).
fn parse_quantity_price_line(text: &str) -> Option<(i64, i64, i64)> {
    let t = text.trim();

    // "6,000 1개 0 6,000" — with a discount column (ignored).
    if let Some(caps) = re_qp_discount().captures(t) {
        let unit = parse_price(&caps[1]);
        let count: Option<i64> = caps[2].parse().ok();
        let total = parse_price(&caps[4]);
        if let (Some(unit), Some(count), Some(total)) = (unit, count, total) {
            return Some((unit, count, total));
        }
    }

    // "6,000 1개 6,000"
    if let Some(caps) = re_qp_plain().captures(t) {
        let unit = parse_price(&caps[1]);
        let count: Option<i64> = caps[2].parse().ok();
        let total = parse_price(&caps[3]);
        if let (Some(unit), Some(count), Some(total)) = (unit, count, total) {
            return Some((unit, count, total));
        }
    }

    // "3,700 1 3,700" — no count marker.
    if let Some(caps) = re_qp_no_marker().captures(t) {
        let unit = parse_price(&caps[1]);
        let count: Option<i64> = caps[2].parse().ok();
        let total = parse_price(&caps[3]);
        if let (Some(unit), Some(count), Some(total)) = (unit, count, total) {
            if count <= 50 {
                return Some((unit, count, total));
            }
        }
    }

    // "3,700 1" — neither marker nor total.
    if let Some(caps) = re_qp_unit_count().captures(t) {
        let unit = parse_price(&caps[1]);
        let count: Option<i64> = caps[2].parse().ok();
        if let (Some(unit), Some(count)) = (unit, count) {
            if count <= 50 {
                return Some((unit, count, unit * count));
            }
        }
    }

    // "2 1,800 3,600" — count first. Only reachable when the separated
    // forms above failed, so the comma-grouped columns disambiguate.
    if let Some(caps) = re_qp_count_first().captures(t) {
        let count: Option<i64> = caps[1].parse().ok();
        let unit = parse_price(&caps[2]);
        let total = parse_price(&caps[3]);
        if let (Some(count), Some(unit), Some(total)) = (count, unit, total) {
            if count <= 50 {
                return Some((unit, count, total));
            }
        }
    }

    None
}

/// The tail of a barcode line → (unit, count, total).
fn parse_price_line(text: &str) -> Option<(i64, i64, i64)> {
    let t = re_trailing_letters().replace(text.trim(), "").trim().to_string();

    // "단가 수량 금액"
    if let Some(caps) = re_qp_no_marker().captures(&t) {
        let unit = parse_price(&caps[1]);
        let count: Option<i64> = caps[2].parse().ok();
        let price = parse_price(&caps[3]);
        if let (Some(unit), Some(count), Some(price)) = (unit, count, price) {
            return Some((unit, count, price));
        }
    }

    // "수량 금액" (예: "1 3,500")
    if let Some(caps) = re_qp_count_amount().captures(&t) {
        let count: Option<i64> = caps[1].parse().ok();
        let price = parse_price(&caps[2]);
        if let (Some(count), Some(price)) = (count, price) {
            if count <= 50 {
                let unit = if count > 0 { price / count } else { price };
                return Some((unit, count, price));
            }
        }
    }

    // "금액"
    if let Some(caps) = re_qp_amount_only().captures(&t) {
        if let Some(price) = parse_price(&caps[1]) {
            return Some((price, 1, price));
        }
    }

    None
}

// ── Post-processing ──────────────────────────────────────────────────────────

/// Drop mis-captured labels and absurd prices, then renumber.
fn finalize(items: Vec<ReceiptItem>) -> Vec<ReceiptItem> {
    let mut kept: Vec<ReceiptItem> = items
        .into_iter()
        .filter(|it| !re_trailing_colon().is_match(&it.name))
        .filter(|it| !(it.price == 0 && it.name.contains(':')))
        .filter(|it| it.price.abs() <= MAX_ITEM_PRICE)
        .collect();
    for (i, item) in kept.iter_mut().enumerate() {
        item.id = i as u32 + 1;
        if item.count < 1 {
            item.count = 1;
        }
    }
    kept
}

re!(re_name_star_prefix, r"^[*\s]+");
re!(re_name_chevron_prefix, r"^>{1,2}\s*");
re!(re_name_dash_prefix, r"^-\s*");
re!(re_name_exempt_prefix, r"^\(면세\)\s*");
re!(re_name_taxed_prefix, r"^\(과세\)\s*");
re!(re_name_taxed_suffix, r"\(과세\)\s*$");
re!(re_name_exempt_suffix, r"\(면세\)\s*$");
re!(re_name_index_prefix, r"^\d{1,3}\s+");
re!(re_name_price_suffix, r"\s+\d{1,3}(,\d{3})+\s*-?\s*$");
re!(re_name_bracket_suffix, r"[\[\]]$");

/// Strip emphasis markers, tax-status tags, leading indices and embedded
/// trailing prices from an item name.
fn clean_item_name(name: &str) -> String {
    let mut s = re_name_star_prefix().replace(name, "").into_owned();
    s = re_name_chevron_prefix().replace(&s, "").into_owned();
    s = re_name_dash_prefix().replace(&s, "").into_owned();
    s = re_name_exempt_prefix().replace(&s, "").into_owned();
    s = re_name_taxed_prefix().replace(&s, "").into_owned();
    s = re_name_taxed_suffix().replace(&s, "").into_owned();
    s = re_name_exempt_suffix().replace(&s, "").into_owned();
    s = re_name_index_prefix().replace(&s, "").into_owned();
    s = re_name_price_suffix().replace(&s, "").into_owned();
    s = re_name_bracket_suffix().replace(&s, "").into_owned();
    s.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_then_price_line_carry_over() {
        // Scenario: name on one row, "count unit total" on the next.
        let items = extract_items(&["참이슬", "2 1,800 3,600"]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "참이슬");
        assert_eq!(items[0].unit_price, 1800);
        assert_eq!(items[0].count, 2);
        assert_eq!(items[0].price, 3600);
    }

    #[test]
    fn single_line_count_unit_total() {
        let items = extract_items(&["참이슬 2 1,800 3,600"]);
        assert_eq!(items.len(), 1);
        assert_eq!(
            (items[0].unit_price, items[0].count, items[0].price),
            (1800, 2, 3600)
        );
    }

    #[test]
    fn discount_line_keeps_negative_amount_and_drops_subtotal() {
        let items = extract_items(&["할인 30% 30% -40,500 94,500"]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price, -40500);
        assert_eq!(items[0].price, -40500);
        assert_eq!(items[0].count, 1);
    }

    #[test]
    fn unit_times_count_without_total() {
        let items = extract_items(&["후라이드치킨 18,000 X 2"]);
        assert_eq!(
            (items[0].unit_price, items[0].count, items[0].price),
            (18000, 2, 36000)
        );
    }

    #[test]
    fn unit_times_count_with_total_column() {
        let items = extract_items(&["후라이드치킨 18,000 x 2 36,000"]);
        assert_eq!(
            (items[0].unit_price, items[0].count, items[0].price),
            (18000, 2, 36000)
        );
    }

    #[test]
    fn count_total_derives_unit_price() {
        let items = extract_items(&["버터 1 3,120"]);
        assert_eq!(
            (items[0].unit_price, items[0].count, items[0].price),
            (3120, 1, 3120)
        );
    }

    #[test]
    fn name_amount_defaults_count_to_one() {
        let items = extract_items(&["삼각김밥 1,200"]);
        assert_eq!(
            (items[0].unit_price, items[0].count, items[0].price),
            (1200, 1, 1200)
        );
    }

    #[test]
    fn small_amounts_are_not_items() {
        // |amount| < 100 is an option marker, not a price.
        assert!(extract_items(&["샷추가 50"]).is_empty());
    }

    #[test]
    fn barcode_line_completes_pending_name() {
        let items = extract_items(&["코카콜라 1,900", "8801104306928 2,000 5 10,000"]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "코카콜라");
        // The barcode row carries the authoritative numbers.
        assert_eq!(
            (items[0].unit_price, items[0].count, items[0].price),
            (2000, 5, 10000)
        );
    }

    #[test]
    fn starred_barcode_also_matches() {
        let items = extract_items(&["바나나우유", "*8809074396277 1,300 2 2,600"]);
        assert_eq!(items.len(), 1);
        assert_eq!(
            (items[0].unit_price, items[0].count, items[0].price),
            (1300, 2, 2600)
        );
    }

    #[test]
    fn quantity_price_follower_with_discount_column() {
        let items = extract_items(&["아메리카노", "6,000 1개 0 6,000"]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "아메리카노");
        assert_eq!(
            (items[0].unit_price, items[0].count, items[0].price),
            (6000, 1, 6000)
        );
    }

    #[test]
    fn section_cutoff_ignores_items_after_total_line() {
        let items = extract_items(&[
            "참이슬 2 1,800 3,600",
            "합계 3,600",
            "환불좋은우유 1 9,999",
        ]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "참이슬");
    }

    #[test]
    fn taxed_subtotal_does_not_end_the_section() {
        let items = extract_items(&[
            "참이슬 2 1,800 3,600",
            "과세 합계 3,600",
            "버터 1 3,120",
        ]);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn bare_gye_price_row_ends_the_section() {
        let items = extract_items(&["버터 1 3,120", "계 3,120", "포인트 500"]);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn metadata_lines_are_skipped_and_clear_pending() {
        let items = extract_items(&["포테토칩", "부가세 350", "1,500"]);
        // The skip line cleared the pending name, so the bare amount is lost.
        assert!(items.is_empty());
    }

    #[test]
    fn option_line_preserves_pending_name() {
        let items = extract_items(&["아이스티", "+샷추가", "3,700 1 3,700"]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "아이스티");
    }

    #[test]
    fn trailing_tax_marker_is_tolerated() {
        let items = extract_items(&["새우깡 1,500T"]);
        assert_eq!(items[0].price, 1500);
    }

    #[test]
    fn comma_space_artifact_is_mended() {
        let items = extract_items(&["김치찌개 6, 100"]);
        assert_eq!(items[0].price, 6100);
    }

    #[test]
    fn numbering_prefix_is_stripped_from_pending_name() {
        let items = extract_items(&["001) 육개장", "8,000 1"]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "육개장");
        assert_eq!(items[0].price, 8000);
    }

    #[test]
    fn garbled_noise_is_not_an_item() {
        assert!(extract_items(&["J이J r0 액 1,000"]).is_empty());
        assert!(extract_items(&["마패패명* & 라이 1,000"]).is_empty());
    }

    #[test]
    fn tax_rate_summary_row_is_not_an_item() {
        assert!(extract_items(&["10% 14,326 143,274"]).is_empty());
    }

    #[test]
    fn embedded_address_is_not_an_item() {
        assert!(extract_items(&["서울 강남구 선릉로 431"]).is_empty());
    }

    #[test]
    fn absurd_price_is_filtered_out() {
        // A card number misread as a price is caught by the magnitude guard.
        assert!(extract_items(&["상품권 1 123,456,789,012"]).is_empty());
    }

    #[test]
    fn items_are_renumbered_after_filtering() {
        let items = extract_items(&["콜라 1 1,500", "인 액: 1,000", "사이다 1 1,600"]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, 1);
        assert_eq!(items[1].id, 2);
        assert_eq!(items[1].name, "사이다");
    }

    #[test]
    fn clean_item_name_strips_decoration() {
        assert_eq!(clean_item_name(">>할인"), "할인");
        assert_eq!(clean_item_name("*공기밥"), "공기밥");
        assert_eq!(clean_item_name("(면세) 두부"), "두부");
        assert_eq!(clean_item_name("깐풍기 (과세)"), "깐풍기");
        assert_eq!(clean_item_name("01 얼큰칼국수 10,000"), "얼큰칼국수");
        assert_eq!(clean_item_name("사이다335m]"), "사이다335m");
    }

    #[test]
    fn step_is_reentrant_per_line() {
        // Drive the state machine line by line, asserting the carried state.
        let mut items = Vec::new();
        let s0 = ScanState::default();
        let s1 = step(s0, "참이슬", Some("2 1,800 3,600"), &mut items);
        assert_eq!(s1.pending_name.as_deref(), Some("참이슬"));
        let s2 = step(s1, "2 1,800 3,600", None, &mut items);
        assert_eq!(s2.pending_name, None);
        assert_eq!(items.len(), 1);
    }
}
