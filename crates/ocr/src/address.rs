//! Store-address extraction.
//!
//! Four phases, each more permissive than the last: explicit labels,
//! province-prefixed lines, embedded city/district shapes, and bare
//! neighborhood/street starts. A candidate may absorb up to two following
//! lines (building/floor/unit continuations) before validation and cleanup.

use crate::lexicon::{address_label_patterns, PLACE_NAME_FIXES, SIDO_NAMES};
use crate::text::{char_len, contains_any, is_hangul};

/// How far down the receipt the positional phases look.
const SCAN_LINES: usize = 25;
/// At most this many following lines are merged into a candidate.
const MAX_MERGE_LINES: usize = 2;

re!(re_component, r"[시구군동로길읍면리]|번지");
re!(re_digits_only, r"^[\d\-\s()]+$");
re!(re_meta_split, r"\s*(?:TEL|Tel|tel|전화|T\.|대표)");
re!(re_merge_stop, r"\d{4}[-/.]\d{1,2}[-/.]\d{1,2}|P0S|POS|BILL|테이블번호|주문담당자|레이블번호");
re!(re_merge_component, r"[동로길읍면리층호]|번지|\d+층|[(,]\w+\)");
re!(re_city_district, r"[가-힣]+시\s+[가-힣]+[구군]|[가-힣]+구\s+[가-힣\d]+[동로길]");
re!(re_neighborhood_start, r"^[가-힣]+[동로길]\s+[\d가-힣]");
re!(re_digit, r"\d");

re!(re_after_date, r"\s+\d{4}[-/.]\d{1,2}[-/.]\d{1,2}.*");
re!(re_after_korean_date, r"\s+\d{4}년\s*\d{1,2}월.*");
re!(re_after_pos, r"(?i)\s+(P0S|POS|BILL)[:：]?.*");
re!(
    re_after_order_meta,
    r"\s+(테이블번호|주문담당자|레이블번호|영수번호|판매시간|주문번호|호출기|계산일자|카드종|개월할부|할부).*"
);
re!(re_after_direction, r"\s+(왼쪽|오른쪽|앞|뒤)\b.*$");
re!(re_after_representative, r"\s+(대표|사업자번호|TEL|Tel|전화|T\.).*$");
re!(re_repeat_after_paren, r"(\([가-힣]+(동|구|읍|면|리)\))\s+[가-힣]+$");
re!(re_ws_run, r"\s+");

/// Extract the store address, or `None` when no phase yields a valid one.
pub fn extract_address(texts: &[&str]) -> Option<String> {
    // Phase 1: explicit address labels (OCR misreadings included).
    for (i, text) in texts.iter().enumerate() {
        for (pattern, reject_hangul_before) in address_label_patterns() {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            if *reject_hangul_before {
                // The truncated "…소:" label form must start a word, not sit
                // inside one — the original grammar used a look-behind here.
                let whole = caps.get(0).map(|m| m.start()).unwrap_or(0);
                if text[..whole].chars().last().is_some_and(is_hangul) {
                    continue;
                }
            }
            let raw = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            let addr = clean_and_merge(raw, &texts[i + 1..]);
            if is_valid_address(&addr) {
                return Some(addr);
            }
        }
    }

    // Phase 2: lines starting with a province/metropolitan-city name.
    for (i, text) in texts.iter().take(SCAN_LINES).enumerate() {
        let t = text.trim();
        if SIDO_NAMES.iter().any(|sido| t.starts_with(sido)) && re_component().is_match(t) {
            let addr = clean_and_merge(t, &texts[i + 1..]);
            if is_valid_address(&addr) {
                return Some(addr);
            }
        }
    }

    // Phase 3: an embedded city/district shape; anything before the match
    // (registration numbers and similar garbage) is discarded.
    for (i, text) in texts.iter().take(SCAN_LINES).enumerate() {
        let t = text.trim();
        if let Some(m) = re_city_district().find(t) {
            let addr = clean_and_merge(&t[m.start()..], &texts[i + 1..]);
            if is_valid_address(&addr)
                && !contains_any(&addr, &["사업자", "등록번호", "대표자", "TEL"])
            {
                return Some(addr);
            }
        }
    }

    // Phase 4: a neighborhood/street token followed by a number. Loosest
    // form, so the candidate must be long and carry a digit.
    for (i, text) in texts.iter().take(SCAN_LINES).enumerate() {
        let t = text.trim();
        if re_neighborhood_start().is_match(t) {
            let addr = clean_and_merge(t, &texts[i + 1..]);
            if is_valid_address(&addr) && char_len(&addr) >= 10 && re_digit().is_match(&addr) {
                return Some(addr);
            }
        }
    }

    None
}

/// Strip trailing contact metadata, then absorb continuation lines.
fn clean_and_merge(addr: &str, following: &[&str]) -> String {
    let mut addr = re_meta_split().split(addr).next().unwrap_or("").trim().to_string();

    for next in following.iter().take(MAX_MERGE_LINES) {
        let next = next.trim();
        // Date / POS / order metadata restarts the receipt body.
        if re_merge_stop().is_match(next) {
            break;
        }
        if re_merge_component().is_match(next) {
            if !contains_any(next, &["TEL", "전화", "대표", "사업자", "등록", "TID"]) {
                let cleaned = re_meta_split().split(next).next().unwrap_or("").trim();
                addr.push(' ');
                addr.push_str(cleaned);
            }
        } else {
            break;
        }
    }

    clean_address(&addr)
}

fn is_valid_address(addr: &str) -> bool {
    if char_len(addr) < 5 {
        return false;
    }
    if !re_component().is_match(addr) {
        return false;
    }
    if addr.chars().filter(|c| *c != ' ').count() < 5 {
        return false;
    }
    // A bare phone number is not an address.
    if re_digits_only().is_match(addr) {
        return false;
    }
    true
}

/// Trailing-metadata removal, parenthesis repair, and the fixed table of
/// known place-name misreadings.
fn clean_address(addr: &str) -> String {
    let mut s = re_after_date().replace(addr, "").into_owned();
    s = re_after_korean_date().replace(&s, "").into_owned();
    s = re_after_pos().replace(&s, "").into_owned();
    s = re_after_order_meta().replace(&s, "").into_owned();
    s = re_after_direction().replace(&s, "").into_owned();
    s = re_after_representative().replace(&s, "").trim().to_string();

    s = s.trim_end_matches(['.', ',', ';', ':', '(']).to_string();

    // Unbalanced parenthesis: drop a stub parenthetical, close a real one.
    if s.matches('(').count() > s.matches(')').count() {
        if let Some(last_open) = s.rfind('(') {
            let content_after = &s[last_open + 1..];
            if char_len(content_after) <= 3 {
                s.truncate(last_open);
                s = s.trim_end_matches([' ', ',']).to_string();
            } else {
                s.push(')');
            }
        }
    }

    // Repeated garbage after a closing district parenthetical.
    s = re_repeat_after_paren().replace(&s, "$1").into_owned();
    s = re_ws_run().replace_all(&s, " ").into_owned();

    for (wrong, right) in PLACE_NAME_FIXES {
        s = s.replace(wrong, right);
    }

    s = s.replace(['\'', '`', '_'], " ");
    s = re_ws_run().replace_all(&s, " ").into_owned();
    s.trim().to_string()
}
