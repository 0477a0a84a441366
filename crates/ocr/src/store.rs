//! Store-name extraction.
//!
//! Phase 1 trusts an explicit label anywhere on the receipt ("매장명:",
//! "상호:", bracketed and OCR-garbled variants). Phase 2 falls back to the
//! first plausible line among the top ten, after rejecting everything that
//! is recognizably metadata, an address, or a price row.

use crate::lexicon::{store_label_patterns, SIDO_NAMES, STORE_META_KEYWORDS, STORE_SKIP_KEYWORDS};
use crate::text::{char_len, collapse_spaces, contains_any};

/// Top-of-receipt window scanned by the phase-2 heuristic.
const HEADER_LINES: usize = 10;

re!(re_numeric_only, r"^[\d\s:/.,()\-]+$");
re!(re_phone_digits, r"^[\d\-()]{7,}$");
re!(re_phone_prefix, r"^0\d{1,2}[-\s]\d{3,4}[-\s]\d{4}");
re!(re_biz_number_start, r"^\d{3}-\d{2}-\d{5}");
re!(re_hotline, r"^1\d{3}[-\s]?\d{4}");
re!(re_address_shape, r"[시구군]\s+\S+[로길동]|[시구군]\s+\d+[로길동]");
re!(re_address_tail, r"[구군]\S*[로길동읍면]|[동로길]\d");
re!(re_floor_only, r"^B?\d+층\s*$");
re!(re_price_suffix, r"\d+,\d{3}\s*$");
re!(re_pos_garble, r"P[oO0][sS]");
re!(re_label_meta_split, r"\s+TEL|전화|T\.|TID");
re!(re_heuristic_meta_split, r"\s+TID|TID:|전화|TEL|T\.");
re!(re_hash_prefix, r"^#\d+\s*");
re!(re_chain_prefix, r"^직영\s*");
re!(re_biz_suffix, r"\s*/?\d{3}-\d{2}-\d{5}(/.*)?$");
re!(re_receipt_no_suffix, r"\s*영수증\s*번호\s*[:：].*$");
re!(re_slash_digits_suffix, r"/\d{8,}(/.*)?$");

/// Extract the store name, or `None` when nothing survives either phase.
pub fn extract_store_name(texts: &[&str]) -> Option<String> {
    // Phase 1: explicit label anywhere on the receipt.
    for text in texts {
        for pattern in store_label_patterns() {
            if let Some(caps) = pattern.captures(text) {
                let raw = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
                let name = re_label_meta_split()
                    .split(raw)
                    .next()
                    .unwrap_or("")
                    .trim();
                let cleaned = clean_store(name);
                if char_len(&cleaned) >= 2 {
                    return Some(cleaned);
                }
            }
        }
    }

    // Phase 2: first plausible header line.
    for text in texts.iter().take(HEADER_LINES) {
        let text = text.trim();
        if re_numeric_only().is_match(text) || char_len(text) < 2 {
            continue;
        }
        let collapsed = collapse_spaces(text);
        if collapsed.contains("영수") {
            continue;
        }
        if contains_any(&collapsed, &["합계", "총합", "부가세"]) {
            continue;
        }
        if contains_any(text, STORE_SKIP_KEYWORDS) {
            continue;
        }
        let spaceless: String = text.chars().filter(|c| *c != ' ').collect();
        if re_phone_digits().is_match(&spaceless) {
            continue;
        }
        if re_phone_prefix().is_match(text) {
            continue;
        }
        if re_biz_number_start().is_match(&spaceless) {
            continue;
        }
        if re_hotline().is_match(&spaceless) {
            continue;
        }
        if re_address_shape().is_match(text) {
            continue;
        }
        if SIDO_NAMES.iter().any(|sido| spaceless.starts_with(sido))
            && re_address_tail().is_match(&spaceless)
        {
            continue;
        }
        if re_floor_only().is_match(text) {
            continue;
        }
        if re_price_suffix().is_match(text) {
            continue;
        }
        if re_pos_garble().is_match(text) {
            continue;
        }
        if contains_any(text, STORE_META_KEYWORDS) {
            continue;
        }

        let candidate = re_heuristic_meta_split()
            .split(text)
            .next()
            .unwrap_or("")
            .trim();
        let cleaned = clean_store(candidate);
        if char_len(&cleaned) >= 2 {
            return Some(cleaned);
        }
    }

    None
}

/// Strip bracket/prefix decoration and trailing registration metadata.
fn clean_store(name: &str) -> String {
    let mut s = name.trim_matches(['[', ']']).to_string();
    s = re_hash_prefix().replace(&s, "").into_owned();
    s = re_chain_prefix().replace(&s, "").into_owned();
    s = s.trim_matches(['"', '\'', '\\']).to_string();
    s = re_biz_suffix().replace(&s, "").into_owned();
    s = re_receipt_no_suffix().replace(&s, "").into_owned();
    s = re_slash_digits_suffix().replace(&s, "").into_owned();
    s.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_wins_over_earlier_heuristic_candidate() {
        // The heuristic would pick the first line; the explicit label
        // further down must win anyway.
        let texts = ["어울림마트", "매장명: 스타벅스 선릉점"];
        assert_eq!(extract_store_name(&texts).unwrap(), "스타벅스 선릉점");
    }

    #[test]
    fn label_value_drops_trailing_phone_metadata() {
        let texts = ["상호: 공차 강남역점 TEL 02-555-0123"];
        assert_eq!(extract_store_name(&texts).unwrap(), "공차 강남역점");
    }

    #[test]
    fn spaced_label_still_matches() {
        let texts = ["매 장 명: 이디야커피"];
        assert_eq!(extract_store_name(&texts).unwrap(), "이디야커피");
    }

    #[test]
    fn heuristic_skips_receipt_banner_and_phone() {
        let texts = ["영 수 증", "02-201-0700", "온누리약국", "서울 강남구 선릉로 431"];
        assert_eq!(extract_store_name(&texts).unwrap(), "온누리약국");
    }

    #[test]
    fn heuristic_skips_business_registration_and_address() {
        let texts = ["123-45-67890", "서울 강남구 테헤란로 123", "김밥천국 역삼점"];
        assert_eq!(extract_store_name(&texts).unwrap(), "김밥천국 역삼점");
    }

    #[test]
    fn heuristic_skips_price_suffixed_item_row() {
        let texts = ["우삼겹 폴케볼 1 9,400", "맘스터치 선릉점"];
        assert_eq!(extract_store_name(&texts).unwrap(), "맘스터치 선릉점");
    }

    #[test]
    fn clean_store_strips_registration_suffixes() {
        assert_eq!(clean_store("커피빈 /238-85-00709"), "커피빈");
        assert_eq!(clean_store("분식왕/6055800636/허지은"), "분식왕");
        assert_eq!(clean_store("#12 본죽"), "본죽");
        assert_eq!(clean_store("직영 올리브영"), "올리브영");
        assert_eq!(clean_store("[메가커피]"), "메가커피");
    }

    #[test]
    fn nothing_recoverable_returns_none() {
        let texts = ["02-555-1234", "123-45-67890", "POS 01"];
        assert_eq!(extract_store_name(&texts), None);
    }

    #[test]
    fn floor_marker_is_not_a_store() {
        let texts = ["B1층", "롯데리아 잠실점"];
        assert_eq!(extract_store_name(&texts).unwrap(), "롯데리아 잠실점");
    }
}
