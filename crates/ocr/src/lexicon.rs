//! Fixed keyword and pattern tables used by the extractors.
//!
//! These are configuration data, not control flow: ordered slices that the
//! extractor engines scan first-match-wins. Extending coverage for a new
//! receipt format means appending here, not editing the extractors.

use regex::Regex;
use std::sync::OnceLock;

/// Date-context labels, highest priority first.
pub const DATE_CONTEXT_KEYWORDS: &[&str] = &[
    "거래일시", "거래일", "계산일자", "발행일시", "승인일시", "결제일시",
    "판매일자", "판매시간", "일시", "일자", "날짜",
];

/// General total/settlement labels (includes common OCR garbles).
pub const TOTAL_KEYWORDS: &[&str] = &[
    "합계", "합제", "총액", "총합", "결제금액", "총결제",
    "카드결제", "total", "Total", "TOTAL",
];

/// Final-settlement labels, preferred over the general totals.
pub const TOTAL_PRIORITY_KEYWORDS: &[&str] = &[
    "카드결제", "결제금액", "총결제", "총결제금액",
];

/// Tax qualifiers that demote a total keyword to a sub-total line.
pub const TAX_QUALIFIER_KEYWORDS: &[&str] = &["과세", "면세"];

/// Lines containing any of these are never line items.
pub const SKIP_KEYWORDS: &[&str] = &[
    // receipt metadata
    "사업자", "대표", "전화", "주소", "승인번호", "카드번호",
    "거래일시", "거래번호", "단말기", "가맹점", "캐셔",
    "직원:", "POS", "BILL",
    // tax / subtotal rows
    "소계", "부가세", "가세", "가액",
    "매출", "세액", "판매계", "판매금",
    "과세물품", "면세물품", "포함됨", "포함된",
    "상품가격",
    // payment rows
    "결제액", "결제금", "잔여", "거스름", "할인액", "할인일",
    "신용카드", "카드결제", "DV(", "비씨", "BeV",
    "결제수단", "결제내역", "결제대상",
    // membership / points
    "회원", "포인트", "적립", "마일리지",
    // other non-item rows
    "승인VAN", "일시불", "환불", "교환", "지참",
    "담당", "계산담당", "수량", "금액", "단가", "상품명", "상품코드",
    "주문번호",
    "봉사료", "CATID", "캐셔No", "승인",
    "영수증", "바코드", "SCO:",
    "여신", "금융", "협회",
    "일회용", "비널봉투",
    // discount / delivery rows
    "할인 내역", "배달비", "주문금액",
    "구매수량",
    "부가세율",
    "제휴할인", "제휴카드", "매출전표",
    "행사할인",
    "결제방식", "원산지",
    // receipt-number rows (OCR garbles included)
    "영수",
    // OCR garbles of total/amount labels
    "글액", "급액",
    "받은돈", "거스름돈", "공급대가",
    "KOCES", "KSNET",
    "공급가", "급가",
    // menu option rows
    "선택안함",
    // OCR garbles of subtotal / VAT / purchase-total labels
    "손계", "구매액", "부가",
];

/// Lines containing any of these are never the store name.
pub const STORE_SKIP_KEYWORDS: &[&str] = &[
    "사업자", "등록번호", "대표", "전화", "주소", "TEL",
    "픽업번호", "주문번호", "주문변호", "거래",
    "영수", "고객", "재발행", "대기번호", "매장식사",
    "소비자중심경영", "인증기업", "CCM",
    "제품명", "교환", "환불",
    "판매시간", "POS", "P0S",
];

/// Metadata words that disqualify a top-of-receipt line as a store name.
pub const STORE_META_KEYWORDS: &[&str] = &[
    "신용", "전표", "카드", "FOOD", "MARKET",
    "유형", "여신", "금융", "협회", "KOCES",
    "메뉴", "수량",
];

/// Province/metropolitan-city names an address may start with.
pub const SIDO_NAMES: &[&str] = &[
    "서울", "부산", "대구", "인천", "광주", "대전", "울산", "세종",
    "경기", "강원", "충북", "충남", "전북", "전남", "경북", "경남", "제주",
    "서울특별시", "부산광역시", "대구광역시", "인천광역시", "광주광역시",
    "대전광역시", "울산광역시", "세종특별자치시", "경기도", "강원도",
    "충청북도", "충청남도", "전라북도", "전라남도", "경상북도", "경상남도",
    "제주특별자치도",
];

/// Known OCR misreadings of place names, applied verbatim after cleanup.
pub const PLACE_NAME_FIXES: &[(&str, &str)] = &[
    ("서올", "서울"),
    ("서을", "서울"),
    ("서물", "서울"),
    ("감남구", "강남구"),
    ("선름로", "선릉로"),
    ("선롱로", "선릉로"),
    ("테혜란로", "테헤란로"),
    ("발천구덕", "금천구"),
    ("금천구덕", "금천구"),
];

/// Store-name label forms, tried in order over the whole receipt.
const STORE_LABEL_PATTERNS: &[&str] = &[
    r"매\s*장\s*명?\s*[:：\[\]]\s*(.+)",
    r"\[매장명\]\s*(.+)",
    r"상\s*호\s*명?\s*[:：]\s*(.+)",
    r"주문\s*매장\s*[:：]\s*(.+)",
    r#"점\s*포\s*['"]?\s*명?\s*[:：]\s*(.+)"#,
];

pub fn store_label_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| compile_all(STORE_LABEL_PATTERNS))
}

/// Address-label forms, OCR misreadings included. The second member marks
/// patterns whose match must not be preceded by a Hangul syllable (the
/// truncated "…소:" form would otherwise fire inside unrelated words).
const ADDRESS_LABEL_PATTERNS: &[(&str, bool)] = &[
    (r"주\s*소\s*[:：]\s*(.+)", false),
    (r"\[주\s*소\]\s*(.+)", false),
    (r"주[\s\-]+소\s*[:：\s]\s*(.+)", false),
    (r"추\s*도?\s*소\s*[:：]\s*(.+)", false),
    (r"주\s*조\s*[:：]\s*(.+)", false),
    (r"주\s*소\s+([가-힣\d].{3,})", false),
    (r"소\s*[:：]\s*([가-힣][가-힣\d\s,\-]{4,})", true),
];

pub fn address_label_patterns() -> &'static [(Regex, bool)] {
    static PATTERNS: OnceLock<Vec<(Regex, bool)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        ADDRESS_LABEL_PATTERNS
            .iter()
            .map(|(pat, flag)| (compile(pat), *flag))
            .collect()
    })
}

/// Date(+time) forms, most specific first. Group 1 is the date; group 2 is
/// the time, possibly empty.
const DATE_PATTERNS: &[&str] = &[
    // "2026/01/12(월) 12:44" — weekday parenthetical between date and time
    r"(\d{4}[-/.]\d{1,2}[-/.]\d{1,2})\([월화수목금토일]+\)\s*(\d{1,2}:\d{2})",
    // "2024/11/17/17:23" — slash-joined date and time
    r"(\d{4}[-/.]\d{1,2}[-/.]\d{1,2})/(\d{1,2}:\d{2})",
    // "2025-10-03 16:47"
    r"(\d{4}[-/.]\d{1,2}[-/.]\d{1,2})\s+(\d{1,2}:\d{2})",
    // "2025-10-0316:47" — time fused onto the date
    r"(\d{4}[-/.]\d{1,2}[-/.]\d{1,2})(\d{2}:\d{2})",
    // "25/09/21 15:47" — 2-digit year
    r"(\d{2}[-/.]\d{1,2}[-/.]\d{1,2})\s+(\d{1,2}:\d{2})",
    // "25/09/2115:47"
    r"(\d{2}[-/.]\d{1,2}[-/.]\d{1,2})(\d{2}:\d{2})",
    // date only, 4-digit year
    r"(\d{4}[-/.]\d{1,2}[-/.]\d{1,2})()",
    // date only, 2-digit year
    r"(\d{2}[-/.]\d{1,2}[-/.]\d{1,2})()",
];

pub fn date_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| compile_all(DATE_PATTERNS))
}

fn compile(pat: &str) -> Regex {
    Regex::new(pat).expect("invalid lexicon regex")
}

fn compile_all(pats: &[&str]) -> Vec<Regex> {
    pats.iter().map(|p| compile(p)).collect()
}
