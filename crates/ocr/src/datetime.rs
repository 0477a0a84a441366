//! Transaction date/time extraction.
//!
//! Order of attack: the fused `YYYYMMDD.HH:MM` form, then lines carrying a
//! date-context label, then a general sweep over every line. A date found
//! without a time triggers a search of the neighboring lines for a
//! detached time expression (labeled, bracketed, standalone, or Korean
//! AM/PM). The result is normalized to `YYYY-MM-DD[ HH:MM]`; when final
//! structured parsing fails, the cleaned raw string is returned as-is.

use chrono::{NaiveDate, NaiveDateTime};

use crate::lexicon::{date_patterns, DATE_CONTEXT_KEYWORDS};
use crate::text::{collapse_spaces, contains_any};

re!(re_compact_datetime, r"(\d{4})(\d{2})(\d{2})\.(\d{1,2}:\d{2})");
re!(re_ampm_time, r"(오전|오후)\s*(\d{1,2}):(\d{2})");
re!(re_time_label, r"시간\s*[:：]\s*(\d{1,2}:\d{2})");
re!(re_time_label_ampm, r"시간\s*[:：]\s*(오전|오후)\s*(\d{1,2}):(\d{2})");
re!(re_bracket_time, r"[\[<]\s*(\d{1,2}:\d{2})\s*[\]>]");
re!(re_standalone_time, r"^\s*(\d{1,2}:\d{2}(:\d{2})?)\s*$");

/// Extract and normalize the receipt date, or `None` when nothing matches.
pub fn extract_date(texts: &[&str]) -> Option<String> {
    // Separator-less 8-digit date glued to a time, e.g. "20251001.18:49:58".
    for text in texts {
        if let Some(caps) = re_compact_datetime().captures(text) {
            let date = format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]);
            if is_valid_date(&date) {
                return Some(normalize_date(&date, &caps[4]));
            }
        }
    }

    // Lines with an explicit date-context label get first claim.
    for (i, text) in texts.iter().enumerate() {
        let collapsed = collapse_spaces(text);
        if !contains_any(&collapsed, DATE_CONTEXT_KEYWORDS) {
            continue;
        }

        let mut found_date: Option<String> = None;
        for pattern in date_patterns() {
            if let Some(caps) = pattern.captures(text) {
                let date = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let time = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                if is_valid_date(date) {
                    if !time.is_empty() {
                        return Some(normalize_date(date, time));
                    }
                    found_date = Some(date.to_string());
                    break;
                }
            }
        }

        if let Some(date) = found_date {
            let mut found_time = re_ampm_time().captures(text).map(|c| parse_ampm(&c));
            if found_time.is_none() {
                // "계산일자:2024-11-10 시간:13:49" keeps both on one line.
                found_time = re_time_label().captures(text).map(|c| c[1].to_string());
            }
            if found_time.is_none() {
                found_time = search_time_nearby(texts, i);
            }
            return Some(normalize_date(&date, &found_time.unwrap_or_default()));
        }
    }

    // General sweep: any date pattern anywhere, skipping registration lines.
    let mut found_date: Option<String> = None;
    let mut found_time: Option<String> = None;
    for (i, text) in texts.iter().enumerate() {
        if contains_any(text, &["사업자", "등록번호"]) {
            continue;
        }

        for pattern in date_patterns() {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            let date = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let time = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            if !is_valid_date(date) {
                continue;
            }
            if !time.is_empty() {
                return Some(normalize_date(date, time));
            }
            if found_date.is_none() {
                found_date = Some(date.to_string());
                found_time = re_time_label()
                    .captures(text)
                    .map(|c| c[1].to_string())
                    .or_else(|| search_time_nearby(texts, i));
            }
            break;
        }

        if found_date.is_some() && found_time.is_none() {
            // A Korean AM/PM time may sit on its own later line.
            found_time = re_ampm_time().captures(text).map(|c| parse_ampm(&c));
        }
    }

    found_date.map(|d| normalize_date(&d, &found_time.unwrap_or_default()))
}

/// Reject business-registration-style digit runs and impossible dates.
/// 2-digit years are read as 20xx; only 2000–2030 is accepted.
fn is_valid_date(date_str: &str) -> bool {
    let parts: Vec<&str> = date_str.split(['-', '/', '.']).collect();
    if parts.len() != 3 {
        return false;
    }
    let nums: Vec<i64> = match parts.iter().map(|p| p.parse::<i64>()).collect() {
        Ok(v) => v,
        Err(_) => return false,
    };

    let (year, month, day) = if nums[0] >= 1900 {
        (nums[0], nums[1], nums[2])
    } else if nums[0] <= 99 {
        (nums[0] + 2000, nums[1], nums[2])
    } else {
        return false;
    };

    (1..=12).contains(&month) && (1..=31).contains(&day) && (2000..=2030).contains(&year)
}

/// Scan lines around the date (2 before, 4 after) for a detached time.
fn search_time_nearby(texts: &[&str], date_idx: usize) -> Option<String> {
    let start = date_idx.saturating_sub(2);
    let end = (date_idx + 5).min(texts.len());

    for j in start..end {
        if j == date_idx {
            continue;
        }
        let line = texts[j];

        if let Some(caps) = re_time_label().captures(line) {
            return Some(caps[1].to_string());
        }
        if let Some(caps) = re_time_label_ampm().captures(line) {
            return Some(parse_ampm(&caps));
        }
        if let Some(caps) = re_bracket_time().captures(line) {
            if valid_clock(&caps[1]) {
                return Some(caps[1].to_string());
            }
        }
        if let Some(caps) = re_standalone_time().captures(line) {
            let hhmm: String = caps[1].chars().take(5).collect();
            if valid_clock(&hhmm) {
                return Some(hhmm);
            }
        }
    }
    None
}

fn valid_clock(hhmm: &str) -> bool {
    let mut parts = hhmm.splitn(2, ':');
    let h: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(99);
    let m: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(99);
    h <= 23 && m <= 59
}

/// Korean AM/PM capture (period, hour, minute) → 24-hour "H:MM".
fn parse_ampm(caps: &regex::Captures<'_>) -> String {
    let period = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let mut hour: u32 = caps
        .get(2)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    let minute = caps.get(3).map(|m| m.as_str()).unwrap_or("00");
    if period == "오후" && hour < 12 {
        hour += 12;
    } else if period == "오전" && hour == 12 {
        hour = 0;
    }
    format!("{hour}:{minute}")
}

/// Normalize to "YYYY-MM-DD HH:MM" (or "YYYY-MM-DD" without a time).
/// A combination that defeats structured parsing is returned cleaned but
/// otherwise verbatim — a best-effort value beats a discarded one.
fn normalize_date(date_str: &str, time_str: &str) -> String {
    let date = date_str.replace(['/', '.'], "-");
    let mut time: String = time_str.trim().to_string();
    if time.len() > 5 {
        time.truncate(5);
    }

    let combined = if time.is_empty() {
        date.clone()
    } else {
        format!("{date} {time}")
    };

    for fmt in ["%Y-%m-%d %H:%M", "%y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&combined, fmt) {
            return dt.format("%Y-%m-%d %H:%M").to_string();
        }
    }
    for fmt in ["%Y-%m-%d", "%y-%m-%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(&combined, fmt) {
            return d.format("%Y-%m-%d").to_string();
        }
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_equivalent_forms_normalize_identically() {
        for line in [
            "2025-10-03 16:47",
            "2025/10/03 16:47",
            "25-10-03 16:47",
            "20251003.16:47",
        ] {
            assert_eq!(
                extract_date(&[line]).unwrap(),
                "2025-10-03 16:47",
                "input {line}"
            );
        }
    }

    #[test]
    fn date_only_stays_date_only() {
        assert_eq!(extract_date(&["2025-10-03"]).unwrap(), "2025-10-03");
    }

    #[test]
    fn weekday_parenthetical_form() {
        assert_eq!(
            extract_date(&["2026/01/12(월) 12:44"]).unwrap(),
            "2026-01-12 12:44"
        );
    }

    #[test]
    fn slash_joined_time_form() {
        assert_eq!(
            extract_date(&["2024/11/17/17:23"]).unwrap(),
            "2024-11-17 17:23"
        );
    }

    #[test]
    fn fused_time_form() {
        assert_eq!(
            extract_date(&["2025-10-0316:47"]).unwrap(),
            "2025-10-03 16:47"
        );
    }

    #[test]
    fn context_keyword_line_is_preferred() {
        // The registration-adjacent date is later, but carries the label.
        let texts = ["2020-01-01", "거래일시: 2025-09-21 15:47"];
        assert_eq!(extract_date(&texts).unwrap(), "2025-09-21 15:47");
    }

    #[test]
    fn same_line_time_label_is_merged() {
        let texts = ["계산일자:2024-11-10 시간:13:49"];
        assert_eq!(extract_date(&texts).unwrap(), "2024-11-10 13:49");
    }

    #[test]
    fn nearby_standalone_time_is_attached() {
        let texts = ["판매일자: 2025-03-02", "영수증 1234", "14:05:33"];
        assert_eq!(extract_date(&texts).unwrap(), "2025-03-02 14:05");
    }

    #[test]
    fn bracketed_time_is_attached() {
        let texts = ["2025-03-02", "[16:47]"];
        assert_eq!(extract_date(&texts).unwrap(), "2025-03-02 16:47");
    }

    #[test]
    fn korean_pm_time_converts_to_24_hour() {
        let texts = ["거래일시: 2025-10-03", "시간: 오후 4:47"];
        assert_eq!(extract_date(&texts).unwrap(), "2025-10-03 16:47");
    }

    #[test]
    fn korean_midnight_and_noon_edge_cases() {
        let texts = ["2025-10-03", "시간: 오전 12:05"];
        assert_eq!(extract_date(&texts).unwrap(), "2025-10-03 00:05");
        let texts = ["2025-10-03", "시간: 오후 12:30"];
        assert_eq!(extract_date(&texts).unwrap(), "2025-10-03 12:30");
    }

    #[test]
    fn registration_number_is_not_a_date() {
        // "123-45-67890" would pass the loose pattern but fails validation;
        // the registration keyword line is skipped entirely.
        let texts = ["사업자 123-45-67890", "25/09/21 15:47"];
        assert_eq!(extract_date(&texts).unwrap(), "2025-09-21 15:47");
    }

    #[test]
    fn out_of_range_dates_are_rejected() {
        assert_eq!(extract_date(&["1999-10-03"]), None);
        assert_eq!(extract_date(&["2031-01-01"]), None);
        assert_eq!(extract_date(&["2025-13-01"]), None);
        assert_eq!(extract_date(&["2025-12-32"]), None);
    }

    #[test]
    fn no_date_returns_none() {
        assert_eq!(extract_date(&["스타벅스", "아메리카노 4,500"]), None);
    }

    #[test]
    fn validation_helper_handles_two_digit_years() {
        assert!(is_valid_date("25-10-03"));
        assert!(is_valid_date("2025/10/03"));
        assert!(!is_valid_date("123-45-67890"));
        assert!(!is_valid_date("99-10-03")); // 2099 is out of range
    }
}
