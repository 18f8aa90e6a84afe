//! Formatting helpers shared by the renderers.

use chrono::{DateTime, Utc};
use sc_common::{Audit, ScoreDisplayMode};
use url::Url;

/// Minimum score rated as passing.
pub const PASS_THRESHOLD: f64 = 0.9;
/// Minimum score rated as average.
pub const AVERAGE_THRESHOLD: f64 = 0.5;

/// Text shown where a score is not available.
pub const NOT_APPLICABLE_SCORE: &str = "N/A";

const NBSP: char = '\u{a0}';
const MAX_DISPLAY_NAME_CHARS: usize = 64;

/// Score bucket used for color classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Pass,
    Average,
    Fail,
    Error,
    NotApplicable,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Pass => "pass",
            Rating::Average => "average",
            Rating::Fail => "fail",
            Rating::Error => "error",
            Rating::NotApplicable => "na",
        }
    }
}

/// Rate a category-style score.
pub fn calculate_rating(score: Option<f64>) -> Rating {
    match score {
        Some(s) if !s.is_finite() => Rating::Error,
        Some(s) if s >= PASS_THRESHOLD => Rating::Pass,
        Some(s) if s >= AVERAGE_THRESHOLD => Rating::Average,
        Some(_) => Rating::Fail,
        None => Rating::NotApplicable,
    }
}

/// Rate an audit, taking its display mode into account.
pub fn audit_rating(audit: &Audit) -> Rating {
    match audit.score_display_mode {
        ScoreDisplayMode::Error | ScoreDisplayMode::Unknown => Rating::Error,
        ScoreDisplayMode::NotApplicable
        | ScoreDisplayMode::Informative
        | ScoreDisplayMode::Manual => Rating::NotApplicable,
        ScoreDisplayMode::Binary => match audit.score {
            Some(s) if s >= 1.0 => Rating::Pass,
            Some(_) => Rating::Fail,
            None => Rating::Error,
        },
        ScoreDisplayMode::Numeric => calculate_rating(audit.score),
    }
}

/// Whether an audit belongs in a "passed" section.
pub fn show_as_passed(audit: &Audit) -> bool {
    audit.score_display_mode == ScoreDisplayMode::NotApplicable
        || audit.score.is_some_and(|s| s >= PASS_THRESHOLD)
}

/// `round(score * 100)`.
pub fn score_percent(score: f64) -> i64 {
    (score * 100.0).round() as i64
}

/// Score as displayed in gauges and the nav.
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) if s.is_finite() => score_percent(s).to_string(),
        _ => NOT_APPLICABLE_SCORE.to_string(),
    }
}

/// Round `value` to `granularity` and group thousands with commas.
pub fn format_number(value: f64, granularity: f64) -> String {
    let granularity = if granularity > 0.0 { granularity } else { 1.0 };
    let rounded = (value / granularity).round() * granularity;
    let decimals = if granularity >= 1.0 {
        0
    } else {
        (-granularity.log10()).ceil() as usize
    };
    let formatted = format!("{:.*}", decimals, rounded.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::new();
    if rounded < 0.0 {
        out.push('-');
    }
    let digits = int_part.len();
    for (index, digit) in int_part.chars().enumerate() {
        if index > 0 && (digits - index) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// `1,230 ms`, rounded to `granularity` (default 10).
pub fn format_milliseconds(ms: f64, granularity: Option<f64>) -> String {
    format!("{}{NBSP}ms", format_number(ms, granularity.unwrap_or(10.0)))
}

/// Milliseconds shown as seconds, `1.2 s`.
pub fn format_seconds(ms: f64, granularity: Option<f64>) -> String {
    format!("{}{NBSP}s", format_number(ms / 1000.0, granularity.unwrap_or(0.1)))
}

/// Bytes shown as kibibytes, `12.3 KB`.
pub fn format_bytes_to_kb(bytes: f64, granularity: Option<f64>) -> String {
    format!("{}{NBSP}KB", format_number(bytes / 1024.0, granularity.unwrap_or(0.1)))
}

/// Report timestamp, e.g. `Oct 19, 2026, 3:04 PM UTC`.
pub fn format_date_time(time: &DateTime<Utc>) -> String {
    time.format("%b %-d, %Y, %-I:%M %p UTC").to_string()
}

/// Export filename prefix: `<host>_<YYYY-MM-DD_HH-MM-SS>`.
pub fn filename_prefix(final_url: &str, time: &DateTime<Utc>) -> String {
    let host = parse_url(final_url)
        .map(|parts| parts.hostname)
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| "report".to_string());
    let host: String = host
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("{}_{}", host, time.format("%Y-%m-%d_%H-%M-%S"))
}

/// Pieces of a URL used for compact display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// `scheme://host[:port]`.
    pub origin: String,
    pub hostname: String,
    /// Path plus query, elided when long.
    pub file: String,
}

/// Split an absolute URL for display. Returns `None` for unparseable URLs
/// and for URLs without a host, such as `data:` and `about:` URLs.
pub fn parse_url(raw: &str) -> Option<UrlParts> {
    let url = Url::parse(raw).ok()?;
    let hostname = url.host_str()?.to_string();
    let file = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };
    Some(UrlParts {
        origin: url.origin().ascii_serialization(),
        hostname,
        file: elide(&file, MAX_DISPLAY_NAME_CHARS),
    })
}

fn elide(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('\u{2026}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn audit(mode: ScoreDisplayMode, score: Option<f64>) -> Audit {
        Audit {
            id: "a".into(),
            title: "A".into(),
            description: String::new(),
            score,
            score_display_mode: mode,
            display_value: None,
            numeric_value: None,
            group: None,
            error_message: None,
            warnings: vec![],
            details: None,
            extra: Default::default(),
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234.5, 1.0), "1,235");
        assert_eq!(format_number(1234567.0, 1.0), "1,234,567");
        assert_eq!(format_number(999.0, 1.0), "999");
        assert_eq!(format_number(12.345, 0.1), "12.3");
        assert_eq!(format_number(-1500.0, 10.0), "-1,500");
        assert_eq!(format_number(0.04, 0.1), "0.0");
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_milliseconds(1234.0, None), "1,230\u{a0}ms");
        assert_eq!(format_seconds(1234.0, None), "1.2\u{a0}s");
        assert_eq!(format_bytes_to_kb(12_595.0, None), "12.3\u{a0}KB");
        assert_eq!(format_bytes_to_kb(2048.0, Some(1.0)), "2\u{a0}KB");
    }

    #[test]
    fn test_format_date_time() {
        let time = Utc.with_ymd_and_hms(2026, 10, 19, 15, 4, 5).unwrap();
        assert_eq!(format_date_time(&time), "Oct 19, 2026, 3:04 PM UTC");
    }

    #[test]
    fn test_ratings() {
        assert_eq!(calculate_rating(Some(0.95)), Rating::Pass);
        assert_eq!(calculate_rating(Some(0.9)), Rating::Pass);
        assert_eq!(calculate_rating(Some(0.5)), Rating::Average);
        assert_eq!(calculate_rating(Some(0.49)), Rating::Fail);
        assert_eq!(calculate_rating(None), Rating::NotApplicable);
        assert_eq!(calculate_rating(Some(f64::NAN)), Rating::Error);

        assert_eq!(audit_rating(&audit(ScoreDisplayMode::Binary, Some(1.0))), Rating::Pass);
        assert_eq!(audit_rating(&audit(ScoreDisplayMode::Binary, Some(0.0))), Rating::Fail);
        assert_eq!(audit_rating(&audit(ScoreDisplayMode::Error, None)), Rating::Error);
        assert_eq!(audit_rating(&audit(ScoreDisplayMode::Unknown, Some(1.0))), Rating::Error);
        assert_eq!(
            audit_rating(&audit(ScoreDisplayMode::Informative, None)).as_str(),
            "na"
        );
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(Some(0.876)), "88");
        assert_eq!(format_score(Some(1.0)), "100");
        assert_eq!(format_score(None), "N/A");
        assert_eq!(format_score(Some(f64::INFINITY)), "N/A");
    }

    #[test]
    fn test_show_as_passed() {
        assert!(show_as_passed(&audit(ScoreDisplayMode::Numeric, Some(0.95))));
        assert!(show_as_passed(&audit(ScoreDisplayMode::NotApplicable, None)));
        assert!(!show_as_passed(&audit(ScoreDisplayMode::Numeric, Some(0.3))));
    }

    #[test]
    fn test_parse_url() {
        let parts = parse_url("https://Example.com:8080/path/app.js?v=2#frag").unwrap();
        assert_eq!(parts.origin, "https://example.com:8080");
        assert_eq!(parts.hostname, "example.com");
        assert_eq!(parts.file, "/path/app.js?v=2");

        let root = parse_url("https://example.com").unwrap();
        assert_eq!(root.file, "/");

        let backslashes = parse_url(r"https://example.com\path\app.js").unwrap();
        assert_eq!(backslashes.hostname, "example.com");
        assert_eq!(backslashes.file, "/path/app.js");

        let credentials = parse_url("https://user:pw@cdn.example.com/lib.js").unwrap();
        assert_eq!(credentials.hostname, "cdn.example.com");
        assert_eq!(credentials.origin, "https://cdn.example.com");

        assert!(parse_url("data:image/png;base64,AAAA").is_none());
        assert!(parse_url("not a url").is_none());

        let long = format!("https://example.com/{}", "a".repeat(100));
        let parts = parse_url(&long).unwrap();
        assert_eq!(parts.file.chars().count(), 64);
        assert!(parts.file.ends_with('\u{2026}'));
    }

    #[test]
    fn test_filename_prefix() {
        let time = Utc.with_ymd_and_hms(2026, 10, 19, 15, 4, 5).unwrap();
        assert_eq!(
            filename_prefix("https://www.example.com/page", &time),
            "www.example.com_2026-10-19_15-04-05"
        );
        assert_eq!(filename_prefix("about:blank", &time), "report_2026-10-19_15-04-05");
    }
}
