//! Date helper functions

use chrono::{DateTime, Locale, Utc};
use chrono_tz::Tz;

use crate::config::SiteConfig;
use crate::error::{Error, Result};

/// How publication dates are displayed
#[derive(Debug, Clone)]
pub struct DateStyle {
    format: String,
    locale: Locale,
    timezone: Tz,
}

impl DateStyle {
    /// Build a date style from a Moment.js format, a locale (`en_US`) and a
    /// timezone name (`America/Sao_Paulo`)
    pub fn new(format: &str, locale: &str, timezone: &str) -> Result<Self> {
        let locale = Locale::try_from(locale)
            .map_err(|_| Error::Config(format!("unknown locale: {}", locale)))?;
        let timezone: Tz = timezone
            .parse()
            .map_err(|e| Error::Config(format!("unknown timezone {}: {}", timezone, e)))?;

        Ok(Self {
            format: moment_to_chrono_format(format),
            locale,
            timezone,
        })
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        Self::new(&config.date_format, &config.language, &config.timezone)
    }
}

impl Default for DateStyle {
    fn default() -> Self {
        Self {
            format: moment_to_chrono_format("DD MMM YYYY"),
            locale: Locale::en_US,
            timezone: Tz::UTC,
        }
    }
}

/// Format a publication date for display
///
/// Every listing entry (first page or loaded later) and every detail page goes
/// through here. A missing date renders as an empty string.
///
/// # Examples
/// ```ignore
/// format_publication_date(Some(&date), &DateStyle::default()) // -> "19 Mar 2021"
/// ```
pub fn format_publication_date(date: Option<&DateTime<Utc>>, style: &DateStyle) -> String {
    match date {
        Some(date) => date
            .with_timezone(&style.timezone)
            .format_localized(&style.format, style.locale)
            .to_string(),
        None => String::new(),
    }
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}

/// Moment.js tokens understood in `date_format`, longest first per letter
const MOMENT_TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("DD", "%d"),
    ("dddd", "%A"),
    ("ddd", "%a"),
    ("HH", "%H"),
    ("mm", "%M"),
    ("ss", "%S"),
];

/// Convert Moment.js format to chrono format
///
/// The format is scanned once from the left. Text in `[brackets]` is copied
/// as is, like Moment.js does; anything that is not a token passes through.
fn moment_to_chrono_format(format: &str) -> String {
    let mut result = String::with_capacity(format.len() * 2);
    let mut rest = format;

    while let Some(c) = rest.chars().next() {
        if c == '[' {
            if let Some(end) = rest.find(']') {
                push_literal(&mut result, &rest[1..end]);
                rest = &rest[end + 1..];
                continue;
            }
        }

        if let Some((token, chrono)) = MOMENT_TOKENS.iter().find(|(t, _)| rest.starts_with(t)) {
            result.push_str(chrono);
            rest = &rest[token.len()..];
        } else {
            push_literal(&mut result, &rest[..c.len_utf8()]);
            rest = &rest[c.len_utf8()..];
        }
    }

    result
}

fn push_literal(out: &mut String, text: &str) {
    out.push_str(&text.replace('%', "%%"));
}
