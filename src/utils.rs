use chrono::{DateTime, Datelike, SecondsFormat, Utc};

/// Escapes the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// `2024-01-01T00:00:00.000Z`; years outside 0..=9999 use the signed six-digit
/// expanded form, `+010000-01-01T00:00:00.000Z`.
pub fn format_iso_timestamp(instant: &DateTime<Utc>) -> String {
    let year = instant.year();
    if (0..=9999).contains(&year) {
        return instant.to_rfc3339_opts(SecondsFormat::Millis, true);
    }

    let sign = if year < 0 { '-' } else { '+' };
    format!(
        "{}{:06}-{}",
        sign,
        year.unsigned_abs(),
        instant.format("%m-%dT%H:%M:%S%.3fZ")
    )
}
