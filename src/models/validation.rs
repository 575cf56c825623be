use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value as JsonValue};

use crate::{
    error::RelayError,
    models::notification::{Level, NotificationRequest},
};

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Checks an untrusted body against the notification schema.
///
/// Rules run in a fixed order and the first failure is returned.
pub fn validate_notification_request(body: &JsonValue) -> Result<NotificationRequest, RelayError> {
    let Some(body) = body.as_object() else {
        return Err(RelayError::Validation(
            "Request body is required".to_string(),
        ));
    };

    let service = required_string(body, "service")?;
    let error = required_string(body, "error")?;
    let message = required_string(body, "message")?;

    let level = body
        .get("level")
        .and_then(JsonValue::as_str)
        .and_then(Level::from_label)
        .ok_or_else(|| {
            RelayError::Validation(
                "Field \"level\" is required and must be one of: info, warning, error, critical"
                    .to_string(),
            )
        })?;

    let timestamp = match body.get("timestamp") {
        None | Some(JsonValue::Null) => None,
        Some(value) => {
            if parse_timestamp(value).is_none() {
                return Err(RelayError::Validation(
                    "Field \"timestamp\" must be a valid date string, number, or Date object"
                        .to_string(),
                ));
            }
            Some(value.clone())
        }
    };

    let payload = match body.get("payload") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::Object(map)) => Some(map.clone()),
        Some(_) => {
            return Err(RelayError::Validation(
                "Field \"payload\" must be an object or null".to_string(),
            ));
        }
    };

    Ok(NotificationRequest {
        service,
        error,
        message,
        level,
        timestamp,
        payload,
    })
}

fn required_string(body: &Map<String, JsonValue>, field: &str) -> Result<String, RelayError> {
    match body.get(field) {
        Some(JsonValue::String(value)) if !value.is_empty() => Ok(value.clone()),
        _ => Err(RelayError::Validation(format!(
            "Field \"{}\" is required and must be a string",
            field
        ))),
    }
}

/// Coerces a JSON timestamp into an instant.
///
/// Strings may be RFC 3339, RFC 2822, a bare date or a naive date-time (read as
/// UTC). Numbers are milliseconds since the Unix epoch, truncated, and must fall
/// inside the range `DateTime<Utc>` can represent.
pub fn parse_timestamp(value: &JsonValue) -> Option<DateTime<Utc>> {
    match value {
        JsonValue::String(s) => parse_timestamp_str(s.trim()),
        JsonValue::Number(n) => {
            let millis = match n.as_i64() {
                Some(millis) => millis,
                None => {
                    let millis = n.as_f64()?.trunc();
                    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
                        return None;
                    }
                    millis as i64
                }
            };

            // Limited to chrono's range, roughly +/-262143 years.
            DateTime::from_timestamp_millis(millis)
        }
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::SubsecRound;
    use serde_json::json;

    fn base() -> JsonValue {
        json!({
            "service": "api",
            "error": "e1",
            "message": "failed",
            "level": "critical"
        })
    }

    fn with(field: &str, value: JsonValue) -> JsonValue {
        let mut body = base();
        body[field] = value;
        body
    }

    fn without(field: &str) -> JsonValue {
        let mut body = base();
        body.as_object_mut().unwrap().remove(field);
        body
    }

    fn reason(body: &JsonValue) -> String {
        validate_notification_request(body).unwrap_err().to_string()
    }

    #[test]
    fn accepts_minimal_request() {
        let request = validate_notification_request(&base()).unwrap();

        assert_eq!(request.service, "api");
        assert_eq!(request.error, "e1");
        assert_eq!(request.message, "failed");
        assert_eq!(request.level, Level::Critical);
        assert_eq!(request.timestamp, None);
        assert_eq!(request.payload, None);
    }

    #[test]
    fn rejects_missing_or_non_object_body() {
        for body in [json!(null), json!("text"), json!(42), json!([1, 2])] {
            assert_eq!(reason(&body), "Request body is required");
        }
    }

    #[test]
    fn required_strings_fail_in_order() {
        for field in ["service", "error", "message"] {
            let expected = format!("Field \"{}\" is required and must be a string", field);

            assert_eq!(reason(&without(field)), expected);
            assert_eq!(reason(&with(field, json!(""))), expected);
            assert_eq!(reason(&with(field, json!(0))), expected);
            assert_eq!(reason(&with(field, json!(false))), expected);
            assert_eq!(reason(&with(field, json!(null))), expected);
            assert_eq!(reason(&with(field, json!({ "a": 1 }))), expected);
        }

        // service is checked before message
        assert_eq!(
            reason(&json!({ "level": "nope" })),
            "Field \"service\" is required and must be a string"
        );
    }

    #[test]
    fn whitespace_only_strings_are_present() {
        let body = json!({
            "service": "   ",
            "error": "\t",
            "message": " ",
            "level": "info"
        });

        let request = validate_notification_request(&body).unwrap();
        assert_eq!(request.service, "   ");
        assert_eq!(request.error, "\t");
        assert_eq!(request.message, " ");
    }

    #[test]
    fn level_must_match_exactly() {
        let expected =
            "Field \"level\" is required and must be one of: info, warning, error, critical";

        assert_eq!(reason(&without("level")), expected);
        for bad in [json!("CRITICAL"), json!("Info"), json!("fatal"), json!(""), json!(3)] {
            assert_eq!(reason(&with("level", bad)), expected);
        }

        for level in Level::ALL {
            let request = validate_notification_request(&with("level", json!(level.as_str())));
            assert_eq!(request.unwrap().level, level);
        }
    }

    #[test]
    fn timestamp_accepts_dates_and_epoch_millis() {
        for ts in [
            json!("2024-05-01T12:30:00Z"),
            json!("2024-05-01T12:30:00.123+02:00"),
            json!("2024-05-01"),
            json!("2024-05-01 12:30:00"),
            json!("2024-05-01T12:30"),
            json!("Wed, 01 May 2024 12:30:00 +0000"),
            json!(0),
            json!(1_714_566_600_000_i64),
            json!(1_714_566_600_000.75),
            json!(-86_400_000),
        ] {
            let request = validate_notification_request(&with("timestamp", ts.clone())).unwrap();
            assert_eq!(request.timestamp, Some(ts));
        }
    }

    #[test]
    fn timestamp_rejects_unparseable_values() {
        let expected = "Field \"timestamp\" must be a valid date string, number, or Date object";

        for ts in [
            json!("not a date"),
            json!(""),
            json!("2024-13-45"),
            json!(9_000_000_000_000_000_i64),
            json!(8_640_000_000_000_000_i64),
            json!(-8_640_000_000_000_000_i64),
            json!(true),
            json!({ "when": "now" }),
            json!([2024, 5, 1]),
        ] {
            assert_eq!(reason(&with("timestamp", ts)), expected);
        }
    }

    #[test]
    fn null_timestamp_is_absent() {
        let request = validate_notification_request(&with("timestamp", json!(null))).unwrap();
        assert_eq!(request.timestamp, None);
    }

    #[test]
    fn payload_must_be_object_or_null() {
        let expected = "Field \"payload\" must be an object or null";

        for payload in [json!("x"), json!(1), json!(true), json!(false), json!([1, 2])] {
            assert_eq!(reason(&with("payload", payload)), expected);
        }

        let request = validate_notification_request(&with("payload", json!(null))).unwrap();
        assert_eq!(request.payload, None);

        let request =
            validate_notification_request(&with("payload", json!({ "host": "db1" }))).unwrap();
        assert_eq!(request.payload.unwrap()["host"], json!("db1"));
    }

    #[test]
    fn epoch_range_ends_at_representable_instants() {
        let max = DateTime::<Utc>::MAX_UTC.timestamp_millis();
        let min = DateTime::<Utc>::MIN_UTC.timestamp_millis();

        assert_eq!(parse_timestamp(&json!(max)), Some(DateTime::<Utc>::MAX_UTC.trunc_subsecs(3)));
        assert!(parse_timestamp(&json!(min)).is_some());
        assert!(parse_timestamp(&json!(8_000_000_000_000_000_i64)).is_some());

        for out_of_range in [
            json!(max + 1),
            json!(min - 1),
            json!(8_640_000_000_000_000_i64),
            json!(-8_640_000_000_000_000_i64),
            json!(1e300),
        ] {
            assert_eq!(parse_timestamp(&out_of_range), None);
        }
    }

    #[test]
    fn epoch_millis_convert_to_instant() {
        let instant = parse_timestamp(&json!(1_700_000_000_000_i64)).unwrap();
        assert_eq!(instant.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }
}
