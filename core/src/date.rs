//! The two timestamp formats used on the wire.
//!
//! Bookmarks (`time`, `date`, `dt`, `fromdt`, `todt`, `update_time`) use
//! `2017-08-16T08:21:11Z`. Notes (`created_at`, `updated_at`) use the compact
//! `20170816082111`. Both are UTC at second precision; the formats are never
//! interchanged.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::ApiError;

const BOOKMARK_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const NOTE_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

pub fn encode_bookmark_time(time: &DateTime<Utc>) -> String {
    time.format(BOOKMARK_TIME_FORMAT).to_string()
}

/// Numeric fields are width-flexible, so `2017-8-6T8:21:11Z` is accepted
/// alongside the zero-padded form. The service has been seen sending an
/// unpadded month.
pub fn decode_bookmark_time(field: &'static str, value: &str) -> Result<DateTime<Utc>, ApiError> {
    parse(field, value, BOOKMARK_TIME_FORMAT)
}

pub fn encode_note_time(time: &DateTime<Utc>) -> String {
    time.format(NOTE_TIME_FORMAT).to_string()
}

pub fn decode_note_time(field: &'static str, value: &str) -> Result<DateTime<Utc>, ApiError> {
    // chrono's %Y accepts more than four digits; pin the width so that only
    // the exact output of `encode_note_time` is accepted.
    if value.len() != 14 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::format(field, value));
    }
    parse(field, value, NOTE_TIME_FORMAT)
}

fn parse(field: &'static str, value: &str, format: &str) -> Result<DateTime<Utc>, ApiError> {
    NaiveDateTime::parse_from_str(value, format)
        .map(|naive| naive.and_utc())
        .map_err(|_| ApiError::format(field, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant() -> DateTime<Utc> {
        DateTime::from_timestamp(1_502_871_671, 0).unwrap()
    }

    #[test]
    fn bookmark_time_encodes_with_z_suffix() {
        assert_eq!(encode_bookmark_time(&instant()), "2017-08-16T08:21:11Z");
    }

    #[test]
    fn bookmark_time_drops_subseconds() {
        let time = DateTime::from_timestamp(1_502_871_671, 755_000_000).unwrap();
        assert_eq!(encode_bookmark_time(&time), "2017-08-16T08:21:11Z");
    }

    #[test]
    fn bookmark_time_roundtrips() {
        let encoded = encode_bookmark_time(&instant());
        assert_eq!(decode_bookmark_time("time", &encoded).unwrap(), instant());
    }

    #[test]
    fn note_time_roundtrips_and_differs_from_bookmark_time() {
        let encoded = encode_note_time(&instant());
        assert_eq!(encoded, "20170816082111");
        assert_eq!(decode_note_time("created_at", &encoded).unwrap(), instant());
        assert_ne!(encoded, encode_bookmark_time(&instant()));
    }

    #[test]
    fn formats_are_not_interchangeable() {
        assert!(decode_note_time("created_at", "2017-08-16T08:21:11Z").is_err());
        assert!(decode_bookmark_time("time", "20170816082111").is_err());
    }

    #[test]
    fn offset_timestamps_are_rejected() {
        let err = decode_bookmark_time("time", "2017-08-16T08:31:25.755+0000").unwrap_err();
        assert!(matches!(err, ApiError::Format { field: "time", .. }));
    }

    #[test]
    fn short_note_time_is_rejected() {
        assert!(decode_note_time("updated_at", "2017081608211").is_err());
        assert!(decode_note_time("updated_at", "").is_err());
    }

    #[test]
    fn unpadded_bookmark_time_is_accepted() {
        let decoded = decode_bookmark_time("time", "2017-8-6T8:21:11Z").unwrap();
        let padded = decode_bookmark_time("time", "2017-08-06T08:21:11Z").unwrap();
        assert_eq!(decoded, padded);
        assert_eq!(encode_bookmark_time(&decoded), "2017-08-06T08:21:11Z");
    }

    mod roundtrip {
        use super::*;
        use proptest::prelude::*;

        // 1970-01-01 up to 2100-01-01, whole seconds.
        fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
            (0i64..4_102_444_800).prop_map(|secs| DateTime::from_timestamp(secs, 0).unwrap())
        }

        proptest! {
            #[test]
            fn bookmark_time_roundtrips_for_any_instant(instant in arb_instant()) {
                let encoded = encode_bookmark_time(&instant);
                prop_assert_eq!(decode_bookmark_time("time", &encoded).unwrap(), instant);
            }

            #[test]
            fn note_time_roundtrips_for_any_instant(instant in arb_instant()) {
                let encoded = encode_note_time(&instant);
                prop_assert_eq!(decode_note_time("created_at", &encoded).unwrap(), instant);
                prop_assert_ne!(encoded, encode_bookmark_time(&instant));
            }

            #[test]
            fn formats_never_cross_decode(instant in arb_instant()) {
                prop_assert!(decode_note_time("created_at", &encode_bookmark_time(&instant)).is_err());
                prop_assert!(decode_bookmark_time("time", &encode_note_time(&instant)).is_err());
            }
        }
    }
}
