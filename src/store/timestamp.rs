use serde::{Serialize, Serializer};
use time::{macros::format_description, PrimitiveDateTime};
use tracing::warn;

/// Registration time of a record as read back from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisteredAt {
    Parsed(PrimitiveDateTime),
    /// Backend text that could not be parsed, kept verbatim.
    Raw(String),
}

/// Best-effort conversion of a backend timestamp such as
/// `2025-09-03T13:58:21.305438+00:00`.
///
/// Sub-second precision and a `+hh:mm` offset are discarded before parsing
/// `YYYY-MM-DD HH:MM:SS`; anything else comes back untouched as `Raw`.
pub fn convert_timestamp(raw: &str) -> RegisteredAt {
    let mut clean = raw.split('.').next().unwrap_or(raw).replace('T', " ");
    if let Some((head, _)) = clean.split_once('+') {
        clean = head.to_string();
    }

    match PrimitiveDateTime::parse(
        &clean,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        Ok(dt) => RegisteredAt::Parsed(dt),
        Err(e) => {
            warn!(error = %e, value = raw, "could not convert timestamp");
            RegisteredAt::Raw(raw.to_string())
        }
    }
}

impl RegisteredAt {
    /// Short form used on the HTML page.
    pub fn display(&self) -> String {
        match self {
            Self::Parsed(dt) => dt
                .format(format_description!("[day]/[month]/[year] [hour]:[minute]"))
                .unwrap_or_else(|_| dt.to_string()),
            Self::Raw(s) => s.clone(),
        }
    }
}

impl Serialize for RegisteredAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Parsed(dt) => {
                let s = dt
                    .format(format_description!(
                        "[year]-[month]-[day]T[hour]:[minute]:[second]"
                    ))
                    .map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&s)
            }
            Self::Raw(s) => serializer.serialize_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn drops_fraction_and_offset() {
        let got = convert_timestamp("2025-09-03T13:58:21.305438+00:00");
        assert_eq!(got, RegisteredAt::Parsed(datetime!(2025-09-03 13:58:21)));
    }

    #[test]
    fn accepts_postgres_text_form() {
        let got = convert_timestamp("2025-09-03 13:58:21.5");
        assert_eq!(got, RegisteredAt::Parsed(datetime!(2025-09-03 13:58:21)));
    }

    #[test]
    fn offset_without_fraction() {
        let got = convert_timestamp("2024-01-31T23:00:05+02:00");
        assert_eq!(got, RegisteredAt::Parsed(datetime!(2024-01-31 23:00:05)));
    }

    #[test]
    fn malformed_input_is_returned_unchanged() {
        assert_eq!(
            convert_timestamp("not-a-date"),
            RegisteredAt::Raw("not-a-date".into())
        );
        // a zulu suffix is not stripped
        assert_eq!(
            convert_timestamp("2025-09-03T13:58:21Z"),
            RegisteredAt::Raw("2025-09-03T13:58:21Z".into())
        );
    }

    #[test]
    fn serializes_as_iso_local_time() {
        let parsed = convert_timestamp("2025-09-03T13:58:21.305438+00:00");
        assert_eq!(
            serde_json::to_string(&parsed).unwrap(),
            "\"2025-09-03T13:58:21\""
        );
        assert_eq!(parsed.display(), "03/09/2025 13:58");

        let raw = convert_timestamp("ayer");
        assert_eq!(serde_json::to_string(&raw).unwrap(), "\"ayer\"");
        assert_eq!(raw.display(), "ayer");
    }
}
