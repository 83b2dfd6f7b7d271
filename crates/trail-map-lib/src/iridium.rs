//! Parser for the position text messages sent by the Iridium satellite phone
//!
//! A message looks like:
//!
//! ```text
//! Lat-12 deg2'41" Lon-77 deg1'37" Alt+160 m (GPS fix) 21-Jul-2017 20:13:07 UTC http://...
//! ```
//!
//! The altitude sign is not kept: only its digits are read.

use crate::model::TrackPoint;
use crate::{MapError, Result};
use chrono::NaiveDateTime;

const MESSAGE_TIME_FORMAT: &str = "%d-%b-%Y %H:%M:%S";
const TRACK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a message into a track point
pub fn parse_message(message: &str) -> Result<TrackPoint> {
    let invalid = || MapError::InvalidMessage(message.to_string());
    let mut scanner = Scanner::new(message);

    let latitude = scanner.coordinate("Lat").ok_or_else(invalid)?;
    scanner.whitespace().ok_or_else(invalid)?;
    let longitude = scanner.coordinate("Lon").ok_or_else(invalid)?;
    scanner.whitespace().ok_or_else(invalid)?;

    scanner.tag("Alt").ok_or_else(invalid)?;
    scanner
        .take_while(|c| c == '+' || c == '-', 1, 1)
        .ok_or_else(invalid)?;
    let altitude = scanner
        .take_while(|c| c.is_ascii_digit(), 1, usize::MAX)
        .ok_or_else(invalid)?;
    scanner.whitespace().ok_or_else(invalid)?;
    scanner
        .take_while(|c| c.is_alphanumeric() || c == '_', 1, 3)
        .ok_or_else(invalid)?;
    scanner.whitespace().ok_or_else(invalid)?;

    // Free-form fix description in parentheses. It may hold parentheses
    // itself: it ends at the first `)` followed by the date and UTC.
    scanner.tag("(").ok_or_else(invalid)?;
    let body = scanner.rest();
    let stamp = body
        .match_indices(')')
        .filter(|&(end, _)| end > 0)
        .find_map(|(end, _)| timestamp_after_description(&body[end + 1..]))
        .ok_or_else(invalid)?;
    let timestamp = NaiveDateTime::parse_from_str(stamp, MESSAGE_TIME_FORMAT)?;

    let (lat_deg, lat_min, lat_sec) = latitude;
    let (lon_deg, lon_min, lon_sec) = longitude;
    let point = TrackPoint::new(
        deg_min_sec_to_degrees(lat_deg, lat_min, lat_sec)?.to_string(),
        deg_min_sec_to_degrees(lon_deg, lon_min, lon_sec)?.to_string(),
        normalize_digits(altitude),
        timestamp.format(TRACK_TIME_FORMAT).to_string(),
    );
    tracing::debug!("Parsed Iridium message into {:?}", point);
    Ok(point)
}

/// `<ws><date> <time> UTC<ws><anything>` following the fix description
///
/// Returns the date and time text; it is parsed by the caller.
fn timestamp_after_description(text: &str) -> Option<&str> {
    let mut scanner = Scanner::new(text);
    scanner.whitespace()?;
    let stamp = scanner.until(" UTC")?;
    scanner.whitespace()?;
    if scanner.rest().is_empty() || scanner.rest().contains('\n') {
        return None;
    }
    let bytes = stamp.as_bytes();
    if stamp.len() != "21-Jul-2017 20:13:07".len()
        || !bytes[..2].iter().all(u8::is_ascii_digit)
        || bytes[2] != b'-'
    {
        return None;
    }
    Some(stamp)
}

/// Digits without leading zeros (`"0"` for all zeros)
fn normalize_digits(digits: &str) -> String {
    match digits.trim_start_matches('0') {
        "" => "0".to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Convert degrees, minutes and seconds to signed decimal degrees
///
/// `degrees` may contain spaces and a leading `-`, which negates the whole value.
pub fn deg_min_sec_to_degrees(degrees: &str, minutes: &str, seconds: &str) -> Result<f64> {
    let invalid = || MapError::InvalidCoordinate(format!("{degrees}deg{minutes}'{seconds}\""));
    let compact: String = degrees.chars().filter(|c| !c.is_whitespace()).collect();
    let is_negative = compact.starts_with('-');
    let degrees: i64 = compact.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    let seconds: u32 = seconds.parse().map_err(|_| invalid())?;

    let value = degrees.abs() as f64 + minutes as f64 / 60.0 + seconds as f64 / 3600.0;
    Ok(if is_negative { -value } else { value })
}

/// Minimal cursor over the message text
struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    fn rest(&self) -> &'a str {
        self.rest
    }

    fn tag(&mut self, tag: &str) -> Option<()> {
        self.rest = self.rest.strip_prefix(tag)?;
        Some(())
    }

    /// Exactly one whitespace character
    fn whitespace(&mut self) -> Option<()> {
        let c = self.rest.chars().next()?;
        if !c.is_whitespace() {
            return None;
        }
        self.rest = &self.rest[c.len_utf8()..];
        Some(())
    }

    /// Text up to `delimiter`, consuming the delimiter
    fn until(&mut self, delimiter: &str) -> Option<&'a str> {
        let (taken, rest) = self.rest.split_once(delimiter)?;
        self.rest = rest;
        Some(taken)
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool, min: usize, max: usize) -> Option<&'a str> {
        let end = self
            .rest
            .char_indices()
            .take(max)
            .find(|&(_, c)| !accept(c))
            .map(|(i, _)| i)
            .unwrap_or_else(|| {
                self.rest
                    .char_indices()
                    .nth(max)
                    .map_or(self.rest.len(), |(i, _)| i)
            });
        let taken = &self.rest[..end];
        if taken.chars().count() < min {
            return None;
        }
        self.rest = &self.rest[end..];
        Some(taken)
    }

    /// `<prefix><degrees>deg<minutes>'<seconds>"`
    fn coordinate(&mut self, prefix: &str) -> Option<(&'a str, &'a str, &'a str)> {
        self.tag(prefix)?;
        let degrees =
            self.take_while(|c| c.is_ascii_digit() || c.is_whitespace() || c == '-', 1, usize::MAX)?;
        self.tag("deg")?;
        let minutes = self.take_while(|c| c.is_ascii_digit(), 1, usize::MAX)?;
        self.tag("'")?;
        let seconds = self.take_while(|c| c.is_ascii_digit(), 1, usize::MAX)?;
        self.tag("\"")?;
        Some((degrees, minutes, seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGE: &str = "Lat-12 deg2'41\" Lon-77 deg1'37\" Alt+160 m (GPS fix) 21-Jul-2017 20:13:07 UTC http://map.example.org";

    #[test]
    fn test_parse_message() {
        let point = parse_message(MESSAGE).unwrap();
        let lat: f64 = point.latitude.parse().unwrap();
        let lon: f64 = point.longitude.parse().unwrap();
        assert!((lat - -(12.0 + 2.0 / 60.0 + 41.0 / 3600.0)).abs() < 1e-12);
        assert!((lon - -(77.0 + 1.0 / 60.0 + 37.0 / 3600.0)).abs() < 1e-12);
        assert_eq!(point.altitude, "160");
        assert_eq!(point.timestamp, "2017-07-21 20:13:07");
    }

    #[test]
    fn test_altitude_sign_is_dropped() {
        let message = MESSAGE.replace("Alt+160", "Alt-15");
        assert_eq!(parse_message(&message).unwrap().altitude, "15");
    }

    #[test]
    fn test_positive_hemispheres() {
        let message = MESSAGE.replace("Lat-12", "Lat12").replace("Lon-77", "Lon 7");
        let point = parse_message(&message).unwrap();
        assert!(point.latitude.parse::<f64>().unwrap() > 12.0);
        assert!(point.longitude.parse::<f64>().unwrap() > 7.0);
    }

    #[test]
    fn test_deg_min_sec_to_degrees() {
        assert_eq!(deg_min_sec_to_degrees("10", "30", "0").unwrap(), 10.5);
        assert_eq!(deg_min_sec_to_degrees("-10", "30", "0").unwrap(), -10.5);
        assert_eq!(deg_min_sec_to_degrees(" - 0", "30", "0").unwrap(), -0.5);
        assert_eq!(deg_min_sec_to_degrees(" -12", "0", "0").unwrap(), -12.0);
        assert!(deg_min_sec_to_degrees("x", "30", "0").is_err());
    }

    #[test]
    fn test_rejects_malformed_messages() {
        let messages = vec![
            String::new(),
            "hello".to_string(),
            "Lat-12 deg2'41\" Lon-77 deg1'37\"".to_string(),
            MESSAGE.replace("UTC http://map.example.org", "UTC "),
            MESSAGE.replace(" (GPS fix)", ""),
            MESSAGE.replace(" m (", " meters ("),
        ];
        for message in &messages {
            assert!(
                matches!(parse_message(message), Err(MapError::InvalidMessage(_))),
                "accepted {message:?}"
            );
        }
    }

    #[test]
    fn test_nested_parentheses_in_description() {
        let message = MESSAGE.replace("(GPS fix)", "(fix (3D))");
        let point = parse_message(&message).unwrap();
        assert_eq!(point.timestamp, "2017-07-21 20:13:07");
        assert_eq!(point.altitude, "160");

        for description in ["(fix) (3D)", "(fix (3D)"] {
            let message = MESSAGE.replace("(GPS fix)", description);
            assert_eq!(
                parse_message(&message).unwrap().timestamp,
                "2017-07-21 20:13:07"
            );
        }
    }

    #[test]
    fn test_rejects_unclosed_description() {
        let message = MESSAGE.replace("(GPS fix)", "(GPS fix");
        assert!(matches!(
            parse_message(&message),
            Err(MapError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_rejects_bad_date() {
        let message = MESSAGE.replace("21-Jul-2017", "21-Foo-2017");
        assert!(matches!(
            parse_message(&message),
            Err(MapError::InvalidTimestamp(_))
        ));
    }
}
