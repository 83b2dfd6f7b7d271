//! GPS information from the EXIF data of a photo
//!
//! The GPS IFD stores latitude and longitude as degree/minute/second
//! rationals with a hemisphere reference (`N`/`S`, `E`/`W`), the altitude as a
//! rational and the fix time split into `GPSDateStamp` (`2017:07:12`) and
//! `GPSTimeStamp` (three rationals).

use crate::model::PhotoRecord;
use crate::Result;
use chrono::{NaiveDate, NaiveTime};
use exif::{Exif, In, Rational, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read the GPS fix of a photo
///
/// Returns `Ok(None)` when the photo has no EXIF data, no GPS position, or an
/// unknown hemisphere reference.
pub fn read_gps_info(path: &Path) -> Result<Option<PhotoRecord>> {
    let mut reader = BufReader::new(File::open(path)?);
    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => {
            tracing::debug!("No EXIF data in {}", path.display());
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    let Some(latitude) = coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef) else {
        tracing::debug!("No usable GPS latitude in {}", filename);
        return Ok(None);
    };
    let Some(longitude) = coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef) else {
        tracing::debug!("No usable GPS longitude in {}", filename);
        return Ok(None);
    };

    let altitude = rationals(&exif, Tag::GPSAltitude)
        .and_then(|values| values.first().map(Rational::to_f64))
        .unwrap_or(0.0);

    Ok(Some(PhotoRecord {
        filename,
        latitude,
        longitude,
        altitude,
        timestamp: timestamp(&exif).unwrap_or_default(),
    }))
}

/// +1 for the northern/eastern hemisphere, -1 for southern/western
pub fn hemisphere_sign(reference: char) -> Option<f64> {
    match reference {
        'N' | 'E' => Some(1.0),
        'S' | 'W' => Some(-1.0),
        _ => None,
    }
}

/// Degrees, minutes and seconds rationals to decimal degrees
pub fn dms_to_degrees(dms: &[Rational]) -> Option<f64> {
    match dms {
        [degrees, minutes, seconds, ..] => {
            Some(degrees.to_f64() + minutes.to_f64() / 60.0 + seconds.to_f64() / 3600.0)
        }
        _ => None,
    }
}

fn coordinate(exif: &Exif, value_tag: Tag, ref_tag: Tag) -> Option<f64> {
    let sign = hemisphere_sign(ascii(exif, ref_tag)?.chars().next()?)?;
    Some(sign * dms_to_degrees(rationals(exif, value_tag)?)?)
}

fn rationals(exif: &Exif, tag: Tag) -> Option<&[Rational]> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(values) => Some(values.as_slice()),
        _ => None,
    }
}

fn ascii(exif: &Exif, tag: Tag) -> Option<String> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(values) => values
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string()),
        _ => None,
    }
}

/// `YYYY-MM-DD HH:MM:SS` from the GPS date and time stamps
fn timestamp(exif: &Exif) -> Option<String> {
    let date = NaiveDate::parse_from_str(&ascii(exif, Tag::GPSDateStamp)?, "%Y:%m:%d").ok()?;
    let time = match rationals(exif, Tag::GPSTimeStamp)? {
        [hour, minute, second, ..] => NaiveTime::from_hms_opt(
            hour.to_f64() as u32,
            minute.to_f64() as u32,
            second.to_f64() as u32,
        )?,
        _ => return None,
    };
    Some(date.and_time(time).format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn rational(num: u32, denom: u32) -> Rational {
        Rational { num, denom }
    }

    #[test]
    fn test_dms_to_degrees() {
        let dms = [rational(11, 1), rational(52, 1), rational(261135, 10000)];
        let degrees = dms_to_degrees(&dms).unwrap();
        assert!((degrees - (11.0 + 52.0 / 60.0 + 26.1135 / 3600.0)).abs() < 1e-9);
        assert!(dms_to_degrees(&dms[..2]).is_none());
    }

    #[test]
    fn test_hemisphere_sign() {
        assert_eq!(hemisphere_sign('N'), Some(1.0));
        assert_eq!(hemisphere_sign('E'), Some(1.0));
        assert_eq!(hemisphere_sign('S'), Some(-1.0));
        assert_eq!(hemisphere_sign('W'), Some(-1.0));
        assert_eq!(hemisphere_sign('X'), None);
    }

    #[test]
    fn test_jpeg_without_exif() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("IMG_1.jpg");
        image::RgbImage::new(8, 8).save(&path).unwrap();
        assert!(read_gps_info(&path).unwrap().is_none());
    }

    #[test]
    fn test_not_an_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.jpg");
        std::fs::write(&path, "not a photo").unwrap();
        assert!(read_gps_info(&path).is_err());
    }
}
