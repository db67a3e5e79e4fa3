use once_cell::sync::OnceCell;
use regex::Regex;

use crate::errors::{Error, Result};

// -00:00:00.0, -00d 00m 00.0s or -00 00 00.0
fn split_fields(text: &str) -> Result<([f64; 3], bool)> {
    static FIELDS_RE: OnceCell<Regex> = OnceCell::new();
    let fields_re = FIELDS_RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*([+-]?\d+(?:\.\d+)?)[:hd\s]\s*(\d+(?:\.\d+)?)[:m\s]\s*(\d+(?:\.\d+)?)s?\s*$").unwrap()
    });
    let caps = fields_re.captures(text)
        .ok_or_else(|| Error::Parse(text.to_string()))?;
    let mut fields = [0.0; 3];
    for (i, field) in fields.iter_mut().enumerate() {
        *field = caps[i + 1].parse()
            .map_err(|_| Error::Parse(text.to_string()))?;
    }
    Ok((fields, caps[1].starts_with('-')))
}

/// Converts a sexagesimal RA/DEC pair into decimal degrees.
///
/// Each value is either a plain decimal number or three fields separated
/// by colons, whitespace or `h`/`m`/`s` (`d`/`m`/`s`) letter markers.
/// RA fields are hour based, so every field contributes with a factor
/// of 15. An RA of 360 degrees or more is folded back as `abs(ra - 360)`.
/// That fold is a reflection, not a modulo, and loses the overflow sign;
/// kept as-is for compatibility with existing catalog and solver data.
pub fn hms_dms_to_degrees(ra: &str, dec: &str) -> Result<(f64, f64)> {
    if let (Ok(ra_dd), Ok(dec_dd)) = (ra.trim().parse::<f64>(), dec.trim().parse::<f64>()) {
        return Ok((ra_dd, dec_dd));
    }

    let (ra_fields, _) = split_fields(ra)?;
    let (dec_fields, dec_neg) = split_fields(dec)?;

    let mut ra_dd = 15.0 * (ra_fields[0] + ra_fields[1] / 60.0 + ra_fields[2] / 3600.0);
    if ra_dd >= 360.0 {
        ra_dd = f64::abs(ra_dd - 360.0);
    }

    // the sign marker of the leading field applies to all three fields
    let dec_dd = if dec_neg {
        dec_fields[0] - dec_fields[1] / 60.0 - dec_fields[2] / 3600.0
    } else {
        dec_fields[0] + dec_fields[1] / 60.0 + dec_fields[2] / 3600.0
    };

    Ok((ra_dd, dec_dd))
}

/// Formats declination degrees as `+dd:mm:ss.s` for status lines.
pub fn degrees_to_dms(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "+" };
    let mut sec10 = (value.abs() * 3600.0 * 10.0).round() as u64;
    let degrees = sec10 / 36000;
    sec10 %= 36000;
    let minutes = sec10 / 600;
    sec10 %= 600;
    format!("{}{:02}:{:02}:{:02}.{}", sign, degrees, minutes, sec10 / 10, sec10 % 10)
}

/// Formats RA degrees as `hh:mm:ss.s`.
pub fn degrees_to_hms(value: f64) -> String {
    let mut sec10 = (value.abs() / 15.0 * 3600.0 * 10.0).round() as u64;
    let hours = sec10 / 36000;
    sec10 %= 36000;
    let minutes = sec10 / 600;
    sec10 %= 600;
    format!("{:02}:{:02}:{:02}.{}", hours, minutes, sec10 / 10, sec10 % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_delimiters() {
        let (ra, dec) = hms_dms_to_degrees("00h59m59.3s", "-00d00m01.01s").unwrap();
        assert!(f64::abs(ra - 14.997083333333332) < 1e-12);
        assert!(f64::abs(dec - -0.00028055555555555554) < 1e-12);
    }

    #[test]
    fn test_space_delimiters() {
        let (ra, dec) = hms_dms_to_degrees("23 59 59", "+56 00 00").unwrap();
        assert!(f64::abs(ra - 359.99583333333334) < 1e-12);
        assert!(dec == 56.0);
    }

    #[test]
    fn test_colon_delimiters_and_ra_fold() {
        // 24.5 hours is 367.5 degrees, folded back as abs(367.5 - 360)
        let (ra, dec) = hms_dms_to_degrees("24:30:00", "+90:00:00").unwrap();
        assert!(f64::abs(ra - 7.5) < 1e-12);
        assert!(dec == 90.0);
    }

    #[test]
    fn test_plain_decimal() {
        let (ra, dec) = hms_dms_to_degrees("56.85", "-24.1").unwrap();
        assert!(ra == 56.85);
        assert!(dec == -24.1);
    }

    #[test]
    fn test_negative_zero_leading_field() {
        let (_, dec) = hms_dms_to_degrees("1 0 0", "-00 30 00").unwrap();
        assert!(f64::abs(dec - -0.5) < 1e-12);
    }

    #[test]
    fn test_malformed() {
        assert!(hms_dms_to_degrees("", "").is_err());
        assert!(hms_dms_to_degrees("12 34", "+56 00 00").is_err());
        assert!(hms_dms_to_degrees("12 34 56", "+56 xx 00").is_err());
        assert!(hms_dms_to_degrees("12 34 56 78", "+56 00 00").is_err());
    }

    #[test]
    fn test_degrees_to_dms() {
        assert_eq!(degrees_to_dms(0.0), "+00:00:00.0");
        assert_eq!(degrees_to_dms(-10.505), "-10:30:18.0");
        assert_eq!(degrees_to_dms(56.0), "+56:00:00.0");
    }

    #[test]
    fn test_degrees_to_hms() {
        assert_eq!(degrees_to_hms(0.0), "00:00:00.0");
        assert_eq!(degrees_to_hms(359.99583333333334), "23:59:59.0");
        assert_eq!(degrees_to_hms(15.0), "01:00:00.0");
    }
}
