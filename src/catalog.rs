use std::{path::{Path, PathBuf}, str::FromStr};

use crate::{
    errors::{Error, Result},
    sky_math::{math::SkyCoord, sexagesimal::hms_dms_to_degrees},
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CatalogFamily {
    Messier,
    Ngc,
}

impl CatalogFamily {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Messier => "M",
            Self::Ngc     => "NGC",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CatalogId {
    pub family:    CatalogFamily,
    pub reference: u32,
}

impl CatalogId {
    /// Key of the catalog record: family tag plus the reference number
    /// right-aligned to the catalog's fixed column width, so "M45"
    /// matches `M  45` and nothing else.
    pub fn record_key(&self) -> String {
        match self.family {
            CatalogFamily::Messier => format!("M{:>4}", self.reference),
            CatalogFamily::Ngc     => format!("NGC{:>5}", self.reference),
        }
    }
}

impl std::fmt::Display for CatalogId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", self.family.tag(), self.reference)
    }
}

impl FromStr for CatalogId {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let text = text.trim();
        let upper = text.to_ascii_uppercase();
        let (family, reference) =
            if let Some(rest) = upper.strip_prefix("NGC") {
                (CatalogFamily::Ngc, rest)
            } else if let Some(rest) = upper.strip_prefix('M') {
                (CatalogFamily::Messier, rest)
            } else {
                return Err(Error::Parse(text.to_string()));
            };
        let reference = reference.trim().parse::<u32>()
            .map_err(|_| Error::Parse(text.to_string()))?;
        if reference == 0 {
            return Err(Error::Parse(text.to_string()));
        }
        Ok(Self { family, reference })
    }
}

#[derive(Debug, Clone)]
pub struct Target {
    pub id:       CatalogId,
    pub coord:    SkyCoord,
    pub ra_hours: f64, // whole hours, plate solver hint
    pub spd:      f64, // south-pole distance (90 + dec), plate solver hint
}

/// Flat-text catalog of deep sky objects (Saguaro Astronomy Club format):
/// comma separated, field 0 is the fixed-width object key, fields 4 and 5
/// hold RA `hh mm.m` and DEC `+dd mm` without seconds.
pub struct Catalog {
    file: PathBuf,
}

impl Catalog {
    pub fn new(file: &Path) -> Self {
        Self { file: file.to_path_buf() }
    }

    pub fn lookup(&self, id: &CatalogId) -> Result<Target> {
        let key = id.record_key();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.file)?;
        for record in reader.records() {
            let record = record?;
            let matches = record.get(0)
                .map(|field| field.trim_end() == key)
                .unwrap_or(false);
            if !matches { continue; }
            let ra_raw = record.get(4)
                .ok_or_else(|| Error::NotFound(id.to_string()))?
                .trim();
            let dec_raw = record.get(5)
                .ok_or_else(|| Error::NotFound(id.to_string()))?
                .trim();
            return Self::record_to_target(id, ra_raw, dec_raw);
        }
        Err(Error::NotFound(id.to_string()))
    }

    fn record_to_target(id: &CatalogId, ra_raw: &str, dec_raw: &str) -> Result<Target> {
        // solver hints come from the leading fields only: whole RA hours
        // and whole DEC degrees in south-pole-distance convention
        let ra_hours = leading_field(ra_raw)?;
        let spd = 90.0 + leading_field(dec_raw)?;

        // the catalog has no seconds, append them before conversion
        let ra_txt = format!("{} 00", ra_raw);
        let dec_txt = format!("{} 00", dec_raw);
        let (ra, dec) = hms_dms_to_degrees(&ra_txt, &dec_txt)?;

        Ok(Target {
            id: *id,
            coord: SkyCoord { ra, dec },
            ra_hours,
            spd,
        })
    }
}

fn leading_field(text: &str) -> Result<f64> {
    text.split_whitespace()
        .next()
        .and_then(|field| field.parse().ok())
        .ok_or_else(|| Error::Parse(text.to_string()))
}
