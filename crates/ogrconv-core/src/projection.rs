//! Projection catalog: ordered EPSG code/description pairs.
//!
//! Index 0 is reserved for "no projection" (code 0, empty description). The
//! list backs both projection lookup and selector controls in presentation
//! layers, so order is part of the contract: resolving typed text picks the
//! first entry whose decimal code starts with the text.
//!
//! # Examples
//!
//! ```
//! use ogrconv_core::projection::{find_by_code, projections};
//!
//! let idx = find_by_code(4326).expect("WGS 84 should exist");
//! assert_eq!(projections()[idx].code, 4326);
//! ```

/// One coordinate reference system entry.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    /// Numeric EPSG code; 0 for the reserved "no projection" entry.
    pub code: u32,
    /// Human-readable description of the coordinate reference system.
    pub description: &'static str,
}

impl Projection {
    #[must_use]
    pub const fn new(code: u32, description: &'static str) -> Self {
        Self { code, description }
    }

    /// Display form used by selector controls: `"<code> : <description>"`,
    /// or an empty string for the reserved entry.
    #[must_use]
    pub fn display(&self) -> String {
        if self.code == 0 {
            String::new()
        } else {
            format!("{} : {}", self.code, self.description)
        }
    }
}

// Sorted by code past the reserved entry, so prefix resolution is stable.
static PROJECTIONS: [Projection; 41] = [
    Projection::new(0, ""),
    Projection::new(2056, "CH1903+ / LV95"),
    Projection::new(2154, "RGF93 / Lambert-93"),
    Projection::new(2180, "ETRS89 / Poland CS92"),
    Projection::new(3005, "NAD83 / BC Albers"),
    Projection::new(3035, "ETRS89-extended / LAEA Europe"),
    Projection::new(3395, "WGS 84 / World Mercator"),
    Projection::new(3414, "SVY21 / Singapore TM"),
    Projection::new(3577, "GDA94 / Australian Albers"),
    Projection::new(3857, "WGS 84 / Pseudo-Mercator"),
    Projection::new(3978, "NAD83 / Canada Atlas Lambert"),
    Projection::new(4171, "RGF93"),
    Projection::new(4258, "ETRS89"),
    Projection::new(4267, "NAD27"),
    Projection::new(4269, "NAD83"),
    Projection::new(4283, "GDA94"),
    Projection::new(4326, "WGS 84"),
    Projection::new(4617, "NAD83(CSRS)"),
    Projection::new(4647, "ETRS89 / UTM zone 32N (zE-N)"),
    Projection::new(5514, "S-JTSK / Krovak East North"),
    Projection::new(21781, "CH1903 / LV03"),
    Projection::new(23032, "ED50 / UTM zone 32N"),
    Projection::new(25832, "ETRS89 / UTM zone 32N"),
    Projection::new(25833, "ETRS89 / UTM zone 33N"),
    Projection::new(26910, "NAD83 / UTM zone 10N"),
    Projection::new(26917, "NAD83 / UTM zone 17N"),
    Projection::new(27700, "OSGB36 / British National Grid"),
    Projection::new(28355, "GDA94 / MGA zone 55"),
    Projection::new(28992, "Amersfoort / RD New"),
    Projection::new(31370, "BD72 / Belgian Lambert 72"),
    Projection::new(31466, "DHDN / 3-degree Gauss-Kruger zone 2"),
    Projection::new(31467, "DHDN / 3-degree Gauss-Kruger zone 3"),
    Projection::new(32198, "NAD83 / Quebec Lambert"),
    Projection::new(32610, "WGS 84 / UTM zone 10N"),
    Projection::new(32617, "WGS 84 / UTM zone 17N"),
    Projection::new(32631, "WGS 84 / UTM zone 31N"),
    Projection::new(32632, "WGS 84 / UTM zone 32N"),
    Projection::new(32633, "WGS 84 / UTM zone 33N"),
    Projection::new(32748, "WGS 84 / UTM zone 48S"),
    Projection::new(102100, "ESRI Web Mercator (deprecated alias)"),
    Projection::new(900913, "Google Maps Global Mercator (legacy)"),
];

/// Returns the full projection catalog, reserved entry included.
#[must_use]
pub fn projections() -> &'static [Projection] {
    &PROJECTIONS
}

/// Finds the catalog index for an exact EPSG code.
///
/// The reserved entry at index 0 is never returned.
///
/// # Examples
///
/// ```
/// use ogrconv_core::projection::find_by_code;
///
/// assert!(find_by_code(4326).is_some());
/// assert!(find_by_code(0).is_none());
/// assert!(find_by_code(99999).is_none());
/// ```
#[must_use]
pub fn find_by_code(code: u32) -> Option<usize> {
    if code == 0 {
        return None;
    }
    PROJECTIONS.iter().position(|p| p.code == code)
}

/// Resolves typed text against the code column with a starts-with match.
///
/// Returns the first entry whose decimal code starts with `text`, skipping
/// the reserved entry. Empty or non-matching text yields `None`.
///
/// # Examples
///
/// ```
/// use ogrconv_core::projection::{projections, resolve_prefix};
///
/// let idx = resolve_prefix("43").expect("some 43xx code should exist");
/// assert!(projections()[idx].code.to_string().starts_with("43"));
/// assert!(resolve_prefix("77777").is_none());
/// ```
#[must_use]
pub fn resolve_prefix(text: &str) -> Option<usize> {
    if text.is_empty() {
        return None;
    }
    PROJECTIONS
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, p)| p.code.to_string().starts_with(text))
        .map(|(i, _)| i)
}
