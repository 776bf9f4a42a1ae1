//! Format catalog for the conversion parameter model.
//!
//! This module provides the static registry of formats a conversion can read
//! from or write to: vector file formats, database backends, and web-service
//! backends. Each entry is a small `{name, tag, writable}` record where `tag`
//! is the file extension for file formats and the connection or protocol token
//! for databases and web services. The registry is loaded once and read-only
//! thereafter.
//!
//! # Examples
//!
//! ```
//! use ogrconv_core::catalog::{SourceKind, find_format, formats_for};
//!
//! let formats = formats_for(SourceKind::File);
//! let idx = find_format(formats, "geojson").expect("GeoJSON should exist");
//! assert_eq!(formats[idx].tag, "geojson");
//! assert!(formats[idx].writable);
//! ```

use std::fmt;

/// Where the source data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A single file on disk.
    File,
    /// A directory whose matching files are converted one by one.
    Folder,
    /// A database connection, expanded into one entry per table.
    Database,
    /// A web service reached through a URI.
    WebService,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::File => write!(f, "file"),
            SourceKind::Folder => write!(f, "folder"),
            SourceKind::Database => write!(f, "database"),
            SourceKind::WebService => write!(f, "web service"),
        }
    }
}

/// Where the converted data goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// A single output file.
    File,
    /// A directory receiving one output per source entry.
    Folder,
    /// A database connection.
    Database,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::File => write!(f, "file"),
            TargetKind::Folder => write!(f, "folder"),
            TargetKind::Database => write!(f, "database"),
        }
    }
}

/// One catalog entry: a format the external conversion tool understands.
///
/// # Examples
///
/// ```
/// use ogrconv_core::catalog::Format;
///
/// let fmt = Format::new("GeoJSON", "geojson", true);
/// assert_eq!(fmt.name, "GeoJSON");
/// assert!(fmt.writable);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Format {
    /// Format name as passed to the conversion tool's `-f` flag.
    pub name: &'static str,
    /// File extension for vector file formats, connection or protocol token
    /// for database and web-service backends.
    pub tag: &'static str,
    /// Whether the format can be written, or is read-only.
    pub writable: bool,
}

impl Format {
    /// Creates a new catalog entry.
    #[must_use]
    pub const fn new(name: &'static str, tag: &'static str, writable: bool) -> Self {
        Self {
            name,
            tag,
            writable,
        }
    }
}

// Writable formats come first in each table so the writable slice is a
// prefix of the full slice.
static VECTOR_FORMATS: [Format; 16] = [
    Format::new("ESRI Shapefile", "shp", true),
    Format::new("GeoJSON", "geojson", true),
    Format::new("GPKG", "gpkg", true),
    Format::new("GML", "gml", true),
    Format::new("KML", "kml", true),
    Format::new("GPX", "gpx", true),
    Format::new("CSV", "csv", true),
    Format::new("MapInfo File", "tab", true),
    Format::new("FlatGeobuf", "fgb", true),
    Format::new("DXF", "dxf", true),
    Format::new("SQLite", "sqlite", true),
    Format::new("GMT", "gmt", true),
    Format::new("Geoconcept", "gxt", true),
    Format::new("S-57", "000", false),
    Format::new("OpenFileGDB", "gdb", false),
    Format::new("VRT", "vrt", false),
];

const VECTOR_WRITABLE: usize = 13;

static DATABASE_BACKENDS: [Format; 6] = [
    Format::new("PostgreSQL", "PG:", true),
    Format::new("MySQL", "MYSQL:", true),
    Format::new("SQLite", "sqlite", true),
    Format::new("MSSQLSpatial", "MSSQL:", true),
    Format::new("OCI", "OCI:", true),
    Format::new("ODBC", "ODBC:", false),
];

const DATABASE_WRITABLE: usize = 5;

static WEB_SERVICES: [Format; 3] = [
    Format::new("WFS", "WFS:", false),
    Format::new("OAPIF", "OAPIF:", false),
    Format::new("CSW", "CSW:", false),
];

/// Returns the vector file format table.
#[must_use]
pub fn vector_formats() -> &'static [Format] {
    &VECTOR_FORMATS
}

/// Returns the database backend table. Tags are connection-type tokens.
#[must_use]
pub fn database_backends() -> &'static [Format] {
    &DATABASE_BACKENDS
}

/// Returns the web-service backend table. Tags are protocol tokens that get
/// prepended to the service URI wherever it is used as a dataset name.
#[must_use]
pub fn web_services() -> &'static [Format] {
    &WEB_SERVICES
}

/// Returns the catalog slice valid for a source kind.
///
/// File and Folder sources read vector file formats, Database sources read
/// database backends, `WebService` sources read web-service backends.
///
/// # Examples
///
/// ```
/// use ogrconv_core::catalog::{SourceKind, formats_for};
///
/// assert!(formats_for(SourceKind::File).iter().any(|f| f.name == "GeoJSON"));
/// assert!(formats_for(SourceKind::WebService).iter().any(|f| f.name == "WFS"));
/// ```
#[must_use]
pub fn formats_for(kind: SourceKind) -> &'static [Format] {
    match kind {
        SourceKind::File | SourceKind::Folder => &VECTOR_FORMATS,
        SourceKind::Database => &DATABASE_BACKENDS,
        SourceKind::WebService => &WEB_SERVICES,
    }
}

/// Returns the writable catalog slice valid for a target kind.
///
/// Only formats the external tool can create are offered as outputs; these
/// records are the writable prefix of the corresponding source table.
///
/// # Examples
///
/// ```
/// use ogrconv_core::catalog::{TargetKind, writable_formats_for};
///
/// let out = writable_formats_for(TargetKind::File);
/// assert!(out.iter().all(|f| f.writable));
/// ```
#[must_use]
pub fn writable_formats_for(kind: TargetKind) -> &'static [Format] {
    match kind {
        TargetKind::File | TargetKind::Folder => &VECTOR_FORMATS[..VECTOR_WRITABLE],
        TargetKind::Database => &DATABASE_BACKENDS[..DATABASE_WRITABLE],
    }
}

/// Finds a format by name in a catalog slice (case-insensitive).
///
/// Returns the index into `formats`, or `None` if the name is unknown.
///
/// # Examples
///
/// ```
/// use ogrconv_core::catalog::{SourceKind, find_format, formats_for};
///
/// let formats = formats_for(SourceKind::Database);
/// assert!(find_format(formats, "postgresql").is_some());
/// assert!(find_format(formats, "NoSuchBackend").is_none());
/// ```
#[must_use]
pub fn find_format(formats: &[Format], name: &str) -> Option<usize> {
    formats.iter().position(|f| f.name.eq_ignore_ascii_case(name))
}
