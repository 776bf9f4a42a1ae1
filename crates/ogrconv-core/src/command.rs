//! Derived command-line assembly for the external conversion tool.
//!
//! The argument string is a pure function of the current selections: it is
//! never edited in place, only rebuilt. Flags appear in a fixed order, each
//! optional flag only when its triggering field is non-empty, and the whole
//! assembled string gets one backslash-to-forward-slash normalization pass
//! at the end.
//!
//! Values are wrapped in plain double quotes with no further escaping; a
//! value that itself contains a double quote passes through verbatim. That
//! matches the tool's observed invocation style and is asserted as a known
//! limitation in the tests below.

use std::fmt;

/// Policy for a target dataset that already exists.
///
/// The three modes are mutually exclusive by construction; exactly one flag
/// is emitted, with Overwrite taking priority over Append over Update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Replace the target dataset.
    #[default]
    Overwrite,
    /// Append features to the target dataset.
    Append,
    /// Merge into the target dataset.
    Update,
}

impl WriteMode {
    /// The command-line flag for this mode.
    #[must_use]
    pub fn flag(&self) -> &'static str {
        match self {
            WriteMode::Overwrite => "-overwrite",
            WriteMode::Append => "-append",
            WriteMode::Update => "-update",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Overwrite => write!(f, "overwrite"),
            WriteMode::Append => write!(f, "append"),
            WriteMode::Update => write!(f, "update"),
        }
    }
}

/// Everything the argument builder needs, already resolved.
///
/// `source` carries the web-service protocol token when one applies; the
/// builder treats it as an opaque dataset name.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec<'a> {
    /// Output format name for the `-f` flag.
    pub target_format: &'a str,
    /// Target location (path or connection string).
    pub target_location: &'a str,
    /// Source dataset name, protocol token included where applicable.
    pub source: &'a str,
    /// Selected reprojection, if any.
    pub projection_code: Option<u32>,
    /// SQL restriction on the source, if any.
    pub query: &'a str,
    /// How an existing target is treated.
    pub write_mode: WriteMode,
    /// Free-text block appended verbatim after the write-mode flag.
    pub extra_args: &'a str,
}

/// Assembles the tool's argument string in fixed order:
/// output format, quoted target, quoted source, optional `-T_SRS`,
/// optional `-sql`, one write-mode flag, then the free-text block.
///
/// # Examples
///
/// ```
/// use ogrconv_core::command::{CommandSpec, WriteMode, build_arguments};
///
/// let spec = CommandSpec {
///     target_format: "GeoJSON",
///     target_location: "/out/a.geojson",
///     source: "/data/a.shp",
///     projection_code: None,
///     query: "",
///     write_mode: WriteMode::Overwrite,
///     extra_args: "",
/// };
/// assert_eq!(
///     build_arguments(&spec),
///     r#"-f "GeoJSON" "/out/a.geojson" "/data/a.shp" -overwrite"#
/// );
/// ```
#[must_use]
pub fn build_arguments(spec: &CommandSpec<'_>) -> String {
    let mut arguments = format!(
        "-f \"{}\" \"{}\" \"{}\"",
        spec.target_format, spec.target_location, spec.source
    );

    if let Some(code) = spec.projection_code {
        arguments.push_str(&format!(" -T_SRS EPSG:{code}"));
    }

    if !spec.query.is_empty() {
        arguments.push_str(&format!(" -sql \"{}\"", spec.query));
    }

    arguments.push(' ');
    arguments.push_str(spec.write_mode.flag());

    if !spec.extra_args.is_empty() {
        arguments.push(' ');
        arguments.push_str(spec.extra_args);
    }

    // One normalization pass over the whole assembled string, not per field.
    arguments.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_spec<'a>() -> CommandSpec<'a> {
        CommandSpec {
            target_format: "GeoJSON",
            target_location: "/out/a.geojson",
            source: "/data/a.shp",
            projection_code: None,
            query: "",
            write_mode: WriteMode::Overwrite,
            extra_args: "",
        }
    }

    #[test]
    fn test_minimal_arguments() {
        assert_eq!(
            build_arguments(&base_spec()),
            r#"-f "GeoJSON" "/out/a.geojson" "/data/a.shp" -overwrite"#
        );
    }

    #[test]
    fn test_all_optional_flags_in_order() {
        let spec = CommandSpec {
            projection_code: Some(4326),
            query: "SELECT * FROM roads",
            write_mode: WriteMode::Append,
            extra_args: "-skipfailures",
            ..base_spec()
        };
        assert_eq!(
            build_arguments(&spec),
            r#"-f "GeoJSON" "/out/a.geojson" "/data/a.shp" -T_SRS EPSG:4326 -sql "SELECT * FROM roads" -append -skipfailures"#
        );
    }

    #[test]
    fn test_optional_flags_absent_when_fields_empty() {
        let line = build_arguments(&base_spec());
        assert!(!line.contains("-T_SRS"));
        assert!(!line.contains("-sql"));
    }

    #[test]
    fn test_write_mode_flags() {
        for (mode, flag) in [
            (WriteMode::Overwrite, "-overwrite"),
            (WriteMode::Append, "-append"),
            (WriteMode::Update, "-update"),
        ] {
            let spec = CommandSpec {
                write_mode: mode,
                ..base_spec()
            };
            assert!(build_arguments(&spec).ends_with(flag));
        }
    }

    #[test]
    fn test_backslashes_normalized_across_whole_string() {
        let spec = CommandSpec {
            target_location: r"C:\out\a.geojson",
            source: r"C:\data\a.shp",
            extra_args: r"-nln layer\name",
            ..base_spec()
        };
        let line = build_arguments(&spec);
        assert!(!line.contains('\\'));
        assert!(line.contains(r#""C:/out/a.geojson""#));
        assert!(line.contains("layer/name"));
    }

    #[test]
    fn test_sql_query_passes_through_verbatim() {
        let spec = CommandSpec {
            query: "SELECT * FROM t WHERE id>1",
            ..base_spec()
        };
        assert!(
            build_arguments(&spec).contains(r#"-sql "SELECT * FROM t WHERE id>1""#)
        );
    }

    // Known limitation: values are quote-wrapped but never escaped, so an
    // embedded double quote breaks the pairing and is emitted as-is.
    #[test]
    fn test_embedded_quotes_are_not_escaped() {
        let spec = CommandSpec {
            query: r#"SELECT * FROM t WHERE name="x""#,
            ..base_spec()
        };
        assert!(
            build_arguments(&spec).contains(r#"-sql "SELECT * FROM t WHERE name="x"""#)
        );
    }
}
