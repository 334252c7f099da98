//! Provides the PackURI value type and utilities for working with package URIs.
//!
//! A PackURI represents a part name within an OPC package, following the URI format
//! defined by the Open Packaging Conventions.

use std::fmt;

/// The `[Content_Types].xml` part name.
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

/// The package pseudo-partname.
pub const PACKAGE_URI: &str = "/";

/// Represents a package URI, which is a partname within an OPC package.
///
/// PackURIs always begin with a forward slash and use forward slashes as path separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackURI {
    uri: String,
}

impl PackURI {
    /// Create a new PackURI from a string that begins with a forward slash.
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackURI must begin with slash, got '{}'", uri));
        }
        Ok(PackURI { uri })
    }

    /// Create a PackURI from a ZIP member name (no leading slash).
    pub fn from_membername(name: &str) -> Self {
        PackURI {
            uri: format!("/{}", name.trim_start_matches('/')),
        }
    }

    /// Resolve a relative reference (like `worksheets/sheet1.xml`) against a base URI (like `/xl`).
    ///
    /// Absolute references (leading slash) ignore the base.
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        let joined = if relative_ref.starts_with('/') {
            relative_ref.to_string()
        } else if base_uri.ends_with('/') {
            format!("{}{}", base_uri, relative_ref)
        } else {
            format!("{}/{}", base_uri, relative_ref)
        };
        Self::new(Self::normalize_path(&joined))
    }

    /// Collapse `.` and `..` segments.
    fn normalize_path(path: &str) -> String {
        let mut segments: Vec<&str> = Vec::new();
        for segment in path.split('/') {
            match segment {
                "" | "." => {},
                ".." => {
                    segments.pop();
                },
                other => segments.push(other),
            }
        }
        format!("/{}", segments.join("/"))
    }

    /// The full URI string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Directory portion, e.g. `/xl/worksheets` for `/xl/worksheets/sheet1.xml`.
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// File name portion, e.g. `sheet1.xml`.
    pub fn filename(&self) -> &str {
        match self.uri.rfind('/') {
            Some(pos) => &self.uri[pos + 1..],
            None => "",
        }
    }

    /// ZIP member name (URI without the leading slash).
    #[inline]
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// URI of the relationships part for this source, e.g. `/xl/_rels/workbook.xml.rels`.
    pub fn rels_uri(&self) -> Result<PackURI, String> {
        if self.uri == PACKAGE_URI {
            return PackURI::new("/_rels/.rels");
        }
        let base = self.base_uri();
        let sep = if base == "/" { "" } else { "/" };
        PackURI::new(format!("{}{}_rels/{}.rels", base, sep, self.filename()))
    }

    /// Relative reference from `base_uri` to this part, as written in a `.rels` target.
    pub fn relative_ref(&self, base_uri: &str) -> String {
        let base = base_uri.trim_end_matches('/');
        if base.is_empty() {
            return self.membername().to_string();
        }
        match self.uri.strip_prefix(base).and_then(|rest| rest.strip_prefix('/')) {
            Some(rest) => rest.to_string(),
            None => self.uri.clone(),
        }
    }
}

impl fmt::Display for PackURI {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}
