//! Objects that implement reading and writing OPC packages.
//!
//! An [`OpcPackage`] holds every part of the archive as raw bytes, in the
//! order the archive stored them. Parts nobody touches are written back
//! unchanged.

use std::path::Path;

use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::content_types::ContentTypes;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::{PhysPkgReader, PhysPkgWriter};
use crate::ooxml::opc::rel::Relationships;

/// A part held by the package.
#[derive(Debug, Clone)]
struct PackagePart {
    uri: PackURI,
    blob: Vec<u8>,
    stored: bool,
}

/// An OPC package loaded into memory.
#[derive(Debug, Clone)]
pub struct OpcPackage {
    parts: Vec<PackagePart>,
}

impl OpcPackage {
    /// Open a package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OpcError::PackageNotFound(path.display().to_string()));
        }
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Load a package from ZIP bytes.
    ///
    /// # Errors
    /// Fails when the bytes are not a ZIP archive or the archive has no
    /// `[Content_Types].xml`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let parts: Vec<PackagePart> = PhysPkgReader::read_members(data)?
            .into_iter()
            .map(|member| PackagePart {
                uri: PackURI::from_membername(&member.name),
                blob: member.data,
                stored: member.stored,
            })
            .collect();

        let package = Self { parts };
        if !package.contains_str(CONTENT_TYPES_URI) {
            return Err(OpcError::PartNotFound(CONTENT_TYPES_URI.to_string()));
        }
        Ok(package)
    }

    fn contains_str(&self, uri: &str) -> bool {
        self.parts.iter().any(|p| p.uri.as_str() == uri)
    }

    /// Whether a part exists.
    pub fn contains(&self, uri: &PackURI) -> bool {
        self.contains_str(uri.as_str())
    }

    /// Raw bytes of a part.
    pub fn part(&self, uri: &PackURI) -> Result<&[u8]> {
        self.parts
            .iter()
            .find(|p| &p.uri == uri)
            .map(|p| p.blob.as_slice())
            .ok_or_else(|| OpcError::PartNotFound(uri.to_string()))
    }

    /// Replace a part's bytes, appending the part when it does not exist yet.
    pub fn set_part(&mut self, uri: &PackURI, blob: Vec<u8>) {
        match self.parts.iter_mut().find(|p| &p.uri == uri) {
            Some(part) => part.blob = blob,
            None => self.parts.push(PackagePart {
                uri: uri.clone(),
                blob,
                stored: false,
            }),
        }
    }

    /// Remove a part. Returns whether it existed.
    pub fn remove_part(&mut self, uri: &PackURI) -> bool {
        let before = self.parts.len();
        self.parts.retain(|p| &p.uri != uri);
        self.parts.len() != before
    }

    /// Part names in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &PackURI> {
        self.parts.iter().map(|p| &p.uri)
    }

    /// Parsed `[Content_Types].xml`.
    pub fn content_types(&self) -> Result<ContentTypes> {
        let uri = PackURI::new(CONTENT_TYPES_URI).map_err(OpcError::InvalidPackUri)?;
        ContentTypes::parse(self.part(&uri)?)
    }

    pub fn set_content_types(&mut self, types: &ContentTypes) -> Result<()> {
        let uri = PackURI::new(CONTENT_TYPES_URI).map_err(OpcError::InvalidPackUri)?;
        self.set_part(&uri, types.to_xml().into_bytes());
        Ok(())
    }

    /// Relationships whose source is `source`; empty when the source has no `.rels` part.
    pub fn rels_for(&self, source: &PackURI) -> Result<Relationships> {
        let rels_uri = source.rels_uri().map_err(OpcError::InvalidPackUri)?;
        match self.part(&rels_uri) {
            Ok(xml) => Relationships::parse(xml, source.base_uri()),
            Err(OpcError::PartNotFound(_)) => Ok(Relationships::new(source.base_uri())),
            Err(e) => Err(e),
        }
    }

    pub fn set_rels_for(&mut self, source: &PackURI, rels: &Relationships) -> Result<()> {
        let rels_uri = source.rels_uri().map_err(OpcError::InvalidPackUri)?;
        self.set_part(&rels_uri, rels.to_xml().into_bytes());
        Ok(())
    }

    /// Part name of the main document (`xl/workbook.xml` for spreadsheets).
    pub fn main_document_uri(&self) -> Result<PackURI> {
        let package = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let rels = self.rels_for(&package)?;
        let rel = rels
            .by_reltype(rt::OFFICE_DOCUMENT)
            .ok_or_else(|| OpcError::RelationshipNotFound(rt::OFFICE_DOCUMENT.to_string()))?;
        rels.target_partname(rel)
    }

    /// Serialize the package, keeping part order and per-part compression.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = PhysPkgWriter::new();
        for part in &self.parts {
            if part.stored {
                writer.write_stored(part.uri.membername(), &part.blob)?;
            } else {
                writer.write(part.uri.membername(), &part.blob)?;
            }
        }
        writer.finish()
    }
}
