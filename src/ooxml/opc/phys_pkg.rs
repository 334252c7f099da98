//! Physical OPC package (ZIP archive) reading and writing.
//!
//! The reader decompresses every member eagerly, in archive order, so the
//! writer can emit the same member order back.

use std::io::{Cursor, Read, Write};

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::ooxml::opc::error::Result;

/// One decompressed ZIP member.
#[derive(Debug, Clone)]
pub struct Member {
    /// Member name as stored in the archive (no leading slash)
    pub name: String,
    pub data: Vec<u8>,
    /// Whether the member was stored without compression
    pub stored: bool,
}

/// Physical package reader over an in-memory ZIP archive.
pub struct PhysPkgReader;

impl PhysPkgReader {
    /// Read every file member of the archive, skipping directory entries.
    ///
    /// # Errors
    /// Returns an error if the bytes are not a valid ZIP archive or a member
    /// cannot be decompressed.
    pub fn read_members(data: &[u8]) -> Result<Vec<Member>> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut members = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            let stored = file.compression() == CompressionMethod::Stored;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;

            members.push(Member { name, data, stored });
        }

        Ok(members)
    }
}

/// Physical package writer producing an in-memory ZIP archive.
pub struct PhysPkgWriter {
    archive: ZipWriter<Cursor<Vec<u8>>>,
}

impl PhysPkgWriter {
    /// Create a new package writer that writes to memory.
    pub fn new() -> Self {
        Self {
            archive: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Write a member with Deflate compression.
    pub fn write(&mut self, name: &str, blob: &[u8]) -> Result<()> {
        self.write_with(name, blob, CompressionMethod::Deflated)
    }

    /// Write a member without compression.
    pub fn write_stored(&mut self, name: &str, blob: &[u8]) -> Result<()> {
        self.write_with(name, blob, CompressionMethod::Stored)
    }

    fn write_with(&mut self, name: &str, blob: &[u8], method: CompressionMethod) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(method);
        self.archive.start_file(name, options)?;
        self.archive.write_all(blob)?;
        Ok(())
    }

    /// Finish writing and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        Ok(self.archive.finish()?.into_inner())
    }
}

impl Default for PhysPkgWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut writer = PhysPkgWriter::new();
        writer.write("[Content_Types].xml", b"<Types/>").unwrap();
        writer.write_stored("xl/media/image1.png", b"\x89PNG").unwrap();
        writer.write("xl/workbook.xml", b"<workbook/>").unwrap();
        let zip_data = writer.finish().unwrap();

        let members = PhysPkgReader::read_members(&zip_data).unwrap();
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            ["[Content_Types].xml", "xl/media/image1.png", "xl/workbook.xml"]
        );
        assert!(members[1].stored);
        assert!(!members[2].stored);
        assert_eq!(members[2].data, b"<workbook/>");
    }

    #[test]
    fn test_rejects_non_zip() {
        assert!(PhysPkgReader::read_members(b"not a zip archive").is_err());
    }
}
