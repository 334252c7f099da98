//! Excel workbook backed by an in-memory OPC package.
//!
//! Worksheets are parsed on demand into [`Sheet`] grids and written back one
//! at a time. Rows inserted into a worksheet also move the defined names and
//! tables pointing at it. Parts the workbook never touches (styles, themes,
//! drawings, printer settings, ...) are carried through byte-for-byte.

use std::collections::BTreeMap;
use std::path::Path;

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::{OpcError, OpcPackage, PackURI};
use crate::sheet::{RowInsertion, Sheet};

use super::parsers::{parse_workbook_xml, parse_worksheet_xml};
use super::shared_strings::SharedStrings;
use super::writer::{write_defined_names, write_shared_strings, write_table, write_worksheet};

const DEFAULT_SHARED_STRINGS_URI: &str = "/xl/sharedStrings.xml";

/// Location of one worksheet inside the package.
#[derive(Debug, Clone)]
struct WorksheetInfo {
    name: String,
    sheet_id: u32,
    part: PackURI,
}

/// An Excel (.xlsx) workbook.
#[derive(Debug, Clone)]
pub struct Workbook {
    /// The underlying OPC package
    package: OpcPackage,
    workbook_uri: PackURI,
    worksheets: Vec<WorksheetInfo>,
    /// Shared strings table for efficient string storage
    shared_strings: SharedStrings,
    shared_strings_uri: Option<PackURI>,
    /// Set once any worksheet has been written back
    modified: bool,
    /// Row insertions of each written-back worksheet, by index
    insertions: BTreeMap<usize, Vec<RowInsertion>>,
}

impl Workbook {
    /// Open a workbook from a file path.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sheetfill::ooxml::xlsx::Workbook;
    ///
    /// let workbook = Workbook::open("plantilla.xlsx")?;
    /// for name in workbook.sheet_names() {
    ///     println!("{}", name);
    /// }
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let package = OpcPackage::open(path)?;
        Self::from_package(package)
    }

    /// Load a workbook from `.xlsx` bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let package = OpcPackage::from_bytes(data)?;
        Self::from_package(package)
    }

    fn from_package(package: OpcPackage) -> Result<Self> {
        let workbook_uri = package.main_document_uri()?;
        let workbook_xml = std::str::from_utf8(package.part(&workbook_uri)?)?;
        let rels = package.rels_for(&workbook_uri)?;

        let mut worksheets = Vec::new();
        for entry in parse_workbook_xml(workbook_xml)? {
            let rel = rels
                .get(&entry.relationship_id)
                .ok_or_else(|| OpcError::RelationshipNotFound(entry.relationship_id.clone()))?;
            // Chartsheets and dialog sheets are listed too but hold no cell grid
            if rel.reltype() != rt::WORKSHEET {
                log::debug!("skipping non-worksheet sheet '{}'", entry.name);
                continue;
            }
            worksheets.push(WorksheetInfo {
                name: entry.name,
                sheet_id: entry.sheet_id,
                part: rels.target_partname(rel)?,
            });
        }

        let (shared_strings, shared_strings_uri) = match rels.by_reltype(rt::SHARED_STRINGS) {
            Some(rel) => {
                let uri = rels.target_partname(rel)?;
                let sst = SharedStrings::parse(std::str::from_utf8(package.part(&uri)?)?)?;
                (sst, Some(uri))
            },
            None => (SharedStrings::new(), None),
        };

        log::debug!(
            "loaded workbook {} with {} worksheets and {} shared strings",
            workbook_uri,
            worksheets.len(),
            shared_strings.len()
        );

        Ok(Self {
            package,
            workbook_uri,
            worksheets,
            shared_strings,
            shared_strings_uri,
            modified: false,
            insertions: BTreeMap::new(),
        })
    }

    /// Worksheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.worksheets.iter().map(|ws| ws.name.as_str()).collect()
    }

    /// Number of worksheets.
    pub fn worksheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Index of the worksheet called `name`.
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.worksheets.iter().position(|ws| ws.name == name)
    }

    /// `sheetId` of the worksheet at `index`.
    pub fn sheet_id(&self, index: usize) -> Option<u32> {
        self.worksheets.get(index).map(|ws| ws.sheet_id)
    }

    pub fn shared_strings(&self) -> &SharedStrings {
        &self.shared_strings
    }

    fn info(&self, index: usize) -> Result<&WorksheetInfo> {
        self.worksheets
            .get(index)
            .ok_or_else(|| OoxmlError::SheetNotFound(format!("index {}", index)))
    }

    /// Parse the worksheet at `index` into a grid.
    pub fn worksheet(&self, index: usize) -> Result<Sheet> {
        let info = self.info(index)?;
        let xml = std::str::from_utf8(self.package.part(&info.part)?)?;
        parse_worksheet_xml(&info.name, xml, &self.shared_strings)
    }

    /// Write `sheet` back as the worksheet at `index`.
    ///
    /// New text is interned into the shared strings table, which is
    /// serialized by [`Workbook::to_bytes`] along with the defined names and
    /// tables that refer to the sheet's rows.
    pub fn set_worksheet(&mut self, index: usize, sheet: &Sheet) -> Result<()> {
        let part = self.info(index)?.part.clone();
        let original = std::str::from_utf8(self.package.part(&part)?)?;
        let xml = write_worksheet(original, sheet, &mut self.shared_strings)?;
        self.package.set_part(&part, xml.into_bytes());
        self.modified = true;

        if sheet.insertions().is_empty() {
            self.insertions.remove(&index);
        } else {
            self.insertions.insert(index, sheet.insertions().to_vec());
        }
        Ok(())
    }

    /// Shift the references held outside the worksheet at `index`: defined
    /// names qualified with its name and the tables it owns.
    fn shift_sheet_references(
        &self,
        package: &mut OpcPackage,
        index: usize,
        insertions: &[RowInsertion],
    ) -> Result<()> {
        let info = self.info(index)?;

        let workbook_xml = std::str::from_utf8(package.part(&self.workbook_uri)?)?;
        if memchr::memmem::find(workbook_xml.as_bytes(), b"definedName").is_some() {
            let xml = write_defined_names(workbook_xml, &info.name, insertions)?;
            package.set_part(&self.workbook_uri, xml.into_bytes());
        }

        let rels = package.rels_for(&info.part)?;
        for rel in rels.iter().filter(|rel| rel.reltype() == rt::TABLE && !rel.is_external()) {
            let uri = rels.target_partname(rel)?;
            let xml = write_table(std::str::from_utf8(package.part(&uri)?)?, insertions)?;
            log::debug!("shifted table {} of sheet '{}'", uri, info.name);
            package.set_part(&uri, xml.into_bytes());
        }

        Ok(())
    }

    /// Serialize the workbook to `.xlsx` bytes.
    ///
    /// When a worksheet was written back, the shared strings part is
    /// regenerated (created when the template had none), defined names and
    /// tables follow the worksheet's inserted rows, and the calculation chain
    /// is dropped so Excel rebuilds it.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if !self.modified {
            return Ok(self.package.to_bytes()?);
        }

        let mut package = self.package.clone();
        let mut rels = package.rels_for(&self.workbook_uri)?;
        let mut content_types = package.content_types()?;

        if !self.shared_strings.is_empty() || self.shared_strings_uri.is_some() {
            let uri = match &self.shared_strings_uri {
                Some(uri) => uri.clone(),
                None => {
                    let uri = PackURI::new(DEFAULT_SHARED_STRINGS_URI)
                        .map_err(OpcError::InvalidPackUri)?;
                    rels.get_or_add(rt::SHARED_STRINGS, &uri);
                    content_types.set_override(&uri, ct::SML_SHARED_STRINGS);
                    uri
                },
            };
            package.set_part(&uri, write_shared_strings(&self.shared_strings)?.into_bytes());
        }

        for (&index, insertions) in &self.insertions {
            self.shift_sheet_references(&mut package, index, insertions)?;
        }

        if let Some(rel) = rels.by_reltype(rt::CALC_CHAIN) {
            let uri = rels.target_partname(rel)?;
            log::debug!("dropping calculation chain {}", uri);
            package.remove_part(&uri);
            content_types.remove_override(&uri);
            rels.remove_by_reltype(rt::CALC_CHAIN);
        }

        package.set_rels_for(&self.workbook_uri, &rels)?;
        package.set_content_types(&content_types)?;

        Ok(package.to_bytes()?)
    }

    /// Save the workbook to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::phys_pkg::PhysPkgWriter;
    use crate::sheet::Cell;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/calcChain.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.calcChain+xml"/></Types>"#;

    const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Hoja1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/calcChain" Target="calcChain.xml"/></Relationships>"#;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><dimension ref="A1"/><sheetData><row r="1"><c r="A1"><v>7</v></c></row></sheetData></worksheet>"#;

    /// A workbook without a shared strings part but with a calc chain.
    fn package_bytes() -> Vec<u8> {
        let mut writer = PhysPkgWriter::new();
        writer.write("[Content_Types].xml", CONTENT_TYPES.as_bytes()).unwrap();
        writer.write("_rels/.rels", ROOT_RELS.as_bytes()).unwrap();
        writer.write("xl/workbook.xml", WORKBOOK.as_bytes()).unwrap();
        writer.write("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()).unwrap();
        writer.write("xl/worksheets/sheet1.xml", SHEET.as_bytes()).unwrap();
        writer.write("xl/calcChain.xml", b"<calcChain/>").unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn test_load_sheets() {
        let workbook = Workbook::from_bytes(&package_bytes()).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Hoja1"]);
        assert_eq!(workbook.sheet_index("Hoja1"), Some(0));
        assert_eq!(workbook.sheet_index("Hoja2"), None);
        assert!(workbook.shared_strings().is_empty());

        let sheet = workbook.worksheet(0).unwrap();
        assert_eq!(sheet.cell(0, 0).unwrap().as_text(), None);
        assert!(workbook.worksheet(1).is_err());
    }

    #[test]
    fn test_save_creates_shared_strings_and_drops_calc_chain() {
        let mut workbook = Workbook::from_bytes(&package_bytes()).unwrap();
        let mut sheet = workbook.worksheet(0).unwrap();
        sheet.set_cell(1, 0, Cell::text("Hola"));
        workbook.set_worksheet(0, &sheet).unwrap();

        let bytes = workbook.to_bytes().unwrap();
        let package = OpcPackage::from_bytes(&bytes).unwrap();

        let sst_uri = PackURI::new("/xl/sharedStrings.xml").unwrap();
        let calc_uri = PackURI::new("/xl/calcChain.xml").unwrap();
        assert!(package.contains(&sst_uri));
        assert!(!package.contains(&calc_uri));

        let types = package.content_types().unwrap();
        assert_eq!(types.content_type(&sst_uri), Some(ct::SML_SHARED_STRINGS));
        assert_eq!(types.content_type(&calc_uri), Some("application/xml"));

        let reloaded = Workbook::from_bytes(&bytes).unwrap();
        assert_eq!(reloaded.shared_strings().get(0), Some("Hola"));
        assert_eq!(
            reloaded.worksheet(0).unwrap().cell(1, 0).unwrap().as_text(),
            Some("Hola")
        );
    }

    const NAMED_WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Hoja1" sheetId="1" r:id="rId1"/></sheets><definedNames><definedName name="_xlnm._FilterDatabase" localSheetId="0" hidden="1">Hoja1!$A$3:$C$4</definedName><definedName name="_xlnm.Print_Area" localSheetId="0">Hoja1!$A$1:$D$6</definedName><definedName name="Umbral">Hoja1!$E$1&gt;0</definedName></definedNames></workbook>"#;

    const SHEET_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/table" Target="../tables/table1.xml"/></Relationships>"#;

    const TABLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<table xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" id="1" name="Lineas" displayName="Lineas" ref="A3:C4"><autoFilter ref="A3:C4"/><tableColumns count="3"><tableColumn id="1" name="Cant."/><tableColumn id="2" name="Descripción"/><tableColumn id="3" name="Ref."/></tableColumns></table>"#;

    /// A workbook with defined names on its sheet and a table over rows 3-4.
    fn named_package_bytes() -> Vec<u8> {
        let mut writer = PhysPkgWriter::new();
        writer.write("[Content_Types].xml", CONTENT_TYPES.as_bytes()).unwrap();
        writer.write("_rels/.rels", ROOT_RELS.as_bytes()).unwrap();
        writer.write("xl/workbook.xml", NAMED_WORKBOOK.as_bytes()).unwrap();
        writer.write("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()).unwrap();
        writer.write("xl/worksheets/sheet1.xml", SHEET.as_bytes()).unwrap();
        writer.write("xl/worksheets/_rels/sheet1.xml.rels", SHEET_RELS.as_bytes()).unwrap();
        writer.write("xl/tables/table1.xml", TABLE.as_bytes()).unwrap();
        writer.write("xl/calcChain.xml", b"<calcChain/>").unwrap();
        writer.finish().unwrap()
    }

    fn part_text(package: &OpcPackage, uri: &str) -> String {
        let uri = PackURI::new(uri).unwrap();
        String::from_utf8(package.part(&uri).unwrap().to_vec()).unwrap()
    }

    #[test]
    fn test_inserted_rows_shift_defined_names() {
        let mut workbook = Workbook::from_bytes(&named_package_bytes()).unwrap();
        let mut sheet = workbook.worksheet(0).unwrap();
        sheet.insert_row(3);
        sheet.insert_row(4);
        workbook.set_worksheet(0, &sheet).unwrap();

        let bytes = workbook.to_bytes().unwrap();
        let xml = part_text(&OpcPackage::from_bytes(&bytes).unwrap(), "/xl/workbook.xml");
        assert!(xml.contains(r#"hidden="1">Hoja1!$A$3:$C$6</definedName>"#));
        assert!(xml.contains(r#"localSheetId="0">Hoja1!$A$1:$D$8</definedName>"#));
        assert!(xml.contains(">Hoja1!$E$1&gt;0</definedName>"));

        // Shifting starts from the template parts every time
        let again = OpcPackage::from_bytes(&workbook.to_bytes().unwrap()).unwrap();
        assert_eq!(part_text(&again, "/xl/workbook.xml"), xml);
    }

    #[test]
    fn test_inserted_rows_shift_tables() {
        let mut workbook = Workbook::from_bytes(&named_package_bytes()).unwrap();
        let mut sheet = workbook.worksheet(0).unwrap();
        sheet.insert_row(3);
        workbook.set_worksheet(0, &sheet).unwrap();

        let package = OpcPackage::from_bytes(&workbook.to_bytes().unwrap()).unwrap();
        let table = part_text(&package, "/xl/tables/table1.xml");
        assert!(table.contains(r#"displayName="Lineas" ref="A3:C5">"#));
        assert!(table.contains(r#"<autoFilter ref="A3:C5"/>"#));
        assert!(table.contains(r#"<tableColumn id="2" name="Descripción"/>"#));
    }

    #[test]
    fn test_unshifted_sheet_keeps_workbook_part() {
        let mut workbook = Workbook::from_bytes(&named_package_bytes()).unwrap();
        let sheet = workbook.worksheet(0).unwrap();
        workbook.set_worksheet(0, &sheet).unwrap();

        let package = OpcPackage::from_bytes(&workbook.to_bytes().unwrap()).unwrap();
        assert_eq!(part_text(&package, "/xl/workbook.xml"), NAMED_WORKBOOK);
        assert_eq!(part_text(&package, "/xl/tables/table1.xml"), TABLE);
    }

    #[test]
    fn test_untouched_workbook_round_trips_parts() {
        let workbook = Workbook::from_bytes(&package_bytes()).unwrap();
        let package = OpcPackage::from_bytes(&workbook.to_bytes().unwrap()).unwrap();
        let calc_uri = PackURI::new("/xl/calcChain.xml").unwrap();
        assert_eq!(package.part(&calc_uri).unwrap(), b"<calcChain/>");
    }
}
