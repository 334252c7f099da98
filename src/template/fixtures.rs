//! In-memory `.xlsx` packages for tests.

use std::fmt::Write as _;

use crate::ooxml::opc::phys_pkg::PhysPkgWriter;

pub(crate) const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="1"><fill><patternFill patternType="none"/></fill></fills><borders count="1"><border/></borders><cellXfs count="9"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellXfs></styleSheet>"#;

/// A worksheet: its name and the XML between `<worksheet>` and `</worksheet>`.
pub(crate) struct FixtureSheet<'a> {
    pub name: &'a str,
    pub body: &'a str,
}

/// Build an `.xlsx` package. No shared strings part is written when `strings` is empty.
pub(crate) fn build_xlsx(sheets: &[FixtureSheet<'_>], strings: &[&str]) -> Vec<u8> {
    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    );
    let mut workbook = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );

    for (i, sheet) in sheets.iter().enumerate() {
        let n = i + 1;
        write!(
            content_types,
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        )
        .unwrap();
        write!(workbook, r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#, sheet.name).unwrap();
        write!(
            rels,
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        )
        .unwrap();
    }

    let styles_id = sheets.len() + 1;
    write!(
        rels,
        r#"<Relationship Id="rId{styles_id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#
    )
    .unwrap();

    let shared_strings = (!strings.is_empty()).then(|| {
        write!(
            content_types,
            r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#
        )
        .unwrap();
        write!(
            rels,
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
            styles_id + 1
        )
        .unwrap();

        let mut sst = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
            strings.len()
        );
        for s in strings {
            write!(sst, "<si><t>{}</t></si>", quick_xml::escape::escape(*s)).unwrap();
        }
        sst.push_str("</sst>");
        sst
    });

    content_types.push_str("</Types>");
    workbook.push_str("</sheets></workbook>");
    rels.push_str("</Relationships>");

    let mut writer = PhysPkgWriter::new();
    writer.write("[Content_Types].xml", content_types.as_bytes()).unwrap();
    writer
        .write(
            "_rels/.rels",
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
        )
        .unwrap();
    writer.write("xl/workbook.xml", workbook.as_bytes()).unwrap();
    writer.write("xl/_rels/workbook.xml.rels", rels.as_bytes()).unwrap();
    for (i, sheet) in sheets.iter().enumerate() {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">{}</worksheet>"#,
            sheet.body
        );
        writer
            .write(&format!("xl/worksheets/sheet{}.xml", i + 1), xml.as_bytes())
            .unwrap();
    }
    writer.write("xl/styles.xml", STYLES.as_bytes()).unwrap();
    if let Some(sst) = shared_strings {
        writer.write("xl/sharedStrings.xml", sst.as_bytes()).unwrap();
    }
    writer.finish().unwrap()
}

/// Shared strings of [`albaran`].
pub(crate) const ALBARAN_STRINGS: &[&str] = &[
    "Pedido: {num_pedido}",
    "Fecha: {fecha}",
    "{descripcion}",
    "{nsenv}",
    "Total",
    "Cliente: {cliente}",
];

/// Delivery note sheet: header rows 1-2, column titles on row 3, anchor on
/// row 4, an empty row 5 and the total on row 6.
pub(crate) const ALBARAN_SHEET: &str = r#"<dimension ref="A1:D6"/><sheetViews><sheetView workbookViewId="0"/></sheetViews><sheetFormatPr defaultRowHeight="15"/><sheetData><row r="1"><c r="A1" s="1" t="s"><v>0</v></c><c r="C1" t="s"><v>1</v></c></row><row r="2"><c r="A2" t="s"><v>5</v></c></row><row r="3"><c r="A3" s="2" t="inlineStr"><is><t>Cant.</t></is></c><c r="B3" s="2" t="inlineStr"><is><t>Descripción</t></is></c></row><row r="4" ht="20" customHeight="1"><c r="A4" s="3"/><c r="B4" s="4" t="s"><v>2</v></c><c r="C4" s="5" t="s"><v>3</v></c><c r="D4" s="6"><f>A4*2</f><v>0</v></c></row><row r="6"><c r="A6" s="7" t="s"><v>4</v></c><c r="D6" s="8"><f>SUM(D4:D4)</f><v>0</v></c></row></sheetData><mergeCells count="1"><mergeCell ref="A6:C6"/></mergeCells><pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#;

/// Second sheet that must come through untouched.
pub(crate) const NOTAS_SHEET: &str = r#"<dimension ref="A1"/><sheetData><row r="1"><c r="A1" t="s"><v>0</v></c></row></sheetData>"#;

/// The delivery note template with a notes sheet after it.
pub(crate) fn albaran() -> Vec<u8> {
    build_xlsx(
        &[
            FixtureSheet {
                name: "Albaran",
                body: ALBARAN_SHEET,
            },
            FixtureSheet {
                name: "Notas",
                body: NOTAS_SHEET,
            },
        ],
        ALBARAN_STRINGS,
    )
}
