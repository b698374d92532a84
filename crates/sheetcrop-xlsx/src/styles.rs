//! styles.xml generation

use std::collections::HashMap;

use quick_xml::escape::escape;
use sheetcrop_core::style::{
    Alignment, BorderEdge, BorderStyle, Color, FillStyle, FontStyle, NumberFormat, PatternType,
    Style,
};
use sheetcrop_core::Worksheet;

/// Package-wide style table
///
/// Each worksheet interns styles in its own pool; the package has a single
/// `cellXfs` list. This maps every (sheet, local index) to its xf id.
#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    /// Deduplicated styles, index = cellXfs index
    styles: Vec<Style>,
    /// Per written sheet: local style index -> xf id
    sheet_maps: Vec<HashMap<u32, u32>>,
}

#[derive(Debug, Clone, Copy)]
struct ResolvedXfIds {
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    num_fmt_id: u32,
}

impl XlsxStyleTable {
    pub(crate) fn build(sheets: &[&Worksheet]) -> Self {
        let mut styles = vec![Style::default()];
        let mut style_to_xf: HashMap<Style, u32> = HashMap::new();
        style_to_xf.insert(Style::default(), 0);

        let mut sheet_maps = Vec::with_capacity(sheets.len());

        for sheet in sheets {
            let mut map: HashMap<u32, u32> = HashMap::new();
            map.insert(0, 0);

            for (_row, _col, cell) in sheet.iter_cells() {
                let local_idx = cell.style_index;
                if map.contains_key(&local_idx) {
                    continue;
                }

                let style = sheet.style_by_index(local_idx).cloned().unwrap_or_default();
                let xf_id = *style_to_xf.entry(style.clone()).or_insert_with(|| {
                    styles.push(style);
                    (styles.len() - 1) as u32
                });

                map.insert(local_idx, xf_id);
            }

            sheet_maps.push(map);
        }

        Self { styles, sheet_maps }
    }

    pub(crate) fn xf_id_for(&self, sheet_position: usize, local_style_index: u32) -> u32 {
        self.sheet_maps
            .get(sheet_position)
            .and_then(|m| m.get(&local_style_index).copied())
            .unwrap_or(0)
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut fonts = Interner::new(FontStyle::default());
        // The first two fills are reserved: none and gray125
        let mut fills = Interner::new(FillStyle::None);
        fills.insert(FillStyle::Pattern {
            pattern: PatternType::Gray125,
            foreground: Color::Auto,
            background: Color::Auto,
        });
        let mut borders = Interner::new(BorderStyle::default());

        let mut numfmts: Vec<(u32, String)> = Vec::new();
        let mut numfmt_ids: HashMap<String, u32> = HashMap::new();

        let resolved: Vec<ResolvedXfIds> = self
            .styles
            .iter()
            .map(|style| {
                let num_fmt_id = match style.number_format.builtin_id() {
                    Some(id) => id,
                    None => {
                        let code = style.number_format.format_string().to_string();
                        *numfmt_ids.entry(code.clone()).or_insert_with(|| {
                            let id = NumberFormat::FIRST_CUSTOM_ID + numfmts.len() as u32;
                            numfmts.push((id, code));
                            id
                        })
                    }
                };

                ResolvedXfIds {
                    font_id: fonts.insert(style.font.clone()),
                    fill_id: fills.insert(style.fill),
                    border_id: borders.insert(style.border),
                    num_fmt_id,
                }
            })
            .collect();

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !numfmts.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", numfmts.len()));
            for (id, code) in &numfmts {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape(code.as_str())
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        push_list(&mut xml, "fonts", &fonts.items, write_font);
        push_list(&mut xml, "fills", &fills.items, write_fill);
        push_list(&mut xml, "borders", &borders.items, write_border);

        xml.push_str(
            r#"
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", self.styles.len()));
        for (style, ids) in self.styles.iter().zip(&resolved) {
            xml.push_str("\n    ");
            xml.push_str(&write_xf(style, *ids));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
</styleSheet>"#,
        );
        xml
    }
}

/// Ordered, deduplicated list of style components
struct Interner<T> {
    items: Vec<T>,
    ids: HashMap<T, u32>,
}

impl<T: Clone + Eq + std::hash::Hash> Interner<T> {
    fn new(first: T) -> Self {
        let mut interner = Self {
            items: Vec::new(),
            ids: HashMap::new(),
        };
        interner.insert(first);
        interner
    }

    fn insert(&mut self, item: T) -> u32 {
        if let Some(&id) = self.ids.get(&item) {
            return id;
        }
        let id = self.items.len() as u32;
        self.ids.insert(item.clone(), id);
        self.items.push(item);
        id
    }
}

fn push_list<T>(xml: &mut String, tag: &str, items: &[T], write: fn(&T) -> String) {
    xml.push_str(&format!("\n  <{} count=\"{}\">", tag, items.len()));
    for item in items {
        xml.push_str("\n    ");
        xml.push_str(&write(item));
    }
    xml.push_str(&format!("\n  </{}>", tag));
}

fn write_color(tag: &str, color: &Color) -> String {
    format!("<{} {}/>", tag, color.xml_attributes())
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    if font.strikethrough {
        s.push_str("<strike/>");
    }
    match font.underline.xml_value() {
        Some("single") => s.push_str("<u/>"),
        Some(val) => s.push_str(&format!("<u val=\"{}\"/>", val)),
        None => {}
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if font.color != Color::Auto {
        s.push_str(&write_color("color", &font.color));
    }
    s.push_str(&format!("<name val=\"{}\"/>", escape(font.name.as_str())));
    s.push_str("</font>");
    s
}

fn write_fill(fill: &FillStyle) -> String {
    match fill {
        FillStyle::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        FillStyle::Solid { color } => format!(
            "<fill><patternFill patternType=\"solid\">{}<bgColor indexed=\"64\"/></patternFill></fill>",
            write_color("fgColor", color)
        ),
        FillStyle::Pattern {
            pattern,
            foreground,
            background,
        } => format!(
            "<fill><patternFill patternType=\"{}\">{}{}</patternFill></fill>",
            pattern.xml_value(),
            write_color("fgColor", foreground),
            write_color("bgColor", background)
        ),
    }
}

fn write_border_edge(tag: &str, edge: &Option<BorderEdge>) -> String {
    match edge {
        Some(e) if e.style != sheetcrop_core::BorderLineStyle::None => format!(
            "<{tag} style=\"{}\">{}</{tag}>",
            e.style.xml_value(),
            write_color("color", &e.color)
        ),
        _ => format!("<{tag}/>"),
    }
}

fn write_border(border: &BorderStyle) -> String {
    format!(
        "<border>{}{}{}{}<diagonal/></border>",
        write_border_edge("left", &border.left),
        write_border_edge("right", &border.right),
        write_border_edge("top", &border.top),
        write_border_edge("bottom", &border.bottom)
    )
}

fn write_alignment(al: &Alignment) -> Option<String> {
    if al.is_default() {
        return None;
    }

    let default = Alignment::default();
    let mut s = String::from("<alignment");
    if al.horizontal != default.horizontal {
        s.push_str(&format!(" horizontal=\"{}\"", al.horizontal.xml_value()));
    }
    if al.vertical != default.vertical {
        s.push_str(&format!(" vertical=\"{}\"", al.vertical.xml_value()));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    if al.shrink_to_fit {
        s.push_str(" shrinkToFit=\"1\"");
    }
    if al.indent != 0 {
        s.push_str(&format!(" indent=\"{}\"", al.indent));
    }
    if al.rotation != 0 {
        s.push_str(&format!(" textRotation=\"{}\"", al.rotation));
    }
    s.push_str("/>");
    Some(s)
}

fn write_xf(style: &Style, ids: ResolvedXfIds) -> String {
    let mut attrs = String::new();
    if ids.num_fmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if style.font != FontStyle::default() {
        attrs.push_str(" applyFont=\"1\"");
    }
    if !style.fill.is_none() {
        attrs.push_str(" applyFill=\"1\"");
    }
    if !style.border.is_empty() {
        attrs.push_str(" applyBorder=\"1\"");
    }
    if !style.alignment.is_default() {
        attrs.push_str(" applyAlignment=\"1\"");
    }

    let xf = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"{}",
        ids.num_fmt_id, ids.font_id, ids.fill_id, ids.border_id, attrs
    );

    match write_alignment(&style.alignment) {
        Some(alignment) => format!("{}>{}</xf>", xf, alignment),
        None => format!("{}/>", xf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcrop_core::{BorderLineStyle, HorizontalAlignment};

    #[test]
    fn test_style_table_shares_xfs_across_sheets() {
        let bold = Style::new().bold(true);

        let mut a = Worksheet::new("A");
        a.set_cell_style_at(0, 0, &Style::new().italic(true)).unwrap();
        a.set_cell_style_at(0, 1, &bold).unwrap();
        let mut b = Worksheet::new("B");
        b.set_cell_style_at(0, 0, &bold).unwrap();

        let table = XlsxStyleTable::build(&[&a, &b]);
        let bold_in_a = table.xf_id_for(0, a.cell_style_index_at(0, 1));
        let bold_in_b = table.xf_id_for(1, b.cell_style_index_at(0, 0));

        assert_eq!(bold_in_a, bold_in_b);
        assert_ne!(bold_in_a, 0);
        assert_eq!(table.xf_id_for(1, 0), 0);
    }

    #[test]
    fn test_styles_xml_components() {
        let mut sheet = Worksheet::new("S");
        let style = Style::new()
            .fill_color(Color::YELLOW)
            .border_all(BorderLineStyle::Thin, Color::BLACK)
            .number_format("0.000")
            .horizontal_alignment(HorizontalAlignment::Center);
        sheet.set_cell_style_at(0, 0, &style).unwrap();

        let xml = XlsxStyleTable::build(&[&sheet]).to_styles_xml();

        assert!(xml.contains(r#"<numFmt numFmtId="164" formatCode="0.000"/>"#));
        assert!(xml.contains(r#"<fgColor rgb="FFFFFF00"/>"#));
        assert!(xml.contains(r#"<left style="thin"><color rgb="FF000000"/></left>"#));
        assert!(xml.contains(r#"<alignment horizontal="center"/>"#));
        assert!(xml.contains(r#"<cellXfs count="2">"#));
        assert!(xml.contains(r#"<fills count="3">"#));
    }

    #[test]
    fn test_font_name_is_escaped() {
        let font = FontStyle::new().with_name("A&B");
        assert!(write_font(&font).contains(r#"<name val="A&amp;B"/>"#));
    }
}
