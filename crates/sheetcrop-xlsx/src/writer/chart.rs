//! Drawing and chart parts
//!
//! A sheet with charts gets one drawing part (`xl/drawings/drawingN.xml`)
//! holding an anchor per chart, and each chart its own chart part
//! (`xl/charts/chartK.xml`). Series data is written as literals (`numLit`,
//! `strLit`) so the package never depends on cells it does not contain.

use quick_xml::escape::escape;
use sheetcrop_core::{AnchorExtent, AnchorMarker, ChartKind, ChartSeries, SeriesData, SheetChart};

const CHART_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
const DRAWING_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub(crate) const DRAWING_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.drawing+xml";
pub(crate) const CHART_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";

/// `xl/worksheets/_rels/sheetN.xml.rels`: the sheet's link to its drawing
pub(crate) fn sheet_rels_xml(drawing: usize) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="{REL_NS}/drawing" Target="../drawings/drawing{drawing}.xml"/>
</Relationships>"#
    )
}

/// `xl/drawings/_rels/drawingN.xml.rels`: `rId<i+1>` points at `charts[i]`
pub(crate) fn drawing_rels_xml(chart_numbers: &[usize]) -> String {
    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (i, number) in chart_numbers.iter().enumerate() {
        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="{REL_NS}/chart" Target="../charts/chart{}.xml"/>"#,
            i + 1,
            number
        ));
    }
    content.push_str("\n</Relationships>");
    content
}

/// `xl/drawings/drawingN.xml`: one graphic frame per chart, in order
pub(crate) fn drawing_xml(charts: &[SheetChart]) -> String {
    let mut content = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="{DRAWING_NS}">"#
    );

    for (i, chart) in charts.iter().enumerate() {
        let frame = graphic_frame(chart, i);
        let from = marker_xml("from", &chart.anchor.from);
        match chart.anchor.extent {
            AnchorExtent::To(to) => content.push_str(&format!(
                "\n    <xdr:twoCellAnchor editAs=\"oneCell\">{}{}{}<xdr:clientData/></xdr:twoCellAnchor>",
                from,
                marker_xml("to", &to),
                frame
            )),
            AnchorExtent::Size { cx, cy } => content.push_str(&format!(
                "\n    <xdr:oneCellAnchor>{}<xdr:ext cx=\"{}\" cy=\"{}\"/>{}<xdr:clientData/></xdr:oneCellAnchor>",
                from,
                cx.max(0),
                cy.max(0),
                frame
            )),
        }
    }

    content.push_str("\n</xdr:wsDr>");
    content
}

fn marker_xml(tag: &str, marker: &AnchorMarker) -> String {
    format!(
        "<xdr:{tag}><xdr:col>{}</xdr:col><xdr:colOff>{}</xdr:colOff><xdr:row>{}</xdr:row><xdr:rowOff>{}</xdr:rowOff></xdr:{tag}>",
        marker.col,
        marker.col_offset_emu.max(0),
        marker.row,
        marker.row_offset_emu.max(0)
    )
}

fn graphic_frame(chart: &SheetChart, index: usize) -> String {
    let name = match chart.name.as_deref() {
        Some(name) => escape(name).into_owned(),
        None => format!("Chart {}", index + 1),
    };
    format!(
        concat!(
            "<xdr:graphicFrame macro=\"\">",
            "<xdr:nvGraphicFramePr><xdr:cNvPr id=\"{}\" name=\"{}\"/><xdr:cNvGraphicFramePr/></xdr:nvGraphicFramePr>",
            "<xdr:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/></xdr:xfrm>",
            "<a:graphic><a:graphicData uri=\"{chart_ns}\">",
            "<c:chart xmlns:c=\"{chart_ns}\" xmlns:r=\"{rel_ns}\" r:id=\"rId{}\"/>",
            "</a:graphicData></a:graphic></xdr:graphicFrame>"
        ),
        index + 2,
        name,
        index + 1,
        chart_ns = CHART_NS,
        rel_ns = REL_NS,
    )
}

/// `xl/charts/chartK.xml`. Series must already hold literal data; a
/// leftover reference is written as an empty series.
pub(crate) fn chart_xml(chart: &SheetChart) -> String {
    let mut content = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<c:chartSpace xmlns:c="{CHART_NS}" xmlns:a="{DRAWING_NS}" xmlns:r="{REL_NS}">
    <c:chart>"#
    );

    match chart.title.as_deref() {
        Some(title) => content.push_str(&format!(
            "\n        <c:title><c:tx><c:rich><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></c:rich></c:tx><c:overlay val=\"0\"/></c:title>\n        <c:autoTitleDeleted val=\"0\"/>",
            escape(title)
        )),
        None => content.push_str("\n        <c:autoTitleDeleted val=\"1\"/>"),
    }

    content.push_str("\n        <c:plotArea><c:layout/>");
    content.push_str(&plot_xml(chart));
    content.push_str("\n        </c:plotArea>");
    if chart.series.len() > 1 || chart.kind == ChartKind::Pie {
        content.push_str("\n        <c:legend><c:legendPos val=\"r\"/><c:overlay val=\"0\"/></c:legend>");
    }
    content.push_str("\n        <c:plotVisOnly val=\"1\"/>\n    </c:chart>\n</c:chartSpace>");
    content
}

// Axis ids shared by every plot in a chart part
const CATEGORY_AXIS: u32 = 500_000_001;
const VALUE_AXIS: u32 = 500_000_002;

fn plot_xml(chart: &SheetChart) -> String {
    let (element, head) = match chart.kind {
        ChartKind::Column => (
            "barChart",
            "<c:barDir val=\"col\"/><c:grouping val=\"clustered\"/><c:varyColors val=\"0\"/>",
        ),
        ChartKind::Bar => (
            "barChart",
            "<c:barDir val=\"bar\"/><c:grouping val=\"clustered\"/><c:varyColors val=\"0\"/>",
        ),
        ChartKind::Line => (
            "lineChart",
            "<c:grouping val=\"standard\"/><c:varyColors val=\"0\"/>",
        ),
        ChartKind::Area => (
            "areaChart",
            "<c:grouping val=\"standard\"/><c:varyColors val=\"0\"/>",
        ),
        ChartKind::Pie => ("pieChart", "<c:varyColors val=\"1\"/>"),
        ChartKind::Scatter => (
            "scatterChart",
            "<c:scatterStyle val=\"lineMarker\"/><c:varyColors val=\"0\"/>",
        ),
    };

    let mut content = format!("\n            <c:{element}>{head}");
    for (i, series) in chart.series.iter().enumerate() {
        content.push_str(&series_xml(chart.kind, series, i));
    }

    match chart.kind {
        ChartKind::Pie => content.push_str(&format!("\n            </c:{element}>")),
        ChartKind::Scatter => {
            content.push_str(&format!(
                "<c:axId val=\"{CATEGORY_AXIS}\"/><c:axId val=\"{VALUE_AXIS}\"/>\n            </c:{element}>"
            ));
            content.push_str(&axis_xml("valAx", CATEGORY_AXIS, "b", VALUE_AXIS));
            content.push_str(&axis_xml("valAx", VALUE_AXIS, "l", CATEGORY_AXIS));
        }
        kind => {
            let (cat_pos, val_pos) = if kind == ChartKind::Bar { ("l", "b") } else { ("b", "l") };
            content.push_str(&format!(
                "<c:axId val=\"{CATEGORY_AXIS}\"/><c:axId val=\"{VALUE_AXIS}\"/>\n            </c:{element}>"
            ));
            content.push_str(&axis_xml("catAx", CATEGORY_AXIS, cat_pos, VALUE_AXIS));
            content.push_str(&axis_xml("valAx", VALUE_AXIS, val_pos, CATEGORY_AXIS));
        }
    }
    content
}

fn axis_xml(element: &str, id: u32, position: &str, crosses: u32) -> String {
    format!(
        "\n            <c:{element}><c:axId val=\"{id}\"/><c:scaling><c:orientation val=\"minMax\"/></c:scaling><c:delete val=\"0\"/><c:axPos val=\"{position}\"/><c:crossAx val=\"{crosses}\"/></c:{element}>"
    )
}

fn series_xml(kind: ChartKind, series: &ChartSeries, index: usize) -> String {
    let mut content = format!(
        "\n                <c:ser><c:idx val=\"{index}\"/><c:order val=\"{index}\"/>"
    );
    if let Some(name) = series.name.as_deref() {
        content.push_str(&format!("<c:tx><c:v>{}</c:v></c:tx>", escape(name)));
    }

    let (cat_tag, val_tag) = if kind == ChartKind::Scatter {
        ("xVal", "yVal")
    } else {
        ("cat", "val")
    };
    if let Some(categories) = &series.categories {
        content.push_str(&format!("<c:{cat_tag}>{}</c:{cat_tag}>", literal_xml(categories)));
    }
    content.push_str(&format!(
        "<c:{val_tag}>{}</c:{val_tag}>",
        number_literal_xml(&numbers_of(&series.values))
    ));
    if kind == ChartKind::Scatter {
        content.push_str("<c:smooth val=\"0\"/>");
    }
    content.push_str("</c:ser>");
    content
}

/// Values plotted for a series; labels that do not parse become gaps
fn numbers_of(data: &SeriesData) -> Vec<Option<f64>> {
    match data {
        SeriesData::Numbers(values) => values.clone(),
        SeriesData::Strings(labels) => labels.iter().map(|l| l.trim().parse().ok()).collect(),
        SeriesData::Reference(_) => Vec::new(),
    }
}

fn literal_xml(data: &SeriesData) -> String {
    match data {
        SeriesData::Strings(labels) => {
            let mut content = format!("<c:strLit><c:ptCount val=\"{}\"/>", labels.len());
            for (i, label) in labels.iter().enumerate() {
                content.push_str(&format!(
                    "<c:pt idx=\"{}\"><c:v>{}</c:v></c:pt>",
                    i,
                    escape(label.as_str())
                ));
            }
            content.push_str("</c:strLit>");
            content
        }
        other => number_literal_xml(&numbers_of(other)),
    }
}

fn number_literal_xml(values: &[Option<f64>]) -> String {
    let mut content = format!(
        "<c:numLit><c:formatCode>General</c:formatCode><c:ptCount val=\"{}\"/>",
        values.len()
    );
    for (i, value) in values.iter().enumerate() {
        // Gaps and non-finite numbers are left out; ptCount keeps their slot
        if let Some(v) = value.filter(|v| v.is_finite()) {
            content.push_str(&format!("<c:pt idx=\"{i}\"><c:v>{v}</c:v></c:pt>"));
        }
    }
    content.push_str("</c:numLit>");
    content
}
