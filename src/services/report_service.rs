//! Vehicle reports
//!
//! A printable HTML sheet and a PDF document per record, and a CSV export of
//! a record list.

use chrono::{DateTime, FixedOffset, Utc};
use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::models::vehicle::VehicleRecord;
use crate::services::duration::dwell_duration;

const EMPTY_CELL: &str = "–";
const DISPLAY_FORMAT: &str = "%b %d, %Y %H:%M";

/// Label/value rows shared by every report format
pub fn report_rows(record: &VehicleRecord, now: DateTime<Utc>, site: &FixedOffset) -> Vec<(&'static str, String)> {
    let local = |t: DateTime<Utc>| t.with_timezone(site).format(DISPLAY_FORMAT).to_string();
    let vehicle_no = if record.vehicle_no.trim().is_empty() {
        "N/A".to_string()
    } else {
        record.vehicle_no.clone()
    };

    vec![
        ("Vehicle No", vehicle_no),
        (
            "Container ID",
            record
                .container_id
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| EMPTY_CELL.to_string()),
        ),
        ("Type", record.vehicle_type.to_string()),
        (
            "Plant",
            record.plant.map(|p| p.to_string()).unwrap_or_else(|| "N/A".to_string()),
        ),
        ("In Time", local(record.in_time)),
        (
            "Out Time",
            record.out_time.map(local).unwrap_or_else(|| "Inside".to_string()),
        ),
        (
            "Duration",
            dwell_duration(record.in_time, record.out_time, now).to_string(),
        ),
        ("Status", record.status().label().to_string()),
    ]
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Standalone HTML page for the print dialog
pub fn render_print_report(record: &VehicleRecord, now: DateTime<Utc>, site: &FixedOffset) -> String {
    let rows: String = report_rows(record, now, site)
        .into_iter()
        .map(|(label, value)| format!("      <tr><th>{}</th><td>{}</td></tr>\n", label, escape_html(&value)))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Vehicle Report - {title}</title>
    <style>
      body {{ font-family: Arial, sans-serif; padding: 20px; }}
      h2 {{ color: #2E7D32; }}
      table {{ width: 100%; border-collapse: collapse; margin-top: 20px; }}
      td, th {{ border: 1px solid #ddd; padding: 8px; }}
      th {{ background-color: #2E7D32; color: white; text-align: left; }}
    </style>
  </head>
  <body onload="window.print()">
    <h2>Vehicle Report</h2>
    <table>
{rows}    </table>
  </body>
</html>
"#,
        title = escape_html(&record.vehicle_no),
        rows = rows,
    )
}

/// CSV with a header row and one line per record
const PDF_TITLE: &str = "Haycarb Vehicle Report";
const PDF_FONT_SIZE: f32 = 11.0;
const PDF_ROW_HEIGHT: f32 = 8.0;

/// Builtin PDF fonts only cover Latin-1; anything outside it is replaced
fn pdf_text(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '–' | '—' => '-',
            c if (c as u32) < 0x100 => c,
            _ => '?',
        })
        .collect()
}

/// One-page A4 PDF with a Field/Value table of the record
pub fn render_pdf_report(
    record: &VehicleRecord,
    now: DateTime<Utc>,
    site: &FixedOffset,
) -> Result<Vec<u8>, printpdf::Error> {
    let (doc, page, layer) = PdfDocument::new(PDF_TITLE, Mm(210.0), Mm(297.0), "Report");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let canvas = doc.get_page(page).get_layer(layer);

    canvas.use_text(PDF_TITLE, 16.0, Mm(14.0), Mm(280.0), &bold);

    let mut y = 265.0;
    canvas.use_text("Field", PDF_FONT_SIZE, Mm(14.0), Mm(y), &bold);
    canvas.use_text("Value", PDF_FONT_SIZE, Mm(70.0), Mm(y), &bold);
    for (label, value) in report_rows(record, now, site) {
        y -= PDF_ROW_HEIGHT;
        canvas.use_text(label, PDF_FONT_SIZE, Mm(14.0), Mm(y), &bold);
        canvas.use_text(pdf_text(&value), PDF_FONT_SIZE, Mm(70.0), Mm(y), &regular);
    }

    let generated = format!("Generated {}", now.with_timezone(site).format(DISPLAY_FORMAT));
    canvas.use_text(generated, 8.0, Mm(14.0), Mm(y - 2.0 * PDF_ROW_HEIGHT), &regular);

    doc.save_to_bytes()
}

pub fn export_csv(records: &[VehicleRecord], now: DateTime<Utc>, site: &FixedOffset) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Vehicle No",
        "Container ID",
        "Type",
        "Plant",
        "In Time",
        "Out Time",
        "Duration",
        "Status",
    ])?;

    for record in records {
        let values: Vec<String> = report_rows(record, now, site).into_iter().map(|(_, v)| v).collect();
        writer.write_record(&values)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::{Plant, VehicleType};
    use chrono::TimeZone;

    fn colombo() -> FixedOffset {
        FixedOffset::east_opt(330 * 60).unwrap()
    }

    fn record() -> VehicleRecord {
        VehicleRecord {
            id: "1".to_string(),
            vehicle_no: "WP <KL> 4455".to_string(),
            container_id: None,
            vehicle_type: VehicleType::Car,
            plant: Some(Plant::Badalgama),
            in_time: Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap(),
            out_time: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn rows_for_vehicle_still_inside() {
        let rows = report_rows(&record(), now(), &colombo());
        let get = |label: &str| rows.iter().find(|(l, _)| *l == label).map(|(_, v)| v.clone()).unwrap();
        assert_eq!(get("Container ID"), "–");
        assert_eq!(get("In Time"), "Jan 15, 2024 13:30");
        assert_eq!(get("Out Time"), "Inside");
        assert_eq!(get("Duration"), "2h 30m");
        assert_eq!(get("Status"), "Inside");
    }

    #[test]
    fn html_is_escaped() {
        let html = render_print_report(&record(), now(), &colombo());
        assert!(html.contains("WP &lt;KL&gt; 4455"));
        assert!(!html.contains("<KL>"));
        assert!(html.contains("<th>Plant</th><td>Badalgama</td>"));
    }

    #[test]
    fn pdf_report_is_a_pdf_document() {
        let bytes = render_pdf_report(&record(), now(), &colombo()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn pdf_text_stays_in_latin1() {
        assert_eq!(pdf_text("–"), "-");
        assert_eq!(pdf_text("⚠️ WP-1"), "?? WP-1");
        assert_eq!(pdf_text("Badalgama"), "Badalgama");
    }

    #[test]
    fn csv_has_header_and_rows() {
        let mut exited = record();
        exited.vehicle_no = "TB-1".to_string();
        exited.out_time = Some(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap());
        let csv = export_csv(&[record(), exited], now(), &colombo()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Vehicle No,Container ID,Type"));
        assert!(lines[2].contains("1h 0m"));
        assert!(lines[2].ends_with("Exited"));
    }
}
