//! Printable "doctor export" page for the most recent days.

use crate::models::{DayRecord, GlucoseReading, MedicationSlot};
use crate::store::DayRepository;
use chrono::{Local, NaiveDate};

pub const DEFAULT_EXPORT_DAYS: usize = 7;

pub fn build_report(data: &impl DayRepository, days: usize) -> String {
    let generated = Local::now().format("%Y-%m-%d %H:%M").to_string();
    build_report_at(data, days, &generated)
}

pub fn build_report_at(data: &impl DayRepository, days: usize, generated_at: &str) -> String {
    let records: Vec<DayRecord> = data
        .dates()
        .into_iter()
        .rev()
        .take(days)
        .filter_map(|date| data.get(&date))
        .collect();

    let range = match (records.last(), records.first()) {
        (Some(oldest), Some(newest)) => {
            format!("{} — {}", fmt_date_long(&oldest.date), fmt_date_long(&newest.date))
        }
        _ => "No entries yet".to_string(),
    };

    let rows = if records.is_empty() {
        r#"<p class="muted">No entries yet.</p>"#.to_string()
    } else {
        records.iter().map(render_day).collect()
    };

    fill_template(
        REPORT_HTML,
        &[
            ("DAYS", &days.to_string()),
            ("RANGE", &escape_html(&range)),
            ("GENERATED", &escape_html(generated_at)),
            ("ROWS", &rows),
        ],
    )
}

fn render_day(record: &DayRecord) -> String {
    let readings = if record.glucose.is_empty() {
        r#"<span class="muted">None</span>"#.to_string()
    } else {
        record
            .glucose
            .iter()
            .map(render_reading)
            .collect::<Vec<_>>()
            .join("<br>")
    };
    let notes = if record.notes.is_empty() {
        r#"<span class="muted">—</span>"#.to_string()
    } else {
        escape_html(&record.notes).replace('\n', "<br>")
    };

    format!(
        r#"
    <div class="day">
      <div class="day-title">{title}</div>
      <div class="grid">
        <div class="box"><div class="label">Morning meds</div><div class="val">{morning}</div></div>
        <div class="box"><div class="label">Evening meds</div><div class="val">{evening}</div></div>
      </div>
      <div class="box"><div class="label">Blood sugar readings</div><div class="val">{readings}</div></div>
      <div class="box"><div class="label">Notes</div><div class="val">{notes}</div></div>
    </div>"#,
        title = escape_html(&fmt_date_long(&record.date)),
        morning = escape_html(&med_line(&record.meds.morning)),
        evening = escape_html(&med_line(&record.meds.evening)),
    )
}

fn render_reading(reading: &GlucoseReading) -> String {
    let mut line = format!(
        "{} @ {}",
        escape_html(&reading.value.to_string()),
        escape_html(&reading.time)
    );
    if !reading.note.is_empty() {
        line.push_str(" — ");
        line.push_str(&escape_html(&reading.note));
    }
    line
}

fn med_line(slot: &MedicationSlot) -> String {
    if slot.taken {
        format!("Taken • {}", slot.time.as_deref().unwrap_or_default())
    } else {
        "Not taken".to_string()
    }
}

/// `2026-01-02` becomes `Fri, Jan 2, 2026`. Unparseable keys are shown as-is.
pub fn fmt_date_long(iso: &str) -> String {
    NaiveDate::parse_from_str(iso, "%Y-%m-%d")
        .map(|date| date.format("%a, %b %-d, %Y").to_string())
        .unwrap_or_else(|_| iso.to_string())
}

/// Substitutes `{{KEY}}` markers in one left-to-right pass. Substituted text is
/// never scanned again, so user content can't expand into another marker.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let value = after.find("}}").and_then(|end| {
            let key = &after[..end];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, end))
        });
        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

const REPORT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>SteadyDay — Doctor Export</title>
  <style>
    * { box-sizing: border-box; }
    body { margin: 0; font-family: system-ui, -apple-system, "Segoe UI", Roboto, Arial, sans-serif; background: #fff; color: #111827; }
    .wrap { max-width: 900px; margin: 0 auto; padding: 22px; }
    h1 { margin: 0 0 6px; font-size: 22px; }
    .sub { color: #6b7280; margin: 0 0 14px; }
    .meta { display: flex; gap: 10px; flex-wrap: wrap; margin: 10px 0 18px; }
    .pill { background: #f3f4f6; border: 1px solid #e5e7eb; padding: 6px 10px; border-radius: 999px; font-size: 13px; }
    .day { border: 1px solid #e5e7eb; border-radius: 14px; padding: 14px; margin: 0 0 12px; }
    .day-title { font-weight: 900; margin-bottom: 10px; }
    .grid { display: grid; grid-template-columns: repeat(2, 1fr); gap: 10px; }
    .box { border: 1px solid #e5e7eb; border-radius: 12px; padding: 10px 12px; margin-top: 10px; }
    .label { font-size: 12px; color: #6b7280; font-weight: 800; margin-bottom: 6px; text-transform: uppercase; letter-spacing: .02em; }
    .val { font-size: 14px; line-height: 1.6; }
    .muted { color: #6b7280; }
    .foot { margin-top: 14px; color: #6b7280; font-size: 12px; }
    @media print {
      .wrap { max-width: none; padding: 0; }
      .day { break-inside: avoid-page; }
    }
  </style>
</head>
<body>
  <div class="wrap">
    <h1>SteadyDay — Doctor Export</h1>
    <p class="sub">Last {{DAYS}} days summary (private, local log)</p>
    <div class="meta">
      <div class="pill">Range: {{RANGE}}</div>
      <div class="pill">Generated: {{GENERATED}}</div>
    </div>
    {{ROWS}}
    <div class="foot">Disclaimer: Tracking only. Not medical advice.</div>
  </div>
  <script>
    setTimeout(() => window.print(), 350);
  </script>
</body>
</html>
"#;
