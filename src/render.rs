//! HTML fragments for the portal root and error list.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::metrics::NeighborhoodMetrics;
use crate::portal::ErrorEntry;

/// Only the most recent failures are shown.
pub const VISIBLE_ERRORS: usize = 5;

/// `2024-05-01T17:03:09.120Z`
pub fn iso_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Body of the `portal-root` element.
pub fn render_metrics(m: &NeighborhoodMetrics, last_update: &DateTime<Utc>) -> String {
    format!(
        r#"
<h2>Neighborhood: {name}</h2>
<p>Last update: {updated}</p>
<h3>Environmental Metrics</h3>
<ul>
  <li>PM2.5: {pm25} µg/m³</li>
  <li>NO₂: {no2} ppb</li>
  <li>Water Lead: {lead} ppb</li>
  <li>Heat Index: {heat} °C</li>
</ul>
<h3>Karma &amp; Safety</h3>
<ul>
  <li>Karma score: {karma}</li>
  <li>Recent veto events: {vetoes}</li>
  <li>BCI safety incidents (last 24h): {bci}</li>
</ul>
"#,
        name = escape_html(&m.name),
        updated = iso_timestamp(last_update),
        pm25 = m.air.pm25,
        no2 = m.air.no2,
        lead = m.water.lead_ppb,
        heat = m.climate.heat_index_c,
        karma = m.karma.score,
        vetoes = m.karma.veto_events,
        bci = m.safety.bci_incidents,
    )
}

/// Body of the `portal-errors` element: the last [`VISIBLE_ERRORS`] entries, oldest first.
pub fn render_errors<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = &'a ErrorEntry>,
    I::IntoIter: DoubleEndedIterator,
{
    let mut tail: Vec<&ErrorEntry> = entries.into_iter().rev().take(VISIBLE_ERRORS).collect();
    tail.reverse();
    tail.iter()
        .map(|e| {
            format!(
                "<li>[{}] {}</li>",
                iso_timestamp(&e.ts),
                escape_html(&e.message)
            )
        })
        .collect()
}
