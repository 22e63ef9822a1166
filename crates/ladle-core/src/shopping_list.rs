//! Shopping list aggregation.
//!
//! [`aggregate`] is the core algorithm: it merges composition rows from
//! every recipe in a cart into one deduplicated, summed, deterministically
//! ordered list. [`render_document`] formats the result as a plain-text
//! download. Both are pure so the algorithm stays testable independently of
//! any store or presentation concern.

use std::collections::{HashMap, hash_map::Entry};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::recipe::CompositionRow;

// ─── AggregatedLine ──────────────────────────────────────────────────────────

/// One line of an aggregated shopping list — derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedLine {
  pub ingredient_id:    Uuid,
  pub name:             String,
  pub measurement_unit: String,
  /// Exact integer sum across every contributing composition entry. Wider
  /// than a single entry's amount so large carts never truncate.
  pub total_amount:     u64,
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// Group composition rows by ingredient identity and sum their amounts.
///
/// Grouping is by ingredient id, not name, so entries that share an
/// ingredient but were entered through different recipes merge correctly.
/// Lines are ordered by case-normalized name ascending, with ties broken by
/// ingredient id for determinism. Input order never affects the output.
pub fn aggregate(rows: impl IntoIterator<Item = CompositionRow>) -> Vec<AggregatedLine> {
  let mut groups: HashMap<Uuid, AggregatedLine> = HashMap::new();

  for row in rows {
    match groups.entry(row.ingredient_id) {
      Entry::Occupied(mut line) => {
        line.get_mut().total_amount += u64::from(row.amount);
      }
      Entry::Vacant(slot) => {
        slot.insert(AggregatedLine {
          ingredient_id:    row.ingredient_id,
          name:             row.name,
          measurement_unit: row.measurement_unit,
          total_amount:     u64::from(row.amount),
        });
      }
    }
  }

  let mut lines: Vec<AggregatedLine> = groups.into_values().collect();
  lines.sort_by(|a, b| {
    a.name
      .to_lowercase()
      .cmp(&b.name.to_lowercase())
      .then_with(|| a.ingredient_id.cmp(&b.ingredient_id))
  });
  lines
}

// ─── Rendering ───────────────────────────────────────────────────────────────

/// Format aggregated lines as a downloadable plain-text shopping list with a
/// generation timestamp header.
pub fn render_document(lines: &[AggregatedLine], generated_at: DateTime<Utc>) -> String {
  let mut out = String::new();

  out.push_str(&format!(
    "Shopping list (generated {})\n\n",
    generated_at.format("%d.%m.%Y %H:%M")
  ));
  out.push_str("# | Product | Amount | Unit\n");

  for (idx, line) in lines.iter().enumerate() {
    out.push_str(&format!(
      "{} | {} | {} | {}\n",
      idx + 1,
      capitalize(&line.name),
      line.total_amount,
      line.measurement_unit,
    ));
  }

  out
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
