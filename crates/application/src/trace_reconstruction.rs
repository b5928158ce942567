use std::collections::HashMap;

use chrono::{DateTime, Utc};

use obsq_domain::{SpanRow, TraceSummary};

#[derive(Debug, Default)]
struct TraceAccumulator {
    summary: TraceSummary,
    min_start: Option<i64>,
    max_end: Option<i64>,
}

impl TraceAccumulator {
    fn absorb(&mut self, row: &SpanRow) {
        self.summary.span_count += 1;

        if let Some(start) = row.start_ns {
            self.min_start = Some(self.min_start.map_or(start, |current| current.min(start)));
        }
        if let Some(end) = row.end_ns {
            self.max_end = Some(self.max_end.map_or(end, |current| current.max(end)));
        }

        // Several parentless rows in one trace: the last one seen is the root.
        if row.parent_span_id.is_empty() {
            self.summary.root_span_id.clone_from(&row.span_id);
            self.summary.root_span_name.clone_from(&row.span_name);
            self.summary.root_span_kind.clone_from(&row.span_kind);
        }
    }

    fn finish(self) -> TraceSummary {
        let start = self.min_start.unwrap_or_default();
        let end = self.max_end.unwrap_or_default();
        let duration_ns = match (self.min_start, self.max_end) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            _ => 0,
        };

        TraceSummary {
            trace_name: self.summary.root_span_name.clone(),
            start_time: DateTime::<Utc>::from_timestamp_nanos(start),
            end_time: DateTime::<Utc>::from_timestamp_nanos(end),
            duration_ns,
            ..self.summary
        }
    }
}

/// Groups span rows into per-trace summaries in first-seen order.
///
/// Needs the complete row set for the window; a partial page would produce
/// wrong counts and bounds. Rows without a trace id are skipped.
#[must_use]
pub fn reconstruct_traces(rows: &[SpanRow]) -> Vec<TraceSummary> {
    let mut order: Vec<TraceAccumulator> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        if row.trace_id.is_empty() {
            continue;
        }

        let position = *positions.entry(row.trace_id.as_str()).or_insert_with(|| {
            order.push(TraceAccumulator {
                summary: TraceSummary {
                    trace_id: row.trace_id.clone(),
                    ..TraceSummary::default()
                },
                ..TraceAccumulator::default()
            });
            order.len() - 1
        });

        if let Some(accumulator) = order.get_mut(position) {
            accumulator.absorb(row);
        }
    }

    order.into_iter().map(TraceAccumulator::finish).collect()
}
