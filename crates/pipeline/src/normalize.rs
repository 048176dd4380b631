use ranking_core::CanonicalVisit;
use serde_json::Value;

use crate::parser::{AmountParse, DateParse, parse_amount, parse_visit_date, parse_visit_time};
use crate::types::{PipelineIssue, PipelineStats};

// Candidate key names per canonical field, probed in order. Kept as data
// so new spellings are a one-line change.
const PERSON_KEYS: &[&str] = &["Nome", "nome", "name"];
const DATE_KEYS: &[&str] = &["Data", "data", "date"];
const TIME_KEYS: &[&str] = &["Orario", "orario", "time"];
const LOCATION_KEYS: &[&str] = &["Luogo", "luogo", "location"];
const AMOUNT_KEYS: &[&str] = &["Quanto hai speso?", "Importo", "importo", "spend", "amount"];
const NOTE_KEYS: &[&str] = &["Note", "note", "notes"];
const TIMESTAMP_KEYS: &[&str] = &["Informazioni cronologiche", "timestamp"];

fn value_to_string(value: &Value) -> Option<String> {
    if let Some(text) = value.as_str() {
        return Some(text.to_string());
    }
    if let Some(number) = value.as_i64() {
        return Some(number.to_string());
    }
    None
}

fn find_text(record: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(text) = record.get(*key).and_then(value_to_string) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn find_value<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    for key in keys {
        if let Some(value) = record.get(*key)
            && !value.is_null()
        {
            return Some(value);
        }
    }
    None
}

pub(crate) enum RecordOutcome {
    Visit {
        visit: CanonicalVisit,
        date_unrecognized: Option<String>,
        amount_defaulted: bool,
    },
    MissingPerson,
}

pub(crate) fn normalize_outcome(record: &Value) -> RecordOutcome {
    let Some(person) = find_text(record, PERSON_KEYS) else {
        return RecordOutcome::MissingPerson;
    };

    let timestamp = find_text(record, TIMESTAMP_KEYS);
    let raw_date = find_text(record, DATE_KEYS).or_else(|| timestamp.clone());
    let (date, date_unrecognized) = match raw_date.as_deref().map(parse_visit_date) {
        Some(DateParse::Iso(date)) => (Some(date), None),
        Some(DateParse::Unrecognized(raw)) => (None, Some(raw)),
        None => (None, None),
    };

    let time = find_text(record, TIME_KEYS)
        .as_deref()
        .and_then(parse_visit_time)
        .or_else(|| {
            timestamp
                .as_deref()
                .and_then(|value| value.split_whitespace().nth(1))
                .and_then(parse_visit_time)
        });

    let (amount, amount_defaulted) = match find_value(record, AMOUNT_KEYS).map(parse_amount) {
        Some(AmountParse::Value(value)) => (value, false),
        Some(AmountParse::Unparseable) => (0.0, true),
        None => (0.0, false),
    };

    RecordOutcome::Visit {
        visit: CanonicalVisit {
            person,
            date,
            time,
            location: find_text(record, LOCATION_KEYS),
            amount,
            note: find_text(record, NOTE_KEYS),
        },
        date_unrecognized,
        amount_defaulted,
    }
}

/// Maps one raw record to a canonical visit, or `None` when no person
/// identifier can be resolved. Pure function of its input.
pub fn normalize_record(record: &Value) -> Option<CanonicalVisit> {
    match normalize_outcome(record) {
        RecordOutcome::Visit { visit, .. } => Some(visit),
        RecordOutcome::MissingPerson => None,
    }
}

/// Normalizes a whole record list, counting dropped records and defaulted
/// fields for observability.
pub fn normalize_visits(records: &[Value]) -> (Vec<CanonicalVisit>, PipelineStats) {
    let mut visits = Vec::with_capacity(records.len());
    let mut stats = PipelineStats {
        records_seen: records.len(),
        ..PipelineStats::default()
    };
    for (index, record) in records.iter().enumerate() {
        match normalize_outcome(record) {
            RecordOutcome::Visit {
                visit,
                date_unrecognized,
                amount_defaulted,
            } => {
                if let Some(raw) = date_unrecognized {
                    stats.dates_unrecognized += 1;
                    stats.issues.push(PipelineIssue {
                        record_index: index,
                        message: format!("unrecognized date format: {:?}", raw),
                    });
                }
                if amount_defaulted {
                    stats.amounts_defaulted += 1;
                }
                visits.push(visit);
            }
            RecordOutcome::MissingPerson => {
                stats.records_dropped += 1;
                stats.issues.push(PipelineIssue {
                    record_index: index,
                    message: "record has no person identifier".to_string(),
                });
            }
        }
    }
    (visits, stats)
}
