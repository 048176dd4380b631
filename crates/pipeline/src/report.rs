use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};
use ranking_core::{CanonicalVisit, GlobalSummary, PersonAggregate, RankingConfig};
use serde::Serialize;
use serde_json::Value;

use crate::aggregate::{aggregate_person, group_by_person, parse_canonical_date};
use crate::normalize::normalize_visits;
use crate::parser::round2;
use crate::types::{PipelineError, PipelineStats};

pub const SCHEMA_VERSION: u32 = 1;

/// The one output structure the presentation layer consumes. Tagged with
/// `success`; `data` is present only on success, `error` only on failure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingReport {
    pub success: bool,
    pub schema_version: u32,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ReportData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub visits: Vec<Value>,
    pub players: Vec<PersonAggregate>,
    pub stats: GlobalSummary,
    pub diagnostics: PipelineStats,
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Runs the whole pipeline over `input` and packages the result. The
/// evaluation instant is an explicit parameter: the pipeline reads no
/// clock and performs no I/O, so identical inputs yield identical
/// reports.
pub fn build_report(input: &Value, now: DateTime<Utc>, config: &RankingConfig) -> RankingReport {
    let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let records = match input.as_array() {
        Some(records) => records,
        None => {
            let err = PipelineError::NotAnArray(json_type_name(input));
            return RankingReport {
                success: false,
                schema_version: SCHEMA_VERSION,
                timestamp,
                data: None,
                error: Some(err.to_string()),
            };
        }
    };
    let (players, stats, diagnostics) = aggregate_records(records, now, config);
    RankingReport {
        success: true,
        schema_version: SCHEMA_VERSION,
        timestamp,
        data: Some(ReportData {
            visits: records.clone(),
            players,
            stats,
            diagnostics,
        }),
        error: None,
    }
}

/// Normalizes, groups, aggregates, and ranks a record list. The returned
/// player array is the canonical ranking: descending by total visits,
/// ties in first-appearance order (stable sort).
pub fn aggregate_records(
    records: &[Value],
    now: DateTime<Utc>,
    config: &RankingConfig,
) -> (Vec<PersonAggregate>, GlobalSummary, PipelineStats) {
    let (visits, diagnostics) = normalize_visits(records);
    let mut players: Vec<PersonAggregate> = group_by_person(&visits)
        .into_iter()
        .map(|(name, group)| aggregate_person(name, &group, config))
        .collect();
    players.sort_by(|a, b| b.total_visits.cmp(&a.total_visits));
    let stats = global_summary(&visits, &players, now);
    (players, stats, diagnostics)
}

fn global_summary(
    visits: &[CanonicalVisit],
    players: &[PersonAggregate],
    now: DateTime<Utc>,
) -> GlobalSummary {
    let total_visits = visits.len() as u64;
    let total_spent = round2(players.iter().map(|player| player.total_spent).sum());
    let average_spend = if total_visits == 0 {
        0.0
    } else {
        round2(total_spent / total_visits as f64)
    };
    GlobalSummary {
        total_visits,
        total_players: players.len() as u64,
        total_spent,
        average_spend,
        start_date: players
            .iter()
            .filter_map(|player| player.first_visit.clone())
            .min(),
        top_player: players.first().map(|player| player.name.clone()),
        top_spender: max_by_metric(players, |player| player.total_spent),
        top_average_spend: max_by_metric(players, |player| player.average_spend),
        monthly_visits: count_in_month(visits, now),
        weekly_record: weekly_record(visits),
    }
}

/// Linear scan for the maximum; strict comparison keeps the earliest
/// entry in the primary ranking on ties.
fn max_by_metric(
    players: &[PersonAggregate],
    metric: impl Fn(&PersonAggregate) -> f64,
) -> Option<String> {
    let mut best: Option<&PersonAggregate> = None;
    let mut best_value = f64::NEG_INFINITY;
    for player in players {
        let value = metric(player);
        if best.is_none() || value > best_value {
            best = Some(player);
            best_value = value;
        }
    }
    best.map(|player| player.name.clone())
}

fn canonical_dates(visits: &[CanonicalVisit]) -> impl Iterator<Item = NaiveDate> + '_ {
    visits
        .iter()
        .filter_map(|visit| visit.date.as_deref())
        .filter_map(parse_canonical_date)
}

fn count_in_month(visits: &[CanonicalVisit], now: DateTime<Utc>) -> u64 {
    let today = now.date_naive();
    canonical_dates(visits)
        .filter(|date| date.year() == today.year() && date.month() == today.month())
        .count() as u64
}

/// Week-of-year bucket: `ceil((dayOfYear + Jan1Weekday) / 7)`, with
/// Sunday counted as weekday 0.
fn week_of_year(date: NaiveDate) -> u32 {
    let jan1 = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
    (date.ordinal() + jan1.weekday().num_days_from_sunday()).div_ceil(7)
}

fn weekly_record(visits: &[CanonicalVisit]) -> u64 {
    let mut buckets: HashMap<(i32, u32), u64> = HashMap::new();
    for date in canonical_dates(visits) {
        *buckets.entry((date.year(), week_of_year(date))).or_insert(0) += 1;
    }
    buckets.values().copied().max().unwrap_or(0)
}
