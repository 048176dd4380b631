use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use ranking_core::{
    Badge, BadgeMetric, BadgeSpec, CanonicalVisit, LocationCount, PersonAggregate, RankingConfig,
    TimeOfDay, classify_level,
};

use crate::parser::{round1, round2};

pub(crate) fn parse_canonical_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Partitions visits by person (exact, case-sensitive match), preserving
/// the order of first appearance for stable downstream tie-breaks.
pub(crate) fn group_by_person(visits: &[CanonicalVisit]) -> Vec<(&str, Vec<&CanonicalVisit>)> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&CanonicalVisit>> = HashMap::new();
    for visit in visits {
        let name = visit.person.as_str();
        groups
            .entry(name)
            .or_insert_with(|| {
                order.push(name);
                Vec::new()
            })
            .push(visit);
    }
    order
        .into_iter()
        .map(|name| (name, groups.remove(name).unwrap_or_default()))
        .collect()
}

/// Consecutive-day count ending at the most recent visit date. Dates are
/// deduped first; any gap other than exactly one calendar day stops the
/// run.
pub(crate) fn streak(dates: &[NaiveDate]) -> u32 {
    let unique: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    let mut descending = unique.into_iter().rev();
    let Some(mut current) = descending.next() else {
        return 0;
    };
    let mut run = 1;
    for date in descending {
        if current.pred_opt() != Some(date) {
            break;
        }
        run += 1;
        current = date;
    }
    run
}

/// Highest-count window, ties broken by the first window in scan order
/// reaching the maximum.
fn favorite_time(window_counts: &[u64; 5]) -> Option<TimeOfDay> {
    let mut best: Option<TimeOfDay> = None;
    let mut best_count = 0;
    for window in TimeOfDay::SCAN_ORDER {
        let count = window_counts[window.index()];
        if count > best_count {
            best = Some(window);
            best_count = count;
        }
    }
    best
}

/// Location frequencies sorted descending, ties kept in first-seen order
/// by sort stability, truncated to the configured cap.
fn top_locations(visits: &[&CanonicalVisit], cap: usize) -> Vec<LocationCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for visit in visits {
        if let Some(location) = visit.location.as_deref() {
            *counts.entry(location).or_insert_with(|| {
                order.push(location);
                0
            }) += 1;
        }
    }
    let mut ranked: Vec<LocationCount> = order
        .into_iter()
        .map(|location| LocationCount {
            location: location.to_string(),
            count: counts.get(location).copied().unwrap_or(0),
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(cap);
    ranked
}

/// Distinct visit days divided by the months spanned between first and
/// last date, both endpoints' months inclusive. With fewer than two dated
/// visits the average degenerates to the raw visit count.
fn monthly_average(dates: &[NaiveDate], total_visits: u64) -> f64 {
    if dates.len() < 2 {
        return total_visits as f64;
    }
    let unique: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    let (Some(&first), Some(&last)) = (unique.iter().next(), unique.iter().next_back()) else {
        return total_visits as f64;
    };
    let months = (last.year() - first.year()) * 12 + last.month() as i32 - first.month() as i32 + 1;
    round1(unique.len() as f64 / months as f64)
}

fn hour_of(time: &str) -> Option<u32> {
    time.split(':').next()?.parse().ok()
}

fn award_badges(
    specs: &[BadgeSpec],
    total_visits: u64,
    streak: u32,
    window_counts: &[u64; 5],
) -> Vec<Badge> {
    specs
        .iter()
        .filter(|spec| {
            let value = match spec.metric {
                BadgeMetric::TotalVisits => total_visits,
                BadgeMetric::Streak => streak as u64,
                BadgeMetric::EarlyVisits => window_counts[TimeOfDay::Morning.index()],
                BadgeMetric::LateVisits => window_counts[TimeOfDay::Night.index()],
            };
            value >= spec.threshold
        })
        .map(|spec| Badge {
            name: spec.name.clone(),
            color: spec.color.clone(),
        })
        .collect()
}

pub(crate) fn aggregate_person(
    name: &str,
    visits: &[&CanonicalVisit],
    config: &RankingConfig,
) -> PersonAggregate {
    let total_visits = visits.len() as u64;
    let total_spent = round2(visits.iter().map(|visit| visit.amount).sum());
    let average_spend = if total_visits == 0 {
        0.0
    } else {
        round2(total_spent / total_visits as f64)
    };
    let max_spend = visits
        .iter()
        .map(|visit| visit.amount)
        .fold(0.0f64, f64::max);

    let dates: Vec<NaiveDate> = visits
        .iter()
        .filter_map(|visit| visit.date.as_deref())
        .filter_map(parse_canonical_date)
        .collect();
    let streak = streak(&dates);
    let first_visit = dates
        .iter()
        .min()
        .map(|date| date.format("%Y-%m-%d").to_string());
    let last_visit = dates
        .iter()
        .max()
        .map(|date| date.format("%Y-%m-%d").to_string());

    let mut window_counts = [0u64; 5];
    for visit in visits {
        if let Some(hour) = visit.time.as_deref().and_then(hour_of) {
            window_counts[TimeOfDay::from_hour(hour).index()] += 1;
        }
    }

    let locations: BTreeSet<&str> = visits
        .iter()
        .filter_map(|visit| visit.location.as_deref())
        .collect();
    let notes_count = visits.iter().filter(|visit| visit.note.is_some()).count() as u64;

    PersonAggregate {
        name: name.to_string(),
        total_visits,
        total_spent,
        average_spend,
        max_spend,
        streak,
        level: classify_level(&config.levels, total_visits),
        badges: award_badges(&config.badges, total_visits, streak, &window_counts),
        top_locations: top_locations(visits, config.top_locations),
        locations_count: locations.len() as u64,
        notes_count,
        favorite_time: favorite_time(&window_counts),
        monthly_average: monthly_average(&dates, total_visits),
        first_visit,
        last_visit,
    }
}
