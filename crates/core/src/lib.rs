use serde::{Deserialize, Serialize};

/// A visit record after field-name normalization and date/amount parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalVisit {
    pub person: String,
    /// `YYYY-MM-DD`, absent when the raw date was missing or unrecognized.
    pub date: Option<String>,
    /// `HH:MM`, absent when no parseable time was found.
    pub time: Option<String>,
    pub location: Option<String>,
    pub amount: f64,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelBand {
    pub min: u64,
    pub max: u64,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub number: u32,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeMetric {
    TotalVisits,
    Streak,
    EarlyVisits,
    LateVisits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeSpec {
    pub name: String,
    pub metric: BadgeMetric,
    pub threshold: u64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub name: String,
    pub color: String,
}

/// Fixed time-of-day windows used for favorite-time bucketing and the
/// early/late badge metrics. `SCAN_ORDER` is the tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Lunch,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const SCAN_ORDER: [TimeOfDay; 5] = [
        TimeOfDay::Morning,
        TimeOfDay::Lunch,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimeOfDay::Morning,
            12..=14 => TimeOfDay::Lunch,
            15..=18 => TimeOfDay::Afternoon,
            19..=22 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn index(self) -> usize {
        match self {
            TimeOfDay::Morning => 0,
            TimeOfDay::Lunch => 1,
            TimeOfDay::Afternoon => 2,
            TimeOfDay::Evening => 3,
            TimeOfDay::Night => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCount {
    pub location: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonAggregate {
    pub name: String,
    pub total_visits: u64,
    pub total_spent: f64,
    pub average_spend: f64,
    pub max_spend: f64,
    pub streak: u32,
    pub level: Level,
    pub badges: Vec<Badge>,
    pub top_locations: Vec<LocationCount>,
    pub locations_count: u64,
    pub notes_count: u64,
    pub favorite_time: Option<TimeOfDay>,
    pub monthly_average: f64,
    pub first_visit: Option<String>,
    pub last_visit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSummary {
    pub total_visits: u64,
    pub total_players: u64,
    pub total_spent: f64,
    pub average_spend: f64,
    pub start_date: Option<String>,
    pub top_player: Option<String>,
    pub top_spender: Option<String>,
    pub top_average_spend: Option<String>,
    pub monthly_visits: u64,
    pub weekly_record: u64,
}

/// Level/badge tables and presentation caps, passed explicitly into the
/// pipeline so alternate tables can be tested without touching globals.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub levels: Vec<LevelBand>,
    pub badges: Vec<BadgeSpec>,
    pub top_locations: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            levels: default_levels(),
            badges: default_badges(),
            top_locations: 3,
        }
    }
}

fn band(min: u64, max: u64, name: &str, color: &str) -> LevelBand {
    LevelBand {
        min,
        max,
        name: name.to_string(),
        color: color.to_string(),
    }
}

fn badge(name: &str, metric: BadgeMetric, threshold: u64, color: &str) -> BadgeSpec {
    BadgeSpec {
        name: name.to_string(),
        metric,
        threshold,
        color: color.to_string(),
    }
}

pub fn default_levels() -> Vec<LevelBand> {
    vec![
        band(0, 5, "Beginner", "#808080"),
        band(6, 15, "Enthusiast", "#4CAF50"),
        band(16, 30, "Expert", "#2196F3"),
        band(31, 50, "Master", "#9C27B0"),
        band(51, 100, "Legend", "#FF9800"),
        band(101, 999, "Mythic", "#FF0000"),
    ]
}

pub fn default_badges() -> Vec<BadgeSpec> {
    vec![
        badge("Veteran", BadgeMetric::TotalVisits, 30, "#FFD700"),
        badge("Regular", BadgeMetric::TotalVisits, 15, "#C0C0C0"),
        badge("Streaker", BadgeMetric::Streak, 3, "#FF6B6B"),
        badge("Early Bird", BadgeMetric::EarlyVisits, 10, "#4ECDC4"),
        badge("Night Owl", BadgeMetric::LateVisits, 10, "#45B7D1"),
        badge("Champion", BadgeMetric::TotalVisits, 50, "#FF0000"),
    ]
}

/// Picks the band with the highest `min` not exceeding `total_visits`.
/// Bands are not required to be contiguous; `min` alone governs. When a
/// band with `min: 0` is missing and nothing matches, falls back to a
/// baseline beginner level instead of failing.
pub fn classify_level(bands: &[LevelBand], total_visits: u64) -> Level {
    let mut best: Option<(usize, &LevelBand)> = None;
    for (index, band) in bands.iter().enumerate() {
        if band.min <= total_visits && best.is_none_or(|(_, current)| band.min >= current.min) {
            best = Some((index, band));
        }
    }
    match best {
        Some((index, band)) => Level {
            number: (index + 1) as u32,
            name: band.name.clone(),
            color: band.color.clone(),
        },
        None => Level {
            number: 1,
            name: "Beginner".to_string(),
            color: "#808080".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_level_uses_highest_matching_min() {
        let bands = default_levels();
        assert_eq!(classify_level(&bands, 0).name, "Beginner");
        assert_eq!(classify_level(&bands, 5).name, "Beginner");
        assert_eq!(classify_level(&bands, 6).name, "Enthusiast");
        assert_eq!(classify_level(&bands, 50).name, "Master");
        assert_eq!(classify_level(&bands, 51).name, "Legend");
        assert_eq!(classify_level(&bands, 101).name, "Mythic");
        assert_eq!(classify_level(&bands, 5000).name, "Mythic");
    }

    #[test]
    fn classify_level_numbers_follow_table_position() {
        let bands = default_levels();
        assert_eq!(classify_level(&bands, 0).number, 1);
        assert_eq!(classify_level(&bands, 20).number, 3);
        assert_eq!(classify_level(&bands, 200).number, 6);
    }

    #[test]
    fn classify_level_min_alone_governs() {
        let bands = vec![
            band(0, 10, "Low", "#111111"),
            band(50, 60, "Legend", "#222222"),
        ];
        assert_eq!(classify_level(&bands, 3).name, "Low");
        // 30 is above Low's max, but min alone governs.
        assert_eq!(classify_level(&bands, 30).name, "Low");
        assert_eq!(classify_level(&bands, 60).name, "Legend");
        assert_eq!(classify_level(&bands, 500).name, "Legend");
    }

    #[test]
    fn classify_level_falls_back_without_matching_band() {
        let bands = vec![band(10, 20, "Only", "#333333")];
        let level = classify_level(&bands, 2);
        assert_eq!(level.number, 1);
        assert_eq!(level.name, "Beginner");
    }

    #[test]
    fn every_visit_count_maps_to_exactly_one_level() {
        let bands = default_levels();
        for total in 0..150 {
            let level = classify_level(&bands, total);
            assert!(level.number >= 1 && level.number <= bands.len() as u32);
            // Idempotent: classifying again yields the same level.
            assert_eq!(classify_level(&bands, total), level);
        }
    }

    #[test]
    fn time_of_day_windows() {
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Lunch);
        assert_eq!(TimeOfDay::from_hour(14), TimeOfDay::Lunch);
        assert_eq!(TimeOfDay::from_hour(15), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(18), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(19), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(22), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(23), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Night);
    }

    #[test]
    fn default_config_has_zero_floor_band() {
        let config = RankingConfig::default();
        assert!(config.levels.iter().any(|band| band.min == 0));
        assert_eq!(config.top_locations, 3);
    }
}
