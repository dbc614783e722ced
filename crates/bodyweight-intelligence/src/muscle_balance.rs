// ABOUTME: Four-week per-muscle-group volume analysis over stored performance records
// ABOUTME: Produces weekly volume, RPE trend, imbalance score and training recommendations per group
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Muscle balance
//!
//! Every stored performance record counts as one set for each muscle group it
//! trained. The current week is compared against the four weeks before it and
//! against the other groups trained this week.

use std::collections::{BTreeMap, BTreeSet};

use bodyweight_core::models::numbers::compact;
use bodyweight_core::models::PerformanceEntry;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::muscle_groups::week_start;
use crate::stats::mean;

/// Weeks of history compared against the current week
pub const LOOKBACK_WEEKS: i64 = 4;
/// Weekly sets below which a group needs more volume
pub const LOW_WEEKLY_SETS: usize = 6;
/// Average RPE below which intensity should rise
pub const LOW_RPE: f64 = 6.0;
/// Average RPE above which intensity should drop
pub const HIGH_RPE: f64 = 8.5;
/// RPE trend below which a group shows fatigue
pub const REGRESSION_TREND: f64 = -10.0;
/// Recommendations kept in the summary
pub const MAX_SUMMARY_RECOMMENDATIONS: usize = 5;

/// Weeks covered by an analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindow {
    /// Sunday starting the current week
    pub current_week: NaiveDate,
    /// Sunday starting the earliest week analysed
    pub first_week: NaiveDate,
}

impl AnalysisWindow {
    /// Window ending with the week containing `today`
    #[must_use]
    pub fn ending(today: NaiveDate) -> Self {
        let current_week = week_start(today);
        Self {
            current_week,
            first_week: current_week - Duration::weeks(LOOKBACK_WEEKS),
        }
    }

    fn in_current_week(self, date: NaiveDate) -> bool {
        date >= self.current_week
    }

    fn in_first_week(self, date: NaiveDate) -> bool {
        date >= self.first_week && date < self.first_week + Duration::weeks(1)
    }
}

/// Volume of one muscle group over some weeks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupVolume {
    /// Sets performed
    pub total_sets: usize,
    /// Reps performed
    #[serde(serialize_with = "compact")]
    pub total_reps: f64,
    /// Mean RPE, unreported counting as zero
    pub avg_rpe: f64,
    /// Distinct session dates
    pub total_sessions: usize,
}

impl GroupVolume {
    fn of(entries: &[&PerformanceEntry]) -> Self {
        let dates: BTreeSet<NaiveDate> = entries.iter().filter_map(|e| e.date()).collect();
        Self {
            total_sets: entries.len(),
            total_reps: entries.iter().map(|e| e.reps_completed.unwrap_or(0.0)).sum(),
            avg_rpe: mean_rpe(entries),
            total_sessions: dates.len(),
        }
    }
}

fn mean_rpe(entries: &[&PerformanceEntry]) -> f64 {
    mean(entries.iter().map(|e| e.rpe_reported.unwrap_or(0.0))).unwrap_or(0.0)
}

/// Current-week volume with the mean catalogue level trained
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeek {
    /// Volume this week
    #[serde(flatten)]
    pub volume: GroupVolume,
    /// Mean progression level of the exercises trained, zero when unknown
    pub progression_level_avg: f64,
}

/// Four-week volume with the RPE trend since the first week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentWeeks {
    /// Volume over the window
    #[serde(flatten)]
    pub volume: GroupVolume,
    /// Current-week mean RPE minus first-week mean RPE, times 100
    pub progression_trend: f64,
}

/// Analysis of one muscle group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MuscleGroupAnalysis {
    /// Muscle group name
    pub muscle_group: String,
    /// This week
    pub current_week: CurrentWeek,
    /// The whole window
    pub last_4_weeks: RecentWeeks,
    /// Training advice
    pub recommendations: Vec<String>,
    /// Percent deviation of this week's sets from the mean across groups
    pub imbalance_score: f64,
}

/// Roll-up of every group's analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSummary {
    /// Groups with any volume in the window
    pub total_muscle_groups_trained: usize,
    /// Group with the most sets this week, `none` when nothing was trained
    pub most_trained: String,
    /// First recommendations across groups
    pub recommendations: Vec<String>,
}

/// Analyse every muscle group trained within `window`, by group name
#[must_use]
pub fn analyze(entries: &[PerformanceEntry], window: AnalysisWindow) -> Vec<MuscleGroupAnalysis> {
    let mut by_group: BTreeMap<&str, Vec<&PerformanceEntry>> = BTreeMap::new();
    for entry in entries {
        if entry.date().filter(|date| *date >= window.first_week).is_none() {
            continue;
        }
        for group in entry.muscle_groups.iter().flatten() {
            by_group.entry(group.as_str()).or_default().push(entry);
        }
    }

    let this_week = |d: NaiveDate| window.in_current_week(d);
    let weekly_sets: usize = by_group
        .values()
        .map(|group| dated(group, this_week).len())
        .sum();
    let average_sets = weekly_sets as f64 / by_group.len().max(1) as f64;

    by_group
        .iter()
        .map(|(group, all)| {
            let current = dated(all, this_week);
            let first = dated(all, |d| window.in_first_week(d));

            let current_volume = GroupVolume::of(&current);
            let progression_trend = if current.is_empty() || first.is_empty() {
                0.0
            } else {
                (current_volume.avg_rpe - mean_rpe(&first)) * 100.0
            };
            let imbalance_score = if average_sets > 0.0 {
                ((current_volume.total_sets as f64 - average_sets) / average_sets).abs() * 100.0
            } else {
                0.0
            };

            MuscleGroupAnalysis {
                muscle_group: (*group).to_owned(),
                recommendations: recommendations(group, &current_volume, progression_trend),
                current_week: CurrentWeek {
                    progression_level_avg: mean(
                        current.iter().filter_map(|e| e.progression_level()),
                    )
                    .unwrap_or(0.0),
                    volume: current_volume,
                },
                last_4_weeks: RecentWeeks {
                    volume: GroupVolume::of(all),
                    progression_trend,
                },
                imbalance_score,
            }
        })
        .collect()
}

/// Entries whose session date satisfies `keep`
fn dated<'a>(
    entries: &[&'a PerformanceEntry],
    keep: impl Fn(NaiveDate) -> bool,
) -> Vec<&'a PerformanceEntry> {
    entries
        .iter()
        .copied()
        .filter(|e| e.date().is_some_and(&keep))
        .collect()
}

fn recommendations(group: &str, week: &GroupVolume, trend: f64) -> Vec<String> {
    let mut advice = Vec::new();
    if week.total_sets == 0 {
        advice.push(format!("No {group} work this week"));
    } else if week.total_sets < LOW_WEEKLY_SETS {
        advice.push(format!(
            "{group} needs more volume (only {} sets this week)",
            week.total_sets
        ));
    }

    if week.avg_rpe < LOW_RPE {
        advice.push(format!(
            "Increase intensity for {group} (average RPE: {:.1})",
            week.avg_rpe
        ));
    } else if week.avg_rpe > HIGH_RPE {
        advice.push(format!(
            "Reduce intensity for {group} (average RPE: {:.1})",
            week.avg_rpe
        ));
    }

    if trend < REGRESSION_TREND {
        advice.push(format!("{group} shows signs of fatigue or regression"));
    }
    advice
}

/// Share of this week's sets across all groups done by `analysis`, in percent
#[must_use]
pub fn relative_volume(analysis: &MuscleGroupAnalysis, analyses: &[MuscleGroupAnalysis]) -> f64 {
    let total: usize = analyses
        .iter()
        .map(|a| a.current_week.volume.total_sets)
        .sum();
    analysis.current_week.volume.total_sets as f64 / total.max(1) as f64 * 100.0
}

/// Summary of `analyses`
#[must_use]
pub fn summarize(analyses: &[MuscleGroupAnalysis]) -> BalanceSummary {
    // Ties go to the first group
    let most_trained = analyses
        .iter()
        .rev()
        .max_by_key(|a| a.current_week.volume.total_sets)
        .map_or_else(|| "none".to_owned(), |a| a.muscle_group.clone());

    BalanceSummary {
        total_muscle_groups_trained: analyses.len(),
        most_trained,
        recommendations: analyses
            .iter()
            .flat_map(|a| a.recommendations.iter().cloned())
            .take(MAX_SUMMARY_RECOMMENDATIONS)
            .collect(),
    }
}
