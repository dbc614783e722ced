// ABOUTME: Multi-week training evolution: adherence index, levels, muscle balance and performance trends
// ABOUTME: Folds completed sessions, active progressions and weekly metrics into one scored report
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Training evolution
//!
//! Sessions are grouped by the Sunday starting their week. Each week gets an
//! adherence index estimate from how much of the planned volume was done, and
//! the per-week series feed the trends, the prediction and the overall score.
//! Weeks are reported oldest first.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use bodyweight_core::models::history::calendar_day;
use bodyweight_core::models::numbers::compact;
use bodyweight_core::models::progression::MAX_LEVEL;
use bodyweight_core::models::{ExerciseProgression, SessionExerciseRow, SessionRecord, WeeklyVolume};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::muscle_groups::week_start;
use crate::stats::{mean, round_to};

/// Weeks analysed when the request names none
pub const DEFAULT_WEEKS: i64 = 12;
/// Longest history analysed
pub const MAX_WEEKS: i64 = 52;

/// Index reported when nothing was trained
const FLOOR_ICA: f64 = 0.1;
/// Ceiling of a weekly index estimate
const MAX_WEEKLY_ICA: f64 = 1.5;
/// Ceiling of the four-week prediction
const MAX_PREDICTED_ICA: f64 = 2.0;
/// Index per unit of completed planned volume
const ICA_PER_COMPLETION: f64 = 1.2;
/// Mean weekly index change that counts as a trend
const ICA_TREND_THRESHOLD: f64 = 0.02;
/// Weekly changes averaged for the trend
const RECENT_WEEKS: usize = 4;
/// Assumed level gain per week when reconstructing past levels
const LEVEL_GAIN_PER_WEEK: f64 = 0.1;
/// Level gain assumed over the last four weeks
const FOUR_WEEK_LEVEL_GAIN: f64 = 0.5;
/// Weekly volume change, in percent, that counts as a trend
const VOLUME_TREND_PERCENT: f64 = 5.0;
/// RPE that balances stimulus and recovery
const OPTIMAL_RPE: f64 = 6.5;
/// Distance from the optimal RPE scoring zero
const MAX_RPE_DISTANCE: f64 = 3.0;
/// RPE assumed for unreported exercises
const DEFAULT_RPE: f64 = 7.0;
/// Technique quality assumed for unreported exercises
const DEFAULT_QUALITY: f64 = 3.0;
/// Completion assumed when no week has exercises
const DEFAULT_COMPLETION: f64 = 0.8;
/// Levels gained per week toward the next milestone
const LEVELS_PER_WEEK: f64 = 0.25;
/// Weeks reported once the top level is reached
const DEFAULT_MILESTONE_WEEKS: i64 = 4;

/// Direction of a score over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Getting better
    Improving,
    /// No meaningful change
    Stable,
    /// Getting worse
    Declining,
}

impl Trend {
    fn from_change(change: f64, threshold: f64) -> Self {
        if change > threshold {
            Self::Improving
        } else if change < -threshold {
            Self::Declining
        } else {
            Self::Stable
        }
    }

    fn between(first: f64, last: f64) -> Self {
        if last > first {
            Self::Improving
        } else if last < first {
            Self::Declining
        } else {
            Self::Stable
        }
    }
}

/// Direction of a muscle group's weekly volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeTrend {
    /// More sets week over week
    Increasing,
    /// No meaningful change
    Stable,
    /// Fewer sets week over week
    Decreasing,
}

/// Adherence index estimate of one week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyIca {
    /// Sunday starting the week
    pub week: NaiveDate,
    /// Estimated index
    pub ica: f64,
    /// Change from the previous week
    pub change: f64,
}

/// Mean adherence index of one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyIca {
    /// `YYYY-MM`
    pub month: String,
    /// Mean of the month's weekly estimates
    pub avg_ica: f64,
    /// Change from the previous month
    pub change: f64,
}

/// Adherence index over the analysed weeks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IcaEvolution {
    /// Latest weekly estimate
    pub current: f64,
    /// Direction over the last four weeks
    pub trend: Trend,
    /// Weekly estimates
    pub weekly_changes: Vec<WeeklyIca>,
    /// Monthly means
    pub monthly_changes: Vec<MonthlyIca>,
    /// Estimate four weeks ahead
    pub prediction_4_weeks: f64,
}

/// Mean level in one week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyLevel {
    /// Sunday starting the week
    pub week: NaiveDate,
    /// Estimated mean level
    pub avg_level: f64,
    /// Exercises last completed successfully during the week
    pub exercises_progressed: usize,
}

/// Level of one exercise in one week
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelPoint {
    /// Sunday starting the week
    pub week: NaiveDate,
    /// Level
    pub level: i32,
}

/// Progression outlook of one tracked exercise
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseDetail {
    /// Exercise catalogue id
    pub exercise_id: String,
    /// Exercise name
    pub exercise_name: String,
    /// Level per analysed week
    pub level_progression: Vec<LevelPoint>,
    /// Current level
    pub current_level: i32,
    /// Whole weeks since the last successful session, at least one
    pub weeks_at_current: i64,
    /// Likelihood of advancing next, 0-1
    pub next_progression_likelihood: f64,
}

/// Exercise levels over the analysed weeks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionEvolution {
    /// Direction of the mean level
    pub overall_trend: Trend,
    /// Mean current level
    pub avg_level_current: f64,
    /// Estimated mean level four weeks ago
    pub avg_level_4_weeks_ago: f64,
    /// Estimated mean level per week
    pub level_changes_by_week: Vec<WeeklyLevel>,
    /// Per-exercise outlook
    pub exercises_detail: Vec<ExerciseDetail>,
}

/// Balance across muscle groups in one week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyBalance {
    /// Sunday starting the week
    pub week: NaiveDate,
    /// One minus the coefficient of variation of sets, floored at zero
    pub balance_score: f64,
    /// Group furthest from the mean volume
    pub most_imbalanced: String,
}

/// Sets of one muscle group in one week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySets {
    /// Sunday starting the week
    pub week: NaiveDate,
    /// Sets performed
    #[serde(serialize_with = "compact")]
    pub total_sets: f64,
    /// Percent change from the group's previous recorded week
    pub change_percentage: f64,
}

/// Weekly volume of one muscle group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupVolumeTrend {
    /// Muscle group name
    pub muscle_group: String,
    /// Volume per recorded week
    pub weekly_volumes: Vec<WeeklySets>,
    /// Direction over the last three recorded weeks
    pub trend: VolumeTrend,
}

/// Muscle-group balance and volume over the analysed weeks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MuscleGroupsEvolution {
    /// Direction of the balance score over the last four weeks
    pub balance_trend: Trend,
    /// Balance per week
    pub weekly_balance_scores: Vec<WeeklyBalance>,
    /// Volume per group, by group name
    pub volume_trends: Vec<GroupVolumeTrend>,
}

/// Mean completion of planned volume in one week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyCompletion {
    /// Sunday starting the week
    pub week: NaiveDate,
    /// Mean completed share of planned sets times reps
    pub avg_completion: f64,
}

/// Mean reported effort in one week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyRpe {
    /// Sunday starting the week
    pub week: NaiveDate,
    /// Mean RPE, unreported counting as 7
    pub avg_rpe: f64,
}

/// Mean reported technique in one week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyQuality {
    /// Sunday starting the week
    pub week: NaiveDate,
    /// Mean technique quality, unreported counting as 3
    pub avg_quality: f64,
}

/// Completion of planned volume
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionEvolution {
    /// Latest weekly mean
    pub current: f64,
    /// Weekly means
    pub trend: Vec<WeeklyCompletion>,
    /// Second-half mean minus first-half mean
    pub improvement_rate: f64,
}

/// Reported effort
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpeEvolution {
    /// Latest weekly mean
    pub current_avg: f64,
    /// Weekly means
    pub trend: Vec<WeeklyRpe>,
    /// Closeness of the weekly means to the optimal RPE, 0-1
    pub optimization_score: f64,
}

/// Reported technique
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityEvolution {
    /// Latest weekly mean
    pub current_avg: f64,
    /// Weekly means
    pub trend: Vec<WeeklyQuality>,
    /// Second-half mean minus first-half mean
    pub improvement_rate: f64,
}

/// Session performance over the analysed weeks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceEvolution {
    /// Completion of planned volume
    pub completion_rate: CompletionEvolution,
    /// Reported effort
    pub rpe_optimization: RpeEvolution,
    /// Reported technique
    pub technical_quality: QualityEvolution,
}

/// Overall score and advice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionSummary {
    /// Progress score, 0-10
    pub overall_progress_score: f64,
    /// Area with the best trend
    pub strongest_improvement: &'static str,
    /// Area with the weakest trend
    pub area_needing_attention: &'static str,
    /// Estimated weeks until the top level
    pub weeks_to_next_milestone: i64,
    /// Advice
    pub recommendations: Vec<&'static str>,
}

/// Complete evolution report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionAnalysis {
    /// Adherence index
    pub ica_evolution: IcaEvolution,
    /// Exercise levels
    pub exercise_progression: ProgressionEvolution,
    /// Muscle-group balance
    pub muscle_groups_evolution: MuscleGroupsEvolution,
    /// Session performance
    pub performance_evolution: PerformanceEvolution,
    /// Score and advice
    pub summary: EvolutionSummary,
}

/// An active progression with its exercise name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedExercise {
    /// Progression row
    pub progression: ExerciseProgression,
    /// Catalogue name, empty when unknown
    pub name: String,
}

/// Weeks analysed for a requested count: default when absent or non-positive, capped
#[must_use]
pub fn weeks_back(requested: Option<i64>) -> i64 {
    requested
        .filter(|weeks| *weeks > 0)
        .unwrap_or(DEFAULT_WEEKS)
        .min(MAX_WEEKS)
}

/// Earliest session date analysed when looking `weeks` back from `today`
#[must_use]
pub fn window_start(today: NaiveDate, weeks: i64) -> NaiveDate {
    today - Duration::weeks(weeks)
}

/// Evolution report over `sessions` (completed, within the window), `tracked`
/// exercises and weekly `volumes`
#[must_use]
pub fn analyze(
    sessions: &[SessionRecord],
    tracked: &[TrackedExercise],
    volumes: &[WeeklyVolume],
    today: NaiveDate,
) -> EvolutionAnalysis {
    let weeks = sessions_by_week(sessions);
    let ica_evolution = ica_evolution(&weeks);
    let exercise_progression = progression_evolution(&weeks, tracked, today);
    let muscle_groups_evolution = muscle_groups_evolution(volumes);
    let performance_evolution = performance_evolution(&weeks);
    let summary = summarize(
        &ica_evolution,
        &exercise_progression,
        &muscle_groups_evolution,
        &performance_evolution,
    );
    EvolutionAnalysis {
        ica_evolution,
        exercise_progression,
        muscle_groups_evolution,
        performance_evolution,
        summary,
    }
}

type Weeks<'a> = BTreeMap<NaiveDate, Vec<&'a SessionRecord>>;

fn sessions_by_week(sessions: &[SessionRecord]) -> Weeks<'_> {
    let mut weeks = Weeks::new();
    for session in sessions {
        if let Some(date) = session.date() {
            weeks.entry(week_start(date)).or_default().push(session);
        }
    }
    weeks
}

/// Completed share of the planned sets times reps, zero when nothing was planned
fn volume_ratio(row: &SessionExerciseRow) -> f64 {
    let planned = row.sets_planned.unwrap_or(0.0) * row.reps_planned.unwrap_or(0.0);
    if planned <= 0.0 {
        return 0.0;
    }
    row.sets_completed.unwrap_or(0.0) * row.reps_completed.unwrap_or(0.0) / planned
}

fn session_volume_completion(session: &SessionRecord) -> f64 {
    mean(session.exercises().iter().map(volume_ratio)).unwrap_or(0.0)
}

fn ica_evolution(weeks: &Weeks<'_>) -> IcaEvolution {
    let mut weekly_changes: Vec<WeeklyIca> = Vec::with_capacity(weeks.len());
    for (week, sessions) in weeks {
        let completion =
            mean(sessions.iter().map(|s| session_volume_completion(s))).unwrap_or(0.0);
        let ica = (completion * ICA_PER_COMPLETION).clamp(FLOOR_ICA, MAX_WEEKLY_ICA);
        let change = weekly_changes.last().map_or(0.0, |previous| ica - previous.ica);
        weekly_changes.push(WeeklyIca {
            week: *week,
            ica,
            change,
        });
    }

    if weekly_changes.is_empty() {
        return IcaEvolution {
            current: FLOOR_ICA,
            trend: Trend::Stable,
            weekly_changes,
            monthly_changes: Vec::new(),
            prediction_4_weeks: FLOOR_ICA,
        };
    }

    let recent = &weekly_changes[weekly_changes.len().saturating_sub(RECENT_WEEKS)..];
    let avg_change = mean(recent.iter().map(|w| w.change)).unwrap_or(0.0);
    let current = weekly_changes.last().map_or(FLOOR_ICA, |w| w.ica);

    IcaEvolution {
        current,
        trend: Trend::from_change(avg_change, ICA_TREND_THRESHOLD),
        monthly_changes: monthly_changes(&weekly_changes),
        prediction_4_weeks: avg_change
            .mul_add(RECENT_WEEKS as f64, current)
            .clamp(FLOOR_ICA, MAX_PREDICTED_ICA),
        weekly_changes,
    }
}

fn monthly_changes(weekly: &[WeeklyIca]) -> Vec<MonthlyIca> {
    let mut months: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for week in weekly {
        months
            .entry(week.week.format("%Y-%m").to_string())
            .or_default()
            .push(week.ica);
    }

    let mut previous: Option<f64> = None;
    months
        .into_iter()
        .map(|(month, values)| {
            let avg_ica = mean(values).unwrap_or(0.0);
            let change = previous.map_or(0.0, |p| avg_ica - p);
            previous = Some(avg_ica);
            MonthlyIca {
                month,
                avg_ica,
                change,
            }
        })
        .collect()
}

/// Likelihood of advancing: 70% streak progress, 30% headroom below the top level
fn progression_likelihood(progression: &ExerciseProgression) -> f64 {
    let streak = (f64::from(progression.consecutive_completions) / 3.0).min(1.0);
    let headroom = (1.0 - f64::from(progression.current_level - 1) / 6.0).max(0.0);
    round_to(streak.mul_add(0.7, headroom * 0.3), 2)
}

fn weeks_since_success(progression: &ExerciseProgression, today: NaiveDate) -> i64 {
    progression
        .last_completed_date
        .as_deref()
        .and_then(calendar_day)
        .map_or(1, |date| ((today - date).num_days() / 7 + 1).max(1))
}

fn progression_evolution(
    weeks: &Weeks<'_>,
    tracked: &[TrackedExercise],
    today: NaiveDate,
) -> ProgressionEvolution {
    let Some(avg_level_current) =
        mean(tracked.iter().map(|t| f64::from(t.progression.current_level)))
    else {
        return ProgressionEvolution {
            overall_trend: Trend::Stable,
            avg_level_current: 1.0,
            avg_level_4_weeks_ago: 1.0,
            level_changes_by_week: Vec::new(),
            exercises_detail: Vec::new(),
        };
    };
    let avg_level_4_weeks_ago = (avg_level_current - FOUR_WEEK_LEVEL_GAIN).max(1.0);

    let week_count = weeks.len();
    let level_changes_by_week: Vec<WeeklyLevel> = weeks
        .keys()
        .enumerate()
        .map(|(index, week)| {
            let weeks_ago = (week_count - index - 1) as f64;
            let week_end = *week + Duration::weeks(1);
            WeeklyLevel {
                week: *week,
                avg_level: weeks_ago
                    .mul_add(-LEVEL_GAIN_PER_WEEK, avg_level_current)
                    .max(1.0),
                exercises_progressed: tracked
                    .iter()
                    .filter_map(|t| t.progression.last_completed_date.as_deref())
                    .filter_map(calendar_day)
                    .filter(|date| date >= week && *date < week_end)
                    .count(),
            }
        })
        .collect();

    let exercises_detail = tracked
        .iter()
        .map(|t| ExerciseDetail {
            exercise_id: t.progression.exercise_id.clone(),
            exercise_name: t.name.clone(),
            level_progression: weeks
                .keys()
                .map(|week| LevelPoint {
                    week: *week,
                    level: t.progression.current_level,
                })
                .collect(),
            current_level: t.progression.current_level,
            weeks_at_current: weeks_since_success(&t.progression, today),
            next_progression_likelihood: progression_likelihood(&t.progression),
        })
        .collect();

    ProgressionEvolution {
        overall_trend: if avg_level_current > avg_level_4_weeks_ago {
            Trend::Improving
        } else {
            Trend::Stable
        },
        avg_level_current,
        avg_level_4_weeks_ago,
        level_changes_by_week,
        exercises_detail,
    }
}

fn weekly_balance(week: NaiveDate, metrics: &[&WeeklyVolume]) -> WeeklyBalance {
    let sets = |m: &WeeklyVolume| m.total_sets.unwrap_or(0.0);
    let avg = mean(metrics.iter().map(|m| sets(m))).unwrap_or(0.0);
    let variance = mean(metrics.iter().map(|m| (sets(m) - avg).powi(2))).unwrap_or(0.0);
    let balance_score = if avg > 0.0 {
        (1.0 - variance.sqrt() / avg).max(0.0)
    } else {
        0.0
    };

    // Ties go to the first group
    let most_imbalanced = metrics
        .iter()
        .rev()
        .max_by(|a, b| (sets(a) - avg).abs().total_cmp(&(sets(b) - avg).abs()))
        .map(|m| m.muscle_group.clone())
        .unwrap_or_default();

    WeeklyBalance {
        week,
        balance_score,
        most_imbalanced,
    }
}

fn volume_trend(muscle_group: &str, metrics: &mut [&WeeklyVolume]) -> GroupVolumeTrend {
    metrics.sort_by_key(|m| m.week_start);

    let mut previous: Option<f64> = None;
    let weekly_volumes: Vec<WeeklySets> = metrics
        .iter()
        .map(|m| {
            let total_sets = m.total_sets.unwrap_or(0.0);
            let change_percentage = previous
                .filter(|p| *p > 0.0)
                .map_or(0.0, |p| (total_sets - p) / p * 100.0);
            previous = Some(total_sets);
            WeeklySets {
                week: m.week_start,
                total_sets,
                change_percentage,
            }
        })
        .collect();

    let recent = &weekly_volumes[weekly_volumes.len().saturating_sub(3)..];
    let avg_change = mean(recent.iter().map(|w| w.change_percentage)).unwrap_or(0.0);
    let trend = if avg_change > VOLUME_TREND_PERCENT {
        VolumeTrend::Increasing
    } else if avg_change < -VOLUME_TREND_PERCENT {
        VolumeTrend::Decreasing
    } else {
        VolumeTrend::Stable
    };

    GroupVolumeTrend {
        muscle_group: muscle_group.to_owned(),
        weekly_volumes,
        trend,
    }
}

fn muscle_groups_evolution(volumes: &[WeeklyVolume]) -> MuscleGroupsEvolution {
    let mut by_week: BTreeMap<NaiveDate, Vec<&WeeklyVolume>> = BTreeMap::new();
    let mut by_group: BTreeMap<&str, Vec<&WeeklyVolume>> = BTreeMap::new();
    for metric in volumes {
        by_week.entry(metric.week_start).or_default().push(metric);
        by_group
            .entry(metric.muscle_group.as_str())
            .or_default()
            .push(metric);
    }

    let weekly_balance_scores: Vec<WeeklyBalance> = by_week
        .iter()
        .map(|(week, metrics)| weekly_balance(*week, metrics))
        .collect();

    let recent = &weekly_balance_scores[weekly_balance_scores.len().saturating_sub(RECENT_WEEKS)..];
    let balance_trend = match (recent.first(), recent.last()) {
        (Some(first), Some(last)) => Trend::between(first.balance_score, last.balance_score),
        _ => Trend::Stable,
    };

    MuscleGroupsEvolution {
        balance_trend,
        weekly_balance_scores,
        volume_trends: by_group
            .iter_mut()
            .map(|(group, metrics)| volume_trend(group, metrics))
            .collect(),
    }
}

/// Second-half mean minus first-half mean, two decimals
fn improvement_rate(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let (first, second) = values.split_at(values.len() / 2);
    let first_avg = mean(first.iter().copied()).unwrap_or(0.0);
    let second_avg = mean(second.iter().copied()).unwrap_or(0.0);
    round_to(second_avg - first_avg, 2)
}

fn rpe_optimization(values: &[f64]) -> f64 {
    let distance = mean(values.iter().map(|rpe| (rpe - OPTIMAL_RPE).abs())).unwrap_or(0.0);
    (1.0 - distance / MAX_RPE_DISTANCE).max(0.0)
}

/// Zero and absent both mean "not reported"
fn reported_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| *v != 0.0).unwrap_or(default)
}

fn performance_evolution(weeks: &Weeks<'_>) -> PerformanceEvolution {
    let mut completion = Vec::new();
    let mut rpe = Vec::new();
    let mut quality = Vec::new();
    for (week, sessions) in weeks {
        let rows: Vec<&SessionExerciseRow> = sessions
            .iter()
            .flat_map(|s| s.exercises().iter())
            .collect();
        if rows.is_empty() {
            continue;
        }
        completion.push(WeeklyCompletion {
            week: *week,
            avg_completion: mean(rows.iter().map(|r| volume_ratio(r))).unwrap_or(0.0),
        });
        rpe.push(WeeklyRpe {
            week: *week,
            avg_rpe: mean(rows.iter().map(|r| reported_or(r.rpe_reported, DEFAULT_RPE)))
                .unwrap_or(DEFAULT_RPE),
        });
        quality.push(WeeklyQuality {
            week: *week,
            avg_quality: mean(
                rows.iter()
                    .map(|r| reported_or(r.technical_quality, DEFAULT_QUALITY)),
            )
            .unwrap_or(DEFAULT_QUALITY),
        });
    }

    let completions: Vec<f64> = completion.iter().map(|w| w.avg_completion).collect();
    let efforts: Vec<f64> = rpe.iter().map(|w| w.avg_rpe).collect();
    let qualities: Vec<f64> = quality.iter().map(|w| w.avg_quality).collect();

    PerformanceEvolution {
        completion_rate: CompletionEvolution {
            current: reported_or(completions.last().copied(), DEFAULT_COMPLETION),
            improvement_rate: improvement_rate(&completions),
            trend: completion,
        },
        rpe_optimization: RpeEvolution {
            current_avg: reported_or(efforts.last().copied(), DEFAULT_RPE),
            optimization_score: if efforts.is_empty() {
                0.5
            } else {
                rpe_optimization(&efforts)
            },
            trend: rpe,
        },
        technical_quality: QualityEvolution {
            current_avg: reported_or(qualities.last().copied(), DEFAULT_QUALITY),
            improvement_rate: improvement_rate(&qualities),
            trend: quality,
        },
    }
}

/// Areas scored for the summary
const AREA_ICA: &str = "ICA";
const AREA_PROGRESSION: &str = "Exercise Progression";
const AREA_BALANCE: &str = "Muscle Balance";
const AREA_QUALITY: &str = "Performance Quality";

fn summarize(
    ica: &IcaEvolution,
    exercise: &ProgressionEvolution,
    muscle_groups: &MuscleGroupsEvolution,
    performance: &PerformanceEvolution,
) -> EvolutionSummary {
    let ica_points = (ica.current * 5.0).min(5.0);
    let level_points = (exercise.avg_level_current / f64::from(MAX_LEVEL) * 3.0).min(3.0);
    let performance_points = (performance.completion_rate.current * 2.0).min(2.0);
    let overall_progress_score = round_to(ica_points + level_points + performance_points, 1);

    let score = |improving: bool| if improving { 3 } else { 1 };
    let mut areas = [
        (
            AREA_ICA,
            match ica.trend {
                Trend::Improving => 3,
                Trend::Stable => 1,
                Trend::Declining => 0,
            },
        ),
        (AREA_PROGRESSION, score(exercise.overall_trend == Trend::Improving)),
        (AREA_BALANCE, score(muscle_groups.balance_trend == Trend::Improving)),
        (
            AREA_QUALITY,
            score(performance.completion_rate.improvement_rate > 0.0),
        ),
    ];
    // Stable: equal scores keep their listed order
    areas.sort_by_key(|(_, score)| Reverse(*score));
    let [(strongest_improvement, _), .., (area_needing_attention, _)] = areas;

    let weeks = ((f64::from(MAX_LEVEL) - exercise.avg_level_current) / LEVELS_PER_WEEK).ceil() as i64;
    let weeks_to_next_milestone = if weeks == 0 {
        DEFAULT_MILESTONE_WEEKS
    } else {
        weeks
    };

    let overall = if overall_progress_score >= 8.0 {
        "Excellent progress! Keep up the consistency"
    } else if overall_progress_score >= 6.0 {
        "Good progress, focus on the areas that need work"
    } else {
        "More consistency is needed to see better results"
    };
    let strongest = match strongest_improvement {
        AREA_ICA => "Your overall training capacity is improving noticeably",
        AREA_PROGRESSION => "Excellent progression through the exercise levels",
        AREA_BALANCE => "Good balance between muscle groups",
        _ => "Your execution quality is improving",
    };
    let attention = match area_needing_attention {
        AREA_BALANCE => "Work on balancing your muscle groups better",
        AREA_QUALITY => "Focus on improving execution quality",
        _ => "Consider progressing your exercises further",
    };

    EvolutionSummary {
        overall_progress_score,
        strongest_improvement,
        area_needing_attention,
        weeks_to_next_milestone,
        recommendations: vec![overall, strongest, attention],
    }
}
