//! Streak calculation engine.
//!
//! Derives the *current* and *longest* streak of a habit from the calendar
//! dates on which it was completed:
//! - **Current streak**: consecutive days ending at the anchor date, where the
//!   anchor is `today` if completed, otherwise `today - 1` if completed.
//!   Anything older means the streak is broken and the value is 0.
//! - **Longest streak**: the longest run of calendar-consecutive dates anywhere
//!   in the history, independent of `today`.
//!
//! The calculator is pure. Input may be unordered or contain duplicates.
//! Absent input goes through [`StreakCalculator::calculate_optional`], where
//! `None` means "no completions".

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Result of a streak calculation.
///
/// `longest_streak >= current_streak` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakResult {
    pub current_streak: u32,
    pub longest_streak: u32,
}

impl StreakResult {
    pub fn new(current_streak: u32, longest_streak: u32) -> Self {
        Self {
            current_streak,
            longest_streak,
        }
    }
}

/// Stateless streak calculator.
///
/// Holds no data; safe to share across threads and call concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreakCalculator;

impl StreakCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Calculate current and longest streaks as of `today`.
    ///
    /// # Arguments
    /// * `dates` - Completion dates in any order; duplicates count once.
    /// * `today` - Anchor date for the current streak
    pub fn calculate_streaks<I>(&self, dates: I, today: NaiveDate) -> StreakResult
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        // One dedup step: the BTreeSet is both the sorted sequence and the lookup set.
        let days: BTreeSet<NaiveDate> = dates.into_iter().collect();
        if days.is_empty() {
            return StreakResult::default();
        }

        StreakResult {
            current_streak: current_streak(&days, today),
            longest_streak: longest_streak(&days),
        }
    }

    /// Like [`calculate_streaks`](Self::calculate_streaks), but `None` means
    /// no completions at all.
    pub fn calculate_optional<I>(&self, dates: Option<I>, today: NaiveDate) -> StreakResult
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        self.calculate_streaks(dates.into_iter().flatten(), today)
    }
}

/// Shorthand for `StreakCalculator::new().calculate_streaks(dates, today)`.
pub fn calculate_streaks<I>(dates: I, today: NaiveDate) -> StreakResult
where
    I: IntoIterator<Item = NaiveDate>,
{
    StreakCalculator.calculate_streaks(dates, today)
}

/// Pick the day the backward walk starts from: today, else yesterday.
fn anchor(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> Option<NaiveDate> {
    if days.contains(&today) {
        return Some(today);
    }
    today.pred_opt().filter(|yesterday| days.contains(yesterday))
}

fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(anchor) = anchor(days, today) else {
        return 0;
    };

    // Walk backward from the anchor; stops at the first missing day.
    let mut streak = 0;
    let mut expected = Some(anchor);
    for day in days.range(..=anchor).rev() {
        if Some(*day) != expected {
            break;
        }
        streak += 1;
        expected = day.pred_opt();
    }
    streak
}

fn longest_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;

    for day in days {
        run = match prev.and_then(|p| p.succ_opt()) {
            Some(next) if next == *day => run + 1,
            _ => 1,
        };
        // Strict comparison keeps the first maximal run.
        if run > longest {
            longest = run;
        }
        prev = Some(*day);
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn days_ago(offsets: &[i64]) -> Vec<NaiveDate> {
        offsets
            .iter()
            .map(|d| today() - Duration::days(*d))
            .collect()
    }

    #[test]
    fn empty_input_has_no_streak() {
        let result = calculate_streaks(Vec::new(), today());
        assert_eq!(result, StreakResult::new(0, 0));
    }

    #[test]
    fn absent_input_is_treated_as_empty() {
        let calc = StreakCalculator::new();
        let absent: Option<Vec<NaiveDate>> = None;
        assert_eq!(calc.calculate_optional(absent, today()), StreakResult::new(0, 0));
        assert_eq!(
            calc.calculate_streaks(None::<NaiveDate>, today()),
            StreakResult::new(0, 0)
        );
    }

    #[test]
    fn present_optional_input_is_used() {
        let calc = StreakCalculator::new();
        let result = calc.calculate_optional(Some(days_ago(&[0, 1, 5])), today());
        assert_eq!(result, StreakResult::new(2, 2));
    }

    #[test]
    fn streak_including_today() {
        let result = calculate_streaks(days_ago(&[0, 1, 2]), today());
        assert_eq!(result, StreakResult::new(3, 3));
    }

    #[test]
    fn streak_continues_into_yesterday() {
        let result = calculate_streaks(days_ago(&[1, 2, 3]), today());
        assert_eq!(result, StreakResult::new(3, 3));
    }

    #[test]
    fn stale_streak_breaks_current() {
        let result = calculate_streaks(days_ago(&[3, 4]), today());
        assert_eq!(result, StreakResult::new(0, 2));
    }

    #[test]
    fn two_days_stale_is_broken() {
        let result = calculate_streaks(days_ago(&[2, 3, 4, 5, 6]), today());
        assert_eq!(result, StreakResult::new(0, 5));
    }

    #[test]
    fn longest_run_is_earlier_block() {
        let result = calculate_streaks(days_ago(&[10, 9, 8, 7, 5, 4, 1]), today());
        assert_eq!(result, StreakResult::new(1, 4));
    }

    #[test]
    fn longest_run_with_gaps_and_broken_current() {
        let result = calculate_streaks(days_ago(&[10, 9, 8, 7, 5, 4]), today());
        assert_eq!(result, StreakResult::new(0, 4));
    }

    #[test]
    fn equal_runs_report_their_length() {
        let result = calculate_streaks(days_ago(&[10, 9, 8, 5, 4, 3, 1]), today());
        assert_eq!(result, StreakResult::new(1, 3));
    }

    #[test]
    fn single_completion_today() {
        let result = calculate_streaks(days_ago(&[0]), today());
        assert_eq!(result, StreakResult::new(1, 1));
    }

    #[test]
    fn single_completion_yesterday() {
        let result = calculate_streaks(days_ago(&[1]), today());
        assert_eq!(result, StreakResult::new(1, 1));
    }

    #[test]
    fn duplicates_count_as_one_day() {
        let result = calculate_streaks(days_ago(&[0, 0, 1, 1]), today());
        assert_eq!(result, StreakResult::new(2, 2));
    }

    #[test]
    fn future_dates_only_affect_longest() {
        // Tomorrow extends the run in history but the walk starts at today.
        let result = calculate_streaks(days_ago(&[-1, 0, 1]), today());
        assert_eq!(result, StreakResult::new(2, 3));
    }

    #[test]
    fn streaks_cross_month_and_year_boundaries() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2025, 12, 30).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
        ];
        let today = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_eq!(calculate_streaks(dates, today), StreakResult::new(4, 4));
    }

    #[test]
    fn leap_day_is_a_calendar_day() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2028, 2, 28).unwrap(),
            NaiveDate::from_ymd_opt(2028, 2, 29).unwrap(),
            NaiveDate::from_ymd_opt(2028, 3, 1).unwrap(),
        ];
        let today = NaiveDate::from_ymd_opt(2028, 3, 2).unwrap();
        assert_eq!(calculate_streaks(dates, today), StreakResult::new(3, 3));
    }

    #[test]
    fn earliest_representable_date_does_not_underflow() {
        let dates = vec![NaiveDate::MIN, NaiveDate::MIN.succ_opt().unwrap()];
        let today = NaiveDate::MIN.succ_opt().unwrap();
        assert_eq!(calculate_streaks(dates, today), StreakResult::new(2, 2));
    }

    #[test]
    fn calculator_is_idempotent() {
        let calc = StreakCalculator::new();
        let dates = days_ago(&[0, 1, 2, 7, 8]);
        let first = calc.calculate_streaks(dates.clone(), today());
        let second = calc.calculate_streaks(dates, today());
        assert_eq!(first, second);
    }

    /// Counts every event dispatched while it is the default subscriber.
    struct EventCounter(std::sync::Arc<std::sync::atomic::AtomicUsize>);

    impl tracing::Subscriber for EventCounter {
        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }
        fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }
        fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}
        fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}
        fn event(&self, _: &tracing::Event<'_>) {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
        fn enter(&self, _: &tracing::span::Id) {}
        fn exit(&self, _: &tracing::span::Id) {}
    }

    #[test]
    fn calculator_emits_no_events() {
        let count = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let subscriber = EventCounter(count.clone());
        tracing::subscriber::with_default(subscriber, || {
            calculate_streaks(days_ago(&[0, 1, 2, 9]), today());
        });
        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn accepts_borrowed_dates() {
        let dates = days_ago(&[0, 1]);
        let result = calculate_streaks(dates.iter().copied(), today());
        assert_eq!(result, StreakResult::new(2, 2));
        assert_eq!(dates.len(), 2);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(StreakResult::new(2, 5)).unwrap();
        assert_eq!(json["currentStreak"], 2);
        assert_eq!(json["longestStreak"], 5);
    }

    /// Straightforward O(n^2) model used as an oracle for the property tests.
    fn naive_streaks(dates: &[NaiveDate], today: NaiveDate) -> StreakResult {
        let has = |d: NaiveDate| dates.contains(&d);
        let run_ending_at = |end: NaiveDate| {
            let mut n = 0;
            let mut d = end;
            while has(d) {
                n += 1;
                d = d - Duration::days(1);
            }
            n
        };
        let yesterday = today - Duration::days(1);
        let current = if has(today) {
            run_ending_at(today)
        } else if has(yesterday) {
            run_ending_at(yesterday)
        } else {
            0
        };
        let longest = dates.iter().map(|d| run_ending_at(*d)).max().unwrap_or(0);
        StreakResult::new(current, longest)
    }

    fn date_set() -> impl Strategy<Value = Vec<NaiveDate>> {
        prop::collection::vec(-3i64..40, 0..30).prop_map(|offsets| days_ago(&offsets))
    }

    proptest! {
        #[test]
        fn longest_never_below_current(dates in date_set()) {
            let r = calculate_streaks(dates, today());
            prop_assert!(r.longest_streak >= r.current_streak);
        }

        #[test]
        fn duplicating_input_changes_nothing(dates in date_set()) {
            let doubled: Vec<_> = dates.iter().chain(dates.iter()).copied().collect();
            prop_assert_eq!(
                calculate_streaks(dates, today()),
                calculate_streaks(doubled, today())
            );
        }

        #[test]
        fn order_does_not_matter(shuffled in date_set().prop_shuffle()) {
            let mut sorted = shuffled.clone();
            sorted.sort();
            prop_assert_eq!(
                calculate_streaks(shuffled, today()),
                calculate_streaks(sorted, today())
            );
        }

        #[test]
        fn matches_naive_model(dates in date_set()) {
            prop_assert_eq!(
                calculate_streaks(dates.clone(), today()),
                naive_streaks(&dates, today())
            );
        }

        #[test]
        fn empty_is_zero_for_any_anchor(offset in -1000i64..1000) {
            let anchor = today() + Duration::days(offset);
            prop_assert_eq!(calculate_streaks(Vec::new(), anchor), StreakResult::default());
        }
    }
}
