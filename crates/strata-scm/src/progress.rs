//! Day-based progress reporting for log retrieval.

use chrono::{DateTime, NaiveDate, Utc};
use indicatif::{ProgressBar, ProgressStyle};

/// Adapts an indicatif bar to the pace of SCM log consumption.
///
/// The log window spans `after..now`; each parsed commit advances the bar
/// to the number of days between `after` and the commit date, so the bar
/// measures calendar coverage rather than entry count (entry counts are
/// unknown up front).
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use strata_scm::LogProgress;
///
/// let now = Utc::now();
/// let mut progress = LogProgress::hidden(now - Duration::days(10), now);
/// progress.update(now - Duration::days(3));
/// assert_eq!(progress.position(), 7);
/// ```
pub struct LogProgress {
    bar: ProgressBar,
    after: NaiveDate,
    count: i64,
}

impl LogProgress {
    /// Create a visible progress bar covering `after..now`.
    pub fn new(after: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let total = total_days(after, now);
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} days ({elapsed})")
                .unwrap(),
        );
        Self {
            bar,
            after: after.date_naive(),
            count: 0,
        }
    }

    /// Create an invisible bar with the same arithmetic, for tests and
    /// non-TTY runs.
    pub fn hidden(after: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(total_days(after, now));
        Self {
            bar,
            after: after.date_naive(),
            count: 0,
        }
    }

    /// Advance to the day of `entry_date`; earlier dates never move the
    /// bar backwards.
    pub fn update(&mut self, entry_date: DateTime<Utc>) {
        let days = (entry_date.date_naive() - self.after).num_days();
        if days > self.count {
            self.bar.inc((days - self.count) as u64);
            self.count = days;
        }
    }

    /// Current position in days.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Complete and clear the bar.
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

fn total_days(after: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now.date_naive() - after.date_naive()).num_days().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn position_tracks_days_from_after() {
        let now = Utc::now();
        let mut progress = LogProgress::hidden(now - Duration::days(9), now);
        progress.update(now - Duration::days(6));
        assert_eq!(progress.position(), 3);
        progress.update(now - Duration::days(1));
        assert_eq!(progress.position(), 8);
    }

    #[test]
    fn never_moves_backwards() {
        let now = Utc::now();
        let mut progress = LogProgress::hidden(now - Duration::days(9), now);
        progress.update(now - Duration::days(1));
        let at_peak = progress.position();
        progress.update(now - Duration::days(8));
        assert_eq!(progress.position(), at_peak);
    }

    #[test]
    fn dates_before_window_do_not_underflow() {
        let now = Utc::now();
        let mut progress = LogProgress::hidden(now - Duration::days(5), now);
        progress.update(now - Duration::days(30));
        assert_eq!(progress.position(), 0);
    }
}
