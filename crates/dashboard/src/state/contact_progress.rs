//! Contact progress view model and the monthly target editor

use prometeo_domain::ContactProgress;

/// Share of `total` reached by `value`, as a rounded percentage.
///
/// `value` is clamped to `[0, total]`; a non-positive total gives 0.
pub fn progress_percent(value: f64, total: f64) -> u32 {
    if total <= 0.0 || !total.is_finite() {
        return 0;
    }
    let clamped = value.clamp(0.0, total);
    (clamped / total * 100.0).round() as u32
}

/// Colour band of a percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressTone {
    Low,
    Medium,
    High,
}

impl ProgressTone {
    pub fn for_percent(percent: u32) -> Self {
        match percent {
            0..=32 => ProgressTone::Low,
            33..=65 => ProgressTone::Medium,
            _ => ProgressTone::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    /// Contacted out of all prioritized clients
    pub general_percent: u32,
    /// Contacted this month out of the monthly target
    pub monthly_percent: u32,
    /// Month-end projection at the expected daily pace, capped at 100
    pub projected_percent: u32,
    pub will_reach_target: bool,
    pub tone: ProgressTone,
}

impl From<&ContactProgress> for ProgressView {
    fn from(progress: &ContactProgress) -> Self {
        let target = progress.monthly_target as f64;
        let projected = progress.contacted_this_month as f64
            + progress.daily_expected * f64::from(progress.days_remaining);
        let monthly_percent = progress_percent(progress.contacted_this_month as f64, target);

        Self {
            general_percent: progress_percent(
                progress.total_contacted as f64,
                progress.total_prioritized as f64,
            ),
            monthly_percent,
            projected_percent: progress_percent(projected, target),
            will_reach_target: projected >= target,
            tone: ProgressTone::for_percent(monthly_percent),
        }
    }
}

/// Inline editor for the monthly target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetEditor {
    pub editing: bool,
    pub input: String,
}

impl TargetEditor {
    pub fn begin(&mut self, current: u64) {
        self.editing = true;
        self.input = current.to_string();
    }

    pub fn cancel(&mut self, current: u64) {
        self.editing = false;
        self.input = current.to_string();
    }

    /// Leave edit mode. Returns the new target when the input is a positive
    /// integer; otherwise the input reverts to `current`.
    pub fn commit(&mut self, current: u64) -> Option<u64> {
        self.editing = false;
        match self.input.trim().parse::<u64>() {
            Ok(target) if target > 0 => Some(target),
            _ => {
                tracing::debug!(input = %self.input, "Invalid monthly target, reverting");
                self.input = current.to_string();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::testing::sample_progress;

    #[test]
    fn percent_is_clamped_and_rounded() {
        assert_eq!(progress_percent(1.0, 3.0), 33);
        assert_eq!(progress_percent(2.0, 3.0), 67);
        assert_eq!(progress_percent(12.0, 10.0), 100);
        assert_eq!(progress_percent(-4.0, 10.0), 0);
        assert_eq!(progress_percent(5.0, 0.0), 0);
    }

    #[test]
    fn view_from_progress() {
        let view = ProgressView::from(&sample_progress());
        assert_eq!(view.general_percent, 47);
        assert_eq!(view.monthly_percent, 45);
        // 90 + 9 * 10 = 180 of 200
        assert_eq!(view.projected_percent, 90);
        assert!(!view.will_reach_target);
        assert_eq!(view.tone, ProgressTone::Medium);
    }

    #[test]
    fn editor_accepts_positive_integers_only() {
        let mut editor = TargetEditor::default();
        editor.begin(200);
        assert_eq!(editor.input, "200");

        editor.input = " 250 ".into();
        assert_eq!(editor.commit(200), Some(250));
        assert!(!editor.editing);

        editor.begin(200);
        editor.input = "0".into();
        assert_eq!(editor.commit(200), None);
        assert_eq!(editor.input, "200");

        editor.begin(200);
        editor.input = "doscientos".into();
        assert_eq!(editor.commit(200), None);
        assert_eq!(editor.input, "200");
    }
}
