use crate::error::{TimelineError, TimelineResult};

use super::TimelineConfig;

const BUCKET_MS: i64 = 60_000;

pub(super) fn validate_config(config: TimelineConfig) -> TimelineResult<TimelineConfig> {
    if config.max_span_ms < BUCKET_MS || config.max_span_ms % BUCKET_MS != 0 {
        return Err(TimelineError::InvalidData(
            "max span must be a positive whole number of minutes".to_owned(),
        ));
    }
    if config.selection_debounce_ms == 0 {
        return Err(TimelineError::InvalidData(
            "selection debounce must be > 0".to_owned(),
        ));
    }
    validate_multiplier(config.padding.left_multiplier, "left padding multiplier")?;
    validate_multiplier(config.padding.right_multiplier, "right padding multiplier")?;
    if config.click_selection_width_ms <= 0 {
        return Err(TimelineError::InvalidData(
            "click selection width must be > 0".to_owned(),
        ));
    }
    if config.min_selection_width_ms <= 0 {
        return Err(TimelineError::InvalidData(
            "min selection width must be > 0".to_owned(),
        ));
    }
    if !config.keyboard_step_ratio.is_finite()
        || config.keyboard_step_ratio <= 0.0
        || config.keyboard_step_ratio > 1.0
    {
        return Err(TimelineError::InvalidData(
            "keyboard step ratio must be finite and in (0, 1]".to_owned(),
        ));
    }
    Ok(config)
}

fn validate_multiplier(value: f64, name: &str) -> TimelineResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(TimelineError::InvalidData(format!(
            "{name} must be finite and >= 0"
        )));
    }
    Ok(())
}
