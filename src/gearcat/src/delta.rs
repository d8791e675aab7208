//! Stat deltas between the Base tier and an upgrade tier
//!
//! A delta is always expressed in the base value's format. Rendering is kept
//! in [`render_delta`] so the output convention lives in one place.

use crate::value::{StatFormat, StatValue};
use crate::{Error, Result};

/// Delta stored for a tier that has no data for a stat
pub const DEFAULT_DELTA: &str = "0";

/// Compute `upgraded - base` for one stat.
///
/// Both values must share a format; a mismatch is reported as
/// [`Error::InconsistentStatFormat`] rather than coerced.
pub fn stat_delta(stat: &str, base: StatValue, upgraded: StatValue) -> Result<StatValue> {
    if base.format != upgraded.format {
        return Err(Error::InconsistentStatFormat {
            stat: stat.to_string(),
            base: base.format,
            upgraded: upgraded.format,
        });
    }

    Ok(StatValue::new(upgraded.magnitude - base.magnitude, base.format))
}

/// Render a delta in the source document convention.
///
/// Flat deltas are truncated toward zero (`19.6` → `"19"`), which drops any
/// fractional part. Percentage deltas keep one decimal (`"2.5%"`).
pub fn render_delta(delta: StatValue) -> String {
    // Avoid "-0" / "-0.0" when the difference cancels out
    let magnitude = if delta.magnitude == 0.0 {
        0.0
    } else {
        delta.magnitude
    };

    match delta.format {
        StatFormat::Flat => format!("{}", magnitude.trunc() as i64),
        StatFormat::Percentage => {
            let rendered = format!("{:.1}", magnitude);
            if rendered == "-0.0" {
                "0.0%".to_string()
            } else {
                format!("{rendered}%")
            }
        }
    }
}

/// Parse both raw strings and render their delta
pub fn delta_between(stat: &str, base: &str, upgraded: &str) -> Result<String> {
    let base = StatValue::parse(base)?;
    let upgraded = StatValue::parse(upgraded)?;
    stat_delta(stat, base, upgraded).map(render_delta)
}
