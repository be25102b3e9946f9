//! Uncompetitive at-bat (UAB) labeling.
//!
//! A plate appearance is uncompetitive when any of these fire:
//! - Rule 1: over in 3 pitches or fewer on a strikeout, strikeout double play or pop out
//! - Rule 2: a strikeout in 4 pitches or fewer
//! - Rule 3: weak contact, exit velocity under 80 mph with xwOBA under .200
//!
//! Rule 3 needs both contact measurements; if either is missing it does not fire.

use crate::types::{AtBatLabel, PlateAppearance};

/// Outcomes that count toward rule 1 when the at-bat is short.
pub const QUICK_OUT_EVENTS: [&str; 3] = ["strikeout", "strikeout_double_play", "pop_out"];

/// Thresholds for the three labeling rules.
#[derive(Debug, Clone)]
pub struct LabelRules {
    /// Rule 1 pitch-count ceiling, inclusive (default 3).
    pub quick_out_max_pitches: u32,
    /// Rule 2 pitch-count ceiling for strikeouts, inclusive (default 4).
    pub strikeout_max_pitches: u32,
    /// Rule 3 exit-velocity ceiling in mph, exclusive (default 80.0).
    pub weak_contact_max_speed: f64,
    /// Rule 3 xwOBA ceiling, exclusive (default 0.200).
    pub weak_contact_max_xwoba: f64,
}

impl Default for LabelRules {
    fn default() -> Self {
        Self {
            quick_out_max_pitches: 3,
            strikeout_max_pitches: 4,
            weak_contact_max_speed: 80.0,
            weak_contact_max_xwoba: 0.200,
        }
    }
}

impl LabelRules {
    /// Classify one plate appearance.
    pub fn classify(&self, pa: &PlateAppearance) -> AtBatLabel {
        let events = pa.events.as_deref();

        // Rule 1: quick out
        let quick_out = pa.pitch_number <= self.quick_out_max_pitches
            && events.is_some_and(|e| QUICK_OUT_EVENTS.contains(&e));

        // Rule 2: short strikeout
        let short_strikeout =
            events == Some("strikeout") && pa.pitch_number <= self.strikeout_max_pitches;

        // Rule 3: weak contact
        let weak_contact = match (pa.launch_speed, pa.estimated_woba) {
            (Some(speed), Some(xwoba)) => {
                speed < self.weak_contact_max_speed && xwoba < self.weak_contact_max_xwoba
            }
            _ => false,
        };

        if quick_out || short_strikeout || weak_contact {
            AtBatLabel::Uncompetitive
        } else {
            AtBatLabel::Competitive
        }
    }
}

/// Label with the default rules: 1 for uncompetitive, 0 for competitive.
pub fn label_uab(pa: &PlateAppearance) -> u32 {
    LabelRules::default().classify(pa).uab()
}
