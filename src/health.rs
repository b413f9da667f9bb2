//! SoH classification and number formatting shared by both panels.

use serde::Serialize;

pub const GOOD_THRESHOLD: f64 = 80.0;
pub const DEGRADED_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Good,
    Degraded,
    Replace,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Good => "good",
            Tier::Degraded => "degraded",
            Tier::Replace => "replace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorToken {
    Success,
    Warning,
    Danger,
}

impl ColorToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorToken::Success => "success",
            ColorToken::Warning => "warning",
            ColorToken::Danger => "danger",
        }
    }

    /// Stylesheet reference, e.g. `var(--success-color)`.
    pub fn css_var(&self) -> String {
        format!("var(--{}-color)", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthClass {
    pub tier: Tier,
    pub message: &'static str,
    pub color: ColorToken,
}

const GOOD: HealthClass = HealthClass {
    tier: Tier::Good,
    message: "Battery is in Good Condition",
    color: ColorToken::Success,
};

const DEGRADED: HealthClass = HealthClass {
    tier: Tier::Degraded,
    message: "Battery Degradation Detected",
    color: ColorToken::Warning,
};

const REPLACE: HealthClass = HealthClass {
    tier: Tier::Replace,
    message: "Battery Replacement Recommended",
    color: ColorToken::Danger,
};

/// Bucket a raw SoH value. Lower bounds are inclusive; NaN falls through to
/// the replace tier.
pub fn classify(soh: f64) -> HealthClass {
    if soh >= GOOD_THRESHOLD {
        GOOD
    } else if soh >= DEGRADED_THRESHOLD {
        DEGRADED
    } else {
        REPLACE
    }
}

/// Progress-bar fill in percent, clamped to [0, 100].
pub fn progress_width(soh: f64) -> f64 {
    if soh.is_nan() {
        return 0.0;
    }
    soh.clamp(0.0, 100.0)
}

/// CSS width value for the progress bar, e.g. `82.3%`.
pub fn progress_width_css(soh: f64) -> String {
    format!("{}%", progress_width(soh))
}

pub fn fmt_voltage(v: f64) -> String {
    format!("{:.3}", v)
}

pub fn fmt_current(a: f64) -> String {
    format!("{:.3}", a)
}

pub fn fmt_temperature(c: f64) -> String {
    format!("{:.1}", c)
}

pub fn fmt_cycle(n: u32) -> String {
    n.to_string()
}

pub fn fmt_soh(soh: f64) -> String {
    format!("{:.1}", soh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_inclusive() {
        assert_eq!(classify(80.0).tier, Tier::Good);
        assert_eq!(classify(60.0).tier, Tier::Degraded);
        assert_eq!(classify(79.999).tier, Tier::Degraded);
        assert_eq!(classify(59.999).tier, Tier::Replace);
    }

    #[test]
    fn test_over_hundred_stays_good() {
        for soh in [100.0, 150.0] {
            let class = classify(soh);
            assert_eq!(class.message, "Battery is in Good Condition");
            assert_eq!(class.color, ColorToken::Success);
        }
    }

    #[test]
    fn test_each_tier_has_one_message_and_color() {
        assert_eq!(
            classify(70.0),
            HealthClass {
                tier: Tier::Degraded,
                message: "Battery Degradation Detected",
                color: ColorToken::Warning,
            }
        );
        assert_eq!(
            classify(-5.0),
            HealthClass {
                tier: Tier::Replace,
                message: "Battery Replacement Recommended",
                color: ColorToken::Danger,
            }
        );
    }

    #[test]
    fn test_classify_total_over_odd_inputs() {
        assert_eq!(classify(f64::NAN).tier, Tier::Replace);
        assert_eq!(classify(f64::INFINITY).tier, Tier::Good);
        assert_eq!(classify(f64::NEG_INFINITY).tier, Tier::Replace);
    }

    #[test]
    fn test_progress_width_clamps() {
        assert_eq!(progress_width(150.0), 100.0);
        assert_eq!(progress_width(45.0), 45.0);
        assert_eq!(progress_width(-3.0), 0.0);
        assert_eq!(progress_width(f64::NAN), 0.0);
        assert_eq!(progress_width_css(82.3), "82.3%");
        assert_eq!(progress_width_css(150.0), "100%");
    }

    #[test]
    fn test_formatting_precision() {
        assert_eq!(fmt_voltage(3.7), "3.700");
        assert_eq!(fmt_current(-1.2), "-1.200");
        assert_eq!(fmt_temperature(25.0), "25.0");
        assert_eq!(fmt_cycle(50), "50");
        assert_eq!(fmt_soh(82.3), "82.3");
        assert_eq!(fmt_soh(150.0), "150.0");
    }

    #[test]
    fn test_css_var() {
        assert_eq!(ColorToken::Danger.css_var(), "var(--danger-color)");
    }
}
