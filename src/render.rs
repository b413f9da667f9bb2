//! ClassifyAndRender: one classification, two target panels.

use crate::display::{ElementId, StyleProp, Surface};
use crate::health::{
    classify, fmt_current, fmt_cycle, fmt_soh, fmt_temperature, fmt_voltage, progress_width_css,
    HealthClass,
};
use crate::logging::log_render;
use crate::reading::Reading;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    /// Prediction result: soh label, message, progress bar.
    Result,
    /// Live monitor: five readouts, soh coloured by tier.
    Live,
}

impl Panel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Panel::Result => "result",
            Panel::Live => "live",
        }
    }
}

/// Write `reading` onto `panel` and return the class it was rendered with.
/// Visibility of the result panel is left to the caller.
pub fn classify_and_render(surface: &mut dyn Surface, panel: Panel, reading: &Reading) -> HealthClass {
    let class = classify(reading.soh);
    let color = class.color.css_var();
    match panel {
        Panel::Result => {
            surface.set_text(ElementId::SohValue, &fmt_soh(reading.soh));
            surface.set_style(ElementId::ProgressBar, StyleProp::Width, &progress_width_css(reading.soh));
            surface.set_text(ElementId::HealthMessage, class.message);
            surface.set_style(ElementId::HealthMessage, StyleProp::Color, &color);
            surface.set_style(ElementId::ProgressBar, StyleProp::BackgroundColor, &color);
        }
        Panel::Live => {
            surface.set_text(ElementId::LiveVoltage, &fmt_voltage(reading.voltage));
            surface.set_text(ElementId::LiveCurrent, &fmt_current(reading.current));
            surface.set_text(ElementId::LiveTemp, &fmt_temperature(reading.temperature));
            surface.set_text(ElementId::LiveCycle, &fmt_cycle(reading.cycle));
            surface.set_text(ElementId::LiveSoH, &fmt_soh(reading.soh));
            surface.set_style(ElementId::LiveSoH, StyleProp::Color, &color);
        }
    }
    log_render(panel.as_str(), reading.soh, class.tier.as_str());
    class
}
