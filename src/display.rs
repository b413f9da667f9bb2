//! Display surface: the element set the handlers write into.
//!
//! `Surface` is the only way the handlers touch the host document. Element
//! names follow the markup IDs so a browser-backed surface can map them 1:1.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::health::{progress_width, ColorToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementId {
    // form inputs
    Voltage,
    Current,
    Temperature,
    Cycle,
    // result panel
    ResultContainer,
    Loading,
    SohValue,
    HealthMessage,
    ProgressBar,
    // live monitor
    LiveVoltage,
    LiveCurrent,
    LiveTemp,
    LiveCycle,
    LiveSoH,
}

impl ElementId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementId::Voltage => "voltage",
            ElementId::Current => "current",
            ElementId::Temperature => "temperature",
            ElementId::Cycle => "cycle",
            ElementId::ResultContainer => "resultContainer",
            ElementId::Loading => "loading",
            ElementId::SohValue => "sohValue",
            ElementId::HealthMessage => "healthMessage",
            ElementId::ProgressBar => "progressBar",
            ElementId::LiveVoltage => "liveVoltage",
            ElementId::LiveCurrent => "liveCurrent",
            ElementId::LiveTemp => "liveTemp",
            ElementId::LiveCycle => "liveCycle",
            ElementId::LiveSoH => "liveSoH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleProp {
    Color,
    BackgroundColor,
    Width,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementState {
    pub text: String,
    pub value: String,
    pub hidden: bool,
    pub styles: BTreeMap<StyleProp, String>,
}

pub trait Surface {
    fn set_text(&mut self, id: ElementId, text: &str);
    fn set_hidden(&mut self, id: ElementId, hidden: bool);
    fn set_style(&mut self, id: ElementId, prop: StyleProp, value: &str);
    /// Current text of an input element.
    fn value(&self, id: ElementId) -> String;
    /// Blocking user-visible notice.
    fn alert(&mut self, message: &str);
    /// Called once a handler finishes a batch of writes.
    fn flush(&mut self) {}
}

pub type SharedSurface = Arc<Mutex<dyn Surface + Send>>;

/// In-memory element store. Starts with the result panel and loading
/// indicator hidden, as the markup does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySurface {
    elements: HashMap<ElementId, ElementState>,
    alerts: Vec<String>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    pub fn new() -> Self {
        let mut surface = Self {
            elements: HashMap::new(),
            alerts: Vec::new(),
        };
        surface.set_hidden(ElementId::ResultContainer, true);
        surface.set_hidden(ElementId::Loading, true);
        surface
    }

    pub fn element(&self, id: ElementId) -> ElementState {
        self.elements.get(&id).cloned().unwrap_or_default()
    }

    pub fn text(&self, id: ElementId) -> String {
        self.element(id).text
    }

    pub fn is_hidden(&self, id: ElementId) -> bool {
        self.element(id).hidden
    }

    pub fn style(&self, id: ElementId, prop: StyleProp) -> Option<String> {
        self.element(id).styles.get(&prop).cloned()
    }

    pub fn set_value(&mut self, id: ElementId, value: &str) {
        self.elements.entry(id).or_default().value = value.to_string();
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }
}

impl Surface for MemorySurface {
    fn set_text(&mut self, id: ElementId, text: &str) {
        self.elements.entry(id).or_default().text = text.to_string();
    }

    fn set_hidden(&mut self, id: ElementId, hidden: bool) {
        self.elements.entry(id).or_default().hidden = hidden;
    }

    fn set_style(&mut self, id: ElementId, prop: StyleProp, value: &str) {
        self.elements
            .entry(id)
            .or_default()
            .styles
            .insert(prop, value.to_string());
    }

    fn value(&self, id: ElementId) -> String {
        self.element(id).value
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

const BAR_CELLS: usize = 20;

/// Terminal rendition of the dashboard: keeps element state in memory and
/// redraws the visible panels on every flush.
pub struct ConsoleSurface<W: Write> {
    state: MemorySurface,
    out: W,
}

impl ConsoleSurface<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            state: MemorySurface::new(),
            out,
        }
    }

    pub fn state(&self) -> &MemorySurface {
        &self.state
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn live_line(&self) -> Option<String> {
        let s = &self.state;
        let soh = s.text(ElementId::LiveSoH);
        if soh.is_empty() {
            return None;
        }
        let color = s.style(ElementId::LiveSoH, StyleProp::Color);
        Some(format!(
            "[live]   {} V | {} A | {} C | cycle {} | SoH {}%",
            s.text(ElementId::LiveVoltage),
            s.text(ElementId::LiveCurrent),
            s.text(ElementId::LiveTemp),
            s.text(ElementId::LiveCycle),
            paint(&soh, color.as_deref()),
        ))
    }

    fn result_lines(&self) -> Vec<String> {
        let s = &self.state;
        let mut lines = Vec::new();
        if !s.is_hidden(ElementId::Loading) {
            lines.push("[result] predicting...".to_string());
        }
        if !s.is_hidden(ElementId::ResultContainer) {
            let width = s
                .style(ElementId::ProgressBar, StyleProp::Width)
                .and_then(|w| w.trim_end_matches('%').parse::<f64>().ok())
                .unwrap_or(0.0);
            let filled = (progress_width(width) / 100.0 * BAR_CELLS as f64).round() as usize;
            let bar = format!("{}{}", "#".repeat(filled), "-".repeat(BAR_CELLS - filled));
            let color = s.style(ElementId::HealthMessage, StyleProp::Color);
            lines.push(format!(
                "[result] SoH {}% [{}] {}",
                s.text(ElementId::SohValue),
                paint(&bar, color.as_deref()),
                paint(&s.text(ElementId::HealthMessage), color.as_deref()),
            ));
        }
        lines
    }
}

impl<W: Write> Surface for ConsoleSurface<W> {
    fn set_text(&mut self, id: ElementId, text: &str) {
        self.state.set_text(id, text);
    }

    fn set_hidden(&mut self, id: ElementId, hidden: bool) {
        self.state.set_hidden(id, hidden);
    }

    fn set_style(&mut self, id: ElementId, prop: StyleProp, value: &str) {
        self.state.set_style(id, prop, value);
    }

    fn value(&self, id: ElementId) -> String {
        self.state.value(id)
    }

    fn alert(&mut self, message: &str) {
        self.state.alert(message);
        let _ = writeln!(self.out, "[alert]  {}", message);
    }

    fn flush(&mut self) {
        let mut lines: Vec<String> = self.live_line().into_iter().collect();
        lines.extend(self.result_lines());
        for line in lines {
            let _ = writeln!(self.out, "{}", line);
        }
        let _ = self.out.flush();
    }
}

fn paint(text: &str, css_color: Option<&str>) -> String {
    let code = match css_color {
        Some(c) if c == ColorToken::Success.css_var() => "32",
        Some(c) if c == ColorToken::Warning.css_var() => "33",
        Some(c) if c == ColorToken::Danger.css_var() => "31",
        _ => return text.to_string(),
    };
    format!("\x1b[{}m{}\x1b[0m", code, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_defaults() {
        let s = MemorySurface::new();
        assert!(s.is_hidden(ElementId::ResultContainer));
        assert!(s.is_hidden(ElementId::Loading));
        assert!(!s.is_hidden(ElementId::LiveSoH));
        assert!(s.alerts().is_empty());
    }

    #[test]
    fn test_memory_surface_records_writes() {
        let mut s = MemorySurface::new();
        s.set_text(ElementId::SohValue, "82.3");
        s.set_style(ElementId::ProgressBar, StyleProp::Width, "82.3%");
        s.set_value(ElementId::Voltage, "3.7");
        s.alert("hello");
        assert_eq!(s.text(ElementId::SohValue), "82.3");
        assert_eq!(s.style(ElementId::ProgressBar, StyleProp::Width).as_deref(), Some("82.3%"));
        assert_eq!(s.value(ElementId::Voltage), "3.7");
        assert_eq!(s.alerts(), ["hello".to_string()]);
    }

    #[test]
    fn test_element_ids_match_markup() {
        assert_eq!(ElementId::LiveSoH.as_str(), "liveSoH");
        assert_eq!(ElementId::ResultContainer.as_str(), "resultContainer");
    }

    #[test]
    fn test_console_flush_draws_visible_panels() {
        let mut c = ConsoleSurface::new(Vec::new());
        c.flush();
        assert!(c.out.is_empty());

        c.set_text(ElementId::LiveVoltage, "3.700");
        c.set_text(ElementId::LiveCurrent, "-1.200");
        c.set_text(ElementId::LiveTemp, "25.0");
        c.set_text(ElementId::LiveCycle, "50");
        c.set_text(ElementId::LiveSoH, "82.3");
        c.set_text(ElementId::SohValue, "45.0");
        c.set_text(ElementId::HealthMessage, "Battery Replacement Recommended");
        c.set_style(ElementId::ProgressBar, StyleProp::Width, "45%");
        c.set_hidden(ElementId::ResultContainer, false);
        c.flush();

        let out = String::from_utf8(c.into_inner()).unwrap();
        assert!(out.contains("[live]   3.700 V | -1.200 A | 25.0 C | cycle 50 | SoH 82.3%"));
        assert!(out.contains("[result] SoH 45.0% [#########-----------]"));
        assert!(out.contains("Battery Replacement Recommended"));
    }

    #[test]
    fn test_console_alert_is_printed() {
        let mut c = ConsoleSurface::new(Vec::new());
        c.alert("backend down");
        assert_eq!(c.state().alerts().len(), 1);
        let out = String::from_utf8(c.into_inner()).unwrap();
        assert_eq!(out, "[alert]  backend down\n");
    }
}
