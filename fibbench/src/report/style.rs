use plotters::style::RGBColor;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Square,
    Triangle,
    Diamond,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesStyle {
    /// `(r, g, b)`
    pub color: (u8, u8, u8),
    pub marker: Marker,
}

impl SeriesStyle {
    pub fn new(color: (u8, u8, u8), marker: Marker) -> Self {
        Self { color, marker }
    }

    pub fn rgb(&self) -> RGBColor {
        let (r, g, b) = self.color;
        RGBColor(r, g, b)
    }
}

/// Colour and marker per service. Services without an entry get the fallback style.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    styles: HashMap<String, SeriesStyle>,
    fallback: SeriesStyle,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::empty()
            .with("rust", SeriesStyle::new((0, 0, 255), Marker::Circle))
            .with("go", SeriesStyle::new((0, 128, 0), Marker::Square))
            .with("java", SeriesStyle::new((255, 165, 0), Marker::Triangle))
            .with("python", SeriesStyle::new((255, 0, 0), Marker::Diamond))
    }
}

impl ChartStyle {
    pub fn empty() -> Self {
        Self {
            styles: HashMap::new(),
            fallback: SeriesStyle::new((0, 0, 0), Marker::Circle),
        }
    }

    pub fn with(mut self, service: &str, style: SeriesStyle) -> Self {
        self.styles.insert(service.to_string(), style);
        self
    }

    pub fn get(&self, service: &str) -> &SeriesStyle {
        self.styles.get(service).unwrap_or(&self.fallback)
    }
}
