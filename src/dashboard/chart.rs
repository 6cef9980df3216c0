//! Per-chart column choices.
//!
//! A slot is `None` when the table had no column of the kind the chart
//! needs; the chart is then simply not drawn.

use crate::table::ColumnType;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Histogram,
    Scatter,
    Bar,
    Pie,
    Box,
    Bubble,
    Line,
}

impl ChartKind {
    pub const ALL: [Self; 7] = [
        Self::Histogram,
        Self::Scatter,
        Self::Bar,
        Self::Pie,
        Self::Box,
        Self::Bubble,
        Self::Line,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Histogram => "histogram",
            Self::Scatter => "scatter",
            Self::Bar => "bar",
            Self::Pie => "pie",
            Self::Box => "box",
            Self::Bubble => "bubble",
            Self::Line => "line",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column reference inside a chart, with the classification it needs.
/// `expected == None` accepts any column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slot<'a> {
    pub chart: ChartKind,
    pub role: &'static str,
    pub column: &'a str,
    pub expected: Option<ColumnType>,
}

fn slot<'a>(
    chart: ChartKind,
    role: &'static str,
    column: Option<&'a String>,
    expected: Option<ColumnType>,
) -> Option<Slot<'a>> {
    column.map(|c| Slot {
        chart,
        role,
        column: c.as_str(),
        expected,
    })
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramChart {
    pub column: Option<String>,
}

/// Points of `y` against `x`; either axis may be a category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterChart {
    pub x: Option<String>,
    pub y: Option<String>,
}

/// Bars of `y` per `x` category, optionally with a second series.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarChart {
    pub x: Option<String>,
    pub y: Option<String>,
    pub show_second: bool,
    pub second_y: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieChart {
    pub column: Option<String>,
    /// Size of the centre hole as a percentage of the radius
    pub hole_percent: u8,
}

impl Default for PieChart {
    fn default() -> Self {
        Self {
            column: None,
            hole_percent: 45,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxChart {
    pub column: Option<String>,
    pub group_by: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleChart {
    pub x: Option<String>,
    pub y: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineChart {
    pub x: Option<String>,
    pub y: Vec<String>,
}

/// Column choices for every chart kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub histogram: HistogramChart,
    pub scatter: ScatterChart,
    pub bar: BarChart,
    pub pie: PieChart,
    #[serde(rename = "box")]
    pub box_plot: BoxChart,
    pub bubble: BubbleChart,
    pub line: LineChart,
}

impl ChartSettings {
    /// Every column reference, in chart order.
    pub fn slots(&self) -> Vec<Slot<'_>> {
        use ChartKind as K;
        use ColumnType::{Categorical, Numeric};

        let mut slots: Vec<Slot<'_>> = [
            slot(K::Histogram, "column", self.histogram.column.as_ref(), Some(Numeric)),
            slot(K::Scatter, "x", self.scatter.x.as_ref(), None),
            slot(K::Scatter, "y", self.scatter.y.as_ref(), None),
            slot(K::Bar, "x", self.bar.x.as_ref(), Some(Categorical)),
            slot(K::Bar, "y", self.bar.y.as_ref(), Some(Numeric)),
            slot(
                K::Bar,
                "second_y",
                self.bar.second_y.as_ref().filter(|_| self.bar.show_second),
                Some(Numeric),
            ),
            slot(K::Pie, "column", self.pie.column.as_ref(), Some(Categorical)),
            slot(K::Box, "column", self.box_plot.column.as_ref(), Some(Numeric)),
            slot(K::Box, "group_by", self.box_plot.group_by.as_ref(), Some(Categorical)),
            slot(K::Bubble, "x", self.bubble.x.as_ref(), Some(Numeric)),
            slot(K::Bubble, "y", self.bubble.y.as_ref(), Some(Numeric)),
            slot(K::Bubble, "size", self.bubble.size.as_ref(), Some(Numeric)),
            slot(K::Bubble, "color", self.bubble.color.as_ref(), Some(Categorical)),
            slot(K::Line, "x", self.line.x.as_ref(), None),
        ]
        .into_iter()
        .flatten()
        .collect();

        slots.extend(self.line.y.iter().map(|c| Slot {
            chart: K::Line,
            role: "y",
            column: c.as_str(),
            expected: Some(Numeric),
        }));
        slots
    }

    /// Columns drawn by one chart kind.
    pub fn columns_for(&self, kind: ChartKind) -> Vec<&str> {
        self.slots()
            .into_iter()
            .filter(|s| s.chart == kind)
            .map(|s| s.column)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_bar_series_only_counts_when_shown() {
        let mut charts = ChartSettings::default();
        charts.bar.x = Some("city".to_owned());
        charts.bar.second_y = Some("b".to_owned());
        assert_eq!(charts.columns_for(ChartKind::Bar), vec!["city"]);

        charts.bar.show_second = true;
        assert_eq!(charts.columns_for(ChartKind::Bar), vec!["city", "b"]);
    }

    #[test]
    fn test_line_series_are_numeric_slots() {
        let mut charts = ChartSettings::default();
        charts.line.x = Some("date".to_owned());
        charts.line.y = vec!["a".to_owned(), "b".to_owned()];
        let slots = charts.slots();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].expected, None);
        assert!(slots[1..].iter().all(|s| s.expected == Some(ColumnType::Numeric)));
    }

    #[test]
    fn test_scatter_axes_accept_any_column() {
        let mut charts = ChartSettings::default();
        charts.scatter.x = Some("city".to_owned());
        charts.scatter.y = Some("temp".to_owned());
        let slots = charts.slots();
        assert_eq!(slots.len(), 2);
        assert!(slots.iter().all(|s| s.chart == ChartKind::Scatter && s.expected.is_none()));
    }

    #[test]
    fn test_chart_kind_names() {
        let names: Vec<String> = ChartKind::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            vec!["histogram", "scatter", "bar", "pie", "box", "bubble", "line"]
        );
    }
}
