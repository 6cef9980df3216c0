//! Named dashboard layouts: which columns each chart draws and in which
//! colours.
//!
//! Layouts are validated against the typed schema of the table they will be
//! drawn from, so a renderer never receives a column it cannot plot.

pub mod chart;

pub use chart::{
    BarChart, BoxChart, BubbleChart, ChartKind, ChartSettings, HistogramChart, LineChart,
    PieChart, ScatterChart, Slot,
};

use crate::error::{DashError, Result};
use crate::table::TableSchema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Primary and secondary chart colours as `#RRGGBB`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: "#1E3A8A".to_owned(),
            secondary: "#2CFF1C".to_owned(),
        }
    }
}

impl Palette {
    /// # Errors
    ///
    /// `InvalidSelection` if either colour is not `#RRGGBB`.
    pub fn validate(&self) -> Result<()> {
        for colour in [&self.primary, &self.secondary] {
            let hex = colour.strip_prefix('#').unwrap_or("");
            if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(DashError::InvalidSelection(format!(
                    "'{colour}' is not a #RRGGBB colour"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardLayout {
    pub palette: Palette,
    pub charts: ChartSettings,
}

impl DashboardLayout {
    /// Default column choices for a table: first categorical column for
    /// category axes, first and second numeric columns for value axes, and
    /// the first column of the table for the line chart's x axis.
    pub fn suggest(schema: &TableSchema) -> Self {
        let numeric = schema.numeric();
        let categorical = schema.categorical();
        let first_num = numeric.first().map(|s| (*s).to_owned());
        let second_num = numeric.get(1).map(|s| (*s).to_owned());
        let first_cat = categorical.first().map(|s| (*s).to_owned());
        let first_any = schema.columns().first().map(|c| c.name.clone());

        let charts = ChartSettings {
            histogram: HistogramChart {
                column: first_num.clone(),
            },
            scatter: ScatterChart {
                x: first_num.clone(),
                y: second_num.clone(),
            },
            bar: BarChart {
                x: first_cat.clone(),
                y: first_num.clone(),
                show_second: true,
                second_y: second_num.clone(),
            },
            pie: PieChart {
                column: first_cat.clone(),
                ..Default::default()
            },
            box_plot: BoxChart {
                column: first_num.clone(),
                group_by: None,
            },
            bubble: BubbleChart {
                x: first_num.clone(),
                y: second_num,
                size: first_num.clone(),
                color: first_cat,
            },
            line: LineChart {
                x: first_any,
                y: first_num.into_iter().collect(),
            },
        };

        Self {
            palette: Palette::default(),
            charts,
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// # Errors
    ///
    /// `InvalidSelection` for a column the table does not have, a bad colour
    /// or a pie hole above 100%; `Type` for a column of the wrong kind.
    pub fn validate(&self, schema: &TableSchema) -> Result<()> {
        self.palette.validate()?;

        if self.charts.pie.hole_percent > 100 {
            return Err(DashError::InvalidSelection(format!(
                "pie hole of {}% exceeds 100%",
                self.charts.pie.hole_percent
            )));
        }

        for slot in self.charts.slots() {
            let result = match slot.expected {
                Some(kind) => schema.require(slot.column, kind).map(|_| ()),
                None => schema.get(slot.column).map(|_| ()).ok_or_else(|| {
                    DashError::InvalidSelection(format!("unknown column '{}'", slot.column))
                }),
            };
            result.map_err(|e| match e {
                DashError::Type(msg) => {
                    DashError::Type(format!("{} chart {}: {msg}", slot.chart, slot.role))
                }
                DashError::InvalidSelection(msg) => DashError::InvalidSelection(format!(
                    "{} chart {}: {msg}",
                    slot.chart, slot.role
                )),
                other => other,
            })?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedDashboard {
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub layout: DashboardLayout,
}

impl SavedDashboard {
    /// Save time as shown next to the dashboard name.
    pub fn timestamp_label(&self) -> String {
        self.saved_at.format("%d/%m/%Y %H:%M").to_string()
    }
}

/// Session-scoped store of named layouts, in first-save order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DashboardStore {
    entries: Vec<SavedDashboard>,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves `layout` under `name`. An existing entry with the same name is
    /// overwritten in place and its timestamp refreshed.
    ///
    /// # Errors
    ///
    /// `InvalidSelection` for a blank name.
    pub fn save(&mut self, name: &str, layout: DashboardLayout) -> Result<&SavedDashboard> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DashError::InvalidSelection(
                "dashboard name cannot be empty".to_owned(),
            ));
        }

        let entry = SavedDashboard {
            name: name.to_owned(),
            saved_at: Utc::now(),
            layout,
        };

        let idx = match self.entries.iter().position(|d| d.name == name) {
            Some(idx) => {
                tracing::info!("Dashboard '{}' updated", name);
                self.entries[idx] = entry;
                idx
            }
            None => {
                tracing::info!("Dashboard '{}' saved", name);
                self.entries.push(entry);
                self.entries.len() - 1
            }
        };
        Ok(&self.entries[idx])
    }

    /// # Errors
    ///
    /// `InvalidSelection` if nothing is saved under `name`.
    pub fn load(&self, name: &str) -> Result<&SavedDashboard> {
        self.entries
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| DashError::InvalidSelection(format!("no saved dashboard named '{name}'")))
    }

    /// Returns whether an entry was removed.
    pub fn delete(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|d| d.name != name);
        before != self.entries.len()
    }

    pub fn list(&self) -> &[SavedDashboard] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn schema() -> Result<TableSchema> {
        let df = df!(
            "region" => &["north", "south"],
            "sales" => &[10.0, 20.0],
            "units" => &[1, 2],
            "shipped" => &[true, false]
        )?;
        Ok(TableSchema::of(&df))
    }

    #[test]
    fn test_suggest_picks_first_columns_by_kind() -> Result<()> {
        let layout = DashboardLayout::suggest(&schema()?);
        let charts = &layout.charts;

        assert_eq!(charts.bar.x.as_deref(), Some("region"));
        assert_eq!(charts.bar.y.as_deref(), Some("sales"));
        assert_eq!(charts.bar.second_y.as_deref(), Some("units"));
        assert_eq!(charts.pie.column.as_deref(), Some("region"));
        assert_eq!(charts.pie.hole_percent, 45);
        assert_eq!(charts.line.x.as_deref(), Some("region"));
        assert_eq!(charts.line.y, vec!["sales"]);
        assert_eq!(charts.bubble.y.as_deref(), Some("units"));
        assert_eq!(charts.bubble.color.as_deref(), Some("region"));
        assert_eq!(charts.box_plot.group_by, None);
        assert_eq!(layout.palette, Palette::default());
        Ok(())
    }

    #[test]
    fn test_suggested_layout_is_valid() -> Result<()> {
        let schema = schema()?;
        DashboardLayout::suggest(&schema).validate(&schema)
    }

    #[test]
    fn test_suggest_without_categorical_columns() -> Result<()> {
        let schema = TableSchema::of(&df!("v" => &[1.0, 2.0])?);
        let layout = DashboardLayout::suggest(&schema);
        assert_eq!(layout.charts.bar.x, None);
        assert_eq!(layout.charts.scatter.y, None);
        layout.validate(&schema)
    }

    #[test]
    fn test_validate_rejects_bad_columns() -> Result<()> {
        let schema = schema()?;

        let mut wrong_type = DashboardLayout::suggest(&schema);
        wrong_type.charts.histogram.column = Some("region".to_owned());
        assert!(matches!(wrong_type.validate(&schema), Err(DashError::Type(_))));

        let mut unknown = DashboardLayout::suggest(&schema);
        unknown.charts.line.x = Some("date".to_owned());
        assert!(matches!(
            unknown.validate(&schema),
            Err(DashError::InvalidSelection(_))
        ));

        let mut colour = DashboardLayout::suggest(&schema);
        colour.palette.primary = "blue".to_owned();
        assert!(colour.validate(&schema).is_err());
        Ok(())
    }

    #[test]
    fn test_scatter_on_categorical_axis_validates() -> Result<()> {
        let schema = schema()?;
        let mut layout = DashboardLayout::suggest(&schema);
        layout.charts.scatter.x = Some("region".to_owned());
        layout.charts.scatter.y = Some("sales".to_owned());
        layout.validate(&schema)?;

        layout.charts.scatter.y = Some("margin".to_owned());
        assert!(matches!(
            layout.validate(&schema),
            Err(DashError::InvalidSelection(_))
        ));
        Ok(())
    }

    #[test]
    fn test_store_last_write_wins() -> Result<()> {
        let schema = schema()?;
        let mut store = DashboardStore::new();
        store.save("Sales", DashboardLayout::suggest(&schema))?;
        store.save("Other", DashboardLayout::default())?;

        let mut changed = DashboardLayout::suggest(&schema);
        changed.charts.pie.hole_percent = 0;
        store.save("Sales", changed.clone())?;

        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[0].name, "Sales");
        assert_eq!(store.load("Sales")?.layout, changed);
        Ok(())
    }

    #[test]
    fn test_store_delete_and_blank_names() -> Result<()> {
        let mut store = DashboardStore::new();
        assert!(store.save("  ", DashboardLayout::default()).is_err());

        store.save("a", DashboardLayout::default())?;
        assert!(store.delete("a"));
        assert!(!store.delete("a"));
        assert!(store.load("a").is_err());
        Ok(())
    }

    #[test]
    fn test_store_json_document() -> Result<()> {
        let mut store = DashboardStore::new();
        store.save("Sales", DashboardLayout::suggest(&schema()?))?;
        let back = DashboardStore::from_json(&store.to_json()?)?;
        assert_eq!(back, store);
        assert_eq!(back.list()[0].timestamp_label().len(), 16);
        Ok(())
    }
}
