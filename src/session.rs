//! One user's working context and the events that change it.
//!
//! All mutation goes through [`Session::handle`]. An event either succeeds
//! completely, recomputing the derived table at most once, or fails and
//! leaves the session exactly as it was.

use crate::config::AppSettings;
use crate::dashboard::{DashboardLayout, DashboardStore};
use crate::error::{DashError, Result};
use crate::merge::{MergeSpec, merge};
use crate::pipeline::{CleaningConfig, NumericRange, PipelineConfig, PipelineState, Retention};
use crate::table::{TableCatalog, TableOrigin, TableSchema};
use polars::prelude::DataFrame;

#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Replace the original with a freshly loaded table
    LoadTable {
        origin: TableOrigin,
        table: DataFrame,
    },
    /// Make a table available as a merge source
    AddToCatalog { name: String, table: DataFrame },
    SetCleaning(CleaningConfig),
    /// An empty `values` list lifts the restriction on `column`
    SetCategoryFilter { column: String, values: Vec<String> },
    SetNumericRange { column: String, range: NumericRange },
    ClearNumericRange { column: String },
    ClearFilters,
    /// Merge catalog tables and use the result as the new original
    CommitMerge(MergeSpec),
    SaveDashboard {
        name: String,
        layout: DashboardLayout,
    },
    DeleteDashboard { name: String },
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadTable { .. } => "load_table",
            Self::AddToCatalog { .. } => "add_to_catalog",
            Self::SetCleaning(_) => "set_cleaning",
            Self::SetCategoryFilter { .. } => "set_category_filter",
            Self::SetNumericRange { .. } => "set_numeric_range",
            Self::ClearNumericRange { .. } => "clear_numeric_range",
            Self::ClearFilters => "clear_filters",
            Self::CommitMerge(_) => "commit_merge",
            Self::SaveDashboard { .. } => "save_dashboard",
            Self::DeleteDashboard { .. } => "delete_dashboard",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    settings: AppSettings,
    catalog: TableCatalog,
    state: Option<PipelineState>,
    config: PipelineConfig,
    dashboards: DashboardStore,
    revision: u64,
}

impl Session {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Applies one event.
    ///
    /// # Errors
    ///
    /// Whatever the triggered load, merge, recompute or dashboard validation
    /// returns; the session is unchanged in that case.
    pub fn handle(&mut self, event: SessionEvent) -> Result<()> {
        let name = event.name();
        let result = self.dispatch(event);
        if let Err(e) = &result {
            tracing::warn!("Event '{}' rejected: {}", name, e);
        }
        result
    }

    fn dispatch(&mut self, event: SessionEvent) -> Result<()> {
        match event {
            SessionEvent::LoadTable { origin, table } => self.replace_original(table, origin),
            SessionEvent::AddToCatalog { name, table } => {
                tracing::info!("Catalog table '{}' ({} rows)", name, table.height());
                self.catalog.insert(name, table);
                Ok(())
            }
            SessionEvent::SetCleaning(cleaning) => {
                let config = PipelineConfig {
                    cleaning,
                    ..self.config.clone()
                };
                self.apply_config(config)
            }
            SessionEvent::SetCategoryFilter { column, values } => {
                let mut config = self.config.clone();
                config.filters.categories.set(column, values);
                self.apply_config(config)
            }
            SessionEvent::SetNumericRange { column, range } => {
                let mut config = self.config.clone();
                config.filters.ranges.set(column, range);
                self.apply_config(config)
            }
            SessionEvent::ClearNumericRange { column } => {
                let mut config = self.config.clone();
                config.filters.ranges.clear(&column);
                self.apply_config(config)
            }
            SessionEvent::ClearFilters => {
                let config = PipelineConfig {
                    filters: Default::default(),
                    ..self.config.clone()
                };
                self.apply_config(config)
            }
            SessionEvent::CommitMerge(spec) => {
                let merged = merge(&spec, &self.catalog)?;
                self.replace_original(merged, TableOrigin::Merge { spec })
            }
            SessionEvent::SaveDashboard { name, layout } => {
                let schema = self.derived_schema().ok_or_else(|| {
                    DashError::InvalidSelection("no table loaded to draw a dashboard from".to_owned())
                })?;
                layout.validate(&schema)?;
                self.dashboards.save(&name, layout)?;
                Ok(())
            }
            SessionEvent::DeleteDashboard { name } => {
                if !self.dashboards.delete(&name) {
                    return Err(DashError::InvalidSelection(format!(
                        "no saved dashboard named '{name}'"
                    )));
                }
                Ok(())
            }
        }
    }

    /// New original: filters and numeric targets are dropped since they name
    /// columns of the previous table, cleaning toggles are kept.
    fn replace_original(&mut self, table: DataFrame, origin: TableOrigin) -> Result<()> {
        let config = PipelineConfig {
            cleaning: CleaningConfig {
                numeric_targets: None,
                ..self.config.cleaning.clone()
            },
            filters: Default::default(),
        };
        let mut state = PipelineState::new(table, origin);
        state.recompute(&config)?;

        self.state = Some(state);
        self.config = config;
        self.revision += 1;
        Ok(())
    }

    fn apply_config(&mut self, config: PipelineConfig) -> Result<()> {
        if let Some(state) = self.state.as_mut() {
            state.recompute(&config)?;
            self.revision += 1;
        }
        self.config = config;
        Ok(())
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &TableCatalog {
        &self.catalog
    }

    pub fn state(&self) -> Option<&PipelineState> {
        self.state.as_ref()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn dashboards(&self) -> &DashboardStore {
        &self.dashboards
    }

    /// Successful recomputes so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn original(&self) -> Option<&DataFrame> {
        self.state.as_ref().map(PipelineState::original)
    }

    /// `None` only when nothing has been loaded.
    pub fn derived(&self) -> Option<&DataFrame> {
        self.state.as_ref().map(PipelineState::derived)
    }

    pub fn derived_schema(&self) -> Option<TableSchema> {
        self.state.as_ref().map(PipelineState::derived_schema)
    }

    pub fn retention(&self) -> Option<Retention> {
        self.state.as_ref().map(PipelineState::retention)
    }

    /// First rows of the derived table, limited by the preview setting.
    pub fn preview(&self) -> Option<DataFrame> {
        self.derived()
            .map(|df| crate::summary::preview(df, self.settings.preview_row_limit))
    }

    /// Default layout for the derived table in the configured palette.
    pub fn suggest_layout(&self) -> Option<DashboardLayout> {
        self.derived_schema().map(|schema| {
            DashboardLayout::suggest(&schema).with_palette(self.settings.palette.clone())
        })
    }
}
