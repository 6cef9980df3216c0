use crate::error::{DashError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// How a column may be used by the cleaning and filtering stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Categorical,
    Unsupported,
}

impl ColumnType {
    pub fn classify(dtype: &DataType) -> Self {
        if dtype.is_primitive_numeric() {
            Self::Numeric
        } else if matches!(
            dtype,
            DataType::String | DataType::Categorical(_, _) | DataType::Enum(_, _)
        ) {
            Self::Categorical
        } else {
            Self::Unsupported
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Unsupported => "unsupported",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub column_type: ColumnType,
}

/// Typed view of a table's columns, in table order.
///
/// Always derived from the frame at hand: a stage can change a column's
/// classification (an integer column becomes float after mean-fill, a column
/// dropped to zero rows keeps its dtype), so schemas are never carried
/// across stages.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TableSchema {
    columns: Vec<ColumnInfo>,
}

impl TableSchema {
    pub fn of(df: &DataFrame) -> Self {
        let columns = df
            .get_columns()
            .iter()
            .map(|c| ColumnInfo {
                name: c.name().to_string(),
                dtype: c.dtype().to_string(),
                column_type: ColumnType::classify(c.dtype()),
            })
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn names_of(&self, kind: ColumnType) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(move |c| c.column_type == kind)
            .map(|c| c.name.as_str())
    }

    pub fn numeric(&self) -> Vec<&str> {
        self.names_of(ColumnType::Numeric).collect()
    }

    pub fn categorical(&self) -> Vec<&str> {
        self.names_of(ColumnType::Categorical).collect()
    }

    /// Looks up `name` and checks it has the `expected` classification.
    ///
    /// # Errors
    ///
    /// `InvalidSelection` when the column is absent, `Type` when it is
    /// classified differently.
    pub fn require(&self, name: &str, expected: ColumnType) -> Result<&ColumnInfo> {
        let info = self
            .get(name)
            .ok_or_else(|| DashError::InvalidSelection(format!("unknown column '{name}'")))?;
        if info.column_type != expected {
            return Err(DashError::Type(format!(
                "column '{name}' is {} ({}), expected {}",
                info.column_type.as_str(),
                info.dtype,
                expected.as_str()
            )));
        }
        Ok(info)
    }
}
