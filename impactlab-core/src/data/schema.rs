use polars::prelude::*;

use crate::domain::DEPTH;

/// Expected schema for LOB snapshot data.
///
/// Files are headerless CSV with 20 numeric columns in grouped order:
/// ask prices 1..5, ask sizes 1..5, bid prices 1..5, bid sizes 1..5.
pub struct LobSchema;

impl LobSchema {
    /// Column names in file order.
    pub fn column_names() -> Vec<String> {
        let mut names = Vec::with_capacity(4 * DEPTH);
        for group in ["ask_price", "ask_size", "bid_price", "bid_size"] {
            for level in 1..=DEPTH {
                names.push(format!("{group}_{level}"));
            }
        }
        names
    }

    /// Get the canonical snapshot schema (all Float64).
    pub fn schema() -> Schema {
        Schema::from_iter(
            Self::column_names()
                .into_iter()
                .map(|name| Field::new(name.into(), DataType::Float64)),
        )
    }

    /// Validate DataFrame against schema
    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        let expected = Self::schema();
        let actual = df.schema();

        // Check all required columns exist
        for field in expected.iter_fields() {
            if !actual.contains(field.name()) {
                return Err(SchemaError::MissingColumn(field.name().to_string()));
            }
        }

        // Check data types match
        for field in expected.iter_fields() {
            let actual_dtype = actual
                .get(field.name())
                .ok_or_else(|| SchemaError::MissingColumn(field.name().to_string()))?;
            if actual_dtype != field.dtype() {
                return Err(SchemaError::TypeMismatch {
                    column: field.name().to_string(),
                    expected: field.dtype().clone(),
                    actual: actual_dtype.clone(),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Type mismatch in column {column}: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_dataframe() -> DataFrame {
        let columns: Vec<Column> = LobSchema::column_names()
            .into_iter()
            .map(|name| Column::Series(Series::new(name.into(), &[1.0f64, 2.0]).into()))
            .collect();
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn test_schema_has_twenty_float_columns() {
        let schema = LobSchema::schema();
        assert_eq!(schema.len(), 20);
        assert!(schema.contains("ask_price_1"));
        assert!(schema.contains("ask_size_5"));
        assert!(schema.contains("bid_price_3"));
        assert!(schema.contains("bid_size_1"));
        for field in schema.iter_fields() {
            assert_eq!(field.dtype(), &DataType::Float64);
        }
    }

    #[test]
    fn test_column_names_are_grouped_by_side() {
        let names = LobSchema::column_names();
        assert_eq!(names[0], "ask_price_1");
        assert_eq!(names[4], "ask_price_5");
        assert_eq!(names[5], "ask_size_1");
        assert_eq!(names[10], "bid_price_1");
        assert_eq!(names[15], "bid_size_1");
        assert_eq!(names[19], "bid_size_5");
    }

    #[test]
    fn test_validate_accepts_valid_dataframe() {
        let result = LobSchema::validate(&valid_dataframe());
        if let Err(ref e) = result {
            eprintln!("Validation error: {:?}", e);
        }
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_column() {
        let df = valid_dataframe().drop("bid_size_5").unwrap();
        let result = LobSchema::validate(&df);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), SchemaError::MissingColumn(_)));
    }

    #[test]
    fn test_validate_rejects_wrong_type() {
        let mut columns: Vec<Column> = LobSchema::column_names()
            .into_iter()
            .map(|name| Column::Series(Series::new(name.into(), &[1.0f64]).into()))
            .collect();
        columns[3] = Column::Series(Series::new("ask_price_4".into(), &["not_a_number"]).into());
        let df = DataFrame::new(columns).unwrap();

        let result = LobSchema::validate(&df);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), SchemaError::TypeMismatch { .. }));
    }
}
