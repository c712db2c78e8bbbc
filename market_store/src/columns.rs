//! Explicit column → SQL type maps for both sinks.
//!
//! Tables are created from these maps with `CREATE TABLE IF NOT EXISTS`, so a fresh
//! database always gets the same schema instead of whatever types the first batch
//! happens to suggest. The same widths drive the loader's pre-insert coercion.

use diesel::{QueryResult, RunQueryDsl, SqliteConnection, sql_query};
use rust_decimal::{Decimal, RoundingStrategy};

/// Declared SQL type of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// `VARCHAR(n)`; longer text is truncated to `n` characters before insert.
    VarChar(usize),
    /// `DECIMAL(precision, scale)`; values that do not fit become NULL.
    Decimal {
        /// Total significant digits.
        precision: u32,
        /// Digits after the decimal point.
        scale: u32,
    },
    /// `BIGINT`
    BigInt,
    /// `DATETIME`
    DateTime,
    /// `TEXT`
    Text,
}

impl ColumnType {
    /// SQL spelling used in the DDL.
    pub fn sql(&self) -> String {
        match self {
            ColumnType::VarChar(n) => format!("VARCHAR({n})"),
            ColumnType::Decimal { precision, scale } => format!("DECIMAL({precision},{scale})"),
            ColumnType::BigInt => "BIGINT".into(),
            ColumnType::DateTime => "DATETIME".into(),
            ColumnType::Text => "TEXT".into(),
        }
    }
}

/// One named, typed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name.
    pub name: &'static str,
    /// Declared type.
    pub ty: ColumnType,
}

/// A table and its ordered columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    /// Table name.
    pub name: &'static str,
    /// Columns in declaration order.
    pub columns: &'static [ColumnSpec],
}

const fn col(name: &'static str, ty: ColumnType) -> ColumnSpec {
    ColumnSpec { name, ty }
}

/// Width of `market_data.id`.
pub const ID_WIDTH: usize = 64;
/// Width of `market_data.symbol`.
pub const SYMBOL_WIDTH: usize = 32;
/// Width of `market_data.name`.
pub const NAME_WIDTH: usize = 128;
/// Precision of `market_data.current_price`.
pub const PRICE_PRECISION: u32 = 20;
/// Scale of `market_data.current_price`.
pub const PRICE_SCALE: u32 = 8;

/// The tabular sink.
pub const MARKET_DATA: TableSpec = TableSpec {
    name: "market_data",
    columns: &[
        col("id", ColumnType::VarChar(ID_WIDTH)),
        col("symbol", ColumnType::VarChar(SYMBOL_WIDTH)),
        col("name", ColumnType::VarChar(NAME_WIDTH)),
        col(
            "current_price",
            ColumnType::Decimal {
                precision: PRICE_PRECISION,
                scale: PRICE_SCALE,
            },
        ),
        col("market_cap", ColumnType::BigInt),
        col("total_volume", ColumnType::BigInt),
        col("timestamp", ColumnType::DateTime),
    ],
};

/// The document sink.
pub const MARKET_DATA_JSON: TableSpec = TableSpec {
    name: "market_data_json",
    columns: &[
        col("collected_at", ColumnType::DateTime),
        col("payload", ColumnType::Text),
    ],
};

impl TableSpec {
    /// `CREATE TABLE IF NOT EXISTS` statement for this table.
    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("    {} {}", c.name, c.ty.sql()))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("CREATE TABLE IF NOT EXISTS {} (\n{columns}\n)", self.name)
    }

    /// Create the table unless it already exists. An existing table is left as is,
    /// even if its columns disagree with this map.
    pub fn ensure(&self, conn: &mut SqliteConnection) -> QueryResult<()> {
        sql_query(self.create_sql()).execute(conn)?;
        Ok(())
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Cut `s` to at most `width` characters.
pub fn truncate_text(s: &str, width: usize) -> String {
    match s.char_indices().nth(width) {
        Some((end, _)) => s[..end].to_owned(),
        None => s.to_owned(),
    }
}

/// Round to `scale` fractional digits (half-even) and reject anything with more than
/// `precision - scale` integer digits.
pub fn fit_decimal(value: Decimal, precision: u32, scale: u32) -> Option<Decimal> {
    let rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven);
    let integer_digits = precision.saturating_sub(scale);
    let limit = Decimal::from(10u64.checked_pow(integer_digits)?);
    (rounded.abs() < limit).then_some(rounded)
}
