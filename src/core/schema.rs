//! Warehouse star schema shown by the schema view.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TableKind {
    Fact,
    Dimension,
}

impl TableKind {
    pub fn label(&self) -> &'static str {
        match self {
            TableKind::Fact => "FACT",
            TableKind::Dimension => "DIMENSION",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyKind {
    #[serde(rename = "PK")]
    Primary,
    #[serde(rename = "FK")]
    Foreign,
}

impl KeyKind {
    pub fn label(&self) -> &'static str {
        match self {
            KeyKind::Primary => "PK",
            KeyKind::Foreign => "FK",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyKind>,
}

const fn col(name: &'static str, ty: &'static str, key: Option<KeyKind>) -> Column {
    Column { name, ty, key }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaTable {
    pub name: &'static str,
    pub kind: TableKind,
    pub columns: Vec<Column>,
}

impl SchemaTable {
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == Some(KeyKind::Primary))
    }
}

pub fn default_schema() -> Vec<SchemaTable> {
    vec![
        SchemaTable {
            name: "fact_api_data",
            kind: TableKind::Fact,
            columns: vec![
                col("id", "UUID", Some(KeyKind::Primary)),
                col("source_id", "INT", Some(KeyKind::Foreign)),
                col("raw_content", "JSONB", None),
                col("processed_at", "TIMESTAMP", None),
                col("quality_score", "FLOAT", None),
            ],
        },
        SchemaTable {
            name: "dim_sources",
            kind: TableKind::Dimension,
            columns: vec![
                col("source_id", "INT", Some(KeyKind::Primary)),
                col("api_name", "VARCHAR", None),
                col("endpoint_url", "TEXT", None),
                col("frequency", "VARCHAR", None),
            ],
        },
        SchemaTable {
            name: "dim_regions",
            kind: TableKind::Dimension,
            columns: vec![
                col("region_code", "VARCHAR", Some(KeyKind::Primary)),
                col("region_name", "VARCHAR", None),
                col("iso_code", "VARCHAR", None),
            ],
        },
    ]
}
