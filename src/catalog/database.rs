//! DuckDB-backed catalog.
//!
//! Catalog snapshots are loaded into five in-memory tables:
//!
//! | table               | columns                                                  |
//! |---------------------|----------------------------------------------------------|
//! | `cards`             | id, name, role, subtypes, element_types, hp, attacks, abilities, rarity, text |
//! | `card_prices`       | id, price, trend                                         |
//! | `card_legalities`   | id, format, status                                       |
//! | `card_meta`         | id, relevance, freshness                                 |
//! | `archetype_staples` | archetype, id                                            |
//!
//! Set-valued card columns (`subtypes`, `element_types`) are stored as
//! `", "`-separated strings; `attacks` and `abilities` as JSON arrays.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{known_price, CardCatalog, CardFilter};
use crate::connection::{Column, Connection};
use crate::error::{OptimizerError, Result};
use crate::models::{Archetype, Attack, Card, CardKind, PriceTrend};
use crate::sql_builder::{escape_like, SqlBuilder};

const CARDS: &[Column] = &[
    ("id", "VARCHAR"),
    ("name", "VARCHAR"),
    ("role", "VARCHAR"),
    ("subtypes", "VARCHAR"),
    ("element_types", "VARCHAR"),
    ("hp", "BIGINT"),
    ("attacks", "VARCHAR"),
    ("abilities", "VARCHAR"),
    ("rarity", "VARCHAR"),
    ("text", "VARCHAR"),
];

const CARD_PRICES: &[Column] = &[("id", "VARCHAR"), ("price", "DOUBLE"), ("trend", "VARCHAR")];

const CARD_LEGALITIES: &[Column] = &[("id", "VARCHAR"), ("format", "VARCHAR"), ("status", "VARCHAR")];

const CARD_META: &[Column] = &[("id", "VARCHAR"), ("relevance", "DOUBLE"), ("freshness", "BIGINT")];

const ARCHETYPE_STAPLES: &[Column] = &[("archetype", "VARCHAR"), ("id", "VARCHAR")];

const LIST_SEPARATOR: &str = ", ";

// ---------------------------------------------------------------------------
// Row records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CardRow {
    id: String,
    name: String,
    role: String,
    subtypes: Option<String>,
    element_types: Option<String>,
    hp: Option<i64>,
    attacks: Option<String>,
    abilities: Option<String>,
    rarity: Option<String>,
    text: Option<String>,
}

fn join_list(items: &BTreeSet<String>) -> String {
    items
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

fn split_list(raw: Option<&str>) -> BTreeSet<String> {
    raw.unwrap_or("")
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl CardRow {
    fn from_card(card: &Card) -> Result<Self> {
        let (hp, attacks) = match &card.kind {
            CardKind::Creature { hp, attacks } => {
                (Some(i64::from(*hp)), Some(serde_json::to_string(attacks)?))
            }
            _ => (None, None),
        };
        Ok(Self {
            id: card.id.clone(),
            name: card.name.clone(),
            role: card.role().as_str().to_string(),
            subtypes: Some(join_list(&card.subtypes)),
            element_types: Some(join_list(&card.element_types)),
            hp,
            attacks,
            abilities: Some(serde_json::to_string(&card.abilities)?),
            rarity: card.rarity.clone(),
            text: Some(card.text.clone()),
        })
    }

    /// Malformed stat columns degrade to zero HP / no attacks.
    fn into_card(self) -> Result<Card> {
        let kind = match self.role.as_str() {
            "creature" => {
                let attacks: Vec<Attack> = self
                    .attacks
                    .as_deref()
                    .and_then(|raw| serde_json::from_str(raw).ok())
                    .unwrap_or_default();
                let hp = self
                    .hp
                    .and_then(|hp| u32::try_from(hp).ok())
                    .unwrap_or(0);
                CardKind::Creature { hp, attacks }
            }
            "support" => CardKind::Support,
            "resource" => CardKind::Resource,
            other => {
                return Err(OptimizerError::InvalidArgument(format!(
                    "card '{}' has unknown role '{}'",
                    self.id, other
                )))
            }
        };
        let abilities: Vec<String> = self
            .abilities
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();

        Ok(Card {
            subtypes: split_list(self.subtypes.as_deref()),
            element_types: split_list(self.element_types.as_deref()),
            id: self.id,
            name: self.name,
            kind,
            abilities,
            rarity: self.rarity,
            text: self.text.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    pub id: String,
    pub price: f64,
    #[serde(default)]
    pub trend: PriceTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalityRecord {
    pub id: String,
    pub format: String,
    /// `"Legal"`, `"Banned"`, `"Restricted"` or `"Not Legal"`.
    pub status: String,
}

impl LegalityRecord {
    pub fn legal(id: &str, format: &str) -> Self {
        Self {
            id: id.to_string(),
            format: format.to_string(),
            status: "Legal".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaRecord {
    pub id: String,
    pub relevance: f64,
    /// Larger is newer.
    #[serde(default)]
    pub freshness: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StapleRecord {
    pub archetype: Archetype,
    pub id: String,
}

/// A complete catalog snapshot, loadable from a single JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecords {
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub prices: Vec<PriceRecord>,
    #[serde(default)]
    pub legalities: Vec<LegalityRecord>,
    #[serde(default)]
    pub meta: Vec<MetaRecord>,
    #[serde(default)]
    pub staples: Vec<StapleRecord>,
}

impl CatalogRecords {
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

fn trend_name(trend: PriceTrend) -> &'static str {
    match trend {
        PriceTrend::Rising => "rising",
        PriceTrend::Falling => "falling",
        PriceTrend::Stable => "stable",
        PriceTrend::Unknown => "unknown",
    }
}

fn parse_trend(raw: &str) -> PriceTrend {
    match raw {
        "rising" => PriceTrend::Rising,
        "falling" => PriceTrend::Falling,
        "stable" => PriceTrend::Stable,
        _ => PriceTrend::Unknown,
    }
}

// ---------------------------------------------------------------------------
// DuckDbCatalog
// ---------------------------------------------------------------------------

/// Catalog backed by an in-memory DuckDB database.
pub struct DuckDbCatalog {
    conn: Connection,
}

impl DuckDbCatalog {
    /// Open an empty catalog with all tables created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.create_table("cards", CARDS)?;
        conn.create_table("card_prices", CARD_PRICES)?;
        conn.create_table("card_legalities", CARD_LEGALITIES)?;
        conn.create_table("card_meta", CARD_META)?;
        conn.create_table("archetype_staples", ARCHETYPE_STAPLES)?;
        Ok(Self { conn })
    }

    /// Open a catalog and load a full snapshot.
    pub fn from_records(records: &CatalogRecords) -> Result<Self> {
        let catalog = Self::open_in_memory()?;
        catalog.load(records)?;
        Ok(catalog)
    }

    /// Append a snapshot to the existing tables.
    pub fn load(&self, records: &CatalogRecords) -> Result<()> {
        let card_rows = records
            .cards
            .iter()
            .map(CardRow::from_card)
            .collect::<Result<Vec<_>>>()?;
        self.conn.insert_records("cards", CARDS, &card_rows)?;

        let price_rows: Vec<serde_json::Value> = records
            .prices
            .iter()
            .map(|p| serde_json::json!({"id": p.id, "price": p.price, "trend": trend_name(p.trend)}))
            .collect();
        self.conn.insert_records("card_prices", CARD_PRICES, &price_rows)?;

        self.conn
            .insert_records("card_legalities", CARD_LEGALITIES, &records.legalities)?;
        self.conn.insert_records("card_meta", CARD_META, &records.meta)?;

        let staple_rows: Vec<serde_json::Value> = records
            .staples
            .iter()
            .map(|s| serde_json::json!({"archetype": s.archetype.as_str(), "id": s.id}))
            .collect();
        self.conn
            .insert_records("archetype_staples", ARCHETYPE_STAPLES, &staple_rows)?;

        info!(
            cards = records.cards.len(),
            prices = records.prices.len(),
            legalities = records.legalities.len(),
            meta = records.meta.len(),
            "Loaded catalog snapshot"
        );
        Ok(())
    }

    /// Load one table from an NDJSON file already in the table's row layout.
    pub fn load_table_from_ndjson(&self, table: &str, path: &str) -> Result<()> {
        let columns = match table {
            "cards" => CARDS,
            "card_prices" => CARD_PRICES,
            "card_legalities" => CARD_LEGALITIES,
            "card_meta" => CARD_META,
            "archetype_staples" => ARCHETYPE_STAPLES,
            other => {
                return Err(OptimizerError::InvalidArgument(format!(
                    "unknown catalog table '{}'",
                    other
                )))
            }
        };
        self.conn.insert_from_ndjson(table, columns, path)
    }

    /// Return a reference to the underlying [`Connection`].
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Base query for `filter`, selecting card columns from `cards c`.
    fn filtered_query(&self, filter: &CardFilter) -> SqlBuilder {
        let mut qb = SqlBuilder::new("cards c");
        qb.select(&["c.*"]);

        if let Some(ceiling) = filter.max_price {
            let ceiling = ceiling.to_string();
            qb.join("JOIN card_prices p ON c.id = p.id");
            qb.where_clause("p.price > 0", &[]);
            qb.where_clause("p.price <= CAST(? AS DOUBLE)", &[ceiling.as_str()]);
        }

        if let Some(ref format) = filter.format {
            qb.join("JOIN card_legalities l ON c.id = l.id");
            qb.where_eq("l.format", format);
            qb.where_eq("l.status", "Legal");
        }

        if let Some(role) = filter.role {
            qb.where_eq("c.role", role.as_str());
        }

        let excluded: Vec<&str> = filter.exclude_ids.iter().map(String::as_str).collect();
        qb.where_not_in("c.id", &excluded);

        let types: Vec<&str> = filter.element_types.iter().map(String::as_str).collect();
        qb.where_any("list_contains(string_split(c.element_types, ', '), ?)", &types);

        let subtypes: Vec<&str> = filter.subtypes.iter().map(String::as_str).collect();
        qb.where_any("list_contains(string_split(c.subtypes, ', '), ?)", &subtypes);

        if let Some(min) = filter.hp_min {
            let min = min.to_string();
            qb.where_clause("COALESCE(c.hp, 0) >= CAST(? AS BIGINT)", &[min.as_str()]);
        }
        if let Some(max) = filter.hp_max {
            let max = max.to_string();
            qb.where_clause("COALESCE(c.hp, 0) <= CAST(? AS BIGINT)", &[max.as_str()]);
        }

        if let Some(ref prefix) = filter.name_prefix {
            qb.where_like("c.name", &format!("{}%", escape_like(prefix)));
        }

        if let Some(n) = filter.limit {
            qb.limit(n);
        }
        qb
    }

    fn rows_to_cards(&self, sql: &str, params: &[String]) -> Result<Vec<Card>> {
        self.conn
            .execute_into::<CardRow>(sql, params)?
            .into_iter()
            .map(CardRow::into_card)
            .collect()
    }
}

impl CardCatalog for DuckDbCatalog {
    fn get_card(&self, id: &str) -> Result<Card> {
        let (sql, params) = SqlBuilder::new("cards").where_eq("id", id).limit(1).build();
        self.rows_to_cards(&sql, &params)?
            .into_iter()
            .next()
            .ok_or_else(|| OptimizerError::NotFound(format!("card '{}'", id)))
    }

    fn find_cards(&self, filter: &CardFilter) -> Result<Vec<Card>> {
        let mut qb = self.filtered_query(filter);
        qb.order_by(&["c.id ASC"]);
        let (sql, params) = qb.build();
        self.rows_to_cards(&sql, &params)
    }

    fn get_price(&self, id: &str) -> Result<Option<f64>> {
        let (sql, params) = SqlBuilder::new("card_prices")
            .select(&["price"])
            .where_eq("id", id)
            .limit(1)
            .build();
        let raw = self.conn.execute_scalar(&sql, &params)?;
        Ok(known_price(raw.and_then(|v| v.as_f64())))
    }

    fn price_trend(&self, id: &str) -> Result<PriceTrend> {
        let (sql, params) = SqlBuilder::new("card_prices")
            .select(&["trend"])
            .where_eq("id", id)
            .limit(1)
            .build();
        let raw = self.conn.execute_scalar(&sql, &params)?;
        Ok(raw
            .as_ref()
            .and_then(|v| v.as_str())
            .map(parse_trend)
            .unwrap_or_default())
    }

    fn meta_relevance(&self, id: &str) -> Result<Option<f64>> {
        let (sql, params) = SqlBuilder::new("card_meta")
            .select(&["relevance"])
            .where_eq("id", id)
            .limit(1)
            .build();
        Ok(self
            .conn
            .execute_scalar(&sql, &params)?
            .and_then(|v| v.as_f64()))
    }

    fn meta_relevant_cards(&self, filter: &CardFilter) -> Result<Vec<Card>> {
        let mut qb = self.filtered_query(filter);
        qb.join("JOIN card_meta m ON c.id = m.id");
        qb.order_by(&["m.relevance DESC", "m.freshness DESC", "c.id ASC"]);
        let (sql, params) = qb.build();
        self.rows_to_cards(&sql, &params)
    }

    fn archetype_staples(&self, archetype: Archetype) -> Result<Vec<String>> {
        let (sql, params) = SqlBuilder::new("archetype_staples")
            .select(&["id"])
            .where_eq("archetype", archetype.as_str())
            .order_by(&["id ASC"])
            .build();
        let rows = self.conn.execute(&sql, &params)?;
        Ok(rows
            .into_iter()
            .filter_map(|r| r.get("id").and_then(|v| v.as_str()).map(str::to_string))
            .collect())
    }
}

