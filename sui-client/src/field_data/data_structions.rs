use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of a cursor-driven query.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub next_cursor: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ObjectResponse {
    #[serde(default)]
    pub data: Option<RawObject>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// An object record as the node returns it, content still undecoded.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawObject {
    pub object_id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub content: Option<MoveContent>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MoveContent {
    pub data_type: String,
    #[serde(rename = "type", default)]
    pub type_tag: Option<String>,
    #[serde(default)]
    pub fields: Value,
}

/// One entry of a parent object's dynamic field table.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFieldEntry {
    pub name: DynamicFieldName,
    pub object_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DynamicFieldName {
    #[serde(rename = "type", default)]
    pub type_tag: Option<String>,
    pub value: Value,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CoinRecord {
    pub coin_object_id: String,
    #[serde(default)]
    pub coin_type: Option<String>,
    pub balance: String,
}

impl CoinRecord {
    /// Balances travel as decimal strings; an unparsable one counts as empty.
    pub fn balance_mist(&self) -> u64 {
        self.balance.parse().unwrap_or(0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRecord {
    pub total_balance: String,
}

/// Result of a signed and executed transaction.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TxResponse {
    pub digest: String,
    #[serde(default)]
    pub created: Vec<String>,
}
