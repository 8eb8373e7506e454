use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use sui_client::field_data::data_structions::{CoinRecord, DynamicFieldEntry, RawObject, TxResponse};
use sui_client::gateway::{ChainGateway, GatewayError};
use sui_client::transaction::TransactionSpec;

/// In-memory gateway for flow and synchronizer tests. Reads come from the
/// maps below; executed transaction specs are recorded for inspection.
pub struct FakeGateway {
    pub account: Option<String>,
    pub owned: Mutex<Vec<RawObject>>,
    pub dynamic_fields: Mutex<HashMap<String, Vec<DynamicFieldEntry>>>,
    pub objects: Mutex<HashMap<String, RawObject>>,
    pub coins: Mutex<Vec<CoinRecord>>,
    pub balance: u64,
    pub created: Vec<String>,
    pub fail_reads: bool,
    pub fail_execution: bool,
    pub executed: Mutex<Vec<TransactionSpec>>,
    calls: AtomicUsize,
}

impl FakeGateway {
    pub fn new(account: Option<&str>) -> Self {
        FakeGateway {
            account: account.map(|account| account.to_string()),
            owned: Mutex::new(vec![]),
            dynamic_fields: Mutex::new(HashMap::new()),
            objects: Mutex::new(HashMap::new()),
            coins: Mutex::new(vec![]),
            balance: 0,
            created: vec![],
            fail_reads: false,
            fail_execution: false,
            executed: Mutex::new(vec![]),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn raw_object(id: &str, fields: Value) -> RawObject {
        serde_json::from_value(json!({
            "objectId": id,
            "content": {
                "dataType": "moveObject",
                "type": "0xp::testnet_nft::TestnetNFT",
                "fields": fields
            }
        }))
        .unwrap()
    }

    pub fn field_entry(name_value: &str, object_id: &str) -> DynamicFieldEntry {
        serde_json::from_value(json!({
            "name": { "type": "0x2::object::ID", "value": name_value },
            "objectId": object_id
        }))
        .unwrap()
    }

    pub fn coin(id: &str, balance: u64) -> CoinRecord {
        serde_json::from_value(json!({
            "coinObjectId": id,
            "coinType": "0x2::sui::SUI",
            "balance": balance.to_string()
        }))
        .unwrap()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn executed_specs(&self) -> Vec<TransactionSpec> {
        self.executed.lock().unwrap().clone()
    }

    fn bump(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn read_failure(&self) -> Option<GatewayError> {
        if self.fail_reads {
            Some(GatewayError::MissingData("read failure injected".to_string()))
        } else {
            None
        }
    }
}

#[async_trait]
impl ChainGateway for FakeGateway {
    fn active_account(&self) -> Option<String> {
        self.account.clone()
    }

    async fn get_owned_objects(
        &self,
        _owner: &str,
        _type_tag: &str,
    ) -> Result<Vec<RawObject>, GatewayError> {
        self.bump();
        if let Some(err) = self.read_failure() {
            return Err(err);
        }
        Ok(self.owned.lock().unwrap().clone())
    }

    async fn get_dynamic_fields(
        &self,
        parent_id: &str,
    ) -> Result<Vec<DynamicFieldEntry>, GatewayError> {
        self.bump();
        if let Some(err) = self.read_failure() {
            return Err(err);
        }
        Ok(self
            .dynamic_fields
            .lock()
            .unwrap()
            .get(parent_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_object(&self, object_id: &str) -> Result<RawObject, GatewayError> {
        self.bump();
        if let Some(err) = self.read_failure() {
            return Err(err);
        }
        self.objects
            .lock()
            .unwrap()
            .get(object_id)
            .cloned()
            .ok_or_else(|| GatewayError::MissingData(format!("no object {}", object_id)))
    }

    async fn get_coins(&self, _owner: &str) -> Result<Vec<CoinRecord>, GatewayError> {
        self.bump();
        if let Some(err) = self.read_failure() {
            return Err(err);
        }
        Ok(self.coins.lock().unwrap().clone())
    }

    async fn get_balance(&self, _owner: &str) -> Result<u64, GatewayError> {
        self.bump();
        Ok(self.balance)
    }

    async fn execute_transaction(
        &self,
        spec: TransactionSpec,
    ) -> Result<TxResponse, GatewayError> {
        self.bump();
        if self.fail_execution {
            return Err(GatewayError::Rpc {
                code: -1,
                message: "execution rejected".to_string(),
            });
        }
        self.executed.lock().unwrap().push(spec);
        Ok(TxResponse {
            digest: "digest-1".to_string(),
            created: self.created.clone(),
        })
    }
}
