use std::error::Error;
use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::apis::_apis;
use crate::field_data::data_structions::{CoinRecord, DynamicFieldEntry, RawObject, TxResponse};
use crate::transaction::TransactionSpec;

#[derive(Debug)]
pub enum GatewayError {
    Http(reqwest::Error),
    Rpc { code: i64, message: String },
    MissingData(String),
    NoWalletSession,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Http(err) => write!(f, "rpc transport error: {}", err),
            GatewayError::Rpc { code, message } => write!(f, "rpc error {}: {}", code, message),
            GatewayError::MissingData(what) => write!(f, "missing data in response: {}", what),
            GatewayError::NoWalletSession => write!(f, "no wallet session attached"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GatewayError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Http(err)
    }
}

/// Everything the marketplace client needs from the chain: session account,
/// object reads, and transaction execution through the wallet.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    fn active_account(&self) -> Option<String>;

    async fn get_owned_objects(
        &self,
        owner: &str,
        type_tag: &str,
    ) -> Result<Vec<RawObject>, GatewayError>;

    async fn get_dynamic_fields(
        &self,
        parent_id: &str,
    ) -> Result<Vec<DynamicFieldEntry>, GatewayError>;

    async fn get_object(&self, object_id: &str) -> Result<RawObject, GatewayError>;

    async fn get_coins(&self, owner: &str) -> Result<Vec<CoinRecord>, GatewayError>;

    async fn get_balance(&self, owner: &str) -> Result<u64, GatewayError>;

    async fn execute_transaction(
        &self,
        spec: TransactionSpec,
    ) -> Result<TxResponse, GatewayError>;
}

/// The wallet session writes go through: the bridge endpoint signs a
/// submitted transaction spec with the session key and executes it.
#[derive(Debug, Clone)]
pub struct WalletBridge {
    pub address: String,
    pub url: Url,
}

/// Gateway over a fullnode JSON-RPC endpoint, with writes delegated to an
/// attached [`WalletBridge`]. Reads work without a wallet session.
pub struct SuiRpcGateway {
    http: Client,
    rpc_url: Url,
    wallet: Option<WalletBridge>,
}

impl SuiRpcGateway {
    pub fn new(rpc_url: Url, wallet: Option<WalletBridge>) -> Self {
        SuiRpcGateway {
            http: Client::new(),
            rpc_url,
            wallet,
        }
    }
}

#[async_trait]
impl ChainGateway for SuiRpcGateway {
    fn active_account(&self) -> Option<String> {
        self.wallet.as_ref().map(|wallet| wallet.address.clone())
    }

    async fn get_owned_objects(
        &self,
        owner: &str,
        type_tag: &str,
    ) -> Result<Vec<RawObject>, GatewayError> {
        _apis::get_owned_objects(&self.http, &self.rpc_url, owner, type_tag).await
    }

    async fn get_dynamic_fields(
        &self,
        parent_id: &str,
    ) -> Result<Vec<DynamicFieldEntry>, GatewayError> {
        _apis::get_dynamic_fields(&self.http, &self.rpc_url, parent_id).await
    }

    async fn get_object(&self, object_id: &str) -> Result<RawObject, GatewayError> {
        _apis::get_object(&self.http, &self.rpc_url, object_id).await
    }

    async fn get_coins(&self, owner: &str) -> Result<Vec<CoinRecord>, GatewayError> {
        _apis::get_coins(&self.http, &self.rpc_url, owner).await
    }

    async fn get_balance(&self, owner: &str) -> Result<u64, GatewayError> {
        _apis::get_balance(&self.http, &self.rpc_url, owner).await
    }

    async fn execute_transaction(
        &self,
        spec: TransactionSpec,
    ) -> Result<TxResponse, GatewayError> {
        let wallet = self.wallet.as_ref().ok_or(GatewayError::NoWalletSession)?;
        _apis::sign_and_execute(&self.http, &wallet.url, &spec).await
    }
}
