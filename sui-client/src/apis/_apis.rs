use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use crate::field_data::data_structions::{
    BalanceRecord, CoinRecord, DynamicFieldEntry, ObjectResponse, Page, RawObject, TxResponse,
};
use crate::gateway::GatewayError;
use crate::transaction::TransactionSpec;

pub const DEFAULT_RPC_URL: &str = "https://fullnode.testnet.sui.io:443";

pub const COIN_TYPE_SUI: &str = "0x2::sui::SUI";

async fn rpc_call(
    client: &Client,
    rpc_url: &Url,
    method: &str,
    params: Value,
) -> Result<Value, GatewayError> {
    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params,
    });
    let rp_data: Value = client
        .post(rpc_url.clone())
        .json(&body)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if let Some(err) = rp_data.get("error") {
        let code = err.get("code").and_then(Value::as_i64).unwrap_or(0);
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown rpc error")
            .to_string();
        return Err(GatewayError::Rpc { code, message });
    }

    match rp_data.get("result") {
        Some(result) => Ok(result.clone()),
        None => Err(GatewayError::MissingData(format!(
            "{} returned no result",
            method
        ))),
    }
}

fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|err| {
        GatewayError::MissingData(format!("{} response did not parse: {}", method, err))
    })
}

/// All objects of one Move type owned by an account, content included.
/// Follows the cursor until the node reports no further page.
pub async fn get_owned_objects(
    client: &Client,
    rpc_url: &Url,
    owner: &str,
    type_tag: &str,
) -> Result<Vec<RawObject>, GatewayError> {
    let mut objects = vec![];
    let mut cursor = Value::Null;

    loop {
        let params = json!([
            owner,
            { "filter": { "StructType": type_tag }, "options": { "showContent": true } },
            cursor,
            null,
        ]);
        let page: Page<ObjectResponse> = decode(
            "suix_getOwnedObjects",
            rpc_call(client, rpc_url, "suix_getOwnedObjects", params).await?,
        )?;

        for entry in page.data {
            if let Some(object) = entry.data {
                objects.push(object);
            }
        }
        if !page.has_next_page {
            break;
        }
        cursor = match page.next_cursor {
            Some(next) => next,
            None => break,
        };
    }

    Ok(objects)
}

/// The dynamic field table of a parent object, one entry per field.
pub async fn get_dynamic_fields(
    client: &Client,
    rpc_url: &Url,
    parent_id: &str,
) -> Result<Vec<DynamicFieldEntry>, GatewayError> {
    let mut entries = vec![];
    let mut cursor = Value::Null;

    loop {
        let params = json!([parent_id, cursor, null]);
        let page: Page<DynamicFieldEntry> = decode(
            "suix_getDynamicFields",
            rpc_call(client, rpc_url, "suix_getDynamicFields", params).await?,
        )?;

        entries.extend(page.data);
        if !page.has_next_page {
            break;
        }
        cursor = match page.next_cursor {
            Some(next) => next,
            None => break,
        };
    }

    Ok(entries)
}

pub async fn get_object(
    client: &Client,
    rpc_url: &Url,
    object_id: &str,
) -> Result<RawObject, GatewayError> {
    let params = json!([object_id, { "showContent": true }]);
    let rsp: ObjectResponse = decode(
        "sui_getObject",
        rpc_call(client, rpc_url, "sui_getObject", params).await?,
    )?;

    rsp.data
        .ok_or_else(|| GatewayError::MissingData(format!("object {} has no data", object_id)))
}

pub async fn get_coins(
    client: &Client,
    rpc_url: &Url,
    owner: &str,
) -> Result<Vec<CoinRecord>, GatewayError> {
    let mut coins = vec![];
    let mut cursor = Value::Null;

    loop {
        let params = json!([owner, COIN_TYPE_SUI, cursor, null]);
        let page: Page<CoinRecord> = decode(
            "suix_getCoins",
            rpc_call(client, rpc_url, "suix_getCoins", params).await?,
        )?;

        coins.extend(page.data);
        if !page.has_next_page {
            break;
        }
        cursor = match page.next_cursor {
            Some(next) => next,
            None => break,
        };
    }

    Ok(coins)
}

pub async fn get_balance(
    client: &Client,
    rpc_url: &Url,
    owner: &str,
) -> Result<u64, GatewayError> {
    let params = json!([owner, COIN_TYPE_SUI]);
    let record: BalanceRecord = decode(
        "suix_getBalance",
        rpc_call(client, rpc_url, "suix_getBalance", params).await?,
    )?;

    record.total_balance.parse().map_err(|_| {
        GatewayError::MissingData(format!("balance {} is not a u64", record.total_balance))
    })
}

/// Hand a transaction spec to the wallet bridge for signing and execution.
pub async fn sign_and_execute(
    client: &Client,
    wallet_url: &Url,
    spec: &TransactionSpec,
) -> Result<TxResponse, GatewayError> {
    let rp_data: Value = client
        .post(wallet_url.clone())
        .json(&json!({ "transaction": spec }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if let Some(err) = rp_data.get("error") {
        let code = err.get("code").and_then(Value::as_i64).unwrap_or(0);
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("transaction rejected")
            .to_string();
        return Err(GatewayError::Rpc { code, message });
    }

    decode("sign_and_execute", rp_data)
}
