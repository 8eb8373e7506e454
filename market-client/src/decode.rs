use std::error::Error;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use sui_client::field_data::data_structions::RawObject;

use crate::store::Nft;

/// A fetched record without the expected shape. Callers drop the record and
/// carry on with the rest of the batch.
#[derive(Debug)]
pub struct DecodeError {
    pub object_id: String,
    pub reason: String,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object {} did not decode: {}", self.object_id, self.reason)
    }
}

impl Error for DecodeError {}

fn decode_err(object_id: &str, reason: String) -> DecodeError {
    DecodeError {
        object_id: object_id.to_string(),
        reason,
    }
}

#[derive(Deserialize)]
struct NftFields {
    name: String,
    #[serde(default)]
    description: Option<String>,
    url: UrlField,
}

// the chain serves a Url either as a bare string or wrapped in a Move struct
#[derive(Deserialize)]
#[serde(untagged)]
enum UrlField {
    Plain(String),
    Wrapped { fields: UrlFields },
}

#[derive(Deserialize)]
struct UrlFields {
    url: String,
}

impl UrlField {
    fn into_string(self) -> String {
        match self {
            UrlField::Plain(url) => url,
            UrlField::Wrapped { fields } => fields.url,
        }
    }
}

#[derive(Deserialize)]
struct ListingFields {
    price: PriceField,
    owner: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceField {
    Text(String),
    Number(u64),
}

impl PriceField {
    fn as_mist(&self) -> Result<u64, String> {
        match self {
            PriceField::Text(text) => text
                .parse()
                .map_err(|_| format!("price {:?} is not a u64", text)),
            PriceField::Number(value) => Ok(*value),
        }
    }
}

/// Price and seller of one marketplace listing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingInfo {
    pub price: u64,
    pub owner: String,
}

fn move_fields(object: &RawObject) -> Result<&Value, DecodeError> {
    let content = object
        .content
        .as_ref()
        .ok_or_else(|| decode_err(&object.object_id, "no content".to_string()))?;
    if content.data_type != "moveObject" {
        return Err(decode_err(
            &object.object_id,
            format!("unexpected data type {:?}", content.data_type),
        ));
    }
    Ok(&content.fields)
}

pub fn decode_nft(object: &RawObject) -> Result<Nft, DecodeError> {
    let fields = move_fields(object)?;
    let fields: NftFields = serde_json::from_value(fields.clone())
        .map_err(|err| decode_err(&object.object_id, err.to_string()))?;

    Ok(Nft {
        id: object.object_id.clone(),
        name: fields.name,
        description: fields.description,
        url: fields.url.into_string(),
    })
}

pub fn decode_listing(object: &RawObject) -> Result<ListingInfo, DecodeError> {
    let fields = move_fields(object)?;
    let fields: ListingFields = serde_json::from_value(fields.clone())
        .map_err(|err| decode_err(&object.object_id, err.to_string()))?;
    let price = fields
        .price
        .as_mist()
        .map_err(|reason| decode_err(&object.object_id, reason))?;

    Ok(ListingInfo {
        price,
        owner: fields.owner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(fields: Value) -> RawObject {
        serde_json::from_value(json!({
            "objectId": "0xobj",
            "content": {
                "dataType": "moveObject",
                "type": "0xp::testnet_nft::TestnetNFT",
                "fields": fields
            }
        }))
        .unwrap()
    }

    #[test]
    fn nft_with_plain_url_decodes() {
        let nft = decode_nft(&raw(json!({
            "name": "one",
            "description": "first",
            "url": "https://img.test/1.png"
        })))
        .unwrap();

        assert_eq!(nft.id, "0xobj");
        assert_eq!(nft.name, "one");
        assert_eq!(nft.description.as_deref(), Some("first"));
        assert_eq!(nft.url, "https://img.test/1.png");
    }

    #[test]
    fn nft_with_wrapped_url_decodes() {
        let nft = decode_nft(&raw(json!({
            "name": "two",
            "url": { "fields": { "url": "https://img.test/2.png" } }
        })))
        .unwrap();

        assert_eq!(nft.description, None);
        assert_eq!(nft.url, "https://img.test/2.png");
    }

    #[test]
    fn nft_without_a_name_fails_closed() {
        let err = decode_nft(&raw(json!({ "url": "https://img.test/3.png" }))).unwrap_err();
        assert_eq!(err.object_id, "0xobj");
    }

    #[test]
    fn object_without_content_fails_closed() {
        let object: RawObject =
            serde_json::from_value(json!({ "objectId": "0xbare" })).unwrap();
        assert!(decode_nft(&object).is_err());
    }

    #[test]
    fn listing_accepts_string_and_number_prices() {
        let text = decode_listing(&raw(json!({
            "price": "1500000000",
            "owner": "0xseller"
        })))
        .unwrap();
        assert_eq!(text.price, 1_500_000_000);
        assert_eq!(text.owner, "0xseller");

        let number = decode_listing(&raw(json!({
            "price": 1500000000u64,
            "owner": "0xseller"
        })))
        .unwrap();
        assert_eq!(number, text);
    }

    #[test]
    fn listing_with_a_malformed_price_fails_closed() {
        let err = decode_listing(&raw(json!({
            "price": "a lot",
            "owner": "0xseller"
        })))
        .unwrap_err();
        assert!(err.reason.contains("price"));
    }
}
