use serde::{Deserialize, Serialize};

use market_client::coin;
use market_client::store::ListedNft;

#[derive(Debug, Deserialize)]
pub struct MintParams {
    pub name: String,
    pub description: Option<String>,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub nft_id: String,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct BuyParams {
    pub nft_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DelistParams {
    pub nft_id: String,
    pub listing_id: String,
}

#[derive(Debug, Serialize)]
pub struct ListedResponse {
    pub listing_id: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: String,
}

/// A listing as served to clients, price already in display units.
#[derive(Debug, Serialize)]
pub struct ListingView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub price: String,
    pub owner: String,
    pub listing_id: String,
}

impl From<ListedNft> for ListingView {
    fn from(listing: ListedNft) -> Self {
        ListingView {
            id: listing.id,
            name: listing.name,
            description: listing.description,
            url: listing.url,
            price: coin::format_sui(listing.price),
            owner: listing.owner,
            listing_id: listing.listing_id,
        }
    }
}
