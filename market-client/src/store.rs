use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{watch, Mutex};

/// A minted asset record as the client sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nft {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub url: String,
}

/// An [`Nft`] offered for sale. Price is in MIST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedNft {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub price: u64,
    pub owner: String,
    pub listing_id: String,
}

impl ListedNft {
    pub fn from_nft(nft: Nft, price: u64, owner: String, listing_id: String) -> Self {
        ListedNft {
            id: nft.id,
            name: nft.name,
            description: nft.description,
            url: nft.url,
            price,
            owner,
            listing_id,
        }
    }

    /// Strip the sale attributes back off.
    pub fn into_nft(self) -> Nft {
        Nft {
            id: self.id,
            name: self.name,
            description: self.description,
            url: self.url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshKind {
    Owned,
    Listed,
}

/// One queued unit of refresh work for the background worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshRequest {
    pub kind: RefreshKind,
    pub delay_ms: u64,
}

impl RefreshRequest {
    pub fn now(kind: RefreshKind) -> Self {
        RefreshRequest { kind, delay_ms: 0 }
    }

    pub fn after(kind: RefreshKind, delay_ms: u64) -> Self {
        RefreshRequest { kind, delay_ms }
    }
}

#[derive(Debug)]
struct StoreState {
    owned: Vec<Nft>,
    listed: Vec<ListedNft>,
    is_minting: bool,
    listing_in_flight: Option<String>,
    buying_in_flight: Option<String>,
    is_loading_owned: bool,
    is_loading_listed: bool,
}

impl StoreState {
    fn empty(loading: bool) -> Self {
        StoreState {
            owned: vec![],
            listed: vec![],
            is_minting: false,
            listing_in_flight: None,
            buying_in_flight: None,
            is_loading_owned: loading,
            is_loading_listed: loading,
        }
    }
}

/// Session-scoped projection of what the user owns and what is for sale.
/// Cloning hands out another handle onto the same state; every mutation
/// bumps the version channel and reconciliation operations queue refresh
/// requests for the background worker.
#[derive(Clone)]
pub struct MarketStore {
    state: Arc<Mutex<StoreState>>,
    refresh_tx: UnboundedSender<RefreshRequest>,
    changed: Arc<watch::Sender<u64>>,
}

impl MarketStore {
    pub fn new(refresh_tx: UnboundedSender<RefreshRequest>) -> Self {
        let (changed, _) = watch::channel(0);
        MarketStore {
            // loading starts true: the first paint shows skeletons until the
            // initial refresh lands
            state: Arc::new(Mutex::new(StoreState::empty(true))),
            refresh_tx,
            changed: Arc::new(changed),
        }
    }

    /// Version channel bumped on every mutation; subscribe to re-render.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed.subscribe()
    }

    fn touch(&self) {
        self.changed.send_modify(|version| *version += 1);
    }

    /// Queue a refresh for the background worker.
    pub fn schedule_refresh(&self, request: RefreshRequest) {
        // a dropped worker means the session is shutting down
        let _ = self.refresh_tx.send(request);
    }

    pub async fn owned(&self) -> Vec<Nft> {
        self.state.lock().await.owned.clone()
    }

    pub async fn listed(&self) -> Vec<ListedNft> {
        self.state.lock().await.listed.clone()
    }

    pub async fn find_listing(&self, nft_id: &str) -> Option<ListedNft> {
        self.state
            .lock()
            .await
            .listed
            .iter()
            .find(|listing| listing.id == nft_id)
            .cloned()
    }

    pub async fn is_minting(&self) -> bool {
        self.state.lock().await.is_minting
    }

    pub async fn listing_in_flight(&self) -> Option<String> {
        self.state.lock().await.listing_in_flight.clone()
    }

    pub async fn buying_in_flight(&self) -> Option<String> {
        self.state.lock().await.buying_in_flight.clone()
    }

    pub async fn is_loading_owned(&self) -> bool {
        self.state.lock().await.is_loading_owned
    }

    pub async fn is_loading_listed(&self) -> bool {
        self.state.lock().await.is_loading_listed
    }

    pub async fn set_owned(&self, nfts: Vec<Nft>) {
        self.state.lock().await.owned = nfts;
        self.touch();
    }

    pub async fn set_listed(&self, listings: Vec<ListedNft>) {
        self.state.lock().await.listed = listings;
        self.touch();
    }

    pub async fn set_minting(&self, minting: bool) {
        self.state.lock().await.is_minting = minting;
        self.touch();
    }

    pub async fn set_listing(&self, nft_id: Option<String>) {
        self.state.lock().await.listing_in_flight = nft_id;
        self.touch();
    }

    pub async fn set_buying(&self, nft_id: Option<String>) {
        self.state.lock().await.buying_in_flight = nft_id;
        self.touch();
    }

    pub async fn set_loading_owned(&self, loading: bool) {
        self.state.lock().await.is_loading_owned = loading;
        self.touch();
    }

    pub async fn set_loading_listed(&self, loading: bool) {
        self.state.lock().await.is_loading_listed = loading;
        self.touch();
    }

    /// A mint confirmed: surface the new item immediately, then let the next
    /// owned refresh replace the optimistic record with chain truth.
    pub async fn on_nft_minted(&self, nft: Nft) {
        {
            let mut state = self.state.lock().await;
            if !state.owned.iter().any(|owned| owned.id == nft.id) {
                state.owned.push(nft);
            }
            state.is_minting = false;
        }
        self.touch();
        self.schedule_refresh(RefreshRequest::now(RefreshKind::Owned));
    }

    /// A list confirmed: move the item from owned to listed with the sale
    /// attributes attached. An unknown id is a stale identifier from a lost
    /// race; the state is left alone.
    pub async fn on_nft_listed(&self, nft_id: &str, price: u64, listing_id: &str, owner: &str) {
        {
            let mut state = self.state.lock().await;
            let Some(position) = state.owned.iter().position(|nft| nft.id == nft_id) else {
                eprintln!("on_nft_listed: {} is not in the owned set, ignoring", nft_id);
                return;
            };
            let nft = state.owned.remove(position);
            state.listed.push(ListedNft::from_nft(
                nft,
                price,
                owner.to_string(),
                listing_id.to_string(),
            ));
            state.listing_in_flight = None;
        }
        self.touch();
        self.schedule_refresh(RefreshRequest::now(RefreshKind::Listed));
    }

    /// A purchase confirmed: drop the listing. The bought item only shows up
    /// under the buyer on the next owned refresh.
    pub async fn on_nft_bought(&self, listing_id: &str, _nft_id: &str) {
        {
            let mut state = self.state.lock().await;
            state.listed.retain(|listing| listing.listing_id != listing_id);
            state.buying_in_flight = None;
        }
        self.touch();
        self.schedule_refresh(RefreshRequest::now(RefreshKind::Owned));
        self.schedule_refresh(RefreshRequest::now(RefreshKind::Listed));
    }

    /// A delist confirmed: move the listing back to owned with the sale
    /// attributes stripped. An unknown listing id is left alone.
    pub async fn on_nft_delisted(&self, listing_id: &str, _nft_id: &str) {
        {
            let mut state = self.state.lock().await;
            let Some(position) = state
                .listed
                .iter()
                .position(|listing| listing.listing_id == listing_id)
            else {
                eprintln!(
                    "on_nft_delisted: listing {} is not in the listed set, ignoring",
                    listing_id
                );
                return;
            };
            let listing = state.listed.remove(position);
            state.owned.push(listing.into_nft());
        }
        self.touch();
        self.schedule_refresh(RefreshRequest::now(RefreshKind::Owned));
        self.schedule_refresh(RefreshRequest::now(RefreshKind::Listed));
    }

    /// The active account disconnected or changed identity: the projection
    /// belongs to nobody now, wipe it.
    pub async fn reset_for_account_change(&self) {
        {
            let mut state = self.state.lock().await;
            *state = StoreState::empty(false);
        }
        self.touch();
    }
}
