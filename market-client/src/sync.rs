use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;
use tokio::task;
use tokio::time::{sleep, Duration};

use sui_client::field_data::data_structions::DynamicFieldEntry;
use sui_client::gateway::{ChainGateway, GatewayError};

use crate::constants;
use crate::decode;
use crate::notify::NoticeSender;
use crate::store::{ListedNft, MarketStore, RefreshKind, RefreshRequest};

/// Rebuilds the store collections from chain ground truth. Refreshes are
/// idempotent and safe to re-run; overlapping runs resolve by whichever
/// replace lands last.
pub struct Synchronizer<G> {
    gateway: Arc<G>,
    store: MarketStore,
    notices: NoticeSender,
}

impl<G: ChainGateway + 'static> Synchronizer<G> {
    pub fn new(gateway: Arc<G>, store: MarketStore, notices: NoticeSender) -> Self {
        Synchronizer {
            gateway,
            store,
            notices,
        }
    }

    /// Replace `owned` with every NFT-typed object the active account holds.
    /// Undecodable records are skipped; a total read failure keeps the
    /// last-known collection and surfaces the error.
    pub async fn refresh_owned(&self) {
        let Some(account) = self.gateway.active_account() else {
            self.store.set_loading_owned(false).await;
            return;
        };
        self.store.set_loading_owned(true).await;

        match self
            .gateway
            .get_owned_objects(&account, &constants::nft_type())
            .await
        {
            Ok(objects) => {
                let nfts = objects
                    .iter()
                    .filter_map(|object| match decode::decode_nft(object) {
                        Ok(nft) => Some(nft),
                        Err(err) => {
                            eprintln!("owned refresh: skipping record -->  {}", err);
                            None
                        }
                    })
                    .collect();
                self.store.set_owned(nfts).await;
            }
            Err(err) => {
                self.notices
                    .error(format!("Failed to load your NFTs: {}", err));
            }
        }

        self.store.set_loading_owned(false).await;
    }

    /// Replace `listed` with every active marketplace listing. Per-entry
    /// failures are skipped; a total enumeration failure keeps the
    /// last-known collection and surfaces the error.
    pub async fn refresh_listed(&self) {
        self.store.set_loading_listed(true).await;

        match self.fetch_listings().await {
            Ok(listings) => self.store.set_listed(listings).await,
            Err(err) => {
                self.notices
                    .error(format!("Failed to load marketplace listings: {}", err));
            }
        }

        self.store.set_loading_listed(false).await;
    }

    async fn fetch_listings(&self) -> Result<Vec<ListedNft>, GatewayError> {
        let entries = self
            .gateway
            .get_dynamic_fields(constants::MARKETPLACE_OBJECT_ID)
            .await?;

        let listings = Arc::new(Mutex::new(Vec::new()));
        let mut handles: Vec<task::JoinHandle<()>> = vec![];

        for entry in entries {
            let gateway = Arc::clone(&self.gateway);
            let listings = Arc::clone(&listings);
            let handle = task::spawn(async move {
                match fetch_listing_entry(gateway.as_ref(), &entry).await {
                    Ok(listing) => listings.lock().await.push(listing),
                    Err(err) => {
                        eprintln!("listed refresh: skipping {} -->  {}", entry.object_id, err)
                    }
                }
            });
            handles.push(handle);
        }
        for handle in handles {
            if let Err(err) = handle.await {
                eprintln!("listed refresh: detail task failed -->  {:?}", err);
            }
        }

        let listings = listings.lock().await.clone();
        Ok(listings)
    }
}

/// One listing: the table entry names the item, the entry's object carries
/// price and seller, and the item itself hangs off the listing as its only
/// dynamic field.
async fn fetch_listing_entry<G: ChainGateway>(
    gateway: &G,
    entry: &DynamicFieldEntry,
) -> Result<ListedNft, String> {
    let Some(nft_id) = entry.name.value.as_str() else {
        return Err(format!("entry name {:?} is not an object id", entry.name.value));
    };

    let listing_object = gateway
        .get_object(&entry.object_id)
        .await
        .map_err(|err| err.to_string())?;
    let info = decode::decode_listing(&listing_object).map_err(|err| err.to_string())?;

    let item_entries = gateway
        .get_dynamic_fields(&entry.object_id)
        .await
        .map_err(|err| err.to_string())?;
    let Some(item_entry) = item_entries.first() else {
        return Err(format!("listing {} holds no item", entry.object_id));
    };
    let item_object = gateway
        .get_object(&item_entry.object_id)
        .await
        .map_err(|err| err.to_string())?;
    let nft = decode::decode_nft(&item_object).map_err(|err| err.to_string())?;

    Ok(ListedNft {
        id: nft_id.to_string(),
        name: nft.name,
        description: nft.description,
        url: nft.url,
        price: info.price,
        owner: info.owner,
        listing_id: entry.object_id.clone(),
    })
}

/// The single consumer of queued refresh requests. Honors each request's
/// delay, runs the matching refresh, and reports failures through the
/// notice channel so nothing is lost in the background.
pub struct RefreshWorker<G> {
    synchronizer: Synchronizer<G>,
    requests: UnboundedReceiver<RefreshRequest>,
}

impl<G: ChainGateway + 'static> RefreshWorker<G> {
    pub fn new(
        synchronizer: Synchronizer<G>,
        requests: UnboundedReceiver<RefreshRequest>,
    ) -> Self {
        RefreshWorker {
            synchronizer,
            requests,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            if request.delay_ms > 0 {
                sleep(Duration::from_millis(request.delay_ms)).await;
            }
            match request.kind {
                RefreshKind::Owned => self.synchronizer.refresh_owned().await,
                RefreshKind::Listed => self.synchronizer.refresh_listed().await,
            }
        }
    }
}
