use std::error::Error;
use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver};

use sui_client::gateway::{ChainGateway, GatewayError};
use sui_client::transaction::{Argument, TransactionSpec};

use crate::coin;
use crate::constants;
use crate::notify::{Notice, NoticeSender};
use crate::store::{MarketStore, Nft, RefreshKind, RefreshRequest};
use crate::sync::{RefreshWorker, Synchronizer};

#[derive(Debug)]
pub enum FlowError {
    NoWallet,
    MissingField(&'static str),
    InvalidPrice(f64),
    ListingNotFound(String),
    NoCoins,
    InsufficientBalance { required: u64, available: u64 },
    Gateway(GatewayError),
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::NoWallet => write!(f, "no wallet connected"),
            FlowError::MissingField(field) => write!(f, "{} must not be empty", field),
            FlowError::InvalidPrice(price) => {
                write!(f, "price {} is not a positive amount", price)
            }
            FlowError::ListingNotFound(nft_id) => write!(f, "no listing found for {}", nft_id),
            FlowError::NoCoins => write!(f, "no SUI coins found in wallet"),
            FlowError::InsufficientBalance {
                required,
                available,
            } => write!(
                f,
                "insufficient balance: required {} SUI, available {} SUI",
                coin::format_sui(*required),
                coin::format_sui(*available)
            ),
            FlowError::Gateway(err) => write!(f, "{}", err),
        }
    }
}

impl Error for FlowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FlowError::Gateway(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GatewayError> for FlowError {
    fn from(err: GatewayError) -> Self {
        FlowError::Gateway(err)
    }
}

/// The session root: store, gateway and notice channel bundled together.
/// Construct with [`MarketClient::new`], spawn the returned worker, drain
/// the returned notice receiver.
///
/// Every flow checks the wallet session first, submits one transaction, and
/// only touches the store after the gateway confirms. On failure the
/// operation's transient flag is cleared, a notice carries the underlying
/// message, and the store keeps its last consistent state.
pub struct MarketClient<G: ChainGateway> {
    store: MarketStore,
    gateway: Arc<G>,
    notices: NoticeSender,
}

impl<G: ChainGateway + 'static> MarketClient<G> {
    pub fn new(gateway: Arc<G>) -> (Self, RefreshWorker<G>, UnboundedReceiver<Notice>) {
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let (notices, notice_rx) = NoticeSender::channel();
        let store = MarketStore::new(refresh_tx);
        let synchronizer =
            Synchronizer::new(Arc::clone(&gateway), store.clone(), notices.clone());
        let worker = RefreshWorker::new(synchronizer, refresh_rx);

        let client = MarketClient {
            store,
            gateway,
            notices,
        };
        (client, worker, notice_rx)
    }

    pub fn store(&self) -> &MarketStore {
        &self.store
    }

    fn account(&self) -> Result<String, FlowError> {
        match self.gateway.active_account() {
            Some(account) => Ok(account),
            None => {
                self.notices.error("Please connect your wallet".to_string());
                Err(FlowError::NoWallet)
            }
        }
    }

    /// Wipe the session projection and rebuild it for the new account.
    pub async fn handle_account_change(&self) {
        self.store.reset_for_account_change().await;
        if self.gateway.active_account().is_some() {
            self.store
                .schedule_refresh(RefreshRequest::now(RefreshKind::Owned));
            self.store
                .schedule_refresh(RefreshRequest::now(RefreshKind::Listed));
        }
    }

    pub async fn wallet_balance(&self) -> Result<u64, FlowError> {
        let account = self.account()?;
        Ok(self.gateway.get_balance(&account).await?)
    }

    pub async fn mint(
        &self,
        name: &str,
        description: &str,
        url: &str,
    ) -> Result<Nft, FlowError> {
        let _account = self.account()?;
        if name.trim().is_empty() {
            self.notices.error("NFT name must not be empty".to_string());
            return Err(FlowError::MissingField("name"));
        }
        if url.trim().is_empty() {
            self.notices.error("NFT URL must not be empty".to_string());
            return Err(FlowError::MissingField("url"));
        }

        self.store.set_minting(true).await;

        let mut tx = TransactionSpec::new();
        tx.move_call(
            constants::nft_mint_target(),
            vec![
                Argument::pure_string(name),
                Argument::pure_string(description),
                Argument::pure_string(url),
            ],
        );
        tx.set_gas_budget(constants::GAS_MINT);

        match self.gateway.execute_transaction(tx).await {
            Ok(response) => {
                let id = response
                    .created
                    .first()
                    .cloned()
                    .unwrap_or_else(|| format!("pending-{}", response.digest));
                let nft = Nft {
                    id,
                    name: name.to_string(),
                    description: if description.is_empty() {
                        None
                    } else {
                        Some(description.to_string())
                    },
                    url: url.to_string(),
                };
                self.store.on_nft_minted(nft.clone()).await;
                self.store.schedule_refresh(RefreshRequest::after(
                    RefreshKind::Owned,
                    constants::REFRESH_DELAY_MS,
                ));
                self.notices.success("NFT minted successfully".to_string());
                Ok(nft)
            }
            Err(err) => {
                self.store.set_minting(false).await;
                self.notices.error(format!("Minting failed: {}", err));
                Err(FlowError::Gateway(err))
            }
        }
    }

    pub async fn list(&self, nft_id: &str, price_sui: f64) -> Result<String, FlowError> {
        let account = self.account()?;
        let Some(price) = coin::to_mist(price_sui) else {
            self.notices
                .error("Price must be greater than 0".to_string());
            return Err(FlowError::InvalidPrice(price_sui));
        };

        self.store.set_listing(Some(nft_id.to_string())).await;

        let mut tx = TransactionSpec::new();
        tx.move_call(
            constants::marketplace_target("list"),
            vec![
                Argument::object(constants::MARKETPLACE_OBJECT_ID),
                Argument::object(nft_id),
                Argument::pure_u64(price),
            ],
        );
        tx.set_gas_budget(constants::GAS_LIST);

        match self.gateway.execute_transaction(tx).await {
            Ok(response) => {
                // the chain assigns the listing id; fall back to a placeholder
                // the scheduled refresh will replace
                let listing_id = response
                    .created
                    .first()
                    .cloned()
                    .unwrap_or_else(|| format!("listing-{}-{}", nft_id, response.digest));
                self.store
                    .on_nft_listed(nft_id, price, &listing_id, &account)
                    .await;
                self.store.schedule_refresh(RefreshRequest::after(
                    RefreshKind::Owned,
                    constants::REFRESH_DELAY_MS,
                ));
                self.store.schedule_refresh(RefreshRequest::after(
                    RefreshKind::Listed,
                    constants::REFRESH_DELAY_MS,
                ));
                self.notices
                    .success("NFT listed on the marketplace".to_string());
                Ok(listing_id)
            }
            Err(err) => {
                self.store.set_listing(None).await;
                self.notices.error(format!("Listing failed: {}", err));
                Err(FlowError::Gateway(err))
            }
        }
    }

    pub async fn buy(&self, nft_id: &str) -> Result<(), FlowError> {
        let account = self.account()?;
        let Some(listing) = self.store.find_listing(nft_id).await else {
            self.notices.error("Listing not found".to_string());
            return Err(FlowError::ListingNotFound(nft_id.to_string()));
        };

        self.store.set_buying(Some(nft_id.to_string())).await;

        match self
            .buy_inner(&account, nft_id, listing.price, &listing.listing_id)
            .await
        {
            Ok(()) => {
                self.notices
                    .success("NFT purchased successfully".to_string());
                Ok(())
            }
            Err(err) => {
                self.store.set_buying(None).await;
                self.notices.error(format!("Purchase failed: {}", err));
                Err(err)
            }
        }
    }

    /// Select payment, encode it with the purchase as one transaction: an
    /// optional merge of every coin into the first, a split of exactly the
    /// asking price, and the buy call spending the split output. The gateway
    /// commits or rejects the whole sequence atomically.
    async fn buy_inner(
        &self,
        account: &str,
        nft_id: &str,
        price: u64,
        listing_id: &str,
    ) -> Result<(), FlowError> {
        let coins = self.gateway.get_coins(account).await?;
        if coins.is_empty() {
            return Err(FlowError::NoCoins);
        }

        let mut tx = TransactionSpec::new();

        let payment = match coins.iter().find(|coin| coin.balance_mist() >= price) {
            Some(coin) => coin.coin_object_id.clone(),
            None => {
                let available: u64 = coins.iter().map(|coin| coin.balance_mist()).sum();
                if available < price {
                    return Err(FlowError::InsufficientBalance {
                        required: price,
                        available,
                    });
                }
                let primary = coins[0].coin_object_id.clone();
                let sources: Vec<String> = coins[1..]
                    .iter()
                    .map(|coin| coin.coin_object_id.clone())
                    .collect();
                tx.merge_coins(&primary, sources);
                primary
            }
        };

        let payment_split = tx.split_coins(&payment, vec![price]);
        tx.move_call(
            constants::marketplace_target("buy_and_take"),
            vec![
                Argument::object(constants::MARKETPLACE_OBJECT_ID),
                Argument::object(nft_id),
                payment_split,
            ],
        );
        tx.set_gas_budget(constants::GAS_TRADE);

        self.gateway.execute_transaction(tx).await?;

        self.store.on_nft_bought(listing_id, nft_id).await;
        self.store.schedule_refresh(RefreshRequest::after(
            RefreshKind::Owned,
            constants::REFRESH_DELAY_MS,
        ));
        self.store.schedule_refresh(RefreshRequest::after(
            RefreshKind::Listed,
            constants::REFRESH_DELAY_MS,
        ));
        Ok(())
    }

    pub async fn delist(&self, nft_id: &str, listing_id: &str) -> Result<(), FlowError> {
        let _account = self.account()?;

        // the buying marker doubles as the delist spinner
        self.store.set_buying(Some(nft_id.to_string())).await;

        let mut tx = TransactionSpec::new();
        tx.move_call(
            constants::marketplace_target("delist_and_take"),
            vec![
                Argument::object(constants::MARKETPLACE_OBJECT_ID),
                Argument::object(nft_id),
            ],
        );
        tx.set_gas_budget(constants::GAS_TRADE);

        match self.gateway.execute_transaction(tx).await {
            Ok(_) => {
                self.store.on_nft_delisted(listing_id, nft_id).await;
                self.store.set_buying(None).await;
                self.store.schedule_refresh(RefreshRequest::after(
                    RefreshKind::Owned,
                    constants::REFRESH_DELAY_MS,
                ));
                self.store.schedule_refresh(RefreshRequest::after(
                    RefreshKind::Listed,
                    constants::REFRESH_DELAY_MS,
                ));
                self.notices
                    .success("NFT delisted from the marketplace".to_string());
                Ok(())
            }
            Err(err) => {
                self.store.set_buying(None).await;
                self.notices.error(format!("Delisting failed: {}", err));
                Err(FlowError::Gateway(err))
            }
        }
    }

    pub async fn take_profits(&self) -> Result<(), FlowError> {
        let _account = self.account()?;

        let mut tx = TransactionSpec::new();
        tx.move_call(
            constants::marketplace_target("take_profits_and_keep"),
            vec![Argument::object(constants::MARKETPLACE_OBJECT_ID)],
        );
        tx.set_gas_budget(constants::GAS_TAKE_PROFITS);

        match self.gateway.execute_transaction(tx).await {
            Ok(_) => {
                self.notices
                    .success("Profits withdrawn successfully".to_string());
                Ok(())
            }
            Err(err) => {
                self.notices
                    .error(format!("Failed to take profits: {}", err));
                Err(FlowError::Gateway(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoticeSender;
    use crate::store::ListedNft;
    use crate::testutil::FakeGateway;
    use serde_json::json;
    use sui_client::transaction::Command;

    fn listed(id: &str, listing_id: &str, price: u64) -> ListedNft {
        ListedNft {
            id: id.to_string(),
            name: format!("nft {}", id),
            description: None,
            url: "https://img.test/a.png".to_string(),
            price,
            owner: "0xseller".to_string(),
            listing_id: listing_id.to_string(),
        }
    }

    #[tokio::test]
    async fn list_without_a_wallet_fails_before_any_gateway_call() {
        let gateway = Arc::new(FakeGateway::new(None));
        let (client, _worker, _notices) = MarketClient::new(Arc::clone(&gateway));

        let err = client.list("0x1", 1.0).await.unwrap_err();

        assert!(matches!(err, FlowError::NoWallet));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn list_with_a_non_positive_price_is_rejected_before_submission() {
        let gateway = Arc::new(FakeGateway::new(Some("0xme")));
        let (client, _worker, _notices) = MarketClient::new(Arc::clone(&gateway));
        client
            .store()
            .set_owned(vec![listed("0x1", "", 0).into_nft()])
            .await;

        let err = client.list("0x1", 0.0).await.unwrap_err();

        assert!(matches!(err, FlowError::InvalidPrice(_)));
        assert_eq!(gateway.call_count(), 0);
        assert_eq!(client.store().owned().await.len(), 1);
        assert!(client.store().listed().await.is_empty());
        assert_eq!(client.store().listing_in_flight().await, None);
    }

    #[tokio::test]
    async fn list_success_moves_the_item_into_listed() {
        let mut gateway = FakeGateway::new(Some("0xme"));
        gateway.created = vec!["0xlisting1".to_string()];
        let gateway = Arc::new(gateway);
        let (client, _worker, _notices) = MarketClient::new(Arc::clone(&gateway));
        client
            .store()
            .set_owned(vec![listed("0x1", "", 0).into_nft()])
            .await;

        let listing_id = client.list("0x1", 1.5).await.unwrap();

        assert_eq!(listing_id, "0xlisting1");
        assert!(client.store().owned().await.is_empty());
        let listings = client.store().listed().await;
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].price, 1_500_000_000);
        assert_eq!(listings[0].owner, "0xme");

        let specs = gateway.executed_specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].gas_budget, constants::GAS_LIST);
        match &specs[0].commands[0] {
            Command::MoveCall { target, arguments } => {
                assert_eq!(target, &constants::marketplace_target("list"));
                assert_eq!(arguments.len(), 3);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[tokio::test]
    async fn failed_listing_clears_the_flag_and_leaves_the_store_alone() {
        let mut gateway = FakeGateway::new(Some("0xme"));
        gateway.fail_execution = true;
        let gateway = Arc::new(gateway);
        let (client, _worker, _notices) = MarketClient::new(Arc::clone(&gateway));
        client
            .store()
            .set_owned(vec![listed("0x1", "", 0).into_nft()])
            .await;

        let err = client.list("0x1", 1.0).await.unwrap_err();

        assert!(matches!(err, FlowError::Gateway(_)));
        assert_eq!(client.store().owned().await.len(), 1);
        assert!(client.store().listed().await.is_empty());
        assert_eq!(client.store().listing_in_flight().await, None);
    }

    #[tokio::test]
    async fn buy_spends_a_single_sufficient_coin() {
        let gateway = Arc::new(FakeGateway::new(Some("0xbuyer")));
        *gateway.coins.lock().unwrap() = vec![FakeGateway::coin("0xc1", 2_000_000_000)];
        let (client, _worker, _notices) = MarketClient::new(Arc::clone(&gateway));
        client
            .store()
            .set_listed(vec![listed("0xn1", "0xl1", 1_000_000_000)])
            .await;

        client.buy("0xn1").await.unwrap();

        assert!(client.store().listed().await.is_empty());
        assert_eq!(client.store().buying_in_flight().await, None);

        let specs = gateway.executed_specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].commands.len(), 2);
        match &specs[0].commands[0] {
            Command::SplitCoins { coin, amounts } => {
                assert_eq!(coin, "0xc1");
                assert_eq!(amounts, &vec![1_000_000_000]);
            }
            other => panic!("unexpected command {:?}", other),
        }
        match &specs[0].commands[1] {
            Command::MoveCall { target, arguments } => {
                assert_eq!(target, &constants::marketplace_target("buy_and_take"));
                assert_eq!(arguments[2], Argument::Result { command: 0 });
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[tokio::test]
    async fn buy_merges_coins_when_no_single_one_covers_the_price() {
        let gateway = Arc::new(FakeGateway::new(Some("0xbuyer")));
        *gateway.coins.lock().unwrap() = vec![
            FakeGateway::coin("0xc1", 600_000_000),
            FakeGateway::coin("0xc2", 600_000_000),
        ];
        let (client, _worker, _notices) = MarketClient::new(Arc::clone(&gateway));
        client
            .store()
            .set_listed(vec![listed("0xn1", "0xl1", 1_000_000_000)])
            .await;

        client.buy("0xn1").await.unwrap();

        let specs = gateway.executed_specs();
        assert_eq!(specs[0].commands.len(), 3);
        match &specs[0].commands[0] {
            Command::MergeCoins { primary, sources } => {
                assert_eq!(primary, "0xc1");
                assert_eq!(sources, &vec!["0xc2".to_string()]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[tokio::test]
    async fn buy_with_insufficient_total_balance_never_submits() {
        let gateway = Arc::new(FakeGateway::new(Some("0xbuyer")));
        *gateway.coins.lock().unwrap() = vec![
            FakeGateway::coin("0xc1", 300_000_000),
            FakeGateway::coin("0xc2", 300_000_000),
        ];
        let (client, _worker, _notices) = MarketClient::new(Arc::clone(&gateway));
        client
            .store()
            .set_listed(vec![listed("0xn1", "0xl1", 1_000_000_000)])
            .await;

        let err = client.buy("0xn1").await.unwrap_err();

        assert!(matches!(
            err,
            FlowError::InsufficientBalance {
                required: 1_000_000_000,
                available: 600_000_000,
            }
        ));
        assert!(gateway.executed_specs().is_empty());
        assert_eq!(client.store().buying_in_flight().await, None);
        assert_eq!(client.store().listed().await.len(), 1);
    }

    #[tokio::test]
    async fn buy_of_an_unknown_listing_fails_without_gateway_calls() {
        let gateway = Arc::new(FakeGateway::new(Some("0xbuyer")));
        let (client, _worker, _notices) = MarketClient::new(Arc::clone(&gateway));

        let err = client.buy("0xmissing").await.unwrap_err();

        assert!(matches!(err, FlowError::ListingNotFound(_)));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn bought_item_arrives_through_the_next_owned_refresh() {
        let gateway = Arc::new(FakeGateway::new(Some("0xbuyer")));
        *gateway.coins.lock().unwrap() = vec![FakeGateway::coin("0xc1", 2_000_000_000)];
        let (client, _worker, _notices) = MarketClient::new(Arc::clone(&gateway));
        client
            .store()
            .set_listed(vec![listed("0xn1", "0xl1", 1_000_000_000)])
            .await;

        client.buy("0xn1").await.unwrap();
        assert!(client.store().owned().await.is_empty());

        // the chain settles; the next refresh sees the item under the buyer
        *gateway.owned.lock().unwrap() = vec![FakeGateway::raw_object(
            "0xn1",
            json!({ "name": "nft 0xn1", "url": "https://img.test/a.png" }),
        )];
        let (notices, _notice_rx) = NoticeSender::channel();
        let synchronizer =
            Synchronizer::new(Arc::clone(&gateway), client.store().clone(), notices);
        synchronizer.refresh_owned().await;

        let owned = client.store().owned().await;
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, "0xn1");
    }

    #[tokio::test]
    async fn mint_appends_the_new_item_and_clears_the_flag() {
        let mut gateway = FakeGateway::new(Some("0xme"));
        gateway.created = vec!["0xnew".to_string()];
        let gateway = Arc::new(gateway);
        let (client, _worker, _notices) = MarketClient::new(Arc::clone(&gateway));

        let nft = client
            .mint("first", "", "https://img.test/new.png")
            .await
            .unwrap();

        assert_eq!(nft.id, "0xnew");
        assert_eq!(nft.description, None);
        assert_eq!(client.store().owned().await, vec![nft]);
        assert!(!client.store().is_minting().await);
    }

    #[tokio::test]
    async fn mint_requires_name_and_url() {
        let gateway = Arc::new(FakeGateway::new(Some("0xme")));
        let (client, _worker, _notices) = MarketClient::new(Arc::clone(&gateway));

        let err = client.mint("", "d", "https://img.test/x.png").await.unwrap_err();
        assert!(matches!(err, FlowError::MissingField("name")));

        let err = client.mint("x", "d", "  ").await.unwrap_err();
        assert!(matches!(err, FlowError::MissingField("url")));

        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn delist_moves_the_listing_back_to_owned() {
        let gateway = Arc::new(FakeGateway::new(Some("0xseller")));
        let (client, _worker, _notices) = MarketClient::new(Arc::clone(&gateway));
        client
            .store()
            .set_listed(vec![listed("0xn1", "0xl1", 1_000_000_000)])
            .await;

        client.delist("0xn1", "0xl1").await.unwrap();

        assert!(client.store().listed().await.is_empty());
        let owned = client.store().owned().await;
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, "0xn1");
        assert_eq!(client.store().buying_in_flight().await, None);
    }

    #[tokio::test]
    async fn take_profits_targets_the_marketplace_module() {
        let gateway = Arc::new(FakeGateway::new(Some("0xseller")));
        let (client, _worker, _notices) = MarketClient::new(Arc::clone(&gateway));

        client.take_profits().await.unwrap();

        let specs = gateway.executed_specs();
        assert_eq!(specs[0].gas_budget, constants::GAS_TAKE_PROFITS);
        match &specs[0].commands[0] {
            Command::MoveCall { target, .. } => {
                assert_eq!(
                    target,
                    &constants::marketplace_target("take_profits_and_keep")
                );
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[tokio::test]
    async fn account_change_resets_and_schedules_both_refreshes() {
        let gateway = Arc::new(FakeGateway::new(Some("0xme")));
        let (client, _worker, _notices) = MarketClient::new(Arc::clone(&gateway));
        client.store().set_owned(vec![listed("0x1", "", 0).into_nft()]).await;

        client.handle_account_change().await;

        assert!(client.store().owned().await.is_empty());
        assert!(client.store().listed().await.is_empty());
    }
}
