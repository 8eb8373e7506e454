mod params_structs;
mod routes;

use std::env;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use url::Url;

use market_client::flows::MarketClient;
use market_client::store::{RefreshKind, RefreshRequest};
use sui_client::apis::_apis::DEFAULT_RPC_URL;
use sui_client::gateway::{SuiRpcGateway, WalletBridge};

use routes::{
    buy, delist, get_balance, get_listings, get_owned, list, mint, refresh, take_profits,
};

pub struct AppState {
    pub client: MarketClient<SuiRpcGateway>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let rpc_url = env::var("SUI_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());
    let rpc_url = Url::parse(&rpc_url).expect("SUI_RPC_URL must be a valid url");

    // without a wallet session the service still serves reads
    let wallet = match (env::var("WALLET_BRIDGE_URL"), env::var("WALLET_ADDRESS")) {
        (Ok(bridge), Ok(address)) => Some(WalletBridge {
            address,
            url: Url::parse(&bridge).expect("WALLET_BRIDGE_URL must be a valid url"),
        }),
        _ => None,
    };

    let gateway = Arc::new(SuiRpcGateway::new(rpc_url, wallet));
    let (client, worker, mut notices) = MarketClient::new(gateway);

    tokio::spawn(worker.run());
    tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            println!("[{:?}] {}", notice.level, notice.message);
        }
    });

    client.handle_account_change().await;
    client
        .store()
        .schedule_refresh(RefreshRequest::now(RefreshKind::Listed));

    let state = web::Data::new(AppState { client });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(web::scope("/nft").service(mint))
            .service(
                web::scope("/market")
                    .service(get_listings)
                    .service(list)
                    .service(buy)
                    .service(delist)
                    .service(take_profits)
                    .service(refresh),
            )
            .service(web::scope("/user").service(get_owned).service(get_balance))
    })
    .bind(("127.0.0.1", 8888))?
    .run()
    .await
}
