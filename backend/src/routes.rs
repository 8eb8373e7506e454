use actix_web::{get, post, web, HttpResponse, Responder};

use market_client::coin;
use market_client::flows::FlowError;
use market_client::store::{RefreshKind, RefreshRequest};

use crate::params_structs::{
    BalanceResponse, BuyParams, DelistParams, ListParams, ListedResponse, ListingView, MintParams,
};
use crate::AppState;

fn flow_error_response(err: &FlowError) -> HttpResponse {
    match err {
        FlowError::Gateway(_) => HttpResponse::BadGateway().body(err.to_string()),
        _ => HttpResponse::BadRequest().body(err.to_string()),
    }
}

#[post("/mint")]
pub async fn mint(state: web::Data<AppState>, params: web::Json<MintParams>) -> impl Responder {
    let description = params.description.clone().unwrap_or_default();
    match state
        .client
        .mint(&params.name, &description, &params.url)
        .await
    {
        Ok(nft) => HttpResponse::Ok().json(nft),
        Err(err) => flow_error_response(&err),
    }
}

#[get("/listings")]
pub async fn get_listings(state: web::Data<AppState>) -> impl Responder {
    let listings: Vec<ListingView> = state
        .client
        .store()
        .listed()
        .await
        .into_iter()
        .map(ListingView::from)
        .collect();
    HttpResponse::Ok().json(listings)
}

#[post("/list")]
pub async fn list(state: web::Data<AppState>, params: web::Json<ListParams>) -> impl Responder {
    match state.client.list(&params.nft_id, params.price).await {
        Ok(listing_id) => HttpResponse::Ok().json(ListedResponse { listing_id }),
        Err(err) => flow_error_response(&err),
    }
}

#[post("/buy")]
pub async fn buy(state: web::Data<AppState>, params: web::Json<BuyParams>) -> impl Responder {
    match state.client.buy(&params.nft_id).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(err) => flow_error_response(&err),
    }
}

#[post("/delist")]
pub async fn delist(
    state: web::Data<AppState>,
    params: web::Json<DelistParams>,
) -> impl Responder {
    match state
        .client
        .delist(&params.nft_id, &params.listing_id)
        .await
    {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(err) => flow_error_response(&err),
    }
}

#[post("/take_profits")]
pub async fn take_profits(state: web::Data<AppState>) -> impl Responder {
    match state.client.take_profits().await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(err) => flow_error_response(&err),
    }
}

#[post("/refresh")]
pub async fn refresh(state: web::Data<AppState>) -> impl Responder {
    let store = state.client.store();
    store.schedule_refresh(RefreshRequest::now(RefreshKind::Owned));
    store.schedule_refresh(RefreshRequest::now(RefreshKind::Listed));
    HttpResponse::Accepted().finish()
}

#[get("/owned")]
pub async fn get_owned(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.client.store().owned().await)
}

#[get("/balance")]
pub async fn get_balance(state: web::Data<AppState>) -> impl Responder {
    match state.client.wallet_balance().await {
        Ok(balance) => HttpResponse::Ok().json(BalanceResponse {
            balance: coin::format_sui(balance),
        }),
        Err(err) => flow_error_response(&err),
    }
}
