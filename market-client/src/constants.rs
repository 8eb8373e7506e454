// Package id of the deployed NFT + marketplace contract.
pub const PACKAGE_ID: &str = "0x10803b7ef380208b23043c45617b3d1fac15c7f5ed6a0dc87480c28811476386";

// Shared marketplace object the listing table hangs off.
pub const MARKETPLACE_OBJECT_ID: &str =
    "0xece2306b9e52fbdafa0405a6276ee2cd182aec1fc5900cc22edadb38414acc1a";

pub const MIST_PER_SUI: u64 = 1_000_000_000;

/// Fixed wait before a post-confirmation refresh, so the chain has settled
/// the new state by the time we re-read it.
pub const REFRESH_DELAY_MS: u64 = 2_000;

// Gas budgets per operation kind.
pub const GAS_MINT: u64 = 100_000_000;
pub const GAS_LIST: u64 = 1_000_000;
pub const GAS_TRADE: u64 = 100_000_000;
pub const GAS_TAKE_PROFITS: u64 = 10_000;

/// Move type of mintable NFT objects, for owned-object queries.
pub fn nft_type() -> String {
    format!("{}::testnet_nft::TestnetNFT", PACKAGE_ID)
}

pub fn nft_mint_target() -> String {
    format!("{}::mynft::mint_to_sender", PACKAGE_ID)
}

/// An entry point of the marketplace module, e.g. `marketplace_target("list")`.
pub fn marketplace_target(entry: &str) -> String {
    format!("{}::marketplace::{}", PACKAGE_ID, entry)
}
