pub mod gh_client;
pub mod watchlist;
