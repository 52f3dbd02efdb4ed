use {
    super::entities,
    std::collections::HashMap,
    tokio::sync::Mutex,
};

mod add_auction;
mod add_bid;
mod delete_auction;
mod get_auction;
mod get_auction_lock;
mod get_bids;
mod get_vehicle;
pub mod models;
mod remove_auction_lock;
mod update_auction;

pub use models::*;

/// Transient coordination state. Lock entries exist only while at least one
/// bid placement for that auction is in flight.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub auction_locks: Mutex<HashMap<entities::AuctionId, entities::AuctionLock>>,
}

#[derive(Debug)]
pub struct Repository<D: Database> {
    pub in_memory_store: InMemoryStore,
    pub db:              D,
}

impl<D: Database> Repository<D> {
    pub fn new(db: D) -> Self {
        Self {
            in_memory_store: InMemoryStore::default(),
            db,
        }
    }
}
