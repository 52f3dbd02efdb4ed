use {
    super::{
        Database,
        Repository,
    },
    crate::auction::entities,
    std::sync::Arc,
};

impl<D: Database> Repository<D> {
    pub async fn remove_auction_lock(&self, auction_id: entities::AuctionId) {
        let mut mutex_guard = self.in_memory_store.auction_locks.lock().await;
        let auction_lock = mutex_guard.get(&auction_id);
        if let Some(auction_lock) = auction_lock {
            // Whenever there is no thread borrowing a lock for this auction, we can remove it from the locks HashMap.
            if Arc::strong_count(auction_lock) == 1 {
                mutex_guard.remove(&auction_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::super::{
            MockDatabase,
            Repository,
        },
        uuid::Uuid,
    };

    #[tokio::test]
    async fn same_auction_gets_the_same_lock() {
        let repo = Repository::new(MockDatabase::new());
        let auction_id = Uuid::new_v4();

        let first = repo.get_or_create_auction_lock(auction_id).await;
        let second = repo.get_or_create_auction_lock(auction_id).await;

        assert!(std::sync::Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn different_auctions_get_independent_locks() {
        let repo = Repository::new(MockDatabase::new());

        let first = repo.get_or_create_auction_lock(Uuid::new_v4()).await;
        let second = repo.get_or_create_auction_lock(Uuid::new_v4()).await;

        assert!(!std::sync::Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn lock_is_removed_only_when_nobody_holds_it() {
        let repo = Repository::new(MockDatabase::new());
        let auction_id = Uuid::new_v4();

        let held = repo.get_or_create_auction_lock(auction_id).await;
        repo.remove_auction_lock(auction_id).await;
        assert_eq!(repo.in_memory_store.auction_locks.lock().await.len(), 1);

        drop(held);
        repo.remove_auction_lock(auction_id).await;
        assert!(repo.in_memory_store.auction_locks.lock().await.is_empty());
    }
}
