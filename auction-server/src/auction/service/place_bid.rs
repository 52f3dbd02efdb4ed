use {
    super::{
        verification::validate_bid,
        Service,
    },
    crate::{
        api::RestError,
        auction::{
            entities,
            repository::{
                CommitBid,
                Database,
            },
        },
        kernel::entities::BidderId,
    },
    sqlx::types::BigDecimal,
    time::OffsetDateTime,
    uuid::Uuid,
};

#[derive(Clone, Debug)]
pub struct PlaceBidInput {
    pub auction_id: entities::AuctionId,
    pub bidder:     BidderId,
    pub amount:     BigDecimal,
}

impl<D: Database> Service<D> {
    /// Places a bid on an auction.
    ///
    /// Placements for the same auction are serialized on an in-memory lock,
    /// so validation always runs against the latest committed winning state.
    /// Placements for different auctions proceed independently.
    #[tracing::instrument(
        skip_all,
        fields(auction_id = %input.auction_id, bidder = %input.bidder),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn place_bid(
        &self,
        input: PlaceBidInput,
    ) -> Result<entities::BidReceipt, RestError> {
        let auction_id = input.auction_id;
        let auction_lock = self.repo.get_or_create_auction_lock(auction_id).await;
        let result = self.place_bid_for_lock(input, auction_lock).await;
        self.repo.remove_auction_lock(auction_id).await;
        result
    }

    async fn place_bid_for_lock(
        &self,
        input: PlaceBidInput,
        auction_lock: entities::AuctionLock,
    ) -> Result<entities::BidReceipt, RestError> {
        let _guard = tokio::time::timeout(self.config.lock_timeout, auction_lock.lock())
            .await
            .map_err(|_| RestError::Busy)?;

        let mut attempts = 0;
        loop {
            let auction = self.repo.get_auction(input.auction_id).await?;
            let vehicle = self.repo.get_vehicle(auction.vehicle_id).await?;
            let now = OffsetDateTime::now_utc();

            validate_bid(
                &auction,
                &vehicle,
                input.bidder,
                &input.amount,
                now,
                &self.config.bid_policy,
            )
            .map_err(RestError::BidRejected)?;

            let bid = entities::Bid {
                id:              Uuid::new_v4(),
                auction_id:      input.auction_id,
                bidder:          input.bidder,
                bid_amount:      input.amount.clone(),
                submission_time: now,
            };

            match self.repo.add_bid(&bid).await? {
                CommitBid::Committed => {
                    return Ok(entities::BidReceipt {
                        id:              bid.id,
                        auction_id:      bid.auction_id,
                        bid_amount:      bid.bid_amount,
                        submission_time: bid.submission_time,
                        highest_bid:     input.amount.clone(),
                        highest_bidder:  input.bidder,
                    });
                }
                CommitBid::Conflict => {
                    // The stored highest bid moved past this amount after
                    // validation. Reload and re-validate against it.
                    attempts += 1;
                    if attempts > self.config.commit_retries {
                        return Err(RestError::Busy);
                    }
                    tracing::warn!(
                        auction_id = input.auction_id.to_string(),
                        attempts,
                        "Bid commit conflicted, retrying"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            auction::{
                repository::{
                    models,
                    MockDatabase,
                },
                service::Config,
            },
            config::BidPolicy,
        },
        std::{
            sync::{
                Arc,
                Mutex,
            },
            time::Duration,
        },
        time::Duration as TimeDuration,
    };

    fn service_config() -> Config {
        Config {
            bid_policy:     BidPolicy::default(),
            lock_timeout:   Duration::from_secs(5),
            commit_retries: 3,
        }
    }

    fn open_auction_row(auction_id: Uuid, vehicle_id: Uuid) -> models::Auction {
        let now = OffsetDateTime::now_utc();
        models::Auction {
            id:             auction_id,
            vehicle_id,
            starting_price: BigDecimal::from(10_000),
            start_time:     now - TimeDuration::hours(1),
            end_time:       now + TimeDuration::hours(1),
            highest_bid:    BigDecimal::from(0),
            highest_bidder: None,
        }
    }

    fn vehicle_row(vehicle_id: Uuid) -> models::Vehicle {
        models::Vehicle {
            id:        vehicle_id,
            dealer_id: None,
            make:      "Honda".to_string(),
            model:     "Civic".to_string(),
            year:      2021,
            max_price: None,
        }
    }

    fn input(auction_id: Uuid, amount: i32) -> PlaceBidInput {
        PlaceBidInput {
            auction_id,
            bidder: Uuid::new_v4(),
            amount: BigDecimal::from(amount),
        }
    }

    #[tokio::test]
    async fn accepted_bid_commits_once_and_reports_the_new_winning_state() {
        let auction_id = Uuid::new_v4();
        let vehicle_id = Uuid::new_v4();

        let mut db = MockDatabase::new();
        let auction = open_auction_row(auction_id, vehicle_id);
        db.expect_get_auction()
            .returning(move |_| Ok(auction.clone()));
        let vehicle = vehicle_row(vehicle_id);
        db.expect_get_vehicle()
            .returning(move |_| Ok(vehicle.clone()));
        db.expect_commit_bid()
            .times(1)
            .returning(|_| Ok(CommitBid::Committed));

        let service = Service::new(db, service_config());
        let input = input(auction_id, 12_000);
        let bidder = input.bidder;

        let receipt = service.place_bid(input).await.unwrap();
        assert_eq!(receipt.auction_id, auction_id);
        assert_eq!(receipt.bid_amount, BigDecimal::from(12_000));
        assert_eq!(receipt.highest_bid, BigDecimal::from(12_000));
        assert_eq!(receipt.highest_bidder, bidder);
    }

    #[tokio::test]
    async fn rejected_bid_never_reaches_the_database() {
        let auction_id = Uuid::new_v4();
        let vehicle_id = Uuid::new_v4();

        let mut db = MockDatabase::new();
        let auction = open_auction_row(auction_id, vehicle_id);
        db.expect_get_auction()
            .returning(move |_| Ok(auction.clone()));
        let vehicle = vehicle_row(vehicle_id);
        db.expect_get_vehicle()
            .returning(move |_| Ok(vehicle.clone()));
        db.expect_commit_bid().times(0);

        let service = Service::new(db, service_config());

        let result = service.place_bid(input(auction_id, 9_000)).await;
        assert_eq!(
            result.unwrap_err(),
            RestError::BidRejected(entities::BidRejection::BelowStartingPrice)
        );
    }

    #[tokio::test]
    async fn unknown_auction_is_reported_as_not_found() {
        let mut db = MockDatabase::new();
        db.expect_get_auction()
            .returning(|_| Err(RestError::AuctionNotFound));
        db.expect_commit_bid().times(0);

        let service = Service::new(db, service_config());

        let result = service.place_bid(input(Uuid::new_v4(), 12_000)).await;
        assert_eq!(result.unwrap_err(), RestError::AuctionNotFound);
    }

    #[tokio::test]
    async fn a_held_auction_lock_times_out_as_busy() {
        let auction_id = Uuid::new_v4();

        let mut db = MockDatabase::new();
        db.expect_get_auction().times(0);
        db.expect_commit_bid().times(0);

        let mut config = service_config();
        config.lock_timeout = Duration::from_millis(10);
        let service = Service::new(db, config);

        // Another placement for this auction is in flight.
        let lock = service.repo.get_or_create_auction_lock(auction_id).await;
        let _held = lock.lock().await;

        let result = service.place_bid(input(auction_id, 12_000)).await;
        assert_eq!(result.unwrap_err(), RestError::Busy);
    }

    #[tokio::test]
    async fn persistent_commit_conflicts_surface_as_busy() {
        let auction_id = Uuid::new_v4();
        let vehicle_id = Uuid::new_v4();

        let mut db = MockDatabase::new();
        let auction = open_auction_row(auction_id, vehicle_id);
        db.expect_get_auction()
            .returning(move |_| Ok(auction.clone()));
        let vehicle = vehicle_row(vehicle_id);
        db.expect_get_vehicle()
            .returning(move |_| Ok(vehicle.clone()));
        // Initial attempt plus commit_retries retries.
        db.expect_commit_bid()
            .times(4)
            .returning(|_| Ok(CommitBid::Conflict));

        let service = Service::new(db, service_config());

        let result = service.place_bid(input(auction_id, 12_000)).await;
        assert_eq!(result.unwrap_err(), RestError::Busy);
    }

    #[derive(Debug)]
    struct DbState {
        auction: models::Auction,
        bids:    Vec<models::Bid>,
    }

    /// A mock database that actually applies the guarded commit, so tests can
    /// observe the stored winning state after interleaved placements.
    fn stateful_db(state: Arc<Mutex<DbState>>, vehicle_id: Uuid) -> MockDatabase {
        let mut db = MockDatabase::new();
        let get_state = state.clone();
        db.expect_get_auction()
            .returning(move |_| Ok(get_state.lock().unwrap().auction.clone()));
        let vehicle = vehicle_row(vehicle_id);
        db.expect_get_vehicle()
            .returning(move |_| Ok(vehicle.clone()));
        db.expect_commit_bid().returning(move |bid| {
            let mut state = state.lock().unwrap();
            if bid.bid_amount <= state.auction.highest_bid {
                return Ok(CommitBid::Conflict);
            }
            state.auction.highest_bid = bid.bid_amount.clone();
            state.auction.highest_bidder = Some(bid.bidder);
            state.bids.push(bid.clone());
            Ok(CommitBid::Committed)
        });
        db
    }

    #[tokio::test]
    async fn sequential_bids_are_all_recorded() {
        let auction_id = Uuid::new_v4();
        let vehicle_id = Uuid::new_v4();
        let state = Arc::new(Mutex::new(DbState {
            auction: open_auction_row(auction_id, vehicle_id),
            bids:    Vec::new(),
        }));

        let service = Service::new(stateful_db(state.clone(), vehicle_id), service_config());

        let amounts = [10_000, 10_500, 11_000, 12_000, 15_000];
        for amount in amounts {
            service.place_bid(input(auction_id, amount)).await.unwrap();
        }

        let state = state.lock().unwrap();
        assert_eq!(state.bids.len(), amounts.len());
        assert_eq!(state.auction.highest_bid, BigDecimal::from(15_000));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_bids_never_lose_an_update() {
        let auction_id = Uuid::new_v4();
        let vehicle_id = Uuid::new_v4();
        let state = Arc::new(Mutex::new(DbState {
            auction: open_auction_row(auction_id, vehicle_id),
            bids:    Vec::new(),
        }));

        let service = Service::new(stateful_db(state.clone(), vehicle_id), service_config());

        let amounts: Vec<i32> = (1..=20).map(|i| 10_000 + i * 100).collect();
        let mut handles = Vec::new();
        for amount in amounts.clone() {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                (amount, service.place_bid(input(auction_id, amount)).await)
            }));
        }

        let mut accepted = Vec::new();
        for handle in handles {
            let (amount, result) = handle.await.unwrap();
            match result {
                Ok(_) => accepted.push(amount),
                Err(RestError::BidRejected(entities::BidRejection::BidTooLow)) => {}
                Err(e) => panic!("unexpected error for amount {amount}: {e:?}"),
            }
        }

        let state = state.lock().unwrap();
        // Every accepted bid is recorded and the stored highest is the
        // largest accepted amount.
        assert_eq!(state.bids.len(), accepted.len());
        let max_accepted = accepted.iter().max().copied().unwrap();
        assert_eq!(state.auction.highest_bid, BigDecimal::from(max_accepted));
        // The largest proposed amount always beats the running highest, so it
        // must have been accepted.
        assert!(accepted.contains(amounts.iter().max().unwrap()));
        // Recorded amounts are strictly increasing in commit order.
        for pair in state.bids.windows(2) {
            assert!(pair[0].bid_amount < pair[1].bid_amount);
        }
    }
}
