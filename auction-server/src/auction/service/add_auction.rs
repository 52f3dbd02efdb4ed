use {
    super::Service,
    crate::{
        api::RestError,
        auction::{
            entities,
            repository::Database,
        },
        kernel::entities::VehicleId,
    },
    sqlx::types::BigDecimal,
    time::OffsetDateTime,
};

#[derive(Clone, Debug)]
pub struct AddAuctionInput {
    pub vehicle_id:     VehicleId,
    pub starting_price: BigDecimal,
    pub start_time:     OffsetDateTime,
    pub end_time:       OffsetDateTime,
}

impl<D: Database> Service<D> {
    pub async fn add_auction(
        &self,
        input: AddAuctionInput,
    ) -> Result<entities::Auction, RestError> {
        if input.starting_price <= BigDecimal::from(0) {
            return Err(RestError::BadParameters(
                "starting price must be positive".to_string(),
            ));
        }
        if input.start_time >= input.end_time {
            return Err(RestError::BadParameters(
                "start time must be before end time".to_string(),
            ));
        }

        // The vehicle must exist in the catalog before it can go on sale.
        self.repo.get_vehicle(input.vehicle_id).await?;

        let auction = entities::Auction::new(
            input.vehicle_id,
            input.starting_price,
            input.start_time,
            input.end_time,
        );
        self.repo.add_auction(&auction).await?;
        Ok(auction)
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
        std::time::Duration,
        time::Duration as TimeDuration,
        uuid::Uuid,
    };

    fn service_config() -> Config {
        Config {
            bid_policy:     BidPolicy::default(),
            lock_timeout:   Duration::from_secs(5),
            commit_retries: 3,
        }
    }

    fn vehicle_row(vehicle_id: Uuid) -> models::Vehicle {
        models::Vehicle {
            id:        vehicle_id,
            dealer_id: None,
            make:      "Ford".to_string(),
            model:     "Focus".to_string(),
            year:      2019,
            max_price: None,
        }
    }

    fn valid_input(vehicle_id: Uuid) -> AddAuctionInput {
        let now = OffsetDateTime::now_utc();
        AddAuctionInput {
            vehicle_id,
            starting_price: BigDecimal::from(10_000),
            start_time: now,
            end_time: now + TimeDuration::days(1),
        }
    }

    #[tokio::test]
    async fn new_auctions_start_with_no_winning_state() {
        let vehicle_id = Uuid::new_v4();
        let mut db = MockDatabase::new();
        let vehicle = vehicle_row(vehicle_id);
        db.expect_get_vehicle()
            .returning(move |_| Ok(vehicle.clone()));
        db.expect_add_auction().times(1).returning(|_| Ok(()));

        let service = Service::new(db, service_config());
        let auction = service.add_auction(valid_input(vehicle_id)).await.unwrap();

        assert_eq!(auction.vehicle_id, vehicle_id);
        assert_eq!(auction.highest_bid, BigDecimal::from(0));
        assert_eq!(auction.highest_bidder, None);
    }

    #[tokio::test]
    async fn inverted_time_windows_are_rejected() {
        let vehicle_id = Uuid::new_v4();
        let mut db = MockDatabase::new();
        db.expect_add_auction().times(0);

        let service = Service::new(db, service_config());
        let mut input = valid_input(vehicle_id);
        input.end_time = input.start_time - TimeDuration::hours(1);

        assert!(matches!(
            service.add_auction(input).await,
            Err(RestError::BadParameters(_))
        ));
    }

    #[tokio::test]
    async fn non_positive_starting_prices_are_rejected() {
        let vehicle_id = Uuid::new_v4();
        let mut db = MockDatabase::new();
        db.expect_add_auction().times(0);

        let service = Service::new(db, service_config());
        let mut input = valid_input(vehicle_id);
        input.starting_price = BigDecimal::from(0);

        assert!(matches!(
            service.add_auction(input).await,
            Err(RestError::BadParameters(_))
        ));
    }

    #[tokio::test]
    async fn auctions_for_unknown_vehicles_are_rejected() {
        let mut db = MockDatabase::new();
        db.expect_get_vehicle()
            .returning(|_| Err(RestError::VehicleNotFound));
        db.expect_add_auction().times(0);

        let service = Service::new(db, service_config());

        assert_eq!(
            service
                .add_auction(valid_input(Uuid::new_v4()))
                .await
                .unwrap_err(),
            RestError::VehicleNotFound
        );
    }
}
