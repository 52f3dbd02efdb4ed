use {
    super::{
        Database,
        Repository,
    },
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::VehicleId,
    },
};

impl<D: Database> Repository<D> {
    pub async fn get_vehicle(&self, vehicle_id: VehicleId) -> Result<entities::Vehicle, RestError> {
        let vehicle = self.db.get_vehicle(vehicle_id).await?;
        Ok(vehicle.get_entity())
    }
}
