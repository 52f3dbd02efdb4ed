use {
    crate::kernel::entities::{
        DealerId,
        VehicleId,
    },
    sqlx::types::BigDecimal,
};

/// Catalog view of a vehicle. The catalog is managed outside the bidding
/// core; this entity is read-only here and only the optional price ceiling
/// participates in validation.
#[derive(Clone, Debug, PartialEq)]
pub struct Vehicle {
    pub id:        VehicleId,
    pub dealer_id: Option<DealerId>,
    pub make:      String,
    pub model:     String,
    pub year:      i32,

    /// Maximum acceptable price, when the dealer configured one.
    pub max_price: Option<BigDecimal>,
}
