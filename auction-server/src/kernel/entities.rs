use uuid::Uuid;

/// Stable identifier of an authenticated principal, issued by the external
/// identity provider. The core trusts it and never authenticates itself.
pub type BidderId = Uuid;

pub type VehicleId = Uuid;
pub type DealerId = Uuid;
