mod auction;
mod bid;
mod vehicle;

pub use {
    auction::*,
    bid::*,
    vehicle::*,
};
