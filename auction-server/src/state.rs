use crate::{
    auction::service::Service,
    kernel::db::DB,
};

pub struct Store {
    pub auction_service: Service<DB>,
}
