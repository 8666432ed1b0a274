pub mod account;
pub mod notification;
pub mod ports;
pub mod transaction;
