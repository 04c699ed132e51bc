pub mod identity;
pub mod qcloud;
pub mod transport;
