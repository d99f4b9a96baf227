pub mod repeat;
pub mod subscribe_on;

pub use repeat::Repeat;
pub use subscribe_on::SubscribeOn;
