pub mod account;
pub mod message;
pub mod notification;

pub use account::Account;
pub use message::{Category, Message};
pub use notification::{DeliveryStatus, NotificationRecord};
