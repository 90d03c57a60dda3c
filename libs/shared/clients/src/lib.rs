pub mod catalog;
pub mod identity;
pub mod notify;

pub use catalog::{CatalogClient, ServiceInfo};
pub use identity::IdentityClient;
pub use notify::Notifier;
