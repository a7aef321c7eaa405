pub mod desired;
pub mod diff;
pub mod provider;
pub mod routing;
mod store;
mod syncer;

pub use provider::UrlMapProvider;
pub use store::FileUrlMapStore;
pub use syncer::{list_load_balancer_statuses, UrlMapSyncer};
