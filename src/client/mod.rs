pub mod api;
pub mod pagination;
pub mod params;

pub use api::{Collection, Cycles, Recoveries, Sleeps, WhoopClient, Workouts};
pub use pagination::DEFAULT_PAGE_SIZE;
pub use params::{CollectionParams, DEFAULT_LIMIT, MAX_LIMIT};
