pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod import;
pub mod model;
pub mod normalize;
pub mod query;
pub mod store;
pub mod summary;
pub mod track;

pub use config::Config;
pub use query::QueryLayer;
pub use store::ActivityStore;
