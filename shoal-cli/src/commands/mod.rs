pub mod info;
pub mod query;

pub use info::run_info;
pub use query::run_query;
