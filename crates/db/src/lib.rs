pub mod errors;
pub mod models;
pub mod pg;
pub mod repositories;

pub use common::ListOrder;
pub use errors::DbError;
pub use models::*;
pub use repositories::*;
