pub mod resolve;
pub mod schema;
pub mod storage;
pub mod validation;

pub use resolve::*;
pub use schema::*;
pub use storage::*;
pub use validation::*;
