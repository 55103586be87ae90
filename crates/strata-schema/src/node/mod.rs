mod property;
mod schema;
mod ty;

pub use property::*;
pub use schema::*;
pub use ty::*;
