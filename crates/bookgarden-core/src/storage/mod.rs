pub mod database;
pub mod garden;
pub mod queries;
pub mod repositories;

pub use garden::Garden;
