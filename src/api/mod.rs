pub mod de;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod negotiate;
pub mod payload;
pub mod routes;

pub use routes::routes;
