pub mod audit;
pub mod backup;
pub mod handlers;
pub mod matches;
pub mod middleware;
pub mod players;
pub mod response;
pub mod roster;
pub mod routes;
pub mod scoring;
pub mod stats;
pub mod teams;

pub use routes::create_router;
