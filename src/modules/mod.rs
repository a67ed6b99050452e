pub mod ad;
pub mod category;
pub mod health;
pub mod location;
pub mod user;

mod router;
pub use router::get_router;
