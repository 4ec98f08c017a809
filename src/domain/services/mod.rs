mod priority_service;
mod waitlist_service;

pub use priority_service::*;
pub use waitlist_service::*;
