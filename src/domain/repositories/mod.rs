mod game_repository;
mod group_repository;

pub use game_repository::*;
pub use group_repository::*;
