mod game_repo;
mod group_repo;

pub use game_repo::*;
pub use group_repo::*;
