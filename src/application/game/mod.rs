mod create_game;
mod get_game;
mod update_game_status;

pub use create_game::*;
pub use get_game::*;
pub use update_game_status::*;
