mod game;
mod group;
mod participant;

pub use game::*;
pub use group::*;
pub use participant::*;
