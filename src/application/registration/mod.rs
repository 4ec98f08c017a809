mod capacity_gate;
mod join_game;
mod list_participants;
mod priority_scorer;
mod process_waitlist;
mod rank_waitlist;
mod remove_participant;
mod update_participant;

pub use capacity_gate::*;
pub use join_game::*;
pub use list_participants::*;
pub use priority_scorer::*;
pub use process_waitlist::*;
pub use rank_waitlist::*;
pub use remove_participant::*;
pub use update_participant::*;
