mod add_group_member;
mod create_group;
mod get_member_priority;
mod list_group_members;

pub use add_group_member::*;
pub use create_group::*;
pub use get_member_priority::*;
pub use list_group_members::*;
