pub mod game;
pub mod group;
pub mod registration;
