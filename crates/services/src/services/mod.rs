pub mod notification;
pub mod quest;
pub mod seed;
