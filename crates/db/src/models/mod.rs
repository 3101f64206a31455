pub mod daily_quest_set;
pub mod notification;
pub mod quest;
pub mod quest_completion;
pub mod team;
