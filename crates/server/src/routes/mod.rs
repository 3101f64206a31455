pub mod notifications;
pub mod quests;
