pub mod answer;
pub mod event;
pub mod metadata;
pub mod user;
