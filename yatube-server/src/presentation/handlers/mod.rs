pub mod about;
pub mod auth;
pub mod follow;
pub mod health;
pub mod posts;
