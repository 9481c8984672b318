//! Goal routes

pub mod api;

pub use api::{api_goal_create, api_goal_delete, api_goal_update, api_goals};
