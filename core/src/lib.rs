pub mod agent;
pub mod chat;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod intent;
pub mod meal_plan;
pub mod models;
pub mod nutrition;
pub mod responder;
pub mod service;
pub mod session;
pub mod users;
