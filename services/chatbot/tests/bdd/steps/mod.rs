//! BDD step definitions for chatbot service

pub mod command_steps;
pub mod dashboard_steps;
