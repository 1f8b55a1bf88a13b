//! Route handlers

pub mod card;
pub mod health;
pub mod tools;
