pub mod activities;
pub mod admin;
pub mod app;
pub mod clock;
pub mod config;
pub mod early_access;
pub mod error;
pub mod hash;
pub mod meals;
pub mod nutrition;
pub mod scan;
pub mod state;
pub mod storage;
pub mod summary;
pub mod users;
pub mod vision;
