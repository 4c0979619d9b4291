//! Rebound publisher library.
//!
//! A service that holds scraped, AI-rewritten news posts in a SQLite store
//! and republishes each one to a WordPress site and a Facebook page, driven
//! by in-process timers and manual HTTP triggers.

pub mod adapters;
pub mod categories;
pub mod config;
pub mod db;
pub mod publish;
pub mod scheduler;
pub mod web;
