//! Review Assign - pull request reviewer assignment for small teams.
//!
//! Teams and their members live in SQLite. Creating a pull request picks up
//! to two active teammates of the author as reviewers; reviewers can later be
//! swapped for another teammate, and pull requests merged. Every operation
//! runs in one transaction through [`db::Store`], and [`server`] exposes the
//! operations over JSON/HTTP.

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod server;
pub mod services;
