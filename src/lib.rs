//! Task Board Library
//!
//! This module exports the core components for testing and integration.

pub mod cli;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod service;
pub mod types;
pub mod web;
