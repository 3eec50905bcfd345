//! Core modules for CosmoVerse

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod email;
