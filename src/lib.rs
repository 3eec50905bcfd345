//! CosmoVerse - Solar System Explorer Backend
//!
//! REST API for a 3D solar-system front-end: celestial-system, planet, and
//! satellite catalog plus the full authentication lifecycle (JWT access
//! tokens, rotating refresh tokens, email verification, password reset).

pub mod core;
