//! Connection admission and bot-verification pipeline: the attack detector, admission queue,
//! reputation/rejoin caches, verification session manager and its checks, and the composition
//! root that orchestrates all of them.

pub mod admission_queue;
pub mod attack_detector;
pub mod config;
pub mod controller;
pub mod error;
pub mod reputation;
pub mod rejoin;
pub mod session;

pub use config::AdmissionConfig;
pub use controller::{AdmissionController, AdmissionOutcome};
pub use error::Error;
