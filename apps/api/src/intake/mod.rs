//! Third-party job-application intake pipeline.
//!
//! Deliveries arrive at-least-once from the external job board; the pipeline
//! verifies the HMAC signature, pulls resume text out of whatever shape the
//! payload takes, stores the original file best-effort, claims the delivery
//! id atomically and hands the submission to the scoring service. The sender
//! is always answered with HTTP 200 so it never retries on our internal
//! failures; only an invalid signature earns a 401.

pub mod audit;
pub mod coordinator;
pub mod extract;
pub mod handlers;
pub mod payload;
pub mod repo;
pub mod signature;
pub mod storage;
