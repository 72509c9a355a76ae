pub mod chat;
pub mod index;
pub mod ingest;
pub mod liveness;
pub mod readiness;
