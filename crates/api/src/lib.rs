//! HTTP transport for the image-effect job API.
//!
//! Covers the four remote calls the mugshot workflow depends on (upload
//! slot, byte transfer, job submission, status polling) plus a raw byte
//! fetch for downloading finished artifacts. Everything above this crate
//! talks to the [`Transport`] trait so it can be exercised with mocks.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{Endpoints, HttpTransport};
pub use error::TransportError;
pub use transport::{Transport, TransportFuture};
pub use types::{
    EFFECT_ID, JobRequest, JobStatus, JobStatusResponse, MODEL, SubmittedJob, USER_ID,
};
