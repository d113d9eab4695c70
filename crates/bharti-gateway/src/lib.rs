//! HTTP gateway for the Bharti backend.
//!
//! Exposes the conversation pipeline over three routes: `POST /chat`,
//! `GET /clear_memory` and `GET /health`. All pipeline failures below the
//! orchestrator arrive here as degraded answers with a 200 status; only the
//! no-answer-produced case maps to a 404 (kept for compatibility with the
//! original portal frontend, which treats 404 as "logical failure").

pub mod server;

pub use server::{ChatRequest, ChatResponse, GatewayServer};
