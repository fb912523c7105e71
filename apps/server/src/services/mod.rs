//! Orchestration services: multi-step flows that span repositories.

pub mod settlement;
