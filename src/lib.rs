pub mod api_types;
pub mod collapse;
pub mod dedupe;
pub mod export;
pub mod filter;
pub mod models;
pub mod network;
pub mod normalize;
pub mod orchestrator;
pub mod ranking;
pub mod render;
pub mod snapshot;
pub mod summary;
pub mod views;
