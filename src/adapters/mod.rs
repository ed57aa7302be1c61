// Adapters layer: concrete implementations for external systems (graph database, http, storage)

pub mod graph_http;
pub mod http;
pub mod storage;
