// Domain layer: models, report types and ports. Adapters implement the ports.

pub mod model;
pub mod ports;
pub mod report;
