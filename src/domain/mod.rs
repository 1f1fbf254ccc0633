// Domain layer: models and ports. Adapters and the updater depend on it, never the reverse.

pub mod model;
pub mod ports;
