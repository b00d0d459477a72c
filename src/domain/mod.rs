// Domain layer: booking models and the ports the engine consumes.

pub mod model;
pub mod ports;
