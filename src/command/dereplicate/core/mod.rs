pub mod aggregation;
pub mod core;
pub mod mate_join;
pub mod pairing;
pub mod params;
pub mod propagation;
pub mod representative;
