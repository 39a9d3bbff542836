//! Genetic route optimization over geographic stops, plus a small seat
//! recommender for the same booking flow.

pub mod chromosome;
pub mod demo_data;
pub mod distance;
pub mod errors;
pub mod genetic_algorithm;
pub mod genetic_optimizer;
pub mod logging;
pub mod population;
pub mod random;
pub mod seats;
pub mod visualization;

pub use distance::{DistanceModel, Haversine, Stop, StopId};
pub use errors::{Error, Result};
pub use genetic_optimizer::{
    CancellationToken, FixedGenerations, GeneticRouteOptimizer, OptimizationResult,
    OptimizerConfig, RouteConstraints, StallEvaluator, Termination,
};
pub use population::{BestTracking, PairingScheme};
pub use random::RandomSource;
pub use seats::{recommend_seats, SeatPosition, SeatPreference};
