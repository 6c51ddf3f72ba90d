pub mod counters;
pub mod identity;
pub mod platform;
pub mod sampler;
pub mod snapshot;

pub use sampler::Sampler;
pub use snapshot::Snapshot;
