mod tracing;

pub use tracing::init as init_tracing;
