//! Throttling disciplines for polite API access
//!
//! Two independent gates compose around every network transfer: a `Pacer`
//! that enforces a minimum gap between the end of one transfer and the start
//! of the next, and a `WindowLimiter` that bounds how many transfers are
//! admitted within a trailing time window. Both are explicitly owned,
//! injectable components; the deployment default is one shared instance of
//! each per process, wired at startup.

mod pacer;
mod window;

pub use pacer::Pacer;
pub use window::WindowLimiter;
