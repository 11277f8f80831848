//! Rate limiting logic and state management.

mod limiter;
mod window;

pub use limiter::{RateLimiter, UsageStats};
pub use window::RequestLog;
