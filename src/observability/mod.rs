//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and lifecycle code
//!     → macros.rs / global.rs (late-bound convenience entry points)
//!     → logging.rs (level gate, field merge, line format)
//!     → sink.rs (locked single write, fallback on failure)
//!
//! Framework internals (tower-http, hyper)
//!     → subscriber.rs (tracing fmt subscriber)
//!
//! Counters and gauges
//!     → metrics.rs (Prometheus exporter when configured)
//! ```
//!
//! # Design Decisions
//! - Loggers are immutable values; deriving one copies the field list
//! - The sink owns the lock, so derived loggers serialize on one mutex
//! - Call sites are captured at the call, never by stack walking
//! - Process termination on fatal is injectable for tests

pub mod caller;
pub mod clock;
pub mod field;
pub mod global;
pub mod level;
pub mod logging;
pub mod macros;
pub mod metrics;
pub mod sink;
pub mod subscriber;

pub use caller::CallSite;
pub use clock::{Clock, FixedClock, SystemClock};
pub use field::Field;
pub use global::{global_logger, set_global_logger};
pub use level::{Level, ParseLevelError};
pub use logging::{Logger, LoggerBuilder, ProcessExit, Terminator, FATAL_EXIT_CODE};
pub use sink::{MemoryWriter, Sink};
