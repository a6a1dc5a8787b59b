//! macOS integration layer for Window Templates
//!
//! Each platform capability the orchestrator needs (accessibility trust,
//! process lookup and launch, window query and control, display geometry)
//! sits behind a small trait. The `System*` types talk to the real APIs on
//! macOS; `SimulatedDesktop` implements all of them in memory.

pub mod accessibility;
pub mod display;
pub mod permissions;
pub mod simulated;
pub mod workspace;

pub use accessibility::*;
pub use display::*;
pub use permissions::*;
pub use simulated::*;
pub use workspace::*;
