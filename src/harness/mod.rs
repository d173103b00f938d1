pub mod cases;
pub mod context;
pub mod run;
pub mod types;

pub use cases::{TestCase, all_cases, select_cases};
pub use context::CaseContext;
pub use run::run_harness;
pub use types::{CaseGroup, HarnessConfig, HarnessError, HarnessResult, ensure};
