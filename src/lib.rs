pub mod batch;
pub mod config;
pub mod docx;
pub mod error;
pub mod fiscal;
pub mod irl;
pub mod replace;
pub mod report;
pub mod rollforward;
pub mod sections;

pub use config::Config;
pub use error::{Error, Result};
pub use replace::{Replacement, ReplacementSet};
pub use report::RollForwardReport;
pub use rollforward::{
    DraftOutput, DraftPayload, RollForwardEngine, RollForwardOutcome, RollForwardRequest,
    UpdateMode,
};
