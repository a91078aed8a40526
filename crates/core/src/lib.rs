#![forbid(unsafe_code)]

pub mod change;
pub mod model;
pub mod prerequisites;
pub mod reconcile;
pub mod replay;

pub use change::{
    AppliedEdit, ChangeEdit, ChangeError, ChangeRecord, ChangeValue, FieldKind, ProposedChange,
};
pub use model::{Mop, MopSummary, Prompt, PromptKind, PromptKindError, Step};
pub use prerequisites::ListError;
pub use reconcile::{reconcile, strip_markers};
pub use replay::{Reconstruction, fast_forward, reconstruct};
