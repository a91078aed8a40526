#![forbid(unsafe_code)]

use crate::error::ApiError;
use crate::generator::ContentGenerator;
use crate::parse;
use crate::templates::revision_prompt;
use mop_core::{Mop, ProposedChange};

/// Asks the generator for edits to `mop` that address `feedback`. The proposals are
/// returned untrusted; the store validates and applies them.
pub(crate) fn propose_changes<G: ContentGenerator + ?Sized>(
    generator: &G,
    mop: &Mop,
    feedback: &str,
) -> Result<Vec<ProposedChange>, ApiError> {
    let feedback = feedback.trim();
    if feedback.is_empty() {
        return Err(ApiError::Validation("feedback must not be empty".to_string()));
    }
    let text = generator.generate(&revision_prompt(mop, feedback))?;
    let proposals = parse::proposals(&text)?;
    tracing::debug!(mop_id = mop.id, proposals = proposals.len(), "generated change proposals");
    Ok(proposals)
}
