#![forbid(unsafe_code)]

use mop_core::ProposedChange;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateMopRequest {
    pub title: String,
    pub description: String,
    pub prerequisites: Vec<String>,
    /// Step actions in display order; step numbers are assigned 1..N from this order.
    pub steps: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplyChangesRequest {
    pub mop_id: i64,
    pub expected_version: Option<i64>,
    pub changes: Vec<ProposedChange>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListMopsRequest {
    pub limit: usize,
    pub offset: usize,
}
