//! HTTP request handlers and their wire types.

use crate::error::{ApiError, ApiJson};
use crate::server::AppState;
use agora_engine::SECS_PER_DAY;
use agora_store::{LedgerStore, Proposal, Vote};
use agora_types::{Choice, ProposalId, ProposalStatus, Tally, Timestamp, VoteId};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Header carrying the admin credential for privileged operations.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

fn admin_credential(headers: &HeaderMap) -> Option<&str> {
    headers.get(ADMIN_TOKEN_HEADER).and_then(|v| v.to_str().ok())
}

// ── Health ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Handler for `GET /health`.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

// ── Proposals ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateProposalRequest {
    pub title: String,
    pub description: String,
    /// Days the proposal stays open for voting. Defaults to the configured
    /// window when absent.
    pub days_open: Option<u32>,
}

#[derive(Serialize)]
pub struct ProposalResponse {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub created_at: Timestamp,
    pub deadline: Timestamp,
    pub status: ProposalStatus,
    pub yes_count: u64,
    pub no_count: u64,
    pub abstain_count: u64,
}

impl ProposalResponse {
    fn from_parts(proposal: Proposal, tally: Tally) -> Self {
        Self {
            id: proposal.id,
            title: proposal.title,
            description: proposal.description,
            created_at: proposal.created_at,
            deadline: proposal.deadline,
            status: proposal.status,
            yes_count: tally.yes,
            no_count: tally.no,
            abstain_count: tally.abstain,
        }
    }
}

/// Handler for `POST /proposals`.
pub async fn create_proposal<S>(
    State(state): State<AppState<S>>,
    ApiJson(req): ApiJson<CreateProposalRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    S: LedgerStore + Clone + Send + Sync + 'static,
{
    let now = state.clock.now();
    let open_secs = req.days_open.map(|days| u64::from(days) * SECS_PER_DAY);
    let proposal = state
        .lifecycle
        .create(&req.title, &req.description, open_secs, now)?;
    state.metrics.proposals_created.inc();
    info!(id = %proposal.id, deadline = %proposal.deadline, "proposal created");
    // A fresh proposal has no votes yet.
    let body = ProposalResponse::from_parts(proposal, Tally::ZERO);
    Ok((StatusCode::CREATED, Json(body)))
}

/// Handler for `GET /proposals`.
pub async fn list_proposals<S>(
    State(state): State<AppState<S>>,
) -> Result<impl IntoResponse, ApiError>
where
    S: LedgerStore + Clone + Send + Sync + 'static,
{
    let now = state.clock.now();
    let proposals = state.lifecycle.list(now)?;
    let mut out = Vec::with_capacity(proposals.len());
    for proposal in proposals {
        let tally = state.tally.tally(proposal.id, now)?;
        out.push(ProposalResponse::from_parts(proposal, tally));
    }
    Ok(Json(out))
}

/// Handler for `GET /proposals/:id`.
pub async fn get_proposal<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError>
where
    S: LedgerStore + Clone + Send + Sync + 'static,
{
    let id = ProposalId::new(id);
    let now = state.clock.now();
    let proposal = state.lifecycle.resolve(id, now)?;
    let tally = state.tally.tally(id, now)?;
    Ok(Json(ProposalResponse::from_parts(proposal, tally)))
}

/// Handler for `PATCH /proposals/:id/close`.
pub async fn close_proposal<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError>
where
    S: LedgerStore + Clone + Send + Sync + 'static,
{
    let id = ProposalId::new(id);
    let now = state.clock.now();
    let proposal = state.lifecycle.close(id, admin_credential(&headers), now)?;
    state.metrics.proposals_closed.inc();
    info!(id = %proposal.id, "proposal closed");
    let tally = state.tally.tally(id, now)?;
    Ok(Json(ProposalResponse::from_parts(proposal, tally)))
}

// ── Votes ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VoteRequest {
    pub voter_name: String,
    /// One of `yes`, `no`, `abstain`.
    pub vote: String,
}

#[derive(Serialize)]
pub struct VoteResponse {
    pub id: VoteId,
    pub proposal_id: ProposalId,
    pub voter_name: String,
    pub vote: Choice,
    pub voted_at: Timestamp,
}

impl From<Vote> for VoteResponse {
    fn from(vote: Vote) -> Self {
        Self {
            id: vote.id,
            proposal_id: vote.proposal,
            voter_name: vote.voter,
            vote: vote.choice,
            voted_at: vote.voted_at,
        }
    }
}

/// Handler for `POST /proposals/:id/vote`.
pub async fn cast_vote<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<u64>,
    ApiJson(req): ApiJson<VoteRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    S: LedgerStore + Clone + Send + Sync + 'static,
{
    let choice: Choice = req
        .vote
        .parse()
        .map_err(|e: agora_types::ParseChoiceError| ApiError::validation(e.to_string()))?;
    let now = state.clock.now();
    let vote = state
        .ledger
        .cast(ProposalId::new(id), &req.voter_name, choice, now)?;
    state.metrics.votes_cast.inc();
    info!(vote = %vote.id, proposal = %vote.proposal, "vote cast");
    Ok((StatusCode::CREATED, Json(VoteResponse::from(vote))))
}

/// Handler for `GET /votes`.
pub async fn list_votes<S>(State(state): State<AppState<S>>) -> Result<impl IntoResponse, ApiError>
where
    S: LedgerStore + Clone + Send + Sync + 'static,
{
    let votes = state.ledger.list_all()?;
    let out: Vec<VoteResponse> = votes.into_iter().map(VoteResponse::from).collect();
    Ok(Json(out))
}

/// Handler for `DELETE /votes/:id`.
pub async fn revoke_vote<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError>
where
    S: LedgerStore + Clone + Send + Sync + 'static,
{
    let now = state.clock.now();
    state.ledger.revoke(VoteId::new(id), now)?;
    state.metrics.votes_revoked.inc();
    info!(vote = id, "vote revoked");
    Ok(StatusCode::NO_CONTENT)
}

// ── Metrics ──────────────────────────────────────────────────────────────

/// Handler for `GET /metrics` in the Prometheus text exposition format.
pub async fn metrics<S>(State(state): State<AppState<S>>) -> impl IntoResponse
where
    S: LedgerStore + Clone + Send + Sync + 'static,
{
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = ?e, "failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to encode metrics".to_string(),
        )
            .into_response();
    }

    (
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}
