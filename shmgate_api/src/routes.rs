//! HTTP routes.
//!
//! | Method & Path | Operation |
//! |---|---|
//! | `POST /create` | create + register |
//! | `DELETE /remove/{key}/{shmid}` | remove + unregister |
//! | `GET /stat/{key}/{shmid}` | stat |
//! | `PUT /set/{key}/{shmid}` | set owner and mode |
//! | `POST /write/{key}/{shmid}` | attach, write text, detach |
//! | `GET /read/{key}/{shmid}` | stat, attach, read text, detach |
//!
//! Pairs unknown to the registry are adopted from the OS on first use.
//! Segment calls block on entry locks, so they run on the blocking pool.

use crate::error::{ApiError, ApiResult};
use crate::payload::{
    CreateRequest, CreateResponse, DoneResponse, ReadResponse, SetRequest, StatResponse,
    WriteRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use shmgate_segment::{CreateFlags, IpcKey, SegmentRegistry, ShmId, ShmResult};
use std::sync::Arc;
use tracing::debug;

/// Shared state of every handler.
pub type AppState = Arc<SegmentRegistry>;

/// Build the gateway router over `registry`.
pub fn router(registry: AppState) -> Router {
    Router::new()
        .route("/create", post(create))
        .route("/remove/{key}/{shmid}", delete(remove))
        .route("/stat/{key}/{shmid}", get(stat))
        .route("/set/{key}/{shmid}", put(set))
        .route("/write/{key}/{shmid}", post(write))
        .route("/read/{key}/{shmid}", get(read))
        .with_state(registry)
}

fn parse_pair(key: &str, shmid: &str) -> ApiResult<(IpcKey, ShmId)> {
    let key = key.parse().map_err(|_| ApiError::Path {
        name: "key",
        value: key.to_string(),
    })?;
    let id = shmid.parse().map(ShmId::new).map_err(|_| ApiError::Path {
        name: "shmid",
        value: shmid.to_string(),
    })?;
    Ok((key, id))
}

async fn blocking<T, F>(registry: &AppState, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&SegmentRegistry) -> ShmResult<T> + Send + 'static,
{
    let registry = registry.clone();
    Ok(tokio::task::spawn_blocking(move || f(&registry)).await??)
}

async fn create(
    State(registry): State<AppState>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> ApiResult<Json<CreateResponse>> {
    let Json(request) = payload?;
    let mode = request.mode.to_mode()?;
    let (key, size) = (request.shm_key, request.shm_segsz);
    debug!("create key={} size={} mode={}", key, size, mode);

    let id = blocking(&registry, move |r| {
        r.create(key, size, CreateFlags::CREATE, mode)
    })
    .await?;

    Ok(Json(CreateResponse {
        shm_key: key.to_string(),
        shm_shmid: id.to_string(),
    }))
}

async fn remove(
    State(registry): State<AppState>,
    Path((key, shmid)): Path<(String, String)>,
) -> ApiResult<Json<DoneResponse>> {
    let (key, id) = parse_pair(&key, &shmid)?;
    blocking(&registry, move |r| r.remove(key, id)).await?;
    Ok(Json(DoneResponse::done()))
}

async fn stat(
    State(registry): State<AppState>,
    Path((key, shmid)): Path<(String, String)>,
) -> ApiResult<Json<StatResponse>> {
    let (key, id) = parse_pair(&key, &shmid)?;
    let meta = blocking(&registry, move |r| r.with_segment(key, id, |h| h.stat())).await?;
    Ok(Json(StatResponse::new(key, id, &meta)))
}

async fn set(
    State(registry): State<AppState>,
    Path((key, shmid)): Path<(String, String)>,
    payload: Result<Json<SetRequest>, JsonRejection>,
) -> ApiResult<Json<DoneResponse>> {
    let (key, id) = parse_pair(&key, &shmid)?;
    let Json(request) = payload?;
    let mode = request.mode.to_mode()?;
    let (uid, gid) = (request.uid, request.gid);

    blocking(&registry, move |r| {
        r.with_segment(key, id, |h| h.set(uid, gid, mode))
    })
    .await?;
    Ok(Json(DoneResponse::done()))
}

async fn write(
    State(registry): State<AppState>,
    Path((key, shmid)): Path<(String, String)>,
    payload: Result<Json<WriteRequest>, JsonRejection>,
) -> ApiResult<Json<DoneResponse>> {
    let (key, id) = parse_pair(&key, &shmid)?;
    let Json(request) = payload?;

    blocking(&registry, move |r| {
        r.with_segment(key, id, |h| h.with_attachment(|h| h.write_text(&request.data)))
    })
    .await?;
    Ok(Json(DoneResponse::done()))
}

async fn read(
    State(registry): State<AppState>,
    Path((key, shmid)): Path<(String, String)>,
) -> ApiResult<Json<ReadResponse>> {
    let (key, id) = parse_pair(&key, &shmid)?;

    let data = blocking(&registry, move |r| {
        r.with_segment(key, id, |h| {
            let size = h.stat()?.size_bytes;
            h.with_attachment(|h| h.read_text(size))
        })
    })
    .await?;
    Ok(Json(ReadResponse { data }))
}
