use super::{AppError, AppResult, AppState, CurrentUser, JsonResponse, GRAPH_VIZ_HTML};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use carnet_client::{CreateLinkRequest, HealthInfo, LinkKindInfo, Removed};
use carnet_core::*;
use serde::Deserialize;
use uuid::Uuid;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/entries", get(list_entries).post(create_entry))
        .route(
            "/entries/:variant/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .route("/entries/:variant/:id/links", get(entry_links))
        .route("/links", get(list_links).post(create_link))
        .route("/links/prune", post(prune_links))
        .route("/links/:id", axum::routing::delete(delete_link))
        .route("/link-kinds", get(link_kinds))
        .route("/graph", get(graph))
        .route("/graph/svg", get(graph_svg))
        .route("/graph/viz", get(graph_viz))
        .with_state(state)
}

fn entry_ref(variant: &str, id: Uuid) -> AppResult<EntryRef> {
    let variant = variant.parse::<EntryVariant>().map_err(AppError::bad_request)?;
    Ok(EntryRef::new(variant, id))
}

async fn health(State(state): State<AppState>) -> AppResult<Json<JsonResponse<HealthInfo>>> {
    let stats = state.journal.storage().stats()?;
    Ok(Json(JsonResponse::ok(HealthInfo {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        entry_count: stats.entry_count,
        link_count: stats.link_count,
        uptime_secs: state.start_time.elapsed().as_secs(),
    })))
}

#[derive(Deserialize)]
struct ListEntriesQuery {
    variant: Option<String>,
}

async fn list_entries(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListEntriesQuery>,
) -> AppResult<Json<JsonResponse<Vec<EntrySummary>>>> {
    let variant = query
        .variant
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<EntryVariant>())
        .transpose()
        .map_err(AppError::bad_request)?;
    let snapshot = state.journal.load(user)?;
    Ok(Json(JsonResponse::ok(snapshot.summaries(variant))))
}

async fn create_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<EntryBody>,
) -> AppResult<Json<JsonResponse<Entry>>> {
    let entry = state.journal.create_entry(user, body)?;
    Ok(Json(JsonResponse::ok(entry)))
}

#[derive(Deserialize)]
struct DetailQuery {
    from: Option<String>,
}

async fn get_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((variant, id)): Path<(String, Uuid)>,
    Query(query): Query<DetailQuery>,
) -> AppResult<Json<JsonResponse<EntryDetail>>> {
    let entry = entry_ref(&variant, id)?;
    let origin = match query.from.as_deref() {
        Some(from) => from.parse::<ViewOrigin>().map_err(AppError::bad_request)?,
        None => ViewOrigin::default(),
    };
    let detail = state.journal.entry_detail(user, entry, origin)?;
    Ok(Json(JsonResponse::ok(detail)))
}

async fn update_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((variant, id)): Path<(String, Uuid)>,
    Json(body): Json<EntryBody>,
) -> AppResult<Json<JsonResponse<Entry>>> {
    let entry = state.journal.update_entry(user, entry_ref(&variant, id)?, body)?;
    Ok(Json(JsonResponse::ok(entry)))
}

async fn delete_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((variant, id)): Path<(String, Uuid)>,
) -> AppResult<Json<JsonResponse<Removed>>> {
    let links_removed = state.journal.delete_entry(user, entry_ref(&variant, id)?)?;
    Ok(Json(JsonResponse::ok(Removed { links_removed })))
}

async fn entry_links(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((variant, id)): Path<(String, Uuid)>,
) -> AppResult<Json<JsonResponse<Vec<LinkedEntry>>>> {
    let links = state.journal.linked_entries(user, entry_ref(&variant, id)?)?;
    Ok(Json(JsonResponse::ok(links)))
}

async fn list_links(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<JsonResponse<Vec<SpiritualLink>>>> {
    Ok(Json(JsonResponse::ok(state.journal.list_links(user)?)))
}

async fn create_link(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateLinkRequest>,
) -> AppResult<Json<JsonResponse<SpiritualLink>>> {
    let link = state
        .journal
        .create_link(user, req.source(), req.target(), req.kind, req.description)?;
    Ok(Json(JsonResponse::ok(link)))
}

async fn delete_link(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<JsonResponse<serde_json::Value>>> {
    state.journal.delete_link(user, id)?;
    Ok(Json(JsonResponse::ok(serde_json::json!({ "deleted": id }))))
}

async fn prune_links(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<JsonResponse<Removed>>> {
    let links_removed = state.journal.prune_dangling(user)?;
    Ok(Json(JsonResponse::ok(Removed { links_removed })))
}

async fn link_kinds() -> Json<JsonResponse<Vec<LinkKindInfo>>> {
    Json(JsonResponse::ok(
        LinkKind::ALL.into_iter().map(LinkKindInfo::from).collect(),
    ))
}

#[derive(Deserialize)]
struct GraphQuery {
    width: Option<f64>,
    height: Option<f64>,
    hover: Option<String>,
}

/// Lay out the user's graph at the requested size, hovering a node if asked.
fn build_view(state: &AppState, user: UserId, query: &GraphQuery) -> AppResult<GraphView> {
    let defaults = state.default_dimensions;
    let dimensions = Dimensions::measured(
        query.width.unwrap_or(defaults.width),
        query.height.unwrap_or(defaults.height),
    );
    let mut view = state.journal.load(user)?.graph_view(dimensions);

    if let Some(hover) = query.hover.as_deref().filter(|h| !h.is_empty()) {
        let entry = hover.parse::<EntryRef>().map_err(AppError::bad_request)?;
        if !view.pointer_enter(entry) {
            tracing::debug!("Hover target {} is not on the graph", entry);
        }
    }
    Ok(view)
}

async fn graph(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<GraphQuery>,
) -> AppResult<Json<JsonResponse<GraphExport>>> {
    let view = build_view(&state, user, &query)?;
    Ok(Json(JsonResponse::ok(view.export(state.palette.as_ref()))))
}

async fn graph_svg(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<GraphQuery>,
) -> AppResult<impl IntoResponse> {
    let view = build_view(&state, user, &query)?;
    let svg = render_svg(&view, state.palette.as_ref());
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

async fn graph_viz() -> Html<&'static str> {
    Html(GRAPH_VIZ_HTML)
}
