use std::{collections::BTreeSet, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const PER_PAGE: u32 = 50;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Table {
    pub id: Uuid,
    pub section_id: Uuid,
    pub name: String,
    pub status: i64,
    pub seats: u32,
    pub accepts_reservations: bool,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Section {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub name: String,
    pub name_localized: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<Table>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub name_localized: Option<String>,
    pub reference: String,
    #[serde(rename = "type")]
    pub kind: i64,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub phone: Option<String>,
    pub opening_from: String,
    pub opening_to: String,
    pub inventory_end_of_day_time: String,
    pub receipt_header: Option<String>,
    pub receipt_footer: Option<String>,
    pub settings: Option<serde_json::Value>,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
    pub receives_online_orders: bool,
    pub accepts_reservations: bool,
    pub reservation_duration: u32,
    pub reservation_times: serde_json::Value,
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<Section>>,
}

#[derive(Serialize, Deserialize)]
pub struct Links {
    pub first: Option<String>,
    pub last: Option<String>,
    pub next: Option<String>,
    pub prev: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct Meta {
    pub current_page: u32,
    pub from: Option<u32>,
    pub path: String,
    pub per_page: u32,
    pub to: Option<u32>,
}

#[derive(Serialize, Deserialize)]
pub struct Page {
    pub data: Vec<Branch>,
    pub links: Links,
    pub meta: Meta,
}

#[derive(Deserialize)]
pub struct UpdateBranch {
    pub accepts_reservations: Option<bool>,
    pub reservation_duration: Option<u32>,
    pub table_ids: Option<BTreeSet<Uuid>>,
    pub reservation_times: Option<serde_json::Value>,
}

pub type Db = Arc<RwLock<Vec<Branch>>>;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub token: Option<String>,
}

/// App seeded with `fixtures()` and no authentication.
pub fn app() -> Router {
    app_with(fixtures(), None)
}

/// App over `branches`. When `token` is set every request must carry
/// `Authorization: Bearer <token>`.
pub fn app_with(branches: Vec<Branch>, token: Option<String>) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(branches)),
        token,
    };
    Router::new()
        .route("/branches", get(list_branches))
        .route("/branches/{id}", get(get_branch).put(update_branch))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), StatusCode> {
    let Some(token) = &state.token else {
        return Ok(());
    };
    let expected = format!("Bearer {token}");
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

/// `include[n]=...` query values.
fn includes(query: &[(String, String)]) -> BTreeSet<String> {
    query
        .iter()
        .filter(|(k, _)| k == "include" || k.starts_with("include["))
        .flat_map(|(_, v)| v.split(','))
        .map(|v| v.trim().to_string())
        .collect()
}

/// Shape a stored branch for output, dropping relations not asked for.
fn project(branch: &Branch, includes: &BTreeSet<String>) -> Branch {
    let mut out = branch.clone();
    if !includes.contains("sections") {
        out.sections = None;
    } else if !includes.contains("sections.tables") {
        if let Some(sections) = out.sections.as_mut() {
            for section in sections {
                section.tables = None;
            }
        }
    }
    out
}

async fn list_branches(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<Page>, StatusCode> {
    authorize(&state, &headers)?;
    let includes = includes(&query);
    let branches = state.db.read().await;
    let data: Vec<Branch> = branches
        .iter()
        .take(PER_PAGE as usize)
        .map(|b| project(b, &includes))
        .collect();
    let count = data.len() as u32;
    tracing::debug!(count, ?includes, "listing branches");
    Ok(Json(Page {
        data,
        links: Links {
            first: Some("/branches?page=1".to_string()),
            last: None,
            next: None,
            prev: None,
        },
        meta: Meta {
            current_page: 1,
            from: (count > 0).then_some(1),
            path: "/branches".to_string(),
            per_page: PER_PAGE,
            to: (count > 0).then_some(count),
        },
    }))
}

async fn get_branch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Branch>, StatusCode> {
    authorize(&state, &headers)?;
    let branches = state.db.read().await;
    branches
        .iter()
        .find(|b| b.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_branch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateBranch>,
) -> Result<Json<Branch>, StatusCode> {
    authorize(&state, &headers)?;
    if input.reservation_duration == Some(0) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    if let Some(times) = &input.reservation_times {
        if !(times.is_object() || times.as_array().is_some_and(|a| a.is_empty())) {
            return Err(StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    let mut branches = state.db.write().await;
    let branch = branches
        .iter_mut()
        .find(|b| b.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if let Some(accepts) = input.accepts_reservations {
        branch.accepts_reservations = accepts;
    }
    if let Some(duration) = input.reservation_duration {
        branch.reservation_duration = duration;
    }
    if let Some(times) = input.reservation_times {
        branch.reservation_times = times;
    }
    if let Some(table_ids) = input.table_ids {
        for table in branch
            .sections
            .iter_mut()
            .flatten()
            .flat_map(|s| s.tables.iter_mut().flatten())
        {
            table.accepts_reservations = table_ids.contains(&table.id);
        }
    }
    tracing::info!(%id, "branch updated");
    Ok(Json(branch.clone()))
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

const STAMP: &str = "2024-01-01 00:00:00";

pub const DOWNTOWN: Uuid = Uuid::from_u128(0x8f2a_0001);
pub const HARBOR: Uuid = Uuid::from_u128(0x8f2a_0002);
pub const AIRPORT: Uuid = Uuid::from_u128(0x8f2a_0003);

fn table(n: u128, section_id: Uuid, seats: u32, accepts: bool) -> Table {
    Table {
        id: Uuid::from_u128(0x7a00_0000 + n),
        section_id,
        name: format!("T{n}"),
        status: 1,
        seats,
        accepts_reservations: accepts,
        created_at: STAMP.to_string(),
        updated_at: STAMP.to_string(),
        deleted_at: None,
    }
}

fn section(n: u128, branch_id: Uuid, name: &str, tables: Vec<(u32, bool)>) -> Section {
    let id = Uuid::from_u128(0x5e00_0000 + n);
    Section {
        id,
        branch_id,
        name: name.to_string(),
        name_localized: None,
        created_at: STAMP.to_string(),
        updated_at: STAMP.to_string(),
        deleted_at: None,
        tables: Some(
            tables
                .into_iter()
                .enumerate()
                .map(|(i, (seats, accepts))| table(n * 100 + i as u128, id, seats, accepts))
                .collect(),
        ),
    }
}

fn branch(id: Uuid, name: &str, reference: &str, accepts: bool, sections: Vec<Section>) -> Branch {
    Branch {
        id,
        name: name.to_string(),
        name_localized: None,
        reference: reference.to_string(),
        kind: 1,
        latitude: None,
        longitude: None,
        phone: None,
        opening_from: "09:00".to_string(),
        opening_to: "23:00".to_string(),
        inventory_end_of_day_time: "00:00".to_string(),
        receipt_header: None,
        receipt_footer: None,
        settings: None,
        created_at: STAMP.to_string(),
        updated_at: STAMP.to_string(),
        deleted_at: None,
        receives_online_orders: true,
        accepts_reservations: accepts,
        reservation_duration: 60,
        reservation_times: serde_json::json!({
            "friday": [["18:00", "23:00"]],
            "saturday": [["12:00", "15:00"], ["18:00", "23:00"]]
        }),
        address: None,
        sections: Some(sections),
    }
}

/// Three branches:
/// - Downtown: accepts reservations, 2 of its 3 tables reservable.
/// - Harbor: does not accept reservations.
/// - Airport: accepts reservations, no reservable tables.
pub fn fixtures() -> Vec<Branch> {
    vec![
        branch(
            DOWNTOWN,
            "Downtown",
            "B01",
            true,
            vec![
                section(1, DOWNTOWN, "Main Hall", vec![(4, true), (2, false)]),
                section(2, DOWNTOWN, "Patio", vec![(6, true)]),
            ],
        ),
        branch(
            HARBOR,
            "Harbor",
            "B02",
            false,
            vec![section(3, HARBOR, "Terrace", vec![(4, true)])],
        ),
        branch(
            AIRPORT,
            "Airport",
            "B03",
            true,
            vec![section(4, AIRPORT, "Gate Lounge", vec![(2, false), (2, false)])],
        ),
    ]
}
