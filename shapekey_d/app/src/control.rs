//! HTTP control surface: group editing, selection, calibration, peer sync
//! and config import/export.

use anyhow::Result;
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use common::{
    AppConfig, Axis, AxisMapping, ConfigStore, EyeSide, RadiusBound, Readout, Session,
};
use log::{info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::net::TcpListener;

use crate::peer_sync::fetch_groups;
use crate::shared::{read_lock, write_lock};

#[derive(Clone)]
pub struct ControlState {
    pub session: Arc<RwLock<Session>>,
    pub readout: Arc<RwLock<Readout>>,
    pub store: Arc<ConfigStore>,
}

pub fn get_router(state: ControlState) -> Router {
    Router::new()
        .route("/groups", get(list_groups_handler).post(add_group_handler))
        .route("/groups/fetch", post(fetch_groups_handler))
        .route(
            "/groups/:name",
            axum::routing::delete(remove_group_handler),
        )
        .route("/groups/:name/:axis", put(set_axis_handler))
        .route("/groups/:name/:axis/preset", post(preset_handler))
        .route("/select", post(select_handler))
        .route("/status", get(status_handler))
        .route("/calibrate", post(calibrate_handler))
        .route("/config", get(get_config_handler).put(put_config_handler))
        .route("/config/save", post(save_config_handler))
        .with_state(state)
}

pub struct ControlHost;

impl ControlHost {
    pub async fn start(requested_port: u16, app_router: Router) -> Result<()> {
        // Bind to Port (0 for dynamic)
        let addr = SocketAddr::from(([0, 0, 0, 0], requested_port));
        let listener = TcpListener::bind(addr).await?;
        info!("Control surface listening on http://{}", listener.local_addr()?);

        axum::serve(listener, app_router).await?;
        Ok(())
    }
}

fn not_found(name: &str) -> Json<Value> {
    Json(json!({
        "status": "not_found",
        "message": format!("No group named '{}'", name)
    }))
}

pub async fn list_groups_handler(State(state): State<ControlState>) -> Json<Value> {
    let session = read_lock(&state.session);
    Json(json!({
        "status": "ok",
        "selected": session.selected(),
        "groups": session.groups()
    }))
}

#[derive(Debug, Deserialize)]
pub struct GroupNamePayload {
    pub name: String,
}

pub async fn add_group_handler(
    State(state): State<ControlState>,
    Json(payload): Json<GroupNamePayload>,
) -> Json<Value> {
    let added = write_lock(&state.session).add_group(&payload.name);
    if added {
        info!("Added group '{}'", payload.name.trim());
        Json(json!({ "status": "ok", "name": payload.name.trim() }))
    } else {
        Json(json!({
            "status": "error",
            "message": "Group name is empty or already exists"
        }))
    }
}

pub async fn remove_group_handler(
    State(state): State<ControlState>,
    Path(name): Path<String>,
) -> Json<Value> {
    if write_lock(&state.session).remove_group(&name) {
        info!("Removed group '{}'", name);
        Json(json!({ "status": "ok" }))
    } else {
        not_found(&name)
    }
}

pub async fn set_axis_handler(
    State(state): State<ControlState>,
    Path((name, axis)): Path<(String, Axis)>,
    Json(mapping): Json<AxisMapping>,
) -> Json<Value> {
    if write_lock(&state.session).set_axis(&name, axis, mapping.clone()) {
        Json(json!({ "status": "ok", "mapping": mapping }))
    } else {
        not_found(&name)
    }
}

#[derive(Debug, Deserialize)]
pub struct PresetPayload {
    pub eye: EyeSide,
}

pub async fn preset_handler(
    State(state): State<ControlState>,
    Path((name, axis)): Path<(String, Axis)>,
    Json(payload): Json<PresetPayload>,
) -> Json<Value> {
    match write_lock(&state.session).apply_iris_preset(&name, axis, payload.eye) {
        Some(mapping) => Json(json!({ "status": "ok", "mapping": mapping })),
        None => not_found(&name),
    }
}

pub async fn select_handler(
    State(state): State<ControlState>,
    Json(payload): Json<GroupNamePayload>,
) -> Json<Value> {
    if write_lock(&state.session).select(&payload.name) {
        Json(json!({ "status": "ok", "selected": payload.name }))
    } else {
        not_found(&payload.name)
    }
}

pub async fn status_handler(State(state): State<ControlState>) -> Json<Value> {
    let readout = read_lock(&state.readout).clone();
    Json(json!({
        "status": "ok",
        "readout": readout
    }))
}

#[derive(Debug, Deserialize)]
pub struct CalibratePayload {
    pub axis: Axis,
    pub which: RadiusBound,
}

pub async fn calibrate_handler(
    State(state): State<ControlState>,
    Json(payload): Json<CalibratePayload>,
) -> Json<Value> {
    // Copy the readout first so the frame loop's lock is held only briefly.
    let readout = read_lock(&state.readout).clone();
    let written = write_lock(&state.session).calibrate(&readout, payload.axis, payload.which);

    match written {
        Some(value) => {
            info!("Calibrated {} {:?} = {:.4}", payload.axis, payload.which, value);
            Json(json!({ "status": "ok", "value": value }))
        }
        None => Json(json!({
            "status": "unchanged",
            "message": "No raw value observed for the selected group"
        })),
    }
}

pub async fn fetch_groups_handler(State(state): State<ControlState>) -> Json<Value> {
    let (target, wait) = {
        let session = read_lock(&state.session);
        (
            session.config.target_address(),
            Duration::from_millis(session.config.peer_timeout_ms),
        )
    };

    match fetch_groups(&target, wait).await {
        Ok(groups) => {
            let report = write_lock(&state.session).reconcile(&groups);
            Json(json!({
                "status": "ok",
                "fetched": groups.len(),
                "added": report.added,
                "removed": report.removed
            }))
        }
        Err(e) => {
            warn!("Group fetch failed: {}", e);
            Json(json!({ "status": "error", "message": e.to_string() }))
        }
    }
}

pub async fn get_config_handler(State(state): State<ControlState>) -> Json<Value> {
    let config = read_lock(&state.session).config.clone();
    Json(json!({ "status": "ok", "config": config }))
}

pub async fn put_config_handler(
    State(state): State<ControlState>,
    Json(config): Json<AppConfig>,
) -> Json<Value> {
    let count = config.groups.len();
    write_lock(&state.session).replace_groups(config.groups);
    info!("Imported {} group(s)", count);
    Json(json!({ "status": "ok", "groups": count }))
}

pub async fn save_config_handler(State(state): State<ControlState>) -> Json<Value> {
    let config = read_lock(&state.session).config.clone();
    match state.store.save(&config) {
        Ok(()) => Json(json!({ "status": "ok", "path": state.store.path() })),
        Err(e) => Json(json!({ "status": "error", "message": format!("{:#}", e) })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::AxisPair;
    use common::AxisMode;

    fn state() -> ControlState {
        ControlState {
            session: Arc::new(RwLock::new(Session::default())),
            readout: Arc::new(RwLock::new(Readout::default())),
            store: Arc::new(ConfigStore::in_dir(&std::env::temp_dir().join("shapekey_control_test"))),
        }
    }

    fn name(n: &str) -> Json<GroupNamePayload> {
        Json(GroupNamePayload { name: n.to_string() })
    }

    #[tokio::test]
    async fn add_select_and_remove() {
        let state = state();
        let Json(res) = add_group_handler(State(state.clone()), name("Jaw")).await;
        assert_eq!(res["status"], "ok");
        let Json(res) = add_group_handler(State(state.clone()), name("Jaw")).await;
        assert_eq!(res["status"], "error");

        let Json(res) = select_handler(State(state.clone()), name("Nope")).await;
        assert_eq!(res["status"], "not_found");

        let Json(res) = list_groups_handler(State(state.clone())).await;
        assert_eq!(res["selected"], "Jaw");
        assert!(res["groups"]["Jaw"].is_object());

        let Json(res) = remove_group_handler(State(state.clone()), Path("Jaw".to_string())).await;
        assert_eq!(res["status"], "ok");
        assert!(state.session.read().unwrap().groups().is_empty());
    }

    #[tokio::test]
    async fn preset_then_calibrate() {
        let state = state();
        add_group_handler(State(state.clone()), name("Gaze")).await;

        let Json(res) = preset_handler(
            State(state.clone()),
            Path(("Gaze".to_string(), Axis::X)),
            Json(PresetPayload { eye: EyeSide::Right }),
        )
        .await;
        assert_eq!(res["status"], "ok");
        assert_eq!(res["mapping"]["mode"], "iris");

        let Json(res) = calibrate_handler(
            State(state.clone()),
            Json(CalibratePayload { axis: Axis::X, which: RadiusBound::Max }),
        )
        .await;
        assert_eq!(res["status"], "unchanged");

        state
            .readout
            .write()
            .unwrap()
            .last_raw
            .insert("Gaze".to_string(), AxisPair { x: -0.25, y: 0.0 });
        let Json(res) = calibrate_handler(
            State(state.clone()),
            Json(CalibratePayload { axis: Axis::X, which: RadiusBound::Max }),
        )
        .await;
        assert_eq!(res["status"], "ok");

        let session = state.session.read().unwrap();
        let x = &session.groups().get("Gaze").unwrap().x;
        assert_eq!(x.mode, AxisMode::Iris);
        assert_eq!(x.radius_max, 0.25);
    }

    #[tokio::test]
    async fn config_import_replaces_groups() {
        let state = state();
        add_group_handler(State(state.clone()), name("Old")).await;

        let config: AppConfig =
            serde_json::from_str(r#"{ "groups": { "New": { "x": { "mode": "2pt", "point_a": 1, "point_b": 2 } } } }"#)
                .unwrap();
        let Json(res) = put_config_handler(State(state.clone()), Json(config)).await;
        assert_eq!(res["groups"], 1);

        let session = state.session.read().unwrap();
        assert!(!session.groups().contains("Old"));
        assert_eq!(session.selected(), Some("New"));
    }
}
