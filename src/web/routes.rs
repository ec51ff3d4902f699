use axum::{
    routing::{get, post, MethodRouter},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use crate::redfish::resources::{
    CHASSIS, CHASSIS_COLLECTION, MANAGER, MANAGERS, SERVICE_ROOT, SYSTEM, SYSTEMS, SYSTEM_RESET,
};
use crate::state::AppState;

/// Register `path` both with and without a trailing slash
fn resource(
    router: Router<Arc<AppState>>,
    path: &str,
    method_router: MethodRouter<Arc<AppState>>,
) -> Router<Arc<AppState>> {
    router
        .route(path, method_router.clone())
        .route(&format!("{}/", path), method_router)
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new();
    router = resource(router, SERVICE_ROOT, get(handlers::service_root));
    // Systems
    router = resource(router, SYSTEMS, get(handlers::list_systems));
    router = resource(
        router,
        SYSTEM,
        get(handlers::get_system).patch(handlers::patch_system),
    );
    router = resource(router, SYSTEM_RESET, post(handlers::reset_system));
    // Managers
    router = resource(router, MANAGERS, get(handlers::list_managers));
    router = resource(router, MANAGER, get(handlers::get_manager));
    // Chassis
    router = resource(router, CHASSIS_COLLECTION, get(handlers::list_chassis));
    router = resource(router, CHASSIS, get(handlers::get_chassis));

    router
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atx::{fixture_controller, HardwareVariant};
    use crate::redfish::BootStore;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use tokio::sync::broadcast;
    use tower::ServiceExt;

    struct TestApp {
        _dir: TempDir,
        state: Arc<AppState>,
    }

    impl TestApp {
        fn new(variant: HardwareVariant) -> Self {
            let dir = TempDir::new().unwrap();
            let atx = fixture_controller(dir.path(), variant);
            let (shutdown_tx, _) = broadcast::channel(1);
            let state = AppState::new(atx, BootStore::new(), shutdown_tx);
            Self { _dir: dir, state }
        }

        fn router(&self) -> Router {
            create_router(self.state.clone())
        }

        fn power_led(&self) -> PathBuf {
            self.state.atx.profile().power_led.path().unwrap().to_path_buf()
        }

        fn power(&self) -> PathBuf {
            self.state.atx.profile().power.path().unwrap().to_path_buf()
        }

        fn reset(&self) -> PathBuf {
            self.state.atx.profile().reset.path().unwrap().to_path_buf()
        }

        async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.send(Method::GET, uri, None).await
        }

        async fn send(&self, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
            let mut request = Request::builder().method(method).uri(uri);
            if body.is_some() {
                request = request.header("Content-Type", "application/json");
            }
            let request = request
                .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
                .unwrap();

            let response = self.router().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, json)
        }
    }

    fn write(path: &Path, value: &str) {
        std::fs::write(path, value).unwrap();
    }

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[tokio::test]
    async fn test_service_root() {
        let app = TestApp::new(HardwareVariant::Alpha);

        let (status, json) = app.get("/redfish/v1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["@odata.type"], "#ServiceRoot.v1_5_0.ServiceRoot");
        assert_eq!(json["Systems"]["@odata.id"], "/redfish/v1/Systems");

        let (status, _) = app.get("/redfish/v1/").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_collections() {
        let app = TestApp::new(HardwareVariant::Beta);

        let (status, json) = app.get("/redfish/v1/Systems").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["Members"][0]["@odata.id"], "/redfish/v1/Systems/System.1");

        let (_, json) = app.get("/redfish/v1/Managers/").await;
        assert_eq!(json["Members"][0]["@odata.id"], "/redfish/v1/Managers/BMC");

        let (_, json) = app.get("/redfish/v1/Chassis").await;
        assert_eq!(json["Members"][0]["@odata.id"], "/redfish/v1/Chassis/System");
    }

    #[tokio::test]
    async fn test_get_system_reports_power_state() {
        let app = TestApp::new(HardwareVariant::Alpha);

        write(&app.power_led(), "1\n");
        let (status, json) = app.get("/redfish/v1/Systems/System.1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["PowerState"], "Off");
        assert_eq!(json["Boot"]["BootSourceOverrideTarget"], "None");

        write(&app.power_led(), "0\n");
        let (_, json) = app.get("/redfish/v1/Systems/System.1").await;
        assert_eq!(json["PowerState"], "On");
    }

    #[tokio::test]
    async fn test_get_system_fails_on_unreadable_led() {
        let app = TestApp::new(HardwareVariant::Pcie);
        write(&app.power_led(), "xyz");

        let (status, json) = app.get("/redfish/v1/Systems/System.1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], "Base.1.0.GeneralError");
    }

    #[tokio::test]
    async fn test_patch_boot_target() {
        let app = TestApp::new(HardwareVariant::Alpha);

        let (status, _) = app
            .send(
                Method::PATCH,
                "/redfish/v1/Systems/System.1",
                Some(r#"{"Boot": {"BootSourceOverrideTarget": "Pxe"}}"#),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, json) = app.get("/redfish/v1/Systems/System.1").await;
        assert_eq!(json["Boot"]["BootSourceOverrideTarget"], "Pxe");
        assert_eq!(json["Boot"]["BootSourceOverrideEnabled"], "Disabled");
        assert_eq!(json["Boot"]["BootSourceOverrideMode"], "UEFI");
    }

    #[tokio::test]
    async fn test_patch_invalid_target_is_rejected() {
        let app = TestApp::new(HardwareVariant::Alpha);

        let (status, json) = app
            .send(
                Method::PATCH,
                "/redfish/v1/Systems/System.1",
                Some(r#"{"Boot": {"BootSourceOverrideEnabled": "Once", "BootSourceOverrideTarget": "Bogus"}}"#),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "Base.1.0.PropertyValueNotInList");

        let boot = app.state.boot.get();
        assert_eq!(boot.enabled, "Disabled");
        assert_eq!(boot.target, "None");
    }

    #[tokio::test]
    async fn test_patch_malformed_json() {
        let app = TestApp::new(HardwareVariant::Alpha);

        let (status, _) = app
            .send(Method::PATCH, "/redfish/v1/Systems/System.1", Some("{not json"))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send(Method::PATCH, "/redfish/v1/Systems/System.1", Some("{}"))
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_reset_unknown_type_writes_nothing() {
        let app = TestApp::new(HardwareVariant::Alpha);
        write(&app.power(), "untouched");
        write(&app.reset(), "untouched");

        let (status, json) = app
            .send(
                Method::POST,
                "/redfish/v1/Systems/System.1/Actions/ComputerSystem.Reset",
                Some(r#"{"ResetType": "Sleep"}"#),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["message"], "Invalid ResetType: Sleep");

        let (status, _) = app
            .send(
                Method::POST,
                "/redfish/v1/Systems/System.1/Actions/ComputerSystem.Reset",
                Some("{}"),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(read(&app.power()), "untouched");
        assert_eq!(read(&app.reset()), "untouched");
    }

    #[tokio::test]
    async fn test_reset_on_when_already_on() {
        let app = TestApp::new(HardwareVariant::Beta);
        write(&app.power_led(), "0");
        write(&app.power(), "untouched");

        let (status, _) = app
            .send(
                Method::POST,
                "/redfish/v1/Systems/System.1/Actions/ComputerSystem.Reset",
                Some(r#"{"ResetType": "On"}"#),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(read(&app.power()), "untouched");
    }

    #[tokio::test]
    async fn test_force_restart() {
        let app = TestApp::new(HardwareVariant::Alpha);
        write(&app.power_led(), "1");
        write(&app.reset(), "1");

        let (status, _) = app
            .send(
                Method::POST,
                "/redfish/v1/Systems/System.1/Actions/ComputerSystem.Reset",
                Some(r#"{"ResetType": "ForceRestart"}"#),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(read(&app.reset()), "0");
        assert_eq!(read(&app.power_led()), "1");
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let app = TestApp::new(HardwareVariant::Alpha);

        let (status, _) = app
            .get("/redfish/v1/Systems/System.1/Actions/ComputerSystem.Reset")
            .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, _) = app.send(Method::POST, "/redfish/v1", Some("{}")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let app = TestApp::new(HardwareVariant::Alpha);

        let (status, json) = app.get("/redfish/v1/Systems/System.2").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "Base.1.0.ResourceMissingAtURI");
    }

    #[tokio::test]
    async fn test_manager_and_chassis() {
        let app = TestApp::new(HardwareVariant::Alpha);

        let (status, json) = app.get("/redfish/v1/Managers/BMC").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ManagerType"], "BMC");
        assert_eq!(json["Status"], json!({"State": "Enabled", "Health": "OK"}));

        let (status, json) = app.get("/redfish/v1/Chassis/System").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["Oem"]["NanoKVM"]["HardwareVersion"], "alpha");
        assert_eq!(json["Oem"]["NanoKVM"]["DiskActivity"], false);

        let app = TestApp::new(HardwareVariant::Beta);
        let (_, json) = app.get("/redfish/v1/Chassis/System").await;
        assert!(json["Oem"]["NanoKVM"].get("DiskActivity").is_none());
    }
}
