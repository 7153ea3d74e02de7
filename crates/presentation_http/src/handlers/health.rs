//! Health check handlers

use axum::{Json, extract::State};
use fault::Fault;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub fault: FaultStatus,
}

/// Active fault injection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultStatus {
    pub enabled: bool,
    pub percent_of_requests: f64,
    pub injector: Option<String>,
}

impl From<&Fault> for FaultStatus {
    fn from(fault: &Fault) -> Self {
        Self {
            enabled: !fault.is_inert(),
            percent_of_requests: fault.percent_of_requests(),
            injector: fault.injector().map(|injector| injector.kind().to_string()),
        }
    }
}

/// Liveness check, reporting the fault injection settings
pub async fn health_check(State(fault): State<Fault>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        fault: FaultStatus::from(&fault),
    })
}

/// Plain response for the root path
pub async fn root() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use fault::{FaultOptions, Injector};

    use super::*;

    #[tokio::test]
    async fn health_check_reports_inert_fault() {
        let Json(response) = health_check(State(Fault::inert())).await;
        assert_eq!(response.status, "ok");
        assert!(!response.version.is_empty());
        assert_eq!(
            response.fault,
            FaultStatus {
                enabled: false,
                percent_of_requests: 0.0,
                injector: None,
            }
        );
    }

    #[tokio::test]
    async fn health_check_reports_active_fault() {
        let fault = Fault::new(FaultOptions::new(12.5, Injector::error(503)));
        let Json(response) = health_check(State(fault)).await;
        assert!(response.fault.enabled);
        assert!((response.fault.percent_of_requests - 12.5).abs() < f64::EPSILON);
        assert_eq!(response.fault.injector.as_deref(), Some("error"));
    }

    #[test]
    fn inert_injector_reports_disabled() {
        let fault = Fault::new(FaultOptions::new(100.0, Injector::error(1000)));
        let status = FaultStatus::from(&fault);
        assert!(!status.enabled);
        assert_eq!(status.injector.as_deref(), Some("error"));
    }

    #[test]
    fn health_response_serialization() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            fault: FaultStatus {
                enabled: true,
                percent_of_requests: 5.0,
                injector: Some("reject".to_string()),
            },
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["fault"]["injector"], "reject");
        assert_eq!(json["fault"]["percent_of_requests"], 5.0);
    }

    #[tokio::test]
    async fn root_returns_ok() {
        assert_eq!(root().await, "ok");
    }
}
