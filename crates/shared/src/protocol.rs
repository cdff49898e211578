use serde::{Deserialize, Serialize};

pub const TRIAGE_PATH: &str = "/triage";
pub const HEALTH_PATH: &str = "/health";

/// Body of `POST /triage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageRequest {
    pub message: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triage_request_wire_shape() {
        let request = TriageRequest {
            message: "My landlord kept my deposit".into(),
        };
        assert_eq!(
            serde_json::to_value(&request).expect("encode"),
            serde_json::json!({ "message": "My landlord kept my deposit" })
        );
    }
}
