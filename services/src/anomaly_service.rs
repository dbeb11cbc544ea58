//! Client for the external anomaly-detection service.
//!
//! The service is a black box: it receives a filter, reads attendance data
//! on its own, and answers with one verdict per record. This module only
//! builds the request, classifies failures, and turns the verdicts marked
//! as anomalies into display cards.

use chrono::{DateTime, Local};
use common::config::AppConfig;
use db::models::Role;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::context::SessionContext;
use crate::error::AppError;

pub const DETECT_PATH: &str = "/detect-anomalies";
pub const HEALTH_PATH: &str = "/health";

pub const NO_ANOMALIES_MESSAGE: &str = "No anomalies detected. All records look normal.";

/// Filter sent to `POST /detect-anomalies`. `None` fields go out as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionRequest {
    pub session_id: Option<String>,
    pub student_id: Option<String>,
    pub limit: u32,
}

/// Body of a detection answer. When the service finds no data it omits
/// `anomaly_rate` and `results`.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub anomaly_count: u64,
    #[serde(default)]
    pub anomaly_rate: Option<String>,
    #[serde(default)]
    pub results: Vec<ScoredRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoredRecord {
    pub record: ScannedRecord,
    pub anomaly: Verdict,
}

/// Attendance record as echoed back by the service. Every field is optional
/// because the service passes through whatever it found in storage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedRecord {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub lecture: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Verdict {
    pub is_anomaly: bool,
    #[serde(default)]
    pub anomaly_type: String,
    #[serde(default)]
    pub anomaly_score: f64,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub reason: String,
}

/// Severity bucket. Anything the service sends besides `low`, `medium` and
/// `high` is shown as medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl From<String> for Severity {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "low" => Severity::Low,
            "high" => Severity::High,
            _ => Severity::Medium,
        }
    }
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One flagged record, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyCard {
    /// 1-based position among the flagged records.
    pub index: usize,
    pub severity: Severity,
    pub student: String,
    pub lecture: String,
    pub recorded_at: String,
    pub anomaly_type: String,
    pub score: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyReport {
    pub total_records: u64,
    pub anomaly_count: u64,
    pub anomaly_rate: String,
    pub cards: Vec<AnomalyCard>,
}

fn format_recorded_at(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|ts| {
                ts.with_timezone(&Local)
                    .format("%d.%m.%Y %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|_| raw.to_owned()),
        None => "-".to_owned(),
    }
}

impl AnomalyCard {
    fn new(index: usize, scored: ScoredRecord) -> Self {
        let ScoredRecord { record, anomaly } = scored;
        Self {
            index,
            severity: anomaly.severity,
            student: record
                .student_name
                .filter(|n| !n.is_empty())
                .or(record.student_id)
                .unwrap_or_else(|| "-".to_owned()),
            lecture: record
                .lecture
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| "Unknown".to_owned()),
            recorded_at: format_recorded_at(record.timestamp.as_deref()),
            anomaly_type: anomaly.anomaly_type,
            score: format!("{:.1}%", anomaly.anomaly_score * 100.0),
            reason: anomaly.reason,
        }
    }
}

impl AnomalyReport {
    pub fn from_response(response: DetectionResponse) -> Self {
        let anomaly_rate = response.anomaly_rate.unwrap_or_else(|| {
            if response.total_records == 0 {
                "0.00%".to_owned()
            } else {
                format!(
                    "{:.2}%",
                    response.anomaly_count as f64 / response.total_records as f64 * 100.0
                )
            }
        });

        let cards = response
            .results
            .into_iter()
            .filter(|r| r.anomaly.is_anomaly)
            .enumerate()
            .map(|(i, scored)| AnomalyCard::new(i + 1, scored))
            .collect();

        Self {
            total_records: response.total_records,
            anomaly_count: response.anomaly_count,
            anomaly_rate,
            cards,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.cards.is_empty()
    }
}

pub struct AnomalyService {
    base_url: String,
    limit: u32,
    client: Client,
}

impl AnomalyService {
    pub fn new(base_url: impl Into<String>, limit: u32) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            limit,
            client: Client::new(),
        }
    }

    /// Client for `ANOMALY_SERVICE_URL` with `DETECTION_LIMIT` records per
    /// request.
    pub fn from_config() -> Self {
        let cfg = AppConfig::global();
        Self::new(cfg.anomaly_service_url.clone(), cfg.detection_limit)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn unreachable(&self, err: reqwest::Error) -> AppError {
        tracing::warn!(url = %self.base_url, error = %err, "anomaly service request failed");
        AppError::ServiceUnreachable {
            url: self.base_url.clone(),
        }
    }

    /// Asks the service to score attendance records, optionally narrowed to
    /// one session.
    ///
    /// Teachers only; the role check happens before any request is sent. A
    /// blank `session_id` means "all sessions".
    pub async fn detect_anomalies(
        &self,
        ctx: &SessionContext,
        session_id: Option<&str>,
    ) -> Result<AnomalyReport, AppError> {
        ctx.require_role(Role::Teacher, "run anomaly detection")?;

        let request = DetectionRequest {
            session_id: session_id
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            student_id: None,
            limit: self.limit,
        };
        tracing::debug!(?request, "requesting anomaly detection");

        let response = self
            .client
            .post(format!("{}{}", self.base_url, DETECT_PATH))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ServiceError {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_owned(),
            });
        }

        let body = response.text().await.map_err(|e| self.unreachable(e))?;
        let parsed: DetectionResponse =
            serde_json::from_str(&body).map_err(|e| AppError::InvalidResponse(e.to_string()))?;

        let report = AnomalyReport::from_response(parsed);
        tracing::info!(
            total = report.total_records,
            anomalies = report.anomaly_count,
            "anomaly detection finished"
        );
        Ok(report)
    }

    /// Liveness probe against `GET /health`.
    pub async fn health(&self) -> Result<ServiceHealth, AppError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, HEALTH_PATH))
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ServiceError {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_owned(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::InvalidResponse(e.to_string()))
    }
}
