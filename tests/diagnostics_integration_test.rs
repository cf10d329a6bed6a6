use booking_diag::config::defaults::{RelationshipExpectation, TableExpectation};
use booking_diag::{
    ConfigDefaults, DiagnosticStage, DiagnosticsConfig, Overrides, RestDiagnosticsRunner,
    RunOutcome,
};
use httpmock::prelude::*;
use serde_json::json;

const API_KEY: &str = "test-anon-key";

fn config_for(endpoint: &str) -> DiagnosticsConfig {
    let defaults = ConfigDefaults {
        endpoint: endpoint.to_string(),
        api_key: API_KEY.to_string(),
        probe_table: "profiles".to_string(),
        timeout_seconds: 5,
        tables: vec![
            TableExpectation::new("profiles", &["id", "full_name"]),
            TableExpectation::new("doctors", &["id", "specialty"]),
        ],
        relationships: vec![RelationshipExpectation::new("appointments", "doctors")],
        remediation: vec![
            "Check the anon key".to_string(),
            "Check the project is running".to_string(),
        ],
    };
    // 不讀取真實環境變數
    DiagnosticsConfig::resolve_with_env(&Overrides::default(), defaults, |_| None).unwrap()
}

#[tokio::test]
async fn test_healthy_backend_passes_all_stages() {
    let server = MockServer::start();

    let count_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/profiles")
            .query_param("select", "count")
            .header("apikey", API_KEY);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([{"count": 2}]));
    });
    let profiles_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/profiles")
            .query_param("select", "id,full_name")
            .query_param("limit", "0");
        then.status(200).json_body(json!([]));
    });
    let doctors_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/doctors")
            .query_param("select", "id,specialty")
            .query_param("limit", "0");
        then.status(200).json_body(json!([]));
    });
    let embed_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/appointments")
            .query_param("select", "id,doctors(id)")
            .query_param("limit", "0");
        then.status(200).json_body(json!([]));
    });

    let runner = RestDiagnosticsRunner::from_config(&config_for(&server.base_url())).unwrap();
    let report = runner.run().await;

    count_mock.assert();
    profiles_mock.assert();
    doctors_mock.assert();
    embed_mock.assert();

    assert_eq!(report.outcome, RunOutcome::Passed);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(
        report.stage_outcomes(),
        vec![
            (DiagnosticStage::Connectivity, true),
            (DiagnosticStage::StructuralCheck, true),
            (DiagnosticStage::RelationshipCheck, true),
        ]
    );
    assert!(report.results[0].message.contains("2 rows"));
    assert_eq!(report.results[1].findings.len(), 2);
}

#[tokio::test]
async fn test_invalid_api_key_skips_collaborators() {
    let server = MockServer::start();

    let count_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/profiles")
            .query_param("select", "count");
        then.status(401).json_body(json!({
            "message": "Invalid API key",
            "hint": "Double check your Supabase `anon` or `service_role` API key."
        }));
    });
    let structure_mock = server.mock(|when, then| {
        when.method(GET).query_param("limit", "0");
        then.status(200).json_body(json!([]));
    });

    let runner = RestDiagnosticsRunner::from_config(&config_for(&server.base_url())).unwrap();
    let report = runner.run().await;

    count_mock.assert();
    assert_eq!(structure_mock.hits(), 0);

    assert_eq!(report.outcome, RunOutcome::ConnectivityFailed);
    assert_eq!(report.exit_code(), 1);
    assert_eq!(report.results.len(), 1);

    let detail = report.results[0].detail.as_ref().unwrap();
    assert_eq!(detail.kind, "http_401");
    assert_eq!(detail.message, "Invalid API key");
    assert_eq!(report.remediation.len(), 2);
}

#[tokio::test]
async fn test_unreachable_backend_is_connectivity_failure() {
    // 沒有服務監聽的埠
    let config = config_for("http://127.0.0.1:9");
    let runner = RestDiagnosticsRunner::from_config(&config).unwrap();

    let report = runner.run().await;

    assert_eq!(report.outcome, RunOutcome::ConnectivityFailed);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].detail.as_ref().unwrap().kind, "transport");
}

#[tokio::test]
async fn test_missing_table_reports_failure_but_runs_relationships() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/profiles")
            .query_param("select", "count");
        then.status(200).json_body(json!([{"count": 0}]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/profiles")
            .query_param("limit", "0");
        then.status(200).json_body(json!([]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/doctors");
        then.status(404).json_body(json!({
            "code": "PGRST205",
            "message": "Could not find the table 'public.doctors' in the schema cache"
        }));
    });
    let embed_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/appointments")
            .query_param("select", "id,doctors(id)");
        then.status(400).json_body(json!({
            "code": "PGRST200",
            "message": "Could not find a relationship between 'appointments' and 'doctors'"
        }));
    });

    let runner = RestDiagnosticsRunner::from_config(&config_for(&server.base_url())).unwrap();
    let report = runner.run().await;

    embed_mock.assert();
    assert_eq!(report.outcome, RunOutcome::ChecksFailed);
    assert_eq!(report.exit_code(), 3);

    let structural = report.result_for(DiagnosticStage::StructuralCheck).unwrap();
    assert!(!structural.success);
    let doctors = structural
        .findings
        .iter()
        .find(|f| f.subject == "doctors")
        .unwrap();
    assert!(!doctors.ok);
    assert!(doctors.message.contains("schema cache"));

    let relationship = report.result_for(DiagnosticStage::RelationshipCheck).unwrap();
    assert!(!relationship.success);
    assert_eq!(relationship.findings[0].subject, "appointments -> doctors");
}

#[tokio::test]
async fn test_broken_collaborator_response_aborts_run() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/profiles")
            .query_param("select", "count");
        then.status(200).json_body(json!([{"count": 1}]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/profiles")
            .query_param("limit", "0");
        then.status(200).body("<html>gateway says hi</html>");
    });
    let embed_mock = server.mock(|when, then| {
        when.method(GET).path("/rest/v1/appointments");
        then.status(200).json_body(json!([]));
    });

    let runner = RestDiagnosticsRunner::from_config(&config_for(&server.base_url())).unwrap();
    let report = runner.run().await;

    assert_eq!(report.outcome, RunOutcome::Aborted);
    assert_eq!(report.exit_code(), 2);
    assert_eq!(report.results.len(), 1);
    assert!(report.error.as_deref().unwrap().contains("structure diagnostics"));
    assert_eq!(report.aborted_stage, Some(DiagnosticStage::StructuralCheck));
    assert_eq!(embed_mock.hits(), 0);
}

#[tokio::test]
async fn test_repeated_runs_produce_same_outcomes() {
    let server = MockServer::start();

    let count_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/profiles")
            .query_param("select", "count");
        then.status(200).json_body(json!([{"count": 5}]));
    });
    server.mock(|when, then| {
        when.method(GET).query_param("limit", "0");
        then.status(200).json_body(json!([]));
    });

    let runner = RestDiagnosticsRunner::from_config(&config_for(&server.base_url())).unwrap();
    let first = runner.run().await;
    let second = runner.run().await;

    assert_eq!(count_mock.hits(), 2);
    assert_eq!(first.outcome, RunOutcome::Passed);
    assert_eq!(first.stage_outcomes(), second.stage_outcomes());
    assert_eq!(first.outcome, second.outcome);
}

#[tokio::test]
async fn test_unreadable_connectivity_response_is_not_transport_failure() {
    let server = MockServer::start();

    let count_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/profiles")
            .query_param("select", "count");
        then.status(200).body("<html>captive portal</html>");
    });
    let structure_mock = server.mock(|when, then| {
        when.method(GET).query_param("limit", "0");
        then.status(200).json_body(json!([]));
    });

    let runner = RestDiagnosticsRunner::from_config(&config_for(&server.base_url())).unwrap();
    let report = runner.run().await;

    count_mock.assert();
    assert_eq!(structure_mock.hits(), 0);
    assert_eq!(report.outcome, RunOutcome::ConnectivityFailed);

    let result = &report.results[0];
    assert_eq!(result.detail.as_ref().unwrap().kind, "invalid_response");
    assert!(result.message.contains("unreadable response"));
    assert!(!result.message.contains("Could not reach"));
}

#[tokio::test]
async fn test_empty_error_body_falls_back_to_status() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/profiles")
            .query_param("select", "count");
        then.status(502);
    });

    let runner = RestDiagnosticsRunner::from_config(&config_for(&server.base_url())).unwrap();
    let report = runner.run().await;

    let detail = report.results[0].detail.as_ref().unwrap();
    assert_eq!(detail.kind, "http_502");
    assert_eq!(detail.message, "502 Bad Gateway");
}
