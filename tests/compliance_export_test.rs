use fugue_automation::api::FugueClient;
use fugue_automation::config::ApiConfig;
use fugue_automation::report::{ComplianceCsvWriter, ComplianceExporter, COLUMNS};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use tempfile::TempDir;

fn client(server: &ServerGuard) -> FugueClient {
    FugueClient::new(ApiConfig::new("id", "secret").with_base_url(server.url())).unwrap()
}

async fn mock_scans(server: &mut ServerGuard, environment_id: &str, items: serde_json::Value) -> mockito::Mock {
    server
        .mock("GET", "/v0/scans")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("environment_id".into(), environment_id.into()),
            Matcher::UrlEncoded("status".into(), "SUCCESS".into()),
            Matcher::UrlEncoded("max_items".into(), "1".into()),
        ]))
        .with_status(200)
        .with_body(json!({ "items": items, "is_truncated": false }).to_string())
        .create_async()
        .await
}

async fn mock_rules_page(
    server: &mut ServerGuard,
    scan_id: &str,
    offset: u64,
    body: serde_json::Value,
) -> mockito::Mock {
    server
        .mock("GET", format!("/v0/scans/{}/compliance_by_rules", scan_id).as_str())
        .match_query(Matcher::UrlEncoded("offset".into(), offset.to_string()))
        .with_status(200)
        .with_body(body.to_string())
        .expect(1)
        .create_async()
        .await
}

fn rule(control: &str, message: &str) -> serde_json::Value {
    json!({
        "family": "CIS",
        "rule": control,
        "failed_resource_types": [{ "resource_type": "AWS.CloudTrail", "messages": [message] }],
        "failed_resources": [],
        "unsurveyed_resource_types": []
    })
}

#[tokio::test]
async fn test_compliance_pages_are_each_fetched_once() {
    let mut server = Server::new_async().await;

    let pages = vec![
        mock_rules_page(
            &mut server,
            "scan-1",
            0,
            json!({ "items": [rule("CIS 1", "a")], "is_truncated": true, "next_offset": 1 }),
        )
        .await,
        mock_rules_page(
            &mut server,
            "scan-1",
            1,
            json!({ "items": [rule("CIS 2", "b")], "is_truncated": true, "next_offset": 2 }),
        )
        .await,
        mock_rules_page(
            &mut server,
            "scan-1",
            2,
            json!({ "items": [rule("CIS 3", "c")], "is_truncated": false }),
        )
        .await,
    ];

    let client = client(&server);
    let rules = client.compliance_by_rules("scan-1").await.unwrap();

    for page in &pages {
        page.assert_async().await;
    }
    let controls: Vec<&str> = rules.iter().map(|r| r.rule.as_str()).collect();
    assert_eq!(controls, vec!["CIS 1", "CIS 2", "CIS 3"]);
}

#[tokio::test]
async fn test_export_writes_rows_and_skips_unscanned_environments() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/v0/environments")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({
                "items": [
                    {
                        "id": "env-1",
                        "name": "Prod",
                        "provider": "aws",
                        "provider_options": {
                            "aws": {
                                "role_arn": "arn:aws:iam::123456789012:role/FugueRiskManager",
                                "regions": ["us-east-1", "us-west-2"]
                            }
                        }
                    },
                    {
                        "id": "env-2",
                        "name": "Fresh",
                        "provider": "azure",
                        "provider_options": { "azure": { "subscription_id": "sub-1" } }
                    }
                ],
                "is_truncated": false
            })
            .to_string(),
        )
        .create_async()
        .await;

    mock_scans(
        &mut server,
        "env-1",
        json!([{ "id": "scan-1", "status": "SUCCESS", "finished_at": 1577934245 }]),
    )
    .await;
    mock_scans(&mut server, "env-2", json!([])).await;

    mock_rules_page(
        &mut server,
        "scan-1",
        0,
        json!({
            "items": [{
                "family": "CIS",
                "rule": "CIS 2.1",
                "failed_resource_types": [
                    { "resource_type": "AWS.CloudTrail", "messages": ["trail, missing"] }
                ],
                "failed_resources": [{
                    "resource": { "resource_type": "AWS.S3.Bucket", "resource_id": "logs" },
                    "messages": ["bucket \"logs\" is public", "no  versioning"]
                }],
                "unsurveyed_resource_types": ["AWS.EC2.Vpc"]
            }],
            "is_truncated": false
        }),
    )
    .await;
    let scan2_rules = server
        .mock("GET", Matcher::Regex("^/v0/scans/scan-2".to_string()))
        .expect(0)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let client = client(&server);
    let (path, summary) = ComplianceExporter::new(&client)
        .export_to_dir(dir.path())
        .await
        .unwrap();

    scan2_rules.assert_async().await;
    assert_eq!(summary.environments, 1);
    assert_eq!(summary.skipped_environments, 1);
    assert_eq!(summary.rows, 4);

    let file_name = path.file_name().unwrap().to_str().unwrap();
    assert!(file_name.starts_with("compliance-"));
    assert!(file_name.ends_with(".csv"));

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], COLUMNS.join(","));
    assert_eq!(
        lines[1],
        "\"=\"\"Prod\"\"\",\"=\"\"123456789012\"\"\",\"=\"\"us-east-1,us-west-2\"\"\",\
         \"=\"\"CIS\"\"\",\"=\"\"CIS 2.1\"\"\",\"=\"\"AWS.CloudTrail\"\"\",\"=\"\"-\"\"\",\
         \"=\"\"2020-01-02\"\"\",\"=\"\"03:04:05\"\"\",trail missing,\
         \"=\"\"env-1\"\"\",\"=\"\"scan-1\"\"\""
    );
    assert!(lines[2].contains(",bucket logs is public,"));
    assert!(lines[2].contains("\"=\"\"logs\"\"\""));
    assert!(lines[3].contains(",no versioning,"));
    assert!(lines[4].contains(",Resource type was not scanned,"));
    assert!(lines[4].contains("\"=\"\"AWS.EC2.Vpc\"\"\""));
}

#[tokio::test]
async fn test_paginated_environment_listing() {
    let mut server = Server::new_async().await;

    let first = server
        .mock("GET", "/v0/environments")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("offset".into(), "0".into()),
            Matcher::UrlEncoded("max_items".into(), "100".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "items": [{ "id": "env-1", "name": "One", "provider": "google" }],
                "is_truncated": true,
                "next_offset": 100
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/v0/environments")
        .match_query(Matcher::UrlEncoded("offset".into(), "100".into()))
        .with_status(200)
        .with_body(
            json!({
                "items": [{ "id": "env-2", "name": "Two", "provider": "google" }],
                "is_truncated": false
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    mock_scans(&mut server, "env-1", json!([])).await;
    mock_scans(&mut server, "env-2", json!([])).await;

    let client = client(&server);
    let mut buf = Vec::new();
    let mut writer = ComplianceCsvWriter::new(&mut buf).unwrap();
    let summary = ComplianceExporter::new(&client)
        .paginate_environments(true)
        .export(&mut writer)
        .await
        .unwrap();
    writer.finish().unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(summary.skipped_environments, 2);
    assert_eq!(summary.rows, 0);
    assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
}
