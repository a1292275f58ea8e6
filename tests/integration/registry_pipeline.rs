//! End-to-end tests against a mocked registry

use assert_matches::assert_matches;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use edinet_dividends::api::{EdinetClient, FilingSource};
use edinet_dividends::attachment::retrieve_attachment;
use edinet_dividends::catalog_sync::{sync_date, sync_window};
use edinet_dividends::error::IngestError;
use edinet_dividends::models::Config;
use edinet_dividends::pipeline;

use crate::common::{database, init_fresh_test_database, logging, test_data};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
}

fn client_for(server: &MockServer) -> EdinetClient {
    let config = Config {
        edinet_base_url: server.uri(),
        ..Config::default()
    };
    EdinetClient::new(&config).expect("Failed to build client")
}

async fn mount_listing(server: &MockServer, date: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/documents.json"))
        .and(query_param("date", date))
        .and(query_param("type", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_bundle(server: &MockServer, doc_id: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/documents/{}", doc_id)))
        .and(query_param("type", "1"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[test_log::test(tokio::test)]
async fn test_catalog_sync_is_idempotent_and_filters_report_type() {
    logging::log_test_step("Syncing the same listing twice");
    let server = MockServer::start().await;
    mount_listing(&server, "2024-06-28", test_data::listing_body(vec![
        test_data::listing_item("S100AAA1", "120", Some("72030"), "2024-03-31"),
        test_data::listing_item("S100AAA2", "140", Some("72030"), "2024-06-30"),
        test_data::listing_item("S100AAA3", "120", None, "2024-03-31"),
        test_data::listing_item("S100AAA4", "120", Some("67580"), "2024-03-31"),
    ])).await;

    let test_db = init_fresh_test_database().await.unwrap();
    let client = client_for(&server);

    let first = sync_date(&test_db.db, &client, today(), "120").await.unwrap();
    let second = sync_date(&test_db.db, &client, today(), "120").await.unwrap();
    logging::log_test_data("Sync outcomes", &(&first, &second));

    assert_eq!(first.listed, 4);
    assert_eq!(first.matched, 2);
    assert_eq!(first.inserted, 2);
    assert_eq!(second.inserted, 0);

    assert!(test_db.db.get_document("S100AAA1").await.unwrap().is_some());
    assert!(test_db.db.get_document("S100AAA2").await.unwrap().is_none(), "Quarterly report must not be cataloged");
    assert!(test_db.db.get_document("S100AAA3").await.unwrap().is_none(), "Entry without secCode must not be cataloged");
    assert_eq!(test_db.db.get_stats().await.unwrap().documents, 2);
}

#[test_log::test(tokio::test)]
async fn test_failed_dates_do_not_abort_the_window() {
    logging::log_test_step("One good date, one server error, one registry error");
    let server = MockServer::start().await;
    mount_listing(&server, "2024-06-28", test_data::listing_body(vec![
        test_data::listing_item("S100BBB1", "120", Some("99840"), "2024-03-31"),
    ])).await;
    Mock::given(method("GET"))
        .and(path("/documents.json"))
        .and(query_param("date", "2024-06-27"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_listing(&server, "2024-06-26", serde_json::json!({
        "metadata": {"status": "400", "message": "Bad Request"}
    })).await;

    let test_db = init_fresh_test_database().await.unwrap();
    let client = client_for(&server);

    let report = sync_window(&test_db.db, &client, today(), 3, "120").await.unwrap();

    assert_eq!(report.dates_scanned, 3);
    assert_eq!(report.documents_inserted, 1);
    assert_eq!(report.skipped_dates.len(), 2);
    assert_matches!(report.skipped_dates[0].error, IngestError::HttpStatus { status: 503, .. });
    assert_matches!(report.skipped_dates[1].error, IngestError::Registry { .. });
}

#[test_log::test(tokio::test)]
async fn test_bundle_without_xbrl_is_not_an_error() {
    let server = MockServer::start().await;
    let bundle = test_data::bundle(&[("XBRL/PublicDoc/0101010_honbun.htm", "<html></html>")]);
    mount_bundle(&server, "S100CCC1", ResponseTemplate::new(200).set_body_bytes(bundle)).await;

    let client = client_for(&server);
    let attachment = retrieve_attachment(&client, "S100CCC1").await.unwrap();
    assert_eq!(attachment, None);
}

#[test_log::test(tokio::test)]
async fn test_bundle_http_failure_is_reported() {
    let server = MockServer::start().await;
    mount_bundle(&server, "S100CCC2", ResponseTemplate::new(404)).await;

    let client = client_for(&server);
    assert_matches!(
        client.download_bundle("S100CCC2").await,
        Err(IngestError::HttpStatus { status: 404, .. })
    );
}

#[test_log::test(tokio::test)]
async fn test_end_to_end_one_success_one_network_failure() {
    logging::log_test_step("Two queued documents, second bundle download fails");
    let server = MockServer::start().await;
    mount_listing(&server, "2024-06-28", test_data::listing_body(vec![
        test_data::listing_item("S100E2E1", "120", Some("13010"), "2024-03-31"),
        test_data::listing_item("S100E2E2", "120", Some("13020"), "2024-03-31"),
    ])).await;

    let xbrl = test_data::xbrl_instance(&[
        ("NetSalesSummaryOfBusinessResults", "1,234,500"),
        ("OrdinaryIncomeLossSummaryOfBusinessResults", "210,000"),
        ("OperatingIncome", "N/A"),
        ("NetIncomeLossSummaryOfBusinessResults", "98,765"),
        ("DividendPaidPerShareSummaryOfBusinessResults", "42.5"),
    ]);
    let bundle = test_data::bundle(&[
        ("XBRL/PublicDoc/0000000_header.htm", "<html></html>"),
        ("XBRL/PublicDoc/jpcrp030000-asr-001_E00001-000_2024-03-31_01_2024-06-28.xbrl", &xbrl),
    ]);
    mount_bundle(&server, "S100E2E1", ResponseTemplate::new(200).set_body_bytes(bundle)).await;
    mount_bundle(&server, "S100E2E2", ResponseTemplate::new(500)).await;

    let test_db = init_fresh_test_database().await.unwrap();
    let db = &test_db.db;
    let config = Config {
        edinet_base_url: server.uri(),
        scan_days: 1,
        ..Config::default()
    };
    let client = EdinetClient::new(&config).unwrap();

    let report = pipeline::run(db, &client, &config, today()).await.expect("Run must not fail");
    logging::log_test_data("Process report", &report.process);

    assert_eq!(report.process.queued, 2);
    assert_eq!(report.process.processed, 1);
    assert_eq!(report.process.failures.len(), 1);
    assert_eq!(report.process.failures[0].doc_id, "S100E2E2");

    let good = db.get_document("S100E2E1").await.unwrap().unwrap();
    assert!(good.processed);
    let financials = db.get_financial_record("13010", 2024).await.unwrap().unwrap();
    assert_eq!(financials.revenue, Some(1234500.0));
    assert_eq!(financials.operating_income, None);
    assert_eq!(financials.net_income, Some(98765.0));
    assert_eq!(db.get_dividend_record("13010", 2024).await.unwrap().unwrap().dividend, Some(42.5));

    let bad = db.get_document("S100E2E2").await.unwrap().unwrap();
    assert!(!bad.processed);
    assert_eq!(db.get_financial_record("13020", 2024).await.unwrap(), None);
    assert_eq!(db.get_dividend_record("13020", 2024).await.unwrap(), None);

    // Second run only retries the failed document
    let queue = db.get_unprocessed_documents().await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].doc_id, "S100E2E2");
    assert_eq!(db.get_stats().await.unwrap().pending_documents(), 1);
    database::insert_document(db, "S100E2E1", "13010", "2024-03-31").await.unwrap();
    assert!(db.get_document("S100E2E1").await.unwrap().unwrap().processed, "Re-sighting must not reset the flag");
}
