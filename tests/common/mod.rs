//! Common test utilities and helpers


pub use database::{init_fresh_test_database, TestDatabase};

/// Test data utilities
pub mod test_data {
    use serde_json::{json, Value};
    use std::io::{Cursor, Write};

    /// One listing item as the registry returns it
    pub fn listing_item(doc_id: &str, doc_type: &str, sec_code: Option<&str>, period_end: &str) -> Value {
        json!({
            "seqNumber": 1,
            "docID": doc_id,
            "edinetCode": "E00001",
            "secCode": sec_code,
            "filerName": "テスト株式会社",
            "docTypeCode": doc_type,
            "periodStart": "2023-04-01",
            "periodEnd": period_end,
            "docDescription": "有価証券報告書",
            "xbrlFlag": "1",
        })
    }

    /// Full listing response body
    pub fn listing_body(items: Vec<Value>) -> Value {
        json!({
            "metadata": {
                "title": "提出された書類を把握するためのAPI",
                "parameter": {"type": "2"},
                "resultset": {"count": items.len()},
                "status": "200",
                "message": "OK",
            },
            "results": items,
        })
    }

    /// Minimal XBRL instance with the given facts
    pub fn xbrl_instance(facts: &[(&str, &str)]) -> String {
        let body: String = facts
            .iter()
            .map(|(tag, value)| {
                format!(
                    "  <jpcrp_cor:{tag} contextRef=\"CurrentYearDuration\" unitRef=\"JPY\" decimals=\"-6\">{value}</jpcrp_cor:{tag}>\n"
                )
            })
            .collect();

        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <xbrli:xbrl xmlns:xbrli=\"http://www.xbrl.org/2003/instance\" \
             xmlns:jpcrp_cor=\"http://disclosure.edinet-fsa.go.jp/taxonomy/jpcrp/2023-12-01/jpcrp_cor\">\n\
             {body}</xbrli:xbrl>\n"
        )
    }

    /// Zip bundle with the given members, in order
    pub fn bundle(members: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in members {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .expect("start zip member");
            writer.write_all(contents.as_bytes()).expect("write zip member");
        }
        writer.finish().expect("finish zip").into_inner()
    }
}

/// Logging utilities for tests
pub mod logging {
    use tracing::{debug, info};

    /// Log test step
    pub fn log_test_step(step: &str) {
        info!("🧪 Test Step: {}", step);
    }

    /// Log test data
    pub fn log_test_data<T: std::fmt::Debug>(label: &str, data: &T) {
        debug!("📊 {}: {:?}", label, data);
    }
}
