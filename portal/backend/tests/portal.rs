use axum::http::StatusCode;
use axum_test::TestServer;
use docflow_forms::WebhookClient;
use docflow_portal::{build_router, AppState};
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_file(webhook_url: &str) -> NamedTempFile {
    let config = json!({
        "webhook": { "url": webhook_url, "token": "portal-token" },
        "documentTypes": {
            "contract": {
                "name": "契約書",
                "formId": "contract-form",
                "fields": [
                    { "name": "contract-amount", "label": "契約金額", "type": "text", "placeholder": "例: 100万円" },
                    { "name": "contract-terms", "label": "特記事項", "type": "textarea" }
                ]
            },
            "invoice": {
                "name": "請求書",
                "formId": "invoice-form",
                "fields": [
                    { "name": "invoice-due", "label": "支払期日", "type": "date" }
                ]
            }
        }
    });
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", config).unwrap();
    file
}

fn server_for(file: &NamedTempFile) -> (TestServer, AppState) {
    let state = AppState::load(file.path(), WebhookClient::new().unwrap()).unwrap();
    let server = TestServer::new(build_router(state.clone())).unwrap();
    (server, state)
}

#[tokio::test]
async fn test_health() {
    let file = config_file("");
    let (server, _) = server_for(&file);
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_form_page_lists_document_types_with_hidden_sections() {
    let file = config_file("");
    let (server, _) = server_for(&file);
    let html = server.get("/").await.text();

    assert!(html.contains(r#"id="doc1" name="doc" value="contract""#));
    assert!(html.contains(r#"id="doc2" name="doc" value="invoice""#));
    assert!(html.contains(r#"<div id="contract-form" class="card form-section">"#));
    assert!(html.contains(r#"<div id="invoice-form" class="card form-section">"#));
    assert!(html.contains("契約書の追加情報"));
    assert!(html.contains(r#"<input type="date" id="invoice-form-invoice-due""#));
    assert!(html.contains(r#"value="submit" disabled"#));
}

#[tokio::test]
async fn test_missing_config_renders_empty_form() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::load(dir.path().join("absent.json"), WebhookClient::new().unwrap()).unwrap();
    let server = TestServer::new(build_router(state)).unwrap();

    let html = server.get("/").await.text();
    assert!(html.contains("書類タイプが設定されていません"));
    assert!(!html.contains(r#"name="doc" value="#));
}

#[tokio::test]
async fn test_selecting_activates_section_and_keeps_values() {
    let file = config_file("");
    let (server, state) = server_for(&file);

    let html = server
        .post("/form")
        .form(&[
            ("doc", "contract"),
            ("doc[contract][contract-amount]", "500万円"),
            ("common-party1-name", "株式会社○○"),
            ("action", "select"),
        ])
        .await
        .text();

    assert!(html.contains(r#"<div id="contract-form" class="card form-section active">"#));
    assert!(html.contains(r#"<div id="invoice-form" class="card form-section">"#));
    assert!(html.contains(r#"value="500万円""#));
    assert!(!html.contains(r#"value="submit" disabled"#));

    let form = state.form.lock().await;
    assert!(form.is_checked("contract"));
    assert!(!form.is_checked("invoice"));
    assert_eq!(form.common_value("common-party1-name"), "株式会社○○");
}

#[tokio::test]
async fn test_submit_without_webhook_shows_notice() {
    let file = config_file("");
    let (server, state) = server_for(&file);

    let html = server.post("/form").form(&[("doc", "contract"), ("action", "submit")]).await.text();
    assert!(html.contains("Webhook URLが設定されていません。設定タブで設定してください。"));
    assert!(!html.contains(r#"value="submit" disabled"#));
    assert!(state.form.lock().await.result().is_none());
}

#[tokio::test]
async fn test_submit_without_selection_shows_notice() {
    let file = config_file("https://hooks.invalid/flow");
    let (server, _) = server_for(&file);

    let html = server.post("/form").form(&[("action", "submit")]).await.text();
    assert!(html.contains("書類を選択してください。"));
}

#[tokio::test]
async fn test_submit_delivers_payload_then_clear_resets() {
    let webhook = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&webhook)
        .await;

    let file = config_file(&webhook.uri());
    let (server, state) = server_for(&file);

    let html = server
        .post("/form")
        .form(&[
            ("common-date", "2024-03-05"),
            ("doc", "invoice"),
            ("doc", "contract"),
            ("doc[contract][contract-amount]", "500万円"),
            ("action", "submit"),
        ])
        .await
        .text();

    assert!(html.contains("✅ 送信成功"));
    assert!(html.contains("選択された書類: 契約書, 請求書"));
    assert!(html.contains(r#"name="action" value="clear""#));
    assert!(!html.contains(r#"value="submit" disabled"#));
    assert!(!state.gate.is_busy());

    let requests = webhook.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["token"], "portal-token");
    assert_eq!(body["common"]["common-date"], "2024年3月5日");
    assert_eq!(body["documents"][0]["type"], "contract");
    assert_eq!(body["documents"][0]["data"]["contract-amount"], "500万円");
    assert_eq!(body["documents"][0]["data"]["contract-terms"], "");
    assert_eq!(body["documents"][1]["config"]["formId"], "invoice-form");

    server
        .post("/form")
        .form(&[("common-party1-name", "株式会社○○"), ("doc", "contract"), ("action", "clear")])
        .await
        .assert_status_ok();
    let form = state.form.lock().await;
    assert_eq!(form.checked_count(), 0);
    assert!(form.result().is_none());
    assert_eq!(form.value("contract", "contract-amount"), "");
    assert_eq!(form.common_value("common-party1-name"), "株式会社○○");
}

#[tokio::test]
async fn test_submit_failure_shows_error_and_payload() {
    let webhook = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(503)).mount(&webhook).await;

    let file = config_file(&webhook.uri());
    let (server, state) = server_for(&file);

    let html = server.post("/form").form(&[("doc", "invoice"), ("action", "submit")]).await.text();
    assert!(html.contains("❌ 送信エラー"));
    assert!(html.contains("HTTP error! status: 503"));
    assert!(html.contains("送信データ:"));
    assert!(!state.gate.is_busy());
    assert!(!html.contains(r#"value="clear""#));
    assert!(!html.contains(r#"value="submit" disabled"#));
    assert!(html.contains(r#"value="submit">Webhookに送信</button>"#));
}

#[tokio::test]
async fn test_save_document_types_drops_incomplete_rows_and_exports() {
    let file = config_file("");
    let (server, state) = server_for(&file);

    server.get("/settings").await.assert_status_ok();

    let html = server.post("/settings").form(&[("action", "add-field:1")]).await.text();
    assert!(html.contains(r#"name="doc-1-field-1-name""#));

    let html = server
        .post("/settings")
        .form(&[
            ("doc-0-name", "業務委託契約書"),
            ("doc-1-field-1-name", ""),
            ("doc-1-field-1-label", "備考"),
            ("action", "save-docs"),
        ])
        .await
        .text();
    assert!(html.contains("書類タイプを保存しました。"));
    assert!(html.contains("alert-warning"));
    assert!(html.contains("export-link').click()"));

    {
        let store = state.store.read().await;
        assert_eq!(store.document_type("contract").unwrap().name, "業務委託契約書");
        assert_eq!(store.document_type("invoice").unwrap().fields.len(), 1);
    }

    // The form keeps its load-time layout until reload
    let form_html = server.get("/").await.text();
    assert!(form_html.contains(">契約書</label>"));

    let export = server.get("/settings/export").await;
    export.assert_status_ok();
    assert_eq!(
        export.header("content-disposition").to_str().unwrap(),
        "attachment; filename=\"config.json\""
    );
    let exported: Value = serde_json::from_str(&export.text()).unwrap();
    assert_eq!(exported["documentTypes"]["contract"]["name"], "業務委託契約書");
    assert_eq!(exported["documentTypes"]["invoice"]["fields"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_save_webhook_and_remove_document_type() {
    let file = config_file("");
    let (server, state) = server_for(&file);

    server.get("/settings").await;
    server
        .post("/settings")
        .form(&[("webhook-url", "https://hooks.example.com/flow"), ("webhook-token", "t"), ("action", "save-webhook")])
        .await
        .assert_status_ok();
    assert_eq!(state.store.read().await.webhook().url, "https://hooks.example.com/flow");

    let html = server.post("/settings").form(&[("action", "remove-doc:0")]).await.text();
    assert!(!html.contains(r#"id="doc-type-contract""#));
    assert!(html.contains(r#"id="doc-type-invoice""#));
    // Removal only touches the buffer until saved
    assert!(state.store.read().await.document_type("contract").is_some());

    server.post("/settings").form(&[("action", "save-docs")]).await;
    assert!(state.store.read().await.document_type("contract").is_none());
}

#[tokio::test]
async fn test_unknown_settings_action_is_reported() {
    let file = config_file("");
    let (server, _) = server_for(&file);
    let html = server.post("/settings").form(&[("action", "explode")]).await.text();
    assert!(html.contains("不明な操作です。"));
}

#[tokio::test]
async fn test_reload_rebuilds_from_resource() {
    let file = config_file("");
    let (server, state) = server_for(&file);

    server.post("/form").form(&[("doc", "contract"), ("action", "select")]).await;

    let replacement = json!({
        "webhook": { "url": "", "token": "" },
        "documentTypes": {
            "nda": { "name": "秘密保持契約書", "formId": "nda-form", "fields": [] }
        }
    });
    std::fs::write(file.path(), replacement.to_string()).unwrap();

    let response = server.post("/reload").await;
    response.assert_status(StatusCode::SEE_OTHER);

    let html = server.get("/").await.text();
    assert!(html.contains(r#"id="doc1" name="doc" value="nda""#));
    assert!(!html.contains("contract-form"));
    assert_eq!(state.form.lock().await.checked_count(), 0);
}
