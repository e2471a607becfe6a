use clap::Parser;
use credit_strategy::{
    CliConfig, CreditPipeline, LocalStorage, StrategyConfig, StrategyEngine, StrategyError,
};
use httpmock::prelude::*;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

fn semester_payload() -> serde_json::Value {
    serde_json::json!({"items": [
        {
            "code": "G-AIA-500", "codeinstance": "LYN-5-1", "title": "G5 - Machine Learning",
            "semester": 5, "credits": "4", "instance_location": "FR/LYN",
            "begin": "2024-09-30", "end": "2024-10-20", "status": "ongoing"
        },
        {
            "code": "G-SEC-500", "codeinstance": "LYN-5-1", "title": "G5 - Pentest",
            "semester": 5, "credits": 3, "instance_location": "FR/LYN",
            "begin": "2024-10-14", "end": "2024-11-10", "status": "notregistered"
        },
        {
            "code": "G-INN-500", "codeinstance": "LYN-5-1", "title": "G5 - Hackathon",
            "semester": 5, "credits": 2, "instance_location": "FR/LYN",
            "begin": "2024-11-04", "end": "2024-11-24", "status": "valid"
        },
        {
            "code": "G-AIA-501", "codeinstance": "PAR-5-1", "title": "G5 - Paris only",
            "semester": 5, "credits": 5, "instance_location": "FR/PAR",
            "begin": "2024-09-30", "end": "2024-10-20"
        },
        {
            "code": "G-EPI-500", "codeinstance": "LYN-5-1", "title": "G5 - Follow-up",
            "semester": 5, "credits": 0, "instance_location": "FR/LYN",
            "begin": "2024-09-30", "end": "2025-01-20"
        },
        {
            "code": "G-OOP-400", "codeinstance": "LYN-4-1", "title": "G4 - Object Oriented",
            "semester": 4, "credits": 6, "instance_location": "FR/LYN",
            "begin": "2024-02-05", "end": "2024-03-10", "status": "valid"
        }
    ]})
}

fn settings_for(server: &MockServer) -> StrategyConfig {
    let mut settings = StrategyConfig::default();
    settings.portal.base_url = server.base_url();
    settings.portal.modules_endpoint = "/course/filter?format=json".to_string();
    settings
}

fn cli(args: &[&str]) -> CliConfig {
    let mut argv = vec!["credit-strategy"];
    argv.extend_from_slice(args);
    CliConfig::try_parse_from(argv).unwrap()
}

fn engine_for(
    temp_dir: &TempDir,
    server: &MockServer,
    args: &[&str],
) -> StrategyEngine<CreditPipeline<LocalStorage, CliConfig>> {
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let pipeline = CreditPipeline::new(storage, cli(args), settings_for(server)).unwrap();
    StrategyEngine::new(pipeline)
}

fn read_part(path: &Path, name: &str) -> String {
    let bytes = std::fs::read(path).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut content = String::new();
    part.read_to_string(&mut content).unwrap();
    content
}

#[tokio::test]
async fn test_end_to_end_writes_workbook() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/course/filter")
            .query_param("format", "json")
            .header("cookie", "user=abc.def; gdpr=1")
            .header("x-requested-with", "XMLHttpRequest");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(semester_payload());
    });

    let engine = engine_for(&temp_dir, &server, &["-c", "user=abc.def; gdpr=1"]);
    let summary = engine.run().await.unwrap();

    api_mock.assert();
    assert_eq!(summary.semester, 5);
    assert_eq!(summary.module_count, 3);
    assert_eq!(summary.totals.available, 9);
    assert_eq!(summary.totals.registered, 6);
    assert_eq!(summary.totals.bonus, 2);

    let expected = temp_dir.path().join("output/credit_strategy_S5.xlsx");
    assert!(expected.exists());
    assert_eq!(Path::new(&summary.output_path), expected.as_path());

    let strings = read_part(&expected, "xl/sharedStrings.xml");
    for text in [
        "Machine Learning",
        "Pentest",
        "Hackathon",
        "TOTAL AVAILABLE",
        "TOTAL REGISTERED",
        "INNOVATION (bonus credits)",
    ] {
        assert!(strings.contains(text), "missing {:?}", text);
    }
    assert!(!strings.contains("Paris only"));
    assert!(!strings.contains("Follow-up"));
    assert!(!strings.contains("Object Oriented"));

    let workbook = read_part(&expected, "xl/workbook.xml");
    assert!(workbook.contains("name=\"Semester 5\""));

    // Month, week and date headers, then the first category; Machine
    // Learning spans weeks 1-3 on the first module row.
    let sheet = read_part(&expected, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<mergeCell ref=\"B5:D5\"/>"));
    assert!(sheet.contains("<mergeCell ref=\"C1:F1\"/>"));
    assert!(sheet.contains("<mergeCell ref=\"G1:I1\"/>"));
    assert!(strings.contains("Oct 2024"));
}

#[tokio::test]
async fn test_bare_token_is_expanded() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/course/filter")
            .header("cookie", "user=eyJ0eXAi; gdpr=1");
        then.status(200).json_body(serde_json::json!([]));
    });

    let engine = engine_for(&temp_dir, &server, &["-c", "eyJ0eXAi"]);
    let summary = engine.run().await.unwrap();

    api_mock.assert();
    assert_eq!(summary.semester, 1);
    assert_eq!(summary.module_count, 0);
    assert_eq!(summary.totals.available, 0);
    assert!(temp_dir
        .path()
        .join("output/credit_strategy_S1.xlsx")
        .exists());
}

#[tokio::test]
async fn test_unauthorized_writes_nothing() {
    for status in [401u16, 403] {
        let temp_dir = TempDir::new().unwrap();
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/course/filter");
            then.status(status);
        });

        let engine = engine_for(&temp_dir, &server, &["-c", "user=expired"]);
        let error = engine.run().await.unwrap_err();

        api_mock.assert();
        assert!(matches!(
            error,
            StrategyError::AuthenticationError { status: Some(s), .. } if s == status
        ));
        assert_eq!(error.exit_code(), 2);
        assert!(!temp_dir.path().join("output").exists());
    }
}

#[tokio::test]
async fn test_login_page_is_an_authentication_error() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/course/filter");
        then.status(200)
            .header("Content-Type", "text/html")
            .body("<!DOCTYPE html><html><body>Sign in</body></html>");
    });

    let engine = engine_for(&temp_dir, &server, &["-c", "user=stale"]);
    let error = engine.run().await.unwrap_err();

    assert!(matches!(
        error,
        StrategyError::AuthenticationError { status: None, .. }
    ));
}

#[tokio::test]
async fn test_malformed_cookie_never_reaches_the_server() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/course/filter");
        then.status(200).json_body(serde_json::json!([]));
    });

    let engine = engine_for(&temp_dir, &server, &["-c", "gdpr=1; lang=fr"]);
    let error = engine.run().await.unwrap_err();

    api_mock.assert_hits(0);
    assert_eq!(error.exit_code(), 2);
}

#[tokio::test]
async fn test_missing_semester_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/course/filter");
        then.status(200).json_body(semester_payload());
    });

    let engine = engine_for(&temp_dir, &server, &["-c", "user=abc", "-s", "7"]);
    let error = engine.run().await.unwrap_err();

    assert!(matches!(error, StrategyError::NotFoundError { semester: 7 }));
    assert_eq!(error.exit_code(), 3);
    assert!(!temp_dir.path().join("output").exists());
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/course/filter");
        then.status(503);
    });

    let engine = engine_for(&temp_dir, &server, &["-c", "user=abc"]);
    let error = engine.run().await.unwrap_err();

    assert!(matches!(
        error,
        StrategyError::HttpStatusError { status: 503, .. }
    ));
    assert_eq!(error.exit_code(), 1);
}

#[tokio::test]
async fn test_explicit_semester_output_and_week_clipping() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/course/filter");
        then.status(200).json_body(semester_payload());
    });

    let engine = engine_for(
        &temp_dir,
        &server,
        &[
            "-c",
            "user=abc",
            "-s",
            "4",
            "-o",
            "plans/s4.xlsx",
            "--weeks",
            "2",
        ],
    );
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.semester, 4);
    assert_eq!(summary.module_count, 1);
    assert_eq!(summary.totals.registered, 6);

    let output = temp_dir.path().join("plans/s4.xlsx");
    assert!(output.exists());

    // Five weeks of module squeezed into a two-week grid: columns B and C.
    let sheet = read_part(&output, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<mergeCell ref=\"B5:C5\"/>"));
    assert!(sheet.contains("<mergeCell ref=\"B1:C1\"/>"));
    let strings = read_part(&output, "xl/sharedStrings.xml");
    assert!(strings.contains("Object Oriented"));
}
