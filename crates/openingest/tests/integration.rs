//! Integration tests for OpenIngest using wiremock and temporary files

use base64::Engine;
use openingest::{ingest, IngestError, Ingester, SourceDescriptor};
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn b64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn file_entry(path: &str) -> serde_json::Value {
    let name = path.rsplit('/').next().unwrap();
    json!({ "type": "file", "name": name, "path": path })
}

fn dir_entry(path: &str) -> serde_json::Value {
    let name = path.rsplit('/').next().unwrap();
    json!({ "type": "dir", "name": name, "path": path })
}

async fn mount_json(server: &MockServer, at: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_file(server: &MockServer, repo_path: &str, bytes: &[u8]) {
    mount_json(
        server,
        &format!("/repos/octo/demo/contents/{}", repo_path),
        json!({
            "type": "file",
            "path": repo_path,
            "encoding": "base64",
            "content": b64(bytes),
            "download_url": null
        }),
    )
    .await;
}

/// Repository `octo/demo`:
///
/// ```text
/// README.md
/// src/lib.rs
/// src/nested/deep.txt
/// logo.bin        (not UTF-8)
/// NOTES.txt
/// ```
async fn mock_repository() -> MockServer {
    let server = MockServer::start().await;

    mount_json(
        &server,
        "/repos/octo/demo",
        json!({
            "full_name": "octo/demo",
            "description": "Demo repository",
            "language": "Rust",
            "stargazers_count": 7
        }),
    )
    .await;

    mount_json(
        &server,
        "/repos/octo/demo/contents",
        json!([
            file_entry("README.md"),
            dir_entry("src"),
            file_entry("logo.bin"),
            file_entry("NOTES.txt"),
            { "type": "symlink", "name": "link", "path": "link" }
        ]),
    )
    .await;

    mount_json(
        &server,
        "/repos/octo/demo/contents/src",
        json!([file_entry("src/lib.rs"), dir_entry("src/nested")]),
    )
    .await;

    mount_json(
        &server,
        "/repos/octo/demo/contents/src/nested",
        json!([file_entry("src/nested/deep.txt")]),
    )
    .await;

    mount_file(&server, "README.md", b"# Demo").await;
    mount_file(&server, "src/lib.rs", b"pub fn demo() {}").await;
    mount_file(&server, "src/nested/deep.txt", b"deep").await;
    mount_file(&server, "logo.bin", &[0x89, 0x50, 0x4E, 0x47, 0xFF, 0xFE]).await;
    mount_file(&server, "NOTES.txt", b"notes").await;

    server
}

fn repo_ingester(server: &MockServer) -> Ingester {
    Ingester::builder().github_api_base(server.uri()).build()
}

#[tokio::test]
async fn test_repository_walk() {
    let server = mock_repository().await;
    let ingester = repo_ingester(&server);

    let doc = ingester
        .ingest(&SourceDescriptor::repository("octo", "demo"))
        .await
        .unwrap();

    assert_eq!(
        doc.render(),
        "Repository: octo/demo\n\
         Description: Demo repository\n\
         Main Language: Rust\n\
         Stars: 7\n\
         Contents:\n\
         \n\
         File: README.md\n\
         # Demo\n\
         File: src/lib.rs\n\
         pub fn demo() {}\n\
         File: src/nested/deep.txt\n\
         deep\n\
         File: NOTES.txt\n\
         notes"
    );
}

#[tokio::test]
async fn test_repository_walk_skips_undecodable_files() {
    let server = mock_repository().await;
    let doc = repo_ingester(&server)
        .ingest(&SourceDescriptor::repository("octo", "demo"))
        .await
        .unwrap();

    // metadata block + 4 text files; the binary one is reported, not rendered
    let file_blocks = doc
        .blocks
        .iter()
        .filter(|b| b.label.starts_with("File: "))
        .count();
    assert_eq!(file_blocks, 4);
    assert_eq!(doc.skipped, vec!["logo.bin".to_string()]);
    assert!(!doc.render().contains("logo.bin"));
}

#[tokio::test]
async fn test_repository_include_extensions() {
    let server = mock_repository().await;
    let ingester = Ingester::builder()
        .github_api_base(server.uri())
        .include_extension("rs")
        .build();

    let text = ingester.ingest_github("octo/demo").await.unwrap();
    assert!(text.contains("File: src/lib.rs"));
    assert!(!text.contains("File: README.md"));
    assert!(!text.contains("File: NOTES.txt"));
}

#[tokio::test]
async fn test_repository_url_matches_direct_reference() {
    let server = mock_repository().await;
    let ingester = repo_ingester(&server);

    let via_web = ingester
        .ingest_url("https://github.com/octo/demo")
        .await
        .unwrap();
    let direct = ingester
        .ingest_github("https://github.com/octo/demo")
        .await
        .unwrap();

    assert_eq!(via_web, direct);
    assert!(via_web.starts_with("Repository: octo/demo"));
}

#[tokio::test]
async fn test_repository_token_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/private"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "full_name": "octo/private",
            "description": null,
            "language": null,
            "stargazers_count": 0
        })))
        .mount(&server)
        .await;
    mount_json(&server, "/repos/octo/private/contents", json!([])).await;

    let ingester = Ingester::builder()
        .github_api_base(server.uri())
        .github_token(Some("s3cret".to_string()))
        .build();

    let text = ingester.ingest_github("octo/private").await.unwrap();
    assert_eq!(
        text,
        "Repository: octo/private\nDescription: None\nMain Language: None\nStars: 0\nContents:\n"
    );
}

#[tokio::test]
async fn test_repository_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    let err = repo_ingester(&server)
        .ingest_github("https://github.com/octo/missing")
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::RepositoryNotFound { .. }));
    assert_eq!(err.to_string(), "Repository octo/missing not found");
}

#[tokio::test]
async fn test_repository_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = repo_ingester(&server)
        .ingest_github("octo/demo")
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::AuthenticationFailed));
}

#[tokio::test]
async fn test_repository_unlistable_subdirectory_is_skipped() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/repos/octo/demo",
        json!({ "full_name": "octo/demo", "description": "d", "language": "C", "stargazers_count": 1 }),
    )
    .await;
    mount_json(
        &server,
        "/repos/octo/demo/contents",
        json!([dir_entry("broken"), file_entry("main.c")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contents/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_file(&server, "main.c", b"int main(void) { return 0; }").await;

    let doc = repo_ingester(&server)
        .ingest(&SourceDescriptor::repository("octo", "demo"))
        .await
        .unwrap();

    assert_eq!(doc.skipped, vec!["broken".to_string()]);
    assert!(doc.render().ends_with("File: main.c\nint main(void) { return 0; }"));
}

#[tokio::test]
async fn test_repository_file_names_are_percent_encoded() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/repos/octo/demo",
        json!({ "full_name": "octo/demo", "description": null, "language": "C#", "stargazers_count": 3 }),
    )
    .await;
    mount_json(
        &server,
        "/repos/octo/demo/contents",
        json!([file_entry("C#.md"), file_entry("what?.txt")]),
    )
    .await;
    for (encoded, body) in [("C%23.md", "sharp"), ("what%3F.txt", "question")] {
        mount_json(
            &server,
            &format!("/repos/octo/demo/contents/{}", encoded),
            json!({ "type": "file", "encoding": "base64", "content": b64(body.as_bytes()) }),
        )
        .await;
    }

    let doc = repo_ingester(&server)
        .ingest(&SourceDescriptor::repository("octo", "demo"))
        .await
        .unwrap();

    assert!(doc.skipped.is_empty(), "skipped: {:?}", doc.skipped);
    assert!(doc
        .render()
        .ends_with("File: C#.md\nsharp\nFile: what?.txt\nquestion"));
}

#[tokio::test]
async fn test_web_page() {
    let server = MockServer::start().await;

    let html = r#"<!DOCTYPE html>
<html>
<head><style>h1 { color: red; }</style></head>
<body>
    <h1>Title</h1>
    <p>Paragraph
       text.</p>
    <script>alert('bad');</script>
    <ul><li>One</li><li>Two</li></ul>
</body>
</html>"#;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(&server)
        .await;

    let url = format!("{}/page", server.uri());
    let text = Ingester::default().ingest_url(&url).await.unwrap();

    assert_eq!(
        text,
        format!("URL: {}\nContent:\nTitle\nParagraph text.\nOne\nTwo", url)
    );
}

#[tokio::test]
async fn test_web_error_status_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let url = format!("{}/gone", server.uri());
    let err = ingest(SourceDescriptor::web(&url)).await.unwrap_err();

    match err {
        IngestError::HttpStatus { status, url: failed } => {
            assert_eq!(status, 404);
            assert_eq!(failed, url);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_web_custom_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "CustomBot/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>ok</p>", "text/html"))
        .mount(&server)
        .await;

    let ingester = Ingester::builder().user_agent("CustomBot/1.0").build();
    let text = ingester
        .ingest_url(&format!("{}/", server.uri()))
        .await
        .unwrap();
    assert!(text.ends_with("Content:\nok"));
}

#[tokio::test]
async fn test_invalid_url_scheme() {
    let err = ingest(SourceDescriptor::web("ftp://example.com/file.txt"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("http:// or https://"));
}

fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

async fn ingest_path(path: &Path) -> String {
    Ingester::default().ingest_file(path).await.unwrap()
}

#[tokio::test]
async fn test_json_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "data.json", br#"{"a": 1}"#);

    let text = ingest_path(&path).await;
    assert!(text.starts_with("JSON File: data.json"));
    assert_eq!(text, "JSON File: data.json\n{\n  \"a\": 1\n}");
}

#[tokio::test]
async fn test_csv_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "stock.csv", b"item,count\nbolt,120\nnut,8\n");

    assert_eq!(
        ingest_path(&path).await,
        "CSV File: stock.csv\n   item  count\n0  bolt    120\n1   nut      8"
    );
}

#[tokio::test]
async fn test_plain_file_verbatim() {
    let dir = TempDir::new().unwrap();
    let body = "line one\n\n  indented line\n";
    let path = write_file(&dir, "notes.md", body.as_bytes());

    assert_eq!(
        ingest_path(&path).await,
        format!("File: notes.md\n{}", body)
    );
}

#[tokio::test]
async fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.csv");

    let err = Ingester::default().ingest_file(&path).await.unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound(ref p) if p == &path));
}

#[tokio::test]
async fn test_file_ingestion_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "config.json", br#"{"z": [1, 2], "a": {"b": null}}"#);

    let first = ingest_path(&path).await;
    let second = ingest_path(&path).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_labels_by_extension() {
    let dir = TempDir::new().unwrap();
    let cases = [
        ("a.csv", &b"x\n1\n"[..], "CSV File: a.csv"),
        ("b.json", &b"[]"[..], "JSON File: b.json"),
        ("c.txt", &b"plain"[..], "File: c.txt"),
        ("D.JSON", &b"{}"[..], "JSON File: D.JSON"),
    ];

    for (name, bytes, label) in cases {
        let path = write_file(&dir, name, bytes);
        let text = ingest_path(&path).await;
        assert!(
            text.starts_with(label),
            "{} should start with {:?}, got {:?}",
            name,
            label,
            text
        );
    }
}

fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        for (name, content) in entries {
            zip.start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

#[cfg(feature = "docx")]
#[tokio::test]
async fn test_docx_file() {
    let xml = "<?xml version=\"1.0\"?>\
        <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
        <w:body>\
        <w:p><w:r><w:t>Meeting notes</w:t></w:r></w:p>\
        <w:p><w:r><w:t xml:space=\"preserve\">Agenda: </w:t></w:r><w:r><w:t>budget</w:t></w:r></w:p>\
        </w:body></w:document>";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "memo.docx", &zip_bytes(&[("word/document.xml", xml)]));

    assert_eq!(
        ingest_path(&path).await,
        "DOCX File: memo.docx\nMeeting notes\nAgenda: budget"
    );
}

/// Minimal PDF with the text "demo test phrase" and correct xref offsets
#[cfg(feature = "pdf")]
fn minimal_pdf() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let o1 = out.len();
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    let o2 = out.len();
    out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    let o3 = out.len();
    out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
    let o4 = out.len();
    out.extend_from_slice(b"4 0 obj << /Length 44 >> stream\nBT /F1 12 Tf 100 700 Td (demo test phrase) Tj ET\nendstream endobj\n");
    let o5 = out.len();
    out.extend_from_slice(
        b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
    );
    let xref_start = out.len();
    out.extend_from_slice(b"xref\n0 6\n");
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in [o1, o2, o3, o4, o5] {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
    out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}

#[cfg(feature = "pdf")]
#[tokio::test]
async fn test_pdf_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "report.pdf", &minimal_pdf());

    let text = ingest_path(&path).await;
    assert!(text.starts_with("PDF File: report.pdf\n"));
    assert!(text.contains("demo test phrase"));
}

#[tokio::test]
async fn test_xlsx_file() {
    let workbook = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;
    let workbook_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;
    let root_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;
    let content_types = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;
    let sheet = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>city</t></is></c><c r="B1" t="inlineStr"><is><t>pop</t></is></c></row>
<row r="2"><c r="A2" t="inlineStr"><is><t>Oslo</t></is></c><c r="B2"><v>709</v></c></row>
</sheetData>
</worksheet>"#;

    let bytes = zip_bytes(&[
        ("[Content_Types].xml", content_types),
        ("_rels/.rels", root_rels),
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", workbook_rels),
        ("xl/worksheets/sheet1.xml", sheet),
    ]);
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "cities.xlsx", &bytes);

    assert_eq!(
        ingest_path(&path).await,
        "Excel File: cities.xlsx\n   city  pop\n0  Oslo  709"
    );
}

#[tokio::test]
async fn test_corrupt_spreadsheet_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "broken.xlsx", b"definitely not a zip");

    let err = Ingester::default().ingest_file(&path).await.unwrap_err();
    assert!(matches!(err, IngestError::Parse { format: "Excel", .. }));
}

async fn sqlite_with(dir: &TempDir, statements: &[&str]) -> String {
    use sqlx::Connection;

    let db_path = dir.path().join("test.db");
    let url = format!("sqlite://{}", db_path.display());

    let mut conn = sqlx::SqliteConnection::connect(&format!("{}?mode=rwc", url))
        .await
        .unwrap();
    for statement in statements {
        sqlx::query(*statement).execute(&mut conn).await.unwrap();
    }
    conn.close().await.unwrap();

    url
}

async fn sqlite_with_books(dir: &TempDir) -> String {
    sqlite_with(
        dir,
        &[
            "CREATE TABLE books (id INTEGER PRIMARY KEY, title TEXT NOT NULL, price REAL)",
            "INSERT INTO books (id, title, price) VALUES (1, 'Dune', 2.5)",
            "INSERT INTO books (id, title, price) VALUES (2, 'Emma', NULL)",
        ],
    )
    .await
}

#[tokio::test]
async fn test_database_query() {
    let dir = TempDir::new().unwrap();
    let url = sqlite_with_books(&dir).await;

    let text = Ingester::default()
        .ingest_database(&url, "SELECT id, title, price FROM books ORDER BY id")
        .await
        .unwrap();

    assert_eq!(
        text,
        "Database Query Result:\n   id  title  price\n0   1   Dune    2.5\n1   2   Emma    NaN"
    );
}

#[tokio::test]
async fn test_database_empty_result_keeps_columns() {
    let dir = TempDir::new().unwrap();
    let url = sqlite_with_books(&dir).await;

    let text = Ingester::default()
        .ingest_database(&url, "SELECT id, title FROM books WHERE id > 100")
        .await
        .unwrap();

    assert_eq!(
        text,
        "Database Query Result:\nEmpty DataFrame\nColumns: [id, title]\nIndex: []"
    );
}

#[tokio::test]
async fn test_database_bad_connection_string() {
    let err = Ingester::default()
        .ingest_database("nosuchdb://localhost/x", "SELECT 1")
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::InvalidConnectionString(_)));
}

#[tokio::test]
async fn test_database_boolean_and_datetime_columns() {
    let dir = TempDir::new().unwrap();
    let url = sqlite_with(
        &dir,
        &[
            "CREATE TABLE events (id INTEGER, done BOOLEAN, at DATETIME, amount NUMERIC)",
            "INSERT INTO events VALUES (1, 1, '2024-05-01 10:30:00', 12.5)",
        ],
    )
    .await;

    let text = Ingester::default()
        .ingest_database(&url, "SELECT * FROM events")
        .await
        .unwrap();

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1].split_whitespace().collect::<Vec<_>>(),
        vec!["id", "done", "at", "amount"]
    );
    assert_eq!(
        lines[2].split_whitespace().collect::<Vec<_>>(),
        vec!["0", "1", "True", "2024-05-01", "10:30:00", "12.5"]
    );
}
