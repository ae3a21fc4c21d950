use std::fs;
use std::path::Path;

use chrono::DateTime;
use hugo_export_core::{AssetOutcome, ExportProfile, Post, PostStatus, PostType};
use hugo_export_engine::{
    ArchiveLookup, AssetResolution, AssetResolver, FailureKind, FetchError, FetchOutput,
    FetchSettings, Fetcher, LocalFileStore, ReqwestFetcher, RewriteLedger,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITE: &str = "https://example.com";

fn post() -> Post {
    Post {
        id: 1,
        post_type: PostType::Post,
        status: PostStatus::Publish,
        title: "Hello".to_string(),
        slug: "hello".to_string(),
        author_id: 1,
        date: DateTime::parse_from_rfc3339("2020-01-02T10:00:00+01:00").unwrap(),
        excerpt: String::new(),
        content: String::new(),
        guid: String::new(),
        permalink: format!("{SITE}/2020/01/hello/"),
        thumbnail_id: None,
    }
}

/// Fetcher for a machine without network access.
struct OfflineFetcher;

#[async_trait::async_trait]
impl Fetcher for OfflineFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        Err(FetchError {
            kind: FailureKind::Network,
            message: format!("offline: {url}"),
        })
    }
}

struct Fixture {
    temp: TempDir,
    server: MockServer,
}

impl Fixture {
    async fn new() -> Self {
        export_logging::initialize_for_tests();
        let temp = TempDir::new().unwrap();
        let uploads = temp.path().join("wp/wp-content/uploads/2020/01");
        fs::create_dir_all(&uploads).unwrap();
        fs::write(uploads.join("local.png"), b"local-bytes").unwrap();
        fs::create_dir_all(temp.path().join("bundle")).unwrap();
        Self {
            temp,
            server: MockServer::start().await,
        }
    }

    fn content_root(&self) -> std::path::PathBuf {
        self.temp.path().join("wp")
    }

    fn bundle(&self) -> std::path::PathBuf {
        self.temp.path().join("bundle")
    }

    fn archive(&self) -> ArchiveLookup {
        ArchiveLookup::new(format!("{}/wayback/available", self.server.uri()))
    }

    async fn resolve(
        &self,
        profile: &ExportProfile,
        rendered: &str,
        ledger: &mut RewriteLedger,
    ) -> AssetResolution {
        let fetcher = ReqwestFetcher::new(FetchSettings::default());
        self.resolve_with(&fetcher, profile, rendered, ledger).await
    }

    async fn resolve_offline(&self, rendered: &str) -> AssetResolution {
        let mut ledger = RewriteLedger::new();
        self.resolve_with(&OfflineFetcher, &ExportProfile::broad(), rendered, &mut ledger)
            .await
    }

    async fn resolve_with(
        &self,
        fetcher: &dyn Fetcher,
        profile: &ExportProfile,
        rendered: &str,
        ledger: &mut RewriteLedger,
    ) -> AssetResolution {
        let archive = self.archive();
        let content_root = self.content_root();
        let resolver = AssetResolver {
            fetcher,
            files: &LocalFileStore,
            archive: &archive,
            profile,
            site_url: SITE,
            content_root: &content_root,
        };
        resolver
            .resolve(&post(), rendered, &self.bundle(), ledger)
            .await
            .expect("resolve")
    }
}

fn read(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap()
}

#[tokio::test]
async fn every_media_url_lands_in_exactly_one_ledger() {
    let fixture = Fixture::new().await;
    let uri = fixture.server.uri();

    Mock::given(method("GET"))
        .and(path("/media/remote.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"remote-bytes".to_vec(), "image/jpeg"))
        .mount(&fixture.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/gone.gif"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&fixture.server)
        .await;
    let gone_url = format!("{uri}/media/gone.gif");
    Mock::given(method("GET"))
        .and(path("/wayback/available"))
        .and(query_param("url", gone_url.as_str()))
        .and(query_param("timestamp", "20200102090000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "archived_snapshots": {
                "closest": {
                    "available": true,
                    "status": "200",
                    "url": format!("{uri}/web/20200102090000/http://old.test/gone.gif")
                }
            }
        })))
        .mount(&fixture.server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/web/20200102090000if_/http:/+old\.test/gone\.gif$"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"archived-bytes".to_vec(), "image/gif"))
        .mount(&fixture.server)
        .await;

    let rendered = format!(
        r#"<p><img src="{SITE}/wp-content/uploads/2020/01/local.png"></p>
<p><img src="{uri}/media/remote.jpg"> <img src="{uri}/media/gone.gif"></p>
<p><img src="{uri}/media/lost.png"> <a href="{uri}/about/">about</a></p>"#
    );
    let mut ledger = RewriteLedger::new();
    let resolution = fixture
        .resolve(&ExportProfile::broad(), &rendered, &mut ledger)
        .await;

    let outcomes: Vec<(String, AssetOutcome)> = resolution
        .assets
        .iter()
        .map(|asset| (asset.filename.clone(), asset.outcome))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ("127-0-0-1-gone.gif".to_string(), AssetOutcome::ArchiveRecovered),
            ("127-0-0-1-lost.png".to_string(), AssetOutcome::Lost),
            ("127-0-0-1-remote.jpg".to_string(), AssetOutcome::RemoteFetched),
            ("local.png".to_string(), AssetOutcome::LocalCopied),
        ]
    );

    let bundle = fixture.bundle();
    assert_eq!(read(&bundle.join("local.png")), b"local-bytes");
    assert_eq!(read(&bundle.join("127-0-0-1-remote.jpg")), b"remote-bytes");
    assert_eq!(read(&bundle.join("127-0-0-1-gone.gif")), b"archived-bytes");
    assert!(!bundle.join("127-0-0-1-lost.png").exists());

    assert_eq!(resolution.imported().len(), 2);
    assert_eq!(resolution.recovered().len(), 1);
    assert_eq!(
        resolution.lost().get("127-0-0-1-lost.png").map(String::as_str),
        Some(format!("{uri}/media/lost.png").as_str())
    );

    assert_eq!(ledger.len(), 3);
    assert_eq!(ledger.filename_for(&gone_url), Some("127-0-0-1-gone.gif"));
    assert_eq!(ledger.filename_for(&format!("{uri}/media/lost.png")), None);
}

#[tokio::test]
async fn missing_local_file_falls_through_to_the_archive() {
    let fixture = Fixture::new().await;
    let rendered = format!(r#"<img src="{SITE}/wp-content/uploads/missing.png">"#);

    let mut ledger = RewriteLedger::new();
    let resolution = fixture
        .resolve(&ExportProfile::broad(), &rendered, &mut ledger)
        .await;

    assert_eq!(resolution.assets.len(), 1);
    assert_eq!(resolution.assets[0].outcome, AssetOutcome::Lost);
    assert_eq!(resolution.assets[0].filename, "missing.png");
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn files_already_in_the_bundle_are_skipped() {
    let fixture = Fixture::new().await;
    let attached = format!("{SITE}/wp-content/uploads/2020/01/Bild%20gro%C3%9F.jpg");
    let mut ledger = RewriteLedger::new();
    ledger.insert(attached.clone(), "Bild-gross.jpg");

    let rendered = format!(r#"<img src="{attached}">"#);
    let resolution = fixture
        .resolve(&ExportProfile::broad(), &rendered, &mut ledger)
        .await;

    assert!(resolution.is_empty());
    assert_eq!(ledger.len(), 1);
}

#[tokio::test]
async fn amp_encoded_urls_are_decoded_before_fetching() {
    let fixture = Fixture::new().await;
    let uri = fixture.server.uri();
    Mock::given(method("GET"))
        .and(path("/media/pic.png"))
        .and(query_param("a", "1"))
        .and(query_param("b", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"pic".to_vec(), "image/png"))
        .mount(&fixture.server)
        .await;

    let rendered = format!(r#"<img src="{uri}/media/pic.png?a=1&amp;b=2">"#);
    let mut ledger = RewriteLedger::new();
    let resolution = fixture
        .resolve(&ExportProfile::broad(), &rendered, &mut ledger)
        .await;

    assert_eq!(resolution.assets.len(), 1);
    assert_eq!(resolution.assets[0].url, format!("{uri}/media/pic.png?a=1&b=2"));
    assert_eq!(resolution.assets[0].outcome, AssetOutcome::RemoteFetched);
}

#[tokio::test]
async fn minimal_profile_ignores_documents_and_audio() {
    let fixture = Fixture::new().await;
    let rendered = format!(
        r#"<a href="{SITE}/files/report.pdf">pdf</a> <a href="{SITE}/files/song.mp3">mp3</a>"#
    );

    let mut ledger = RewriteLedger::new();
    let minimal = fixture
        .resolve(&ExportProfile::minimal(), &rendered, &mut ledger)
        .await;
    assert!(minimal.is_empty());

    let broad = fixture
        .resolve(&ExportProfile::broad(), &rendered, &mut ledger)
        .await;
    assert_eq!(broad.lost().len(), 2);
}

#[tokio::test]
async fn site_urls_cannot_reach_outside_the_content_root() {
    let fixture = Fixture::new().await;
    fs::write(fixture.temp.path().join("secret.png"), b"outside content root").unwrap();
    let rendered = format!(
        r#"<img src="{SITE}/../secret.png"> <img src="{SITE}/wp-content/%2e%2e/%2e%2e/secret.png">"#
    );

    let resolution = fixture.resolve_offline(&rendered).await;

    assert_eq!(resolution.assets.len(), 2);
    for asset in &resolution.assets {
        assert_eq!(asset.outcome, AssetOutcome::Lost, "{}", asset.url);
        assert_eq!(asset.filename, "example-com-secret.png");
    }
    assert!(!fixture.bundle().join("secret.png").exists());
    assert!(!fixture.bundle().join("example-com-secret.png").exists());
}

#[tokio::test]
async fn encoded_local_names_become_link_safe_filenames() {
    let fixture = Fixture::new().await;
    let uploads = fixture.content_root().join("wp-content/uploads/2020/01");
    fs::write(uploads.join("my pic.png"), b"spaced").unwrap();
    let rendered = format!(r#"<img src="{SITE}/wp-content/uploads/2020/01/my%20pic.png">"#);

    let resolution = fixture.resolve_offline(&rendered).await;

    assert_eq!(resolution.assets.len(), 1);
    assert_eq!(resolution.assets[0].outcome, AssetOutcome::LocalCopied);
    assert_eq!(resolution.assets[0].filename, "my-pic.png");
    assert_eq!(read(&fixture.bundle().join("my-pic.png")), b"spaced");
}

#[tokio::test]
async fn disallowed_content_types_are_not_stored() {
    let fixture = Fixture::new().await;
    let uri = fixture.server.uri();
    Mock::given(method("GET"))
        .and(path("/media/error.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"<html></html>".to_vec(), "text/html"))
        .mount(&fixture.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/ok.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"png".to_vec(), "image/png"))
        .mount(&fixture.server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings {
        allowed_content_types: vec!["image/png".to_string()],
        ..FetchSettings::default()
    });
    let rendered = format!(r#"<img src="{uri}/media/error.png"> <img src="{uri}/media/ok.png">"#);
    let mut ledger = RewriteLedger::new();
    let resolution = fixture
        .resolve_with(&fetcher, &ExportProfile::broad(), &rendered, &mut ledger)
        .await;

    let outcomes: Vec<(&str, AssetOutcome)> = resolution
        .assets
        .iter()
        .map(|asset| (asset.filename.as_str(), asset.outcome))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ("127-0-0-1-error.png", AssetOutcome::Lost),
            ("127-0-0-1-ok.png", AssetOutcome::RemoteFetched),
        ]
    );
    assert!(!fixture.bundle().join("127-0-0-1-error.png").exists());
}
