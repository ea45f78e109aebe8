use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ::common::storage::UploadStore;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use tempfile::TempDir;

use pdfdesk::config::{AppConfig, AuthConfig, DatabaseConfig, ServerConfig, StorageConfig};
use pdfdesk::entity::{file, user};
use pdfdesk::state::AppState;

/// Upload limit for test servers. Small enough to exceed cheaply.
pub const TEST_MAX_UPLOAD_SIZE: u64 = 1024 * 1024;

pub const TEST_SESSION_SECRET: &str = "test-secret-for-integration-tests";

pub mod routes {
    pub const HOME: &str = "/";
    pub const REGISTER: &str = "/register";
    pub const LOGIN: &str = "/login";
    pub const LOGOUT: &str = "/logout";
    pub const DASHBOARD: &str = "/dashboard";
    pub const UPLOAD: &str = "/upload";
    pub const EXTRACT_TEXT: &str = "/extract_text";

    pub fn extract_text(file_id: i32) -> String {
        format!("/extract_text?file_id={file_id}")
    }
}

/// A running test server backed by a throwaway SQLite file and upload directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub db: DatabaseConnection,
    pub upload_dir: PathBuf,
    _workdir: TempDir,
}

/// One browser: a cookie store that does not follow redirects.
pub struct Browser {
    base: String,
    client: Client,
}

/// Parsed HTTP response for test assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    /// `Location` header of a redirect.
    pub location: Option<String>,
    pub text: String,
}

impl TestResponse {
    async fn from_response(res: Response) -> Self {
        let status = res.status().as_u16();
        let location = res
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let text = res.text().await.expect("Failed to read response body");
        Self {
            status,
            location,
            text,
        }
    }

    /// Assert a 303 to `path`.
    #[track_caller]
    pub fn assert_redirect(&self, path: &str) {
        assert_eq!(self.status, 303, "expected redirect, got: {}", self.text);
        assert_eq!(self.location.as_deref(), Some(path));
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let workdir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!(
            "sqlite://{}?mode=rwc",
            workdir.path().join("test.db").display()
        );
        let db = pdfdesk::database::init_db(&db_url)
            .await
            .expect("Failed to initialize test database");

        let upload_dir = workdir.path().join("uploads");
        let uploads = UploadStore::new(upload_dir.clone(), TEST_MAX_UPLOAD_SIZE)
            .await
            .expect("Failed to create upload store");

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig { url: db_url },
            auth: AuthConfig {
                session_secret: TEST_SESSION_SECRET.to_string(),
                session_ttl_hours: 1,
            },
            storage: StorageConfig {
                upload_dir: upload_dir.clone(),
                max_upload_size: TEST_MAX_UPLOAD_SIZE,
            },
        };

        let state = AppState {
            db: db.clone(),
            config: Arc::new(app_config),
            uploads: Arc::new(uploads),
        };
        let app = pdfdesk::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            db,
            upload_dir,
            _workdir: workdir,
        }
    }

    /// A fresh browser with an empty cookie store.
    pub fn browser(&self) -> Browser {
        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to build HTTP client");
        Browser {
            base: format!("http://{}", self.addr),
            client,
        }
    }

    /// A browser that has registered and logged in as `email`, with no
    /// flash messages left pending.
    pub async fn signed_in(&self, name: &str, email: &str, password: &str) -> Browser {
        let browser = self.browser();
        browser
            .register(name, email, password)
            .await
            .assert_redirect(routes::LOGIN);
        let res = browser.login(email, password).await;
        res.assert_redirect(routes::DASHBOARD);
        assert_eq!(browser.follow(&res).await.status, 200);
        browser
    }

    pub async fn user_count(&self) -> u64 {
        user::Entity::find().count(&self.db).await.unwrap()
    }

    pub async fn file_count(&self) -> u64 {
        file::Entity::find().count(&self.db).await.unwrap()
    }

    pub async fn files(&self) -> Vec<file::Model> {
        file::Entity::find().all(&self.db).await.unwrap()
    }

    /// Names of committed uploads, ignoring the staging directory.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.upload_dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Number of half-written uploads left in the staging directory.
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.upload_dir.join(".tmp"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

impl Browser {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_cookie(&self, path: &str, cookie: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header(reqwest::header::COOKIE, cookie)
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    /// Follow a redirect and return the page it lands on.
    pub async fn follow(&self, res: &TestResponse) -> TestResponse {
        let location = res
            .location
            .as_deref()
            .unwrap_or_else(|| panic!("not a redirect: {} {}", res.status, res.text));
        self.get(location).await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> TestResponse {
        self.post_form(
            routes::REGISTER,
            &[("name", name), ("email", email), ("password", password)],
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post_form(routes::LOGIN, &[("email", email), ("password", password)])
            .await
    }

    pub async fn upload(&self, file_name: &str, file_bytes: Vec<u8>) -> TestResponse {
        let part = reqwest::multipart::Part::bytes(file_bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .expect("Failed to set MIME type");
        let form = reqwest::multipart::Form::new().part("pdf_file", part);

        let res = self
            .client
            .post(self.url(routes::UPLOAD))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }
}

/// Build a PDF with one page per entry, each showing that text.
pub fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Write bytes under `dir`, returning the full path.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
