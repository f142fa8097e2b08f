use std::net::SocketAddr;
use std::path::PathBuf;

use configs::AppConfig;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

struct TestApp {
    base_url: String,
    root: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

async fn start_server() -> anyhow::Result<TestApp> {
    let root = std::env::temp_dir().join(format!("archviz_e2e_{}", Uuid::new_v4()));
    std::fs::create_dir_all(root.join("json"))?;
    std::fs::write(root.join("collab-animation.html"), "<html><body>collab</body></html>")?;
    std::fs::write(root.join("json").join("order-flow.json"), r#"{"title":"Order Flow","nodes":[]}"#)?;

    let mut cfg = AppConfig::default();
    cfg.catalog.static_root = root.display().to_string();
    cfg.catalog.json_dirs = vec![root.join("json").display().to_string()];

    let app = server::startup::build_app(&cfg).await?;
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = server::startup::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { base_url, root })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().build().expect("reqwest client")
}

#[tokio::test]
async fn e2e_diagram_flow_over_http() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let res = c
        .post(format!("{}/api/diagrams", app.base_url))
        .json(&json!({"title": "Checkout", "tags": ["ecommerce"], "flow": {"nodes": [{"id": "a"}]}}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let created: Value = res.json().await?;
    let id = created["id"].as_str().unwrap_or_default().to_string();

    let res = c
        .put(format!("{}/api/diagrams/{}", app.base_url, id))
        .json(&json!({"description": "v2"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["version"], 2);
    assert_eq!(updated["flow"], created["flow"]);

    let list: Value = c.get(format!("{}/api/diagrams", app.base_url)).send().await?.json().await?;
    let ids: Vec<String> = list
        .as_array()
        .map(|a| a.iter().filter_map(|d| d["id"].as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    assert_eq!(ids, vec![id.clone(), "file-order-flow".to_string()]);

    let res = c.delete(format!("{}/api/diagrams/{}", app.base_url, id)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    let res = c.get(format!("{}/api/diagrams/{}", app.base_url, id)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_html_pages_and_listing() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c
        .get(format!("{}/collab-animation.html", app.base_url))
        .header("X-Forwarded-For", "192.168.1.100")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert!(res.text().await?.contains("collab"));

    let listing = c.get(format!("{}/json/", app.base_url)).send().await?.text().await?;
    assert!(listing.contains("<a href=\"order-flow.json\">order-flow.json</a><br>"));
    Ok(())
}
