use axum::{extract::State, response::Html};

use crate::routes::ServerState;

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn render_listing(files: &[String]) -> String {
    let mut html = String::from("<html><body>");
    for f in files {
        let f = html_escape(f);
        html.push_str(&format!("<a href=\"{f}\">{f}</a><br>"));
    }
    html.push_str("</body></html>");
    html
}

/// HTML index of the catalog files, one link per filename.
#[utoipa::path(get, path = "/json/", tag = "catalog", responses((status = 200, description = "HTML listing", content_type = "text/html", body = String)))]
pub async fn list_json_files(State(state): State<ServerState>) -> Html<String> {
    let files = state.service.catalog().list_json_files().await;
    Html(render_listing(&files))
}
