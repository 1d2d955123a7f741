//! Web UI route handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Form, Multipart, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use chrono::{Duration, Local};
use tera::Context;

use crate::app::AppState;
use crate::error::ServerError;
use crate::gate::{
    self, generate_access_token, Session, MAX_VALIDITY_DAYS, MIN_VALIDITY_DAYS,
};
use crate::panorama::{self, Scene, UploadedImage};
use crate::store::format_expiration;
use super::templates;

/// Create the web UI router with all routes
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(access_page))
        .route("/access", post(access_submit))
        .route("/viewer", get(viewer_page).post(viewer_upload))
        .route("/admin", get(admin_page))
        .route("/admin/login", post(admin_login))
        .route("/admin/tokens", get(tokens_page).post(generate_token_submit))
        .route("/admin/tokens/sweep", post(sweep_tokens))
}

/// Access code form
#[derive(serde::Deserialize)]
struct AccessForm {
    access_code: String,
}

/// Admin login form
#[derive(serde::Deserialize)]
struct AdminLoginForm {
    password: String,
}

/// Token generator form. Days arrive as text so a garbled value gets a
/// friendly message instead of a 422.
#[derive(serde::Deserialize)]
struct GenerateTokenForm {
    days: String,
}

/// Viewer access page, or the viewer itself once unlocked
async fn access_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if session_of(&state, &headers).is_some_and(|s| s.viewer.is_unlocked()) {
        return Redirect::to("/viewer").into_response();
    }

    let mut context = Context::new();
    if let Some(error) = query.get("error") {
        context.insert("error", error);
    }
    if let Some(message) = query.get("message") {
        context.insert("message", message);
    }
    render_template("access.html", &context)
}

/// Check an access code against the master key or the token store (POST)
async fn access_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<AccessForm>,
) -> Response {
    let store = state.store.as_ref();
    match gate::viewer_secret_matches(store, &state.config.master_key, &form.access_code).await {
        Ok(true) => {
            let sid = get_session_id(&headers).unwrap_or_else(|| state.sessions.create());
            state.sessions.unlock_viewer(&sid);
            redirect_with_session("/viewer", &sid)
        }
        Ok(false) => Redirect::to("/?error=Invalid+Password.").into_response(),
        Err(e) => {
            tracing::error!("Token lookup failed: {}", e);
            render_error("Could not validate the access code")
        }
    }
}

/// Upload form (GET)
async fn viewer_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if !session_of(&state, &headers).is_some_and(|s| s.viewer.is_unlocked()) {
        return Redirect::to("/?error=Please+enter+the+password+first").into_response();
    }

    let mut context = Context::new();
    context.insert("scenes", &Vec::<Scene>::new());
    render_template("viewer.html", &context)
}

/// Receive up to 3 images and render them as panoramas (POST)
async fn viewer_upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, ServerError> {
    if !session_of(&state, &headers).is_some_and(|s| s.viewer.is_unlocked()) {
        return Ok(Redirect::to("/?error=Please+enter+the+password+first").into_response());
    }

    let mut uploads: Vec<UploadedImage> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::Upload(e.to_string()))?
    {
        if field.name() != Some("images") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let declared = field.content_type().map(|ct| ct.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| ServerError::Upload(e.to_string()))?;

        // An empty part arrives when the picker is left blank
        if file_name.is_empty() && data.is_empty() {
            continue;
        }

        let content_type = content_type_for(&file_name, declared.as_deref());
        uploads.push(UploadedImage {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    let mut context = Context::new();
    match panorama::build_scenes(&uploads) {
        Ok(scenes) => {
            tracing::debug!("Rendering {} panorama(s)", scenes.len());
            context.insert("scenes", &scenes);
        }
        Err(warning) => {
            context.insert("scenes", &Vec::<Scene>::new());
            context.insert("warning", &warning.to_string());
        }
    }
    Ok(render_template("viewer.html", &context))
}

/// Admin login page, or the token generator panel once unlocked
async fn admin_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut context = Context::new();
    if let Some(error) = query.get("error") {
        context.insert("error", error);
    }

    if !session_of(&state, &headers).is_some_and(|s| s.admin.is_unlocked()) {
        return render_template("admin_login.html", &context);
    }

    if let Some(success) = query.get("success") {
        context.insert("success", success);
    }
    if let Some(created) = query.get("created") {
        context.insert("new_token", created);
        if let Some(expires) = query.get("expires") {
            context.insert("expires", expires);
        }
    }
    render_template("admin.html", &context)
}

/// Admin password check (POST)
async fn admin_login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<AdminLoginForm>,
) -> Response {
    if form.password != state.config.admin_password {
        return Redirect::to("/admin?error=Incorrect+password.").into_response();
    }

    let sid = get_session_id(&headers).unwrap_or_else(|| state.sessions.create());
    state.sessions.unlock_admin(&sid);
    redirect_with_session("/admin", &sid)
}

/// Generate a token with an admin-chosen validity window (POST)
async fn generate_token_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<GenerateTokenForm>,
) -> Result<Response, ServerError> {
    if !session_of(&state, &headers).is_some_and(|s| s.admin.is_unlocked()) {
        return Ok(Redirect::to("/admin").into_response());
    }

    let days: i64 = match form.days.trim().parse() {
        Ok(d) if (MIN_VALIDITY_DAYS..=MAX_VALIDITY_DAYS).contains(&d) => d,
        _ => {
            return Ok(
                Redirect::to("/admin?error=Validity+must+be+between+1+and+30+days")
                    .into_response(),
            )
        }
    };

    let token = generate_access_token();
    let expiration = Local::now().naive_local() + Duration::days(days);
    state.store.append(&token, expiration).await?;

    tracing::info!("Generated a token valid for {} day(s)", days);
    let expires = format_expiration(expiration).replace(' ', "+");
    Ok(Redirect::to(&format!("/admin?created={}&expires={}", token, expires)).into_response())
}

/// Remove expired rows from the store (POST)
async fn sweep_tokens(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    if !session_of(&state, &headers).is_some_and(|s| s.admin.is_unlocked()) {
        return Ok(Redirect::to("/admin").into_response());
    }

    let removed = state.store.sweep().await?;
    tracing::info!("Sweep removed {} expired row(s)", removed);
    Ok(Redirect::to(&format!(
        "/admin?success=Expired+tokens+cleared+({}+row{}+removed)",
        removed,
        if removed == 1 { "" } else { "s" }
    ))
    .into_response())
}

/// Table of every stored row (GET)
async fn tokens_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    if !session_of(&state, &headers).is_some_and(|s| s.admin.is_unlocked()) {
        return Ok(Redirect::to("/admin").into_response());
    }

    let records = state.store.list_all().await?;
    let mut context = Context::new();
    context.insert("records", &records);
    Ok(render_template("tokens.html", &context))
}

/// Extract the session id from the `sid` cookie
fn get_session_id(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        if let Some(sid) = part.trim().strip_prefix("sid=") {
            return Some(sid.to_string());
        }
    }
    None
}

/// Look up the session for a request, if any
fn session_of(state: &AppState, headers: &HeaderMap) -> Option<Session> {
    get_session_id(headers).and_then(|sid| state.sessions.get(&sid))
}

/// Redirect that also delivers the session cookie
fn redirect_with_session(location: &str, sid: &str) -> Response {
    Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header(header::LOCATION, location)
        .header(
            header::SET_COOKIE,
            format!("sid={}; Path=/; HttpOnly; SameSite=Lax", sid),
        )
        .body(Body::empty())
        .unwrap()
}

/// Pick a content type from the multipart declaration or the file extension
fn content_type_for(file_name: &str, declared: Option<&str>) -> String {
    if let Some(ct) = declared {
        if !ct.is_empty() && ct != "application/octet-stream" {
            return ct.to_string();
        }
    }
    match file_name
        .rsplit('.')
        .next()
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg".to_string(),
        Some("png") => "image/png".to_string(),
        _ => "application/octet-stream".to_string(),
    }
}

/// Helper to render a template
fn render_template(name: &str, context: &Context) -> Response {
    match templates::render(name, context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Template error: {}", e)).into_response()
        }
    }
}

/// Helper to render an error page
fn render_error(message: &str) -> Response {
    let mut context = Context::new();
    context.insert("message", message);

    match templates::render("error.html", &context) {
        Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, message.to_string()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_read_from_the_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "other=1; sid=abc123; theme=dark".parse().unwrap(),
        );
        assert_eq!(get_session_id(&headers).as_deref(), Some("abc123"));

        let empty = HeaderMap::new();
        assert_eq!(get_session_id(&empty), None);
    }

    #[test]
    fn content_type_falls_back_to_the_extension() {
        assert_eq!(content_type_for("photo.JPG", None), "image/jpeg");
        assert_eq!(content_type_for("pano.png", Some("")), "image/png");
        assert_eq!(content_type_for("pano.png", Some("image/png")), "image/png");
        assert_eq!(
            content_type_for("notes.txt", None),
            "application/octet-stream"
        );
    }

    #[test]
    fn session_cookie_is_set_on_unlock_redirect() {
        let response = redirect_with_session("/viewer", "abc123");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("sid=abc123;"));
        assert!(cookie.contains("HttpOnly"));
    }
}
