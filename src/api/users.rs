/// User profile pages and form endpoints
use crate::{
    api::{
        flash::Flash,
        views::{AddView, EditView, ListView},
    },
    blob_store::IMAGE_FIELD,
    context::AppContext,
    error::{ProfileError, ProfileResult},
    record_service::Upload,
    record_store::UserFields,
};
use axum::{
    extract::{Multipart, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;

/// Build user routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(list_users))
        .route("/add", get(add_form).post(add_user))
        .route("/edit/:id", get(edit_form))
        .route("/update/:id", post(update_user))
        .route("/delete/:id", get(delete_user))
}

/// Parsed multipart submission of the add and edit forms
#[derive(Debug, Default)]
pub struct UserForm {
    pub fields: UserFields,
    pub upload: Option<Upload>,
    pub old_image: Option<String>,
}

impl UserForm {
    pub async fn from_multipart(mut multipart: Multipart) -> ProfileResult<Self> {
        let mut name = String::new();
        let mut email = String::new();
        let mut phone = String::new();
        let mut form = UserForm::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            ProfileError::Validation(format!("Failed to process multipart: {}", e))
        })? {
            let field_name = field.name().unwrap_or("").to_string();

            if field_name == IMAGE_FIELD {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(|e| {
                    ProfileError::Validation(format!("Failed to read file: {}", e))
                })?;
                // Browsers send an empty part when no file was chosen
                if !file_name.is_empty() || !data.is_empty() {
                    form.upload = Some(Upload {
                        file_name,
                        data: data.to_vec(),
                    });
                }
                continue;
            }

            let value = field.text().await.map_err(|e| {
                ProfileError::Validation(format!("Failed to read field {}: {}", field_name, e))
            })?;
            match field_name.as_str() {
                "name" => name = value,
                "email" => email = value,
                "phone" => phone = value,
                "old_image" => {
                    let value = value.trim();
                    if !value.is_empty() {
                        form.old_image = Some(value.to_string());
                    }
                }
                other => tracing::debug!("Ignoring unknown form field {}", other),
            }
        }

        form.fields = UserFields::new(&name, &email, &phone);
        Ok(form)
    }
}

/// Redirect carrying a one-shot message
fn redirect_with(jar: CookieJar, to: &str, flash: Flash) -> Response {
    (flash.set(jar), Redirect::to(to)).into_response()
}

/// GET / - all users
async fn list_users(
    State(ctx): State<AppContext>,
    jar: CookieJar,
) -> ProfileResult<impl IntoResponse> {
    let users = ctx.record_service.list().await?;
    let (jar, message) = Flash::take(jar);

    Ok((jar, Html(ListView::new(users, message).render())))
}

/// GET /add - add form
async fn add_form(jar: CookieJar) -> impl IntoResponse {
    let (jar, message) = Flash::take(jar);
    (jar, Html(AddView::new(message).render()))
}

/// POST /add - create a user from the submitted form
async fn add_user(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, ProfileError> {
    let form = UserForm::from_multipart(multipart).await?;

    match ctx.record_service.add(form.fields, form.upload).await {
        Ok(_) => Ok(redirect_with(jar, "/", Flash::success("User added successfully"))),
        Err(ProfileError::Validation(msg)) => Ok(redirect_with(jar, "/add", Flash::danger(msg))),
        Err(e) => Err(e),
    }
}

/// GET /edit/:id - edit form for one user
async fn edit_form(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> ProfileResult<impl IntoResponse> {
    let user = ctx.record_service.get_for_edit(&id).await?;
    let (jar, message) = Flash::take(jar);

    Ok((jar, Html(EditView::new(user, message).render())))
}

/// POST /update/:id - apply the edit form
async fn update_user(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, ProfileError> {
    let form = UserForm::from_multipart(multipart).await?;

    let result = ctx
        .record_service
        .update(&id, form.fields, form.upload, form.old_image.as_deref())
        .await;

    match result {
        Ok(_) => Ok(redirect_with(jar, "/", Flash::success("User updated successfully"))),
        Err(ProfileError::Validation(msg)) => {
            let back = format!("/edit/{}", urlencoding::encode(&id));
            Ok(redirect_with(jar, &back, Flash::danger(msg)))
        }
        Err(ProfileError::NotFound(msg)) => Ok(redirect_with(jar, "/", Flash::danger(msg))),
        Err(e) => Err(e),
    }
}

/// GET /delete/:id - delete a user and its image
async fn delete_user(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> ProfileResult<Response> {
    ctx.record_service.delete(&id).await?;
    Ok(redirect_with(jar, "/", Flash::success("User deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::test_config, server::build_router};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "profile-test-boundary";

    async fn test_ctx() -> (AppContext, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::new(test_config(dir.path())).await.unwrap();
        (ctx, dir)
    }

    fn stored(dir: &TempDir, name: &str) -> bool {
        dir.path().join("uploads").join(name).exists()
    }

    /// Build a multipart body from text fields and an optional image
    fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, data)) = image {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                    BOUNDARY, file_name
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn post_form(uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn ada<'a>() -> Vec<(&'a str, &'a str)> {
        vec![
            ("name", "Ada Lovelace"),
            ("email", "ada@example.com"),
            ("phone", "555-0100"),
        ]
    }

    fn set_cookie(response: &Response) -> String {
        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_add_redirects_with_flash() {
        let (ctx, dir) = test_ctx().await;
        let app = build_router(ctx.clone());

        let body = multipart_body(&ada(), Some(("ada.png", &b"png"[..])));
        let response = app.oneshot(post_form("/add", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
        assert!(set_cookie(&response).starts_with("flash=success."));

        let users = ctx.record_service.list().await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(stored(&dir, &users[0].image));
    }

    #[tokio::test]
    async fn test_add_without_file_flashes_danger() {
        let (ctx, _dir) = test_ctx().await;
        let app = build_router(ctx.clone());

        let response = app
            .oneshot(post_form("/add", multipart_body(&ada(), None)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/add");
        assert!(set_cookie(&response).starts_with("flash=danger."));
        assert!(ctx.record_service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_renders_and_consumes_flash() {
        let (ctx, _dir) = test_ctx().await;
        ctx.record_service
            .add(
                UserFields::new("Ada Lovelace", "ada@example.com", "555-0100"),
                Some(Upload {
                    file_name: "ada.png".to_string(),
                    data: b"png".to_vec(),
                }),
            )
            .await
            .unwrap();
        let app = build_router(ctx);

        let cookie = Flash::success("User added successfully")
            .set(CookieJar::new())
            .get("flash")
            .unwrap()
            .value()
            .to_string();
        let request = Request::builder()
            .uri("/")
            .header(header::COOKIE, format!("flash={}", cookie))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        // Removal cookie clears the message for the next request
        assert!(set_cookie(&response).starts_with("flash=;"));
        let html = body_string(response).await;
        assert!(html.contains("User added successfully"));
        assert!(html.contains("Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_edit_missing_user_is_not_found() {
        let (ctx, _dir) = test_ctx().await;
        let app = build_router(ctx);

        let response = app.oneshot(get("/edit/nope")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["type"], "danger");
    }

    #[tokio::test]
    async fn test_update_replaces_image() {
        let (ctx, dir) = test_ctx().await;
        let user = ctx
            .record_service
            .add(
                UserFields::new("Ada Lovelace", "ada@example.com", "555-0100"),
                Some(Upload {
                    file_name: "old.png".to_string(),
                    data: b"old".to_vec(),
                }),
            )
            .await
            .unwrap();
        let app = build_router(ctx.clone());

        let mut fields = ada();
        fields.push(("old_image", user.image.as_str()));
        let body = multipart_body(&fields, Some(("new.png", &b"new"[..])));
        let response = app
            .oneshot(post_form(&format!("/update/{}", user.id), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let updated = ctx.record_service.get_for_edit(&user.id).await.unwrap();
        assert!(updated.image.ends_with("_new.png"));
        assert!(!stored(&dir, &user.image));
    }

    #[tokio::test]
    async fn test_update_with_empty_file_part_keeps_image() {
        let (ctx, dir) = test_ctx().await;
        let user = ctx
            .record_service
            .add(
                UserFields::new("Ada Lovelace", "ada@example.com", "555-0100"),
                Some(Upload {
                    file_name: "keep.png".to_string(),
                    data: b"keep".to_vec(),
                }),
            )
            .await
            .unwrap();
        let app = build_router(ctx.clone());

        let fields = vec![
            ("name", "Ada King"),
            ("email", "ada@example.com"),
            ("phone", "555-0100"),
            ("old_image", user.image.as_str()),
        ];
        let body = multipart_body(&fields, Some(("", &b""[..])));
        let response = app
            .oneshot(post_form(&format!("/update/{}", user.id), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let updated = ctx.record_service.get_for_edit(&user.id).await.unwrap();
        assert_eq!(updated.name, "Ada King");
        assert_eq!(updated.image, user.image);
        assert!(stored(&dir, &user.image));
    }

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let (ctx, dir) = test_ctx().await;
        let user = ctx
            .record_service
            .add(
                UserFields::new("Ada Lovelace", "ada@example.com", "555-0100"),
                Some(Upload {
                    file_name: "ada.png".to_string(),
                    data: b"png".to_vec(),
                }),
            )
            .await
            .unwrap();
        let app = build_router(ctx.clone());
        let uri = format!("/delete/{}", user.id);

        let first = app.clone().oneshot(get(&uri)).await.unwrap();
        assert_eq!(first.status(), StatusCode::SEE_OTHER);
        assert!(!stored(&dir, &user.image));

        let second = app.oneshot(get(&uri)).await.unwrap();
        assert_eq!(second.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_uploaded_image_is_served() {
        let (ctx, _dir) = test_ctx().await;
        let user = ctx
            .record_service
            .add(
                UserFields::new("Ada Lovelace", "ada@example.com", "555-0100"),
                Some(Upload {
                    file_name: "ada.png".to_string(),
                    data: b"png bytes".to_vec(),
                }),
            )
            .await
            .unwrap();
        let app = build_router(ctx);

        let response = app
            .oneshot(get(&crate::api::views::upload_url(&user.image)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "png bytes");
    }
}
