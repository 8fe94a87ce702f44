use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use serde_json::{json, Value};
use tempfile::TempDir;
use wg_api::{configure_routes, middleware, AppState};
use wg_db_sqlite::SqliteGalleryRepo;
use wg_storage_local::LocalMediaStore;

const BOUNDARY: &str = "----wgtestboundary";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRtest-picture";

struct Fixture {
    state: web::Data<AppState>,
    uploads: TempDir,
}

async fn fixture_with_limit(max_upload_bytes: usize) -> Fixture {
    let uploads = tempfile::tempdir().unwrap();
    let state = web::Data::new(AppState {
        repo: Box::new(SqliteGalleryRepo::in_memory().await.unwrap()),
        store: Box::new(LocalMediaStore::new(uploads.path().to_path_buf())),
        max_upload_bytes,
    });
    Fixture { state, uploads }
}

async fn fixture() -> Fixture {
    fixture_with_limit(1024 * 1024).await
}

macro_rules! app {
    ($fixture:expr) => {
        test::init_service(
            App::new()
                .app_data($fixture.state.clone())
                .wrap(middleware::normalize_path())
                .configure(configure_routes),
        )
        .await
    };
}

fn multipart_body(fields: &[(&str, &str)], picture: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    if let Some((filename, content_type, data)) = picture {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"picture\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(fields: &[(&str, &str)], picture: Option<(&str, &str, &[u8])>) -> Request {
    test::TestRequest::post()
        .uri("/api/images/")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_body(fields, picture))
        .to_request()
}

async fn create_image<S, B>(app: &S, title: &str, author: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = upload_request(
        &[("title", title), ("author", author)],
        Some(("test-picture.png", "image/png", PNG)),
    );
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK, "image upload should succeed");
    test::read_body_json(resp).await
}

async fn create_comment<S, B>(app: &S, image_id: &str, content: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/comments/")
        .set_json(json!({ "imageId": image_id, "author": "test-author", "content": content }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK, "comment creation should succeed");
    test::read_body_json(resp).await
}

async fn get<S, B>(app: &S, uri: &str) -> (StatusCode, actix_web::web::Bytes)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, test::TestRequest::get().uri(uri).to_request()).await;
    let status = resp.status();
    (status, test::read_body(resp).await)
}

async fn get_json<S, B>(app: &S, uri: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = get(app, uri).await;
    assert_eq!(status, StatusCode::OK, "GET {uri}");
    serde_json::from_slice(&body).unwrap()
}

async fn delete<S, B>(app: &S, uri: &str) -> (StatusCode, actix_web::web::Bytes)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, test::TestRequest::delete().uri(uri).to_request()).await;
    let status = resp.status();
    (status, test::read_body(resp).await)
}

fn id_of(value: &Value) -> String {
    value["_id"].as_str().unwrap().to_string()
}

#[actix_web::test]
async fn test_create_and_fetch_image() {
    let fx = fixture().await;
    let app = app!(fx);

    let image = create_image(&app, "test-title", "test-author").await;
    assert_eq!(image["title"], "test-title");
    assert_eq!(image["author"], "test-author");
    assert_eq!(image["picture"]["mimetype"], "image/png");
    assert_eq!(image["picture"]["originalname"], "test-picture.png");
    let id = id_of(&image);

    let fetched = get_json(&app, &format!("/api/images/{id}/")).await;
    assert_eq!(fetched, image);

    let all = get_json(&app, "/api/images/").await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_picture_is_served_with_its_mime_type() {
    let fx = fixture().await;
    let app = app!(fx);
    let id = id_of(&create_image(&app, "t", "a").await);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri(&format!("/api/images/{id}/picture/")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
    assert_eq!(&test::read_body(resp).await[..], PNG);

    let (status, body) = get(&app, &format!("/api/images/{}/picture/", uuid::Uuid::nil())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, format!("Image:{} does not exist", uuid::Uuid::nil()));
}

#[actix_web::test]
async fn test_large_picture_is_streamed_back_whole() {
    let fx = fixture().await;
    let app = app!(fx);

    let mut picture = PNG.to_vec();
    picture.extend((0..200_000u32).map(|i| (i % 251) as u8));
    let req = upload_request(&[("title", "big"), ("author", "a")], Some(("big.png", "image/png", &picture[..])));
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let image: Value = test::read_body_json(resp).await;
    assert_eq!(image["picture"]["size"], picture.len() as u64);

    let (status, body) = get(&app, &format!("/api/images/{}/picture", id_of(&image))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], &picture[..]);
}

#[actix_web::test]
async fn test_unknown_image_is_not_found() {
    let fx = fixture().await;
    let app = app!(fx);

    let (status, body) = get(&app, "/api/images/not-a-real-id/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Image id #not-a-real-id does not exist");
}

#[actix_web::test]
async fn test_upload_validation() {
    let fx = fixture_with_limit(16).await;
    let app = app!(fx);

    // missing title
    let req = upload_request(&[("author", "a")], Some(("p.png", "image/png", &b"\x89PNG\r\n\x1a\n"[..])));
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    // missing picture
    let req = upload_request(&[("title", "t"), ("author", "a")], None);
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    // not an image
    let req = upload_request(&[("title", "t"), ("author", "a")], Some(("notes.txt", "text/plain", &b"hello"[..])));
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    // too large
    let req = upload_request(&[("title", "t"), ("author", "a")], Some(("p.png", "image/png", PNG)));
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let all = get_json(&app, "/api/images").await;
    assert!(all.as_array().unwrap().is_empty());
    assert_eq!(std::fs::read_dir(fx.uploads.path()).unwrap().count(), 0);
}

#[actix_web::test]
async fn test_oldest_and_latest_status() {
    let fx = fixture().await;
    let app = app!(fx);

    // Empty gallery answers false rather than failing
    let status = get_json(&app, &format!("/api/images/{}/status/isOldest", uuid::Uuid::nil())).await;
    assert_eq!(status, json!({ "isOldestImage": false }));

    let first = id_of(&create_image(&app, "first", "a").await);
    assert_eq!(
        get_json(&app, &format!("/api/images/{first}/status/isOldest")).await,
        json!({ "isOldestImage": true })
    );
    assert_eq!(
        get_json(&app, &format!("/api/images/{first}/status/isLatest")).await,
        json!({ "isLatestImage": true })
    );

    let second = id_of(&create_image(&app, "second", "a").await);
    assert_eq!(
        get_json(&app, &format!("/api/images/{first}/status/isLatest")).await,
        json!({ "isLatestImage": false })
    );
    assert_eq!(
        get_json(&app, &format!("/api/images/{second}/status/isLatest/")).await,
        json!({ "isLatestImage": true })
    );
    assert_eq!(
        get_json(&app, &format!("/api/images/{second}/status/isOldest")).await,
        json!({ "isOldestImage": false })
    );
}

#[actix_web::test]
async fn test_previous_and_next_navigation() {
    let fx = fixture().await;
    let app = app!(fx);

    let i1 = id_of(&create_image(&app, "test-title", "test-author").await);
    let i2 = id_of(&create_image(&app, "test-title2", "test-author2").await);

    let previous = get_json(&app, &format!("/api/images/{i1}/previous")).await;
    assert_eq!(id_of(&previous), i2);
    assert_eq!(previous["title"], "test-title2");

    let next = get_json(&app, &format!("/api/images/{i2}/next")).await;
    assert_eq!(id_of(&next), i1);

    let (status, body) = get(&app, &format!("/api/images/{i2}/previous")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "No previous image");

    let (status, body) = get(&app, &format!("/api/images/{i1}/next")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "No next image");

    let ghost = uuid::Uuid::now_v7();
    let (status, body) = get(&app, &format!("/api/images/{ghost}/next")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, format!("Image id #{ghost} does not exist"));

    let listed = get_json(&app, "/api/images").await;
    let order: Vec<String> = listed.as_array().unwrap().iter().map(id_of).collect();
    assert_eq!(order, vec![i2, i1]);
}

#[actix_web::test]
async fn test_comment_lifecycle() {
    let fx = fixture().await;
    let app = app!(fx);
    let image_id = id_of(&create_image(&app, "t", "a").await);

    let comment = create_comment(&app, &image_id, "test-content").await;
    assert_eq!(comment["imageId"], image_id);
    assert_eq!(comment["content"], "test-content");

    let page = get_json(&app, &format!("/api/comments/{image_id}/0")).await;
    assert_eq!(page.as_array().unwrap().len(), 1);
    assert_eq!(
        get_json(&app, &format!("/api/comments/{image_id}/0/isLastPage/")).await,
        json!({ "isLastPage": true })
    );

    let comment_id = id_of(&comment);
    let (status, body) = delete(&app, &format!("/api/comments/{comment_id}/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), comment);

    let (status, body) = delete(&app, &format!("/api/comments/{comment_id}/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, format!("Comment id #{comment_id} does not exists"));

    let page = get_json(&app, &format!("/api/comments/{image_id}/0/")).await;
    assert!(page.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_comment_on_unknown_image_is_rejected() {
    let fx = fixture().await;
    let app = app!(fx);
    let ghost = uuid::Uuid::now_v7();

    let req = test::TestRequest::post()
        .uri("/api/comments")
        .set_json(json!({ "imageId": ghost.to_string(), "author": "a", "content": "c" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(test::read_body(resp).await, format!("Image with ID:{ghost} does not exist"));

    // Missing fields are a validation failure
    let image_id = id_of(&create_image(&app, "t", "a").await);
    let req = test::TestRequest::post()
        .uri("/api/comments")
        .set_json(json!({ "imageId": image_id }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/comments")
        .set_json(json!({ "imageId": image_id, "author": "  ", "content": "c" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_fifteen_comments_paginate_into_ten_and_five() {
    let fx = fixture().await;
    let app = app!(fx);
    let image_id = id_of(&create_image(&app, "t", "a").await);

    for n in 0..15 {
        create_comment(&app, &image_id, &format!("comment {n}")).await;
    }

    let first = get_json(&app, &format!("/api/comments/{image_id}/0/")).await;
    assert_eq!(first.as_array().unwrap().len(), 10);
    assert_eq!(first[0]["content"], "comment 14", "newest comment comes first");
    assert_eq!(
        get_json(&app, &format!("/api/comments/{image_id}/0/isLastPage")).await,
        json!({ "isLastPage": false })
    );

    let second = get_json(&app, &format!("/api/comments/{image_id}/1/")).await;
    assert_eq!(second.as_array().unwrap().len(), 5);
    assert_eq!(second[4]["content"], "comment 0");
    assert_eq!(
        get_json(&app, &format!("/api/comments/{image_id}/1/isLastPage")).await,
        json!({ "isLastPage": true })
    );

    let beyond = get_json(&app, &format!("/api/comments/{image_id}/7/")).await;
    assert!(beyond.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_invalid_page_numbers_are_rejected() {
    let fx = fixture().await;
    let app = app!(fx);
    let image_id = uuid::Uuid::now_v7();

    for page in ["-1", "first"] {
        let (status, body) = get(&app, &format!("/api/comments/{image_id}/{page}/")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, format!("Invalid page number: {page}"));

        let (status, _) = get(&app, &format!("/api/comments/{image_id}/{page}/isLastPage")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[actix_web::test]
async fn test_delete_image_cascades_to_comments_and_file() {
    let fx = fixture().await;
    let app = app!(fx);

    let doomed = create_image(&app, "doomed", "a").await;
    let doomed_id = id_of(&doomed);
    let kept_id = id_of(&create_image(&app, "kept", "a").await);
    for n in 0..3 {
        create_comment(&app, &doomed_id, &format!("c{n}")).await;
    }
    create_comment(&app, &kept_id, "survivor").await;

    let picture_path = fx.uploads.path().join(doomed["picture"]["path"].as_str().unwrap());
    assert!(picture_path.exists());

    let (status, body) = delete(&app, &format!("/api/images/{doomed_id}/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), doomed);

    assert!(!picture_path.exists());
    let listed = get_json(&app, "/api/images/").await;
    let ids: Vec<String> = listed.as_array().unwrap().iter().map(id_of).collect();
    assert_eq!(ids, vec![kept_id.clone()]);

    let comments = fx.state.repo.count_comments(doomed_id.parse().unwrap()).await.unwrap();
    assert_eq!(comments, 0);
    let survivors = fx.state.repo.count_comments(kept_id.parse().unwrap()).await.unwrap();
    assert_eq!(survivors, 1);

    let (status, body) = delete(&app, &format!("/api/images/{doomed_id}/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, format!("Image id #{doomed_id} does not exists"));
}

#[actix_web::test]
async fn test_health_check() {
    let fx = fixture().await;
    let app = app!(fx);

    let health = get_json(&app, "/health").await;
    assert_eq!(health["status"], "healthy");
}
