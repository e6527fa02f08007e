mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use common::{
    TestAppBuilder, body_json, create_test_course, create_test_user, empty_request,
    generate_unique_email, json_request,
};
use learnsmart::learnsmart_models::UserRole;

const BOUNDARY: &str = "learnsmart-test-boundary";

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, content)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(module_id: Uuid, token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/instructor/modules/{}/materials/upload", module_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn insert_module(pool: &PgPool, course_id: Uuid) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO modules (course_id, title, order_index) VALUES ($1, 'Module', 0) RETURNING id",
    )
    .bind(course_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_link_material_crud(pool: PgPool) {
    let instructor = create_test_user(&pool, &generate_unique_email(), UserRole::Instructor).await;
    let course_id = create_test_course(&pool, "Links", Some(instructor.id)).await;
    let module_id = insert_module(&pool, course_id).await;
    let app = TestAppBuilder::new(pool).build();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/instructor/modules/{}/materials", module_id),
            Some(&instructor.token),
            json!({
                "title": "Docs",
                "material_type": "link",
                "url": "ftp://example.com/docs"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/instructor/modules/{}/materials", module_id),
            Some(&instructor.token),
            json!({
                "title": "Docs",
                "material_type": "link",
                "url": "https://doc.rust-lang.org/book/"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let material = body_json(response).await;
    assert_eq!(material["course_id"], course_id.to_string());
    let material_id = material["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/instructor/materials/{}", material_id),
            Some(&instructor.token),
            json!({ "title": "The Book" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["title"], "The Book");

    let response = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/instructor/materials/{}", material_id),
            Some(&instructor.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request(
            "GET",
            &format!("/api/instructor/modules/{}/materials", module_id),
            Some(&instructor.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upload_stores_file(pool: PgPool) {
    let instructor = create_test_user(&pool, &generate_unique_email(), UserRole::Instructor).await;
    let course_id = create_test_course(&pool, "Uploads", Some(instructor.id)).await;
    let module_id = insert_module(&pool, course_id).await;
    let storage_dir = TempDir::new().unwrap();
    let app = TestAppBuilder::new(pool.clone())
        .storage_dir(storage_dir.path().to_path_buf())
        .build();

    let body = multipart_body(
        &[("title", "Syllabus"), ("material_type", "document")],
        Some(("syllabus.pdf", "application/pdf", b"%PDF-1.4 test")),
    );
    let response = app
        .clone()
        .oneshot(upload_request(module_id, &instructor.token, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let material = body_json(response).await;
    assert_eq!(material["mime_type"], "application/pdf");
    assert_eq!(material["file_size"], 13);
    assert!(material["url"].as_str().unwrap().ends_with(".pdf"));

    let key =
        sqlx::query_scalar::<_, String>("SELECT file_path FROM course_materials WHERE id = $1")
            .bind(Uuid::parse_str(material["id"].as_str().unwrap()).unwrap())
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(key.starts_with(&format!("materials/{}/{}/", course_id, module_id)));
    let stored = storage_dir.path().join(&key);
    assert_eq!(std::fs::read(&stored).unwrap(), b"%PDF-1.4 test");

    let response = app
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/instructor/materials/{}", material["id"].as_str().unwrap()),
            Some(&instructor.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!stored.exists());

}

#[sqlx::test(migrations = "./migrations")]
async fn test_upload_rejections(pool: PgPool) {
    let instructor = create_test_user(&pool, &generate_unique_email(), UserRole::Instructor).await;
    let course_id = create_test_course(&pool, "Rejected uploads", Some(instructor.id)).await;
    let module_id = insert_module(&pool, course_id).await;
    let storage_dir = TempDir::new().unwrap();
    let app = TestAppBuilder::new(pool.clone())
        .storage_dir(storage_dir.path().to_path_buf())
        .build();

    let body = multipart_body(
        &[("title", "Installer")],
        Some(("setup.exe", "application/x-msdownload", b"MZ")),
    );
    let response = app
        .clone()
        .oneshot(upload_request(module_id, &instructor.token, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = multipart_body(&[("title", "No file")], None);
    let response = app
        .clone()
        .oneshot(upload_request(module_id, &instructor.token, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "file is required");

    let body = multipart_body(&[], Some(("notes.txt", "text/plain", b"notes")));
    let response = app
        .oneshot(upload_request(module_id, &instructor.token, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "title is required");

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM course_materials")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);

}
