mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use common::{
    body_json, create_test_course, create_test_user, empty_request, generate_unique_email,
    json_request, setup_test_app,
};
use learnsmart::learnsmart_models::UserRole;

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
async fn test_quiz_lifecycle(pool: PgPool) {
    let instructor = create_test_user(&pool, &generate_unique_email(), UserRole::Instructor).await;
    let course_id = create_test_course(&pool, "Quizzes", Some(instructor.id)).await;
    let module_id = insert_module(&pool, course_id).await;
    let app = setup_test_app(pool);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/instructor/modules/{}/quizzes", module_id),
            Some(&instructor.token),
            json!({
                "title": "Broken",
                "questions": [
                    { "question": "Pick one", "options": ["a", "b"], "correct_option": 5 }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error = body_json(response).await;
    assert!(error["error"].as_str().unwrap().starts_with("Question 1"));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/instructor/modules/{}/quizzes", module_id),
            Some(&instructor.token),
            json!({
                "title": "Check-in",
                "questions": [
                    { "question": "2 + 2?", "options": ["3", "4"], "correct_option": 1 },
                    { "question": "Borrow?", "options": ["&", "*", "!"], "correct_option": 0, "points": 3 }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let quiz = body_json(response).await;
    assert_eq!(quiz["passing_score"], 70);
    assert_eq!(quiz["question_count"], 2);
    assert_eq!(quiz["total_points"], 4);
    assert_eq!(quiz["course_id"], course_id.to_string());
    let quiz_id = quiz["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/instructor/quizzes/{}", quiz_id),
            Some(&instructor.token),
            json!({ "passing_score": 80 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["passing_score"], 80);
    assert_eq!(updated["question_count"], 2);

    let response = app
        .clone()
        .oneshot(empty_request(
            "GET",
            &format!("/api/instructor/modules/{}/quizzes", module_id),
            Some(&instructor.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/instructor/quizzes/{}", quiz_id),
            Some(&instructor.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request(
            "GET",
            &format!("/api/instructor/quizzes/{}", quiz_id),
            Some(&instructor.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_enrollment_flow(pool: PgPool) {
    let instructor = create_test_user(&pool, &generate_unique_email(), UserRole::Instructor).await;
    let student = create_test_user(&pool, &generate_unique_email(), UserRole::Student).await;
    let other_instructor =
        create_test_user(&pool, &generate_unique_email(), UserRole::Instructor).await;
    let course_id = create_test_course(&pool, "Enrollments", Some(instructor.id)).await;
    let app = setup_test_app(pool);
    let students_uri = format!("/api/instructor/courses/{}/students", course_id);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &students_uri,
            Some(&instructor.token),
            json!({ "email": other_instructor.email }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &students_uri,
            Some(&instructor.token),
            json!({ "student_id": student.id, "email": student.email }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &students_uri,
            Some(&instructor.token),
            json!({ "email": student.email.to_uppercase() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let enrolled = body_json(response).await;
    assert_eq!(enrolled["student_id"], student.id.to_string());
    assert_eq!(enrolled["status"], "active");
    assert_eq!(enrolled["progress"], 0);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &students_uri,
            Some(&instructor.token),
            json!({ "student_id": student.id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("{}/{}", students_uri, student.id),
            Some(&instructor.token),
            json!({ "progress": 101 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("{}/{}", students_uri, student.id),
            Some(&instructor.token),
            json!({ "progress": 100 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["progress"], 100);

    let response = app
        .clone()
        .oneshot(empty_request(
            "GET",
            &format!("{}?status=completed", students_uri),
            Some(&instructor.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["meta"]["total"], 1);

    let response = app
        .clone()
        .oneshot(empty_request(
            "GET",
            "/api/student/courses",
            Some(&student.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let courses = body_json(response).await;
    assert_eq!(courses[0]["course_id"], course_id.to_string());
    assert_eq!(courses[0]["status"], "completed");

    let response = app
        .clone()
        .oneshot(empty_request(
            "GET",
            "/api/instructor/dashboard",
            Some(&instructor.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;
    assert_eq!(stats["courses"], 1);
    assert_eq!(stats["active_students"], 0);

    let response = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("{}/{}", students_uri, student.id),
            Some(&instructor.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request(
            "DELETE",
            &format!("{}/{}", students_uri, student.id),
            Some(&instructor.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
