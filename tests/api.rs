use actix_web::{App, http::StatusCode, test, web};
use chrono::{Datelike, Local, NaiveDate, Utc};
use futures::future::join_all;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use workforce::{config::Config, db::init_db, routes};

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        db_max_connections: 1,
        server_addr: "127.0.0.1:0".to_string(),
        rate_limit_per_min: 0,
        api_prefix: "/api".to_string(),
        log_dir: "logs".to_string(),
        log_level: tracing::Level::DEBUG,
    }
}

/// Fresh in-memory database per test; one connection keeps it alive.
async fn setup_test_db_pool() -> SqlitePool {
    init_db("sqlite::memory:", 1)
        .await
        .expect("Failed to set up in-memory SQLite")
}

macro_rules! test_app {
    ($pool:expr) => {
        test_app!($pool, test_config())
    };
    ($pool:expr, $config:expr) => {{
        let config: Config = $config;
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .configure(|cfg| routes::configure(cfg, &config)),
        )
        .await
    }};
}

macro_rules! send {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        let json: Value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).expect("response body is JSON")
        };
        (status, json)
    }};
}

macro_rules! create_employee {
    ($app:expr, $name:expr, $salary:expr) => {{
        let (status, body) = send!(
            $app,
            test::TestRequest::post().uri("/api/employees").set_json(json!({
                "name": $name,
                "joiningDate": "2024-03-01",
                "baseSalary": $salary
            }))
        );
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().expect("employee id")
    }};
}

macro_rules! create_project {
    ($app:expr, $name:expr) => {{
        let (status, body) = send!(
            $app,
            test::TestRequest::post().uri("/api/projects").set_json(json!({
                "name": $name,
                "description": "test project",
                "startDate": "2026-01-01",
                "endDate": "2026-12-31"
            }))
        );
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().expect("project id")
    }};
}

fn current_month_uri() -> String {
    let today = Local::now().date_naive();
    format!("/api/payroll?month={}&year={}", today.month0(), today.year())
}

fn last_year_january() -> (String, NaiveDate) {
    let year = Local::now().year() - 1;
    (
        format!("/api/payroll?month=0&year={year}"),
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
    )
}

#[actix_web::test]
async fn test_create_and_list_employees() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    let jane = create_employee!(app, "Jane Doe", 52000.0);
    let omar = create_employee!(app, "Omar Haddad", 61000.0);

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/employees"));
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_i64().unwrap())
        .collect();
    // newest first
    assert_eq!(ids, vec![omar, jane]);
    assert_eq!(body[1]["name"], "Jane Doe");
    assert_eq!(body[1]["joiningDate"], "2024-03-01");
    assert_eq!(body[1]["isActive"], true);
}

#[actix_web::test]
async fn test_soft_deleted_employee_stays_retrievable() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    let id = create_employee!(app, "Jane Doe", 52000.0);
    create_employee!(app, "Omar Haddad", 61000.0);

    let (status, body) = send!(
        app,
        test::TestRequest::delete().uri(&format!("/api/employees/{id}"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isActive"], false);

    let (_, list) = send!(app, test::TestRequest::get().uri("/api/employees"));
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert!(list.iter().all(|e| e["id"].as_i64() != Some(id)));

    let (status, body) = send!(
        app,
        test::TestRequest::get().uri(&format!("/api/employees/{id}"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Jane Doe");
    assert_eq!(body["isActive"], false);

    let row_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row_count, 2);
}

#[actix_web::test]
async fn test_employee_filters() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    create_employee!(app, "Jane Doe", 52000.0);
    create_employee!(app, "Janet Park", 30000.0);
    create_employee!(app, "Omar Haddad", 61000.0);

    let (status, body) = send!(
        app,
        test::TestRequest::get().uri("/api/employees?name=JAN&minSalary=40000")
    );
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Jane Doe"]);

    let (status, _) = send!(
        app,
        test::TestRequest::get().uri("/api/employees?minSalary=9000&maxSalary=10")
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_name_filter_is_literal_and_unicode_aware() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    create_employee!(app, "Bob Stone", 40000.0);
    create_employee!(app, "Élodie Ärnholm", 45000.0);

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/employees?name=%25"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/employees?name=_"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    // "éLODIE ÄRN", percent-encoded
    let (status, body) = send!(
        app,
        test::TestRequest::get().uri("/api/employees?name=%C3%A9LODIE%20%C3%84RN")
    );
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Élodie Ärnholm"]);
}

#[actix_web::test]
async fn test_update_employee() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    let id = create_employee!(app, "Jane Doe", 52000.0);

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/employees/{id}"))
            .set_json(json!({
                "name": "Jane Doe-Smith",
                "joiningDate": "2024-04-01",
                "baseSalary": 55000.0
            }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Jane Doe-Smith");
    assert_eq!(body["baseSalary"], 55000.0);

    let (status, body) = send!(
        app,
        test::TestRequest::put().uri("/api/employees/999").set_json(json!({
            "name": "Nobody",
            "joiningDate": "2024-04-01",
            "baseSalary": 1.0
        }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Employee not found");

    let (status, _) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/employees/{id}"))
            .set_json(json!({
                "name": "",
                "joiningDate": "2024-04-01",
                "baseSalary": 1.0
            }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_malformed_body_is_a_json_bad_request() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/employees")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{\"name\": 42")
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn test_open_month_creates_one_row_per_active_employee() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    create_employee!(app, "Jane Doe", 52000.0);
    create_employee!(app, "Omar Haddad", 61000.0);
    let gone = create_employee!(app, "Lea Brun", 45000.0);
    send!(
        app,
        test::TestRequest::delete().uri(&format!("/api/employees/{gone}"))
    );

    let (status, body) = send!(app, test::TestRequest::get().uri(&current_month_uri()));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isEditable"], true);

    let salaries = body["salaries"].as_array().unwrap();
    assert_eq!(salaries.len(), 2);
    for salary in salaries {
        assert_eq!(salary["payableAmount"], salary["baseSalary"]);
        assert_eq!(salary["bonus"], 0.0);
        assert_eq!(salary["deductions"], 0.0);
        assert_eq!(salary["baseSalary"], salary["employee"]["baseSalary"]);
        assert_ne!(salary["employeeId"].as_i64(), Some(gone));
    }

    let expected_month = Local::now().date_naive().with_day(1).unwrap().to_string();
    assert_eq!(salaries[0]["month"], expected_month.as_str());
}

#[actix_web::test]
async fn test_open_month_twice_returns_the_same_rows() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    create_employee!(app, "Jane Doe", 52000.0);
    create_employee!(app, "Omar Haddad", 61000.0);

    let (_, first) = send!(app, test::TestRequest::get().uri(&current_month_uri()));
    let (status, second) = send!(app, test::TestRequest::get().uri(&current_month_uri()));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["isEditable"], true);
    assert_eq!(first["salaries"], second["salaries"]);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM salaries")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 2);
}

#[actix_web::test]
async fn test_future_month_is_editable() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    create_employee!(app, "Jane Doe", 52000.0);

    let next_year = Local::now().year() + 1;
    let (status, body) = send!(
        app,
        test::TestRequest::get().uri(&format!("/api/payroll?month=5&year={next_year}"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isEditable"], true);
    assert_eq!(body["salaries"][0]["month"], format!("{next_year}-06-01"));
}

#[actix_web::test]
async fn test_past_month_without_rows_is_not_found() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    create_employee!(app, "Jane Doe", 52000.0);

    let (uri, _) = last_year_january();
    let (status, body) = send!(app, test::TestRequest::get().uri(&uri));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No payroll data exists for this month");

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM salaries")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[actix_web::test]
async fn test_past_month_with_rows_is_read_only() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    let id = create_employee!(app, "Jane Doe", 52000.0);
    let (uri, month) = last_year_january();

    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO salaries
        (employee_id, base_salary, bonus, deductions, payable_amount, month, created_at, updated_at)
        VALUES (?, 50000, 1000, 500, 50500, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(month)
    .bind(now)
    .bind(now)
    .execute(&pool)
    .await
    .unwrap();

    let (status, body) = send!(app, test::TestRequest::get().uri(&uri));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isEditable"], false);
    assert_eq!(body["salaries"].as_array().unwrap().len(), 1);
    assert_eq!(body["salaries"][0]["payableAmount"], 50500.0);
}

#[actix_web::test]
async fn test_concurrent_opens_of_a_month_agree() {
    // A file database so the pool really holds several connections.
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("payroll.db").display());
    let pool = init_db(&url, 8).await.expect("file-backed SQLite");
    let app = test_app!(pool);

    for i in 0..20_i32 {
        create_employee!(app, format!("Employee {i:02}"), 1000.0 + f64::from(i));
    }

    let year = Local::now().year() + 1;
    for month in 0..3 {
        let uri = format!("/api/payroll?month={month}&year={year}");
        let (app, uri) = (&app, uri.as_str());

        let responses = join_all((0..6).map(|_| async move {
            let resp =
                test::call_service(app, test::TestRequest::get().uri(uri).to_request()).await;
            let status = resp.status();
            let body: Value = test::read_body_json(resp).await;
            (status, body)
        }))
        .await;

        let (_, first) = &responses[0];
        assert_eq!(first["salaries"].as_array().map(Vec::len), Some(20), "{first}");
        for (status, body) in &responses {
            assert_eq!(*status, StatusCode::OK, "{body}");
            assert_eq!(body["salaries"], first["salaries"]);
        }
    }

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM salaries")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 60);
}

#[actix_web::test]
async fn test_month_parameter_is_validated() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/payroll"));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Month is required");

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/payroll?month=12"));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Month must be between 0 and 11");

    let (status, body) = send!(
        app,
        test::TestRequest::get().uri("/api/payroll?month=0&year=400000")
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Year 400000 is out of range");

    let (status, _) = send!(app, test::TestRequest::get().uri("/api/payroll?month=june"));
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_salary_update_uses_the_stored_snapshot() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    let id = create_employee!(app, "Jane Doe", 52000.0);
    let (_, body) = send!(app, test::TestRequest::get().uri(&current_month_uri()));
    let salary_id = body["salaries"][0]["id"].as_i64().unwrap();

    // A raise after the month was opened must not leak into it.
    send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/employees/{id}"))
            .set_json(json!({
                "name": "Jane Doe",
                "joiningDate": "2024-03-01",
                "baseSalary": 70000.0
            }))
    );

    for (bonus, deductions) in [(2500.0, 1000.0), (0.0, 0.0), (125.5, 4000.25)] {
        let (status, body) = send!(
            app,
            test::TestRequest::put().uri("/api/payroll").set_json(json!({
                "salaryId": salary_id,
                "bonus": bonus,
                "deductions": deductions
            }))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["baseSalary"], 52000.0);
        assert_eq!(body["bonus"], bonus);
        assert_eq!(body["deductions"], deductions);
        assert_eq!(body["payableAmount"], 52000.0 + bonus - deductions);
        assert_eq!(body["employee"]["baseSalary"], 70000.0);
    }
}

#[actix_web::test]
async fn test_salary_update_errors() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    let (status, body) = send!(
        app,
        test::TestRequest::put().uri("/api/payroll").set_json(json!({
            "salaryId": 404,
            "bonus": 0,
            "deductions": 0
        }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Salary record not found");

    let (status, _) = send!(
        app,
        test::TestRequest::put().uri("/api/payroll").set_json(json!({
            "salaryId": 1,
            "bonus": -10,
            "deductions": 0
        }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_deleted_project_leaves_default_listing() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    let keep = create_project!(app, "Website relaunch");
    let removed = create_project!(app, "Office move");

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/projects/{removed}"))
            .set_json(json!({
                "name": "Office move",
                "description": "test project",
                "startDate": "2026-01-01",
                "endDate": "2026-12-31",
                "status": "deleted"
            }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lifecycle"], "deleted");
    assert_eq!(body["status"], "active");

    let (_, list) = send!(app, test::TestRequest::get().uri("/api/projects"));
    let ids: Vec<i64> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![keep]);

    let (_, all) = send!(
        app,
        test::TestRequest::get().uri("/api/projects?includeDeleted=true")
    );
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (status, body) = send!(
        app,
        test::TestRequest::get().uri(&format!("/api/projects/{removed}"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Office move");
    assert_eq!(body["taskCount"], 0);
}

#[actix_web::test]
async fn test_project_restore_and_delete_route() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    let id = create_project!(app, "Website relaunch");

    let (status, body) = send!(
        app,
        test::TestRequest::delete().uri(&format!("/api/projects/{id}"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lifecycle"], "deleted");

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/projects/{id}"))
            .set_json(json!({
                "name": "Website relaunch",
                "description": "",
                "startDate": "2026-01-01",
                "endDate": "2026-12-31",
                "status": "completed"
            }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lifecycle"], "live");
    assert_eq!(body["status"], "completed");

    let (status, _) = send!(app, test::TestRequest::delete().uri("/api/projects/999"));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_task_lifecycle_on_the_board() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    let project = create_project!(app, "Website relaunch");
    let jane = create_employee!(app, "Jane Doe", 52000.0);

    let (status, task) = send!(
        app,
        test::TestRequest::post().uri("/api/tasks").set_json(json!({
            "title": "Draft copy",
            "priority": "HIGH",
            "status": "TODO",
            "employeeId": jane,
            "projectId": project
        }))
    );
    assert_eq!(status, StatusCode::CREATED, "{task}");
    assert_eq!(task["assignedTo"]["name"], "Jane Doe");
    let task_id = task["id"].as_i64().unwrap();

    let (status, _) = send!(
        app,
        test::TestRequest::post().uri("/api/tasks").set_json(json!({
            "title": "Pick fonts",
            "projectId": project
        }))
    );
    assert_eq!(status, StatusCode::CREATED);

    // Drag the first card to the middle column.
    let (status, moved) = send!(
        app,
        test::TestRequest::patch()
            .uri(&format!("/api/tasks/{task_id}"))
            .set_json(json!({ "status": "IN_PROGRESS" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["status"], "IN_PROGRESS");
    assert_eq!(moved["title"], "Draft copy");
    assert_eq!(moved["employeeId"], jane);

    let (status, board) = send!(
        app,
        test::TestRequest::get().uri(&format!("/api/projects/{project}/board"))
    );
    assert_eq!(status, StatusCode::OK);
    let columns = board["columns"].as_array().unwrap();
    let shape: Vec<(&str, usize)> = columns
        .iter()
        .map(|c| {
            (
                c["status"].as_str().unwrap(),
                c["tasks"].as_array().unwrap().len(),
            )
        })
        .collect();
    assert_eq!(
        shape,
        vec![("TODO", 1), ("IN_PROGRESS", 1), ("COMPLETED", 0)]
    );

    let (status, unassigned) = send!(
        app,
        test::TestRequest::patch()
            .uri(&format!("/api/tasks/{task_id}"))
            .set_json(json!({ "employeeId": null }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unassigned["assignedTo"], Value::Null);
    assert_eq!(unassigned["status"], "IN_PROGRESS");

    let (_, tasks) = send!(
        app,
        test::TestRequest::get().uri(&format!("/api/projects/{project}/tasks"))
    );
    assert_eq!(tasks.as_array().unwrap().len(), 2);

    let (status, _) = send!(
        app,
        test::TestRequest::delete().uri(&format!("/api/tasks/{task_id}"))
    );
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send!(
        app,
        test::TestRequest::delete().uri(&format!("/api/tasks/{task_id}"))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, detail) = send!(
        app,
        test::TestRequest::get().uri(&format!("/api/projects/{project}"))
    );
    assert_eq!(detail["taskCount"], 1);
}

#[actix_web::test]
async fn test_task_validation() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(pool);

    let project = create_project!(app, "Website relaunch");

    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/api/tasks").set_json(json!({
            "title": "Orphan",
            "projectId": 999
        }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Project not found");

    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/api/tasks").set_json(json!({
            "title": "Ghost work",
            "employeeId": 999,
            "projectId": project
        }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Assignee not found");

    let (status, _) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/tasks/999")
            .set_json(json!({ "status": "COMPLETED" }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/tasks/999")
            .set_json(json!({ "employeeId": 999 }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Task not found");

    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/api/tasks").set_json(json!({
            "title": "Real work",
            "projectId": project
        }))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let task = body["id"].as_i64().unwrap();

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri(&format!("/api/tasks/{task}"))
            .set_json(json!({}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No fields provided for update");

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri(&format!("/api/tasks/{task}"))
            .set_json(json!({ "employeeId": 999 }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Assignee not found");

    let (status, _) = send!(
        app,
        test::TestRequest::get().uri("/api/projects/999/tasks")
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_rate_limit_rejects_requests_past_the_burst() {
    let pool = setup_test_db_pool().await;
    let app = test_app!(
        pool,
        Config {
            rate_limit_per_min: 2,
            ..test_config()
        }
    );

    let mut statuses = Vec::new();
    for _ in 0..4 {
        let req = test::TestRequest::get()
            .uri("/api/employees")
            .peer_addr("10.0.0.7:4100".parse().unwrap())
            .to_request();
        statuses.push(test::call_service(&app, req).await.status());
    }

    assert_eq!(
        statuses,
        vec![
            StatusCode::OK,
            StatusCode::OK,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS
        ]
    );
}
