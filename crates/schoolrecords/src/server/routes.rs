//! Request handlers for the `/api` routes.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::ApiResult;
use super::AppState;
use crate::dashboard::{DashboardSummary, StudentReport};
use crate::error::Error;
use crate::exchange::{self, ExportBundle, ImportMode, ImportSummary};
use crate::model::{Mark, Settings, Student, Teacher};
use crate::search::{MarkQuery, StudentQuery, TeacherQuery};

type AppStateRef = State<Arc<AppState>>;

/// Service liveness plus version and data directory.
pub async fn health(State(state): AppStateRef) -> Json<Value> {
    let db = state.db.lock().await;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "dataDir": db.root().display().to_string(),
    }))
}

// === Students ===

/// Search students by name/ID, grade and section.
pub async fn list_students(
    State(state): AppStateRef,
    query: Result<Query<StudentQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Student>>> {
    let Query(query) = query?;
    let db = state.db.lock().await;
    Ok(Json(query.run(db.students()).into_iter().cloned().collect()))
}

/// Create a student; the ID is assigned from the grade.
pub async fn create_student(
    State(state): AppStateRef,
    body: Result<Json<Student>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Student>)> {
    let Json(student) = body?;
    let saved = state.write(move |db| db.add_student(student)).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Fetch one student.
pub async fn get_student(
    State(state): AppStateRef,
    Path(id): Path<String>,
) -> ApiResult<Json<Student>> {
    let db = state.db.lock().await;
    let student = db
        .student(&id)
        .cloned()
        .ok_or_else(|| Error::not_found("student", id))?;
    Ok(Json(student))
}

/// Replace a student record, keeping its ID.
pub async fn update_student(
    State(state): AppStateRef,
    Path(id): Path<String>,
    body: Result<Json<Student>, JsonRejection>,
) -> ApiResult<Json<Student>> {
    let Json(student) = body?;
    let saved = state
        .write(move |db| db.update_student(&id, student))
        .await?;
    Ok(Json(saved))
}

/// Delete a student.
pub async fn delete_student(
    State(state): AppStateRef,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .write(move |db| {
            if db.delete_student(&id)? {
                Ok(())
            } else {
                Err(Error::not_found("student", id))
            }
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// A student's marks and averages.
pub async fn student_report(
    State(state): AppStateRef,
    Path(id): Path<String>,
) -> ApiResult<Json<StudentReport>> {
    let db = state.db.lock().await;
    let report = StudentReport::build(&db, &id).ok_or_else(|| Error::not_found("student", id))?;
    Ok(Json(report))
}

// === Teachers ===

/// Search teachers by name/ID, department and subject.
pub async fn list_teachers(
    State(state): AppStateRef,
    query: Result<Query<TeacherQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Teacher>>> {
    let Query(query) = query?;
    let db = state.db.lock().await;
    Ok(Json(query.run(db.teachers()).into_iter().cloned().collect()))
}

/// Create a teacher.
pub async fn create_teacher(
    State(state): AppStateRef,
    body: Result<Json<Teacher>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Teacher>)> {
    let Json(teacher) = body?;
    let saved = state.write(move |db| db.add_teacher(teacher)).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Fetch one teacher.
pub async fn get_teacher(
    State(state): AppStateRef,
    Path(id): Path<String>,
) -> ApiResult<Json<Teacher>> {
    let db = state.db.lock().await;
    let teacher = db
        .teacher(&id)
        .cloned()
        .ok_or_else(|| Error::not_found("teacher", id))?;
    Ok(Json(teacher))
}

/// Replace a teacher record, keeping its ID.
pub async fn update_teacher(
    State(state): AppStateRef,
    Path(id): Path<String>,
    body: Result<Json<Teacher>, JsonRejection>,
) -> ApiResult<Json<Teacher>> {
    let Json(teacher) = body?;
    let saved = state
        .write(move |db| db.update_teacher(&id, teacher))
        .await?;
    Ok(Json(saved))
}

/// Delete a teacher.
pub async fn delete_teacher(
    State(state): AppStateRef,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .write(move |db| {
            if db.delete_teacher(&id)? {
                Ok(())
            } else {
                Err(Error::not_found("teacher", id))
            }
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// === Marks ===

/// Filter marks by student, subject and term.
pub async fn list_marks(
    State(state): AppStateRef,
    query: Result<Query<MarkQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Mark>>> {
    let Query(query) = query?;
    let db = state.db.lock().await;
    Ok(Json(query.run(db.marks()).into_iter().cloned().collect()))
}

/// Record a mark.
pub async fn create_mark(
    State(state): AppStateRef,
    body: Result<Json<Mark>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Mark>)> {
    let Json(mark) = body?;
    let saved = state.write(move |db| db.add_mark(mark)).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Fetch one mark.
pub async fn get_mark(
    State(state): AppStateRef,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<Mark>> {
    let Path(id) = id?;
    let db = state.db.lock().await;
    let mark = db
        .mark(id)
        .cloned()
        .ok_or_else(|| Error::not_found("mark", id.to_string()))?;
    Ok(Json(mark))
}

/// Replace a mark, recomputing its letter grade.
pub async fn update_mark(
    State(state): AppStateRef,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<Mark>, JsonRejection>,
) -> ApiResult<Json<Mark>> {
    let Path(id) = id?;
    let Json(mark) = body?;
    let saved = state.write(move |db| db.update_mark(id, mark)).await?;
    Ok(Json(saved))
}

/// Delete a mark.
pub async fn delete_mark(
    State(state): AppStateRef,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state
        .write(move |db| {
            if db.delete_mark(id)? {
                Ok(())
            } else {
                Err(Error::not_found("mark", id.to_string()))
            }
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// === Settings, dashboard, exchange ===

/// Current school settings.
pub async fn get_settings(State(state): AppStateRef) -> Json<Settings> {
    Json(state.db.lock().await.settings().clone())
}

/// Replace the school settings.
pub async fn update_settings(
    State(state): AppStateRef,
    body: Result<Json<Settings>, JsonRejection>,
) -> ApiResult<Json<Settings>> {
    let Json(settings) = body?;
    let saved = state.write(move |db| db.update_settings(settings)).await?;
    Ok(Json(saved))
}

/// Dashboard figures.
pub async fn dashboard(State(state): AppStateRef) -> Json<DashboardSummary> {
    let db = state.db.lock().await;
    Json(DashboardSummary::compute(&db))
}

/// Every collection as one bundle.
pub async fn export_bundle(State(state): AppStateRef) -> Json<ExportBundle> {
    let db = state.db.lock().await;
    Json(ExportBundle::from_db(&db))
}

/// Query string of `POST /api/import`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImportParams {
    /// Replace or merge; replace when omitted.
    pub mode: ImportMode,
}

/// Import a bundle in replace or merge mode.
pub async fn import_bundle(
    State(state): AppStateRef,
    params: Result<Query<ImportParams>, QueryRejection>,
    body: Result<Json<ExportBundle>, JsonRejection>,
) -> ApiResult<Json<ImportSummary>> {
    let Query(params) = params?;
    let Json(bundle) = body?;
    let mode = params.mode;
    let summary = state
        .write(move |db| exchange::import(db, bundle, mode))
        .await?;
    Ok(Json(summary))
}

/// Body of `POST /api/save`.
#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    /// Target path relative to the data directory.
    pub filename: String,
    /// Document to write.
    pub data: Value,
}

/// Reply to a successful save.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct SaveResponse {
    /// Always `true`.
    pub success: bool,
    /// Path that was written, relative to the data directory.
    pub filename: String,
}

/// Write a JSON document under the data directory.
pub async fn save_file(
    State(state): AppStateRef,
    body: Result<Json<SaveRequest>, JsonRejection>,
) -> ApiResult<Json<SaveResponse>> {
    let Json(SaveRequest { filename, data }) = body?;
    let target = filename.clone();
    state
        .write(move |db| db.save_file(&target, &data))
        .await?;
    Ok(Json(SaveResponse {
        success: true,
        filename,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::fixtures;
    use crate::storage::SchoolDatabase;
    use tempfile::TempDir;

    fn test_state() -> (TempDir, Arc<AppState>) {
        crate::logging::init_test_logging();
        let dir = tempfile::tempdir().unwrap();
        let db = SchoolDatabase::open(dir.path()).unwrap();
        (dir, AppState::new(db, Config::default()))
    }

    async fn add_student(state: &Arc<AppState>, name: &str, grade: u8) -> Student {
        let (status, Json(saved)) =
            create_student(State(state.clone()), Ok(Json(fixtures::student(name, grade))))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        saved
    }

    #[tokio::test]
    async fn test_health() {
        let (dir, state) = test_state();
        let Json(body) = health(State(state)).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["dataDir"], dir.path().display().to_string());
    }

    #[tokio::test]
    async fn test_student_lifecycle() {
        let (_dir, state) = test_state();
        let saved = add_student(&state, "Ada", 4).await;
        assert_eq!(saved.id, "S4001");

        let Json(found) = get_student(State(state.clone()), Path("S4001".to_string()))
            .await
            .unwrap();
        assert_eq!(found.name, "Ada");

        let mut edited = found.clone();
        edited.section = "B".to_string();
        let Json(updated) = update_student(
            State(state.clone()),
            Path("S4001".to_string()),
            Ok(Json(edited)),
        )
        .await
        .unwrap();
        assert_eq!(updated.section, "B");

        let status = delete_student(State(state.clone()), Path("S4001".to_string()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = get_student(State(state.clone()), Path("S4001".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = delete_student(State(state), Path("S4001".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_students_with_query() {
        let (_dir, state) = test_state();
        add_student(&state, "Ada", 4).await;
        add_student(&state, "Bea", 5).await;

        let query = StudentQuery {
            grade: Some(5),
            ..StudentQuery::default()
        };
        let Json(found) = list_students(State(state), Ok(Query(query))).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Bea");
    }

    #[tokio::test]
    async fn test_create_invalid_student_is_bad_request() {
        let (_dir, state) = test_state();
        let err = create_student(State(state), Ok(Json(fixtures::student("Ada", 0))))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "validation");
    }

    #[tokio::test]
    async fn test_teacher_routes() {
        let (_dir, state) = test_state();
        let (status, Json(saved)) = create_teacher(
            State(state.clone()),
            Ok(Json(fixtures::teacher("Alan", "Math"))),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(saved.id, "T001");

        let query = TeacherQuery {
            subject: Some("math".to_string()),
            ..TeacherQuery::default()
        };
        let Json(found) = list_teachers(State(state.clone()), Ok(Query(query)))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let err = update_teacher(
            State(state),
            Path("T404".to_string()),
            Ok(Json(fixtures::teacher("X", "Art"))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_mark_routes_and_report() {
        let (_dir, state) = test_state();
        let student = add_student(&state, "Ada", 2).await;

        let (_, Json(mark)) = create_mark(
            State(state.clone()),
            Ok(Json(Mark::new(&student.id, "Math", "Term 1", 84.0))),
        )
        .await
        .unwrap();
        assert_eq!(mark.id, 1);

        let Json(found) = get_mark(State(state.clone()), Ok(Path(1))).await.unwrap();
        assert_eq!(found.score, 84.0);

        let Json(report) = student_report(State(state.clone()), Path(student.id.clone()))
            .await
            .unwrap();
        assert_eq!(report.overall_average, Some(84.0));

        let query = MarkQuery {
            student_id: Some(student.id.clone()),
            ..MarkQuery::default()
        };
        let Json(listed) = list_marks(State(state.clone()), Ok(Query(query)))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);

        let status = delete_mark(State(state.clone()), Ok(Path(1))).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        let err = get_mark(State(state), Ok(Path(1))).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_settings_routes() {
        let (_dir, state) = test_state();
        let Json(current) = get_settings(State(state.clone())).await;
        assert_eq!(current.school_name, "My School");

        let next = Settings {
            school_name: "Oak Park".to_string(),
            ..current
        };
        let Json(saved) = update_settings(State(state.clone()), Ok(Json(next)))
            .await
            .unwrap();
        assert_eq!(saved.school_name, "Oak Park");

        let Json(summary) = dashboard(State(state)).await;
        assert_eq!(summary.school_name, "Oak Park");
    }

    #[tokio::test]
    async fn test_export_then_import_merge() {
        let (_dir, state) = test_state();
        add_student(&state, "Ada", 1).await;
        let Json(bundle) = export_bundle(State(state.clone())).await;

        let (_other_dir, other) = test_state();
        add_student(&other, "Zed", 9).await;
        let params = ImportParams {
            mode: ImportMode::Merge,
        };
        let Json(summary) = import_bundle(State(other), Ok(Query(params)), Ok(Json(bundle)))
            .await
            .unwrap();
        assert_eq!(summary.students, 2);
    }

    #[tokio::test]
    async fn test_save_file_route() {
        let (dir, state) = test_state();
        let request = SaveRequest {
            filename: "notes/today.json".to_string(),
            data: json!({"hello": "world"}),
        };
        let Json(reply) = save_file(State(state.clone()), Ok(Json(request)))
            .await
            .unwrap();
        assert!(reply.success);
        assert!(dir.path().join("notes/today.json").exists());

        let escape = SaveRequest {
            filename: "../../etc/passwd.json".to_string(),
            data: json!({}),
        };
        let err = save_file(State(state), Ok(Json(escape))).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "path_outside_root");
    }
}
