use std::io::Write;

use quiz_core::model::LoadError;
use quiz_core::time::fixed_clock;
use services::{AppServices, CatalogSource, QuizConfig, load_catalog};

const CATALOG: &str = r#"{
  "questions": [
    { "id": "bone-1", "question": "Longest bone?", "choices": ["Femur", "Tibia"], "answer": 0, "explanation": "The femur." },
    { "id": "bone-2", "question": "Smallest bone?", "choices": ["Stapes", "Incus", "Malleus"], "answer": 0, "explanation": "The stapes." }
  ]
}"#;

fn catalog_file(body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn loads_catalog_from_file() {
    let file = catalog_file(CATALOG);
    let set = load_catalog(CatalogSource::File(file.path().to_path_buf()))
        .await
        .unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.by_id("bone-2").unwrap().choices().len(), 3);
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_catalog(CatalogSource::File(dir.path().join("absent.json")))
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::NotFound(_)));
}

#[tokio::test]
async fn directory_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_catalog(CatalogSource::File(dir.path().to_path_buf()))
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::Unreadable { .. }));
}

#[tokio::test]
async fn invalid_answer_index_is_malformed() {
    let file = catalog_file(
        r#"{ "questions": [ { "id": "x", "question": "?", "choices": ["a"], "answer": 4, "explanation": "" } ] }"#,
    );
    let err = load_catalog(CatalogSource::File(file.path().to_path_buf()))
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::MalformedData(_)));
}

#[tokio::test]
async fn sqlite_app_services_keep_progress_between_services() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("questions.json");
    std::fs::write(&catalog_path, CATALOG).unwrap();
    let db_path = dir.path().join("data").join("quiz.db");

    let config = QuizConfig {
        db_url: format!("sqlite://{}", db_path.display()),
        catalog_path,
        storage_key: "bones".into(),
        ..QuizConfig::default()
    };
    let app = AppServices::new_sqlite(&config, fixed_clock()).await.unwrap();
    assert!(db_path.exists());
    assert_eq!(app.catalog().len(), 2);

    let mut quiz = app.quiz_service().await.unwrap();
    quiz.start(quiz_core::model::SessionMode::Sequential)
        .await
        .unwrap();
    assert!(quiz.answer(1).await.unwrap().is_durable());

    let again = app.quiz_service().await.unwrap();
    assert!(again.store().aggregate().is_wrong("bone-1"));
    assert_eq!(again.store().key(), "bones");
}

#[tokio::test]
async fn in_memory_app_services_accept_inline_catalog() {
    let document = serde_json::from_str(CATALOG).unwrap();
    let app = AppServices::new_in_memory(CatalogSource::Inline(document), "k", fixed_clock())
        .await
        .unwrap();
    let quiz = app.quiz_service().await.unwrap();
    assert_eq!(quiz.catalog().len(), 2);
    assert!(!quiz.has_resume());
}
