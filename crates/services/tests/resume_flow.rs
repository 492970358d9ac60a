use std::sync::Arc;

use quiz_core::model::{CatalogDocument, QuestionDraft, QuestionId, QuestionSet, SessionMode};
use quiz_core::time::fixed_clock;
use services::{
    EngineState, NextStep, ProgressStore, QuizError, QuizEvent, QuizService, RecordedEvents,
    SessionError,
};
use storage::repository::InMemoryRepository;

fn drafts(ids: &[&str]) -> Vec<QuestionDraft> {
    ids.iter()
        .map(|id| QuestionDraft {
            id: QuestionId::new(*id),
            question: format!("About {id}"),
            choices: vec!["first".into(), "second".into(), "third".into()],
            answer: 2,
            explanation: String::new(),
        })
        .collect()
}

fn catalog(ids: &[&str]) -> Arc<QuestionSet> {
    let document = CatalogDocument {
        questions: drafts(ids),
    };
    Arc::new(QuestionSet::from_document(document).unwrap())
}

async fn open(repo: &InMemoryRepository) -> ProgressStore {
    ProgressStore::open(Arc::new(repo.clone()), "resume_key")
        .await
        .unwrap()
}

#[tokio::test]
async fn suspended_session_survives_restart() {
    let repo = InMemoryRepository::new();
    let ids = ["heart", "lung", "liver", "kidney", "brain"];
    let mut quiz = QuizService::new(fixed_clock(), catalog(&ids), open(&repo).await)
        .with_rng_seed(11);

    quiz.start(SessionMode::Random).await.unwrap();
    assert_eq!(quiz.progress().unwrap().total, 5);

    let mut asked = Vec::new();
    asked.push(quiz.current_question().unwrap().id().clone());
    quiz.answer(2).await.unwrap();
    quiz.next().await.unwrap();
    asked.push(quiz.current_question().unwrap().id().clone());
    quiz.answer(0).await.unwrap();
    quiz.next().await.unwrap();
    let pending = quiz.current_question().unwrap().id().clone();

    let saved = quiz.suspend().await.unwrap();
    assert!(saved.is_durable());
    assert_eq!((saved.value.current, saved.value.total), (3, 5));
    assert_eq!(quiz.state(), EngineState::Idle);
    drop(quiz);

    let events = RecordedEvents::new();
    let mut restarted = QuizService::new(fixed_clock(), catalog(&ids), open(&repo).await)
        .with_events(Arc::new(events.clone()));
    assert!(restarted.has_resume());

    let progress = restarted.resume().await.unwrap().into_inner();
    assert_eq!(progress.current, 3);
    assert_eq!(progress.answered, 2);
    assert_eq!(progress.correct, 1);
    assert_eq!(restarted.current_question().unwrap().id(), &pending);
    assert!(!restarted.has_resume());
    assert_eq!(
        events.snapshot(),
        vec![QuizEvent::SessionResumed {
            position: 3,
            total: 5
        }]
    );

    while restarted.state() == EngineState::Active {
        if let NextStep::Finished(outcome) = restarted.next().await.unwrap().into_inner() {
            assert_eq!((outcome.correct, outcome.total), (1, 2));
            assert_eq!(outcome.wrong_in_session.len(), 1);
            assert_eq!(outcome.wrong_in_session[0].id(), &asked[1]);
        }
    }
    assert!(!open(&repo).await.has_resume());
}

#[tokio::test]
async fn answered_question_stays_answered_after_resume() {
    let repo = InMemoryRepository::new();
    let ids = ["a", "b"];
    let mut quiz = QuizService::new(fixed_clock(), catalog(&ids), open(&repo).await);
    quiz.start(SessionMode::Sequential).await.unwrap();
    quiz.answer(2).await.unwrap();
    quiz.suspend().await.unwrap();

    let mut quiz = QuizService::new(fixed_clock(), catalog(&ids), open(&repo).await);
    quiz.resume().await.unwrap();
    let err = quiz.answer(2).await.unwrap_err();
    assert!(matches!(
        err,
        QuizError::Session(SessionError::DoubleAnswer { position: 0 })
    ));
    assert_eq!(quiz.store().aggregate().totals().attempts, 1);
}

#[tokio::test]
async fn stale_snapshot_is_discarded() {
    let repo = InMemoryRepository::new();
    let mut quiz = QuizService::new(fixed_clock(), catalog(&["a", "b", "c"]), open(&repo).await);
    quiz.start(SessionMode::Sequential).await.unwrap();
    quiz.suspend().await.unwrap();

    let mut quiz = QuizService::new(fixed_clock(), catalog(&["a", "c"]), open(&repo).await);
    let err = quiz.resume().await.unwrap_err();
    assert!(matches!(
        err,
        QuizError::Session(SessionError::StaleReference(ref id)) if id.as_str() == "b"
    ));
    assert_eq!(quiz.state(), EngineState::Idle);
    assert!(!quiz.has_resume());
    assert!(matches!(quiz.resume().await.unwrap_err(), QuizError::NoSnapshot));
}
