use std::time::Duration;

use classroom_core::model::CapsuleId;
use classroom_core::time::fixed_clock;
use services::{AppServices, SessionTimings};
use storage::repository::Storage;

#[tokio::test]
async fn study_progress_survives_reopening() {
    let storage = Storage::sqlite("sqlite:file:memdb_learning_flow?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let timings = SessionTimings::default().with_quiz_feedback_delay(Duration::from_millis(5));
    let app = AppServices::from_storage(&storage, fixed_clock(), timings);
    let id = app.library().add_sample().await.expect("sample");

    let mut session = app
        .open_learn(&id)
        .await
        .expect("open learn")
        .expect("capsule exists");
    assert_eq!(session.notes().len(), 3);
    session.next_card();
    session.mark_known().await.expect("mark known");

    let total = session.capsule().quiz().len();
    for _ in 0..total {
        let correct = usize::from(
            session
                .current_question()
                .expect("question")
                .item
                .correct_index,
        );
        let feedback = session
            .select_choice(correct)
            .expect("valid pick")
            .expect("asking");
        assert!(feedback.correct);
        session.continue_quiz().await.expect("continue");
    }
    let result = session.quiz_result().expect("finished");
    assert_eq!(result.percent, 100);
    drop(session);

    let reopened = app
        .open_learn(&id)
        .await
        .expect("reopen")
        .expect("capsule exists");
    assert_eq!(reopened.progress().best_score, 100);
    assert!(reopened.progress().is_known(1));
    assert_eq!(reopened.known_count(), 1);
}

#[tokio::test]
async fn deleted_capsule_cannot_be_studied() {
    let app = AppServices::in_memory(fixed_clock(), SessionTimings::default());
    let id = app.library().add_sample().await.expect("sample");
    app.library().delete(&id).await.expect("delete");
    assert!(app.open_learn(&id).await.expect("open").is_none());

    let never = CapsuleId::new("capsule-never").expect("id");
    assert!(app.open_learn(&never).await.expect("open").is_none());
}
