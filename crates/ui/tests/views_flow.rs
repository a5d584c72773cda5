use std::time::Duration;

use classroom_core::model::CapsuleId;
use classroom_core::time::fixed_clock;
use services::{AppServices, SessionTimings};
use ui::{Route, run, run_route};

fn app() -> AppServices {
    let timings = SessionTimings::default().with_quiz_feedback_delay(Duration::ZERO);
    AppServices::in_memory(fixed_clock(), timings)
}

async fn drive(app: &AppServices, route: Route, script: &str) -> String {
    let mut input = script.as_bytes();
    let mut out = Vec::new();
    run(app, route, &mut input, &mut out).await.expect("run views");
    String::from_utf8(out).expect("utf-8 output")
}

#[tokio::test(flavor = "current_thread")]
async fn empty_library_invites_creation() {
    let app = app();
    let output = drive(&app, Route::Library, "quit\n").await;
    assert!(output.contains("No capsules yet."), "{output}");
}

#[tokio::test(flavor = "current_thread")]
async fn sample_then_full_quiz_records_best_score() {
    let app = app();
    let script = "sample\nlearn 1\nflip\nknown\n1\n2\n3\nback\nquit\n";
    let output = drive(&app, Route::Library, script).await;

    assert!(output.contains("Learning to Code  [Programming Basics · Beginner]  0 sec ago"));
    assert!(output.contains("Back: A storage location"), "{output}");
    assert!(output.contains("Marked as known."));
    assert!(output.contains("Quiz finished. Score: 3/3 (100%)"), "{output}");
    assert!(output.contains("New best score saved: 100%"));

    let id = app.library().list().await.expect("list")[0].id.clone();
    let session = app.open_learn(&id).await.expect("open").expect("exists");
    assert_eq!(session.progress().best_score, 100);
    assert!(session.progress().is_known(0));
}

#[tokio::test(flavor = "current_thread")]
async fn wrong_answer_shows_the_right_one() {
    let app = app();
    let id = app.library().add_sample().await.expect("sample");
    let output = drive(&app, Route::Learn { id }, "4\n9\nquit\n").await;
    assert!(output.contains("Wrong. The answer was 1."), "{output}");
    assert!(output.contains("Question 2/3"), "{output}");
    assert!(output.contains("Pick 1 to 4."), "{output}");
}

#[tokio::test(flavor = "current_thread")]
async fn authoring_a_capsule_from_scratch() {
    let app = app();
    let script = "\
title Photosynthesis
subject Biology
level intermediate
note Light becomes chemical energy.
card Chlorophyll | Green pigment
question Where does it happen?
choice 1 1 Mitochondria
choice 1 2 Chloroplast
correct 1 2
choice 1 5 Nowhere
save
done
quit
";
    let output = drive(&app, Route::Author { id: None }, script).await;
    assert!(output.contains("Saved successfully."), "{output}");
    assert!(output.contains("There is no choice 5."), "{output}");

    let index = app.library().list().await.expect("list");
    assert_eq!(index.len(), 1);
    assert_eq!(index[0].title, "Photosynthesis");
    let capsule = app
        .library()
        .get(&index[0].id)
        .await
        .expect("get")
        .expect("stored");
    assert_eq!(capsule.quiz()[0].correct_index, 1);
    assert_eq!(capsule.flashcards()[0].back, "Green pigment");
}

#[tokio::test(flavor = "current_thread")]
async fn save_reports_validation_reason() {
    let app = app();
    let output = drive(&app, Route::Author { id: None }, "note hello\nsave\n").await;
    assert!(output.contains("Title is required."), "{output}");
    assert!(app.library().list().await.expect("list").is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn missing_capsule_in_learn_returns_to_library() {
    let app = app();
    let id = CapsuleId::new("capsule-nope").expect("id");
    let mut input = "".as_bytes();
    let mut out = Vec::new();
    let next = run_route(&app, Route::Learn { id }, &mut input, &mut out)
        .await
        .expect("run");
    assert_eq!(next, Some(Route::Library));
    assert!(String::from_utf8(out).expect("utf-8").contains("Capsule not found."));
}

#[tokio::test(flavor = "current_thread")]
async fn delete_asks_for_confirmation() {
    let app = app();
    app.library().add_sample().await.expect("sample");
    drive(&app, Route::Library, "delete 1\nn\nquit\n").await;
    assert_eq!(app.library().list().await.expect("list").len(), 1);

    drive(&app, Route::Library, "delete 1\ny\nquit\n").await;
    assert!(app.library().list().await.expect("list").is_empty());
}
