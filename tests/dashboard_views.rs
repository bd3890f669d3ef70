mod common;

use common::{application_json, client, session};
use scholarstream::dashboard::{
    self, AdminDashboard, DashboardError, ModeratorDashboard, Overview, StudentDashboard,
};
use scholarstream::models::{Application, ApplicationStatus, Review, Role, ScholarshipInput, User};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn application(id: &str, status: &str) -> Application {
    serde_json::from_value(application_json(id, "S1", "paid", status)).unwrap()
}

fn scholarship_input() -> ScholarshipInput {
    serde_json::from_value(json!({
        "scholarshipName": "Global Excellence",
        "universityName": "Uni",
        "universityCountry": "Japan",
        "universityCity": "Tokyo",
        "universityWorldRank": 23,
        "subjectCategory": "Engineering",
        "scholarshipCategory": "Full fund",
        "degree": "Masters",
        "applicationFees": 50,
        "serviceCharge": 10,
        "applicationDeadline": "2026-12-31"
    }))
    .unwrap()
}

fn review_by(id: &str, email: &str) -> Review {
    serde_json::from_value(json!({
        "_id": id,
        "scholarshipId": "S1",
        "userEmail": email,
        "ratingPoint": 2,
        "reviewComment": "slow replies"
    }))
    .unwrap()
}

#[tokio::test]
async fn views_are_gated_by_role() {
    let server = MockServer::start().await;
    let api = client(&server);
    let student = session("s@x.com", Role::Student);
    let moderator = session("m@x.com", Role::Moderator);
    let admin = session("a@x.com", Role::Admin);

    assert!(matches!(StudentDashboard::new(&api, None), Err(DashboardError::Unauthenticated)));
    assert!(StudentDashboard::new(&api, Some(&student)).is_ok());
    assert!(matches!(
        ModeratorDashboard::new(&api, Some(&student)),
        Err(DashboardError::Forbidden { role: Role::Student, .. })
    ));
    assert!(ModeratorDashboard::new(&api, Some(&moderator)).is_ok());
    assert!(ModeratorDashboard::new(&api, Some(&admin)).is_ok());
    assert!(matches!(AdminDashboard::new(&api, Some(&moderator)), Err(DashboardError::Forbidden { .. })));
    assert!(AdminDashboard::new(&api, Some(&admin)).is_ok());
}

#[tokio::test]
async fn student_can_only_delete_pending_applications() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/applications/P1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "deletedCount": 1 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/applications/C1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let api = client(&server);
    let student = session("a@x.com", Role::Student);
    let view = StudentDashboard::new(&api, Some(&student)).unwrap();

    assert!(view.delete_application(&application("P1", "pending")).await.unwrap());
    let err = view.delete_application(&application("C1", "completed")).await.unwrap_err();
    assert!(matches!(err, DashboardError::NotAllowed(_)));
}

#[tokio::test]
async fn review_requires_a_completed_application() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/reviews"))
        .and(body_partial_json(json!({
            "scholarshipId": "S1",
            "ratingPoint": 4,
            "reviewComment": "helpful staff",
            "userEmail": "a@x.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "_id": "R1" })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let student = session("a@x.com", Role::Student);
    let mut view = StudentDashboard::new(&api, Some(&student)).unwrap();

    assert!(matches!(view.open_review(application("A1", "processing")), Err(DashboardError::NotAllowed(_))));
    assert!(!view.review_dialog().is_open());

    view.open_review(application("A2", "completed")).unwrap();
    assert!(matches!(view.submit_review(9, "helpful staff").await, Err(DashboardError::InvalidInput(_))));
    assert!(view.review_dialog().is_open(), "invalid input keeps the form open");

    let id = view.submit_review(4, "  helpful staff ").await.unwrap();
    assert_eq!(id.as_deref(), Some("R1"));
    assert!(!view.review_dialog().is_open());
}

#[tokio::test]
async fn student_edits_own_review() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/reviews/user/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "R1", "scholarshipId": "S1", "userEmail": "a@x.com", "ratingPoint": 3, "reviewComment": "ok" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/reviews/R1"))
        .and(body_partial_json(json!({ "ratingPoint": 5, "reviewComment": "better than expected" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "modifiedCount": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let student = session("a@x.com", Role::Student);
    let mut view = StudentDashboard::new(&api, Some(&student)).unwrap();

    let review = view.reviews().await.unwrap().remove(0);
    view.open_edit(review).unwrap();
    assert!(view.submit_edit(5, "better than expected").await.unwrap());
    assert!(!view.edit_dialog().is_open());
}

#[tokio::test]
async fn student_cannot_touch_someone_elses_review() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/reviews/R9"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/reviews/R9"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let api = client(&server);
    let student = session("a@x.com", Role::Student);
    let mut view = StudentDashboard::new(&api, Some(&student)).unwrap();

    let foreign = review_by("R9", "b@x.com");
    assert!(matches!(view.open_edit(foreign.clone()), Err(DashboardError::NotAllowed(_))));
    assert!(!view.edit_dialog().is_open());
    assert!(matches!(view.delete_review(&foreign).await, Err(DashboardError::NotAllowed(_))));
}

#[tokio::test]
async fn moderator_deletes_any_review() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/reviews/R9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "deletedCount": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let moderator = session("m@x.com", Role::Moderator);
    let view = ModeratorDashboard::new(&api, Some(&moderator)).unwrap();

    assert!(view.delete_review(&review_by("R9", "b@x.com").id).await.unwrap());
}

#[tokio::test]
async fn moderator_walks_status_forward_only() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/applications/A1/status"))
        .and(body_partial_json(json!({ "status": "processing" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "modifiedCount": 1 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/applications/A2/status"))
        .and(body_partial_json(json!({ "status": "rejected" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "modifiedCount": 1 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/applications/A3/status"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let api = client(&server);
    let moderator = session("m@x.com", Role::Moderator);
    let view = ModeratorDashboard::new(&api, Some(&moderator)).unwrap();

    assert_eq!(view.advance(&application("A1", "pending")).await.unwrap(), ApplicationStatus::Processing);
    view.reject(&application("A2", "processing")).await.unwrap();

    let done = application("A3", "completed");
    assert!(matches!(view.advance(&done).await, Err(DashboardError::NotAllowed(_))));
    assert!(matches!(view.reject(&done).await, Err(DashboardError::NotAllowed(_))));
}

#[tokio::test]
async fn moderator_feedback_dialog_prefills_and_saves() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/applications/A1/feedback"))
        .and(body_partial_json(json!({ "feedback": "Please upload transcripts" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "modifiedCount": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let moderator = session("m@x.com", Role::Moderator);
    let mut view = ModeratorDashboard::new(&api, Some(&moderator)).unwrap();

    let mut app = application("A1", "processing");
    app.feedback = Some("Missing documents".into());
    assert_eq!(view.open_feedback(app), "Missing documents");
    view.submit_feedback("Please upload transcripts").await.unwrap();
    assert!(!view.feedback_dialog().is_open());
}

#[tokio::test]
async fn admin_adds_scholarship_stamped_with_poster() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scholarships"))
        .and(body_partial_json(json!({
            "scholarshipName": "Global Excellence",
            "universityWorldRank": 23,
            "applicationDeadline": "2026-12-31",
            "postedUserEmail": "a@x.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "insertedId": "S7" })))
        .expect(1)
        .mount(&server)
        .await;

    let input = scholarship_input();

    let api = client(&server);
    let admin = session("a@x.com", Role::Admin);
    let view = AdminDashboard::new(&api, Some(&admin)).unwrap();

    let mut invalid = input.clone();
    invalid.university_world_rank = 0;
    assert!(matches!(view.add_scholarship(invalid).await, Err(DashboardError::InvalidInput(_))));

    assert_eq!(view.add_scholarship(input).await.unwrap().as_deref(), Some("S7"));
}

#[tokio::test]
async fn admin_manages_other_users_only() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/users/U2/role"))
        .and(body_partial_json(json!({ "role": "moderator" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "modifiedCount": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let admin = session("a@x.com", Role::Admin);
    let view = AdminDashboard::new(&api, Some(&admin)).unwrap();

    let other: User = serde_json::from_value(json!({ "_id": "U2", "email": "b@x.com" })).unwrap();
    view.set_role(&other, Role::Moderator).await.unwrap();

    let me: User = serde_json::from_value(json!({ "_id": "U1", "email": "a@x.com", "role": "admin" })).unwrap();
    assert!(matches!(view.set_role(&me, Role::Student).await, Err(DashboardError::NotAllowed(_))));
    assert!(matches!(view.delete_user(&me).await, Err(DashboardError::NotAllowed(_))));
}

#[tokio::test]
async fn overview_depends_on_role() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totals": { "scholarships": 12, "applications": 30, "users": 40, "reviews": 8 },
            "applicationsByStatus": [ { "name": "pending", "value": 10 }, { "name": "completed", "value": 5 } ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/applications/my-applications/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            application_json("A1", "S1", "paid", "pending"),
            application_json("A2", "S2", "paid", "completed"),
            application_json("A3", "S3", "unpaid", "pending"),
            application_json("A4", "S4", "paid", "completed")
        ])))
        .mount(&server)
        .await;

    let api = client(&server);

    let admin = session("a@x.com", Role::Admin);
    let Overview::Admin(stats) = dashboard::overview(&api, Some(&admin)).await.unwrap() else { panic!("admin overview") };
    assert_eq!(stats.totals.users, 40);
    assert_eq!(stats.count_for(ApplicationStatus::Completed), 5);
    assert_eq!(stats.count_for(ApplicationStatus::Rejected), 0);

    let student = session("s@x.com", Role::Student);
    let Overview::Student(o) = dashboard::overview(&api, Some(&student)).await.unwrap() else { panic!("student overview") };
    assert_eq!((o.total, o.pending, o.completed), (4, 2, 2));
    assert_eq!(o.recent.len(), 3);

    let moderator = session("m@x.com", Role::Moderator);
    assert_eq!(dashboard::overview(&api, Some(&moderator)).await.unwrap(), Overview::Moderator);
    assert!(matches!(dashboard::overview(&api, None).await, Err(DashboardError::Unauthenticated)));
}

#[tokio::test]
async fn admin_updates_and_deletes_scholarships() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/scholarships/S7"))
        .and(body_partial_json(json!({ "scholarshipName": "Global Excellence", "applicationFees": 50 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "modifiedCount": 1 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/scholarships/S7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "deletedCount": 1 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/scholarships/S8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "deletedCount": 0 })))
        .mount(&server)
        .await;

    let api = client(&server);
    let admin = session("a@x.com", Role::Admin);
    let view = AdminDashboard::new(&api, Some(&admin)).unwrap();

    let mut blank = scholarship_input();
    blank.scholarship_name = "  ".into();
    assert!(matches!(view.update_scholarship("S7", &blank).await, Err(DashboardError::InvalidInput(_))));

    assert!(view.update_scholarship("S7", &scholarship_input()).await.unwrap());
    assert!(view.delete_scholarship("S7").await.unwrap());
    assert!(!view.delete_scholarship("S8").await.unwrap());
}
