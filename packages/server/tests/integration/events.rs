use serde_json::json;

use crate::common::{TestApp, file_field, routes, sample_bytes, strings};

fn png(field: &str, name: &str, seed: u8) -> crate::common::FileField {
    file_field(field, name, "image/png", &sample_bytes(1500, seed))
}

fn pdf(name: &str, seed: u8) -> crate::common::FileField {
    file_field("pdfFile", name, "application/pdf", &sample_bytes(3000, seed))
}

mod create {
    use super::*;

    #[tokio::test]
    async fn stores_fields_and_files_in_request_order() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .create_event(
                &[
                    ("eventName", "Spring Hackathon"),
                    ("eventAbout", "24 hours of building"),
                    ("eventWinner", "Team Rocket"),
                    ("guests", "Ada Lovelace"),
                    ("guests", "Grace Hopper"),
                    ("organizers[]", "Robotics Society"),
                ],
                vec![
                    png("guestImages", "ada.png", 1),
                    png("guestImages", "grace.png", 2),
                    png("winnerRunnerUpImages", "podium.png", 3),
                    png("eventImages", "crowd.png", 4),
                    pdf("brochure.pdf", 5),
                ],
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "Create failed: {}", res.text);
        let event = &res.body["event"];
        assert_eq!(event["name"], "Spring Hackathon");
        assert_eq!(event["winner"], "Team Rocket");
        assert!(event["runner_up"].is_null());
        assert_eq!(event["guests"], json!(["Ada Lovelace", "Grace Hopper"]));
        assert_eq!(event["organizers"], json!(["Robotics Society"]));
        assert_eq!(strings(&event["guest_images"]).len(), 2);
        assert_eq!(strings(&event["winner_images"]).len(), 1);
        assert_eq!(strings(&event["random_images"]).len(), 1);
        assert!(event["pdf_file"].is_string());
        assert_eq!(res.body["deletions"], json!([]));
        assert_eq!(res.body["upload_failures"], json!([]));

        let guest_images = strings(&event["guest_images"]);
        let first = app.download(&guest_images[0], None).await;
        assert_eq!(first.status, 200);
        assert_eq!(first.bytes, sample_bytes(1500, 1));
        let second = app.download(&guest_images[1], None).await;
        assert_eq!(second.bytes, sample_bytes(1500, 2));
    }

    #[tokio::test]
    async fn event_without_files_has_empty_collections() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .create_event(&[("eventName", "Board Game Night")], vec![], &token)
            .await;

        assert_eq!(res.status, 201, "Create failed: {}", res.text);
        let event = &res.body["event"];
        assert_eq!(event["about"], "");
        assert!(event["pdf_file"].is_null());
        assert_eq!(event["guest_images"], json!([]));
        assert_eq!(event["winner_images"], json!([]));
        assert_eq!(event["random_images"], json!([]));
    }

    #[tokio::test]
    async fn name_is_required() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .create_event(&[("eventAbout", "nameless")], vec![], &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_file_field_is_rejected_and_nothing_is_stored() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .create_event(
                &[("eventName", "Quiz")],
                vec![
                    png("guestImages", "ok.png", 1),
                    png("avatar", "me.png", 2),
                ],
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let report = app.get_with_token(routes::INTEGRITY, &token).await;
        assert_eq!(report.body["unreferenced_files"], json!([]));
    }

    #[tokio::test]
    async fn deletion_fields_are_not_accepted() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .create_event(&[("eventName", "Quiz"), ("deletePdf", "true")], vec![], &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn oversized_file_is_reported_and_the_rest_is_saved() {
        let app = TestApp::spawn_with(2048, 1024 * 1024).await;
        let token = app.admin_token().await;

        let res = app
            .create_event(
                &[("eventName", "Photo Walk")],
                vec![
                    png("eventImages", "small.png", 1),
                    file_field("eventImages", "huge.png", "image/png", &sample_bytes(5000, 2)),
                ],
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "Create failed: {}", res.text);
        assert_eq!(strings(&res.body["event"]["random_images"]).len(), 1);
        let failures = res.body["upload_failures"].as_array().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0]["field"], "eventImages");
        assert_eq!(failures[0]["filename"], "huge.png");
        assert_eq!(failures[0]["message"], "File exceeds maximum size of 2048 bytes");
    }

    #[tokio::test]
    async fn request_over_the_body_limit_is_rejected() {
        let app = TestApp::spawn_with(1024 * 1024, 4096).await;
        let token = app.admin_token().await;

        let res = app
            .create_event(
                &[("eventName", "Photo Walk")],
                vec![file_field("eventImages", "big.png", "image/png", &sample_bytes(10_000, 1))],
                &token,
            )
            .await;

        assert_eq!(res.status, 413);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app
            .create_event(&[("eventName", "Quiz")], vec![], "not.a.jwt")
            .await;

        assert_eq!(res.status, 401);
    }
}

mod read {
    use super::*;

    #[tokio::test]
    async fn list_and_get_are_public_and_list_is_newest_first() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let older = app
            .create_event(&[("eventName", "First Meetup")], vec![], &token)
            .await
            .event_id();
        let newer = app
            .create_event(&[("eventName", "Second Meetup")], vec![], &token)
            .await
            .event_id();

        let list = app.get_without_token(routes::EVENTS).await;
        assert_eq!(list.status, 200);
        let ids: Vec<i64> = list.body["events"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![newer as i64, older as i64]);

        let one = app.get_without_token(&routes::event(older)).await;
        assert_eq!(one.status, 200);
        assert_eq!(one.body["name"], "First Meetup");
    }

    #[tokio::test]
    async fn missing_event_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::event(999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn deleting_the_middle_image_keeps_the_others_in_order() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let created = app
            .create_event(
                &[("eventName", "Gala")],
                vec![
                    png("guestImages", "a.png", 1),
                    png("guestImages", "b.png", 2),
                    png("guestImages", "c.png", 3),
                ],
                &token,
            )
            .await;
        let id = created.event_id();
        let before = strings(&created.body["event"]["guest_images"]);

        let res = app
            .update_event(
                id,
                &[("eventName", "Gala"), ("deleteImages", before[1].as_str())],
                vec![png("guestImages", "d.png", 4)],
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "Update failed: {}", res.text);
        let after = strings(&res.body["event"]["guest_images"]);
        assert_eq!(after.len(), 3);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[1], before[2]);
        assert_ne!(after[2], before[1]);
        assert_eq!(
            res.body["deletions"],
            json!([{"file_id": before[1], "status": "deleted"}])
        );

        assert_eq!(app.download(&before[1], None).await.status, 404);
        assert_eq!(app.download(&after[2], None).await.bytes, sample_bytes(1500, 4));
    }

    #[tokio::test]
    async fn text_fields_are_replaced() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let id = app
            .create_event(
                &[("eventName", "Gala"), ("eventWinner", "Blue"), ("guests", "Ada")],
                vec![],
                &token,
            )
            .await
            .event_id();

        let res = app
            .update_event(id, &[("eventName", "Winter Gala")], vec![], &token)
            .await;

        assert_eq!(res.status, 200, "Update failed: {}", res.text);
        assert_eq!(res.body["event"]["name"], "Winter Gala");
        assert!(res.body["event"]["winner"].is_null());
        assert_eq!(res.body["event"]["guests"], json!([]));
    }

    #[tokio::test]
    async fn delete_pdf_clears_the_slot_and_removes_the_file() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let created = app
            .create_event(&[("eventName", "Talk")], vec![pdf("slides.pdf", 1)], &token)
            .await;
        let id = created.event_id();
        let old_pdf = created.body["event"]["pdf_file"].as_str().unwrap().to_string();

        let res = app
            .update_event(id, &[("eventName", "Talk"), ("deletePdf", "true")], vec![], &token)
            .await;

        assert_eq!(res.status, 200, "Update failed: {}", res.text);
        assert!(res.body["event"]["pdf_file"].is_null());
        assert_eq!(
            res.body["deletions"],
            json!([{"file_id": old_pdf, "status": "deleted"}])
        );
        assert_eq!(app.download(&old_pdf, None).await.status, 404);
    }

    #[tokio::test]
    async fn a_new_pdf_wins_over_deleting_the_old_one() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let created = app
            .create_event(&[("eventName", "Talk")], vec![pdf("v1.pdf", 1)], &token)
            .await;
        let id = created.event_id();
        let old_pdf = created.body["event"]["pdf_file"].as_str().unwrap().to_string();

        let res = app
            .update_event(
                id,
                &[("eventName", "Talk"), ("deletePdf", "true")],
                vec![pdf("v2.pdf", 2)],
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "Update failed: {}", res.text);
        let new_pdf = res.body["event"]["pdf_file"].as_str().unwrap().to_string();
        assert_ne!(new_pdf, old_pdf);
        assert_eq!(app.download(&old_pdf, None).await.status, 404);

        let file = app.download(&new_pdf, None).await;
        assert_eq!(file.status, 200);
        assert_eq!(file.bytes, sample_bytes(3000, 2));
    }

    #[tokio::test]
    async fn unknown_deletion_id_is_reported_without_failing_the_request() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let created = app
            .create_event(
                &[("eventName", "Gala")],
                vec![png("eventImages", "a.png", 1)],
                &token,
            )
            .await;
        let id = created.event_id();
        let kept = strings(&created.body["event"]["random_images"]);
        let ghost = "01936f0e-1234-7abc-8000-000000000001";

        let res = app
            .update_event(id, &[("eventName", "Gala"), ("deleteImages", ghost)], vec![], &token)
            .await;

        assert_eq!(res.status, 200, "Update failed: {}", res.text);
        assert_eq!(
            res.body["deletions"],
            json!([{"file_id": ghost, "status": "not_found"}])
        );
        assert_eq!(strings(&res.body["event"]["random_images"]), kept);
    }

    #[tokio::test]
    async fn malformed_deletion_id_changes_nothing() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let created = app
            .create_event(
                &[("eventName", "Gala")],
                vec![png("eventImages", "a.png", 1)],
                &token,
            )
            .await;
        let id = created.event_id();
        let image = strings(&created.body["event"]["random_images"]).remove(0);

        let res = app
            .update_event(
                id,
                &[("eventName", "Renamed"), ("deleteImages", "507f1f77bcf86cd799439011")],
                vec![],
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let event = app.get_without_token(&routes::event(id)).await;
        assert_eq!(event.body["name"], "Gala");
        assert_eq!(app.download(&image, None).await.status, 200);
    }

    #[tokio::test]
    async fn missing_event_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .update_event(999, &[("eventName", "Nothing")], vec![], &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn removes_the_event_and_every_file_it_references() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let created = app
            .create_event(
                &[("eventName", "Farewell")],
                vec![
                    png("guestImages", "g.png", 1),
                    png("winnerRunnerUpImages", "w.png", 2),
                    pdf("program.pdf", 3),
                ],
                &token,
            )
            .await;
        let id = created.event_id();
        let event = &created.body["event"];
        let mut files = strings(&event["guest_images"]);
        files.extend(strings(&event["winner_images"]));
        files.push(event["pdf_file"].as_str().unwrap().to_string());

        let res = app.delete_with_token(&routes::event(id), &token).await;

        assert_eq!(res.status, 200, "Delete failed: {}", res.text);
        assert_eq!(res.body["id"], id);
        let deletions = res.body["deletions"].as_array().unwrap();
        assert_eq!(deletions.len(), 3);
        assert!(deletions.iter().all(|d| d["status"] == "deleted"));

        for file_id in &files {
            assert_eq!(app.download(file_id, None).await.status, 404);
        }
        let gone = app.get_without_token(&routes::event(id)).await;
        assert_eq!(gone.status, 404);

        let report = app.get_with_token(routes::INTEGRITY, &token).await;
        assert_eq!(report.body["unreferenced_files"], json!([]));
        assert_eq!(report.body["orphaned_chunk_owners"], json!([]));
    }

    #[tokio::test]
    async fn missing_event_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app.delete_with_token(&routes::event(999), &token).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
