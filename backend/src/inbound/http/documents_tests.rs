//! Tests for the document vault handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::test as actix_test;
use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::domain::ports::{MockBlobStore, MockDocumentRepository};
use crate::domain::{DocumentCategory, NewDocument, SubscriptionStatus, UserId};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::test_utils::{TestPorts, as_user, send, settings};

const SUBJECT: &str = "user_documents";
const BOUNDARY: &str = "patrimony-test-boundary";

enum Part<'a> {
    File {
        file_name: &'a str,
        mime: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                file_name,
                mime,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(parts: &[Part<'_>]) -> actix_test::TestRequest {
    as_user(
        actix_test::TestRequest::post()
            .uri("/api/v1/documents")
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(parts)),
        SUBJECT,
    )
}

fn stored(document: &NewDocument) -> Document {
    Document {
        id: Uuid::new_v4(),
        user_id: document.user_id,
        entity_id: document.entity_id,
        entity_name: None,
        name: document.name.clone(),
        file_name: document.file_name.clone(),
        file_size: document.file_size,
        mime_type: document.mime_type.clone(),
        blob_url: document.blob_url.clone(),
        category: document.category,
        created_at: Utc::now(),
    }
}

fn state_with(
    ports: &TestPorts,
    documents: MockDocumentRepository,
    blobs: MockBlobStore,
) -> HttpState {
    HttpState::new(
        HttpStatePorts {
            documents: Arc::new(documents),
            blobs: Arc::new(blobs),
            ..ports.ports()
        },
        settings(),
    )
}

#[actix_web::test]
async fn upload_stores_blob_under_user_path_then_metadata() {
    let ports = TestPorts::default();
    let user = ports.subscriber(SUBJECT, SubscriptionStatus::Active).await;
    let user_id: UserId = user.id;
    let expected_path = format!("documents/{user_id}/hale-trust.pdf");

    let mut blobs = MockBlobStore::new();
    blobs
        .expect_put()
        .withf(move |path, content_type, bytes| {
            path == expected_path && content_type == "application/pdf" && bytes == b"%PDF-1.7"
        })
        .times(1)
        .returning(|path, _, _| Ok(format!("https://blob.test/{path}")));
    let mut documents = MockDocumentRepository::new();
    documents
        .expect_insert()
        .withf(move |document| {
            document.user_id == user_id
                && document.name == "hale-trust"
                && document.category == DocumentCategory::Trust
                && document.file_size == 8
        })
        .times(1)
        .returning(|document| Ok(stored(document)));

    let (status, body) = send(
        state_with(&ports, documents, blobs),
        upload_request(&[
            Part::File {
                file_name: "hale-trust.pdf",
                mime: "application/pdf",
                bytes: b"%PDF-1.7",
            },
            Part::Text {
                name: "category",
                value: "trust",
            },
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "hale-trust");
    assert_eq!(body["fileName"], "hale-trust.pdf");
    assert_eq!(body["category"], "trust");
    assert_eq!(
        body["blobUrl"],
        format!("https://blob.test/documents/{user_id}/hale-trust.pdf")
    );
}

#[actix_web::test]
async fn unknown_category_falls_back_to_general() {
    let ports = TestPorts::default();
    ports.subscriber(SUBJECT, SubscriptionStatus::Active).await;
    let mut blobs = MockBlobStore::new();
    blobs
        .expect_put()
        .returning(|path, _, _| Ok(format!("https://blob.test/{path}")));
    let mut documents = MockDocumentRepository::new();
    documents
        .expect_insert()
        .withf(|document| {
            document.category == DocumentCategory::General && document.name == "Scan"
        })
        .returning(|document| Ok(stored(document)));

    let (status, body) = send(
        state_with(&ports, documents, blobs),
        upload_request(&[
            Part::File {
                file_name: "scan.png",
                mime: "image/png",
                bytes: &[0x89, 0x50, 0x4e, 0x47],
            },
            Part::Text {
                name: "category",
                value: "receipts",
            },
            Part::Text {
                name: "name",
                value: "Scan",
            },
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "general");
}

#[actix_web::test]
async fn missing_file_is_rejected() {
    let ports = TestPorts::default();
    ports.subscriber(SUBJECT, SubscriptionStatus::Active).await;
    let (status, body) = send(
        ports.state(),
        upload_request(&[Part::Text {
            name: "name",
            value: "Nothing attached",
        }]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "File is required");
}

#[actix_web::test]
async fn disallowed_mime_type_is_rejected_before_storage() {
    let ports = TestPorts::default();
    ports.subscriber(SUBJECT, SubscriptionStatus::Active).await;
    let mut blobs = MockBlobStore::new();
    blobs.expect_put().never();

    let (status, body) = send(
        state_with(&ports, MockDocumentRepository::new(), blobs),
        upload_request(&[Part::File {
            file_name: "run.sh",
            mime: "text/x-shellscript",
            bytes: b"#!/bin/sh",
        }]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "File type not allowed. Accepted: PDF, DOCX, XLSX, PNG, JPG"
    );
}

#[actix_web::test]
async fn deleting_missing_document_is_not_found() {
    let ports = TestPorts::default();
    ports.subscriber(SUBJECT, SubscriptionStatus::Active).await;
    let req = as_user(
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/documents/{}", Uuid::new_v4())),
        SUBJECT,
    );
    let (status, body) = send(ports.state(), req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Document not found");
}

#[actix_web::test]
async fn list_serialises_rfc3339_timestamps() {
    let ports = TestPorts::default();
    let user = ports.subscriber(SUBJECT, SubscriptionStatus::Active).await;
    let user_id = user.id;
    let mut documents = MockDocumentRepository::new();
    documents.expect_list_for_user().returning(move |_| {
        Ok(vec![stored(&NewDocument {
            user_id,
            entity_id: None,
            name: "Operating Agreement".to_owned(),
            file_name: "oa.docx".to_owned(),
            file_size: 2_048,
            mime_type: DocumentMime::Docx.as_str().to_owned(),
            blob_url: "https://blob.test/oa.docx".to_owned(),
            category: DocumentCategory::OperatingAgreement,
        })])
    });

    let req = as_user(actix_test::TestRequest::get().uri("/api/v1/documents"), SUBJECT);
    let (status, body) = send(state_with(&ports, documents, MockBlobStore::new()), req).await;

    assert_eq!(status, StatusCode::OK);
    let first = &body[0];
    assert_eq!(first["category"], "operating-agreement");
    assert_eq!(first["fileSize"], 2_048);
    let created = first["createdAt"].as_str().expect("createdAt");
    assert!(chrono::DateTime::parse_from_rfc3339(created).is_ok());
}
