//! E2E tests for the incident register: create, list, show, update and
//! delete through the client library.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod harness;

use chrono::{Duration, Utc};

use firelog::api::{ApiError, meldunki_client};
use firelog_common::dto::meldunki::{
    CreateMeldunekRequest, ListMeldunkiQuery, SortField, SortOrder, UpdateMeldunekRequest,
};
use firelog_common::error_code::ErrorCode;
use firelog_common::role::Role;

fn report(name: &str, hours_ago: i64) -> CreateMeldunekRequest {
    let start = Utc::now() - Duration::hours(hours_ago);
    CreateMeldunekRequest {
        incident_name: name.to_string(),
        incident_date: start.date_naive(),
        location_address: "ul. Strażacka 1, Dębina".to_string(),
        description: "Zabezpieczenie miejsca zdarzenia i przewietrzenie".to_string(),
        forces_and_resources: Some("GBA 2,5/16".to_string()),
        commander: Some("dh. Nowak".to_string()),
        driver: None,
        start_time: start,
        end_time: Some(start + Duration::minutes(45)),
    }
}

fn code_of(err: &anyhow::Error) -> ErrorCode {
    err.downcast_ref::<ApiError>()
        .unwrap_or_else(|| panic!("expected ApiError, got: {err:#}"))
        .code
}

#[tokio::test]
async fn full_report_lifecycle() {
    let h = harness::TestHarness::new().await;
    let author = h.user("autor@osp.pl", Role::Member).await;
    let client = h.login("autor@osp.pl").await;

    let created = harness::with_client(&client, |c| {
        meldunki_client::create(&c, &report("Pożar trawy", 5)).unwrap();
        meldunki_client::create(&c, &report("Zadymienie piwnicy", 3)).unwrap()
    })
    .await;
    assert_eq!(created.user_id, author.id);
    assert_eq!(created.fire_department_id, h.backends.department.id);

    let page = harness::with_client(&client, |c| {
        meldunki_client::list(
            &c,
            &ListMeldunkiQuery {
                search: Some("PIWNIC".to_string()),
                ..Default::default()
            },
        )
    })
    .await
    .unwrap();
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.items[0].id, created.id);

    let id = created.id.to_string();
    let updated = harness::with_client(&client, move |c| {
        meldunki_client::update(
            &c,
            &id,
            &UpdateMeldunekRequest {
                driver: Some("dh. Wiśniewski".to_string()),
                ..Default::default()
            },
        )
    })
    .await
    .unwrap();
    assert_eq!(updated.driver.as_deref(), Some("dh. Wiśniewski"));
    assert_eq!(updated.incident_name, "Zadymienie piwnicy");

    let id = created.id.to_string();
    harness::with_client(&client, move |c| meldunki_client::delete(&c, &id))
        .await
        .unwrap();
    let id = created.id.to_string();
    let err = harness::with_client(&client, move |c| meldunki_client::get(&c, &id))
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::MeldunekNotFound);
}

#[tokio::test]
async fn listing_pages_and_sorts() {
    let h = harness::TestHarness::new().await;
    h.user("autor@osp.pl", Role::Member).await;
    let client = h.login("autor@osp.pl").await;

    harness::with_client(&client, |c| {
        for (i, hours) in [72, 48, 24].into_iter().enumerate() {
            meldunki_client::create(&c, &report(&format!("Zdarzenie {i}"), hours)).unwrap();
        }
    })
    .await;

    let page = harness::with_client(&client, |c| {
        meldunki_client::list(
            &c,
            &ListMeldunkiQuery {
                page: Some(1),
                limit: Some(2),
                sort_by: Some(SortField::IncidentDate),
                order: Some(SortOrder::Asc),
                ..Default::default()
            },
        )
    })
    .await
    .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].incident_name, "Zdarzenie 0");
    assert_eq!(page.pagination.total, 3);
    assert_eq!(page.pagination.total_pages, 2);

    let err = harness::with_client(&client, |c| {
        meldunki_client::list(
            &c,
            &ListMeldunkiQuery {
                limit: Some(0),
                ..Default::default()
            },
        )
    })
    .await
    .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::ValidationError);
}

#[tokio::test]
async fn reports_are_scoped_to_department() {
    let h = harness::TestHarness::new().await;
    h.user("autor@osp.pl", Role::Member).await;
    let other = h.backends.other_department();
    h.backends
        .user_in(&other, "obcy@osp.pl", Role::Admin)
        .await;

    let author = h.login("autor@osp.pl").await;
    let outsider = h.login("obcy@osp.pl").await;

    let created = harness::with_client(&author, |c| {
        meldunki_client::create(&c, &report("Wypadek drogowy", 2))
    })
    .await
    .unwrap();

    let id = created.id.to_string();
    let err = harness::with_client(&outsider, move |c| meldunki_client::get(&c, &id))
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::Forbidden);

    let page = harness::with_client(&outsider, |c| {
        meldunki_client::list(&c, &ListMeldunkiQuery::default())
    })
    .await
    .unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn only_author_or_commander_may_edit() {
    let h = harness::TestHarness::new().await;
    h.user("autor@osp.pl", Role::Member).await;
    h.user("kolega@osp.pl", Role::Member).await;
    h.user("dowodca@osp.pl", Role::Commander).await;

    let author = h.login("autor@osp.pl").await;
    let colleague = h.login("kolega@osp.pl").await;
    let commander = h.login("dowodca@osp.pl").await;

    let created = harness::with_client(&author, |c| {
        meldunki_client::create(&c, &report("Pompowanie wody", 4))
    })
    .await
    .unwrap();

    let id = created.id.to_string();
    let err = harness::with_client(&colleague, move |c| meldunki_client::delete(&c, &id))
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), ErrorCode::Forbidden);

    let id = created.id.to_string();
    harness::with_client(&commander, move |c| meldunki_client::delete(&c, &id))
        .await
        .unwrap();
}

#[tokio::test]
async fn future_start_time_is_rejected() {
    let h = harness::TestHarness::new().await;
    h.user("autor@osp.pl", Role::Member).await;
    let client = h.login("autor@osp.pl").await;

    let mut req = report("Ćwiczenia", 0);
    req.start_time = Utc::now() + Duration::hours(6);
    req.end_time = None;
    let err = harness::with_client(&client, move |c| meldunki_client::create(&c, &req))
        .await
        .unwrap_err();
    let api = err.downcast_ref::<ApiError>().unwrap();
    assert_eq!(api.code, ErrorCode::ValidationError);
    assert!(api.details.as_ref().unwrap().contains_key("start_time"));
}
