
use chrono::Duration;
use test_fixtures::*;
use test_mocks::*;

use tlc_listings::{
    api_errors::RemoteError,
    entities::{
        draft::{DraftUpdate, FormMode, SubmissionState},
        image::PickedFile,
        listing::{FuelType, ListingItem, TransactionType},
    },
    entities::session::AccessToken,
    errors::AppError,
    media::{image_check::ImagePolicy, previews::PreviewRegistry},
    store::draft_store::{DraftStore, StoreLimits},
    use_cases::drafts::DraftHandler,
};

const FIVE_MB: usize = 5 * 1024 * 1024;

fn handler(listings: MockListingsRepo) -> DraftHandler<MockListingsRepo> {
    handler_with(listings, DraftStore::new())
}

fn handler_with(listings: MockListingsRepo, store: DraftStore) -> DraftHandler<MockListingsRepo> {
    DraftHandler::new(
        listings,
        store,
        PreviewRegistry::new(),
        ImagePolicy {
            max_bytes: FIVE_MB,
            max_images: 8,
        },
    )
}

fn jpeg_file(name: &str, size: usize) -> PickedFile {
    PickedFile {
        file_name: name.to_string(),
        data: jpeg_bytes(size),
    }
}

#[test]
fn new_draft_starts_from_form_defaults() {
    let drafts = handler(MockListingsRepo::new());

    let view = drafts.create_draft(&token()).unwrap();

    assert_eq!(view.mode, FormMode::Create);
    assert_eq!(view.state, SubmissionState::Editing);
    assert_eq!(view.transaction_type, TransactionType::Rental);
    assert_eq!(view.location.state, "NY");
    assert_eq!(view.price, 0.0);
    assert!(view.active);
    match &view.item {
        ListingItem::Vehicle(vehicle) => {
            assert_eq!(vehicle.make, "Toyota");
            assert_eq!(vehicle.model, "Camry");
            assert_eq!(vehicle.mileage, 0);
            assert_eq!(vehicle.fuel, FuelType::Gas);
        }
        other => panic!("expected a vehicle, got {:?}", other),
    }
    assert!(drafts.store.contains(&view.id));
}

#[test]
fn field_updates_only_touch_what_was_sent() {
    let drafts = handler(MockListingsRepo::new());
    let id = drafts.create_draft(&token()).unwrap().id;

    let update: DraftUpdate = serde_json::from_value(serde_json::json!({
        "title": "Clean Camry",
        "price": 400,
        "item": { "color": "Silver", "plate_number": "ignored for vehicles" }
    }))
    .unwrap();

    let view = drafts.update(id, update).unwrap();

    assert_eq!(view.title, "Clean Camry");
    assert_eq!(view.price, 400.0);
    assert_eq!(view.location.state, "NY");
    match &view.item {
        ListingItem::Vehicle(vehicle) => {
            assert_eq!(vehicle.color, "Silver");
            assert_eq!(vehicle.make, "Toyota");
        }
        other => panic!("expected a vehicle, got {:?}", other),
    }
}

#[test]
fn accepted_photos_get_previews() {
    let drafts = handler(MockListingsRepo::new());
    let id = drafts.create_draft(&token()).unwrap().id;

    let view = drafts
        .attach_images(id, vec![jpeg_file("camry.jpg", TWO_MB)])
        .unwrap();

    assert_eq!(view.images.len(), 1);
    assert!(view.images[0].local);
    assert!(view.images[0].src.starts_with("/api/v1/previews/"));
    assert_eq!(drafts.previews.live_count(), 1);
}

#[test]
fn oversized_photo_is_rejected() {
    let drafts = handler(MockListingsRepo::new());
    let id = drafts.create_draft(&token()).unwrap().id;

    let result = drafts.attach_images(id, vec![jpeg_file("huge.jpg", FIVE_MB + 1)]);

    assert!(matches!(
        result,
        Err(AppError::ValidationError(ref errors)) if errors[0].field == "images"
    ));
    assert_eq!(drafts.view(id).unwrap().images.len(), 0);
    assert_eq!(drafts.previews.live_count(), 0);
}

#[test]
fn unsupported_type_rejects_the_whole_batch() {
    let drafts = handler(MockListingsRepo::new());
    let id = drafts.create_draft(&token()).unwrap().id;

    let files = vec![
        jpeg_file("good.jpg", 1024),
        PickedFile {
            file_name: "anim.gif".to_string(),
            data: gif_bytes(),
        },
    ];

    assert!(drafts.attach_images(id, files).is_err());
    assert_eq!(drafts.view(id).unwrap().images.len(), 0);
}

#[test]
fn photo_cap_is_enforced() {
    let drafts = handler(MockListingsRepo::new());
    let id = drafts.create_draft(&token()).unwrap().id;

    let eight: Vec<PickedFile> = (0..8).map(|i| jpeg_file(&format!("{}.jpg", i), 64)).collect();
    drafts.attach_images(id, eight).unwrap();

    let result = drafts.attach_images(id, vec![jpeg_file("ninth.jpg", 64)]);

    assert!(matches!(result, Err(AppError::ValidationError(_))));
    assert_eq!(drafts.view(id).unwrap().images.len(), 8);
}

#[tokio::test]
async fn removing_a_local_photo_releases_its_preview() {
    let mut listings = MockListingsRepo::new();
    listings.expect_delete_photo().times(0);
    let drafts = handler(listings);
    let id = drafts.create_draft(&token()).unwrap().id;
    drafts.attach_images(id, vec![jpeg_file("camry.jpg", 1024)]).unwrap();

    let view = drafts.remove_image(&token(), id, 0).await.unwrap();

    assert!(view.images.is_empty());
    assert_eq!(drafts.previews.live_count(), 0);
}

#[tokio::test]
async fn removing_a_hosted_photo_deletes_it_remotely_first() {
    let mut listings = MockListingsRepo::new();
    listings
        .expect_get_listing()
        .withf(|_, id| id == "abc")
        .returning(|_, _| Ok(listing_record("abc", true)));
    listings
        .expect_delete_photo()
        .times(1)
        .withf(|_, public_id| public_id == "listing/abc")
        .returning(|_, _| Ok(()));

    let drafts = handler(listings);
    let view = drafts.open_edit_draft(&token(), "abc").await.unwrap();
    assert_eq!(view.mode, FormMode::Edit { listing_id: "abc".to_string() });
    assert_eq!(view.images.len(), 1);

    let view = drafts.remove_image(&token(), view.id, 0).await.unwrap();
    assert!(view.images.is_empty());
}

#[tokio::test]
async fn failed_remote_photo_delete_keeps_the_photo() {
    let mut listings = MockListingsRepo::new();
    listings
        .expect_get_listing()
        .returning(|_, _| Ok(listing_record("abc", true)));
    listings
        .expect_delete_photo()
        .returning(|_, _| Err(RemoteError::Timeout));

    let drafts = handler(listings);
    let id = drafts.open_edit_draft(&token(), "abc").await.unwrap().id;

    assert!(drafts.remove_image(&token(), id, 0).await.is_err());
    assert_eq!(drafts.view(id).unwrap().images.len(), 1);
}

#[tokio::test]
async fn out_of_range_photo_index_is_not_found() {
    let drafts = handler(MockListingsRepo::new());
    let id = drafts.create_draft(&token()).unwrap().id;

    let result = drafts.remove_image(&token(), id, 3).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[test]
fn discard_releases_previews_and_forgets_the_form() {
    let drafts = handler(MockListingsRepo::new());
    let id = drafts.create_draft(&token()).unwrap().id;
    drafts.attach_images(id, vec![jpeg_file("a.jpg", 64), jpeg_file("b.jpg", 64)]).unwrap();
    assert_eq!(drafts.previews.live_count(), 2);

    drafts.discard(id).unwrap();

    assert_eq!(drafts.previews.live_count(), 0);
    assert!(matches!(drafts.view(id), Err(AppError::NotFound(_))));
}

#[test]
fn busy_form_is_a_conflict() {
    let drafts = handler(MockListingsRepo::new());
    let id = drafts.create_draft(&token()).unwrap().id;

    let held = drafts.checkout(id).unwrap();

    assert!(matches!(drafts.update(id, DraftUpdate::default()), Err(AppError::Conflict(_))));
    assert!(matches!(drafts.checkout(id), Err(AppError::Conflict(_))));

    drop(held);
    assert!(drafts.checkout(id).is_ok());
}

#[test]
fn idle_forms_are_purged_with_their_previews() {
    let drafts = handler(MockListingsRepo::new());
    let idle = drafts.create_draft(&token()).unwrap().id;
    let busy = drafts.create_draft(&token()).unwrap().id;
    drafts.attach_images(idle, vec![jpeg_file("a.jpg", 64)]).unwrap();

    assert_eq!(drafts.purge_idle(Duration::minutes(60)), 0);

    let held = drafts.checkout(busy).unwrap();
    let purged = drafts.purge_idle(Duration::minutes(-1));
    drop(held);

    assert_eq!(purged, 1);
    assert!(!drafts.store.contains(&idle));
    assert!(drafts.store.contains(&busy));
    assert_eq!(drafts.previews.live_count(), 0);
}

#[test]
fn validate_reports_without_changing_state() {
    let drafts = handler(MockListingsRepo::new());
    let id = drafts.create_draft(&token()).unwrap().id;

    let report = drafts.validate(id).unwrap();

    assert!(!report.valid);
    assert!(report.field_errors.contains_key("title"));
    assert!(report.field_errors.contains_key("images"));
    assert_eq!(drafts.view(id).unwrap().state, SubmissionState::Editing);
}

#[test]
fn one_caller_cannot_hold_more_than_their_share_of_forms() {
    let store = DraftStore::with_limits(StoreLimits {
        max_forms: 10,
        max_per_owner: 2,
    });
    let drafts = handler_with(MockListingsRepo::new(), store);

    drafts.create_draft(&token()).unwrap();
    let second = drafts.create_draft(&token()).unwrap().id;

    let refused = drafts.create_draft(&token());
    assert!(matches!(refused, Err(AppError::TooManyRequests { .. })));

    // Someone else still gets a form.
    assert!(drafts.create_draft(&AccessToken::bearer("another-user")).is_ok());

    // Discarding one frees the slot.
    drafts.discard(second).unwrap();
    assert!(drafts.create_draft(&token()).is_ok());
    assert_eq!(drafts.store.len(), 3);
}

#[test]
fn store_refuses_forms_once_full() {
    let store = DraftStore::with_limits(StoreLimits {
        max_forms: 2,
        max_per_owner: 5,
    });
    let drafts = handler_with(MockListingsRepo::new(), store);

    drafts.create_draft(&AccessToken::bearer("a")).unwrap();
    drafts.create_draft(&AccessToken::bearer("b")).unwrap();

    match drafts.create_draft(&AccessToken::bearer("c")) {
        Err(AppError::TooManyRequests { retry_after, message }) => {
            assert_eq!(retry_after, None);
            assert!(message.contains("Too many listing forms"));
        }
        other => panic!("expected the store to be full, got {:?}", other.map(|v| v.id)),
    }
    assert_eq!(drafts.store.len(), 2);
}

#[tokio::test]
async fn edit_forms_count_against_the_same_cap() {
    let mut listings = MockListingsRepo::new();
    listings
        .expect_get_listing()
        .returning(|_, id| Ok(listing_record(id, true)));

    let store = DraftStore::with_limits(StoreLimits {
        max_forms: 10,
        max_per_owner: 1,
    });
    let drafts = handler_with(listings, store);

    drafts.create_draft(&token()).unwrap();
    let refused = drafts.open_edit_draft(&token(), "abc").await;

    assert!(matches!(refused, Err(AppError::TooManyRequests { .. })));
    assert_eq!(drafts.store.len(), 1);
}
