
use mockall::Sequence;
use test_fixtures::*;
use test_mocks::*;

use tlc_listings::{
    api_errors::RemoteError,
    entities::{
        draft::{ListingForm, SubmissionState},
        payment::PaymentType,
    },
    errors::{AppError, RETRY_MESSAGE, SUBMIT_RETRY_MESSAGE},
    media::previews::PreviewRegistry,
    use_cases::submission::{RedirectTargets, SubmissionHandler, SubmissionOutcome},
};

const SITE: &str = "https://tlc.example.com";
const CHECKOUT_URL: &str = "https://checkout.stripe.com/c/pay/cs_test_1";

fn handler(
    listings: MockListingsRepo,
    payments: MockPaymentsRepo,
) -> SubmissionHandler<MockListingsRepo, MockPaymentsRepo> {
    SubmissionHandler::new(listings, payments, RedirectTargets::new(SITE))
}

fn camry_form(previews: &PreviewRegistry) -> ListingForm {
    let mut form = ListingForm::new();
    form.listing = clean_camry(previews);
    form
}

#[tokio::test]
async fn free_tier_publishes_active_listing_without_checkout() {
    let previews = PreviewRegistry::new();
    let mut form = camry_form(&previews);
    assert_eq!(previews.live_count(), 1);

    let mut listings = MockListingsRepo::new();
    let mut payments = MockPaymentsRepo::new();
    let mut seq = Sequence::new();

    payments
        .expect_check_payment_requirement()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(requirement(false)));

    listings
        .expect_create_listing()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|_, upload| {
            upload.listing.active
                && upload.listing.title == "Clean Camry"
                && upload.images.len() == 1
                && upload.images[0].content_type == "image/jpeg"
                && upload.images[0].data.len() == TWO_MB
        })
        .returning(|_, _| Ok(listing_record("abc", true)));

    payments.expect_create_checkout_session().times(0);

    let outcome = handler(listings, payments)
        .submit(&token(), &mut form)
        .await
        .expect("submission should succeed");

    assert_eq!(
        outcome,
        SubmissionOutcome::Published {
            listing_id: "abc".to_string(),
            redirect_to: format!("{}/listings/abc", SITE),
        }
    );
    assert_eq!(form.state(), &SubmissionState::Done { listing_id: "abc".to_string() });
    assert_eq!(previews.live_count(), 0);
    assert_eq!(form.listing.local_image_count(), 0);
}

#[tokio::test]
async fn paid_tier_creates_inactive_listing_then_checkout_for_it() {
    let previews = PreviewRegistry::new();
    let mut form = camry_form(&previews);

    let mut listings = MockListingsRepo::new();
    let mut payments = MockPaymentsRepo::new();
    let mut seq = Sequence::new();

    payments
        .expect_check_payment_requirement()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(requirement(true)));

    listings
        .expect_create_listing()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|_, upload| !upload.listing.active && upload.images.len() == 1)
        .returning(|_, _| Ok(listing_record("abc", false)));

    payments
        .expect_create_checkout_session()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|_, request| {
            request.listing_id == "abc"
                && request.payment_type == PaymentType::Listing
                && request.success_url == "https://tlc.example.com/listings/success?listing_id=abc"
                && request.cancel_url == "https://tlc.example.com/listings/payment-failed?listing_id=abc"
        })
        .returning(|_, _| Ok(checkout_session(Some(CHECKOUT_URL))));

    let outcome = handler(listings, payments)
        .submit(&token(), &mut form)
        .await
        .expect("submission should succeed");

    assert_eq!(
        outcome,
        SubmissionOutcome::CheckoutRequired {
            listing_id: "abc".to_string(),
            redirect_to: CHECKOUT_URL.to_string(),
            session_id: Some("cs_test_1".to_string()),
        }
    );
    assert_eq!(
        form.state(),
        &SubmissionState::RedirectingToCheckout {
            listing_id: "abc".to_string(),
            checkout_url: CHECKOUT_URL.to_string(),
        }
    );
    assert_eq!(previews.live_count(), 0);
}

#[tokio::test]
async fn invalid_listing_makes_no_remote_calls() {
    let previews = PreviewRegistry::new();
    let mut form = camry_form(&previews);
    form.listing.title = "ab".to_string();

    let mut listings = MockListingsRepo::new();
    let mut payments = MockPaymentsRepo::new();
    payments.expect_check_payment_requirement().times(0);
    listings.expect_create_listing().times(0);
    payments.expect_create_checkout_session().times(0);

    let result = handler(listings, payments).submit(&token(), &mut form).await;

    match result {
        Err(AppError::ValidationError(errors)) => {
            assert!(errors.iter().any(|e| e.field == "title"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(form.state(), &SubmissionState::Editing);
    assert_eq!(previews.live_count(), 1);
}

#[tokio::test]
async fn vehicle_without_photos_is_rejected_before_any_call() {
    let previews = PreviewRegistry::new();
    let mut form = camry_form(&previews);
    form.listing.images.clear();

    let mut listings = MockListingsRepo::new();
    let mut payments = MockPaymentsRepo::new();
    payments.expect_check_payment_requirement().times(0);
    listings.expect_create_listing().times(0);

    let result = handler(listings, payments).submit(&token(), &mut form).await;

    assert!(matches!(
        result,
        Err(AppError::ValidationError(ref errors)) if errors.iter().any(|e| e.field == "images")
    ));
}

#[tokio::test]
async fn plate_without_photos_is_published() {
    let mut form = ListingForm::new();
    form.listing = plate_listing();

    let mut listings = MockListingsRepo::new();
    let mut payments = MockPaymentsRepo::new();
    payments
        .expect_check_payment_requirement()
        .returning(|_| Ok(requirement(false)));
    listings
        .expect_create_listing()
        .times(1)
        .withf(|_, upload| upload.images.is_empty() && upload.listing.images.is_empty())
        .returning(|_, _| Ok(listing_record("plate1", true)));

    let outcome = handler(listings, payments)
        .submit(&token(), &mut form)
        .await
        .expect("plate listing should publish");

    assert_eq!(outcome.listing_id(), "plate1");
}

#[tokio::test]
async fn create_failure_skips_checkout_and_keeps_the_form() {
    let previews = PreviewRegistry::new();
    let mut form = camry_form(&previews);

    let mut listings = MockListingsRepo::new();
    let mut payments = MockPaymentsRepo::new();
    payments
        .expect_check_payment_requirement()
        .returning(|_| Ok(requirement(true)));
    listings.expect_create_listing().times(1).returning(|_, _| {
        Err(RemoteError::Status {
            status: 500,
            message: "database unavailable".to_string(),
        })
    });
    payments.expect_create_checkout_session().times(0);

    let result = handler(listings, payments).submit(&token(), &mut form).await;

    match result {
        Err(err @ AppError::Upstream(_)) => assert_eq!(err.to_string(), SUBMIT_RETRY_MESSAGE),
        other => panic!("expected an upstream failure, got {:?}", other),
    }
    assert_eq!(form.state(), &SubmissionState::Editing);
    assert_eq!(form.listing.title, "Clean Camry");
    assert_eq!(previews.live_count(), 1);
}

#[tokio::test]
async fn requirement_failure_stops_before_create() {
    let previews = PreviewRegistry::new();
    let mut form = camry_form(&previews);

    let mut listings = MockListingsRepo::new();
    let mut payments = MockPaymentsRepo::new();
    payments
        .expect_check_payment_requirement()
        .times(1)
        .returning(|_| Err(RemoteError::Timeout));
    listings.expect_create_listing().times(0);

    let result = handler(listings, payments).submit(&token(), &mut form).await;

    assert!(matches!(result, Err(AppError::Upstream(_))));
    assert_eq!(form.state(), &SubmissionState::Editing);
}

#[tokio::test]
async fn checkout_failure_reports_the_inactive_listing() {
    let previews = PreviewRegistry::new();
    let mut form = camry_form(&previews);

    let mut listings = MockListingsRepo::new();
    let mut payments = MockPaymentsRepo::new();
    payments
        .expect_check_payment_requirement()
        .returning(|_| Ok(requirement(true)));
    listings
        .expect_create_listing()
        .times(1)
        .returning(|_, _| Ok(listing_record("abc", false)));
    payments
        .expect_create_checkout_session()
        .times(1)
        .returning(|_, _| Err(RemoteError::Network("connection reset".to_string())));

    let result = handler(listings, payments).submit(&token(), &mut form).await;

    match result {
        Err(AppError::PaymentIncomplete { listing_id, .. }) => assert_eq!(listing_id, "abc"),
        other => panic!("expected PaymentIncomplete, got {:?}", other),
    }
    assert_eq!(form.state(), &SubmissionState::Editing);
}

#[tokio::test]
async fn unusable_checkout_session_is_a_failure() {
    let previews = PreviewRegistry::new();
    let mut form = camry_form(&previews);

    let mut listings = MockListingsRepo::new();
    let mut payments = MockPaymentsRepo::new();
    payments
        .expect_check_payment_requirement()
        .returning(|_| Ok(requirement(true)));
    listings
        .expect_create_listing()
        .returning(|_, _| Ok(listing_record("abc", false)));
    payments
        .expect_create_checkout_session()
        .returning(|_, _| Ok(checkout_session(None)));

    let result = handler(listings, payments).submit(&token(), &mut form).await;

    match result {
        Err(AppError::PaymentIncomplete { listing_id, message }) => {
            assert_eq!(listing_id, "abc");
            assert_eq!(message, "Stripe unavailable");
        }
        other => panic!("expected PaymentIncomplete, got {:?}", other),
    }
}

#[tokio::test]
async fn finished_form_cannot_be_submitted_again() {
    let previews = PreviewRegistry::new();
    let mut form = camry_form(&previews);

    let mut listings = MockListingsRepo::new();
    let mut payments = MockPaymentsRepo::new();
    payments
        .expect_check_payment_requirement()
        .times(1)
        .returning(|_| Ok(requirement(false)));
    listings
        .expect_create_listing()
        .times(1)
        .returning(|_, _| Ok(listing_record("abc", true)));

    let handler = handler(listings, payments);
    handler.submit(&token(), &mut form).await.expect("first submit");

    let second = handler.submit(&token(), &mut form).await;
    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn edit_mode_updates_without_payment_check() {
    let mut form = ListingForm::for_record(listing_record("abc", true));
    form.listing.price = 450.0;

    let mut listings = MockListingsRepo::new();
    let mut payments = MockPaymentsRepo::new();
    payments.expect_check_payment_requirement().times(0);
    listings.expect_create_listing().times(0);
    listings
        .expect_update_listing()
        .times(1)
        .withf(|_, id, upload| {
            id == "abc"
                && upload.listing.price == 450.0
                && upload.listing.active
                && upload.listing.images.len() == 1
                && upload.images.is_empty()
        })
        .returning(|_, _, _| Ok(listing_record("abc", true)));

    let outcome = handler(listings, payments)
        .submit(&token(), &mut form)
        .await
        .expect("edit should save");

    assert_eq!(
        outcome,
        SubmissionOutcome::Saved {
            listing_id: "abc".to_string(),
            redirect_to: format!("{}/listings/abc", SITE),
        }
    );
}

#[test]
fn redirect_targets_encode_listing_ids() {
    let targets = RedirectTargets::new("https://tlc.example.com/");

    assert_eq!(targets.listing_detail("a b"), "https://tlc.example.com/listings/a%20b");
    assert_eq!(
        targets.checkout_success("abc"),
        "https://tlc.example.com/listings/success?listing_id=abc"
    );
}

#[test]
fn remote_failures_outside_submission_do_not_mention_saving() {
    let err = AppError::from(RemoteError::Timeout);

    assert_eq!(err.to_string(), RETRY_MESSAGE);
    assert!(!err.to_string().contains("saving your listing"));
}
