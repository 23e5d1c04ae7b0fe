
use test_fixtures::*;
use test_mocks::*;

use tlc_listings::{
    entities::{
        listing::{ListingPage, ListingQuery},
        payment::{PaymentType, SubscriptionInfo},
    },
    errors::AppError,
    use_cases::{listings::ListingHandler, payments::PaymentHandler, submission::RedirectTargets},
};

fn payments_handler(
    listings: MockListingsRepo,
    payments: MockPaymentsRepo,
) -> PaymentHandler<MockListingsRepo, MockPaymentsRepo> {
    PaymentHandler::new(listings, payments, RedirectTargets::new("https://tlc.example.com"))
}

#[tokio::test]
async fn retry_issues_a_new_checkout_for_an_inactive_listing() {
    let mut listings = MockListingsRepo::new();
    let mut payments = MockPaymentsRepo::new();

    listings
        .expect_get_listing()
        .withf(|_, id| id == "abc")
        .returning(|_, _| Ok(listing_record("abc", false)));
    payments
        .expect_create_checkout_session()
        .times(1)
        .withf(|_, request| request.listing_id == "abc" && request.payment_type == PaymentType::Listing)
        .returning(|_, _| Ok(checkout_session(Some("https://checkout.stripe.com/c/pay/cs_2"))));

    let redirect = payments_handler(listings, payments)
        .retry_payment(&token(), "abc")
        .await
        .unwrap();

    assert_eq!(redirect.listing_id, "abc");
    assert_eq!(redirect.checkout_url, "https://checkout.stripe.com/c/pay/cs_2");
}

#[tokio::test]
async fn retry_refuses_an_active_listing() {
    let mut listings = MockListingsRepo::new();
    let mut payments = MockPaymentsRepo::new();

    listings
        .expect_get_listing()
        .returning(|_, _| Ok(listing_record("abc", true)));
    payments.expect_create_checkout_session().times(0);

    let result = payments_handler(listings, payments)
        .retry_payment(&token(), "abc")
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn retry_without_checkout_url_stays_incomplete() {
    let mut listings = MockListingsRepo::new();
    let mut payments = MockPaymentsRepo::new();

    listings
        .expect_get_listing()
        .returning(|_, _| Ok(listing_record("abc", false)));
    payments
        .expect_create_checkout_session()
        .returning(|_, _| Ok(checkout_session(None)));

    let result = payments_handler(listings, payments)
        .retry_payment(&token(), "abc")
        .await;

    assert!(matches!(result, Err(AppError::PaymentIncomplete { ref listing_id, .. }) if listing_id == "abc"));
}

#[tokio::test]
async fn payment_status_reflects_listing_activity() {
    let mut listings = MockListingsRepo::new();
    listings
        .expect_get_listing()
        .returning(|_, _| Ok(listing_record("abc", true)));

    let status = payments_handler(listings, MockPaymentsRepo::new())
        .payment_status(&token(), "abc")
        .await
        .unwrap();

    assert!(status.active);
    assert_eq!(status.listing_id, "abc");
}

#[tokio::test]
async fn banner_and_subscription_pass_through() {
    let mut payments = MockPaymentsRepo::new();
    payments
        .expect_check_payment_requirement()
        .times(1)
        .returning(|_| Ok(requirement(true)));
    payments.expect_subscription_info().times(1).returning(|_| {
        Ok(SubscriptionInfo {
            active_listings_count: 3,
            monthly_charge: 20.0,
            price_per_listing: 10.0,
            currency: "usd".to_string(),
            free_listings_limit: 1,
            paid_listings_count: 2,
        })
    });

    let handler = payments_handler(MockListingsRepo::new(), payments);

    assert!(handler.requirement(&token()).await.unwrap().requires_payment);
    assert_eq!(handler.subscription(&token()).await.unwrap().paid_listings_count, 2);
}

#[tokio::test]
async fn browse_clamps_paging() {
    let mut listings = MockListingsRepo::new();
    listings
        .expect_list_listings()
        .times(1)
        .withf(|query| query.page == 1 && query.per_page == 100)
        .returning(|_| {
            Ok(ListingPage {
                listings: vec![listing_record("abc", true)],
                total: 1,
            })
        });

    let page = ListingHandler::new(listings)
        .browse(ListingQuery {
            page: 0,
            per_page: 500,
            q: None,
        })
        .await
        .unwrap();

    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn anonymous_detail_uses_the_public_read() {
    let mut listings = MockListingsRepo::new();
    listings.expect_get_listing().times(0);
    listings
        .expect_get_public_listing()
        .times(1)
        .returning(|id| Ok(listing_record(id, true)));

    let listing = ListingHandler::new(listings)
        .get_listing(None, "abc")
        .await
        .unwrap();

    assert_eq!(listing.id, "abc");
}
