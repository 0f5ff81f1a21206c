// Resolution scenarios: explicit references, company defaults, validity
// gates, scope matching, and tenant isolation.
//
// The storage collaborator is stood in for by in-memory implementations of
// the repository traits, so these tests exercise the resolver's exact
// contract without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

use ledgerly::core::{AppError, Result};
use ledgerly::modules::discounts::models::{
    Discount, DiscountComputation, DiscountType, DocumentDirection, ItemNature,
};
use ledgerly::modules::discounts::repositories::DiscountRepository;
use ledgerly::modules::discounts::services::DiscountResolver;
use ledgerly::modules::settings::models::DefaultSetting;
use ledgerly::modules::settings::repositories::DefaultSettingRepository;

#[derive(Default)]
struct InMemoryDiscountRepository {
    discounts: Mutex<HashMap<i64, Discount>>,
    next_id: Mutex<i64>,
}

#[async_trait]
impl DiscountRepository for InMemoryDiscountRepository {
    async fn create(&self, discount: &Discount) -> Result<Discount> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;

        let mut created = discount.clone();
        created.id = *next_id;

        self.discounts
            .lock()
            .unwrap()
            .insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: i64, company_id: i64) -> Result<Option<Discount>> {
        Ok(self
            .discounts
            .lock()
            .unwrap()
            .get(&id)
            .filter(|d| d.company_id == company_id)
            .cloned())
    }

    async fn list(&self, company_id: i64, _limit: i64, _offset: i64) -> Result<Vec<Discount>> {
        Ok(self
            .discounts
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn update(&self, discount: &Discount) -> Result<()> {
        let mut discounts = self.discounts.lock().unwrap();
        match discounts.get(&discount.id) {
            Some(existing) if existing.company_id == discount.company_id => {
                discounts.insert(discount.id, discount.clone());
                Ok(())
            }
            _ => Err(AppError::not_found("Discount not found")),
        }
    }

    async fn set_enabled(
        &self,
        id: i64,
        company_id: i64,
        enabled: bool,
        _updated_by: Option<i64>,
    ) -> Result<()> {
        let mut discounts = self.discounts.lock().unwrap();
        match discounts.get_mut(&id) {
            Some(discount) if discount.company_id == company_id => {
                discount.enabled = enabled;
                Ok(())
            }
            _ => Err(AppError::not_found("Discount not found")),
        }
    }

    async fn is_referenced(&self, _id: i64, _company_id: i64) -> Result<bool> {
        Ok(false)
    }

    async fn delete(&self, id: i64, company_id: i64) -> Result<()> {
        let mut discounts = self.discounts.lock().unwrap();
        match discounts.get(&id) {
            Some(discount) if discount.company_id == company_id => {
                discounts.remove(&id);
                Ok(())
            }
            _ => Err(AppError::not_found("Discount not found")),
        }
    }
}

#[derive(Default)]
struct InMemoryDefaultSettingRepository {
    settings: Mutex<HashMap<i64, DefaultSetting>>,
}

#[async_trait]
impl DefaultSettingRepository for InMemoryDefaultSettingRepository {
    async fn find_for_company(&self, company_id: i64) -> Result<Option<DefaultSetting>> {
        Ok(self.settings.lock().unwrap().get(&company_id).cloned())
    }

    async fn upsert(&self, setting: &DefaultSetting) -> Result<DefaultSetting> {
        let mut stored = setting.clone();
        if stored.id == 0 {
            stored.id = setting.company_id;
        }

        self.settings
            .lock()
            .unwrap()
            .insert(setting.company_id, stored.clone());

        Ok(stored)
    }
}

struct Fixture {
    discounts: Arc<InMemoryDiscountRepository>,
    defaults: Arc<InMemoryDefaultSettingRepository>,
    resolver: DiscountResolver,
}

fn fixture() -> Fixture {
    let discounts = Arc::new(InMemoryDiscountRepository::default());
    let defaults = Arc::new(InMemoryDefaultSettingRepository::default());
    let resolver = DiscountResolver::new(discounts.clone(), defaults.clone());

    Fixture {
        discounts,
        defaults,
        resolver,
    }
}

fn new_discount(company_id: i64, discount_type: DiscountType) -> Discount {
    Discount::new(
        company_id,
        "Seasonal".to_string(),
        None,
        dec!(10),
        DiscountComputation::Percentage,
        discount_type,
        None,
        None,
        None,
    )
    .unwrap()
}

async fn seed(fixture: &Fixture, discount: Discount) -> Discount {
    fixture.discounts.create(&discount).await.unwrap()
}

async fn seed_defaults(
    fixture: &Fixture,
    company_id: i64,
    sales: Option<i64>,
    purchase: Option<i64>,
) {
    let mut setting = DefaultSetting::new(company_id);
    setting.sales_discount_id = sales;
    setting.purchase_discount_id = purchase;
    fixture.defaults.upsert(&setting).await.unwrap();
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn test_explicit_reference_resolves() {
    let fx = fixture();
    let discount = seed(&fx, new_discount(1, DiscountType::Sales)).await;

    let resolved = fx
        .resolver
        .resolve(
            1,
            Some(discount.id),
            ItemNature::Product,
            DocumentDirection::Sale,
            now(),
        )
        .await
        .unwrap();

    assert_eq!(resolved.map(|d| d.id), Some(discount.id));
}

#[tokio::test]
async fn test_explicit_missing_reference_is_not_found() {
    let fx = fixture();

    let result = fx
        .resolver
        .resolve(1, Some(999), ItemNature::Product, DocumentDirection::Sale, now())
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_cross_tenant_reference_is_not_found() {
    let fx = fixture();
    let foreign = seed(&fx, new_discount(2, DiscountType::Sales)).await;

    // A discount belonging to company 2 must be indistinguishable from a
    // missing one when company 1 asks for it.
    let result = fx
        .resolver
        .resolve(
            1,
            Some(foreign.id),
            ItemNature::Product,
            DocumentDirection::Sale,
            now(),
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_disabled_discount_is_inapplicable_not_an_error() {
    let fx = fixture();
    let mut discount = new_discount(1, DiscountType::Sales);
    discount.enabled = false;
    let discount = seed(&fx, discount).await;

    let resolved = fx
        .resolver
        .resolve(
            1,
            Some(discount.id),
            ItemNature::Product,
            DocumentDirection::Sale,
            now(),
        )
        .await
        .unwrap();

    assert!(resolved.is_none());
}

#[tokio::test]
async fn test_expired_discount_is_inapplicable() {
    let fx = fixture();
    let mut discount = new_discount(1, DiscountType::Sales);
    discount.start_date = Some(now() - Duration::days(30));
    discount.end_date = Some(now() - Duration::days(1));
    let discount = seed(&fx, discount).await;

    let resolved = fx
        .resolver
        .resolve(
            1,
            Some(discount.id),
            ItemNature::Product,
            DocumentDirection::Sale,
            now(),
        )
        .await
        .unwrap();

    assert!(resolved.is_none());
}

#[tokio::test]
async fn test_not_yet_started_discount_is_inapplicable() {
    let fx = fixture();
    let mut discount = new_discount(1, DiscountType::Sales);
    discount.start_date = Some(now() + Duration::days(1));
    let discount = seed(&fx, discount).await;

    let resolved = fx
        .resolver
        .resolve(
            1,
            Some(discount.id),
            ItemNature::Product,
            DocumentDirection::Sale,
            now(),
        )
        .await
        .unwrap();

    assert!(resolved.is_none());
}

#[tokio::test]
async fn test_window_bounds_are_inclusive() {
    let fx = fixture();
    let start = now();
    let end = now() + Duration::days(7);

    let mut discount = new_discount(1, DiscountType::Sales);
    discount.start_date = Some(start);
    discount.end_date = Some(end);
    let discount = seed(&fx, discount).await;

    for as_of in [start, end] {
        let resolved = fx
            .resolver
            .resolve(
                1,
                Some(discount.id),
                ItemNature::Product,
                DocumentDirection::Sale,
                as_of,
            )
            .await
            .unwrap();

        assert_eq!(resolved.map(|d| d.id), Some(discount.id));
    }
}

#[tokio::test]
async fn test_scope_mismatch_is_inapplicable() {
    let fx = fixture();
    let mut discount = new_discount(1, DiscountType::Sales);
    discount.scope = Some(ItemNature::Product);
    let discount = seed(&fx, discount).await;

    let resolved = fx
        .resolver
        .resolve(
            1,
            Some(discount.id),
            ItemNature::Service,
            DocumentDirection::Sale,
            now(),
        )
        .await
        .unwrap();

    assert!(resolved.is_none());
}

#[tokio::test]
async fn test_unset_scope_matches_any_line() {
    let fx = fixture();
    let discount = seed(&fx, new_discount(1, DiscountType::Sales)).await;

    for line_scope in [ItemNature::Product, ItemNature::Service] {
        let resolved = fx
            .resolver
            .resolve(
                1,
                Some(discount.id),
                line_scope,
                DocumentDirection::Sale,
                now(),
            )
            .await
            .unwrap();

        assert_eq!(resolved.map(|d| d.id), Some(discount.id));
    }
}

#[tokio::test]
async fn test_none_typed_discount_resolves_when_explicitly_referenced() {
    let fx = fixture();
    let discount = seed(&fx, new_discount(1, DiscountType::None)).await;

    let resolved = fx
        .resolver
        .resolve(
            1,
            Some(discount.id),
            ItemNature::Product,
            DocumentDirection::Sale,
            now(),
        )
        .await
        .unwrap();

    assert_eq!(resolved.map(|d| d.id), Some(discount.id));
}

#[tokio::test]
async fn test_default_sales_discount_applies_to_sale_lines() {
    let fx = fixture();
    let discount = seed(&fx, new_discount(1, DiscountType::Sales)).await;
    seed_defaults(&fx, 1, Some(discount.id), None).await;

    let resolved = fx
        .resolver
        .resolve(1, None, ItemNature::Product, DocumentDirection::Sale, now())
        .await
        .unwrap();

    assert_eq!(resolved.map(|d| d.id), Some(discount.id));
}

#[tokio::test]
async fn test_default_selection_follows_direction() {
    let fx = fixture();
    let sales = seed(&fx, new_discount(1, DiscountType::Sales)).await;
    let purchase = seed(&fx, new_discount(1, DiscountType::Purchase)).await;
    seed_defaults(&fx, 1, Some(sales.id), Some(purchase.id)).await;

    let resolved = fx
        .resolver
        .resolve(1, None, ItemNature::Product, DocumentDirection::Purchase, now())
        .await
        .unwrap();

    assert_eq!(resolved.map(|d| d.id), Some(purchase.id));
}

#[tokio::test]
async fn test_disabled_default_degrades_to_none() {
    let fx = fixture();
    let mut discount = new_discount(1, DiscountType::Purchase);
    discount.enabled = false;
    let discount = seed(&fx, discount).await;
    seed_defaults(&fx, 1, None, Some(discount.id)).await;

    let resolved = fx
        .resolver
        .resolve(1, None, ItemNature::Product, DocumentDirection::Purchase, now())
        .await
        .unwrap();

    assert!(resolved.is_none());
}

#[tokio::test]
async fn test_no_default_configured_yields_none() {
    let fx = fixture();
    seed_defaults(&fx, 1, None, None).await;

    let resolved = fx
        .resolver
        .resolve(1, None, ItemNature::Product, DocumentDirection::Sale, now())
        .await
        .unwrap();

    assert!(resolved.is_none());
}

#[tokio::test]
async fn test_missing_settings_row_yields_none() {
    let fx = fixture();

    let resolved = fx
        .resolver
        .resolve(1, None, ItemNature::Product, DocumentDirection::Sale, now())
        .await
        .unwrap();

    assert!(resolved.is_none());
}

#[tokio::test]
async fn test_stale_default_link_yields_none() {
    let fx = fixture();
    let discount = seed(&fx, new_discount(1, DiscountType::Sales)).await;
    seed_defaults(&fx, 1, Some(discount.id), None).await;
    fx.discounts.delete(discount.id, 1).await.unwrap();

    let resolved = fx
        .resolver
        .resolve(1, None, ItemNature::Product, DocumentDirection::Sale, now())
        .await
        .unwrap();

    assert!(resolved.is_none());
}

#[tokio::test]
async fn test_direction_incompatible_default_is_rechecked() {
    let fx = fixture();
    // The link was written when the discount was sales-typed; it has since
    // been retyped and the resolver must not trust the stale link.
    let discount = seed(&fx, new_discount(1, DiscountType::Sales)).await;
    seed_defaults(&fx, 1, Some(discount.id), None).await;

    let mut retyped = discount.clone();
    retyped.discount_type = DiscountType::None;
    fx.discounts.update(&retyped).await.unwrap();

    let resolved = fx
        .resolver
        .resolve(1, None, ItemNature::Product, DocumentDirection::Sale, now())
        .await
        .unwrap();

    assert!(resolved.is_none());
}

#[tokio::test]
async fn test_scope_mismatched_default_degrades_to_none() {
    let fx = fixture();
    let mut discount = new_discount(1, DiscountType::Sales);
    discount.scope = Some(ItemNature::Product);
    let discount = seed(&fx, discount).await;
    seed_defaults(&fx, 1, Some(discount.id), None).await;

    let resolved = fx
        .resolver
        .resolve(1, None, ItemNature::Service, DocumentDirection::Sale, now())
        .await
        .unwrap();

    assert!(resolved.is_none());
}

#[tokio::test]
async fn test_defaults_are_tenant_scoped() {
    let fx = fixture();
    let discount = seed(&fx, new_discount(1, DiscountType::Sales)).await;
    seed_defaults(&fx, 1, Some(discount.id), None).await;

    // Company 2 has no defaults of its own and never sees company 1's.
    let resolved = fx
        .resolver
        .resolve(2, None, ItemNature::Product, DocumentDirection::Sale, now())
        .await
        .unwrap();

    assert!(resolved.is_none());
}
