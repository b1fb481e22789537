mod common;

use std::collections::{BTreeSet, HashSet};

use assert_matches::assert_matches;
use chrono::Utc;
use rust_decimal::Decimal;
use common::{test_config, TestApp};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use storefront_api::{
    entities::{
        commerce::{product_attribute, product_variant, ProductAttribute, ProductVariant},
        product::ProductType,
    },
    errors::ServiceError,
    services::variants::signature,
};
use uuid::Uuid;

fn skus<'a>(records: impl IntoIterator<Item = &'a storefront_api::services::VariantRecord>) -> BTreeSet<String> {
    records.into_iter().map(|v| v.sku.clone()).collect()
}

#[tokio::test]
async fn color_by_size_yields_four_variants() {
    let app = TestApp::new().await;
    let shirt = app.tshirt().await;

    let summary = app
        .state
        .services
        .variants
        .reconcile(shirt.product.id)
        .await
        .expect("reconcile");

    assert_eq!(summary.created.len(), 4);
    assert!(summary.deleted.is_empty());
    assert_eq!(summary.unchanged, 0);
    assert_eq!(
        skus(&summary.created),
        BTreeSet::from([
            "TSHIRT-blue-m".to_string(),
            "TSHIRT-blue-s".to_string(),
            "TSHIRT-red-m".to_string(),
            "TSHIRT-red-s".to_string(),
        ])
    );

    let stored = app
        .state
        .services
        .variants
        .list_variants(shirt.product.id)
        .await
        .expect("list variants");
    assert_eq!(stored.len(), 4);

    let signatures: HashSet<_> = stored.iter().map(|v| signature(&v.attributes)).collect();
    assert_eq!(signatures.len(), 4, "every combination appears once");

    for variant in &stored {
        assert_eq!(variant.attributes.len(), 2);
        assert_eq!(variant.stock_quantity, 0);
        assert!(variant.price_override.is_none());
        let attributes: HashSet<_> = variant.attributes.iter().map(|p| p.attribute_id).collect();
        assert_eq!(attributes, HashSet::from([shirt.color.id, shirt.size.id]));
    }
}

#[tokio::test]
async fn second_reconcile_changes_nothing() {
    let app = TestApp::new().await;
    let shirt = app.tshirt().await;
    let variants = &app.state.services.variants;

    variants.reconcile(shirt.product.id).await.unwrap();
    let before: BTreeSet<Uuid> = variants
        .list_variants(shirt.product.id)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.id)
        .collect();

    let summary = variants.reconcile(shirt.product.id).await.unwrap();
    assert!(!summary.has_changes());
    assert_eq!(summary.unchanged, 4);

    let after: BTreeSet<Uuid> = variants
        .list_variants(shirt.product.id)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.id)
        .collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn adding_a_value_keeps_existing_variants_and_their_data() {
    let app = TestApp::new().await;
    let shirt = app.tshirt().await;
    let variants = &app.state.services.variants;

    let first = variants.reconcile(shirt.product.id).await.unwrap();
    let red_small = first
        .created
        .iter()
        .find(|v| v.sku == "TSHIRT-red-s")
        .expect("red/S variant")
        .clone();

    let model = ProductVariant::find_by_id(red_small.id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    let mut active: product_variant::ActiveModel = model.into();
    active.stock_quantity = Set(12);
    active.price_override = Set(Some(Decimal::new(2450, 2)));
    active.update(app.db()).await.unwrap();

    let large = app.create_value(&shirt.size, "L", 2).await;
    app.select_values(&shirt.product, &[&large]).await;

    let summary = variants.reconcile(shirt.product.id).await.unwrap();
    assert_eq!(summary.unchanged, 4);
    assert!(summary.deleted.is_empty());
    assert_eq!(
        skus(&summary.created),
        BTreeSet::from(["TSHIRT-blue-l".to_string(), "TSHIRT-red-l".to_string()])
    );

    let kept = ProductVariant::find_by_id(red_small.id)
        .one(app.db())
        .await
        .unwrap()
        .expect("red/S survives");
    assert_eq!(kept.stock_quantity, 12);
    assert_eq!(kept.sku, "TSHIRT-red-s");
    assert_eq!(kept.price_override, Some(Decimal::new(2450, 2)));

    let listed = variants.list_variants(shirt.product.id).await.unwrap();
    let red_small = listed.iter().find(|v| v.id == red_small.id).unwrap();
    assert_eq!(red_small.effective_price, Decimal::new(2450, 2));
    assert!(red_small.in_stock);

    let red_large = listed.iter().find(|v| v.sku == "TSHIRT-red-l").unwrap();
    assert_eq!(red_large.effective_price, shirt.product.base_price);
    assert!(!red_large.in_stock);
}

#[tokio::test]
async fn removing_a_value_deletes_exactly_its_variants() {
    let app = TestApp::new().await;
    let shirt = app.tshirt().await;
    let variants = &app.state.services.variants;
    variants.reconcile(shirt.product.id).await.unwrap();

    ProductAttribute::delete_many()
        .filter(product_attribute::Column::ProductId.eq(shirt.product.id))
        .filter(product_attribute::Column::AttributeValueId.eq(shirt.blue.id))
        .exec(app.db())
        .await
        .unwrap();

    let summary = variants.reconcile(shirt.product.id).await.unwrap();
    assert_eq!(summary.deleted.len(), 2);
    assert!(summary.created.is_empty());
    assert_eq!(summary.unchanged, 2);
    for deleted in &summary.deleted {
        assert!(deleted.attributes.contains(&shirt.pair(&shirt.blue)));
    }

    let remaining = variants.list_variants(shirt.product.id).await.unwrap();
    assert_eq!(
        skus(&remaining),
        BTreeSet::from(["TSHIRT-red-m".to_string(), "TSHIRT-red-s".to_string()])
    );
}

#[tokio::test]
async fn simple_products_are_left_alone() {
    let app = TestApp::new().await;
    let color = app
        .create_attribute("Color", storefront_api::entities::commerce::AttributeType::Color, 0)
        .await;
    let red = app.create_value(&color, "Red", 0).await;
    let mug = app.create_product("Mug", Some("MUG"), ProductType::Simple).await;
    app.select_values(&mug, &[&red]).await;

    let summary = app.state.services.variants.reconcile(mug.id).await.unwrap();
    assert!(!summary.has_changes());
    assert_eq!(summary.unchanged, 0);
    assert!(app
        .state
        .services
        .variants
        .list_variants(mug.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn clearing_every_selection_removes_all_variants() {
    let app = TestApp::new().await;
    let shirt = app.tshirt().await;
    let variants = &app.state.services.variants;
    variants.reconcile(shirt.product.id).await.unwrap();

    ProductAttribute::delete_many()
        .filter(product_attribute::Column::ProductId.eq(shirt.product.id))
        .exec(app.db())
        .await
        .unwrap();

    let summary = variants.reconcile(shirt.product.id).await.unwrap();
    assert_eq!(summary.deleted.len(), 4);
    assert!(variants.list_variants(shirt.product.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let app = TestApp::new().await;
    let err = app
        .state
        .services
        .variants
        .reconcile(Uuid::new_v4())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn combination_ceiling_rejects_without_writing() {
    let mut cfg = test_config();
    cfg.max_variant_combinations = Some(3);
    let app = TestApp::with_config(cfg).await;
    let shirt = app.tshirt().await;

    let err = app
        .state
        .services
        .variants
        .reconcile(shirt.product.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let stored = ProductVariant::find()
        .filter(product_variant::Column::ProductId.eq(shirt.product.id))
        .all(app.db())
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn colliding_sku_is_a_conflict_and_rolls_back() {
    let app = TestApp::new().await;
    let shirt = app.tshirt().await;
    let other = app
        .create_product("Other", Some("OTHER"), ProductType::Simple)
        .await;

    let now = Utc::now();
    product_variant::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(other.id),
        sku: Set("TSHIRT-blue-m".to_string()),
        price_override: Set(None),
        stock_quantity: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(app.db())
    .await
    .unwrap();

    let err = app
        .state
        .services
        .variants
        .reconcile(shirt.product.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(msg) if msg == "Generated SKU TSHIRT-blue-m already exists");

    let stored = ProductVariant::find()
        .filter(product_variant::Column::ProductId.eq(shirt.product.id))
        .all(app.db())
        .await
        .unwrap();
    assert!(stored.is_empty(), "partial variants must not survive");
}

#[tokio::test]
async fn product_without_sku_uses_name_slug() {
    let app = TestApp::new().await;
    let color = app
        .create_attribute("Color", storefront_api::entities::commerce::AttributeType::Color, 0)
        .await;
    let navy = app.create_value(&color, "Navy Blue", 0).await;
    let dress = app
        .create_product("Summer Dress!", None, ProductType::Variable)
        .await;
    app.select_values(&dress, &[&navy]).await;

    let summary = app.state.services.variants.reconcile(dress.id).await.unwrap();
    assert_eq!(skus(&summary.created), BTreeSet::from(["summer-dress-navy-blue".to_string()]));
}

#[tokio::test]
async fn non_latin_values_are_transliterated_into_skus() {
    let app = TestApp::new().await;
    let color = app
        .create_attribute("Color", storefront_api::entities::commerce::AttributeType::Color, 0)
        .await;
    let red = app.create_value(&color, "赤", 0).await;
    let blue = app.create_value(&color, "青", 1).await;
    let cream = app.create_value(&color, "Crème", 2).await;
    let kimono = app
        .create_product("Kimono", Some("KIMONO"), ProductType::Variable)
        .await;
    app.select_values(&kimono, &[&red, &blue, &cream]).await;

    let summary = app
        .state
        .services
        .variants
        .reconcile(kimono.id)
        .await
        .expect("distinct values must not collide");
    assert_eq!(
        skus(&summary.created),
        BTreeSet::from([
            "KIMONO-chi".to_string(),
            "KIMONO-creme".to_string(),
            "KIMONO-qing".to_string(),
        ])
    );
}

#[tokio::test]
async fn reconcile_all_covers_only_variable_products() {
    let app = TestApp::new().await;
    let shirt = app.tshirt().await;
    let mug = app.create_product("Mug", Some("MUG"), ProductType::Simple).await;

    let summaries = app
        .state
        .services
        .variants
        .reconcile_all_variable_products()
        .await
        .unwrap();

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].product_id, shirt.product.id);
    assert_eq!(summaries[0].created.len(), 4);
    assert!(summaries.iter().all(|s| s.product_id != mug.id));
}

#[tokio::test]
async fn stock_sums_variants_for_variable_products() {
    let app = TestApp::new().await;
    let shirt = app.tshirt().await;
    let variants = &app.state.services.variants;
    let summary = variants.reconcile(shirt.product.id).await.unwrap();

    for (i, record) in summary.created.iter().enumerate() {
        let model = ProductVariant::find_by_id(record.id)
            .one(app.db())
            .await
            .unwrap()
            .unwrap();
        let mut active: product_variant::ActiveModel = model.into();
        active.stock_quantity = Set(i as i32 + 1);
        active.update(app.db()).await.unwrap();
    }

    assert_eq!(variants.total_stock(shirt.product.id).await.unwrap(), 10);

    let mug = app.create_product("Mug", Some("MUG"), ProductType::Simple).await;
    assert_eq!(variants.total_stock(mug.id).await.unwrap(), 7);
}
