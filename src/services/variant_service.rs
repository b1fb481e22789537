use crate::{
    common::AttributePair,
    db::with_transaction,
    entities::commerce::{
        attribute, attribute_value, product_attribute, product_variant,
        product_variant_attribute, Attribute, AttributeModel, AttributeValue,
        AttributeValueModel, Product, ProductAttribute, ProductModel, ProductVariant,
        ProductVariantAttribute, ProductVariantModel,
    },
    entities::product::{self, ProductType},
    errors::ServiceError,
    events::{Event, EventSender},
    services::variants::{
        cartesian_product, ensure_within_ceiling, generate_variant_sku, group_by_axis,
        plan_reconciliation, sku_base, ExistingVariant,
    },
};
use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// A variant together with its attribute pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VariantRecord {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    #[schema(value_type = Option<String>)]
    pub price_override: Option<Decimal>,
    pub stock_quantity: i32,
    /// Override when set, the product base price otherwise
    #[schema(value_type = String)]
    pub effective_price: Decimal,
    pub in_stock: bool,
    pub attributes: Vec<AttributePair>,
}

impl VariantRecord {
    fn from_model(
        model: ProductVariantModel,
        attributes: Vec<AttributePair>,
        base_price: Decimal,
    ) -> Self {
        Self {
            effective_price: model.effective_price(base_price),
            in_stock: model.is_in_stock(),
            id: model.id,
            product_id: model.product_id,
            sku: model.sku,
            price_override: model.price_override,
            stock_quantity: model.stock_quantity,
            attributes,
        }
    }
}

/// Outcome of one reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReconcileSummary {
    pub product_id: Uuid,
    pub created: Vec<VariantRecord>,
    pub deleted: Vec<VariantRecord>,
    /// Variants left untouched
    pub unchanged: usize,
}

impl ReconcileSummary {
    fn empty(product_id: Uuid) -> Self {
        Self {
            product_id,
            created: Vec::new(),
            deleted: Vec::new(),
            unchanged: 0,
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.created.is_empty() || !self.deleted.is_empty()
    }
}

/// Keeps a variable product's variants in step with its attribute selections.
#[derive(Clone)]
pub struct VariantService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    max_combinations: Option<usize>,
}

impl VariantService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        max_combinations: Option<usize>,
    ) -> Self {
        Self {
            db,
            event_sender,
            max_combinations,
        }
    }

    /// Reconciles one product inside its own transaction.
    #[instrument(skip(self))]
    pub async fn reconcile(&self, product_id: Uuid) -> Result<ReconcileSummary, ServiceError> {
        let max_combinations = self.max_combinations;
        let summary = with_transaction(&self.db, move |txn| {
            Box::pin(async move { reconcile_product(txn, product_id, max_combinations).await })
        })
        .await?;

        self.publish(&summary).await;
        Ok(summary)
    }

    /// Reconciles every variable product, one transaction each.
    #[instrument(skip(self))]
    pub async fn reconcile_all_variable_products(
        &self,
    ) -> Result<Vec<ReconcileSummary>, ServiceError> {
        let products = Product::find()
            .filter(product::Column::ProductType.eq(ProductType::Variable))
            .order_by_asc(product::Column::CreatedAt)
            .order_by_asc(product::Column::Id)
            .all(&*self.db)
            .await?;

        info!(count = products.len(), "Reconciling variable products");

        let mut summaries = Vec::with_capacity(products.len());
        for product in products {
            summaries.push(self.reconcile(product.id).await?);
        }
        Ok(summaries)
    }

    /// Lists a product's variants with their attribute pairs, oldest first.
    #[instrument(skip(self))]
    pub async fn list_variants(&self, product_id: Uuid) -> Result<Vec<VariantRecord>, ServiceError> {
        let product = find_product(&*self.db, product_id).await?;
        let (variants, mut pairs) = load_variants(&*self.db, product_id).await?;

        Ok(variants
            .into_iter()
            .map(|v| {
                let attributes = pairs.remove(&v.id).unwrap_or_default();
                VariantRecord::from_model(v, attributes, product.base_price)
            })
            .collect())
    }

    /// Stock available for sale: summed over variants for variable products,
    /// the product's own count otherwise.
    #[instrument(skip(self))]
    pub async fn total_stock(&self, product_id: Uuid) -> Result<i64, ServiceError> {
        let product = find_product(&*self.db, product_id).await?;
        if !product.is_variable() {
            return Ok(i64::from(product.stock_quantity));
        }

        let variants = ProductVariant::find()
            .filter(product_variant::Column::ProductId.eq(product_id))
            .all(&*self.db)
            .await?;
        Ok(variants.iter().map(|v| i64::from(v.stock_quantity)).sum())
    }

    async fn publish(&self, summary: &ReconcileSummary) {
        counter!("storefront_reconciliations_total", 1);
        if !summary.has_changes() {
            return;
        }
        self.event_sender
            .send_or_log(Event::variants_reconciled(
                summary.product_id,
                summary.created.len(),
                summary.deleted.len(),
                summary.unchanged,
            ))
            .await;
    }
}

pub(crate) async fn find_product<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> Result<ProductModel, ServiceError> {
    Product::find_by_id(product_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
}

/// Stored variants in creation order plus their pairs keyed by variant id.
async fn load_variants<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> Result<(Vec<ProductVariantModel>, HashMap<Uuid, Vec<AttributePair>>), ServiceError> {
    let variants = ProductVariant::find()
        .filter(product_variant::Column::ProductId.eq(product_id))
        .order_by_asc(product_variant::Column::CreatedAt)
        .order_by_asc(product_variant::Column::Id)
        .all(conn)
        .await?;

    let mut pairs: HashMap<Uuid, Vec<AttributePair>> = HashMap::new();
    if variants.is_empty() {
        return Ok((variants, pairs));
    }

    let attachments = ProductVariantAttribute::find()
        .filter(
            product_variant_attribute::Column::VariantId
                .is_in(variants.iter().map(|v| v.id).collect::<Vec<_>>()),
        )
        .all(conn)
        .await?;

    for attachment in attachments {
        pairs
            .entry(attachment.variant_id)
            .or_default()
            .push(attachment.pair());
    }

    Ok((variants, pairs))
}

/// Selections in canonical order: axes by attribute sort order then name,
/// values by value sort order then text.
async fn load_selections<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> Result<(Vec<AttributePair>, HashMap<Uuid, AttributeValueModel>), ServiceError> {
    let rows = ProductAttribute::find()
        .filter(product_attribute::Column::ProductId.eq(product_id))
        .all(conn)
        .await?;

    if rows.is_empty() {
        return Ok((Vec::new(), HashMap::new()));
    }

    let attribute_ids: Vec<Uuid> = rows.iter().map(|r| r.attribute_id).collect();
    let value_ids: Vec<Uuid> = rows.iter().map(|r| r.attribute_value_id).collect();

    let attributes: HashMap<Uuid, AttributeModel> = Attribute::find()
        .filter(attribute::Column::Id.is_in(attribute_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();
    let values: HashMap<Uuid, AttributeValueModel> = AttributeValue::find()
        .filter(attribute_value::Column::Id.is_in(value_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|v| (v.id, v))
        .collect();

    let mut keyed = Vec::with_capacity(rows.len());
    for row in rows {
        let attribute = attributes.get(&row.attribute_id).ok_or_else(|| {
            ServiceError::NotFound(format!("Attribute {} not found", row.attribute_id))
        })?;
        let value = values.get(&row.attribute_value_id).ok_or_else(|| {
            ServiceError::NotFound(format!(
                "Attribute value {} not found",
                row.attribute_value_id
            ))
        })?;
        let key = (
            attribute.sort_order,
            attribute.name.clone(),
            attribute.id,
            value.sort_order,
            value.value.clone(),
            value.id,
        );
        keyed.push((key, AttributePair::new(row.attribute_id, row.attribute_value_id)));
    }
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    Ok((keyed.into_iter().map(|(_, pair)| pair).collect(), values))
}

async fn delete_variants<C: ConnectionTrait>(conn: &C, ids: Vec<Uuid>) -> Result<(), ServiceError> {
    if ids.is_empty() {
        return Ok(());
    }

    // attachments reference the variant row
    ProductVariantAttribute::delete_many()
        .filter(product_variant_attribute::Column::VariantId.is_in(ids.clone()))
        .exec(conn)
        .await?;
    ProductVariant::delete_many()
        .filter(product_variant::Column::Id.is_in(ids))
        .exec(conn)
        .await?;
    Ok(())
}

/// Reconciles a product's variants against its selections on `conn`.
///
/// Callers own atomicity: run this inside a transaction.
pub async fn reconcile_product<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    max_combinations: Option<usize>,
) -> Result<ReconcileSummary, ServiceError> {
    let product = find_product(conn, product_id).await?;
    if !product.is_variable() {
        debug!(%product_id, "Skipping reconciliation for simple product");
        return Ok(ReconcileSummary::empty(product_id));
    }

    let (selections, values) = load_selections(conn, product_id).await?;
    let (existing, mut existing_pairs) = load_variants(conn, product_id).await?;
    let mut existing_by_id: HashMap<Uuid, ProductVariantModel> =
        existing.iter().map(|v| (v.id, v.clone())).collect();

    let base_price = product.base_price;
    let mut summary = ReconcileSummary::empty(product_id);

    if selections.is_empty() {
        let ids: Vec<Uuid> = existing.iter().map(|v| v.id).collect();
        delete_variants(conn, ids).await?;
        summary.deleted = existing
            .into_iter()
            .map(|v| {
                let attributes = existing_pairs.remove(&v.id).unwrap_or_default();
                VariantRecord::from_model(v, attributes, base_price)
            })
            .collect();
        info!(%product_id, deleted = summary.deleted.len(), "No attribute selections; cleared variants");
        return Ok(summary);
    }

    let groups = group_by_axis(selections);
    let expected = ensure_within_ceiling(&groups, max_combinations)?;
    let combinations = cartesian_product(&groups);

    let stored: Vec<ExistingVariant> = existing
        .iter()
        .map(|v| ExistingVariant {
            id: v.id,
            pairs: existing_pairs.get(&v.id).cloned().unwrap_or_default(),
        })
        .collect();
    let plan = plan_reconciliation(combinations, &stored);

    debug!(
        %product_id,
        expected,
        create = plan.to_create.len(),
        delete = plan.to_delete.len(),
        unchanged = plan.unchanged.len(),
        "Reconciliation plan"
    );

    // stale rows go first so a recreated SKU never collides with them
    summary.deleted = plan
        .to_delete
        .iter()
        .filter_map(|id| {
            existing_by_id.remove(id).map(|v| {
                let attributes = existing_pairs.remove(id).unwrap_or_default();
                VariantRecord::from_model(v, attributes, base_price)
            })
        })
        .collect();
    delete_variants(conn, plan.to_delete).await?;

    let base = sku_base(product.sku.as_deref(), &product.name);
    let now = Utc::now();

    for combination in plan.to_create {
        let labels: Vec<&str> = combination
            .iter()
            .map(|pair| {
                values
                    .get(&pair.attribute_value_id)
                    .map(|v| v.value.as_str())
                    .unwrap_or_default()
            })
            .collect();

        let sku = generate_variant_sku(&base, &labels);
        let variant = product_variant::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            sku: Set(sku.clone()),
            price_override: Set(None),
            stock_quantity: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(|err| match ServiceError::from(err) {
            ServiceError::Conflict(_) => {
                ServiceError::Conflict(format!("Generated SKU {sku} already exists"))
            }
            other => other,
        })?;

        let attachments = combination.iter().map(|pair| product_variant_attribute::ActiveModel {
            id: Set(Uuid::new_v4()),
            variant_id: Set(variant.id),
            attribute_id: Set(pair.attribute_id),
            attribute_value_id: Set(pair.attribute_value_id),
        });
        ProductVariantAttribute::insert_many(attachments)
            .exec_without_returning(conn)
            .await?;

        summary
            .created
            .push(VariantRecord::from_model(variant, combination, base_price));
    }

    summary.unchanged = plan.unchanged.len();

    info!(
        %product_id,
        created = summary.created.len(),
        deleted = summary.deleted.len(),
        unchanged = summary.unchanged,
        "Variants reconciled"
    );
    Ok(summary)
}
