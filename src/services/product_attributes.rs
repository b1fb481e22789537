use crate::{
    db::with_transaction,
    entities::commerce::{
        attribute, attribute_value, product_attribute, Attribute, AttributeValue, ProductAttribute,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::variant_service::{find_product, reconcile_product, ReconcileSummary},
};
use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// attribute id -> the value ids offered on that axis
pub type AttributeSelectionInput = BTreeMap<Uuid, Vec<Uuid>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SelectedValue {
    pub id: Uuid,
    pub value: String,
    pub hex: Option<String>,
}

/// A product's chosen values on one attribute axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttributeSelection {
    pub attribute_id: Uuid,
    pub attribute_name: String,
    pub values: Vec<SelectedValue>,
}

#[derive(Clone)]
pub struct ProductAttributeService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    max_combinations: Option<usize>,
}

impl ProductAttributeService {
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

    /// Replaces every selection of the product, then reconciles its variants.
    /// Both happen in one transaction: a failed reconcile leaves the old
    /// selections in place.
    #[instrument(skip(self, selections))]
    pub async fn sync_attributes(
        &self,
        product_id: Uuid,
        selections: AttributeSelectionInput,
    ) -> Result<ReconcileSummary, ServiceError> {
        let max_combinations = self.max_combinations;
        let (summary, attribute_count, value_count) = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                find_product(txn, product_id).await?;
                let rows = validate_selections(txn, &selections).await?;
                let attribute_count = rows.iter().map(|(a, _)| *a).collect::<HashSet<_>>().len();
                let value_count = rows.len();

                replace_selections(txn, product_id, rows).await?;
                let summary = reconcile_product(txn, product_id, max_combinations).await?;
                Ok::<_, ServiceError>((summary, attribute_count, value_count))
            })
        })
        .await?;

        info!(
            %product_id,
            attribute_count,
            value_count,
            "Product attribute selections replaced"
        );

        self.event_sender
            .send_or_log(Event::ProductAttributesSynced {
                product_id,
                attribute_count,
                value_count,
            })
            .await;
        if summary.has_changes() {
            self.event_sender
                .send_or_log(Event::variants_reconciled(
                    product_id,
                    summary.created.len(),
                    summary.deleted.len(),
                    summary.unchanged,
                ))
                .await;
        }

        Ok(summary)
    }

    /// Current selections grouped by attribute, in attribute then value sort order.
    #[instrument(skip(self))]
    pub async fn selected_attribute_values(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<AttributeSelection>, ServiceError> {
        find_product(&*self.db, product_id).await?;

        let rows = ProductAttribute::find()
            .filter(product_attribute::Column::ProductId.eq(product_id))
            .all(&*self.db)
            .await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let selected: HashSet<Uuid> = rows.iter().map(|r| r.attribute_value_id).collect();
        let attributes = Attribute::find()
            .filter(
                attribute::Column::Id.is_in(rows.iter().map(|r| r.attribute_id).collect::<Vec<_>>()),
            )
            .order_by_asc(attribute::Column::SortOrder)
            .order_by_asc(attribute::Column::Name)
            .all(&*self.db)
            .await?;
        let values = AttributeValue::find()
            .filter(attribute_value::Column::Id.is_in(selected.iter().copied().collect::<Vec<_>>()))
            .order_by_asc(attribute_value::Column::SortOrder)
            .order_by_asc(attribute_value::Column::Value)
            .all(&*self.db)
            .await?;

        let mut by_attribute: HashMap<Uuid, Vec<SelectedValue>> = HashMap::new();
        for value in values {
            by_attribute
                .entry(value.attribute_id)
                .or_default()
                .push(SelectedValue {
                    id: value.id,
                    value: value.value,
                    hex: value.hex,
                });
        }

        Ok(attributes
            .into_iter()
            .map(|a| AttributeSelection {
                attribute_id: a.id,
                values: by_attribute.remove(&a.id).unwrap_or_default(),
                attribute_name: a.name,
            })
            .collect())
    }
}

/// Checks every listed value exists and belongs to the attribute it is
/// listed under. Returns the (attribute, value) rows to store, deduplicated.
async fn validate_selections<C: ConnectionTrait>(
    conn: &C,
    selections: &AttributeSelectionInput,
) -> Result<Vec<(Uuid, Uuid)>, ServiceError> {
    let value_ids: Vec<Uuid> = selections.values().flatten().copied().collect();
    if value_ids.is_empty() {
        return Ok(Vec::new());
    }

    let owners: HashMap<Uuid, Uuid> = AttributeValue::find()
        .filter(attribute_value::Column::Id.is_in(value_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|v| (v.id, v.attribute_id))
        .collect();

    let mut rows = Vec::new();
    let mut seen = HashSet::new();
    for (attribute_id, values) in selections {
        for value_id in values {
            match owners.get(value_id) {
                None => {
                    return Err(ServiceError::ValidationError(format!(
                        "Attribute value {} does not exist",
                        value_id
                    )))
                }
                Some(owner) if owner != attribute_id => {
                    return Err(ServiceError::ValidationError(format!(
                        "Attribute value {} does not belong to attribute {}",
                        value_id, attribute_id
                    )))
                }
                Some(_) => {
                    if seen.insert(*value_id) {
                        rows.push((*attribute_id, *value_id));
                    }
                }
            }
        }
    }

    Ok(rows)
}

async fn replace_selections<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    rows: Vec<(Uuid, Uuid)>,
) -> Result<(), ServiceError> {
    ProductAttribute::delete_many()
        .filter(product_attribute::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?;

    if rows.is_empty() {
        return Ok(());
    }

    let now = Utc::now();
    let models = rows
        .into_iter()
        .map(|(attribute_id, attribute_value_id)| product_attribute::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            attribute_id: Set(attribute_id),
            attribute_value_id: Set(attribute_value_id),
            created_at: Set(now),
        });
    ProductAttribute::insert_many(models)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}
