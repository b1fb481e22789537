use crate::{
    common::AttributePair,
    entities::commerce::{
        attribute, attribute_value, product_image, Attribute, AttributeValue, ProductImage,
        ProductImageModel,
    },
    errors::ServiceError,
    services::variant_service::find_product,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// True when every pair an image is tagged with appears in the selection.
/// A specific image never matches an empty selection.
pub fn matches_selection(required: &[AttributePair], selection: &[AttributePair]) -> bool {
    if selection.is_empty() {
        return false;
    }
    required.iter().all(|pair| selection.contains(pair))
}

/// Images to show for a selection.
///
/// Matching specific images replace the general ones; general images are the
/// fallback when the selection is empty or nothing specific matches. Input
/// order is kept.
pub fn images_for_selection<'a>(
    images: &'a [ProductImageModel],
    selection: &[AttributePair],
) -> Result<Vec<&'a ProductImageModel>, serde_json::Error> {
    let general = move || images.iter().filter(|img| img.is_general()).collect::<Vec<_>>();

    if selection.is_empty() {
        return Ok(general());
    }

    let mut specific = Vec::new();
    for image in images.iter().filter(|img| img.is_attribute_specific()) {
        if matches_selection(&image.attribute_pairs()?, selection) {
            specific.push(image);
        }
    }

    if specific.is_empty() {
        Ok(general())
    } else {
        Ok(specific)
    }
}

/// An image with a human readable description of what it is tagged for.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LabeledImage {
    pub id: Uuid,
    pub image_url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
    pub is_primary: bool,
    pub attributes: Vec<AttributePair>,
    /// "General" or e.g. "Color: Red, Size: M"
    pub label: String,
}

#[derive(Clone)]
pub struct ProductImageService {
    db: Arc<DatabaseConnection>,
}

impl ProductImageService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Product images in display order
    pub async fn list_images(&self, product_id: Uuid) -> Result<Vec<ProductImageModel>, ServiceError> {
        find_product(&*self.db, product_id).await?;
        let images = ProductImage::find()
            .filter(product_image::Column::ProductId.eq(product_id))
            .order_by_asc(product_image::Column::SortOrder)
            .order_by_asc(product_image::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(images)
    }

    #[instrument(skip(self, selection), fields(selection_len = selection.len()))]
    pub async fn images_for_selection(
        &self,
        product_id: Uuid,
        selection: &[AttributePair],
    ) -> Result<Vec<ProductImageModel>, ServiceError> {
        let images = self.list_images(product_id).await?;
        let matched: Vec<ProductImageModel> = images_for_selection(&images, selection)?
            .into_iter()
            .cloned()
            .collect();

        debug!(
            %product_id,
            available = images.len(),
            matched = matched.len(),
            "Resolved images for selection"
        );
        Ok(matched)
    }

    /// Attaches display labels built from attribute and value names.
    pub async fn label_images(
        &self,
        images: Vec<ProductImageModel>,
    ) -> Result<Vec<LabeledImage>, ServiceError> {
        let mut decoded = Vec::with_capacity(images.len());
        for image in images {
            let pairs = image.attribute_pairs()?;
            decoded.push((image, pairs));
        }

        let attribute_ids: Vec<Uuid> = decoded
            .iter()
            .flat_map(|(_, pairs)| pairs.iter().map(|p| p.attribute_id))
            .collect();
        let value_ids: Vec<Uuid> = decoded
            .iter()
            .flat_map(|(_, pairs)| pairs.iter().map(|p| p.attribute_value_id))
            .collect();

        let (attribute_names, value_names) = if attribute_ids.is_empty() {
            (HashMap::new(), HashMap::new())
        } else {
            let attributes: HashMap<Uuid, String> = Attribute::find()
                .filter(attribute::Column::Id.is_in(attribute_ids))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|a| (a.id, a.name))
                .collect();
            let values: HashMap<Uuid, String> = AttributeValue::find()
                .filter(attribute_value::Column::Id.is_in(value_ids))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|v| (v.id, v.value))
                .collect();
            (attributes, values)
        };

        Ok(decoded
            .into_iter()
            .map(|(image, pairs)| {
                let label = combination_label(&pairs, &attribute_names, &value_names);
                LabeledImage {
                    id: image.id,
                    image_url: image.image_url,
                    alt_text: image.alt_text,
                    sort_order: image.sort_order,
                    is_primary: image.is_primary,
                    attributes: pairs,
                    label,
                }
            })
            .collect())
    }
}

/// "General" for untagged images, otherwise `Name: Value` joined by ", ".
/// Unknown ids are skipped.
pub fn combination_label(
    pairs: &[AttributePair],
    attribute_names: &HashMap<Uuid, String>,
    value_names: &HashMap<Uuid, String>,
) -> String {
    let parts: Vec<String> = pairs
        .iter()
        .filter_map(|pair| {
            let name = attribute_names.get(&pair.attribute_id)?;
            let value = value_names.get(&pair.attribute_value_id)?;
            Some(format!("{}: {}", name, value))
        })
        .collect();

    if parts.is_empty() {
        "General".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn image(sort_order: i32, pairs: &[AttributePair]) -> ProductImageModel {
        ProductImageModel {
            id: Uuid::new_v4(),
            product_id: Uuid::nil(),
            image_url: format!("img-{sort_order}.jpg"),
            alt_text: None,
            sort_order,
            is_primary: false,
            attribute_combination: if pairs.is_empty() {
                None
            } else {
                Some(serde_json::to_value(pairs).unwrap())
            },
        }
    }

    #[test]
    fn matcher_requires_every_tagged_pair() {
        let color_red = AttributePair::new(Uuid::new_v4(), Uuid::new_v4());
        let size_m = AttributePair::new(Uuid::new_v4(), Uuid::new_v4());

        assert!(matches_selection(&[color_red], &[color_red, size_m]));
        assert!(matches_selection(&[color_red, size_m], &[size_m, color_red]));
        assert!(!matches_selection(&[color_red, size_m], &[color_red]));
        assert!(!matches_selection(&[color_red], &[]));
    }

    #[test]
    fn same_value_under_another_attribute_does_not_match() {
        let value = Uuid::new_v4();
        let tagged = AttributePair::new(Uuid::new_v4(), value);
        let selected = AttributePair::new(Uuid::new_v4(), value);
        assert!(!matches_selection(&[tagged], &[selected]));
    }

    #[test]
    fn malformed_tag_surfaces_error() {
        let mut bad = image(0, &[]);
        bad.attribute_combination = Some(json!([{ "attribute_id": 7 }]));
        let selection = [AttributePair::new(Uuid::new_v4(), Uuid::new_v4())];

        assert!(images_for_selection(&[bad], &selection).is_err());
    }

    #[test]
    fn output_keeps_input_order() {
        let red = AttributePair::new(Uuid::new_v4(), Uuid::new_v4());
        let images = vec![image(3, &[red]), image(1, &[]), image(2, &[red])];

        let matched = images_for_selection(&images, &[red]).unwrap();
        let orders: Vec<i32> = matched.iter().map(|i| i.sort_order).collect();
        assert_eq!(orders, vec![3, 2]);
    }

    #[test]
    fn labels_name_each_pair() {
        let (color, red) = (Uuid::new_v4(), Uuid::new_v4());
        let attrs = HashMap::from([(color, "Color".to_string())]);
        let values = HashMap::from([(red, "Red".to_string())]);

        assert_eq!(
            combination_label(&[AttributePair::new(color, red)], &attrs, &values),
            "Color: Red"
        );
        assert_eq!(combination_label(&[], &attrs, &values), "General");
    }
}
