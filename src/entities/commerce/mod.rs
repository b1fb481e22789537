/// Catalog entities: attributes, selections, variants and images
pub mod attribute;
pub mod attribute_value;
pub mod product_attribute;
pub mod product_image;
pub mod product_variant;
pub mod product_variant_attribute;

// Re-export entities
pub use super::product::{Entity as Product, Model as ProductModel};
pub use attribute::{AttributeType, Entity as Attribute, Model as AttributeModel};
pub use attribute_value::{Entity as AttributeValue, Model as AttributeValueModel};
pub use product_attribute::{Entity as ProductAttribute, Model as ProductAttributeModel};
pub use product_image::{Entity as ProductImage, Model as ProductImageModel};
pub use product_variant::{Entity as ProductVariant, Model as ProductVariantModel};
pub use product_variant_attribute::{
    Entity as ProductVariantAttribute, Model as ProductVariantAttributeModel,
};
