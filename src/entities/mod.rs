pub mod commerce;
pub mod product;
pub mod site_setting;
