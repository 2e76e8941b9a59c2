pub mod approval;
pub mod discount;
pub mod draft;
pub mod line_item;
pub mod summary;
