pub mod item;
pub mod item_id;
pub mod sort;
pub mod variant;
