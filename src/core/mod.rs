pub mod editor;
pub mod notes;
pub mod position;
pub mod reconcile;
