/// UI layer: egui panels drawing the state held in [`crate::state::AppState`].
pub mod panels;
pub mod plot;
pub mod table;
