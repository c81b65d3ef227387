// eval/mod.rs — bulk sampling over grids and volumes

pub mod grid;
pub mod volume;
