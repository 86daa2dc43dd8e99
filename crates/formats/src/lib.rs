pub mod asset_listing;
pub mod coordinate_table;

pub use asset_listing::{AssetListingError, list_asset_dirs};
pub use coordinate_table::{CoordinateTable, CoordinateTableError, load_coordinate_table};
