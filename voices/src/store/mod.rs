mod inventory;
mod paths;

pub use inventory::{Inventory, InventoryError};
pub use paths::{default_install_dir, ensure_install_dir, fallback_install_dir};

const VENDOR_DIR: &str = "Hear2Read";
const LANGUAGES_DIR: &str = "Languages";
