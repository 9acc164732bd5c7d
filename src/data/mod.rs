pub mod bar;
pub mod continuous;
pub mod loader;

pub use bar::Bar;
pub use continuous::{adjust_rolls, find_roll_points};
pub use loader::{clean, filter_by_date, load_csv};
