pub mod cases;
pub mod convert;
pub mod train;
pub mod utils;
