pub mod fmp;
pub mod util;
