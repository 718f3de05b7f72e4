pub mod reload;
pub mod search;

pub use reload::*;
pub use search::*;
