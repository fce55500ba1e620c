// HTTP routes
pub mod analyze;
pub mod error;
pub mod health;
pub mod history;
pub mod images;
pub mod setups;

pub use analyze::*;
pub use error::*;
pub use health::*;
pub use history::*;
pub use images::*;
pub use setups::*;
