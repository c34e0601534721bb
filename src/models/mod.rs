pub mod analysis;
pub mod card;
pub mod constraints;
pub mod deck;
pub mod price;
pub mod recommendation;

pub use analysis::*;
pub use card::*;
pub use constraints::*;
pub use deck::*;
pub use price::*;
pub use recommendation::*;
