pub mod book;
pub mod eligibility;
pub mod engine;
pub mod intent;
pub mod locator;
pub mod settlement;

pub use book::*;
pub use eligibility::*;
pub use engine::*;
pub use intent::*;
pub use locator::*;
pub use settlement::*;
