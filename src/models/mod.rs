pub mod gardener;
pub mod results;
pub mod tip;

pub use gardener::*;
pub use results::*;
pub use tip::*;
