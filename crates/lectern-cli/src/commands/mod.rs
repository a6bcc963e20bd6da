//! Command implementations.

pub mod history;
pub mod janitor;
pub mod quota;
pub mod recommend;
pub mod regenerate;
pub mod select;

pub use self::history::execute_history;
pub use self::janitor::execute_janitor;
pub use self::quota::execute_quota;
pub use self::recommend::execute_recommend_voice;
pub use self::regenerate::execute_regenerate;
pub use self::select::execute_select;
