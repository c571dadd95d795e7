//! Pure signal computations: pump score, rollback filter, spot classification.

pub mod indicators;
pub mod pump;
pub mod rollback;
pub mod spot;

pub use indicators::price_change;
pub use pump::{pump_score, IndicatorDetail, MIN_CANDLES};
pub use rollback::has_rolled_back;
pub use spot::is_spot;
