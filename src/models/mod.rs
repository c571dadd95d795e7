pub mod chain;
pub mod market;
pub mod symbol;

pub use chain::{PriceSupply, TransferEvent, ZERO_ADDRESS};
pub use market::{Candle, CandleWindow, Exchange};
pub use symbol::SymbolEntry;
