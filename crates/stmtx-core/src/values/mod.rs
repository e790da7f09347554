//! Value normalization: locale-aware fixed-point numbers, dates and
//! currency symbols.

pub mod currency;
pub mod date;
pub mod number;

pub use currency::{currency_code, is_known_currency};
pub use date::{parse_date, parse_date_time, DateFormat};
pub use number::{as_amount, as_shares, parse_number, to_decimal, Locale};

/// Minor units for currency amounts (cents).
pub const AMOUNT_SCALE: u32 = 2;

/// Minor units for share quantities.
pub const SHARE_SCALE: u32 = 8;

/// Minor units for security quotes.
pub const QUOTE_SCALE: u32 = 8;
