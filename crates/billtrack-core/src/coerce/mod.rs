//! Date and amount coercion shared by every strategy and the normalizer.

pub mod amounts;
pub mod anchors;
pub mod dates;
pub mod patterns;

pub use amounts::{format_amount, parse_amount, parse_amount_str};
pub use anchors::{capture, capture_last, first_capture, last_money_token, strip_grouping};
pub use dates::{
    CANONICAL_DATE_FORMAT, GENERIC_DATE_FORMATS, format_date, is_canonical_date, parse_date,
    try_parse_date,
};
