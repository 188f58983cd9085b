pub mod offer_expiry;
pub mod poll;
pub mod profile_refresh;
