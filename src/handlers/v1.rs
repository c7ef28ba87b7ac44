pub mod access;
pub mod chats;
pub mod matches;
pub mod pairs;
pub mod referrals;
pub mod verification;
