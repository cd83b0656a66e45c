pub mod matches;
pub mod notification;
pub mod payments;
