pub mod ai;
pub mod calendar;
pub mod dispatch;
pub mod event_store;
pub mod session;
