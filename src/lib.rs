pub mod backup;
pub mod calc;
pub mod catalog;
pub mod db;
pub mod gradebook;
pub mod ipc;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod report;
pub mod roster;
pub mod store;
