pub mod dispatch;
pub mod engine;
pub mod grammar;
pub mod highlight;
pub mod messages;
pub mod model;
pub mod preview;
pub mod reconcile;
pub mod remote;
pub mod session;
pub mod shell;
