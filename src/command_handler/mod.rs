pub mod context;
pub mod defer;
pub mod definition;
pub mod dispatcher;
pub mod precheck;
pub mod response;

pub use context::*;
pub use defer::DeferMode;
pub use definition::*;
pub use dispatcher::*;
pub use precheck::Precheck;
pub use response::*;
