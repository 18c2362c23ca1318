pub mod adapter_registry;
pub mod hooks;
pub mod operator;
pub mod requests;
pub mod vault;
pub mod whitelist;

pub use adapter_registry::*;
pub use hooks::*;
pub use operator::*;
pub use requests::*;
pub use vault::*;
pub use whitelist::*;
