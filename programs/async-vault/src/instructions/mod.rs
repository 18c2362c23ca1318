pub mod add_adapter_call;
pub mod cancel_proposal;
pub mod claim_deposit;
pub mod claim_redeem;
pub mod execute_hooks;
pub mod execute_proposal;
pub mod fulfill_deposit;
pub mod fulfill_redeem;
pub mod initialize;
pub mod install_hook;
pub mod propose_settlement;
pub mod request_deposit;
pub mod request_redeem;
pub mod set_cooldown;
pub mod set_max_deviation;
pub mod set_operator;
pub mod set_paused;
pub mod set_role;
pub mod settle;
pub mod toggle_adapter_call;
pub mod uninstall_hook;
pub mod update_whitelist;
pub mod views;

pub use add_adapter_call::*;
pub use cancel_proposal::*;
pub use claim_deposit::*;
pub use claim_redeem::*;
pub use execute_hooks::*;
pub use execute_proposal::*;
pub use fulfill_deposit::*;
pub use fulfill_redeem::*;
pub use initialize::*;
pub use install_hook::*;
pub use propose_settlement::*;
pub use request_deposit::*;
pub use request_redeem::*;
pub use set_cooldown::*;
pub use set_max_deviation::*;
pub use set_operator::*;
pub use set_paused::*;
pub use set_role::*;
pub use settle::*;
pub use toggle_adapter_call::*;
pub use uninstall_hook::*;
pub use update_whitelist::*;
pub use views::*;
