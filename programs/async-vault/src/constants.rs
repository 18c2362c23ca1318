// Constants for the Async Vault program

/// Seed for vault state PDA
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed for share mint PDA
pub const SHARE_MINT_SEED: &[u8] = b"shares";

/// Seed for vault authority PDA (owns custody accounts, signs hook executions)
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

/// Seed for hook context PDA (signs hook context and teardown calls, owns nothing)
pub const HOOK_CONTEXT_SEED: &[u8] = b"hook_context";

/// Seed for per-controller request ledger PDA
pub const REQUESTS_SEED: &[u8] = b"requests";

/// Seed for operator approval PDA
pub const OPERATOR_SEED: &[u8] = b"operator";

/// Seed for depositor whitelist PDA
pub const WHITELIST_SEED: &[u8] = b"whitelist";

/// Seed for hook registry PDA
pub const HOOK_REGISTRY_SEED: &[u8] = b"hook_registry";

/// Seed for adapter call registry PDA
pub const ADAPTER_REGISTRY_SEED: &[u8] = b"adapter_registry";

/// Basis point denominator used by the deviation guard
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Maximum hooks installed at once
pub const MAX_HOOKS: usize = 16;

/// Maximum allowed (adapter, target, selector) entries
pub const MAX_ADAPTER_CALLS: usize = 32;

/// Maximum whitelisted depositors
pub const MAX_WHITELISTED: usize = 32;

/// Runtime limit on return data; bounds the serialized hook-chain results
pub const MAX_RETURN_DATA: usize = 1024;

/// Length of an instruction selector (Anchor discriminator)
pub const SELECTOR_LEN: usize = 8;

/// Space for VaultState account:
/// 8 discriminator + 5 * 32 roles + 32 asset_mint + 32 share_mint +
/// 8 virtual_total_assets + 8 total_pending_deposit_assets + 8 total_shares +
/// 1 decimals + 1 paused + 2 max_allowed_deviation_bps + 32 merkle_root +
/// 1 settlement_mode + 1 fulfillment_mode + 8 cooldown_period +
/// 48 proposal + 8 last_settlement_ts + 3 bumps + 32 padding
pub const VAULT_STATE_SIZE: usize =
    8 + 5 * 32 + 32 + 32 + 8 + 8 + 8 + 1 + 1 + 2 + 32 + 1 + 1 + 8 + 48 + 8 + 3 + 32;

/// Space for ControllerRequests account:
/// 8 discriminator + 32 vault + 32 controller + 2 * 24 requests + 1 bump
pub const CONTROLLER_REQUESTS_SIZE: usize = 8 + 32 + 32 + 2 * 24 + 1;

/// Space for OperatorApproval account:
/// 8 discriminator + 32 vault + 32 owner + 32 operator + 1 approved + 1 bump
pub const OPERATOR_APPROVAL_SIZE: usize = 8 + 32 + 32 + 32 + 1 + 1;
