use anchor_lang::prelude::*;

/// Custom error codes for the Async Vault program
///
/// Every error aborts the enclosing transaction; nothing is retried on-chain.
#[error_code]
pub enum VaultError {
    // Input validation
    #[msg("Request amount must be greater than zero")]
    ZeroAmount,

    #[msg("Strategies and values must have the same length")]
    LengthMismatch,

    #[msg("Hook program cannot be the default address")]
    NullHookHandle,

    #[msg("An account cannot approve itself as operator")]
    SelfOperatorApproval,

    #[msg("Hook chain needs at least one invocation")]
    EmptyInvocations,

    #[msg("Execution data is shorter than an instruction selector")]
    InvalidExecutionData,

    #[msg("Cooldown period must not be negative")]
    InvalidCooldown,

    #[msg("Invalid token mint - does not match vault asset or share mint")]
    InvalidMint,

    #[msg("Invalid token account owner")]
    InvalidOwner,

    // Authorization
    #[msg("Unauthorized - signer does not hold the required role")]
    Unauthorized,

    #[msg("Caller is neither the controller nor an approved operator")]
    NotControllerOrOperator,

    #[msg("Depositor is not whitelisted for auto-fulfilled requests")]
    NotWhitelisted,

    #[msg("Adapter call not allowed - (adapter, target, selector) not registered or disabled")]
    AdapterCallNotAllowed,

    #[msg("Hook program account missing from remaining accounts")]
    MissingHookAccount,

    #[msg("Hook returned data from an unexpected program")]
    InvalidHookReturnData,

    // Capacity / limits
    #[msg("Amount exceeds the controller's maximum deposit")]
    ExceedsMaxDeposit,

    #[msg("Amount exceeds the controller's maximum mint")]
    ExceedsMaxMint,

    #[msg("Amount exceeds the controller's maximum redeem")]
    ExceedsMaxRedeem,

    #[msg("Amount exceeds the controller's maximum withdraw")]
    ExceedsMaxWithdraw,

    #[msg("Not enough idle assets to pay the claim")]
    InsufficientIdle,

    #[msg("Settlement deviates from current total assets by more than allowed")]
    DeviationExceeded,

    #[msg("Settlement proposal cooldown has not elapsed")]
    CooldownNotElapsed,

    #[msg("No active settlement proposal")]
    NoActiveProposal,

    #[msg("Registry is full")]
    RegistryFull,

    #[msg("Hook-chain results exceed the return data limit")]
    ResultsTooLarge,

    #[msg("Vault is paused")]
    VaultPaused,

    // State consistency
    #[msg("Hook id already installed")]
    HookAlreadyInstalled,

    #[msg("Hook id not installed")]
    HookNotInstalled,

    #[msg("Adapter call already registered")]
    AdapterCallAlreadyExists,

    #[msg("Adapter call not found in registry")]
    AdapterCallNotFound,

    #[msg("Fulfilled amount exceeds the pending request")]
    InsufficientPending,

    #[msg("Claimed amount exceeds the claimable request")]
    InsufficientClaimable,

    #[msg("Instruction not available in the configured settlement mode")]
    WrongSettlementMode,

    #[msg("Instruction not available in the configured fulfillment mode")]
    WrongFulfillmentMode,

    #[msg("Virtual total assets changed during hook execution")]
    AccountingDrift,

    #[msg("Synchronous previews are not supported by an asynchronous vault")]
    AsyncPreviewUnsupported,

    // Arithmetic
    #[msg("Math overflow occurred during calculation")]
    MathOverflow,
}
