use anchor_lang::prelude::*;

use crate::hook_chain::cpi::{CpiDispatcher, CpiHookResolver};
use crate::hook_chain::{HookChain, HookInvocation};
use crate::{constants::*, errors::*, state::*};

/// Run a chain of installed hooks as one atomic batch
///
/// Remaining accounts carry everything the hooks and their executions touch:
/// hook programs, target programs, and the accounts those programs read or
/// write. Executions are signed by the vault authority PDA; hook context and
/// teardown calls are signed by the hook context PDA.
///
/// The per-execution results come back as return data, so their serialized
/// size is capped at `MAX_RETURN_DATA` bytes. The engine stops at the first
/// execution that would cross the cap.
///
/// Moving assets into strategies never changes `virtual_total_assets`; that
/// only happens through settlement. The figure is re-read after the batch and
/// any change aborts the transaction.
#[derive(Accounts)]
pub struct ExecuteHooks<'info> {
    /// Security: has_one constraint validates executor from state
    pub executor: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = executor @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        seeds = [HOOK_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = hook_registry.bump,
    )]
    pub hook_registry: Account<'info, HookRegistry>,

    #[account(
        seeds = [ADAPTER_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = adapter_registry.bump,
    )]
    pub adapter_registry: Account<'info, AdapterRegistry>,

    /// CHECK: PDA signing every execution, validated by seeds
    #[account(
        mut,
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// CHECK: PDA signing hook context calls; holds no funds, validated by seeds
    #[account(
        seeds = [HOOK_CONTEXT_SEED, vault_state.key().as_ref()],
        bump,
    )]
    pub hook_context_authority: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, ExecuteHooks<'info>>,
    invocations: Vec<HookInvocation>,
) -> Result<Vec<Vec<u8>>> {
    let vault = ctx.accounts.vault_state.key();
    let total_assets_before = ctx.accounts.vault_state.virtual_total_assets;

    let asset_mint_key = ctx.accounts.vault_state.asset_mint;
    let authority_bump = ctx.accounts.vault_state.authority_bump;
    let authority_seeds: &[&[u8]] = &[
        VAULT_AUTHORITY_SEED,
        asset_mint_key.as_ref(),
        &[authority_bump],
    ];
    let signer_seeds = &[authority_seeds];

    let context_bump = ctx.bumps.hook_context_authority;
    let context_seeds: &[&[u8]] = &[HOOK_CONTEXT_SEED, vault.as_ref(), &[context_bump]];
    let context_signer_seeds = &[context_seeds];

    let vault_authority = ctx.accounts.vault_authority.to_account_info();
    let hook_context_authority = ctx.accounts.hook_context_authority.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();

    let results = {
        let adapter_registry: &AdapterRegistry = &ctx.accounts.adapter_registry;
        let chain = HookChain {
            vault,
            registry: &ctx.accounts.hook_registry,
            authorizer: adapter_registry,
            timestamp: Clock::get()?.unix_timestamp,
        };

        let mut resolver = CpiHookResolver::new(
            &hook_context_authority,
            ctx.remaining_accounts,
            context_signer_seeds,
        );
        let mut dispatcher = CpiDispatcher {
            vault_authority: &vault_authority,
            system_program: &system_program,
            accounts: ctx.remaining_accounts,
            signer_seeds,
        };

        chain.execute(&mut resolver, &mut dispatcher, &invocations)?
    };

    ctx.accounts.vault_state.reload()?;
    require_eq!(
        ctx.accounts.vault_state.virtual_total_assets,
        total_assets_before,
        VaultError::AccountingDrift
    );

    Ok(results)
}
