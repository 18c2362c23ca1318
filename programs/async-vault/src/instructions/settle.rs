use anchor_lang::prelude::*;

use crate::{constants::*, events::*, state::*};

/// Report the vault's total assets directly (immediate mode)
///
/// Bounded by `max_allowed_deviation_bps` against the current figure.
#[derive(Accounts)]
pub struct SettleTotalAssets<'info> {
    pub manager: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,
}

pub fn handler(
    ctx: Context<SettleTotalAssets>,
    new_total_assets: u64,
    new_merkle_root: [u8; 32],
) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;
    vault_state.check_role(Role::Manager, &ctx.accounts.manager.key())?;
    vault_state.require_settlement_mode(SettlementMode::Immediate)?;

    let previous_total_assets = vault_state.virtual_total_assets;
    let timestamp = Clock::get()?.unix_timestamp;
    vault_state.settle_total_assets(new_total_assets, new_merkle_root, timestamp)?;

    emit!(SettlementExecuted {
        vault: vault_state.key(),
        previous_total_assets,
        total_assets: new_total_assets,
        merkle_root: new_merkle_root,
        timestamp,
    });

    msg!(
        "Total assets settled: {} -> {}",
        previous_total_assets,
        new_total_assets
    );

    Ok(())
}
