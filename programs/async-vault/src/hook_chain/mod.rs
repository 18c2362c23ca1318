//! Ordered execution of installed hooks as one atomic batch.
//!
//! A chain runs in four strictly separated phases:
//!
//! 1. **build**: every hook turns its config into executions (read-only)
//! 2. **context**: every hook marks itself active
//! 3. **execution**: the concatenated batch is authorized and dispatched
//! 4. **teardown**: every hook reports its output and clears scratch state
//!
//! All phases finish for every hook before the next phase starts. Any error
//! aborts the transaction, so a partially applied chain is never persisted.

pub mod cpi;

use anchor_lang::prelude::*;

use crate::constants::{MAX_RETURN_DATA, SELECTOR_LEN};
use crate::errors::VaultError;
use crate::events::{HookExecutionCompleted, HookExecutionStarted};
use crate::state::{AdapterRegistry, HookId, HookRegistration, HookRegistry, Selector};

/// One requested hook step: which hook, and its opaque configuration
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct HookInvocation {
    pub hook_id: HookId,
    pub config_data: Vec<u8>,
}

/// Account passed to an execution's target program
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct ExecutionAccount {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// Atomic operation produced by a hook's build phase
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct Execution {
    /// Program to invoke
    pub target: Pubkey,
    /// Lamports moved from the vault authority to `target` before the call
    pub value: u64,
    pub accounts: Vec<ExecutionAccount>,
    /// Selector followed by borsh-encoded parameters
    pub data: Vec<u8>,
}

impl Execution {
    /// Split `data` into (selector, params)
    pub fn selector(&self) -> Result<(Selector, &[u8])> {
        require!(
            self.data.len() >= SELECTOR_LEN,
            VaultError::InvalidExecutionData
        );
        let (selector, params) = self.data.split_at(SELECTOR_LEN);
        let selector: Selector = selector
            .try_into()
            .map_err(|_| error!(VaultError::InvalidExecutionData))?;
        Ok((selector, params))
    }
}

/// Execution tagged with the hook program (adapter) that produced it
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedExecution {
    pub adapter: Pubkey,
    pub execution: Execution,
}

/// Capabilities the engine calls on an installed hook
pub trait Hook {
    /// Plan this step. `previous_hook` is the program of the preceding
    /// invocation, `None` for the first one. Must not mutate state.
    fn build_executions(
        &self,
        previous_hook: Option<Pubkey>,
        config_data: &[u8],
    ) -> Result<Vec<Execution>>;

    fn initialize_hook_context(&mut self) -> Result<()>;

    fn finalize_hook_context(&mut self) -> Result<()>;

    /// Amount this hook exposes to the next hook, if it exposes one
    fn output_amount(&self) -> Result<Option<u64>> {
        Ok(None)
    }
}

/// Looks up the runtime implementation of an installed hook
pub trait HookResolver {
    fn hook(&mut self, registration: &HookRegistration) -> Result<&mut dyn Hook>;
}

/// Runs one authorized execution and returns its raw result
pub trait Dispatcher {
    fn dispatch(&mut self, execution: &Execution) -> Result<Vec<u8>>;
}

/// Authorization collaborator consulted once per execution
pub trait CallAuthorizer {
    fn authorize_adapter_call(
        &self,
        adapter: &Pubkey,
        target: &Pubkey,
        selector: &Selector,
        params: &[u8],
    ) -> Result<()>;
}

impl CallAuthorizer for AdapterRegistry {
    fn authorize_adapter_call(
        &self,
        adapter: &Pubkey,
        target: &Pubkey,
        selector: &Selector,
        params: &[u8],
    ) -> Result<()> {
        AdapterRegistry::authorize_adapter_call(self, adapter, target, selector, params)
    }
}

/// Engine bound to one vault's registries for the duration of a call
pub struct HookChain<'a, A: CallAuthorizer> {
    pub vault: Pubkey,
    pub registry: &'a HookRegistry,
    pub authorizer: &'a A,
    pub timestamp: i64,
}

impl<'a, A: CallAuthorizer> HookChain<'a, A> {
    /// Resolve every invocation before any hook is called
    pub fn resolve(&self, invocations: &[HookInvocation]) -> Result<Vec<HookRegistration>> {
        require!(!invocations.is_empty(), VaultError::EmptyInvocations);
        invocations
            .iter()
            .map(|invocation| self.registry.resolve(&invocation.hook_id).cloned())
            .collect()
    }

    /// Build phase: concatenate every hook's executions in invocation order
    pub fn plan<R: HookResolver>(
        &self,
        resolver: &mut R,
        invocations: &[HookInvocation],
        registrations: &[HookRegistration],
    ) -> Result<Vec<PlannedExecution>> {
        let mut planned = Vec::new();
        let mut previous_hook: Option<Pubkey> = None;

        for (invocation, registration) in invocations.iter().zip(registrations) {
            let hook = resolver.hook(registration)?;
            let executions = hook.build_executions(previous_hook, &invocation.config_data)?;
            planned.extend(executions.into_iter().map(|execution| PlannedExecution {
                adapter: registration.program,
                execution,
            }));
            previous_hook = Some(registration.program);
        }

        Ok(planned)
    }

    /// Run the full chain; returns one raw result per execution
    pub fn execute<R: HookResolver, D: Dispatcher>(
        &self,
        resolver: &mut R,
        dispatcher: &mut D,
        invocations: &[HookInvocation],
    ) -> Result<Vec<Vec<u8>>> {
        let registrations = self.resolve(invocations)?;
        let planned = self.plan(resolver, invocations, &registrations)?;

        for (index, registration) in registrations.iter().enumerate() {
            resolver.hook(registration)?.initialize_hook_context()?;
            emit!(HookExecutionStarted {
                vault: self.vault,
                hook_id: registration.id,
                program: registration.program,
                index: index as u32,
                timestamp: self.timestamp,
            });
        }

        let mut results = Vec::with_capacity(planned.len());
        // Borsh size of `results`: u32 length, then u32 length + bytes per entry
        let mut results_len = 4usize;
        for step in &planned {
            let (selector, params) = step.execution.selector()?;
            self.authorizer.authorize_adapter_call(
                &step.adapter,
                &step.execution.target,
                &selector,
                params,
            )?;
            let result = dispatcher.dispatch(&step.execution)?;
            results_len = results_len.saturating_add(4 + result.len());
            require!(results_len <= MAX_RETURN_DATA, VaultError::ResultsTooLarge);
            results.push(result);
        }

        for (index, registration) in registrations.iter().enumerate() {
            let hook = resolver.hook(registration)?;
            let output_amount = hook.output_amount()?;
            hook.finalize_hook_context()?;
            emit!(HookExecutionCompleted {
                vault: self.vault,
                hook_id: registration.id,
                program: registration.program,
                index: index as u32,
                output_amount,
                timestamp: self.timestamp,
            });
        }

        msg!(
            "Hook chain executed: {} hooks, {} executions",
            registrations.len(),
            results.len()
        );

        Ok(results)
    }
}
