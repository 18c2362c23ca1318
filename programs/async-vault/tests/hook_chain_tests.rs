/// Hook-chain engine tests with in-memory hooks, resolver and dispatcher.
///
/// A shared log records every call the engine makes so phase ordering can be
/// asserted exactly. The dispatcher moves simulated idle assets into
/// strategies the way a real adapter CPI would, and resolves sweep
/// executions by reading the previous hook's output when they run.
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anchor_lang::prelude::*;
use async_vault::{
    constants::MAX_RETURN_DATA,
    errors::VaultError,
    hook_chain::{Dispatcher, Execution, Hook, HookChain, HookInvocation, HookResolver},
    state::{AdapterRegistry, HookId, HookRegistration, HookRegistry, Selector, VaultState},
};

const DEPOSIT_SELECTOR: Selector = [0xd1; 8];
/// Moves whatever the previous hook reports as output into the target
const SWEEP_SELECTOR: Selector = [0x5e; 8];

type Log = Rc<RefCell<Vec<String>>>;

#[derive(Default)]
struct Ledger {
    idle: u64,
    strategies: HashMap<Pubkey, u64>,
    /// Strategy whose balance each hook program reports as its output
    hook_strategies: HashMap<Pubkey, Pubkey>,
}

/// Hook that deposits `config_data` (u64 LE) into its strategy
///
/// Empty `config_data` defers the amount to execution time: the hook plans a
/// sweep of the previous hook's output instead.
struct StrategyHook {
    name: &'static str,
    program: Pubkey,
    strategy: Pubkey,
    log: Log,
    ledger: Rc<RefCell<Ledger>>,
    /// Fails the whole chain from its teardown
    fail_finalize: bool,
    active: bool,
}

impl StrategyHook {
    fn new(name: &'static str, log: &Log, ledger: &Rc<RefCell<Ledger>>) -> Self {
        Self {
            name,
            program: Pubkey::new_unique(),
            strategy: Pubkey::new_unique(),
            log: log.clone(),
            ledger: ledger.clone(),
            fail_finalize: false,
            active: false,
        }
    }

    fn record(&self, entry: String) {
        self.log.borrow_mut().push(entry);
    }
}

impl Hook for StrategyHook {
    fn build_executions(
        &self,
        previous_hook: Option<Pubkey>,
        config_data: &[u8],
    ) -> Result<Vec<Execution>> {
        let previous = previous_hook.map_or("none".to_string(), |p| p.to_string());
        self.record(format!("build:{}:{}", self.name, previous));

        let data = if config_data.is_empty() {
            let previous = previous_hook.ok_or(error!(VaultError::InvalidExecutionData))?;
            [SWEEP_SELECTOR.as_slice(), previous.as_ref()].concat()
        } else {
            [DEPOSIT_SELECTOR.as_slice(), config_data].concat()
        };
        Ok(vec![Execution {
            target: self.strategy,
            value: 0,
            accounts: vec![],
            data,
        }])
    }

    fn initialize_hook_context(&mut self) -> Result<()> {
        self.active = true;
        self.record(format!("init:{}", self.name));
        Ok(())
    }

    fn finalize_hook_context(&mut self) -> Result<()> {
        self.record(format!("finalize:{}", self.name));
        require!(!self.fail_finalize, VaultError::InvalidHookReturnData);
        self.active = false;
        Ok(())
    }

    fn output_amount(&self) -> Result<Option<u64>> {
        let amount = self.ledger.borrow().strategies.get(&self.strategy).copied();
        self.record(format!("output:{}={:?}", self.name, amount));
        Ok(amount)
    }
}

/// Hook that checks the engine never interleaves phases
///
/// Fails if it is built after any context started, initialized before every
/// hook was built, or torn down before every execution ran.
struct PhaseWatcher {
    program: Pubkey,
    log: Log,
    hooks_in_chain: usize,
    executions_in_chain: usize,
}

impl PhaseWatcher {
    fn count(&self, prefix: &str) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

impl Hook for PhaseWatcher {
    fn build_executions(&self, _: Option<Pubkey>, _: &[u8]) -> Result<Vec<Execution>> {
        require!(self.count("init:") == 0, VaultError::InvalidHookReturnData);
        self.log.borrow_mut().push("build:watcher".to_string());
        Ok(vec![])
    }

    fn initialize_hook_context(&mut self) -> Result<()> {
        require!(
            self.count("build:") == self.hooks_in_chain,
            VaultError::InvalidHookReturnData
        );
        require!(self.count("dispatch:") == 0, VaultError::InvalidHookReturnData);
        self.log.borrow_mut().push("init:watcher".to_string());
        Ok(())
    }

    fn finalize_hook_context(&mut self) -> Result<()> {
        require!(
            self.count("dispatch:") == self.executions_in_chain,
            VaultError::InvalidHookReturnData
        );
        self.log.borrow_mut().push("finalize:watcher".to_string());
        Ok(())
    }
}

#[derive(Default)]
struct MockResolver {
    hooks: Vec<StrategyHook>,
    watcher: Option<PhaseWatcher>,
}

impl HookResolver for MockResolver {
    fn hook(&mut self, registration: &HookRegistration) -> Result<&mut dyn Hook> {
        if let Some(watcher) = self.watcher.as_mut() {
            if watcher.program == registration.program {
                return Ok(watcher);
            }
        }
        self.hooks
            .iter_mut()
            .find(|h| h.program == registration.program)
            .map(|h| h as &mut dyn Hook)
            .ok_or(error!(VaultError::MissingHookAccount))
    }
}

/// Deposit: moves `params` (u64 LE) from idle into the target strategy.
/// Sweep: moves the output of the hook named in `params` into the target.
struct MockDispatcher {
    log: Log,
    ledger: Rc<RefCell<Ledger>>,
}

impl MockDispatcher {
    /// Reads a hook's output the way a target program would query
    /// `get_output_amount` from inside the execution
    fn take_output_of(&self, ledger: &mut Ledger, params: &[u8]) -> Result<u64> {
        let hook_program = Pubkey::try_from_slice(params)
            .map_err(|_| error!(VaultError::InvalidExecutionData))?;
        let source = *ledger
            .hook_strategies
            .get(&hook_program)
            .ok_or(error!(VaultError::MissingHookAccount))?;
        let amount = ledger.strategies.remove(&source).unwrap_or_default();
        self.log
            .borrow_mut()
            .push(format!("read:{}={}", hook_program, amount));
        Ok(amount)
    }
}

impl Dispatcher for MockDispatcher {
    fn dispatch(&mut self, execution: &Execution) -> Result<Vec<u8>> {
        let (selector, params) = execution.selector()?;
        let mut ledger = self.ledger.borrow_mut();

        let amount = if selector == SWEEP_SELECTOR {
            self.take_output_of(&mut ledger, params)?
        } else {
            let amount = u64::try_from_slice(params)
                .map_err(|_| error!(VaultError::InvalidExecutionData))?;
            let idle = ledger
                .idle
                .checked_sub(amount)
                .ok_or(error!(VaultError::InsufficientIdle))?;
            ledger.idle = idle;
            amount
        };
        let balance = ledger.strategies.entry(execution.target).or_default();
        *balance += amount;

        self.log
            .borrow_mut()
            .push(format!("dispatch:{}", execution.target));
        Ok(balance.to_le_bytes().to_vec())
    }
}

struct Fixture {
    vault: Pubkey,
    log: Log,
    ledger: Rc<RefCell<Ledger>>,
    registry: HookRegistry,
    adapters: AdapterRegistry,
    resolver: MockResolver,
}

impl Fixture {
    fn new(idle: u64) -> Self {
        Self {
            vault: Pubkey::new_unique(),
            log: Rc::new(RefCell::new(Vec::new())),
            ledger: Rc::new(RefCell::new(Ledger {
                idle,
                ..Default::default()
            })),
            registry: HookRegistry::default(),
            adapters: AdapterRegistry::default(),
            resolver: MockResolver::default(),
        }
    }

    /// Install a strategy hook and allow its deposit call; returns its id
    fn add_hook(&mut self, name: &'static str) -> HookId {
        let hook = StrategyHook::new(name, &self.log, &self.ledger);
        let id = hook_id(name);
        self.registry.install(id, hook.program, true).unwrap();
        self.ledger
            .borrow_mut()
            .hook_strategies
            .insert(hook.program, hook.strategy);
        self.adapters
            .add(hook.program, hook.strategy, DEPOSIT_SELECTOR)
            .unwrap();
        self.resolver.hooks.push(hook);
        id
    }

    fn hook(&self, name: &str) -> &StrategyHook {
        self.resolver
            .hooks
            .iter()
            .find(|h| h.name == name)
            .unwrap()
    }

    fn run(&mut self, invocations: &[HookInvocation]) -> Result<Vec<Vec<u8>>> {
        let chain = HookChain {
            vault: self.vault,
            registry: &self.registry,
            authorizer: &self.adapters,
            timestamp: 1_700_000_000,
        };
        let mut dispatcher = MockDispatcher {
            log: self.log.clone(),
            ledger: self.ledger.clone(),
        };
        chain.execute(&mut self.resolver, &mut dispatcher, invocations)
    }

    fn entries(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

fn hook_id(name: &str) -> HookId {
    let mut id = [0u8; 32];
    id[..name.len()].copy_from_slice(name.as_bytes());
    id
}

fn invocation(id: HookId, amount: u64) -> HookInvocation {
    HookInvocation {
        hook_id: id,
        config_data: amount.to_le_bytes().to_vec(),
    }
}

// =============================================================================
// Phase ordering
// =============================================================================

#[test]
fn test_phases_run_in_strict_order() {
    let mut fx = Fixture::new(1_000);
    let a = fx.add_hook("a");
    let b = fx.add_hook("b");

    fx.run(&[invocation(a, 100), invocation(b, 200)]).unwrap();

    let hook_a = fx.hook("a");
    let hook_b = fx.hook("b");
    assert_eq!(
        fx.entries(),
        vec![
            "build:a:none".to_string(),
            format!("build:b:{}", hook_a.program),
            "init:a".to_string(),
            "init:b".to_string(),
            format!("dispatch:{}", hook_a.strategy),
            format!("dispatch:{}", hook_b.strategy),
            "output:a=Some(100)".to_string(),
            "finalize:a".to_string(),
            "output:b=Some(200)".to_string(),
            "finalize:b".to_string(),
        ]
    );
    assert!(!hook_a.active && !hook_b.active);
}

#[test]
fn test_adversarial_watcher_sees_no_interleaving() {
    let mut fx = Fixture::new(1_000);
    let a = fx.add_hook("a");
    let b = fx.add_hook("b");

    let watcher_program = Pubkey::new_unique();
    let watcher_id = hook_id("watcher");
    fx.registry
        .install(watcher_id, watcher_program, false)
        .unwrap();
    fx.resolver.watcher = Some(PhaseWatcher {
        program: watcher_program,
        log: fx.log.clone(),
        hooks_in_chain: 3,
        executions_in_chain: 2,
    });

    // Watcher sits in the middle so it sees both neighbours' phases
    let invocations = [
        invocation(a, 10),
        HookInvocation {
            hook_id: watcher_id,
            config_data: vec![],
        },
        invocation(b, 20),
    ];
    fx.run(&invocations).unwrap();

    assert!(fx.entries().contains(&"finalize:watcher".to_string()));
}

#[test]
fn test_results_returned_per_execution() {
    let mut fx = Fixture::new(1_000);
    let a = fx.add_hook("a");

    let results = fx.run(&[invocation(a, 250), invocation(a, 50)]).unwrap();

    // Each result is the strategy balance after that execution
    assert_eq!(results.len(), 2);
    assert_eq!(results[0], 250u64.to_le_bytes().to_vec());
    assert_eq!(results[1], 300u64.to_le_bytes().to_vec());
}

#[test]
fn test_repeated_hook_sees_itself_as_previous() {
    let mut fx = Fixture::new(1_000);
    let a = fx.add_hook("a");

    fx.run(&[invocation(a, 1), invocation(a, 2)]).unwrap();

    let program = fx.hook("a").program;
    let entries = fx.entries();
    assert_eq!(entries[0], "build:a:none");
    assert_eq!(entries[1], format!("build:a:{}", program));
}

// =============================================================================
// Resolution and authorization failures
// =============================================================================

#[test]
fn test_scenario_e_unknown_hook_aborts_before_any_call() {
    let mut fx = Fixture::new(1_000);
    let a = fx.add_hook("a");

    let err = fx
        .run(&[invocation(a, 100), invocation(hook_id("missing"), 100)])
        .unwrap_err();

    assert_eq!(err, VaultError::HookNotInstalled.into());
    assert!(fx.entries().is_empty(), "no hook may run: {:?}", fx.entries());
    assert_eq!(fx.ledger.borrow().idle, 1_000);
}

#[test]
fn test_empty_invocations_rejected() {
    let mut fx = Fixture::new(1_000);
    fx.add_hook("a");

    assert_eq!(fx.run(&[]).unwrap_err(), VaultError::EmptyInvocations.into());
}

#[test]
fn test_unregistered_call_rejected_before_dispatch() {
    let mut fx = Fixture::new(1_000);
    let a = fx.add_hook("a");

    // Hook installed but its strategy call never allowed
    let rogue = StrategyHook::new("rogue", &fx.log, &fx.ledger);
    let rogue_id = hook_id("rogue");
    fx.registry.install(rogue_id, rogue.program, true).unwrap();
    fx.resolver.hooks.push(rogue);

    let err = fx.run(&[invocation(a, 100), invocation(rogue_id, 900)]).unwrap_err();

    assert_eq!(err, VaultError::AdapterCallNotAllowed.into());
    let entries = fx.entries();
    assert_eq!(
        entries.iter().filter(|e| e.starts_with("dispatch:")).count(),
        1
    );
    assert!(!entries.iter().any(|e| e.starts_with("finalize:")));
}

#[test]
fn test_permission_is_keyed_by_adapter() {
    let mut fx = Fixture::new(1_000);
    let a = fx.add_hook("a");
    fx.add_hook("b");

    // b's permission on a's strategy does not cover a
    let (a_program, a_strategy, b_program) = {
        let hook_a = fx.hook("a");
        (hook_a.program, hook_a.strategy, fx.hook("b").program)
    };
    fx.adapters
        .toggle(&a_program, &a_strategy, &DEPOSIT_SELECTOR, false)
        .unwrap();
    fx.adapters
        .add(b_program, a_strategy, DEPOSIT_SELECTOR)
        .unwrap();

    assert_eq!(
        fx.run(&[invocation(a, 1)]).unwrap_err(),
        VaultError::AdapterCallNotAllowed.into()
    );
}

#[test]
fn test_short_execution_data_rejected() {
    let execution = Execution {
        target: Pubkey::new_unique(),
        value: 0,
        accounts: vec![],
        data: vec![1, 2, 3],
    };
    assert_eq!(
        execution.selector().unwrap_err(),
        VaultError::InvalidExecutionData.into()
    );

    let execution = Execution {
        data: [DEPOSIT_SELECTOR.to_vec(), vec![9, 9]].concat(),
        ..execution
    };
    let (selector, params) = execution.selector().unwrap();
    assert_eq!(selector, DEPOSIT_SELECTOR);
    assert_eq!(params, &[9, 9]);
}

#[test]
fn test_failing_teardown_fails_chain() {
    let mut fx = Fixture::new(1_000);
    let a = fx.add_hook("a");
    let b = fx.add_hook("b");
    fx.resolver.hooks[1].fail_finalize = true;

    let err = fx.run(&[invocation(a, 1), invocation(b, 1)]).unwrap_err();

    assert_eq!(err, VaultError::InvalidHookReturnData.into());
    assert_eq!(fx.entries().last().unwrap(), "finalize:b");
}

// =============================================================================
// Accounting
// =============================================================================

#[test]
fn test_accounting_stable_under_hook_execution() {
    let mut fx = Fixture::new(1_000);
    let a = fx.add_hook("a");
    let b = fx.add_hook("b");

    let vault = VaultState {
        virtual_total_assets: 1_000,
        total_shares: 1_000,
        ..Default::default()
    };
    let share_price_before = vault.convert_to_assets(1_000).unwrap();

    fx.run(&[invocation(a, 400), invocation(b, 200)]).unwrap();

    // Assets changed location, not value
    let ledger = fx.ledger.borrow();
    let deployed: u64 = ledger.strategies.values().sum();
    assert_eq!(ledger.idle + deployed, 1_000);
    assert_eq!(vault.virtual_total_assets, 1_000);
    assert_eq!(vault.convert_to_assets(1_000).unwrap(), share_price_before);

    // Only what stayed idle can pay redemptions
    assert_eq!(vault.total_idle(ledger.idle), 400);
}

#[test]
fn test_output_amount_tracks_executed_state() {
    let mut fx = Fixture::new(1_000);
    let a = fx.add_hook("a");

    fx.run(&[invocation(a, 300)]).unwrap();
    fx.log.borrow_mut().clear();
    fx.run(&[invocation(a, 50)]).unwrap();

    assert!(fx.entries().contains(&"output:a=Some(350)".to_string()));
}

#[test]
fn test_overdrawing_execution_fails_chain() {
    let mut fx = Fixture::new(100);
    let a = fx.add_hook("a");

    assert_eq!(
        fx.run(&[invocation(a, 101)]).unwrap_err(),
        VaultError::InsufficientIdle.into()
    );
}

// =============================================================================
// Cross-hook data passing
// =============================================================================

#[test]
fn test_next_hook_consumes_previous_output_at_execution_time() {
    let mut fx = Fixture::new(950);
    let a = fx.add_hook("a");
    let b = fx.add_hook("b");
    let (a_program, a_strategy) = (fx.hook("a").program, fx.hook("a").strategy);
    let (b_program, b_strategy) = (fx.hook("b").program, fx.hook("b").strategy);
    fx.adapters
        .add(b_program, b_strategy, SWEEP_SELECTOR)
        .unwrap();

    // a holds 50 from an earlier batch, so its output at plan time is 50
    fx.ledger.borrow_mut().strategies.insert(a_strategy, 50);

    let sweep = HookInvocation {
        hook_id: b,
        config_data: vec![],
    };
    let results = fx.run(&[invocation(a, 100), sweep]).unwrap();

    // b moved what a held after a's execution, not what it held at plan time
    assert_eq!(results[1], 150u64.to_le_bytes().to_vec());
    {
        let ledger = fx.ledger.borrow();
        assert_eq!(ledger.strategies.get(&b_strategy), Some(&150));
        assert_eq!(ledger.strategies.get(&a_strategy), None);
        assert_eq!(ledger.idle, 850);
    }

    let entries = fx.entries();
    let position = |entry: String| {
        entries
            .iter()
            .position(|e| *e == entry)
            .unwrap_or_else(|| panic!("missing {} in {:?}", entry, entries))
    };
    let dispatch_a = position(format!("dispatch:{}", a_strategy));
    let read_a = position(format!("read:{}=150", a_program));
    let dispatch_b = position(format!("dispatch:{}", b_strategy));
    assert!(dispatch_a < read_a && read_a < dispatch_b);
    assert!(dispatch_b < position("finalize:a".to_string()));
}

#[test]
fn test_first_hook_cannot_defer_to_missing_previous() {
    let mut fx = Fixture::new(100);
    let a = fx.add_hook("a");

    let deferred = HookInvocation {
        hook_id: a,
        config_data: vec![],
    };
    assert_eq!(
        fx.run(&[deferred]).unwrap_err(),
        VaultError::InvalidExecutionData.into()
    );
}

// =============================================================================
// Return data limit
// =============================================================================

#[test]
fn test_results_fit_return_data_limit() {
    // 4-byte vector length, then 4 + 8 bytes per execution result
    let fitting = (MAX_RETURN_DATA - 4) / 12;

    let mut fx = Fixture::new(1_000);
    let a = fx.add_hook("a");
    let invocations = vec![invocation(a, 1); fitting];
    assert_eq!(fx.run(&invocations).unwrap().len(), fitting);
}

#[test]
fn test_results_over_return_data_limit_stop_the_chain() {
    let fitting = (MAX_RETURN_DATA - 4) / 12;

    let mut fx = Fixture::new(1_000);
    let a = fx.add_hook("a");
    let invocations = vec![invocation(a, 1); fitting + 5];

    assert_eq!(
        fx.run(&invocations).unwrap_err(),
        VaultError::ResultsTooLarge.into()
    );
    // Stops at the first result that crosses the limit
    let dispatched = fx
        .entries()
        .iter()
        .filter(|e| e.starts_with("dispatch:"))
        .count();
    assert_eq!(dispatched, fitting + 1);
    assert!(!fx.entries().iter().any(|e| e.starts_with("finalize:")));
}
