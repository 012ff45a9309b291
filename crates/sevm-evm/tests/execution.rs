//! End-to-end execution tests for sevm-evm
//!
//! Each test runs raw bytecode through `Evm` and checks the returned stack,
//! status, output and logs.

use sevm_evm::{
    word, Account, BlockContext, CallContext, Environment, Evm, EvmConfig, EvmError,
    ExecutionResult, ExitStatus, Storage, TxContext, WorldState,
};
use sevm_primitives::{Address, H256};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("sevm_evm=debug")
        .with_test_writer()
        .try_init();
}

fn run(code: &[u8]) -> ExecutionResult {
    init_tracing();
    let mut state = WorldState::new();
    Evm::default().transact(code.to_vec(), &Environment::default(), &mut state)
}

fn hex_word(s: &str) -> [u8; 32] {
    let bytes = hex::decode(s).unwrap();
    word::from_slice_padded(&bytes)
}

// ==================== Arithmetic Programs ====================

#[test]
fn test_push_add_stop() {
    let result = run(&[0x60, 0x01, 0x60, 0x02, 0x01, 0x00]);
    assert!(result.is_success());
    assert_eq!(result.stack, vec![word::from_u64(3)]);
}

#[test]
fn test_add_on_short_stack() {
    let result = run(&[0x60, 0x01, 0x01]);
    assert!(!result.is_success());
    assert!(result.stack.is_empty());
    assert!(result.logs.is_empty());
}

#[test]
fn test_add_wraps() {
    // PUSH32 0xff..ff, PUSH1 2, ADD
    let mut code = vec![0x7F];
    code.extend_from_slice(&[0xFF; 32]);
    code.extend_from_slice(&[0x60, 0x02, 0x01]);
    let result = run(&code);
    assert_eq!(result.stack, vec![word::ONE]);
}

#[test]
fn test_div_and_mod_by_zero() {
    // PUSH1 0, PUSH1 7, DIV, PUSH1 0, PUSH1 7, MOD
    let result = run(&[0x60, 0x00, 0x60, 0x07, 0x04, 0x60, 0x00, 0x60, 0x07, 0x06]);
    assert_eq!(result.stack, vec![word::ZERO, word::ZERO]);
}

#[test]
fn test_signextend() {
    // PUSH1 0x7f, PUSH1 0, SIGNEXTEND, PUSH1 0x80, PUSH1 0, SIGNEXTEND
    let result = run(&[0x60, 0x7F, 0x60, 0x00, 0x0B, 0x60, 0x80, 0x60, 0x00, 0x0B]);
    let mut negative = [0xFF; 32];
    negative[31] = 0x80;
    assert_eq!(result.stack, vec![negative, word::from_u64(0x7F)]);
}

#[test]
fn test_signed_division() {
    // PUSH1 2, PUSH32 -8, SDIV -> -4
    let mut code = vec![0x60, 0x02, 0x7F];
    let mut minus_eight = [0xFF; 32];
    minus_eight[31] = 0xF8;
    code.extend_from_slice(&minus_eight);
    code.push(0x05);
    let mut minus_four = [0xFF; 32];
    minus_four[31] = 0xFC;
    assert_eq!(run(&code).stack, vec![minus_four]);
}

#[test]
fn test_exp_and_shifts() {
    // PUSH1 10, PUSH1 2, EXP -> 1024; PUSH1 1, PUSH1 4, SHL -> 16
    let result = run(&[0x60, 0x0A, 0x60, 0x02, 0x0A, 0x60, 0x01, 0x60, 0x04, 0x1B]);
    assert_eq!(result.stack, vec![word::from_u64(16), word::from_u64(1024)]);
}

#[test]
fn test_push_then_pop_left_pads() {
    for n in 1..=32u8 {
        let literal: Vec<u8> = (1..=n).collect();
        let mut code = vec![0x5F + n];
        code.extend_from_slice(&literal);
        let result = run(&code);
        assert_eq!(result.stack, vec![word::from_slice_padded(&literal)], "PUSH{}", n);
    }
}

// ==================== Memory and Storage ====================

#[test]
fn test_mstore_mload_word() {
    let result = run(&[0x60, 0x01, 0x60, 0x00, 0x52, 0x60, 0x00, 0x51]);
    assert_eq!(
        result.stack,
        vec![hex_word("0000000000000000000000000000000000000000000000000000000000000001")]
    );
}

#[test]
fn test_sstore_sload() {
    // PUSH1 42, PUSH1 1, SSTORE, PUSH1 1, SLOAD, PUSH1 9, SLOAD
    let result = run(&[0x60, 0x2A, 0x60, 0x01, 0x55, 0x60, 0x01, 0x54, 0x60, 0x09, 0x54]);
    assert_eq!(result.stack, vec![word::ZERO, word::from_u64(42)]);
}

#[test]
fn test_storage_survives_between_runs() {
    let evm = Evm::default();
    let env = Environment::default();
    let mut state = WorldState::new();
    let mut storage = Storage::new();

    evm.execute(vec![0x60, 0x2A, 0x60, 0x01, 0x55], &env, &mut state, &mut storage);
    let result = evm.execute(vec![0x60, 0x01, 0x54], &env, &mut state, &mut storage);
    assert_eq!(result.stack, vec![word::from_u64(42)]);
}

#[test]
fn test_return_data() {
    // PUSH2 0xbeef, PUSH1 0, MSTORE, PUSH1 2, PUSH1 30, RETURN
    let result = run(&[0x61, 0xBE, 0xEF, 0x60, 0x00, 0x52, 0x60, 0x02, 0x60, 0x1E, 0xF3]);
    assert!(result.is_success());
    assert_eq!(result.output, vec![0xBE, 0xEF]);
}

// ==================== Control Flow ====================

#[test]
fn test_forward_jump() {
    // PUSH1 5, JUMP, PUSH1 1, JUMPDEST, PUSH1 2
    let result = run(&[0x60, 0x05, 0x56, 0x60, 0x01, 0x5B, 0x60, 0x02]);
    assert!(result.is_success());
    assert_eq!(result.stack, vec![word::from_u64(2)]);
}

#[test]
fn test_jump_into_push_data_fails() {
    // PUSH1 4, JUMP, PUSH1 0x5b, STOP
    let result = run(&[0x60, 0x04, 0x56, 0x60, 0x5B, 0x00]);
    assert_eq!(result.error(), Some(&EvmError::InvalidJump(4)));
    assert!(result.stack.is_empty());
}

#[test]
fn test_countdown_loop() {
    // PUSH1 5, JUMPDEST, PUSH1 1, SWAP1, SUB, DUP1, PUSH1 2, JUMPI
    let result = run(&[0x60, 0x05, 0x5B, 0x60, 0x01, 0x90, 0x03, 0x80, 0x60, 0x02, 0x57]);
    assert!(result.is_success());
    assert_eq!(result.stack, vec![word::ZERO]);
}

#[test]
fn test_backward_jump_is_allowed() {
    // 0: PUSH1 0x0a, 2: JUMP, 3: JUMPDEST, 4: PUSH1 7, 6: STOP, 7: INVALID,
    // 8: INVALID, 9: INVALID, 10: JUMPDEST, 11: PUSH1 3, 13: JUMP
    let code = [
        0x60, 0x0A, 0x56, 0x5B, 0x60, 0x07, 0x00, 0xFE, 0xFE, 0xFE, 0x5B, 0x60, 0x03, 0x56,
    ];
    let result = run(&code);
    assert!(result.is_success());
    assert_eq!(result.stack, vec![word::from_u64(7)]);
}

#[test]
fn test_step_limit_stops_infinite_loop() {
    let evm = Evm::new(EvmConfig {
        step_limit: Some(1_000),
        ..Default::default()
    });
    let mut state = WorldState::new();
    // JUMPDEST, PUSH1 0, JUMP
    let result = evm.transact(vec![0x5B, 0x60, 0x00, 0x56], &Environment::default(), &mut state);
    assert_eq!(result.error(), Some(&EvmError::StepLimitExceeded(1_000)));
}

// ==================== Environment ====================

#[test]
fn test_environment_opcodes() {
    let address = Address::from_bytes([0xAA; 20]);
    let caller = Address::from_bytes([0xBB; 20]);
    let origin = Address::from_bytes([0xCC; 20]);
    let coinbase = Address::from_bytes([0xDD; 20]);

    let env = Environment::new(
        CallContext::new(address, caller, word::from_u64(7), vec![0xAB]),
        BlockContext {
            base_fee: Some(word::from_u64(1)),
            coinbase: Some(coinbase),
            timestamp: Some(word::from_u64(2)),
            number: Some(word::from_u64(3)),
            difficulty: Some(word::from_u64(4)),
            gas_limit: Some(word::from_u64(5)),
            chain_id: Some(word::from_u64(6)),
        },
        TxContext {
            origin: Some(origin),
            gas_price: Some(word::from_u64(8)),
        },
    );

    // ADDRESS CALLER ORIGIN CALLVALUE CALLDATASIZE GASPRICE COINBASE
    // TIMESTAMP NUMBER DIFFICULTY GASLIMIT CHAINID BASEFEE
    let code = [
        0x30, 0x33, 0x32, 0x34, 0x36, 0x3A, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x48,
    ];
    let mut state = WorldState::new();
    let result = Evm::default().transact(code.to_vec(), &env, &mut state);
    assert!(result.is_success());

    let expected: Vec<[u8; 32]> = vec![
        word::from_u64(1),
        word::from_u64(6),
        word::from_u64(5),
        word::from_u64(4),
        word::from_u64(3),
        word::from_u64(2),
        word::from_address(&coinbase),
        word::from_u64(8),
        word::from_u64(1),
        word::from_u64(7),
        word::from_address(&origin),
        word::from_address(&caller),
        word::from_address(&address),
    ];
    assert_eq!(result.stack, expected);
}

#[test]
fn test_balance_and_extcode() {
    let target = Address::from_bytes([0x10; 20]);
    let mut state = WorldState::new();
    state.insert(target, Account::with_code(word::from_u64(500), vec![0x60, 0x01, 0x00]));

    // PUSH20 target, BALANCE, PUSH20 target, EXTCODESIZE
    let mut code = vec![0x73];
    code.extend_from_slice(target.as_bytes());
    code.push(0x31);
    code.push(0x73);
    code.extend_from_slice(target.as_bytes());
    code.push(0x3B);

    let result = Evm::default().transact(code, &Environment::default(), &mut state);
    assert_eq!(result.stack, vec![word::from_u64(3), word::from_u64(500)]);
}

#[test]
fn test_missing_context_is_error() {
    // TIMESTAMP with no block context
    let result = run(&[0x42]);
    assert_eq!(result.error(), Some(&EvmError::MissingContext("timestamp")));
}

// ==================== Logs ====================

#[test]
fn test_log1_records_emitter() {
    let address = Address::from_bytes([0x42; 20]);
    let mut env = Environment::default();
    env.call.address = Some(address);

    // PUSH1 0x11, PUSH1 0, MSTORE8, PUSH1 0x99, PUSH1 1, PUSH1 0, LOG1
    let code = vec![0x60, 0x11, 0x60, 0x00, 0x53, 0x60, 0x99, 0x60, 0x01, 0x60, 0x00, 0xA1];
    let mut state = WorldState::new();
    let result = Evm::default().transact(code, &env, &mut state);

    assert_eq!(result.logs.len(), 1);
    assert_eq!(result.logs[0].address, address);
    assert_eq!(result.logs[0].data, vec![0x11]);
    assert_eq!(result.logs[0].topics, vec![H256::from_bytes(word::from_u64(0x99))]);
}

#[test]
fn test_halt_discards_logs() {
    // PUSH1 0, PUSH1 0, LOG0, INVALID
    let result = run(&[0x60, 0x00, 0x60, 0x00, 0xA0, 0xFE]);
    assert!(matches!(result.status, ExitStatus::Halt(_)));
    assert!(result.logs.is_empty());
}
