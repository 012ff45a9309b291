//! Call stack for nested frames
//!
//! Sub-calls never recurse on the host stack. A CALL-family or CREATE
//! instruction parks its frame with a [`FrameRequest`]; [`Interpreter::run`]
//! pushes a child [`Frame`] onto a heap-allocated stack and resumes the parent
//! once the child finishes. Depth is therefore bounded only by
//! `EvmConfig::max_call_depth`.
//!
//! Memory is budgeted across the whole call tree: a child may only grow to
//! what its parent has left of the limit.

use bytes::Bytes;
use sevm_primitives::Address;

use crate::context::Environment;
use crate::error::{EvmResult, ExecutionResult};
use crate::interpreter::Interpreter;
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::state::{Account, WorldState};
use crate::storage::Storage;
use crate::word::Word;

/// Sub-frame asked for by the instruction that just executed
#[derive(Clone, Debug)]
pub(crate) struct FrameRequest {
    pub(crate) kind: FrameKind,
    pub(crate) code: Bytes,
    pub(crate) env: Environment,
}

/// How a child's result is folded back into its parent
#[derive(Clone, Copy, Debug)]
pub(crate) enum FrameKind {
    /// CALL, DELEGATECALL or STATICCALL with the caller's output window
    Call {
        opcode: Opcode,
        ret_offset: usize,
        ret_size: usize,
    },
    /// CREATE of `address` endowed with `value`
    Create { address: Address, value: Word },
}

/// Why a frame gave control back to the driver
#[derive(Debug)]
pub(crate) enum FrameExit {
    /// Paused on a sub-call
    SubFrame(FrameRequest),
    /// Finished
    Done(ExecutionResult),
}

/// Child frame on the call stack
#[derive(Debug)]
struct Frame {
    interpreter: Interpreter,
    env: Environment,
    storage: Storage,
    kind: FrameKind,
    /// World state as it was before the child ran
    snapshot: WorldState,
    /// Caller storage before a DELEGATECALL borrowed it
    storage_snapshot: Option<Storage>,
}

impl Frame {
    fn enter(
        request: FrameRequest,
        parent: &mut Interpreter,
        state: &mut WorldState,
        parent_storage: &mut Storage,
    ) -> Self {
        let snapshot = state.clone();
        let mut storage_snapshot = None;
        let storage = match request.kind {
            FrameKind::Call {
                opcode: Opcode::DELEGATECALL,
                ..
            } => {
                let shared = std::mem::take(parent_storage);
                storage_snapshot = Some(shared.clone());
                shared
            }
            FrameKind::Create { address, value } => {
                state.insert(address, Account::with_balance(value));
                Storage::new()
            }
            FrameKind::Call { .. } => Storage::new(),
        };

        let mut interpreter = Interpreter::new(request.code, parent.config);
        interpreter.memory = Memory::with_limit(parent.memory.remaining());
        tracing::debug!(
            depth = request.env.call.depth,
            memory_budget = parent.memory.remaining(),
            "frame start"
        );

        Self {
            interpreter,
            env: request.env,
            storage,
            kind: request.kind,
            snapshot,
            storage_snapshot,
        }
    }

    /// Fold the finished child into its parent
    fn exit(
        self,
        result: ExecutionResult,
        parent: &mut Interpreter,
        state: &mut WorldState,
        parent_storage: &mut Storage,
    ) -> EvmResult<()> {
        let success = result.is_success();
        if let Some(backup) = self.storage_snapshot {
            *parent_storage = if success { self.storage } else { backup };
        }

        match self.kind {
            FrameKind::Call {
                opcode,
                ret_offset,
                ret_size,
            } => {
                // STATICCALL never leaks state, even on success
                if !success || opcode == Opcode::STATICCALL {
                    *state = self.snapshot;
                }
                parent.finish_call(result, ret_offset, ret_size)
            }
            FrameKind::Create { address, .. } => {
                if !success {
                    *state = self.snapshot;
                }
                parent.finish_create(address, result, state)
            }
        }
    }
}

/// The frame currently executing: the innermost child, or the root
fn top<'a>(
    frames: &'a mut [Frame],
    root: &'a mut Interpreter,
    root_env: &'a Environment,
    root_storage: &'a mut Storage,
) -> (&'a mut Interpreter, &'a Environment, &'a mut Storage) {
    match frames.last_mut() {
        Some(frame) => (&mut frame.interpreter, &frame.env, &mut frame.storage),
        None => (root, root_env, root_storage),
    }
}

impl Interpreter {
    /// Execute until completion or error, including every nested frame
    pub fn run(
        &mut self,
        env: &Environment,
        state: &mut WorldState,
        storage: &mut Storage,
    ) -> ExecutionResult {
        tracing::debug!(depth = env.call.depth, code_len = self.code.len(), "frame start");

        let mut frames: Vec<Frame> = Vec::new();
        loop {
            let (current, current_env, current_storage) = top(&mut frames, self, env, storage);
            match current.resume(current_env, state, current_storage) {
                FrameExit::SubFrame(request) => {
                    let (parent, _, parent_storage) = top(&mut frames, self, env, storage);
                    let frame = Frame::enter(request, parent, state, parent_storage);
                    frames.push(frame);
                }
                FrameExit::Done(result) => {
                    let Some(child) = frames.pop() else {
                        return result;
                    };
                    let (parent, _, parent_storage) = top(&mut frames, self, env, storage);
                    if let Err(err) = child.exit(result, parent, state, parent_storage) {
                        parent.fault = Some(err);
                    }
                }
            }
        }
    }
}
