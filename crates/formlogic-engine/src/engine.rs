//! Execute compiled programs: a stack-less machine over instruction rows with
//! jump-based control flow.

use tracing::{debug, trace};

use formlogic_core::Value;

use crate::policy;
use crate::types::{
    EngineError, EngineOptions, ExecutionContext, InstructionRow, Program, Result,
};

/// What happened to a field write requested by `s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The store was mutated (and dependents notified).
    Applied,
    /// The target was already being written further up the call chain.
    Suppressed,
    /// The target is not a field of the store.
    UnknownField,
    /// The host does not accept writes.
    Refused,
}

/// What happened to a property push requested by `sp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Delivered,
    /// No live binding for the target; not an error.
    NoBinding,
    /// The host does not accept pushes.
    Refused,
}

/// The engine's only window onto fields and bound components.
///
/// Reads are live: every operand is resolved at the moment its row runs.
/// The default write and push implementations refuse, which is what a
/// read-only host wants.
pub trait Host {
    /// Current value of a field, `None` if there is no such field.
    fn read(&self, name: &str) -> Option<Value>;

    fn write(&mut self, _target: &str, _value: Value) -> WriteOutcome {
        WriteOutcome::Refused
    }

    fn push_property(&mut self, _target: &str, _property: &str, _value: Value) -> PushOutcome {
        PushOutcome::Refused
    }
}

/// Control flow returned by an opcode handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Next,
    Jump(i64),
    Halt,
}

/// Mutable state a handler works against.
struct Machine<'a> {
    host: &'a mut dyn Host,
    ctx: &'a mut ExecutionContext,
    options: &'a EngineOptions,
}

type Handler = fn(&mut Machine<'_>, &InstructionRow) -> Result<Flow>;

/// Handlers indexed by [`Opcode::index`].
const HANDLERS: [Handler; 4] = [op_jrgt, op_set, op_set_prop, op_set_res];

/// Run `program` under `ctx` until it falls off the end, halts, or fails.
///
/// Rows executed before a failure keep their effects; nothing is rolled back.
pub fn run(
    program: &Program,
    mut ctx: ExecutionContext,
    host: &mut dyn Host,
    options: &EngineOptions,
) -> Result<ExecutionContext> {
    debug!(context = %ctx.kind, rows = program.len(), "running program");
    let len = program.len();
    ctx.row = 0;

    while let Some(row) = program.row(ctx.row) {
        if ctx.steps >= options.max_steps {
            return Err(EngineError::StepLimitExceeded {
                limit: options.max_steps,
            });
        }
        ctx.steps += 1;

        let opcode = row.opcode.ok_or_else(|| EngineError::UnknownOpcode {
            row: ctx.row,
            mnemonic: row.mnemonic.clone(),
        })?;
        if !policy::permits(ctx.kind, opcode) {
            return Err(EngineError::UnauthorizedOpcode {
                row: ctx.row,
                opcode,
                context: ctx.kind,
            });
        }
        if row.operands.len() < opcode.arity() {
            return Err(EngineError::MissingOperand {
                row: ctx.row,
                opcode,
                expected: opcode.arity(),
                found: row.operands.len(),
            });
        }

        trace!(row = ctx.row, instruction = %row, "exec");
        let flow = {
            let mut machine = Machine {
                host: &mut *host,
                ctx: &mut ctx,
                options,
            };
            HANDLERS[opcode.index()](&mut machine, row)?
        };

        ctx.row = match flow {
            Flow::Next => ctx.row + 1,
            // Anything outside 0..len, overflow included, ends the run.
            Flow::Jump(offset) => i64::try_from(ctx.row)
                .ok()
                .and_then(|row| row.checked_add(offset))
                .and_then(|target| usize::try_from(target).ok())
                .filter(|&target| target < len)
                .unwrap_or(len),
            Flow::Halt => len,
        };
    }

    debug!(steps = ctx.steps, result = ?ctx.result, "program finished");
    Ok(ctx)
}

impl Machine<'_> {
    /// Resolve an operand: a field's live value, else a numeric literal.
    fn resolve(&self, operand: &str) -> Result<Value> {
        if let Some(value) = self.host.read(operand) {
            return Ok(value);
        }
        if is_numeric_literal(operand) {
            if let Ok(n) = operand.parse::<f64>() {
                return Ok(Value::Number(n));
            }
        }
        Err(EngineError::MissingField {
            row: self.ctx.row,
            field: operand.to_owned(),
        })
    }
}

fn is_numeric_literal(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
}

fn op_jrgt(m: &mut Machine<'_>, row: &InstructionRow) -> Result<Flow> {
    let a = m.resolve(&row.operands[0])?.to_number();
    let b = m.resolve(&row.operands[1])?.to_number();
    let raw = &row.operands[2];
    let offset = raw
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && n.fract() == 0.0)
        .ok_or_else(|| EngineError::InvalidOffset {
            row: m.ctx.row,
            operand: raw.clone(),
        })? as i64;

    if m.options.jump_relation.holds(a, b) {
        Ok(Flow::Jump(offset))
    } else {
        Ok(Flow::Next)
    }
}

fn op_set(m: &mut Machine<'_>, row: &InstructionRow) -> Result<Flow> {
    let target = &row.operands[0];
    let value = m.resolve(&row.operands[1])?;
    match m.host.write(target, value) {
        WriteOutcome::Applied => {}
        WriteOutcome::Suppressed => trace!(target = %target, "write suppressed"),
        WriteOutcome::UnknownField => {
            return Err(EngineError::MissingField {
                row: m.ctx.row,
                field: target.clone(),
            });
        }
        WriteOutcome::Refused => return Err(EngineError::ReadOnly { row: m.ctx.row }),
    }
    Ok(Flow::Next)
}

fn op_set_prop(m: &mut Machine<'_>, row: &InstructionRow) -> Result<Flow> {
    let target = &row.operands[0];
    let property = &row.operands[1];
    let value = m.resolve(&row.operands[2])?;
    match m.host.push_property(target, property, value) {
        PushOutcome::Delivered => {}
        PushOutcome::NoBinding => trace!(target = %target, property = %property, "no binding"),
        PushOutcome::Refused => return Err(EngineError::ReadOnly { row: m.ctx.row }),
    }
    Ok(Flow::Next)
}

fn op_set_res(m: &mut Machine<'_>, row: &InstructionRow) -> Result<Flow> {
    m.ctx.result = Some(Value::from_input(&row.operands[0]));
    Ok(Flow::Halt)
}
