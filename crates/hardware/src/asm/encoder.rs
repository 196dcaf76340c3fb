//! Binary encoder: typed token stream → instruction records.
//!
//! The encoder groups tokens into function units, resolves function-name
//! references to addresses inside the reserved RAM window, selects the exact
//! opcode variant from each mnemonic and its operands' lexical types, and
//! emits one 24-byte record per instruction.
//!
//! Failure policy: a structural error (bad arity, unknown mnemonic, unknown
//! register, duplicate unit name, unresolved reference, malformed separator)
//! is recorded and aborts the current unit; sibling units continue. A
//! lexical error from the tokenizer aborts encoding entirely. Nothing
//! panics past this boundary.

use std::collections::HashMap;

use tracing::debug;

use crate::asm::error::{AsmError, AsmErrorKind};
use crate::asm::lexer::{self, Token, TokenKind};
use crate::common::constants::{RAM_BASE, WORDS_PER_INSTRUCTION};
use crate::common::reg::register_index;
use crate::isa::{AddrMode, Instruction, Opcode};

/// Result of an assembly run.
///
/// When `errors` is non-empty the code stream is best-effort debris from the
/// units that did encode, and should be discarded.
#[derive(Clone, Debug, Default)]
pub struct Assembly {
    /// Emitted instruction records, 24 bytes each.
    pub code: Vec<u8>,
    /// Accumulated encoding errors, in source order.
    pub errors: Vec<AsmError>,
}

/// Mnemonic table: name and fixed operand arity.
const MNEMONICS: &[(&str, usize)] = &[
    ("nop", 0),
    ("add", 2),
    ("sub", 2),
    ("mul", 2),
    ("div", 2),
    ("and", 2),
    ("or", 2),
    ("xor", 2),
    ("nor", 2),
    ("nand", 2),
    ("lshift", 2),
    ("rshift", 2),
    ("cmp", 2),
    ("jit", 1),
    ("jmp", 1),
    ("call", 1),
    ("ret", 0),
    ("push", 1),
    ("pop", 1),
    ("mov", 2),
    ("int", 1),
    ("iret", 0),
    ("lditbl", 1),
    ("hlt", 0),
];

fn arity_of(mnemonic: &str) -> Option<usize> {
    MNEMONICS
        .iter()
        .find(|(name, _)| *name == mnemonic)
        .map(|(_, arity)| *arity)
}

/// How an operand participates in opcode selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OperandClass {
    /// Register operand — selects a `*Reg` variant.
    Reg,
    /// Address or function reference — selects a `*Mem` variant.
    Mem,
    /// Integer or character literal — selects a `*Imm` variant.
    Imm,
}

fn class_of(token: &Token) -> Option<OperandClass> {
    match token.kind {
        TokenKind::Register => Some(OperandClass::Reg),
        TokenKind::Address | TokenKind::Identifier => Some(OperandClass::Mem),
        TokenKind::Integer | TokenKind::Char => Some(OperandClass::Imm),
        TokenKind::Label | TokenKind::Comma => None,
    }
}

fn is_operand(token: &Token) -> bool {
    class_of(token).is_some()
}

/// One grouped instruction: the mnemonic token and its operand tokens.
struct InstrGroup<'a> {
    mnemonic: &'a Token,
    operands: Vec<&'a Token>,
}

/// One top-level item of the stream.
enum Item<'a> {
    /// A loose instruction outside any unit.
    Instr(InstrGroup<'a>),
    /// A named function unit.
    Unit {
        name: &'a Token,
        instrs: Vec<InstrGroup<'a>>,
    },
}

/// Assembles source text end to end.
///
/// Tokenizer errors abort encoding entirely and are surfaced as the
/// assembly's errors; otherwise this is [`assemble`] over the token stream.
pub fn assemble_source(source: &str) -> Assembly {
    let lexed = lexer::tokenize(source);
    if !lexed.errors.is_empty() {
        return Assembly {
            code: Vec::new(),
            errors: lexed.errors,
        };
    }
    assemble(&lexed.tokens)
}

/// Assembles a typed token stream into instruction records.
///
/// # Arguments
///
/// * `tokens` - The token stream, as produced by [`lexer::tokenize`].
///
/// # Returns
///
/// The emitted code plus all accumulated errors; never panics past this
/// boundary.
pub fn assemble(tokens: &[Token]) -> Assembly {
    let mut errors = Vec::new();
    let items = group_items(tokens, &mut errors);

    // Function offsets are in instruction-word units: every instruction
    // occupies exactly WORDS_PER_INSTRUCTION words, so a unit's offset is
    // independent of where a reference to it appears.
    let mut offsets: HashMap<&str, u64> = HashMap::new();
    let mut word_offset = 0u64;
    for item in &items {
        match item {
            Item::Instr(_) => word_offset += WORDS_PER_INSTRUCTION,
            Item::Unit { name, instrs } => {
                let _ = offsets.insert(name.text.as_str(), word_offset);
                word_offset += WORDS_PER_INSTRUCTION * instrs.len() as u64;
            }
        }
    }

    let mut code = Vec::new();
    for item in &items {
        match item {
            Item::Instr(group) => match compile_instruction(group, &offsets) {
                Ok(instr) => instr.write_bytes(&mut code),
                Err(e) => errors.push(e),
            },
            Item::Unit { instrs, .. } => {
                for group in instrs {
                    match compile_instruction(group, &offsets) {
                        Ok(instr) => instr.write_bytes(&mut code),
                        Err(e) => {
                            // Abort the rest of this unit; siblings continue.
                            errors.push(e);
                            break;
                        }
                    }
                }
            }
        }
    }

    debug!(
        units = items.len(),
        bytes = code.len(),
        errors = errors.len(),
        "assembly finished"
    );
    Assembly { code, errors }
}

/// Groups the token stream into loose instructions and function units.
///
/// A label opens a unit that collects instructions until the next label or
/// the end of the stream. A failed instruction drops the rest of its unit;
/// a top-level token that is neither a label nor a mnemonic aborts grouping.
fn group_items<'a>(tokens: &'a [Token], errors: &mut Vec<AsmError>) -> Vec<Item<'a>> {
    let mut items = Vec::new();
    let mut seen_units: Vec<&str> = Vec::new();
    let mut i = 0usize;

    while i < tokens.len() {
        let token = &tokens[i];
        match token.kind {
            TokenKind::Label => {
                i += 1;
                let mut instrs = Vec::new();
                let mut unit_ok = true;
                while i < tokens.len() && tokens[i].kind != TokenKind::Label {
                    match take_instruction(tokens, &mut i) {
                        Ok(group) => instrs.push(group),
                        Err(e) => {
                            errors.push(e);
                            unit_ok = false;
                            skip_to_next_label(tokens, &mut i);
                            break;
                        }
                    }
                }
                if seen_units.contains(&token.text.as_str()) {
                    errors.push(AsmError::at(
                        AsmErrorKind::DuplicateFunction(token.text.clone()),
                        token.line,
                    ));
                } else if unit_ok {
                    seen_units.push(token.text.as_str());
                    items.push(Item::Unit {
                        name: token,
                        instrs,
                    });
                }
            }
            TokenKind::Identifier => match take_instruction(tokens, &mut i) {
                Ok(group) => items.push(Item::Instr(group)),
                Err(e) => {
                    errors.push(e);
                    skip_to_next_label(tokens, &mut i);
                }
            },
            _ => {
                errors.push(AsmError::at(
                    AsmErrorKind::InvalidToken(token.text.clone()),
                    token.line,
                ));
                break;
            }
        }
    }
    items
}

fn skip_to_next_label(tokens: &[Token], i: &mut usize) {
    while *i < tokens.len() && tokens[*i].kind != TokenKind::Label {
        *i += 1;
    }
}

/// Consumes one instruction group starting at `tokens[*i]`, advancing `i`
/// past it on success.
fn take_instruction<'a>(tokens: &'a [Token], i: &mut usize) -> Result<InstrGroup<'a>, AsmError> {
    let mnemonic = &tokens[*i];
    if mnemonic.kind != TokenKind::Identifier {
        *i += 1;
        return Err(AsmError::at(
            AsmErrorKind::InvalidToken(mnemonic.text.clone()),
            mnemonic.line,
        ));
    }
    let Some(arity) = arity_of(&mnemonic.text) else {
        *i += 1;
        return Err(AsmError::at(
            AsmErrorKind::UnknownMnemonic(mnemonic.text.clone()),
            mnemonic.line,
        ));
    };

    let wrong_count = || {
        AsmError::at(
            AsmErrorKind::WrongOperandCount {
                mnemonic: mnemonic.text.clone(),
                expected: arity,
            },
            mnemonic.line,
        )
    };

    let mut operands = Vec::with_capacity(arity);
    match arity {
        0 => {
            *i += 1;
        }
        1 => {
            let op = tokens.get(*i + 1).filter(|t| is_operand(t));
            let Some(op) = op else {
                *i += 1;
                return Err(wrong_count());
            };
            operands.push(op);
            *i += 2;
        }
        _ => {
            let first = tokens.get(*i + 1).filter(|t| is_operand(t));
            let Some(first) = first else {
                *i += 1;
                return Err(wrong_count());
            };
            match tokens.get(*i + 2) {
                Some(t) if t.kind == TokenKind::Comma => {}
                Some(t) if t.kind != TokenKind::Label => {
                    *i += 2;
                    return Err(AsmError::at(AsmErrorKind::MissingSeparator, mnemonic.line));
                }
                _ => {
                    *i += 2;
                    return Err(wrong_count());
                }
            }
            let second = tokens.get(*i + 3).filter(|t| is_operand(t));
            let Some(second) = second else {
                *i += 3;
                return Err(wrong_count());
            };
            operands.push(first);
            operands.push(second);
            *i += 4;
        }
    }
    Ok(InstrGroup { mnemonic, operands })
}

/// Compiles one grouped instruction into its wire form.
fn compile_instruction(
    group: &InstrGroup<'_>,
    offsets: &HashMap<&str, u64>,
) -> Result<Instruction, AsmError> {
    let line = group.mnemonic.line;
    let name = group.mnemonic.text.as_str();

    // The addressing-mode tag records the first operand's lexical class.
    let mode = match group.operands.first().map(|t| t.kind) {
        Some(TokenKind::Register) | None => AddrMode::Reg,
        Some(TokenKind::Address | TokenKind::Identifier) => AddrMode::Addr,
        _ => AddrMode::Raw,
    };

    let mut classes = Vec::with_capacity(group.operands.len());
    for op in &group.operands {
        match class_of(op) {
            Some(class) => classes.push(class),
            None => {
                return Err(AsmError::at(
                    AsmErrorKind::UnsupportedOperand(name.to_string()),
                    line,
                ));
            }
        }
    }

    let opcode = select_opcode(name, &classes).map_err(|kind| AsmError::at(kind, line))?;

    let a = match group.operands.first() {
        Some(op) => operand_value(op, offsets)?,
        None => 0,
    };
    let b = match group.operands.get(1) {
        Some(op) => operand_value(op, offsets)?,
        None => 0,
    };

    Ok(Instruction::new(opcode, mode, a, b))
}

/// Register/memory variant pairs for the binary ALU family.
fn alu_variants(name: &str) -> Option<(Opcode, Opcode)> {
    Some(match name {
        "add" => (Opcode::AddReg, Opcode::AddMem),
        "sub" => (Opcode::SubReg, Opcode::SubMem),
        "mul" => (Opcode::MulReg, Opcode::MulMem),
        "div" => (Opcode::DivReg, Opcode::DivMem),
        "and" => (Opcode::AndReg, Opcode::AndMem),
        "or" => (Opcode::OrReg, Opcode::OrMem),
        "xor" => (Opcode::XorReg, Opcode::XorMem),
        "nor" => (Opcode::NorReg, Opcode::NorMem),
        "nand" => (Opcode::NandReg, Opcode::NandMem),
        "lshift" => (Opcode::LshiftReg, Opcode::LshiftMem),
        "rshift" => (Opcode::RshiftReg, Opcode::RshiftMem),
        "cmp" => (Opcode::CmpReg, Opcode::CmpMem),
        _ => return None,
    })
}

/// Selects the exact opcode variant for a mnemonic from its operand classes.
fn select_opcode(name: &str, classes: &[OperandClass]) -> Result<Opcode, AsmErrorKind> {
    use OperandClass::{Imm, Mem, Reg};

    if let Some((reg_variant, mem_variant)) = alu_variants(name) {
        return match classes[0] {
            Reg => Ok(reg_variant),
            Mem => Ok(mem_variant),
            Imm => Err(AsmErrorKind::NoValidDestination(name.to_string())),
        };
    }

    Ok(match name {
        "nop" => Opcode::Nop,
        "ret" => Opcode::Ret,
        "iret" => Opcode::Iret,
        "hlt" => Opcode::Hlt,
        // A register holds the target; an address, label, or literal *is*
        // the target. The memory-indirect jump variants have no spelling
        // on this surface.
        "jit" => match classes[0] {
            Reg => Opcode::JitReg,
            Mem | Imm => Opcode::JitImm,
        },
        "jmp" => match classes[0] {
            Reg => Opcode::JmpReg,
            Mem | Imm => Opcode::JmpImm,
        },
        "call" => match classes[0] {
            Reg => Opcode::CallReg,
            Mem | Imm => Opcode::CallImm,
        },
        "push" => match classes[0] {
            Reg => Opcode::PushReg,
            Mem => Opcode::PushMem,
            Imm => return Err(AsmErrorKind::UnsupportedOperand(name.to_string())),
        },
        "pop" => match classes[0] {
            Reg => Opcode::PopReg,
            Mem => Opcode::PopMem,
            Imm => return Err(AsmErrorKind::UnsupportedOperand(name.to_string())),
        },
        "lditbl" => match classes[0] {
            Reg => Opcode::LditblReg,
            Mem => Opcode::LditblMem,
            Imm => return Err(AsmErrorKind::UnsupportedOperand(name.to_string())),
        },
        "int" => match classes[0] {
            Reg => Opcode::IntReg,
            Mem => Opcode::IntMem,
            Imm => Opcode::IntImm,
        },
        "mov" => match (classes[0], classes[1]) {
            (Reg, Reg) => Opcode::MovRegReg,
            (Reg, Mem) => Opcode::MovRegMem,
            (Reg, Imm) => Opcode::StoreReg,
            (Mem, Reg) => Opcode::MovMemReg,
            (Mem, Mem) => Opcode::MovMemMem,
            (Mem, Imm) => Opcode::StoreMem,
            (Imm, _) => return Err(AsmErrorKind::NoValidDestination(name.to_string())),
        },
        _ => return Err(AsmErrorKind::UnknownMnemonic(name.to_string())),
    })
}

/// Compiles one operand token to its encoded 64-bit value.
fn operand_value(token: &Token, offsets: &HashMap<&str, u64>) -> Result<u64, AsmError> {
    let bad_literal = || {
        AsmError::at(
            AsmErrorKind::BadLiteral(token.text.clone()),
            token.line,
        )
    };
    match token.kind {
        TokenKind::Register => register_index(&token.text).ok_or_else(|| {
            AsmError::at(
                AsmErrorKind::UnknownRegister(token.text.clone()),
                token.line,
            )
        }),
        TokenKind::Address => u64::from_str_radix(&token.text, 16).map_err(|_| bad_literal()),
        TokenKind::Identifier => offsets
            .get(token.text.as_str())
            .map(|offset| RAM_BASE + offset)
            .ok_or_else(|| {
                AsmError::at(
                    AsmErrorKind::UnresolvedReference(token.text.clone()),
                    token.line,
                )
            }),
        TokenKind::Char => {
            // Value of the character's single encoded byte.
            let mut buf = [0u8; 4];
            let c = token.text.chars().next().ok_or_else(bad_literal)?;
            let _ = c.encode_utf8(&mut buf);
            Ok(u64::from(buf[0]))
        }
        TokenKind::Integer => {
            let text = token.text.as_str();
            if let Some(digits) = text.strip_prefix("0b") {
                u64::from_str_radix(digits, 2).map_err(|_| bad_literal())
            } else if let Some(digits) = text.strip_prefix("0x") {
                u64::from_str_radix(digits, 16).map_err(|_| bad_literal())
            } else {
                text.parse::<u64>().map_err(|_| bad_literal())
            }
        }
        TokenKind::Label | TokenKind::Comma => Err(AsmError::at(
            AsmErrorKind::InvalidToken(token.text.clone()),
            token.line,
        )),
    }
}
