use std::fmt::Display;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodeError {
    #[error("opcode {0} is undefined")]
    UndefinedOpcode(u8),
}

/// One-byte instruction tags. The discriminants are the wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// Push a constant-pool entry; one 2-byte operand, the pool index.
    Constant = 0,
    Add,
    Pop,
    Sub,
    Mul,
    Div,
    True,
    False,
    Equal,
    NotEqual,
    GreaterThan,
    Minus,
    Bang,
}

impl TryFrom<u8> for Opcode {
    type Error = CodeError;

    fn try_from(byte: u8) -> Result<Self, CodeError> {
        let op = match byte {
            0 => Opcode::Constant,
            1 => Opcode::Add,
            2 => Opcode::Pop,
            3 => Opcode::Sub,
            4 => Opcode::Mul,
            5 => Opcode::Div,
            6 => Opcode::True,
            7 => Opcode::False,
            8 => Opcode::Equal,
            9 => Opcode::NotEqual,
            10 => Opcode::GreaterThan,
            11 => Opcode::Minus,
            12 => Opcode::Bang,
            other => return Err(CodeError::UndefinedOpcode(other)),
        };
        Ok(op)
    }
}

/// Per-opcode mnemonic and fixed operand widths. The table drives both the
/// encoder and the disassembler.
#[derive(Debug)]
pub struct Definition {
    pub name: &'static str,
    pub operand_widths: &'static [usize],
}

pub fn lookup(op: Opcode) -> &'static Definition {
    match op {
        Opcode::Constant => &Definition { name: "OpConstant", operand_widths: &[2] },
        Opcode::Add => &Definition { name: "OpAdd", operand_widths: &[] },
        Opcode::Pop => &Definition { name: "OpPop", operand_widths: &[] },
        Opcode::Sub => &Definition { name: "OpSub", operand_widths: &[] },
        Opcode::Mul => &Definition { name: "OpMul", operand_widths: &[] },
        Opcode::Div => &Definition { name: "OpDiv", operand_widths: &[] },
        Opcode::True => &Definition { name: "OpTrue", operand_widths: &[] },
        Opcode::False => &Definition { name: "OpFalse", operand_widths: &[] },
        Opcode::Equal => &Definition { name: "OpEqual", operand_widths: &[] },
        Opcode::NotEqual => &Definition { name: "OpNotEqual", operand_widths: &[] },
        Opcode::GreaterThan => &Definition { name: "OpGreaterThan", operand_widths: &[] },
        Opcode::Minus => &Definition { name: "OpMinus", operand_widths: &[] },
        Opcode::Bang => &Definition { name: "OpBang", operand_widths: &[] },
    }
}

/// Encode an instruction: the opcode byte followed by each operand in
/// big-endian order at its defined width.
pub fn make(op: Opcode, operands: &[usize]) -> Vec<u8> {
    let def = lookup(op);

    let len = 1 + def.operand_widths.iter().sum::<usize>();
    let mut instruction = Vec::with_capacity(len);
    instruction.push(op as u8);

    for (operand, width) in operands.iter().zip(def.operand_widths) {
        match width {
            2 => instruction.extend_from_slice(&(*operand as u16).to_be_bytes()),
            _ => unreachable!("unhandled operand width {}", width),
        }
    }
    instruction
}

/// Decode the operands following an opcode byte; returns the operands and
/// the number of bytes consumed.
pub fn read_operands(def: &Definition, ins: &[u8]) -> (Vec<usize>, usize) {
    let mut operands = Vec::with_capacity(def.operand_widths.len());
    let mut offset = 0;

    for width in def.operand_widths {
        match width {
            2 => operands.push(read_u16(&ins[offset..]) as usize),
            _ => unreachable!("unhandled operand width {}", width),
        }
        offset += width;
    }
    (operands, offset)
}

pub fn read_u16(ins: &[u8]) -> u16 {
    u16::from_be_bytes([ins[0], ins[1]])
}

/// A flat byte stream of encoded instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Instructions(pub Vec<u8>);

impl Instructions {
    pub fn push(&mut self, bytes: &[u8]) -> usize {
        let position = self.0.len();
        self.0.extend_from_slice(bytes);
        position
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Disassembler: one `<offset> <mnemonic> <operands>` line per
/// instruction.
impl Display for Instructions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut i = 0;
        while i < self.0.len() {
            let op = match Opcode::try_from(self.0[i]) {
                Ok(op) => op,
                Err(e) => {
                    writeln!(f, "ERROR: {}", e)?;
                    return Ok(());
                }
            };
            let def = lookup(op);
            let (operands, read) = read_operands(def, &self.0[i + 1..]);

            write!(f, "{:04} {}", i, def.name)?;
            for operand in &operands {
                write!(f, " {}", operand)?;
            }
            writeln!(f)?;

            i += 1 + read;
        }
        Ok(())
    }
}
