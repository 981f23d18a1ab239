use serde::Deserialize;
use std::{fmt, str::FromStr};
use strum::{Display, EnumIter, EnumString};

/// Program-order sequence number, starting at 1.
pub type Seq = u32;

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Xor,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Opcode {
    Alu(AluOp),
    Load,
    Store,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EuType {
    Alu,
    Load,
    Store,
}

/// Zero-based architected register index. Written `R1`, `R2`, ... in text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchReg(pub u8);

/// Index of a rename register file slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operand {
    Imm(i32),
    Reg(ArchReg),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValueOrTag {
    Valid(i32),
    Invalid(Tag),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst {
    Alu(AluOp, ArchReg, Operand, Operand),
    Load(ArchReg, Operand),
    Store(Operand, Operand),
}

impl AluOp {
    pub fn compute(self, a: i32, b: i32) -> Option<i32> {
        Some(match self {
            AluOp::Add => a.wrapping_add(b),
            AluOp::Sub => a.wrapping_sub(b),
            AluOp::Mul => a.wrapping_mul(b),
            AluOp::Div => {
                if b == 0 {
                    return None;
                }
                a.wrapping_div(b)
            }
            AluOp::And => a & b,
            AluOp::Or => a | b,
            AluOp::Xor => a ^ b,
        })
    }
}

impl Opcode {
    pub fn eu_type(self) -> EuType {
        match self {
            Opcode::Alu(_) => EuType::Alu,
            Opcode::Load => EuType::Load,
            Opcode::Store => EuType::Store,
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Opcode::Load => 1,
            Opcode::Alu(_) | Opcode::Store => 2,
        }
    }
}

impl ValueOrTag {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValueOrTag::Valid(_))
    }

    pub fn value(&self) -> Option<i32> {
        match self {
            ValueOrTag::Valid(v) => Some(*v),
            ValueOrTag::Invalid(_) => None,
        }
    }
}

impl Inst {
    pub fn opcode(&self) -> Opcode {
        match self {
            Inst::Alu(op, _, _, _) => Opcode::Alu(*op),
            Inst::Load(_, _) => Opcode::Load,
            Inst::Store(_, _) => Opcode::Store,
        }
    }

    pub fn dst(&self) -> Option<ArchReg> {
        match self {
            Inst::Alu(_, dst, _, _) | Inst::Load(dst, _) => Some(*dst),
            Inst::Store(_, _) => None,
        }
    }

    pub fn srcs(&self) -> Vec<Operand> {
        match self {
            Inst::Alu(_, _, src0, src1) => vec![*src0, *src1],
            Inst::Load(_, addr) => vec![*addr],
            Inst::Store(addr, data) => vec![*addr, *data],
        }
    }

    /// Every register this instruction names, sources first.
    pub fn regs(&self) -> impl Iterator<Item = ArchReg> + '_ {
        self.srcs()
            .into_iter()
            .filter_map(|src| match src {
                Operand::Reg(r) => Some(r),
                Operand::Imm(_) => None,
            })
            .chain(self.dst())
    }
}

// Splits on whitespace and commas. A `[...]` memory reference is kept as one
// token with its inner whitespace dropped.
fn tokenize(s: &str) -> Vec<String> {
    let mut tokens = vec![];
    let mut cur = String::new();
    let mut in_brackets = false;

    for c in s.chars() {
        match c {
            '[' => {
                in_brackets = true;
                cur.push(c);
            }
            ']' => {
                in_brackets = false;
                cur.push(c);
            }
            c if c.is_whitespace() || c == ',' => {
                if !in_brackets && !cur.is_empty() {
                    tokens.push(std::mem::take(&mut cur));
                }
            }
            c => cur.push(c),
        }
    }
    if !cur.is_empty() {
        tokens.push(cur);
    }

    tokens
}

impl FromStr for Inst {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = tokenize(s).into_iter();
        let op = tokens.next().ok_or_else(|| "empty instruction".to_string())?;
        let args = tokens.collect::<Vec<_>>();

        let nth_arg = |n: usize| -> Result<&str, String> {
            args.get(n)
                .map(String::as_str)
                .ok_or_else(|| format!("cannot fetch argument {n}"))
        };
        let reg_arg = |n: usize| -> Result<ArchReg, String> { ArchReg::from_str(nth_arg(n)?) };
        let src_arg = |n: usize| -> Result<Operand, String> { Operand::from_str(nth_arg(n)?) };
        let addr_arg = |n: usize| -> Result<Operand, String> {
            let arg = nth_arg(n)?;
            let inner = match arg.strip_prefix('[') {
                Some(rest) => rest
                    .strip_suffix(']')
                    .ok_or_else(|| format!("invalid memory reference (unclosed []): '{arg}'"))?,
                None => arg,
            };
            Operand::from_str(inner.trim())
        };

        let opcode = Opcode::from_str(&op)?;
        let expected = opcode.arity() + usize::from(opcode != Opcode::Store);
        if args.len() != expected {
            return Err(format!(
                "'{op}' takes {expected} operands, found {}",
                args.len()
            ));
        }

        let inst = match opcode {
            Opcode::Alu(alu_op) => Inst::Alu(alu_op, reg_arg(0)?, src_arg(1)?, src_arg(2)?),
            Opcode::Load => Inst::Load(reg_arg(0)?, addr_arg(1)?),
            Opcode::Store => Inst::Store(addr_arg(0)?, src_arg(1)?),
        };

        Ok(inst)
    }
}

impl FromStr for Opcode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "LD" => Opcode::Load,
            "ST" => Opcode::Store,
            _ => Opcode::Alu(
                AluOp::from_str(s).map_err(|_| format!("unknown instruction: '{s}'"))?,
            ),
        })
    }
}

impl FromStr for ArchReg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let num = s
            .strip_prefix('R')
            .or_else(|| s.strip_prefix('r'))
            .ok_or_else(|| format!("unknown register: '{s}'"))?;

        match num.parse::<u8>() {
            Ok(0) | Err(_) => Err(format!("unknown register: '{s}'")),
            Ok(n) => Ok(ArchReg(n - 1)),
        }
    }
}

impl FromStr for Operand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with(&['R', 'r'][..]) {
            return ArchReg::from_str(s).map(Operand::Reg);
        }

        let val = if let Some(hex) = s.strip_prefix("0x") {
            i64::from_str_radix(hex, 16)
        } else if let Some(hex) = s.strip_prefix("-0x") {
            i64::from_str_radix(hex, 16).map(|v| -v)
        } else {
            i64::from_str(s)
        };

        val.ok()
            .and_then(|v| i32::try_from(v).ok())
            .map(Operand::Imm)
            .ok_or_else(|| format!("invalid immediate: '{s}'"))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::Alu(op) => write!(f, "{op}"),
            Opcode::Load => write!(f, "LD"),
            Opcode::Store => write!(f, "ST"),
        }
    }
}

impl fmt::Display for ArchReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", u32::from(self.0) + 1)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0 + 1)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Imm(v) => write!(f, "{v}"),
            Operand::Reg(r) => write!(f, "{r}"),
        }
    }
}

impl fmt::Display for ValueOrTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueOrTag::Valid(v) => write!(f, "{v}"),
            ValueOrTag::Invalid(tag) => write!(f, "{tag}"),
        }
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inst::Alu(op, dst, src0, src1) => write!(f, "{op} {dst}, {src0}, {src1}"),
            Inst::Load(dst, addr) => write!(f, "LD {dst}, [{addr}]"),
            Inst::Store(addr, data) => write!(f, "ST [{addr}], {data}"),
        }
    }
}
