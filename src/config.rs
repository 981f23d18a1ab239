use std::{fs, path::Path, str::FromStr};

use hashbrown::HashMap;
use log::debug;
use serde::Deserialize;
use strum::IntoEnumIterator;

use crate::{
    error::{SimError, SimResult},
    inst::AluOp,
};

/// Fixed latency of the load and store units.
pub const MEM_UNIT_LATENCY: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    // reservation station entries
    pub rs_capacity: usize,
    // reorder buffer entries
    pub rob_capacity: usize,
    // store buffer entries
    pub sb_capacity: usize,
    // rename register slots
    pub rrf_capacity: usize,
    // architected registers, R1..Rn
    pub arf_size: usize,
    // memory size in words
    pub memory_size: usize,
    // instructions dispatched per cycle
    pub issue_width: usize,
    pub alu_count: usize,
    pub initial_reg_value: i32,
    pub initial_mem_value: i32,
    // cycles per ALU operation; every operation must be present
    pub latencies: HashMap<AluOp, u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rs_capacity: 4,
            rob_capacity: 8,
            sb_capacity: 4,
            rrf_capacity: 8,
            arf_size: 8,
            memory_size: 100,
            issue_width: 2,
            alu_count: 2,
            initial_reg_value: 1,
            initial_mem_value: 1,
            latencies: [
                (AluOp::Add, 1),
                (AluOp::Sub, 1),
                (AluOp::Mul, 3),
                (AluOp::Div, 5),
                (AluOp::And, 1),
                (AluOp::Or, 1),
                (AluOp::Xor, 1),
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl Config {
    pub fn latency(&self, op: AluOp) -> u32 {
        self.latencies.get(&op).copied().unwrap_or(1)
    }

    pub fn validate(&self) -> SimResult<()> {
        let sizes = [
            ("rs_capacity", self.rs_capacity),
            ("rob_capacity", self.rob_capacity),
            ("sb_capacity", self.sb_capacity),
            ("rrf_capacity", self.rrf_capacity),
            ("arf_size", self.arf_size),
            ("memory_size", self.memory_size),
            ("issue_width", self.issue_width),
            ("alu_count", self.alu_count),
        ];

        for (name, val) in sizes {
            if val == 0 {
                return Err(SimError::Config(format!("{name} must be at least 1")));
            }
        }

        if self.arf_size > usize::from(u8::MAX) {
            return Err(SimError::Config(format!(
                "arf_size must be at most {}",
                u8::MAX
            )));
        }

        for op in AluOp::iter() {
            match self.latencies.get(&op) {
                None => return Err(SimError::Config(format!("missing latency for {op}"))),
                Some(0) => return Err(SimError::Config(format!("{op} latency must be at least 1"))),
                Some(_) => (),
            }
        }

        Ok(())
    }
}

/// Parses the line-oriented `<key> = <value>` format, starting from defaults.
impl FromStr for Config {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut config = Config::default();

        for (i, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (key, val) = line
                .split_once('=')
                .ok_or_else(|| SimError::Config(format!("line {}: expected '<key> = <value>'", i + 1)))?;
            let key = key.trim().to_lowercase();
            let val = val.trim();
            let num = val
                .parse::<usize>()
                .map_err(|_| SimError::Config(format!("line {}: invalid number '{val}'", i + 1)))?;

            match key.as_str() {
                "size of the reservation station" => config.rs_capacity = num,
                "size of the re-order buffer" => config.rob_capacity = num,
                "size of the store buffer" => config.sb_capacity = num,
                _ => {
                    let op = key
                        .strip_suffix(" latency")
                        .and_then(|op| AluOp::from_str(op.trim()).ok())
                        .ok_or_else(|| SimError::Config(format!("line {}: unknown setting '{key}'", i + 1)))?;
                    let lat = u32::try_from(num)
                        .map_err(|_| SimError::Config(format!("line {}: latency too large", i + 1)))?;
                    config.latencies.insert(op, lat);
                }
            }
        }

        Ok(config)
    }
}

pub fn load_config(path: &Path) -> SimResult<Config> {
    let contents = fs::read_to_string(path)?;

    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str::<Config>(&contents)?,
        _ => contents.parse::<Config>()?,
    };
    config.validate()?;

    debug!("loaded configuration from {}: {:?}", path.display(), config);
    Ok(config)
}
