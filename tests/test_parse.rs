use std::path::Path;

use tomasulo_sim::{
    config::load_config,
    error::SimError,
    inst::{AluOp, ArchReg, Inst, Operand},
    program::Program,
};

#[test]
fn parse_all() {
    for entry in std::fs::read_dir("asm").unwrap() {
        let entry = entry.unwrap();
        let contents = std::fs::read_to_string(entry.path()).unwrap();
        let prog_name = entry.file_name().to_str().unwrap().to_owned();

        println!("parsing {prog_name}...");
        let prog = contents
            .parse::<Program>()
            .unwrap_or_else(|e| panic!("failed to parse program {prog_name}: {e}"));
        assert!(!prog.is_empty());
        prog.check_regs(8).unwrap();
    }
}

#[test]
fn check_forward_program() {
    let contents = std::fs::read_to_string("asm/forward.asm").unwrap();
    let prog = contents.parse::<Program>().unwrap();

    assert_eq!(
        prog.insts,
        vec![
            Inst::Alu(AluOp::Mul, ArchReg(3), Operand::Reg(ArchReg(3)), Operand::Imm(9)),
            Inst::Alu(
                AluOp::Add,
                ArchReg(0),
                Operand::Reg(ArchReg(1)),
                Operand::Reg(ArchReg(2))
            ),
            Inst::Store(Operand::Reg(ArchReg(0)), Operand::Reg(ArchReg(3))),
            Inst::Load(ArchReg(4), Operand::Reg(ArchReg(0))),
        ]
    );
}

#[test]
fn error_names_line() {
    let err = "ADD R1, R2, R3\n; comment\nLD R1\n".parse::<Program>().unwrap_err();
    assert!(matches!(err, SimError::Parse { line: 3, .. }));
    assert!(err.to_string().contains("line 3"));
}

#[test]
fn load_sample_configs() {
    let yaml = load_config(Path::new("configs/default.yaml")).unwrap();
    let text = load_config(Path::new("configs/default.txt")).unwrap();
    assert_eq!(yaml.rs_capacity, text.rs_capacity);
    assert_eq!(yaml.rob_capacity, text.rob_capacity);
    assert_eq!(yaml.sb_capacity, text.sb_capacity);
    assert_eq!(yaml.latencies, text.latencies);

    let wide = load_config(Path::new("configs/wide.yaml")).unwrap();
    assert_eq!(wide.issue_width, 4);
    assert_eq!(wide.latency(AluOp::Div), 8);
}
