use tomasulo_sim::{
    config::Config,
    cpu::{Cpu, ExecResult},
    emulated::Emulated,
    error::SimError,
    inst::ArchReg,
    out_of_order::OutOfOrder,
    parse_and_exec,
};

fn run_file<C: Cpu>(name: &str, config: &Config) -> ExecResult {
    let path = format!("asm/{name}.asm");
    let source = std::fs::read_to_string(&path).expect("could not open program");
    parse_and_exec::<C>(&source, config).expect("program failed")
}

fn reg(res: &ExecResult, n: u8) -> i32 {
    res.regs.get(ArchReg(n - 1))
}

fn word(res: &ExecResult, addr: i32) -> i32 {
    res.mem.readw(addr).unwrap()
}

#[generic_tests::define]
mod t {
    use super::*;

    #[test]
    fn test_hazard_raw<C: Cpu>() {
        let res = run_file::<C>("hazard_raw", &Config::default());
        assert_eq!(reg(&res, 1), 2);
        assert_eq!(reg(&res, 4), 10);
        assert_eq!(reg(&res, 5), 8);
        assert_eq!(word(&res, 0), 8);
    }

    #[test]
    fn test_hazard_waw<C: Cpu>() {
        let res = run_file::<C>("hazard_waw", &Config::default());
        assert_eq!(reg(&res, 1), 3);
        assert_eq!(word(&res, 4), 3);
    }

    #[test]
    fn test_hazard_war<C: Cpu>() {
        let res = run_file::<C>("hazard_war", &Config::default());
        assert_eq!(reg(&res, 1), 2);
        assert_eq!(reg(&res, 2), 5);
        assert_eq!(reg(&res, 3), 10);
        assert_eq!(word(&res, 8), 10);
        assert_eq!(word(&res, 9), 2);
    }

    #[test]
    fn test_store_then_load<C: Cpu>() {
        let res = run_file::<C>("forward", &Config::default());
        assert_eq!(reg(&res, 1), 2);
        assert_eq!(reg(&res, 4), 9);
        assert_eq!(reg(&res, 5), 9);
        assert_eq!(word(&res, 2), 9);
    }

    #[test]
    fn test_loads<C: Cpu>() {
        let res = run_file::<C>("loads", &Config::default());
        assert_eq!(
            res.regs.as_slice()[..6],
            [1, 5, 6, 7, 1, 13],
        );
        assert_eq!(word(&res, 10), 6);
        assert_eq!(word(&res, 11), 7);
        assert_eq!(word(&res, 12), 1);
    }

    #[test]
    fn test_arith<C: Cpu>() {
        let res = run_file::<C>("arith", &Config::default());
        assert_eq!(
            res.regs.as_slice(),
            [11, -9, -99, -24, 232, 233, 1, -98],
        );
        assert_eq!(word(&res, 20), 233);
    }

    #[test]
    fn test_squares<C: Cpu>() {
        let res = run_file::<C>("squares", &Config::default());
        assert_eq!(&res.mem.as_slice()[30..35], [1, 4, 9, 16, 30]);
        assert_eq!(reg(&res, 3), 30);
        assert_eq!(reg(&res, 6), 7);
        assert_eq!(res.stats.insts_retired, 21);
    }

    #[test]
    fn test_initial_values<C: Cpu>() {
        let config = Config {
            initial_reg_value: 3,
            initial_mem_value: -2,
            ..Config::default()
        };
        let res = parse_and_exec::<C>("LD R1, [R2]\nADD R2, R1, R3", &config).unwrap();
        assert_eq!(reg(&res, 1), -2);
        assert_eq!(reg(&res, 2), 1);
        assert_eq!(reg(&res, 8), 3);
    }

    #[test]
    fn test_empty_program<C: Cpu>() {
        let res = parse_and_exec::<C>("; nothing to do\n", &Config::default()).unwrap();
        assert_eq!(res.stats.insts_retired, 0);
        assert!(res.regs.as_slice().iter().all(|&r| r == 1));
    }

    #[test]
    fn test_divide_by_zero<C: Cpu>() {
        let res = parse_and_exec::<C>("SUB R1, R1, R2\nDIV R3, R2, R1", &Config::default());
        assert!(matches!(res, Err(SimError::DivideByZero { seq: 2 })));
    }

    #[test]
    fn test_address_out_of_bounds<C: Cpu>() {
        let res = parse_and_exec::<C>("ST [100], R1", &Config::default());
        assert!(matches!(
            res,
            Err(SimError::AddressOutOfBounds { addr: 100, size: 100 })
        ));

        let res = parse_and_exec::<C>("LD R1, [-1]", &Config::default());
        assert!(matches!(res, Err(SimError::AddressOutOfBounds { addr: -1, .. })));
    }

    #[test]
    fn test_register_outside_file<C: Cpu>() {
        let config = Config {
            arf_size: 4,
            ..Config::default()
        };
        let res = parse_and_exec::<C>("ADD R5, R1, R2", &config);
        assert!(matches!(res, Err(SimError::Parse { line: 1, .. })));
    }

    #[instantiate_tests(<Emulated>)]
    mod emulated {}

    #[instantiate_tests(<OutOfOrder>)]
    mod out_of_order {}
}

#[cfg(test)]
mod cosim {
    use super::*;
    use tomasulo_sim::inst::AluOp;

    fn configs() -> Vec<(&'static str, Config)> {
        let narrow = Config {
            rs_capacity: 1,
            rob_capacity: 1,
            sb_capacity: 1,
            rrf_capacity: 1,
            issue_width: 1,
            alu_count: 1,
            ..Config::default()
        };
        let wide = Config {
            rs_capacity: 16,
            rob_capacity: 32,
            sb_capacity: 8,
            rrf_capacity: 16,
            issue_width: 4,
            alu_count: 4,
            ..Config::default()
        };
        let mut slow = Config {
            rs_capacity: 3,
            rob_capacity: 4,
            sb_capacity: 2,
            rrf_capacity: 2,
            ..Config::default()
        };
        slow.latencies.insert(AluOp::Add, 4);
        slow.latencies.insert(AluOp::Mul, 7);
        slow.latencies.insert(AluOp::Div, 11);

        vec![
            ("default", Config::default()),
            ("narrow", narrow),
            ("wide", wide),
            ("slow", slow),
        ]
    }

    #[test]
    fn test_matches_reference_model() {
        for entry in std::fs::read_dir("asm").unwrap() {
            let path = entry.unwrap().path();
            let name = path.file_stem().unwrap().to_str().unwrap().to_owned();

            for (label, config) in configs() {
                let a = run_file::<Emulated>(&name, &config);
                let b = run_file::<OutOfOrder>(&name, &config);
                assert!(a.regs == b.regs, "{name} ({label}): registers differ");
                assert!(a.mem == b.mem, "{name} ({label}): memory differs");
                assert_eq!(
                    a.stats.insts_retired, b.stats.insts_retired,
                    "{name} ({label}): retired counts differ"
                );
            }
        }
    }

    #[test]
    fn test_wider_is_not_slower() {
        let configs = configs();
        let (_, default) = &configs[0];
        let (_, narrow) = &configs[1];

        for name in ["hazard_raw", "loads", "squares"] {
            let a = run_file::<OutOfOrder>(name, narrow);
            let b = run_file::<OutOfOrder>(name, default);
            assert!(
                b.stats.cycles_taken <= a.stats.cycles_taken,
                "{name}: {} cycles with default config, {} narrow",
                b.stats.cycles_taken,
                a.stats.cycles_taken
            );
        }
    }
}
